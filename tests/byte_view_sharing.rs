//! Byte view sharing and bounds tests
//!
//! Out-of-range slicing reports through the shared console, so those tests
//! hold a process-wide guard and run with the breakpoint removed.

use cartridge_common::{ByteView, Code, Console, ErrorEvent, Level, MemorySink, Notifier};
use parking_lot::{Mutex, MutexGuard};
use proptest::prelude::*;
use std::sync::Arc;

static SHARED_CONSOLE: Mutex<()> = parking_lot::const_mutex(());

fn quiet_shared_console() -> (MutexGuard<'static, ()>, MemorySink) {
    let guard = SHARED_CONSOLE.lock();
    let console = Console::shared();
    console.set_debuggable(false);
    let sink = MemorySink::new();
    console.set_sink(sink.clone());
    (guard, sink)
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}

fn capture_fatal(identifier: &str) -> Arc<Mutex<Vec<ErrorEvent>>> {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    Notifier::shared().set_notification(100, identifier, move |event: &ErrorEvent| {
        if event.level() == Level::Fatal {
            sink.lock().push(event.clone());
        }
    });
    captured
}

proptest! {
    #[test]
    fn prop_subdata_matches_source(
        len in 1usize..512,
        start in 0.0f64..1.0,
        span in 0.0f64..1.0,
    ) {
        let source = pattern(len);
        let view = ByteView::owned_copy(&source).unwrap();

        let offset = ((len as f64) * start) as usize;
        let size = ((len - offset) as f64 * span) as usize;
        let sub = view.subdata_at(offset, size);

        prop_assert_eq!(sub.as_slice(), &source[offset..offset + size]);
        if size > 0 {
            prop_assert!(sub.shares_store_with(&view));
            prop_assert_eq!(view.share_count(), 2);
            prop_assert_eq!(sub.store_len(), Some(len));
        } else {
            prop_assert_eq!(view.share_count(), 1);
        }
    }

    #[test]
    fn prop_grow_preserves_sibling(
        len in 1usize..256,
        extra in 1usize..256,
        cut in 0.0f64..1.0,
    ) {
        let source = pattern(len);
        let mut view = ByteView::owned_copy(&source).unwrap();
        let offset = ((len as f64) * cut) as usize;
        let sibling = view.subdata_at(offset, len - offset);
        let before = sibling.to_vec();

        view.resize(len + extra).unwrap();

        prop_assert_eq!(sibling.as_slice(), &before[..]);
        prop_assert_eq!(&view.as_slice()[..len], &source[..]);
        prop_assert_eq!(view.len(), len + extra);
    }
}

#[test]
fn test_out_of_bounds_returns_empty_and_reports_misuse() {
    let (_guard, sink) = quiet_shared_console();
    let captured = capture_fatal("test.byte_view.oob");

    let view = ByteView::owned_copy(&pattern(40)).unwrap();
    let sub = view.subdata_at(30, 20);

    assert!(sub.is_empty());
    assert!(!sub.is_owned());
    assert_eq!(view.share_count(), 1);

    {
        let events = captured.lock();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.known_code(), Some(Code::Misuse));
        assert_eq!(event.message(), "Memory cross-border");
        assert!(event.attributes().text("File").unwrap().ends_with("view.rs"));
    }

    assert!(sink.contents().starts_with("[Fatal: 21, Memory cross-border"));
    Notifier::shared().unset_notification("test.byte_view.oob");
}

#[test]
fn test_out_of_bounds_prefix_and_overflow() {
    let (_guard, _sink) = quiet_shared_console();
    let captured = capture_fatal("test.byte_view.overflow");

    let view = ByteView::owned_copy(&pattern(8)).unwrap();
    assert!(view.subdata(9).is_empty());
    assert!(view.subdata_at(usize::MAX, 2).is_empty());

    let window = view.subdata_at(2, 4);
    // window bounds apply even though the store is larger
    assert!(window.subdata_at(2, 3).is_empty());

    assert_eq!(captured.lock().len(), 3);
    Notifier::shared().unset_notification("test.byte_view.overflow");
}

#[test]
fn test_allocation_failure_is_distinguishable() {
    let (_guard, sink) = quiet_shared_console();

    let result = std::thread::spawn(|| {
        let result = ByteView::owned(usize::MAX);
        let event = cartridge_common::take_threaded_error();
        (result.is_err(), event)
    })
    .join()
    .unwrap();

    assert!(result.0);
    let event = result.1.unwrap();
    assert_eq!(event.known_code(), Some(Code::NoMemory));
    assert_eq!(
        sink.contents(),
        "[Error: 7, NoMemory, Size: 9223372036854775807]\n"
    );
}

#[test]
fn test_empty_views_all_equal() {
    let bytes = [1u8, 2, 3];
    let views = [
        ByteView::empty(),
        ByteView::default(),
        ByteView::borrowed(&bytes).subdata(0),
        ByteView::owned_copy(&bytes).unwrap().subdata_at(3, 0),
        ByteView::owned(0).unwrap(),
    ];

    for view in &views {
        assert!(view.is_empty());
        assert_eq!(view, ByteView::empty_ref());
    }
}

#[test]
fn test_concurrent_slicing_and_drops() {
    let view = ByteView::owned_copy(&pattern(4096)).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let view = view.clone();
            std::thread::spawn(move || {
                for i in 0..500 {
                    let offset = (t * 512 + i) % 4000;
                    let sub = view.subdata_at(offset, 64);
                    assert_eq!(sub.as_slice(), &pattern(4096)[offset..offset + 64]);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(view.share_count(), 1);
}
