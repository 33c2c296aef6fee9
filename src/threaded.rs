//! Per-thread "last error" slot
//!
//! A failing operation records its [`ErrorEvent`] here and reports it through
//! the shared notifier, so callers can inspect the structured context later
//! without it being threaded through every return value. Nothing is visible
//! across threads.

use crate::console;
use crate::event::ErrorEvent;
use std::cell::RefCell;

thread_local! {
    static LAST_ERROR: RefCell<Option<ErrorEvent>> = const { RefCell::new(None) };
}

/// Report `event` and remember it as this thread's last error
pub fn set_threaded_error(event: ErrorEvent) {
    console::report(&event);
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(event));
}

/// The last error recorded on this thread
pub fn threaded_error() -> Option<ErrorEvent> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Take and clear the last error recorded on this thread
pub fn take_threaded_error() -> Option<ErrorEvent> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}
