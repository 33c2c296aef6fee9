//! Assertion macros that report through the notifier instead of panicking
//!
//! - [`remedial_assert!`](crate::remedial_assert) reports a `Fatal` misuse
//!   event and then runs a recovery expression (usually an early `return`).
//!   A debuggable console aborts on that event; otherwise the caller
//!   continues down the recovery path.
//! - [`inner_assert!`](crate::inner_assert) checks internal invariants in
//!   debug builds only and reports the same way.

/// Report a `Fatal` misuse event when `cond` is false, then evaluate `remedial`
///
/// ```
/// use cartridge_common::remedial_assert;
///
/// fn checked_half(value: usize) -> usize {
///     remedial_assert!(value % 2 == 0, "odd value", return 0);
///     value / 2
/// }
/// assert_eq!(checked_half(8), 4);
/// ```
#[macro_export]
macro_rules! remedial_assert {
    ($cond:expr, $message:expr, $remedial:expr) => {
        if !$cond {
            $crate::console::fatal($message);
            $remedial;
        }
    };
}

/// Debug-build invariant check reported as a `Fatal` misuse event
#[macro_export]
macro_rules! inner_assert {
    ($cond:expr) => {
        if cfg!(debug_assertions) && !$cond {
            $crate::console::fatal(concat!("Assertion failed: ", stringify!($cond)));
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::console::{Console, MemorySink};
    use crate::config::ConsoleConfig;
    use crate::notifier::Notifier;
    use std::sync::Arc;

    fn halve(value: usize) -> Option<usize> {
        remedial_assert!(value % 2 == 0, "odd value", return None);
        Some(value / 2)
    }

    #[test]
    fn test_passing_condition_reports_nothing() {
        // Must not reach the shared notifier at all
        assert_eq!(halve(10), Some(5));
        inner_assert!(1 + 1 == 2);
    }

    #[test]
    fn test_fatal_event_shape_for_assertions() {
        let config = ConsoleConfig {
            debuggable: Some(false),
            ..ConsoleConfig::default()
        };
        let console = Console::new(Arc::new(Notifier::new()), &config);
        let sink = MemorySink::new();
        console.set_sink(sink.clone());

        console.fatal(
            concat!("Assertion failed: ", stringify!(offset <= len)),
            std::panic::Location::caller(),
        );
        let line = sink.contents();
        assert!(line.starts_with("[Fatal: 21, Assertion failed: offset <= len, Line: "));
        assert!(line.contains("Source: Assertion"));
    }
}
