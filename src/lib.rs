//! # Cartridge Common - Byte Views and Error Notification
//!
//! Low-level substrate shared by the Cartridge storage engine:
//!
//! - [`data`] - zero-copy byte views over shared, reference-counted backing
//!   stores, with copy-on-grow resizing
//! - [`event`] - structured error events (level, code, message, typed attributes)
//! - [`notifier`] - process-wide, priority-ordered dispatch of events to observers
//! - [`console`] - default observers: severity-filtered text logger and the
//!   debug breakpoint
//! - [`threaded`] - per-thread "last error" slot
//! - [`config`] - console configuration from TOML or the environment
//!
//! ## Example Usage
//!
//! ```rust
//! use cartridge_common::{ByteView, Code, ErrorEvent, Level, Notifier};
//! use std::sync::Arc;
//!
//! // Copy a page into a shared store and slice it without copying
//! let page = ByteView::owned_copy(&[0xAB; 4096]).unwrap();
//! let header = page.subdata_at(0, 64);
//! assert!(header.shares_store_with(&page));
//!
//! // Observe errors on an isolated notifier
//! let notifier = Arc::new(Notifier::new());
//! notifier.set_notification(10, "test.harness", |event: &ErrorEvent| {
//!     assert!(event.level() >= Level::Error);
//! });
//! notifier.notify(&ErrorEvent::from_code(Code::Corrupt));
//! ```
//!
//! ## Observer Priorities
//!
//! ```text
//! notify(&event)
//!     │
//!     ├─► i32::MAX  console breakpoint   (debuggable only, aborts on Fatal)
//!     ├─►   ...     host / test observers, descending priority
//!     ├─►    0      tracing bridge       (optional)
//!     └─► i32::MIN  console logger       "[Level: code, message, k: v, ...]"
//! ```

pub mod assertion;
pub mod config;
pub mod console;
pub mod data;
pub mod error;
pub mod event;
pub mod notifier;
pub mod threaded;

// Re-export commonly used types
pub use config::ConsoleConfig;
pub use console::{fatal, report, Console, MemorySink};
pub use data::{BackingStore, ByteView};
pub use error::{CommonError, Result};
pub use event::{AttributeValue, Attributes, Code, ErrorEvent, Level};
pub use notifier::{Callback, Notifier};
pub use threaded::{set_threaded_error, take_threaded_error, threaded_error};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
