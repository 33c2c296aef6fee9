//! Shared byte views over reference-counted backing stores
//!
//! [`ByteView`] is the handle pages and records travel in between the I/O,
//! codec and query layers. Owned views keep their [`BackingStore`] alive;
//! slicing shares it, growing past its end moves the grown view to a new one.

mod store;
mod view;

pub use store::BackingStore;
pub use view::ByteView;
