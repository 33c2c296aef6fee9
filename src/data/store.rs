//! Backing store: the sole owner of raw bytes behind owned views
//!
//! A store never changes size after allocation. Views that need more room
//! than their store has allocate a new store instead (see
//! [`ByteView::resize`](super::ByteView::resize)), so bytes addressed by
//! sibling views are never moved or freed under them.

use crate::error::{CommonError, Result};
use crate::event::ErrorEvent;
use crate::threaded::set_threaded_error;
use tracing::warn;

#[derive(Debug)]
pub struct BackingStore {
    bytes: Vec<u8>,
}

impl BackingStore {
    /// Allocate `size` zeroed bytes
    ///
    /// Allocator refusal is reported as a `NoMemory` event on this thread and
    /// returned as [`CommonError::NoMemory`].
    pub fn allocate(size: usize) -> Result<Self> {
        let mut bytes = Vec::new();
        if bytes.try_reserve_exact(size).is_err() {
            return Err(no_memory(size));
        }
        bytes.resize(size, 0);
        Ok(BackingStore { bytes })
    }

    /// Allocate `size` bytes and fill them from the front of `source`
    ///
    /// Bytes past `source.len()` stay zeroed.
    pub fn copy_from(source: &[u8], size: usize) -> Result<Self> {
        let mut store = Self::allocate(size)?;
        let count = source.len().min(size);
        store.bytes[..count].copy_from_slice(&source[..count]);
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

fn no_memory(requested: usize) -> CommonError {
    warn!(requested, "backing store allocation failed");
    let err = CommonError::NoMemory { requested };
    set_threaded_error(ErrorEvent::from_code(err.code()).with_attribute("Size", requested));
    err
}
