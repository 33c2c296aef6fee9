use super::store::BackingStore;
use crate::error::{CommonError, Result};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A window into contiguous bytes
///
/// Two flavors:
/// - **Borrowed**: points into caller-owned memory tied to `'a`
/// - **Owned**: shares a [`BackingStore`] through an `Arc`; the store lives
///   as long as its last view
///
/// Slicing an owned view hands out another handle on the same store and never
/// copies. Growing past the store's end moves only the growing view to a new
/// store; siblings keep the old one.
#[derive(Clone)]
pub struct ByteView<'a> {
    repr: Repr<'a>,
}

#[derive(Clone)]
enum Repr<'a> {
    Borrowed(&'a [u8]),
    Owned {
        store: Arc<BackingStore>,
        /// Start of this window within `store`
        offset: usize,
        size: usize,
    },
}

static EMPTY: ByteView<'static> = ByteView {
    repr: Repr::Borrowed(&[]),
};

impl<'a> ByteView<'a> {
    /// The process-wide zero-length view
    pub fn empty() -> ByteView<'static> {
        EMPTY.clone()
    }

    /// Reference to the zero-length singleton itself
    pub fn empty_ref() -> &'static ByteView<'static> {
        &EMPTY
    }

    /// Wrap caller memory without taking ownership
    pub fn borrowed(bytes: &'a [u8]) -> Self {
        ByteView {
            repr: Repr::Borrowed(bytes),
        }
    }

    /// Fresh zeroed store of `size` bytes
    pub fn owned(size: usize) -> Result<ByteView<'static>> {
        Ok(ByteView::from_store(BackingStore::allocate(size)?))
    }

    /// Fresh store holding a copy of `bytes`
    pub fn owned_copy(bytes: &[u8]) -> Result<ByteView<'static>> {
        Ok(ByteView::from_store(BackingStore::copy_from(
            bytes,
            bytes.len(),
        )?))
    }

    /// Fresh store holding a copy of whatever `view` currently shows
    pub fn from_view(view: &ByteView<'_>) -> Result<ByteView<'static>> {
        ByteView::owned_copy(view.as_slice())
    }

    fn from_store(store: BackingStore) -> ByteView<'static> {
        let size = store.len();
        ByteView {
            repr: Repr::Owned {
                store: Arc::new(store),
                offset: 0,
                size,
            },
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        match &self.repr {
            Repr::Borrowed(bytes) => *bytes,
            Repr::Owned {
                store,
                offset,
                size,
            } => &store.as_slice()[*offset..*offset + *size],
        }
    }

    /// Mutable access, only while this view is the store's sole holder
    ///
    /// Returns `None` for borrowed views and for stores shared with other
    /// views.
    pub fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        match &mut self.repr {
            Repr::Borrowed(_) => None,
            Repr::Owned {
                store,
                offset,
                size,
            } => {
                let (start, end) = (*offset, *offset + *size);
                Arc::get_mut(store).map(|store| &mut store.as_mut_slice()[start..end])
            }
        }
    }

    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Borrowed(bytes) => bytes.len(),
            Repr::Owned { size, .. } => *size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_owned(&self) -> bool {
        matches!(self.repr, Repr::Owned { .. })
    }

    /// Offset of this window within its store; `None` for borrowed views
    pub fn base_offset(&self) -> Option<usize> {
        match &self.repr {
            Repr::Borrowed(_) => None,
            Repr::Owned { offset, .. } => Some(*offset),
        }
    }

    /// Total length of the backing store; `None` for borrowed views
    pub fn store_len(&self) -> Option<usize> {
        match &self.repr {
            Repr::Borrowed(_) => None,
            Repr::Owned { store, .. } => Some(store.len()),
        }
    }

    /// Number of views holding this view's store (0 when borrowed)
    pub fn share_count(&self) -> usize {
        match &self.repr {
            Repr::Borrowed(_) => 0,
            Repr::Owned { store, .. } => Arc::strong_count(store),
        }
    }

    /// Whether both views are backed by the same store
    pub fn shares_store_with(&self, other: &ByteView<'_>) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::Owned { store: a, .. }, Repr::Owned { store: b, .. }) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Change the logical size of this view
    ///
    /// An owned view whose store still has room past its offset changes size
    /// in place. Otherwise a new store of `new_size` bytes is allocated, the
    /// current bytes are copied to its front, and this view moves onto it.
    /// On allocation failure the view is left untouched.
    pub fn resize(&mut self, new_size: usize) -> Result<()> {
        if let Repr::Owned {
            store,
            offset,
            size,
        } = &mut self.repr
        {
            if offset
                .checked_add(new_size)
                .is_some_and(|end| end <= store.len())
            {
                *size = new_size;
                return Ok(());
            }
        }

        let old_size = self.len();
        let store = BackingStore::copy_from(self.as_slice(), new_size)?;
        trace!(old_size, new_size, "byte view moved to a new backing store");
        self.repr = Repr::Owned {
            store: Arc::new(store),
            offset: 0,
            size: new_size,
        };
        Ok(())
    }

    /// The first `size` bytes of this view, sharing its store
    pub fn subdata(&self, size: usize) -> ByteView<'a> {
        self.subdata_at(0, size)
    }

    /// `size` bytes starting `offset` bytes into this view, sharing its store
    ///
    /// A zero `size` yields the empty singleton. A range reaching past the end
    /// of this view is reported as a `Fatal` misuse event and yields the
    /// empty view; a debuggable console aborts on that event.
    pub fn subdata_at(&self, offset: usize, size: usize) -> ByteView<'a> {
        if size == 0 {
            return ByteView::empty();
        }
        crate::remedial_assert!(
            self.range_fits(offset, size),
            "Memory cross-border",
            return ByteView::empty()
        );
        self.slice_unchecked(offset, size)
    }

    /// Same as [`subdata_at`](Self::subdata_at) but returns misuse as an error
    /// instead of reporting it
    pub fn checked_subdata(&self, offset: usize, size: usize) -> Result<ByteView<'a>> {
        if size == 0 {
            return Ok(ByteView::empty());
        }
        if !self.range_fits(offset, size) {
            return Err(CommonError::Misuse(format!(
                "range {}+{} exceeds view of {} bytes",
                offset,
                size,
                self.len()
            )));
        }
        Ok(self.slice_unchecked(offset, size))
    }

    fn range_fits(&self, offset: usize, size: usize) -> bool {
        offset
            .checked_add(size)
            .is_some_and(|end| end <= self.len())
    }

    fn slice_unchecked(&self, offset: usize, size: usize) -> ByteView<'a> {
        match &self.repr {
            Repr::Borrowed(bytes) => {
                let bytes: &'a [u8] = *bytes;
                ByteView::borrowed(&bytes[offset..offset + size])
            }
            Repr::Owned {
                store,
                offset: base,
                ..
            } => {
                crate::inner_assert!(base + offset + size <= store.len());
                ByteView {
                    repr: Repr::Owned {
                        store: Arc::clone(store),
                        offset: base + offset,
                        size,
                    },
                }
            }
        }
    }

    /// Detach from `'a`, copying only if the view is borrowed
    pub fn into_owned(self) -> Result<ByteView<'static>> {
        match self.repr {
            Repr::Borrowed(bytes) if bytes.is_empty() => Ok(ByteView::empty()),
            Repr::Borrowed(bytes) => ByteView::owned_copy(bytes),
            Repr::Owned {
                store,
                offset,
                size,
            } => Ok(ByteView {
                repr: Repr::Owned {
                    store,
                    offset,
                    size,
                },
            }),
        }
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }
}

impl Default for ByteView<'_> {
    fn default() -> Self {
        ByteView::empty()
    }
}

impl AsRef<[u8]> for ByteView<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq for ByteView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for ByteView<'_> {}

impl PartialEq<[u8]> for ByteView<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_slice() == other
    }
}

impl fmt::Debug for ByteView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("ByteView");
        d.field("len", &self.len());
        match &self.repr {
            Repr::Borrowed(_) => d.field("owned", &false),
            Repr::Owned { store, offset, .. } => d
                .field("owned", &true)
                .field("offset", offset)
                .field("store_len", &store.len()),
        };
        d.finish()
    }
}
