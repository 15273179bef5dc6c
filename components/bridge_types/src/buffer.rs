//! Shared byte array used by the guest for binary I/O.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A growable-capacity byte buffer shared behind a cheap clone.
///
/// The guest addresses a `ByteArray` through its foreign-object id; clones
/// share the same backing storage, so bytes copied in through one handle
/// are visible through all of them.
///
/// # Examples
///
/// ```
/// use bridge_types::ByteArray;
///
/// let buf = ByteArray::new(4);
/// let alias = buf.clone();
/// buf.copy_from(&[1, 2, 3, 4, 5]);
/// assert_eq!(alias.to_vec(), vec![1, 2, 3, 4]);
/// ```
#[derive(Clone, Default)]
pub struct ByteArray {
    data: Rc<RefCell<Vec<u8>>>,
}

impl ByteArray {
    /// Creates a zero-filled buffer of the given length.
    pub fn new(len: usize) -> Self {
        ByteArray {
            data: Rc::new(RefCell::new(vec![0u8; len])),
        }
    }

    /// Creates a buffer that takes ownership of existing bytes.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        ByteArray {
            data: Rc::new(RefCell::new(bytes)),
        }
    }

    /// Returns the buffer length in bytes.
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    /// Returns true if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }

    /// Copies bytes from `src` into the buffer, bounded by the buffer's
    /// capacity. Returns the number of bytes actually written.
    pub fn copy_from(&self, src: &[u8]) -> usize {
        let mut data = self.data.borrow_mut();
        let n = data.len().min(src.len());
        data[..n].copy_from_slice(&src[..n]);
        n
    }

    /// Returns a copy of the bytes in `offset..offset + len`, clamped to
    /// the buffer's bounds.
    pub fn read_range(&self, offset: usize, len: usize) -> Vec<u8> {
        let data = self.data.borrow();
        let start = offset.min(data.len());
        let end = offset.saturating_add(len).min(data.len());
        data[start..end].to_vec()
    }

    /// Returns a copy of the whole buffer contents.
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.borrow().clone()
    }

    /// Returns true if `other` shares this buffer's backing storage.
    pub fn same_backing(&self, other: &ByteArray) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for ByteArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteArray({})", self.len())
    }
}
