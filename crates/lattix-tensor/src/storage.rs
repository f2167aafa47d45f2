//! Reference-counted storage for dense tensor data.
//!
//! Clones share the same buffer; a mutable borrow of a shared buffer copies it
//! first, so a tensor handed to another owner is never changed behind its back.

use std::{alloc::Layout, ptr::NonNull, sync::Arc};

use crate::allocator::{TensorAllocator, TensorAllocatorError};

/// The allocation that owns the elements.
struct StorageImpl<T, A: TensorAllocator> {
    /// Pointer to the first element. Dangling when `layout` is zero-sized.
    ptr: NonNull<T>,
    /// Number of initialized elements.
    len: usize,
    /// The layout passed to the allocator.
    layout: Layout,
    /// The allocator that owns the memory.
    alloc: A,
}

// SAFETY: the buffer is uniquely owned by the `StorageImpl` and only reached through
// `&self` for reads or through `Arc::get_mut` for writes.
unsafe impl<T: Send, A: TensorAllocator> Send for StorageImpl<T, A> {}
unsafe impl<T: Sync, A: TensorAllocator> Sync for StorageImpl<T, A> {}

impl<T, A: TensorAllocator> Drop for StorageImpl<T, A> {
    fn drop(&mut self) {
        // SAFETY: the first `len` elements were initialized by `from_vec` and are
        // dropped exactly once here.
        unsafe {
            std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr(),
                self.len,
            ));
        }
        if self.layout.size() != 0 {
            self.alloc
                .dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
        }
    }
}

/// Contiguous, reference-counted tensor memory.
///
/// # Thread Safety
///
/// `TensorStorage` is `Send + Sync` when `T` is, so immutable tensors can be read
/// from any number of threads at once.
pub struct TensorStorage<T, A: TensorAllocator> {
    inner: Arc<StorageImpl<T, A>>,
}

impl<T, A: TensorAllocator> TensorStorage<T, A> {
    /// Creates a new storage by moving the elements of `vec` into memory obtained
    /// from `alloc`.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout is invalid or the allocator fails.
    pub fn from_vec(vec: Vec<T>, alloc: A) -> Result<Self, TensorAllocatorError> {
        let mut vec = vec;
        let len = vec.len();
        let layout = Layout::array::<T>(len).map_err(TensorAllocatorError::LayoutError)?;

        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            let raw = alloc.alloc(layout)? as *mut T;
            NonNull::new(raw).ok_or(TensorAllocatorError::NullPointer)?
        };

        // SAFETY: both regions hold `len` elements and do not overlap. The vector
        // gives up ownership of its elements before it is dropped.
        unsafe {
            std::ptr::copy_nonoverlapping(vec.as_ptr(), ptr.as_ptr(), len);
            vec.set_len(0);
        }

        Ok(Self {
            inner: Arc::new(StorageImpl {
                ptr,
                len,
                layout,
                alloc,
            }),
        })
    }

    /// Returns the allocator that owns the storage memory.
    #[inline]
    pub fn alloc(&self) -> &A {
        &self.inner.alloc
    }

    /// Returns the number of elements in the storage.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// Returns whether the storage holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Returns the data pointer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.inner.ptr.as_ptr()
    }

    /// Returns true if no other storage shares this buffer.
    #[inline]
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }

    /// Returns the storage data as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: ptr is valid (or dangling with len 0) and holds `len` initialized elements.
        unsafe { std::slice::from_raw_parts(self.inner.ptr.as_ptr(), self.inner.len) }
    }

    /// Returns the storage data as a mutable slice.
    ///
    /// If the buffer is shared with another storage it is copied first, so other
    /// owners keep observing the old values.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy cannot be allocated.
    pub fn as_mut_slice(&mut self) -> Result<&mut [T], TensorAllocatorError>
    where
        T: Clone,
    {
        if !self.is_unique() {
            let copy = Self::from_vec(self.as_slice().to_vec(), self.alloc().clone())?;
            *self = copy;
        }
        let inner = Arc::get_mut(&mut self.inner).ok_or(TensorAllocatorError::NullPointer)?;
        // SAFETY: uniquely owned, `len` initialized elements.
        Ok(unsafe { std::slice::from_raw_parts_mut(inner.ptr.as_ptr(), inner.len) })
    }
}

impl<T, A: TensorAllocator> Clone for TensorStorage<T, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, A: TensorAllocator> std::fmt::Debug for TensorStorage<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorStorage")
            .field("ptr", &self.inner.ptr)
            .field("len", &self.inner.len)
            .field("is_unique", &self.is_unique())
            .finish()
    }
}
