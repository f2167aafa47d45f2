use std::alloc;
use std::alloc::Layout;

use thiserror::Error;

/// An error type for tensor allocator operations.
#[derive(Debug, Error, PartialEq)]
pub enum TensorAllocatorError {
    /// The requested element count does not describe a valid memory layout.
    #[error("Invalid tensor layout {0}")]
    LayoutError(core::alloc::LayoutError),

    /// The allocator returned a null pointer.
    #[error("Null pointer")]
    NullPointer,
}

/// A trait for allocating and deallocating the memory backing a tensor.
///
/// Implementors are cloned into every storage they allocate so that the same
/// allocator releases the memory when the last reference is dropped.
///
/// # Safety
///
/// The tensor allocator must be thread-safe.
pub trait TensorAllocator: Clone + Send + Sync + 'static {
    /// Allocates memory for a tensor with the given layout.
    ///
    /// The layout is never zero-sized; storages skip the allocator for empty buffers.
    fn alloc(&self, layout: Layout) -> Result<*mut u8, TensorAllocatorError>;

    /// Deallocates memory previously returned by [`TensorAllocator::alloc`] with the same layout.
    fn dealloc(&self, ptr: *mut u8, layout: Layout);
}

/// A tensor allocator that uses the system allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuAllocator;

impl TensorAllocator for CpuAllocator {
    fn alloc(&self, layout: Layout) -> Result<*mut u8, TensorAllocatorError> {
        let ptr = unsafe { alloc::alloc(layout) };
        if ptr.is_null() {
            Err(TensorAllocatorError::NullPointer)?
        }
        Ok(ptr)
    }

    #[allow(clippy::not_unsafe_ptr_arg_deref)]
    fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if !ptr.is_null() {
            unsafe { alloc::dealloc(ptr, layout) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_allocator() -> Result<(), TensorAllocatorError> {
        let allocator = CpuAllocator;
        let layout = Layout::array::<f64>(128).map_err(TensorAllocatorError::LayoutError)?;
        let ptr = allocator.alloc(layout)?;
        assert!(!ptr.is_null());
        allocator.dealloc(ptr, layout);
        Ok(())
    }

    #[test]
    fn test_cpu_allocator_dealloc_null_is_noop() {
        let layout = Layout::new::<u32>();
        CpuAllocator.dealloc(std::ptr::null_mut(), layout);
    }
}
