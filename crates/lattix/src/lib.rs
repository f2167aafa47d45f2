//! Coordinate-list sparse tensors with a dense bridge.
//!
//! ```rust
//! use lattix::sparse::{reduce_max, SparseTensor};
//! use lattix::tensor::CpuAllocator;
//!
//! let t = SparseTensor::new([3], vec![[0], [2]], vec![-5, -3]).unwrap();
//! let r = reduce_max(&t, 0, CpuAllocator).unwrap();
//! assert_eq!(r.as_slice(), &[-3]);
//! ```

#[doc(inline)]
pub use lattix_tensor as tensor;

#[doc(inline)]
pub use lattix_sparse as sparse;
