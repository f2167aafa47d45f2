#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `lattix-tensor` provides the dense side of lattix: an owned, row-major,
//! multi-dimensional array whose rank is a const generic. Sparse tensors are
//! converted to and from this type, and sparse kernels that produce dense
//! results (matrix products, reductions) return it.
//!
//! # Quick Start
//!
//! ```rust
//! use lattix_tensor::{CpuAllocator, Tensor};
//!
//! let t = Tensor::<f32, 2, _>::from_shape_vec([2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], CpuAllocator).unwrap();
//! assert_eq!(t.get([1, 2]), Some(&6.0));
//!
//! let doubled = t.map(|x| x * 2.0).unwrap();
//! assert_eq!(doubled.get([0, 1]), Some(&4.0));
//! ```

/// Allocator module containing memory management utilities.
pub mod allocator;

/// Serde module for serialization and deserialization of tensors.
#[cfg(feature = "serde")]
pub mod serde;

/// Storage module containing the reference-counted memory buffer.
pub mod storage;

/// Tensor module containing the main tensor implementation and error types.
pub mod tensor;

/// View module containing non-owning tensor views.
pub mod view;

pub use crate::allocator::{CpuAllocator, TensorAllocator, TensorAllocatorError};
pub use crate::tensor::{Tensor, TensorError};
pub use crate::view::TensorView;

/// Type alias for a 1-dimensional tensor.
pub type Tensor1<T, A> = Tensor<T, 1, A>;

/// Type alias for a 2-dimensional tensor.
pub type Tensor2<T, A> = Tensor<T, 2, A>;

/// Type alias for a 3-dimensional tensor.
pub type Tensor3<T, A> = Tensor<T, 3, A>;

/// Type alias for a 4-dimensional tensor.
pub type Tensor4<T, A> = Tensor<T, 4, A>;

/// Type alias for a 2-dimensional tensor with CPU allocator.
pub type CpuTensor2<T> = Tensor2<T, CpuAllocator>;
