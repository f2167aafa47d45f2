#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! A [`SparseTensor`] stores only some coordinates of a tensor, each paired
//! with a value. Every operation takes its inputs by reference and returns a
//! new tensor, so tensors can be shared freely across threads.
//!
//! Stored entries and missing coordinates both read as zero for
//! [`to_dense`], [`add`] and [`sparse_dense_matmul`]. [`reduce`] is the
//! exception: it folds stored entries only and never sees a missing
//! coordinate as a zero.
//!
//! # Quick Start
//!
//! ```rust
//! use lattix_sparse::{add, canonicalize, to_dense, SparseTensor};
//! use lattix_tensor::CpuAllocator;
//!
//! let a = SparseTensor::new([4, 10], vec![[3, 4], [0, 2]], vec![2, 31]).unwrap();
//! let b = SparseTensor::new([4, 10], vec![[0, 2]], vec![56]).unwrap();
//!
//! let c = add(&a, &b).unwrap();
//! assert_eq!(c.indices(), &[[0, 2], [3, 4]]);
//! assert_eq!(c.values(), &[87, 2]);
//!
//! let dense = to_dense(&canonicalize(&a), CpuAllocator).unwrap();
//! assert_eq!(dense.get([0, 2]), Some(&31));
//! ```

/// Canonical ordering and duplicate merging.
pub mod canonical;

/// Concatenation of sparse tensors along an axis.
pub mod concat;

/// Conversion between sparse and dense tensors.
pub mod dense;

/// Value mapping, filtering and sparse addition.
pub mod elementwise;

/// Error types for the sparse module.
pub mod error;

/// Sparse by dense matrix products.
pub mod matmul;

/// Reductions over stored entries.
pub mod reduce;

/// Element types of sparse tensors.
pub mod scalar;

/// Serde module for serialization and deserialization of sparse tensors.
#[cfg(feature = "serde")]
pub mod serde;

/// Box slicing of sparse tensors.
pub mod slice;

/// The coordinate-list tensor type.
pub mod tensor;

/// Axis permutations.
pub mod transpose;

pub use crate::canonical::canonicalize;
pub use crate::concat::concat;
pub use crate::dense::{from_dense, to_dense, to_dense_with_default};
pub use crate::elementwise::{add, add_with, map_values, retain, AddOptions};
pub use crate::error::SparseError;
pub use crate::matmul::{sparse_dense_matmul, sparse_dense_matvec};
pub use crate::reduce::{
    reduce, reduce_all, reduce_max, reduce_min, reduce_sum, Max, Min, Prod, ReduceOp, Sum,
};
pub use crate::scalar::Scalar;
pub use crate::slice::slice;
pub use crate::tensor::SparseTensor;
pub use crate::transpose::{permute_axes, transpose};
