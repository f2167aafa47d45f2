use lattix_tensor::{Tensor, TensorAllocator};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{canonical::canonicalize, error::SparseError, scalar::Scalar, tensor::SparseTensor};

/// Computes the start offset of every row's entries in a canonical matrix.
///
/// Entry `i` and `i + 1` of the result bound the entries of row `i`.
fn row_offsets<T>(s: &SparseTensor<T, 2>, nrows: usize) -> Vec<usize> {
    let mut row_ptrs = vec![0; nrows + 1];
    for &[row, _] in s.indices() {
        row_ptrs[row + 1] += 1;
    }
    for i in 1..=nrows {
        row_ptrs[i] += row_ptrs[i - 1];
    }
    row_ptrs
}

/// Accumulates `v * rhs[j, :]` into `out_row` for every entry `(_, j, v)` of one row.
///
/// The width of `out_row` is the number of columns of `rhs`.
fn accumulate_row<T: Scalar>(out_row: &mut [T], indices: &[[usize; 2]], values: &[T], rhs: &[T]) {
    let p = out_row.len();
    for (&[_, j], &v) in indices.iter().zip(values.iter()) {
        let rhs_row = &rhs[j * p..(j + 1) * p];
        out_row
            .iter_mut()
            .zip(rhs_row.iter())
            .for_each(|(o, &r)| *o = *o + v * r);
    }
}

/// Multiplies a sparse matrix by a dense matrix.
///
/// For each stored entry `(i, j, v)` of the canonicalized sparse operand,
/// `v * d[j, :]` is accumulated into row `i` of the output. Entries of a row
/// are accumulated in canonical order, so the result is reproducible across
/// runs. With the `rayon` feature the output rows are computed in parallel.
///
/// # Arguments
///
/// * `s` - The sparse matrix of shape `[m, k]`.
/// * `d` - The dense matrix of shape `[k, p]`.
///
/// # Returns
///
/// A dense matrix of shape `[m, p]` using the allocator of `d`.
///
/// # Errors
///
/// Returns [`SparseError::DimensionMismatch`] if the inner dimensions differ.
///
/// # Example
///
/// ```
/// use lattix_sparse::{sparse_dense_matmul, SparseTensor};
/// use lattix_tensor::{CpuAllocator, Tensor};
///
/// let s = SparseTensor::new([2, 2], vec![[0, 1], [1, 0], [1, 1]], vec![13, 15, 17]).unwrap();
/// let d = Tensor::<i32, 2, _>::from_shape_vec([2, 1], vec![4, 6], CpuAllocator).unwrap();
/// let out = sparse_dense_matmul(&s, &d).unwrap();
/// assert_eq!(out.as_slice(), &[78, 162]);
/// ```
pub fn sparse_dense_matmul<T, A>(
    s: &SparseTensor<T, 2>,
    d: &Tensor<T, 2, A>,
) -> Result<Tensor<T, 2, A>, SparseError>
where
    T: Scalar,
    A: TensorAllocator,
{
    let [m, k] = s.shape();
    let [dk, p] = d.shape;
    if k != dk {
        return Err(SparseError::DimensionMismatch { lhs: k, rhs: dk });
    }

    let alloc = d.storage.alloc().clone();
    if m == 0 || p == 0 || s.is_empty() {
        return Ok(Tensor::zeros([m, p], alloc)?);
    }

    let s = canonicalize(s);
    let row_ptrs = row_offsets(&s, m);
    let d = d.to_standard_layout()?;
    let rhs = d.as_slice();
    let (indices, values) = (s.indices(), s.values());

    let mut out = vec![T::zero(); m * p];

    let row_kernel = |(row, out_row): (usize, &mut [T])| {
        let entries = row_ptrs[row]..row_ptrs[row + 1];
        accumulate_row(out_row, &indices[entries.clone()], &values[entries], rhs);
    };

    #[cfg(feature = "rayon")]
    out.par_chunks_mut(p).enumerate().for_each(row_kernel);

    #[cfg(not(feature = "rayon"))]
    out.chunks_mut(p).enumerate().for_each(row_kernel);

    log::debug!(
        "sparse_dense_matmul: [{}, {}] ({} entries) x [{}, {}]",
        m,
        k,
        s.nnz(),
        dk,
        p
    );

    Ok(Tensor::from_shape_vec([m, p], out, alloc)?)
}

/// Multiplies a sparse matrix of shape `[m, k]` by a dense vector of length `k`.
///
/// Returns a dense vector of length `m` using the allocator of `x`.
///
/// # Errors
///
/// Returns [`SparseError::DimensionMismatch`] if `x` does not have length `k`.
pub fn sparse_dense_matvec<T, A>(
    s: &SparseTensor<T, 2>,
    x: &Tensor<T, 1, A>,
) -> Result<Tensor<T, 1, A>, SparseError>
where
    T: Scalar,
    A: TensorAllocator,
{
    let [m, k] = s.shape();
    let [n] = x.shape;
    if k != n {
        return Err(SparseError::DimensionMismatch { lhs: k, rhs: n });
    }

    let s = canonicalize(s);
    let mut out = vec![T::zero(); m];
    for (&[i, j], &v) in s.iter() {
        out[i] = out[i] + v * *x.get_unchecked([j]);
    }

    Ok(Tensor::from_shape_vec([m], out, x.storage.alloc().clone())?)
}
