use lattix_tensor::{
    tensor::{get_strides_from_shape, next_index},
    Tensor, TensorAllocator,
};

use crate::{
    canonical::canonicalize,
    error::SparseError,
    scalar::Scalar,
    tensor::{ensure_rank, SparseTensor},
};

/// Materializes a sparse tensor as a dense tensor.
///
/// Missing coordinates become zero. The input is canonicalized first, so
/// duplicate coordinates contribute their summed value.
///
/// # Arguments
///
/// * `t` - The sparse tensor to convert.
/// * `alloc` - The allocator of the dense result.
///
/// # Errors
///
/// Returns an error if the dense storage cannot be allocated.
///
/// # Example
///
/// ```
/// use lattix_sparse::{to_dense, SparseTensor};
/// use lattix_tensor::CpuAllocator;
///
/// let t = SparseTensor::new([2, 2], vec![[1, 0], [1, 0]], vec![3, 4]).unwrap();
/// let d = to_dense(&t, CpuAllocator).unwrap();
/// assert_eq!(d.as_slice(), &[0, 0, 7, 0]);
/// ```
pub fn to_dense<T, const N: usize, A>(
    t: &SparseTensor<T, N>,
    alloc: A,
) -> Result<Tensor<T, N, A>, SparseError>
where
    T: Scalar,
    A: TensorAllocator,
{
    to_dense_with_default(t, T::zero(), alloc)
}

/// Materializes a sparse tensor, filling missing coordinates with `default`.
///
/// Stored coordinates receive their summed values, even when that sum equals
/// `default`.
pub fn to_dense_with_default<T, const N: usize, A>(
    t: &SparseTensor<T, N>,
    default: T,
    alloc: A,
) -> Result<Tensor<T, N, A>, SparseError>
where
    T: Scalar,
    A: TensorAllocator,
{
    let shape = t.shape();
    let strides = get_strides_from_shape(shape);
    let canonical = canonicalize(t);

    let mut data = vec![default; t.numel()];
    for (coord, &value) in canonical.iter() {
        let offset = coord
            .iter()
            .zip(strides.iter())
            .fold(0, |acc, (&idx, &stride)| acc + idx * stride);
        data[offset] = value;
    }

    Ok(Tensor::from_shape_vec(shape, data, alloc)?)
}

/// Extracts the nonzero elements of a dense tensor.
///
/// Elements are visited in row-major order, so the result is canonical. Every
/// element equal to zero is skipped, which means converting a sparse tensor
/// to dense and back drops its explicit zeros.
///
/// # Errors
///
/// Returns [`SparseError::RankMismatch`] for a rank-zero tensor.
///
/// # Example
///
/// ```
/// use lattix_sparse::from_dense;
/// use lattix_tensor::{CpuAllocator, Tensor};
///
/// let d = Tensor::<i32, 1, _>::from_shape_vec([3], vec![-5, 0, -3], CpuAllocator).unwrap();
/// let s = from_dense(&d).unwrap();
/// assert_eq!(s.indices(), &[[0], [2]]);
/// assert_eq!(s.values(), &[-5, -3]);
/// ```
pub fn from_dense<T, const N: usize, A>(
    d: &Tensor<T, N, A>,
) -> Result<SparseTensor<T, N>, SparseError>
where
    T: Scalar,
    A: TensorAllocator,
{
    ensure_rank::<N>()?;

    let mut indices = Vec::new();
    let mut values = Vec::new();

    if d.numel() > 0 {
        let mut index = [0; N];
        loop {
            let value = *d.get_unchecked(index);
            if !value.is_zero() {
                indices.push(index);
                values.push(value);
            }
            if !next_index(&mut index, &d.shape) {
                break;
            }
        }
    }

    log::debug!(
        "from_dense: {} elements -> {} entries",
        d.numel(),
        values.len()
    );

    Ok(SparseTensor::from_parts(d.shape, indices, values))
}
