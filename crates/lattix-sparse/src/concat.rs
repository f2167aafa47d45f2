use crate::{error::SparseError, tensor::SparseTensor};

/// Concatenates sparse tensors along `axis`.
///
/// The inputs must agree on every dimension except `axis`. The output's
/// `axis` dimension is the sum of the inputs' sizes along it. Entries are
/// copied in input order with their `axis` component shifted by the total
/// size of the inputs before them.
///
/// The result is not canonicalized. Use [`crate::canonicalize`] when sorted
/// output is required.
///
/// # Errors
///
/// * [`SparseError::AxisOutOfRange`] if `axis` is not smaller than the rank.
/// * [`SparseError::ShapeMismatch`] if `inputs` is empty or the shapes disagree off `axis`.
///
/// # Example
///
/// ```
/// use lattix_sparse::{concat, SparseTensor};
///
/// let a = SparseTensor::new([2, 3], vec![[1, 2]], vec![1]).unwrap();
/// let b = SparseTensor::new([1, 3], vec![[0, 0]], vec![2]).unwrap();
/// let c = concat(0, &[&a, &b]).unwrap();
/// assert_eq!(c.shape(), [3, 3]);
/// assert_eq!(c.indices(), &[[1, 2], [2, 0]]);
/// ```
pub fn concat<T, const N: usize>(
    axis: usize,
    inputs: &[&SparseTensor<T, N>],
) -> Result<SparseTensor<T, N>, SparseError>
where
    T: Copy,
{
    if axis >= N {
        return Err(SparseError::axis_out_of_range(
            axis,
            format!("concat axis must be smaller than the rank {}", N),
        ));
    }

    let Some(first) = inputs.first() else {
        return Err(SparseError::shape_mismatch(
            "concat requires at least one input",
            &[],
            &[],
        ));
    };

    let mut out_shape = first.shape();
    out_shape[axis] = 0;
    for t in inputs.iter() {
        let shape = t.shape();
        let agrees = shape
            .iter()
            .zip(first.shape().iter())
            .enumerate()
            .all(|(i, (a, b))| i == axis || a == b);
        if !agrees {
            return Err(SparseError::shape_mismatch(
                format!("concat inputs must agree on every axis except {}", axis),
                &first.shape(),
                &shape,
            ));
        }
        out_shape[axis] += shape[axis];
    }

    let nnz = inputs.iter().map(|t| t.nnz()).sum();
    let mut indices = Vec::with_capacity(nnz);
    let mut values = Vec::with_capacity(nnz);

    let mut offset = 0;
    for t in inputs.iter() {
        for (coord, &value) in t.iter() {
            let mut coord = *coord;
            coord[axis] += offset;
            indices.push(coord);
            values.push(value);
        }
        offset += t.shape()[axis];
    }

    log::debug!(
        "concat: {} inputs along axis {} -> shape {:?} with {} entries",
        inputs.len(),
        axis,
        out_shape,
        nnz
    );

    Ok(SparseTensor::from_parts(out_shape, indices, values))
}
