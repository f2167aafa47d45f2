use lattix_tensor::{tensor::get_strides_from_shape, Tensor, TensorAllocator};

use crate::{canonical::canonicalize, error::SparseError, scalar::Scalar, tensor::SparseTensor};

/// A binary operator folding the stored values of a reduction region.
///
/// No identity element is involved: the first stored value of a region seeds
/// the accumulator and every further value is folded in with
/// [`ReduceOp::combine`]. Closures `Fn(T, T) -> T` implement this trait.
pub trait ReduceOp<T> {
    /// Folds `value` into the accumulator `acc`.
    fn combine(&self, acc: T, value: T) -> T;
}

/// Sum of the stored values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

/// Largest stored value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Max;

/// Smallest stored value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Min;

/// Product of the stored values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prod;

impl<T: Scalar> ReduceOp<T> for Sum {
    fn combine(&self, acc: T, value: T) -> T {
        acc + value
    }
}

impl<T: Scalar> ReduceOp<T> for Max {
    fn combine(&self, acc: T, value: T) -> T {
        if value > acc {
            value
        } else {
            acc
        }
    }
}

impl<T: Scalar> ReduceOp<T> for Min {
    fn combine(&self, acc: T, value: T) -> T {
        if value < acc {
            value
        } else {
            acc
        }
    }
}

impl<T: Scalar> ReduceOp<T> for Prod {
    fn combine(&self, acc: T, value: T) -> T {
        acc * value
    }
}

impl<T, F> ReduceOp<T> for F
where
    F: Fn(T, T) -> T,
{
    fn combine(&self, acc: T, value: T) -> T {
        self(acc, value)
    }
}

fn unravel_index<const N: usize>(offset: usize, shape: &[usize; N]) -> [usize; N] {
    let mut index = [0; N];
    let mut rem = offset;
    for (i, &dim) in shape.iter().enumerate().rev() {
        if dim > 0 {
            index[i] = rem % dim;
            rem /= dim;
        }
    }
    index
}

/// Reduces a sparse tensor along `axis` over its stored entries only.
///
/// Missing coordinates do not take part in the reduction. In particular a
/// [`Max`] over a region whose stored values are all negative yields the
/// largest negative value, even though the dense-equivalent region also
/// holds zeros. The input is canonicalized first, so duplicate coordinates
/// count as a single summed entry, and values are folded in canonical order.
///
/// The reduced axis is kept with size one.
///
/// # Arguments
///
/// * `t` - The sparse tensor to reduce.
/// * `axis` - The axis to reduce over.
/// * `op` - The reduction operator.
/// * `alloc` - The allocator of the dense result.
///
/// # Errors
///
/// * [`SparseError::AxisOutOfRange`] if `axis` is not smaller than the rank.
/// * [`SparseError::EmptyReduction`] if some output position has no stored entry to reduce.
///
/// # Example
///
/// ```
/// use lattix_sparse::{reduce, Sum, SparseTensor};
/// use lattix_tensor::CpuAllocator;
///
/// let t = SparseTensor::new([2, 3], vec![[0, 0], [0, 2], [1, 1]], vec![1, 2, 3]).unwrap();
/// let r = reduce(&t, 1, Sum, CpuAllocator).unwrap();
/// assert_eq!(r.shape, [2, 1]);
/// assert_eq!(r.as_slice(), &[3, 3]);
/// ```
pub fn reduce<T, const N: usize, O, A>(
    t: &SparseTensor<T, N>,
    axis: usize,
    op: O,
    alloc: A,
) -> Result<Tensor<T, N, A>, SparseError>
where
    T: Scalar,
    O: ReduceOp<T>,
    A: TensorAllocator,
{
    if axis >= N {
        return Err(SparseError::axis_out_of_range(
            axis,
            format!("reduce axis must be smaller than the rank {}", N),
        ));
    }

    let mut out_shape = t.shape();
    out_shape[axis] = 1;
    let out_strides = get_strides_from_shape(out_shape);
    let numel = out_shape.iter().product::<usize>();

    let canonical = canonicalize(t);
    let mut acc: Vec<Option<T>> = vec![None; numel];
    for (coord, &value) in canonical.iter() {
        let offset = coord
            .iter()
            .zip(out_strides.iter())
            .enumerate()
            .filter(|(i, _)| *i != axis)
            .fold(0, |acc, (_, (&idx, &stride))| acc + idx * stride);
        acc[offset] = Some(match acc[offset] {
            Some(prev) => op.combine(prev, value),
            None => value,
        });
    }

    let data = acc
        .into_iter()
        .enumerate()
        .map(|(offset, v)| {
            v.ok_or_else(|| SparseError::EmptyReduction {
                axis: Some(axis),
                position: unravel_index(offset, &out_shape).to_vec(),
            })
        })
        .collect::<Result<Vec<T>, _>>()?;

    log::debug!(
        "reduce: axis {} of {:?} ({} entries) -> {:?}",
        axis,
        t.shape(),
        canonical.nnz(),
        out_shape
    );

    Ok(Tensor::from_shape_vec(out_shape, data, alloc)?)
}

/// Reduces every stored entry of a sparse tensor to a single value.
///
/// # Errors
///
/// Returns [`SparseError::EmptyReduction`] if the tensor stores no entries.
pub fn reduce_all<T, const N: usize, O>(t: &SparseTensor<T, N>, op: O) -> Result<T, SparseError>
where
    T: Scalar,
    O: ReduceOp<T>,
{
    canonicalize(t)
        .values()
        .iter()
        .copied()
        .reduce(|acc, v| op.combine(acc, v))
        .ok_or(SparseError::EmptyReduction {
            axis: None,
            position: Vec::new(),
        })
}

/// Sums the stored entries along `axis`. See [`reduce`].
pub fn reduce_sum<T, const N: usize, A>(
    t: &SparseTensor<T, N>,
    axis: usize,
    alloc: A,
) -> Result<Tensor<T, N, A>, SparseError>
where
    T: Scalar,
    A: TensorAllocator,
{
    reduce(t, axis, Sum, alloc)
}

/// Takes the largest stored entry along `axis`. See [`reduce`].
pub fn reduce_max<T, const N: usize, A>(
    t: &SparseTensor<T, N>,
    axis: usize,
    alloc: A,
) -> Result<Tensor<T, N, A>, SparseError>
where
    T: Scalar,
    A: TensorAllocator,
{
    reduce(t, axis, Max, alloc)
}

/// Takes the smallest stored entry along `axis`. See [`reduce`].
pub fn reduce_min<T, const N: usize, A>(
    t: &SparseTensor<T, N>,
    axis: usize,
    alloc: A,
) -> Result<Tensor<T, N, A>, SparseError>
where
    T: Scalar,
    A: TensorAllocator,
{
    reduce(t, axis, Min, alloc)
}

#[cfg(test)]
mod tests {
    use super::{reduce, reduce_all, reduce_max, reduce_min, reduce_sum, Max, Prod, Sum};
    use crate::{
        canonical::canonicalize, dense::from_dense, elementwise::add, error::SparseError,
        tensor::SparseTensor,
    };
    use lattix_tensor::{CpuAllocator, Tensor};

    #[test]
    fn test_reduce_max_ignores_missing() -> Result<(), SparseError> {
        let d = Tensor::<i32, 1, _>::from_shape_vec([3], vec![-5, 0, -3], CpuAllocator)?;
        let s = from_dense(&d)?;
        let r = reduce_max(&s, 0, CpuAllocator)?;
        assert_eq!(r.shape, [1]);
        assert_eq!(r.as_slice(), &[-3]);
        Ok(())
    }

    #[test]
    fn test_reduce_max_counts_explicit_zero() -> Result<(), SparseError> {
        let t = SparseTensor::new([3], vec![[0], [1]], vec![-5, 0])?;
        let r = reduce_max(&t, 0, CpuAllocator)?;
        assert_eq!(r.as_slice(), &[0]);
        Ok(())
    }

    #[test]
    fn test_reduce_sees_zero_kept_by_canonicalize() -> Result<(), SparseError> {
        // the two entries at [0] cancel
        let t = SparseTensor::new([3], vec![[0], [2], [0]], vec![4, -6, -4])?;
        let c = canonicalize(&t);
        assert_eq!(c.values(), &[0, -6]);
        assert_eq!(reduce_max(&c, 0, CpuAllocator)?.as_slice(), &[0]);

        // add drops the cancelled entry instead
        let a = SparseTensor::new([3], vec![[0], [2]], vec![4, -6])?;
        let b = SparseTensor::new([3], vec![[0]], vec![-4])?;
        let sum = add(&a, &b)?;
        assert_eq!(sum.indices(), &[[2]]);
        assert_eq!(reduce_max(&sum, 0, CpuAllocator)?.as_slice(), &[-6]);
        Ok(())
    }

    #[test]
    fn test_reduce_sum_axis0() -> Result<(), SparseError> {
        let t = SparseTensor::new(
            [3, 2],
            vec![[0, 0], [2, 0], [1, 1], [2, 1]],
            vec![1.0, 2.0, 4.0, 8.0],
        )?;
        let r = reduce_sum(&t, 0, CpuAllocator)?;
        assert_eq!(r.shape, [1, 2]);
        assert_eq!(r.as_slice(), &[3.0, 12.0]);
        Ok(())
    }

    #[test]
    fn test_reduce_3d_middle_axis() -> Result<(), SparseError> {
        let t = SparseTensor::new(
            [2, 3, 2],
            vec![[0, 0, 0], [0, 2, 0], [0, 1, 1], [1, 0, 0], [1, 2, 1]],
            vec![1, 5, 2, 7, 4],
        )?;
        let r = reduce_min(&t, 1, CpuAllocator)?;
        assert_eq!(r.shape, [2, 1, 2]);
        assert_eq!(r.as_slice(), &[1, 2, 7, 4]);
        Ok(())
    }

    #[test]
    fn test_reduce_duplicates_are_summed_first() -> Result<(), SparseError> {
        let t = SparseTensor::new([1, 2], vec![[0, 1], [0, 0], [0, 1]], vec![3, 4, 3])?;
        let r = reduce_max(&t, 1, CpuAllocator)?;
        assert_eq!(r.as_slice(), &[6]);
        Ok(())
    }

    #[test]
    fn test_reduce_custom_op() -> Result<(), SparseError> {
        let t = SparseTensor::new([4], vec![[0], [3]], vec![3, 5])?;
        let r = reduce(&t, 0, |a: i32, b: i32| a * 10 + b, CpuAllocator)?;
        assert_eq!(r.as_slice(), &[35]);
        let r = reduce(&t, 0, Prod, CpuAllocator)?;
        assert_eq!(r.as_slice(), &[15]);
        Ok(())
    }

    #[test]
    fn test_reduce_empty_region() -> Result<(), SparseError> {
        let t = SparseTensor::new([3, 2], vec![[0, 0], [2, 0]], vec![1, 2])?;
        assert_eq!(
            reduce(&t, 0, Sum, CpuAllocator).map(|_| ()),
            Err(SparseError::EmptyReduction {
                axis: Some(0),
                position: vec![0, 1],
            })
        );
        Ok(())
    }

    #[test]
    fn test_reduce_axis_out_of_range() -> Result<(), SparseError> {
        let t = SparseTensor::<f32, 2>::empty([2, 2])?;
        assert!(matches!(
            reduce(&t, 2, Max, CpuAllocator),
            Err(SparseError::AxisOutOfRange { axis: 2, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_reduce_all() -> Result<(), SparseError> {
        let t = SparseTensor::new([2, 2], vec![[1, 1], [0, 0]], vec![-4.0, -1.5])?;
        assert_eq!(reduce_all(&t, Max)?, -1.5);
        assert_eq!(reduce_all(&t, Sum)?, -5.5);

        let e = SparseTensor::<f32, 2>::empty([2, 2])?;
        assert_eq!(
            reduce_all(&e, Sum),
            Err(SparseError::EmptyReduction {
                axis: None,
                position: vec![],
            })
        );
        Ok(())
    }
}
