use crate::{error::SparseError, tensor::SparseTensor};

/// Swaps the rows and columns of a sparse matrix.
///
/// Entries keep their storage order, so the result is generally not canonical.
pub fn transpose<T: Copy>(t: &SparseTensor<T, 2>) -> SparseTensor<T, 2> {
    let [rows, cols] = t.shape();
    let indices = t.indices().iter().map(|&[i, j]| [j, i]).collect();
    SparseTensor::from_parts([cols, rows], indices, t.values().to_vec())
}

/// Reorders the axes of a sparse tensor.
///
/// Axis `i` of the output is axis `axes[i]` of the input. Entries keep their
/// storage order.
///
/// # Errors
///
/// Returns [`SparseError::AxisOutOfRange`] if `axes` is not a permutation of `0..N`.
///
/// # Example
///
/// ```
/// use lattix_sparse::{permute_axes, SparseTensor};
///
/// let t = SparseTensor::new([2, 3, 4], vec![[1, 2, 3]], vec![1]).unwrap();
/// let p = permute_axes(&t, [2, 0, 1]).unwrap();
/// assert_eq!(p.shape(), [4, 2, 3]);
/// assert_eq!(p.indices(), &[[3, 1, 2]]);
/// ```
pub fn permute_axes<T: Copy, const N: usize>(
    t: &SparseTensor<T, N>,
    axes: [usize; N],
) -> Result<SparseTensor<T, N>, SparseError> {
    let mut seen = [false; N];
    for &axis in axes.iter() {
        if axis >= N {
            return Err(SparseError::axis_out_of_range(
                axis,
                format!("permutation axis must be smaller than the rank {}", N),
            ));
        }
        if seen[axis] {
            return Err(SparseError::axis_out_of_range(
                axis,
                "axis appears more than once in the permutation",
            ));
        }
        seen[axis] = true;
    }

    let src_shape = t.shape();
    let shape = axes.map(|a| src_shape[a]);
    let indices = t
        .indices()
        .iter()
        .map(|coord| axes.map(|a| coord[a]))
        .collect();

    Ok(SparseTensor::from_parts(
        shape,
        indices,
        t.values().to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::{permute_axes, transpose};
    use crate::{canonical::canonicalize, error::SparseError, tensor::SparseTensor};

    #[test]
    fn test_transpose() -> Result<(), SparseError> {
        let t = SparseTensor::new([2, 3], vec![[0, 2], [1, 0]], vec![5, 6])?;
        let tt = transpose(&t);
        assert_eq!(tt.shape(), [3, 2]);
        assert_eq!(tt.indices(), &[[2, 0], [0, 1]]);
        assert_eq!(tt.values(), &[5, 6]);
        assert_eq!(transpose(&tt), t);

        let c = canonicalize(&tt);
        assert_eq!(c.indices(), &[[0, 1], [2, 0]]);
        Ok(())
    }

    #[test]
    fn test_permute_axes_matches_transpose() -> Result<(), SparseError> {
        let t = SparseTensor::new([4, 2], vec![[3, 1], [0, 0]], vec![1.0, 2.0])?;
        assert_eq!(permute_axes(&t, [1, 0])?, transpose(&t));
        Ok(())
    }

    #[test]
    fn test_permute_axes_invalid() -> Result<(), SparseError> {
        let t = SparseTensor::<u8, 3>::empty([1, 2, 3])?;
        assert!(matches!(
            permute_axes(&t, [0, 1, 3]),
            Err(SparseError::AxisOutOfRange { axis: 3, .. })
        ));
        assert!(matches!(
            permute_axes(&t, [0, 1, 1]),
            Err(SparseError::AxisOutOfRange { axis: 1, .. })
        ));
        Ok(())
    }
}
