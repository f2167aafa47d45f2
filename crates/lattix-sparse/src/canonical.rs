use crate::{scalar::Scalar, tensor::SparseTensor};

/// Sorts the entries of a sparse tensor into row-major order and merges duplicates.
///
/// Entries sharing a coordinate collapse into a single entry holding the sum
/// of their values, accumulated in the order they were stored. The sort is
/// stable, so the result is deterministic for a given input. A tensor that is
/// already canonical is returned as a clone.
///
/// Explicit zeros, including sums that cancel to zero, are kept.
///
/// # Example
///
/// ```
/// use lattix_sparse::{canonicalize, SparseTensor};
///
/// let t = SparseTensor::new([3], vec![[2], [0], [2]], vec![1, 4, 5]).unwrap();
/// let c = canonicalize(&t);
/// assert_eq!(c.indices(), &[[0], [2]]);
/// assert_eq!(c.values(), &[4, 6]);
/// ```
pub fn canonicalize<T, const N: usize>(t: &SparseTensor<T, N>) -> SparseTensor<T, N>
where
    T: Scalar,
{
    if t.is_canonical() {
        return t.clone();
    }

    let src_indices = t.indices();
    let src_values = t.values();

    let mut perm: Vec<usize> = (0..t.nnz()).collect();
    perm.sort_by_key(|&i| src_indices[i]);

    let mut indices: Vec<[usize; N]> = Vec::with_capacity(perm.len());
    let mut values: Vec<T> = Vec::with_capacity(perm.len());

    for &i in perm.iter() {
        let coord = src_indices[i];
        let value = src_values[i];
        match (indices.last(), values.last_mut()) {
            (Some(last), Some(acc)) if *last == coord => *acc = *acc + value,
            _ => {
                indices.push(coord);
                values.push(value);
            }
        }
    }

    log::debug!(
        "canonicalize: {} entries -> {} entries ({} merged)",
        t.nnz(),
        values.len(),
        t.nnz() - values.len()
    );

    SparseTensor::from_parts(t.shape(), indices, values)
}

#[cfg(test)]
mod tests {
    use super::canonicalize;
    use crate::{error::SparseError, tensor::SparseTensor};

    #[test]
    fn test_canonicalize_sorts_rows_first() -> Result<(), SparseError> {
        let t = SparseTensor::new(
            [3, 3],
            vec![[2, 0], [0, 2], [1, 1], [0, 0]],
            vec![1.0, 2.0, 3.0, 4.0],
        )?;
        let c = canonicalize(&t);
        assert_eq!(c.indices(), &[[0, 0], [0, 2], [1, 1], [2, 0]]);
        assert_eq!(c.values(), &[4.0, 2.0, 3.0, 1.0]);
        assert!(c.is_canonical());
        Ok(())
    }

    #[test]
    fn test_canonicalize_merges_duplicates() -> Result<(), SparseError> {
        let t = SparseTensor::new(
            [2, 2],
            vec![[1, 1], [0, 1], [1, 1], [1, 1]],
            vec![1, 2, 3, 4],
        )?;
        let c = canonicalize(&t);
        assert_eq!(c.indices(), &[[0, 1], [1, 1]]);
        assert_eq!(c.values(), &[2, 8]);
        Ok(())
    }

    #[test]
    fn test_canonicalize_keeps_cancelled_sum() -> Result<(), SparseError> {
        let t = SparseTensor::new([4], vec![[3], [3]], vec![5, -5])?;
        let c = canonicalize(&t);
        assert_eq!(c.indices(), &[[3]]);
        assert_eq!(c.values(), &[0]);
        Ok(())
    }

    #[test]
    fn test_canonicalize_idempotent() -> Result<(), SparseError> {
        let t = SparseTensor::new(
            [2, 3, 2],
            vec![[1, 2, 0], [0, 0, 1], [1, 2, 0]],
            vec![1, 2, 3],
        )?;
        let once = canonicalize(&t);
        let twice = canonicalize(&once);
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn test_canonicalize_empty() -> Result<(), SparseError> {
        let t = SparseTensor::<f32, 2>::empty([3, 3])?;
        assert_eq!(canonicalize(&t), t);
        Ok(())
    }
}
