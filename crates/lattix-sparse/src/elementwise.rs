use std::cmp::Ordering;

use crate::{canonical::canonicalize, error::SparseError, scalar::Scalar, tensor::SparseTensor};

/// Options for [`add_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddOptions<T> {
    /// Output entries whose magnitude is less than or equal to this value are dropped.
    ///
    /// The default of zero drops exact zeros only. NaN results are never dropped.
    pub threshold: T,
}

impl<T: Scalar> Default for AddOptions<T> {
    fn default() -> Self {
        Self {
            threshold: T::zero(),
        }
    }
}

/// Applies `f` to every stored value, keeping coordinates and shape unchanged.
///
/// Only stored entries are visited. Missing coordinates are never passed
/// through `f`, so when `f(0) != 0` the result differs from mapping the dense
/// tensor: the missing coordinates stay zero instead of becoming `f(0)`.
///
/// # Example
///
/// ```
/// use lattix_sparse::{map_values, SparseTensor};
///
/// let t = SparseTensor::new([3], vec![[1]], vec![2.0f32]).unwrap();
/// let u = map_values(&t, |v| v + 1.0);
/// assert_eq!(u.values(), &[3.0]);
/// assert_eq!(u.get([0]), None);
/// ```
pub fn map_values<T, U, const N: usize, F>(t: &SparseTensor<T, N>, f: F) -> SparseTensor<U, N>
where
    T: Copy,
    F: Fn(T) -> U,
{
    let values = t.values().iter().map(|&v| f(v)).collect();
    SparseTensor::from_parts(t.shape(), t.indices().to_vec(), values)
}

/// Keeps the stored entries for which `predicate` returns `true`.
///
/// The order of the kept entries is unchanged.
pub fn retain<T, const N: usize, F>(t: &SparseTensor<T, N>, predicate: F) -> SparseTensor<T, N>
where
    T: Copy,
    F: Fn(&[usize; N], &T) -> bool,
{
    let (indices, values) = t
        .iter()
        .filter(|&(coord, value)| predicate(coord, value))
        .map(|(coord, value)| (*coord, *value))
        .unzip();
    SparseTensor::from_parts(t.shape(), indices, values)
}

/// Adds two sparse tensors of the same shape with the default options.
///
/// See [`add_with`].
pub fn add<T, const N: usize>(
    a: &SparseTensor<T, N>,
    b: &SparseTensor<T, N>,
) -> Result<SparseTensor<T, N>, SparseError>
where
    T: Scalar,
{
    add_with(a, b, &AddOptions::default())
}

/// Adds two sparse tensors of the same shape.
///
/// Both inputs are canonicalized and merged in a single pass over the union
/// of their coordinates. A coordinate stored in one input carries its value
/// through, a coordinate stored in both holds the sum. Any output entry whose
/// magnitude is at most `options.threshold` is dropped. The result is
/// canonical.
///
/// # Errors
///
/// Returns [`SparseError::ShapeMismatch`] if the shapes differ.
///
/// # Example
///
/// ```
/// use lattix_sparse::{add_with, AddOptions, SparseTensor};
///
/// let a = SparseTensor::new([2], vec![[0], [1]], vec![1.0, 0.5]).unwrap();
/// let b = SparseTensor::new([2], vec![[0], [1]], vec![-1.0, -0.4]).unwrap();
///
/// let c = add_with(&a, &b, &AddOptions { threshold: 0.2 }).unwrap();
/// assert!(c.is_empty());
/// ```
pub fn add_with<T, const N: usize>(
    a: &SparseTensor<T, N>,
    b: &SparseTensor<T, N>,
    options: &AddOptions<T>,
) -> Result<SparseTensor<T, N>, SparseError>
where
    T: Scalar,
{
    if a.shape() != b.shape() {
        return Err(SparseError::shape_mismatch(
            "add requires identical shapes",
            &a.shape(),
            &b.shape(),
        ));
    }

    let a = canonicalize(a);
    let b = canonicalize(b);
    let (a_idx, a_val) = (a.indices(), a.values());
    let (b_idx, b_val) = (b.indices(), b.values());

    let mut indices = Vec::with_capacity(a.nnz() + b.nnz());
    let mut values = Vec::with_capacity(a.nnz() + b.nnz());
    let mut elided = 0;

    let mut push = |coord: [usize; N], value: T| {
        if value.magnitude() <= options.threshold {
            elided += 1;
        } else {
            indices.push(coord);
            values.push(value);
        }
    };

    let (mut i, mut j) = (0, 0);
    while i < a_idx.len() && j < b_idx.len() {
        match a_idx[i].cmp(&b_idx[j]) {
            Ordering::Less => {
                push(a_idx[i], a_val[i]);
                i += 1;
            }
            Ordering::Greater => {
                push(b_idx[j], b_val[j]);
                j += 1;
            }
            Ordering::Equal => {
                push(a_idx[i], a_val[i] + b_val[j]);
                i += 1;
                j += 1;
            }
        }
    }
    for (&coord, &value) in a_idx[i..].iter().zip(&a_val[i..]) {
        push(coord, value);
    }
    for (&coord, &value) in b_idx[j..].iter().zip(&b_val[j..]) {
        push(coord, value);
    }

    log::debug!(
        "add: {} + {} entries -> {} entries ({} elided at threshold {:?})",
        a.nnz(),
        b.nnz(),
        values.len(),
        elided,
        options.threshold
    );

    Ok(SparseTensor::from_parts(a.shape(), indices, values))
}

#[cfg(test)]
mod tests {
    use super::{add, add_with, map_values, retain, AddOptions};
    use crate::{error::SparseError, tensor::SparseTensor};

    #[test]
    fn test_map_values() -> Result<(), SparseError> {
        let t = SparseTensor::new([2, 3], vec![[1, 2], [0, 0]], vec![2, -3])?;
        let u = map_values(&t, |v| v * 10);
        assert_eq!(u.indices(), t.indices());
        assert_eq!(u.values(), &[20, -30]);
        assert_eq!(u.shape(), [2, 3]);
        Ok(())
    }

    #[test]
    fn test_map_values_changes_type() -> Result<(), SparseError> {
        let t = SparseTensor::new([4], vec![[3]], vec![7u8])?;
        let u = map_values(&t, f64::from);
        assert_eq!(u.values(), &[7.0]);
        Ok(())
    }

    #[test]
    fn test_map_values_does_not_touch_missing() -> Result<(), SparseError> {
        let t = SparseTensor::new([3], vec![[0]], vec![1.0f64])?;
        let u = map_values(&t, f64::cos);
        // cos(0) = 1 but the missing coordinates stay implicit zeros
        assert_eq!(u.nnz(), 1);
        assert_eq!(u.get([1]), None);
        assert_eq!(u.get([2]), None);
        approx::assert_relative_eq!(u.values()[0], 1.0f64.cos());
        Ok(())
    }

    #[test]
    fn test_retain() -> Result<(), SparseError> {
        let t = SparseTensor::new([2, 2], vec![[1, 1], [0, 0], [0, 1]], vec![5, -1, 3])?;
        let positive = retain(&t, |_, &v| v > 0);
        assert_eq!(positive.indices(), &[[1, 1], [0, 1]]);
        assert_eq!(positive.values(), &[5, 3]);

        let diagonal = retain(&t, |&[i, j], _| i == j);
        assert_eq!(diagonal.indices(), &[[1, 1], [0, 0]]);
        Ok(())
    }

    #[test]
    fn test_add() -> Result<(), SparseError> {
        let a = SparseTensor::new([8, 10], vec![[0, 2], [3, 4]], vec![31, 2])?;
        let b = SparseTensor::new([8, 10], vec![[0, 2], [7, 0]], vec![56, 38])?;
        let c = add(&a, &b)?;
        assert_eq!(c.indices(), &[[0, 2], [3, 4], [7, 0]]);
        assert_eq!(c.values(), &[87, 2, 38]);
        Ok(())
    }

    #[test]
    fn test_add_coordinate_outside_shape() {
        let b = SparseTensor::new([4, 10], vec![[0, 2], [7, 0]], vec![56, 38]);
        assert_eq!(
            b,
            Err(SparseError::IndexOutOfBounds {
                index: 7,
                axis: 0,
                size: 4
            })
        );
    }

    #[test]
    fn test_add_unsorted_inputs() -> Result<(), SparseError> {
        let a = SparseTensor::new([3, 3], vec![[2, 2], [0, 1], [2, 2]], vec![1, 1, 1])?;
        let b = SparseTensor::new([3, 3], vec![[1, 0], [0, 1]], vec![4, 5])?;
        let c = add(&a, &b)?;
        assert_eq!(c.indices(), &[[0, 1], [1, 0], [2, 2]]);
        assert_eq!(c.values(), &[6, 4, 2]);
        assert!(c.is_canonical());
        Ok(())
    }

    #[test]
    fn test_add_drops_cancelled_entries() -> Result<(), SparseError> {
        let a = SparseTensor::new([4], vec![[0], [1]], vec![3, 4])?;
        let b = SparseTensor::new([4], vec![[1], [2]], vec![-4, 0])?;
        let c = add(&a, &b)?;
        assert_eq!(c.indices(), &[[0]]);
        assert_eq!(c.values(), &[3]);
        Ok(())
    }

    #[test]
    fn test_add_threshold() -> Result<(), SparseError> {
        let a = SparseTensor::new([3], vec![[0], [1], [2]], vec![1.0, 0.3, -2.0])?;
        let b = SparseTensor::new([3], vec![[0]], vec![-0.95])?;

        let default = add(&a, &b)?;
        assert_eq!(default.nnz(), 3);

        let c = add_with(&a, &b, &AddOptions { threshold: 0.5 })?;
        assert_eq!(c.indices(), &[[2]]);
        assert_eq!(c.values(), &[-2.0]);
        Ok(())
    }

    #[test]
    fn test_add_keeps_nan() -> Result<(), SparseError> {
        let a = SparseTensor::new([2], vec![[0]], vec![f32::NAN])?;
        let b = SparseTensor::new([2], vec![[0]], vec![1.0])?;
        let c = add_with(
            &a,
            &b,
            &AddOptions {
                threshold: f32::INFINITY,
            },
        )?;
        assert_eq!(c.nnz(), 1);
        assert!(c.values()[0].is_nan());
        Ok(())
    }

    #[test]
    fn test_add_commutative() -> Result<(), SparseError> {
        let a = SparseTensor::new([3, 2], vec![[2, 1], [0, 0], [1, 1]], vec![1, 2, 3])?;
        let b = SparseTensor::new([3, 2], vec![[1, 1], [2, 0]], vec![-3, 9])?;
        assert_eq!(add(&a, &b)?, add(&b, &a)?);
        Ok(())
    }

    #[test]
    fn test_add_shape_mismatch() -> Result<(), SparseError> {
        let a = SparseTensor::<i32, 2>::empty([3, 2])?;
        let b = SparseTensor::<i32, 2>::empty([2, 3])?;
        assert!(matches!(
            add(&a, &b),
            Err(SparseError::ShapeMismatch { .. })
        ));
        Ok(())
    }
}
