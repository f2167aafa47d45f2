use crate::{error::SparseError, tensor::SparseTensor};

/// Extracts the box `[start, start + size)` of a sparse tensor.
///
/// Entries inside the box are kept in their original order and rebased by
/// subtracting `start`. The output shape is exactly `size`; a size of zero on
/// any axis yields an empty tensor.
///
/// # Errors
///
/// Returns [`SparseError::AxisOutOfRange`] if `start[i] + size[i]` exceeds
/// `shape[i]` on some axis.
///
/// # Example
///
/// ```
/// use lattix_sparse::{slice, SparseTensor};
///
/// let t = SparseTensor::new([4, 4], vec![[0, 0], [1, 2], [3, 3]], vec![1, 2, 3]).unwrap();
/// let s = slice(&t, [1, 1], [2, 3]).unwrap();
/// assert_eq!(s.shape(), [2, 3]);
/// assert_eq!(s.indices(), &[[0, 1]]);
/// assert_eq!(s.values(), &[2]);
/// ```
pub fn slice<T, const N: usize>(
    t: &SparseTensor<T, N>,
    start: [usize; N],
    size: [usize; N],
) -> Result<SparseTensor<T, N>, SparseError>
where
    T: Copy,
{
    let shape = t.shape();
    let mut end = [0; N];
    for axis in 0..N {
        end[axis] = match start[axis].checked_add(size[axis]) {
            Some(e) if e <= shape[axis] => e,
            _ => {
                return Err(SparseError::axis_out_of_range(
                    axis,
                    format!(
                        "slice start {} with size {} exceeds dimension {}",
                        start[axis], size[axis], shape[axis]
                    ),
                ))
            }
        };
    }

    let mut indices = Vec::new();
    let mut values = Vec::new();
    for (coord, &value) in t.iter() {
        let inside = (0..N).all(|i| start[i] <= coord[i] && coord[i] < end[i]);
        if inside {
            let mut rebased = *coord;
            rebased
                .iter_mut()
                .zip(start.iter())
                .for_each(|(c, s)| *c -= s);
            indices.push(rebased);
            values.push(value);
        }
    }

    log::debug!(
        "slice: {:?} at {:?} -> {} of {} entries kept",
        size,
        start,
        values.len(),
        t.nnz()
    );

    Ok(SparseTensor::from_parts(size, indices, values))
}
