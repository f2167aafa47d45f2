use std::fmt;

use crate::{error::SparseError, scalar::Scalar};

/// A sparse tensor in coordinate-list (COO) format.
///
/// Each stored entry is a coordinate `[usize; N]` paired positionally with a
/// value. Construction validates bounds but neither sorts nor deduplicates, so
/// a freshly built tensor may hold its entries in any order and may repeat a
/// coordinate. [`crate::canonicalize`] produces the sorted, duplicate-free form.
///
/// A stored value of zero (an explicit zero) is kept as an entry and is
/// distinct from a coordinate that is not stored at all.
///
/// # Example
///
/// ```
/// use lattix_sparse::SparseTensor;
///
/// let t = SparseTensor::new([3, 10], vec![[0, 3], [2, 4]], vec![10, 20]).unwrap();
/// assert_eq!(t.nnz(), 2);
/// assert_eq!(t.get([2, 4]), Some(20));
/// assert_eq!(t.get([1, 1]), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SparseTensor<T, const N: usize> {
    shape: [usize; N],
    indices: Vec<[usize; N]>,
    values: Vec<T>,
}

/// Rejects rank-zero tensors.
pub(crate) fn ensure_rank<const N: usize>() -> Result<(), SparseError> {
    if N == 0 {
        return Err(SparseError::RankMismatch {
            expected: 1,
            actual: 0,
        });
    }
    Ok(())
}

/// Checks every component of `coord` against the matching dimension of `shape`.
pub(crate) fn check_bounds(coord: &[usize], shape: &[usize]) -> Result<(), SparseError> {
    for (axis, (&index, &size)) in coord.iter().zip(shape.iter()).enumerate() {
        if index >= size {
            return Err(SparseError::IndexOutOfBounds { index, axis, size });
        }
    }
    Ok(())
}

impl<T, const N: usize> SparseTensor<T, N> {
    /// Creates a new sparse tensor from its coordinates and values.
    ///
    /// # Arguments
    ///
    /// * `shape` - The size of each axis.
    /// * `indices` - One coordinate per stored entry.
    /// * `values` - One value per stored entry, aligned with `indices`.
    ///
    /// # Errors
    ///
    /// * [`SparseError::LengthMismatch`] if `indices` and `values` differ in length.
    /// * [`SparseError::IndexOutOfBounds`] if a coordinate component exceeds its dimension.
    /// * [`SparseError::RankMismatch`] if the tensor has rank zero.
    pub fn new(
        shape: [usize; N],
        indices: Vec<[usize; N]>,
        values: Vec<T>,
    ) -> Result<Self, SparseError> {
        ensure_rank::<N>()?;

        if indices.len() != values.len() {
            return Err(SparseError::LengthMismatch {
                indices: indices.len(),
                values: values.len(),
            });
        }

        for coord in indices.iter() {
            check_bounds(coord, &shape)?;
        }

        Ok(Self {
            shape,
            indices,
            values,
        })
    }

    /// Creates a new sparse tensor from coordinates whose length is only known at runtime.
    ///
    /// This is the entry point for coordinates coming from an untyped source,
    /// such as a deserializer or a dataset pipeline.
    ///
    /// # Errors
    ///
    /// Same as [`SparseTensor::new`], plus [`SparseError::RankMismatch`] if a
    /// coordinate does not have exactly `N` components.
    ///
    /// # Example
    ///
    /// ```
    /// use lattix_sparse::{SparseError, SparseTensor};
    ///
    /// let err = SparseTensor::from_coords([2, 2], &[vec![0, 1, 1]], vec![1.0]).unwrap_err();
    /// assert_eq!(err, SparseError::RankMismatch { expected: 2, actual: 3 });
    /// ```
    pub fn from_coords<C: AsRef<[usize]>>(
        shape: [usize; N],
        indices: &[C],
        values: Vec<T>,
    ) -> Result<Self, SparseError> {
        let mut coords = Vec::with_capacity(indices.len());
        for coord in indices {
            let coord: [usize; N] =
                coord
                    .as_ref()
                    .try_into()
                    .map_err(|_| SparseError::RankMismatch {
                        expected: N,
                        actual: coord.as_ref().len(),
                    })?;
            coords.push(coord);
        }
        Self::new(shape, coords, values)
    }

    /// Creates a sparse tensor with no stored entries.
    pub fn empty(shape: [usize; N]) -> Result<Self, SparseError> {
        ensure_rank::<N>()?;
        Ok(Self {
            shape,
            indices: Vec::new(),
            values: Vec::new(),
        })
    }

    /// Builds a tensor from parts that are already known to be valid.
    pub(crate) fn from_parts(shape: [usize; N], indices: Vec<[usize; N]>, values: Vec<T>) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        Self {
            shape,
            indices,
            values,
        }
    }

    /// The size of each axis.
    #[inline]
    pub fn shape(&self) -> [usize; N] {
        self.shape
    }

    /// The stored coordinates, in storage order.
    #[inline]
    pub fn indices(&self) -> &[[usize; N]] {
        &self.indices
    }

    /// The stored values, aligned with [`SparseTensor::indices`].
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Consumes the tensor and returns its shape, coordinates and values.
    pub fn into_parts(self) -> ([usize; N], Vec<[usize; N]>, Vec<T>) {
        (self.shape, self.indices, self.values)
    }

    /// Iterates over the stored `(coordinate, value)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&[usize; N], &T)> {
        self.indices.iter().zip(self.values.iter())
    }

    /// The number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        N
    }

    /// The number of stored entries, duplicates and explicit zeros included.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// The number of elements of the dense-equivalent tensor.
    #[inline]
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether the tensor stores no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Ratio of stored entries to dense elements, `0.0` for a tensor with no elements.
    pub fn density(&self) -> f64 {
        let numel = self.numel();
        if numel == 0 {
            return 0.0;
        }
        self.nnz() as f64 / numel as f64
    }

    /// `1.0 - density`.
    pub fn sparsity(&self) -> f64 {
        1.0 - self.density()
    }

    /// Whether the coordinates are strictly increasing in row-major order.
    ///
    /// Strictly increasing implies there are no duplicate coordinates.
    pub fn is_canonical(&self) -> bool {
        self.indices.windows(2).all(|w| w[0] < w[1])
    }
}

impl<T: Scalar, const N: usize> SparseTensor<T, N> {
    /// Reads the dense-equivalent value at `coord` without materializing the tensor.
    ///
    /// Duplicate entries at `coord` are summed. Returns `None` when nothing is
    /// stored at `coord` or when `coord` lies outside the shape.
    pub fn get(&self, coord: [usize; N]) -> Option<T> {
        if check_bounds(&coord, &self.shape).is_err() {
            return None;
        }
        self.iter()
            .filter(|(c, _)| **c == coord)
            .map(|(_, v)| *v)
            .reduce(|acc, v| acc + v)
    }
}

impl<T: fmt::Display, const N: usize> fmt::Display for SparseTensor<T, N> {
    /// Renders the shape followed by one `coordinate: value` line per entry in storage order.
    ///
    /// ```text
    /// <SparseTensor shape=[3, 10]
    ///  values={
    ///   [0, 3]: 10
    ///   [2, 4]: 20}>
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<SparseTensor shape={:?}\n values={{", self.shape)?;
        for (coord, value) in self.iter() {
            write!(f, "\n  {:?}: {}", coord, value)?;
        }
        write!(f, "}}>")
    }
}
