use thiserror::Error;

use super::{
    allocator::{TensorAllocator, TensorAllocatorError},
    storage::TensorStorage,
    view::TensorView,
};

/// Errors raised while building or indexing a dense tensor.
#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    /// The element count implied by a shape differs from the data length.
    #[error("Invalid shape: the shape holds {expected} elements but {actual} were given")]
    InvalidShape {
        /// Product of the shape dimensions
        expected: usize,
        /// Length of the data
        actual: usize,
    },

    /// A linear position is not smaller than the element count.
    #[error("Position {index} out of bounds for a tensor of {size} elements")]
    IndexOutOfBounds {
        /// Requested position
        index: usize,
        /// Number of elements
        size: usize,
    },

    /// The backing memory could not be allocated.
    #[error("Storage error: {0}")]
    StorageError(#[from] TensorAllocatorError),

    /// Two shapes or layouts are incompatible.
    #[error("Dimension mismatch: {message}. Expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being checked
        message: String,
        /// Expected shape or strides, formatted
        expected: String,
        /// Actual shape or strides, formatted
        actual: String,
    },
}

impl TensorError {
    /// Creates an InvalidShape error.
    pub fn invalid_shape(expected: usize, actual: usize) -> Self {
        Self::InvalidShape { expected, actual }
    }

    /// Creates an IndexOutOfBounds error.
    pub fn index_out_of_bounds(index: usize, size: usize) -> Self {
        Self::IndexOutOfBounds { index, size }
    }

    /// Creates a DimensionMismatch error, formatting both sides with `Debug`.
    pub fn dimension_mismatch(
        message: impl Into<String>,
        expected: &[usize],
        actual: &[usize],
    ) -> Self {
        Self::DimensionMismatch {
            message: message.into(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }
}

/// Computes the strides for a row-major (C-contiguous) tensor layout.
///
/// The rightmost dimension has stride 1 and each dimension's stride is the
/// product of all dimensions to its right.
///
/// # Examples
///
/// ```rust
/// use lattix_tensor::tensor::get_strides_from_shape;
///
/// assert_eq!(get_strides_from_shape([2, 3]), [3, 1]);
/// assert_eq!(get_strides_from_shape([2, 3, 4]), [12, 4, 1]);
/// ```
pub fn get_strides_from_shape<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides = [1; N];
    for dim in (1..N).rev() {
        strides[dim - 1] = strides[dim] * shape[dim];
    }
    strides
}

/// Advances `index` to the next position in row-major order.
///
/// Returns `false` once every position of `shape` has been visited.
pub fn next_index<const N: usize>(index: &mut [usize; N], shape: &[usize; N]) -> bool {
    for dim in (0..N).rev() {
        index[dim] += 1;
        if index[dim] < shape[dim] {
            return true;
        }
        index[dim] = 0;
    }
    false
}

/// A dense multi-dimensional array.
///
/// The elements live in a reference-counted [`TensorStorage`] and are
/// addressed through `shape` and `strides`. Cloning a tensor shares the
/// storage. The rank `N` is fixed at compile time and the allocator `A` owns
/// the memory.
///
/// # Examples
///
/// ```rust
/// use lattix_tensor::{CpuAllocator, Tensor2};
///
/// let t = Tensor2::<u8, _>::from_shape_vec([2, 2], vec![1, 2, 3, 4], CpuAllocator).unwrap();
/// assert_eq!(t.shape, [2, 2]);
/// assert_eq!(t.get([1, 0]), Some(&3));
/// ```
pub struct Tensor<T, const N: usize, A: TensorAllocator> {
    /// Shared element buffer.
    pub storage: TensorStorage<T, A>,
    /// Size of each axis.
    pub shape: [usize; N],
    /// Distance in elements between neighbours along each axis.
    pub strides: [usize; N],
}

impl<T, const N: usize, A: TensorAllocator> Tensor<T, N, A> {
    /// Get the data of the tensor as a slice, in storage order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Get the data of the tensor as a mutable slice.
    ///
    /// Shared storage is copied before it is handed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy cannot be allocated.
    #[inline]
    pub fn as_slice_mut(&mut self) -> Result<&mut [T], TensorError>
    where
        T: Clone,
    {
        Ok(self.storage.as_mut_slice()?)
    }

    /// Get the data of the tensor as a pointer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Creates a new `Tensor` with the given shape and data.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape of the tensor, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use lattix_tensor::{CpuAllocator, Tensor2};
    ///
    /// let t = Tensor2::<u8, _>::from_shape_vec([2, 2], vec![1, 2, 3, 4], CpuAllocator).unwrap();
    /// assert_eq!(t.strides, [2, 1]);
    /// ```
    pub fn from_shape_vec(shape: [usize; N], data: Vec<T>, alloc: A) -> Result<Self, TensorError> {
        let numel = shape.iter().product::<usize>();
        if numel != data.len() {
            return Err(TensorError::invalid_shape(numel, data.len()));
        }
        let storage = TensorStorage::from_vec(data, alloc)?;
        let strides = get_strides_from_shape(shape);
        Ok(Self {
            storage,
            shape,
            strides,
        })
    }

    /// Creates a new `Tensor` with the given shape and slice of data.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape of the tensor, an error is returned.
    pub fn from_shape_slice(shape: [usize; N], data: &[T], alloc: A) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        Self::from_shape_vec(shape, data.to_vec(), alloc)
    }

    /// Creates a new `Tensor` with every element set to `value`.
    ///
    /// # Example
    ///
    /// ```
    /// use lattix_tensor::{CpuAllocator, Tensor2};
    ///
    /// let t = Tensor2::<u8, _>::from_shape_val([2, 2], 1, CpuAllocator).unwrap();
    /// assert_eq!(t.as_slice(), &[1, 1, 1, 1]);
    /// ```
    pub fn from_shape_val(shape: [usize; N], value: T, alloc: A) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        let numel = shape.iter().product::<usize>();
        Self::from_shape_vec(shape, vec![value; numel], alloc)
    }

    /// Create a new `Tensor` with the given shape and a function to generate the data.
    ///
    /// The function `f` is called with the index of each element in row-major order.
    ///
    /// # Example
    ///
    /// ```
    /// use lattix_tensor::{CpuAllocator, Tensor2};
    ///
    /// let t = Tensor2::<u8, _>::from_shape_fn([2, 2], CpuAllocator, |[i, j]| (i * 2 + j) as u8).unwrap();
    /// assert_eq!(t.as_slice(), &[0, 1, 2, 3]);
    /// ```
    pub fn from_shape_fn<F>(shape: [usize; N], alloc: A, f: F) -> Result<Self, TensorError>
    where
        F: Fn([usize; N]) -> T,
    {
        let numel = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(numel);
        if numel > 0 {
            let mut index = [0; N];
            loop {
                data.push(f(index));
                if !next_index(&mut index, &shape) {
                    break;
                }
            }
        }
        Self::from_shape_vec(shape, data, alloc)
    }

    /// Create a new tensor with all elements set to zero.
    pub fn zeros(shape: [usize; N], alloc: A) -> Result<Self, TensorError>
    where
        T: Clone + num_traits::Zero,
    {
        Self::from_shape_val(shape, T::zero(), alloc)
    }

    /// Returns the number of elements in the tensor.
    #[inline]
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Get the storage offset of the element at the given index, or `None` if the
    /// index is out of bounds.
    pub fn get_iter_offset(&self, index: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for ((&idx, dim_size), stride) in index.iter().zip(self.shape).zip(self.strides) {
            if idx >= dim_size {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// Get the storage offset of the element at the given index without checking dim sizes.
    pub fn get_iter_offset_unchecked(&self, index: [usize; N]) -> usize {
        index
            .iter()
            .zip(self.strides)
            .fold(0, |acc, (&idx, stride)| acc + idx * stride)
    }

    /// Get the index of the element at the given row-major position. The reverse
    /// of [`Self::get_iter_offset_unchecked`] for standard-layout tensors.
    pub fn get_index_unchecked(&self, offset: usize) -> [usize; N] {
        let strides = get_strides_from_shape(self.shape);
        let mut idx = [0; N];
        let mut rem = offset;
        for (dim_i, &s) in strides.iter().enumerate() {
            if s == 0 {
                break;
            }
            idx[dim_i] = rem / s;
            rem %= s;
        }
        idx
    }

    /// Get the index of the element at the given row-major position.
    ///
    /// # Errors
    ///
    /// If the offset is out of bounds (>= numel), an error is returned.
    pub fn get_index(&self, offset: usize) -> Result<[usize; N], TensorError> {
        let numel = self.numel();
        if offset >= numel {
            return Err(TensorError::index_out_of_bounds(offset, numel));
        }
        Ok(self.get_index_unchecked(offset))
    }

    /// Get the element at the given index without checking if the index is out of bounds.
    ///
    /// # Panics
    ///
    /// Panics if the computed offset falls outside the storage.
    pub fn get_unchecked(&self, index: [usize; N]) -> &T {
        let offset = self.get_iter_offset_unchecked(index);
        &self.storage.as_slice()[offset]
    }

    /// Get the element at the given index, or `None` if it is out of bounds.
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.get_iter_offset(index)
            .and_then(|i| self.storage.as_slice().get(i))
    }

    /// Reshape the tensor to a new shape.
    ///
    /// # Errors
    ///
    /// If the number of elements in the new shape does not match, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use lattix_tensor::{CpuAllocator, Tensor1};
    ///
    /// let t = Tensor1::<u8, _>::from_shape_vec([4], vec![1, 2, 3, 4], CpuAllocator).unwrap();
    /// let view = t.reshape([2, 2]).unwrap();
    /// assert_eq!(view.shape, [2, 2]);
    /// assert_eq!(*view.get_unchecked([1, 0]), 3);
    /// ```
    pub fn reshape<const M: usize>(
        &self,
        shape: [usize; M],
    ) -> Result<TensorView<'_, T, M, A>, TensorError> {
        let numel = shape.iter().product::<usize>();
        if numel != self.numel() {
            return Err(TensorError::dimension_mismatch(
                "Reshape operation requires same number of elements",
                &shape,
                &self.shape,
            ));
        }
        if !self.is_standard_layout() {
            return Err(TensorError::dimension_mismatch(
                "Reshape operation requires a standard layout",
                &get_strides_from_shape(self.shape),
                &self.strides,
            ));
        }

        Ok(TensorView {
            storage: &self.storage,
            shape,
            strides: get_strides_from_shape(shape),
        })
    }

    /// Permutes (reorders) the dimensions of the tensor.
    ///
    /// `axes[i]` is the source dimension that becomes the i-th dimension of the view.
    pub fn permute_axes(&self, axes: [usize; N]) -> TensorView<'_, T, N, A> {
        let mut new_shape = [0; N];
        let mut new_strides = [0; N];
        for (i, &axis) in axes.iter().enumerate() {
            new_shape[i] = self.shape[axis];
            new_strides[i] = self.strides[axis];
        }

        TensorView {
            storage: &self.storage,
            shape: new_shape,
            strides: new_strides,
        }
    }

    /// Return a view of the tensor.
    pub fn view(&self) -> TensorView<'_, T, N, A> {
        TensorView {
            storage: &self.storage,
            shape: self.shape,
            strides: self.strides,
        }
    }

    /// Apply a function to each element of the tensor.
    ///
    /// # Example
    ///
    /// ```
    /// use lattix_tensor::{CpuAllocator, Tensor1};
    ///
    /// let t = Tensor1::<u8, _>::from_shape_vec([4], vec![1, 2, 3, 4], CpuAllocator).unwrap();
    /// let t2 = t.map(|x| *x + 1).unwrap();
    /// assert_eq!(t2.as_slice(), &[2, 3, 4, 5]);
    /// ```
    pub fn map<U, F>(&self, f: F) -> Result<Tensor<U, N, A>, TensorError>
    where
        F: Fn(&T) -> U,
    {
        let data: Vec<U> = self.as_slice().iter().map(f).collect();
        let storage = TensorStorage::from_vec(data, self.storage.alloc().clone())?;

        Ok(Tensor {
            storage,
            shape: self.shape,
            strides: self.strides,
        })
    }

    /// Checks if the tensor has a standard contiguous (row-major) memory layout.
    pub fn is_standard_layout(&self) -> bool {
        self.strides == get_strides_from_shape(self.shape)
    }

    /// Converts the tensor to standard contiguous (row-major) memory layout.
    ///
    /// Returns a cheap clone when the layout is already standard.
    ///
    /// # Errors
    ///
    /// Returns an error if the new storage cannot be allocated.
    pub fn to_standard_layout(&self) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        if self.is_standard_layout() {
            return Ok(self.clone());
        }
        self.view().as_contiguous()
    }

    /// Perform an element-wise operation on two tensors of the same shape.
    ///
    /// # Example
    ///
    /// ```
    /// use lattix_tensor::{CpuAllocator, Tensor1};
    ///
    /// let t1 = Tensor1::<u8, _>::from_shape_vec([4], vec![1, 2, 3, 4], CpuAllocator).unwrap();
    /// let t2 = Tensor1::<u8, _>::from_shape_vec([4], vec![1, 2, 3, 4], CpuAllocator).unwrap();
    /// let t3 = t1.element_wise_op(&t2, |a, b| *a + *b).unwrap();
    /// assert_eq!(t3.as_slice(), &[2, 4, 6, 8]);
    /// ```
    pub fn element_wise_op<F>(&self, other: &Tensor<T, N, A>, op: F) -> Result<Self, TensorError>
    where
        F: Fn(&T, &T) -> T,
    {
        if self.shape != other.shape {
            return Err(TensorError::dimension_mismatch(
                "Element-wise operations require identical shapes",
                &self.shape,
                &other.shape,
            ));
        }

        let data = if self.strides == other.strides {
            self.as_slice()
                .iter()
                .zip(other.as_slice().iter())
                .map(|(a, b)| op(a, b))
                .collect()
        } else {
            let mut data = Vec::with_capacity(self.numel());
            if self.numel() > 0 {
                let mut index = [0; N];
                loop {
                    data.push(op(self.get_unchecked(index), other.get_unchecked(index)));
                    if !next_index(&mut index, &self.shape) {
                        break;
                    }
                }
            }
            return Tensor::from_shape_vec(self.shape, data, self.storage.alloc().clone());
        };

        let storage = TensorStorage::from_vec(data, self.storage.alloc().clone())?;

        Ok(Tensor {
            storage,
            shape: self.shape,
            strides: self.strides,
        })
    }
}

impl<T, const N: usize, A: TensorAllocator> Clone for Tensor<T, N, A> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            shape: self.shape,
            strides: self.strides,
        }
    }
}

impl<T, const N: usize, A: TensorAllocator> std::fmt::Debug for Tensor<T, N, A>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("data", &self.as_slice())
            .finish()
    }
}

/// Two tensors are equal when they have the same shape and the same element at
/// every index, whatever their strides.
impl<T, const N: usize, A: TensorAllocator> PartialEq for Tensor<T, N, A>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        if self.shape != other.shape {
            return false;
        }
        if self.strides == other.strides {
            return self.as_slice() == other.as_slice();
        }
        if self.numel() == 0 {
            return true;
        }
        let mut index = [0; N];
        loop {
            if self.get_unchecked(index) != other.get_unchecked(index) {
                return false;
            }
            if !next_index(&mut index, &self.shape) {
                return true;
            }
        }
    }
}

impl<T, const N: usize, A: TensorAllocator> std::fmt::Display for Tensor<T, N, A>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn write_axis<T: std::fmt::Display, const N: usize, A: TensorAllocator>(
            t: &Tensor<T, N, A>,
            f: &mut std::fmt::Formatter<'_>,
            index: &mut [usize; N],
            dim: usize,
        ) -> std::fmt::Result {
            if dim == N {
                return write!(f, "{}", t.get_unchecked(*index));
            }
            write!(f, "[")?;
            for i in 0..t.shape[dim] {
                if i > 0 {
                    if dim + 1 == N {
                        write!(f, ", ")?;
                    } else {
                        write!(f, ",\n{}", " ".repeat(dim + 1))?;
                    }
                }
                index[dim] = i;
                write_axis(t, f, index, dim + 1)?;
            }
            index[dim] = 0;
            write!(f, "]")
        }

        let mut index = [0; N];
        write_axis(self, f, &mut index, 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::allocator::CpuAllocator;
    use crate::tensor::{next_index, TensorError};
    use crate::{Tensor, Tensor1, Tensor2, Tensor3};

    #[test]
    fn constructor_1d() -> Result<(), TensorError> {
        let t = Tensor1::<u8, _>::from_shape_vec([1], vec![1], CpuAllocator)?;
        assert_eq!(t.shape, [1]);
        assert_eq!(t.as_slice(), &[1]);
        assert_eq!(t.strides, [1]);
        assert_eq!(t.numel(), 1);
        Ok(())
    }

    #[test]
    fn constructor_3d() -> Result<(), TensorError> {
        let t = Tensor3::<u8, _>::from_shape_val([2, 1, 3], 2, CpuAllocator)?;
        assert_eq!(t.strides, [3, 3, 1]);
        assert_eq!(t.as_slice(), &[2; 6]);
        Ok(())
    }

    #[test]
    fn constructor_invalid_shape() {
        let res = Tensor2::<u8, _>::from_shape_vec([2, 3], vec![1, 2, 3, 4, 5], CpuAllocator);
        assert_eq!(res.err(), Some(TensorError::invalid_shape(6, 5)));
    }

    #[test]
    fn zero_sized_dimension() -> Result<(), TensorError> {
        let t = Tensor2::<f32, _>::zeros([3, 0], CpuAllocator)?;
        assert_eq!(t.numel(), 0);
        assert!(t.as_slice().is_empty());
        assert!(t.get([0, 0]).is_none());
        let f = Tensor2::<f32, _>::from_shape_fn([0, 4], CpuAllocator, |_| 1.0)?;
        assert_eq!(f.numel(), 0);
        Ok(())
    }

    #[test]
    fn get_2d() -> Result<(), TensorError> {
        let t = Tensor2::<u8, _>::from_shape_vec([2, 2], vec![1, 2, 3, 4], CpuAllocator)?;
        assert_eq!(t.get([0, 0]), Some(&1));
        assert_eq!(t.get([0, 1]), Some(&2));
        assert_eq!(t.get([1, 0]), Some(&3));
        assert_eq!(t.get([1, 1]), Some(&4));
        assert!(t.get([2, 0]).is_none());
        assert!(t.get([0, 2]).is_none());
        Ok(())
    }

    #[test]
    fn get_index_roundtrip() -> Result<(), TensorError> {
        let t = Tensor3::<u8, _>::zeros([2, 3, 4], CpuAllocator)?;
        for offset in 0..t.numel() {
            let idx = t.get_index(offset)?;
            assert_eq!(t.get_iter_offset(idx), Some(offset));
        }
        assert_eq!(
            t.get_index(24),
            Err(TensorError::index_out_of_bounds(24, 24))
        );
        Ok(())
    }

    #[test]
    fn next_index_row_major() {
        let shape = [2, 2];
        let mut index = [0, 0];
        let mut seen = vec![index];
        while next_index(&mut index, &shape) {
            seen.push(index);
        }
        assert_eq!(seen, vec![[0, 0], [0, 1], [1, 0], [1, 1]]);
    }

    #[test]
    fn reshape_view() -> Result<(), TensorError> {
        let t = Tensor1::<u8, _>::from_shape_vec([4], vec![1, 2, 3, 4], CpuAllocator)?;
        let view = t.reshape([2, 2])?;
        assert_eq!(view.strides, [2, 1]);
        assert_eq!(view.as_contiguous()?.as_slice(), &[1, 2, 3, 4]);
        assert!(t.reshape([3]).is_err());
        Ok(())
    }

    #[test]
    fn permute_and_standard_layout() -> Result<(), TensorError> {
        let t = Tensor2::<u8, _>::from_shape_vec([2, 3], vec![1, 2, 3, 4, 5, 6], CpuAllocator)?;
        let transposed = t.permute_axes([1, 0]).as_contiguous()?;
        assert_eq!(transposed.shape, [3, 2]);
        assert_eq!(transposed.as_slice(), &[1, 4, 2, 5, 3, 6]);

        let mut strided = t.clone();
        strided.shape = [3, 2];
        strided.strides = [1, 3];
        assert!(!strided.is_standard_layout());
        let standard = strided.to_standard_layout()?;
        assert!(standard.is_standard_layout());
        assert_eq!(standard, transposed);
        Ok(())
    }

    #[test]
    fn map_and_element_wise() -> Result<(), TensorError> {
        let t1 = Tensor1::<i32, _>::from_shape_vec([4], vec![1, 2, 3, 4], CpuAllocator)?;
        let t2 = t1.map(|x| x * 10)?;
        assert_eq!(t2.as_slice(), &[10, 20, 30, 40]);

        let sum = t1.element_wise_op(&t2, |a, b| a + b)?;
        assert_eq!(sum.as_slice(), &[11, 22, 33, 44]);

        let other = Tensor1::<i32, _>::zeros([3], CpuAllocator)?;
        assert!(t1.element_wise_op(&other, |a, b| a + b).is_err());
        Ok(())
    }

    #[test]
    fn as_slice_mut_copies_shared_storage() -> Result<(), TensorError> {
        let t1 = Tensor1::<i32, _>::from_shape_vec([3], vec![1, 2, 3], CpuAllocator)?;
        let mut t2 = t1.clone();
        t2.as_slice_mut()?[1] = 7;
        assert_eq!(t1.as_slice(), &[1, 2, 3]);
        assert_eq!(t2.as_slice(), &[1, 7, 3]);
        Ok(())
    }

    #[test]
    fn display_2d() -> Result<(), TensorError> {
        let t = Tensor::<i32, 2, _>::from_shape_vec([2, 3], vec![1, 2, 3, 4, 5, 6], CpuAllocator)?;
        assert_eq!(t.to_string(), "[[1, 2, 3],\n [4, 5, 6]]");
        Ok(())
    }
}
