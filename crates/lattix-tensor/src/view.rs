use crate::{
    allocator::TensorAllocator,
    storage::TensorStorage,
    tensor::{next_index, TensorError},
    Tensor,
};

/// A non-owning view into tensor data.
///
/// A view borrows the storage of a [`Tensor`] with its own shape and strides,
/// which is how reshapes and axis permutations avoid copying.
///
/// # Examples
///
/// ```rust
/// use lattix_tensor::{CpuAllocator, Tensor};
///
/// let tensor = Tensor::<i32, 2, _>::from_shape_vec([2, 2], vec![1, 2, 3, 4], CpuAllocator).unwrap();
/// let contiguous = tensor.permute_axes([1, 0]).as_contiguous().unwrap();
/// assert_eq!(contiguous.as_slice(), &[1, 3, 2, 4]);
/// ```
pub struct TensorView<'a, T, const N: usize, A: TensorAllocator> {
    /// Reference to the storage held by another tensor.
    pub storage: &'a TensorStorage<T, A>,

    /// The shape of the tensor view.
    pub shape: [usize; N],

    /// The strides for accessing elements in the view.
    pub strides: [usize; N],
}

impl<T, const N: usize, A: TensorAllocator> TensorView<'_, T, N, A> {
    /// Returns the whole underlying storage, ignoring the view's strides.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Returns the number of elements visible through the view.
    #[inline]
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Gets the element at the given index without bounds checking against the shape.
    ///
    /// # Panics
    ///
    /// Panics if the computed offset falls outside the storage.
    pub fn get_unchecked(&self, index: [usize; N]) -> &T {
        let offset = index
            .iter()
            .zip(self.strides.iter())
            .fold(0, |acc, (&i, &s)| acc + i * s);
        &self.storage.as_slice()[offset]
    }

    /// Gets the element at the given index, or `None` if it is out of bounds.
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        if index.iter().zip(self.shape.iter()).any(|(&i, &d)| i >= d) {
            return None;
        }
        Some(self.get_unchecked(index))
    }

    /// Copies the visible elements into a new row-major tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if the new storage cannot be allocated.
    pub fn as_contiguous(&self) -> Result<Tensor<T, N, A>, TensorError>
    where
        T: Clone,
    {
        let mut data = Vec::with_capacity(self.numel());
        if self.numel() > 0 {
            let mut index = [0; N];
            loop {
                data.push(self.get_unchecked(index).clone());
                if !next_index(&mut index, &self.shape) {
                    break;
                }
            }
        }
        Tensor::from_shape_vec(self.shape, data, self.storage.alloc().clone())
    }
}
