use lattix_tensor::TensorError;
use thiserror::Error;

/// An error type for sparse tensor operations.
///
/// Every error is raised by the call that violates the contract. Inputs are
/// never modified, so a failed operation leaves every existing tensor intact.
#[derive(Error, Debug, PartialEq)]
pub enum SparseError {
    /// The operands' shapes are incompatible.
    #[error("Shape mismatch: {message}. Expected shape: {expected:?}, got: {actual:?}")]
    ShapeMismatch {
        /// Description of the mismatch
        message: String,
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        actual: Vec<usize>,
    },

    /// A coordinate does not have one component per axis, or the rank is zero.
    #[error("Rank mismatch: expected rank {expected}, got {actual}")]
    RankMismatch {
        /// Declared rank of the tensor
        expected: usize,
        /// Rank of the offending coordinate
        actual: usize,
    },

    /// A coordinate component lies outside its dimension.
    #[error("Index {index} out of bounds for axis {axis} of size {size}")]
    IndexOutOfBounds {
        /// Offending component
        index: usize,
        /// Axis of the component
        axis: usize,
        /// Size of the axis
        size: usize,
    },

    /// The number of coordinates differs from the number of values.
    #[error("Length mismatch: {indices} indices but {values} values")]
    LengthMismatch {
        /// Number of coordinates
        indices: usize,
        /// Number of values
        values: usize,
    },

    /// The inner dimensions of a matrix product disagree.
    #[error("Dimension mismatch: lhs has {lhs} columns but rhs has {rhs} rows")]
    DimensionMismatch {
        /// Inner dimension of the sparse operand
        lhs: usize,
        /// Inner dimension of the dense operand
        rhs: usize,
    },

    /// An axis argument is invalid or a slice leaves the tensor bounds.
    #[error("Axis {axis} out of range: {reason}")]
    AxisOutOfRange {
        /// Offending axis
        axis: usize,
        /// Why the axis is out of range
        reason: String,
    },

    /// A reduction region holds no explicitly stored entry.
    #[error(
        "Empty reduction over {}: no stored entries at output position {:?}",
        reduced_axes(.axis),
        .position
    )]
    EmptyReduction {
        /// Reduced axis, `None` for a full reduction
        axis: Option<usize>,
        /// Output position whose region is empty
        position: Vec<usize>,
    },

    /// Error raised by the dense tensor layer.
    #[error("Error with the dense tensor: {0}")]
    TensorError(#[from] TensorError),
}

impl SparseError {
    /// Creates a ShapeMismatch error.
    pub fn shape_mismatch(
        message: impl Into<String>,
        expected: &[usize],
        actual: &[usize],
    ) -> Self {
        Self::ShapeMismatch {
            message: message.into(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Creates an AxisOutOfRange error.
    pub fn axis_out_of_range(axis: usize, reason: impl Into<String>) -> Self {
        Self::AxisOutOfRange {
            axis,
            reason: reason.into(),
        }
    }
}

fn reduced_axes(axis: &Option<usize>) -> String {
    match axis {
        Some(axis) => format!("axis {axis}"),
        None => "all axes".to_string(),
    }
}
