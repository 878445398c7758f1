//! Error types for lanevec operations.
//!
//! Every failure is local to the call that violated a contract: nothing is
//! retried internally and nothing is recorded in global state. Floating-point
//! edge cases (NaN, infinities, signed zeros) are values, never errors.

use thiserror::Error;

use crate::simd::element::ElementKind;

/// Errors that can occur during lanevec operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanevecError {
    /// The requested element kind / bit width combination is not available.
    #[error("Unsupported shape: no {bits}-bit species for element kind {kind}")]
    UnsupportedShape {
        /// Element kind of the requested species.
        kind: ElementKind,
        /// Requested vector width in bits.
        bits: usize,
    },
    /// Operands do not share a species, or a conversion part is out of range.
    #[error("Shape mismatch: {message}")]
    ShapeMismatch {
        /// Human-readable error message.
        message: String,
    },
    /// A lane index lies outside `[0, lane_count)`.
    #[error("Lane index {index} out of range for {lane_count} lanes")]
    IndexOutOfRange {
        /// The offending index.
        index: i64,
        /// Lane count of the species.
        lane_count: usize,
    },
    /// A shuffle selector lies outside `[-lane_count, lane_count)`.
    #[error("Invalid shuffle index {index}: selectors must lie in [-{lane_count}, {lane_count})")]
    InvalidIndex {
        /// The offending selector.
        index: i64,
        /// Lane count of the species.
        lane_count: usize,
    },
    /// Integer division by zero on an active lane.
    #[error("Arithmetic error in lane {lane}: {message}")]
    ArithmeticError {
        /// First lane that faulted.
        lane: usize,
        /// Human-readable error message.
        message: String,
    },
    /// A memory transfer would touch elements outside the supplied buffer.
    #[error("Out of bounds: element {index} is outside a buffer of length {len}")]
    OutOfBounds {
        /// First offending element (or byte) index.
        index: i64,
        /// Length of the supplied buffer.
        len: usize,
    },
    /// The operation is not meaningful for this element kind or width.
    #[error("Unsupported operation: {message}")]
    UnsupportedOperation {
        /// Human-readable error message.
        message: String,
    },
}

/// Result type alias for lanevec operations.
pub type Result<T> = std::result::Result<T, LanevecError>;

/// Creates an unsupported-shape error.
pub fn unsupported_shape(kind: ElementKind, bits: usize) -> LanevecError {
    LanevecError::UnsupportedShape { kind, bits }
}

/// Creates a shape-mismatch error.
pub fn shape_mismatch(message: impl Into<String>) -> LanevecError {
    LanevecError::ShapeMismatch {
        message: message.into(),
    }
}

/// Creates a lane index error.
pub fn index_out_of_range(index: impl Into<i64>, lane_count: usize) -> LanevecError {
    LanevecError::IndexOutOfRange {
        index: index.into(),
        lane_count,
    }
}

/// Creates a shuffle selector error.
pub fn invalid_index(index: impl Into<i64>, lane_count: usize) -> LanevecError {
    LanevecError::InvalidIndex {
        index: index.into(),
        lane_count,
    }
}

/// Creates an arithmetic error for the given lane.
pub fn arithmetic_error(lane: usize, message: impl Into<String>) -> LanevecError {
    LanevecError::ArithmeticError {
        lane,
        message: message.into(),
    }
}

/// Creates an out-of-bounds memory error.
pub fn out_of_bounds(index: i64, len: usize) -> LanevecError {
    LanevecError::OutOfBounds { index, len }
}

/// Creates an unsupported-operation error.
pub fn unsupported_operation(message: impl Into<String>) -> LanevecError {
    LanevecError::UnsupportedOperation {
        message: message.into(),
    }
}

/// Converts a `usize` index into the `i64` carried by errors.
pub(crate) fn as_index(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}
