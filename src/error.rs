//! Errors reported by the continued fraction evaluator.
//!
//! Only malformed configuration and violations of the term generator contract
//! are errors. Elements that fail to converge, or whose inputs are not finite,
//! are reported through [`Status`](crate::Status) instead so that one bad
//! element does not abort a whole batch.
use thiserror::Error;

/// Broad category of a [`ContinuedFractionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An argument was rejected before any term was evaluated
    InvalidArgument,
    /// Arrays could not be broadcast to a common shape
    Shape,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContinuedFractionError {
    /// `eps` or `tiny` is NaN, infinite, or (in linear mode) not positive.
    #[error("`eps` and `tiny` must be (or represent the logarithm of) a positive finite real number.")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error("`maxiter` must be a non-negative integer.")]
    InvalidMaxIter { maxiter: i64 },

    /// Signs are kept in the imaginary part of the logarithm, so log mode
    /// can only run over complex elements.
    #[error("log-domain evaluation requires a complex element type.")]
    RealLogDomain,

    #[error("arguments with shapes {shapes:?} cannot be broadcast together.")]
    IncompatibleArguments { shapes: Vec<Vec<usize>> },

    /// A term generator returned an array that doesn't fit the batch.
    #[error("term `{term}({n}, ..)` returned shape {found:?}, which cannot be broadcast to {expected:?}.")]
    TermShape {
        term: char,
        n: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
}

impl ContinuedFractionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTolerance { .. } | Self::InvalidMaxIter { .. } | Self::RealLogDomain => {
                ErrorKind::InvalidArgument
            }
            Self::IncompatibleArguments { .. } | Self::TermShape { .. } => ErrorKind::Shape,
        }
    }
}
