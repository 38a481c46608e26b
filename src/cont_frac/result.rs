use ndarray::ArrayD;
use crate::traits::Element;

/// State of a single element of the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// The relative change of the value dropped below `eps`
    Converged,
    /// The iteration budget ran out before convergence
    MaxIterReached,
    /// The input or the running value is not a valid number
    InvalidValue,
    /// Still iterating. Never present in a returned result.
    InProgress,
}

impl Status {
    /// Integer status code: 0, -2, -3 and 1 respectively
    #[inline]
    pub fn code(self) -> i32 {
        match self {
            Status::Converged => 0,
            Status::MaxIterReached => -2,
            Status::InvalidValue => -3,
            Status::InProgress => 1,
        }
    }

    #[inline]
    pub fn is_success(self) -> bool {
        self == Status::Converged
    }

    /// Whether the element is frozen
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != Status::InProgress
    }
}

/// Outcome of [continued_fraction()][crate::continued_fraction]
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuedFractionResult<T> {
    /// Value of the continued fraction (its logarithm in log mode)
    pub f: ArrayD<T>,
    /// Number of iterations executed over the whole batch
    pub nit: usize,
    /// Number of times each of `a` and `b` was called
    pub nfev: usize,
    pub status: ArrayD<Status>,
    pub success: ArrayD<bool>,
}

impl<T> ContinuedFractionResult<T> {
    pub fn status_codes(&self) -> ArrayD<i32> {
        self.status.mapv(Status::code)
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.f.shape()
    }

    /// True when every element converged
    pub fn all_converged(&self) -> bool {
        self.success.iter().all(|&s| s)
    }
}

impl<T: Element> ContinuedFractionResult<T> {
    /// Package the final state. Invalid elements are reported as NaN.
    pub(crate) fn assemble(mut f: ArrayD<T>, status: ArrayD<Status>, nit: usize) -> Self {
        ndarray::Zip::from(&mut f).and(&status).for_each(|v, s| {
            if *s == Status::InvalidValue {
                *v = T::nan();
            }
        });
        let success = status.mapv(Status::is_success);
        ContinuedFractionResult { f, nit, nfev: nit + 1, status, success }
    }
}
