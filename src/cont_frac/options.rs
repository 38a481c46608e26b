use num_traits::Float;
use crate::error::ContinuedFractionError;
use crate::traits::Element;

/// Convergence tolerances. Missing values fall back to defaults derived from
/// the element type: the machine epsilon for `eps` and the square root of the
/// smallest positive normal number for `tiny`. In log mode both are given (and
/// defaulted) as natural logarithms.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances<F> {
    /// Relative change below which an element is converged
    pub eps: Option<F>,
    /// Floor substituted for a vanishing continuant
    pub tiny: Option<F>,
}

impl<F> Default for Tolerances<F> {
    fn default() -> Self {
        Tolerances { eps: None, tiny: None }
    }
}

/// Options of [continued_fraction()][crate::continued_fraction]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Options<F> {
    pub tolerances: Tolerances<F>,
    /// Whether the terms are logarithms and should be combined in log space
    pub log: bool,
    /// Iteration budget. Zero evaluates only the `n = 0` terms.
    pub maxiter: i64,
}

impl<F> Default for Options<F> {
    fn default() -> Self {
        Options { tolerances: Tolerances::default(), log: false, maxiter: 100 }
    }
}

impl<F> Options<F> {
    #[inline]
    pub fn with_eps(mut self, eps: F) -> Self {
        self.tolerances.eps = Some(eps);
        self
    }

    #[inline]
    pub fn with_tiny(mut self, tiny: F) -> Self {
        self.tolerances.tiny = Some(tiny);
        self
    }

    #[inline]
    pub fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    #[inline]
    pub fn with_maxiter(mut self, maxiter: i64) -> Self {
        self.maxiter = maxiter;
        self
    }
}

/// Options after validation, with the defaults filled in
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Config<F> {
    pub eps: F,
    pub tiny: F,
    pub log: bool,
    pub maxiter: usize,
}

fn check_tolerance<F: Float>(name: &'static str, value: F, log: bool) -> Result<F, ContinuedFractionError> {
    // logarithms of small magnitudes are negative, so only finiteness is required in log mode
    if !value.is_finite() || (!log && value <= F::zero()) {
        return Err(ContinuedFractionError::InvalidTolerance {
            name,
            value: value.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(value)
}

impl<F: Float> Options<F> {
    /// Check the options against element type `T` and resolve the defaults.
    pub(crate) fn validate<T: Element<Real = F>>(&self) -> Result<Config<F>, ContinuedFractionError> {
        let log = self.log;
        let default_eps = F::epsilon();
        let default_tiny = F::min_positive_value().sqrt();

        let eps = match self.tolerances.eps {
            Some(eps) => check_tolerance("eps", eps, log)?,
            None if log => default_eps.ln(),
            None => default_eps,
        };
        let tiny = match self.tolerances.tiny {
            Some(tiny) => check_tolerance("tiny", tiny, log)?,
            None if log => default_tiny.ln(),
            None => default_tiny,
        };

        let maxiter = usize::try_from(self.maxiter)
            .map_err(|_| ContinuedFractionError::InvalidMaxIter { maxiter: self.maxiter })?;

        if log && !T::IS_COMPLEX {
            return Err(ContinuedFractionError::RealLogDomain);
        }

        Ok(Config { eps, tiny, log, maxiter })
    }
}
