//! Evaluation of generalized continued fractions over arrays
//!
//! A generalized continued fraction is
//! `f(x) = b(0,x) + a(1,x) / (b(1,x) + a(2,x) / (b(2,x) + ...))` where the
//! terms are produced by two [TermGenerator]s. [continued_fraction()] evaluates
//! it for every element of a batch with the modified Lentz algorithm. All the
//! elements advance in lockstep, and each one stops updating as soon as it
//! converges.
//!
//! With [Options::log] set, the terms are logarithms of signed numbers and the
//! recurrence is carried out with [LogValue] arithmetic, which is useful when
//! the terms over- or underflow.
//!
//! # References:
//! - <https://en.wikipedia.org/wiki/Generalized_continued_fraction>
//! - <https://dlmf.nist.gov/3.10>
//! - W. J. Lentz, Generating Bessel functions in Mie scattering calculations
//!   using continued fractions, Applied Optics 15(3), 1976
//!
// TODO: allow an optional callback to inspect the running values after each iteration

mod lentz;
mod log_domain;
mod options;
mod result;
mod terms;

pub use log_domain::LogValue;
pub use options::{Options, Tolerances};
pub use result::{ContinuedFractionResult, Status};

use ndarray::ArrayD;
use crate::error::ContinuedFractionError;
use crate::traits::{Element, TermGenerator};
use lentz::{Arithmetic, Lentz, Linear, LogDomain};
use options::Config;
use terms::Terms;

/// Evaluate the continued fraction with terms `a(n, x, args)` and `b(n, x, args)`
/// for every element of `x` broadcast against `args`.
///
/// The generators are called once per iteration with the whole batch, including
/// the elements that have already converged, so each of them is called exactly
/// `nit + 1` times. Elements with a non-finite input are not iterated and are
/// reported with [Status::InvalidValue].
///
/// In log mode (`options.log`) the generators return the logarithms of the
/// terms, with the sign of a real term encoded as an imaginary part of `0` or
/// `π`, and the returned `f` is the logarithm of the value. This requires a
/// complex element type: real terms are not lifted, so real inputs must be
/// passed as `x + 0i` (e.g. `Complex64::new(x, 0.)`) and the generators must
/// return complex logarithms. Real element types are rejected with
/// [ContinuedFractionError::RealLogDomain].
///
/// # Errors
/// The options are checked before any term is generated. Non-finite
/// tolerances, non-positive tolerances outside log mode, a negative `maxiter`,
/// log mode on real elements and arguments that cannot be broadcast together
/// are rejected. A generator returning an array that doesn't broadcast to the
/// batch shape aborts the evaluation.
///
/// # Example
/// ```
/// use ndarray::{arr1, ArrayD};
/// use num_contfrac::{continued_fraction, Options};
///
/// // tan(x) = x / (1 - x² / (3 - x² / (5 - ...)))
/// fn a(n: usize, x: &ArrayD<f64>, _: &[ArrayD<f64>]) -> ArrayD<f64> {
///     match n {
///         0 => x.mapv(|_| 0.),
///         1 => x.clone(),
///         _ => x.mapv(|v| -v * v),
///     }
/// }
/// fn b(n: usize, x: &ArrayD<f64>, _: &[ArrayD<f64>]) -> ArrayD<f64> {
///     x.mapv(|_| if n == 0 { 0. } else { (2 * n - 1) as f64 })
/// }
///
/// let x = arr1(&[0.5, 1.0]).into_dyn();
/// let res = continued_fraction(&a, &b, &x, &[], &Options::default()).unwrap();
/// assert!((res.f[[1]] - 1f64.tan()).abs() < 1e-14);
/// ```
pub fn continued_fraction<T, A, B>(
    a: &A,
    b: &B,
    x: &ArrayD<T>,
    args: &[ArrayD<T>],
    options: &Options<T::Real>,
) -> Result<ContinuedFractionResult<T>, ContinuedFractionError>
where
    T: Element,
    A: TermGenerator<T>,
    B: TermGenerator<T>,
{
    let config = options.validate::<T>()?;
    let mut terms = Terms::new(a, b, x, args)?;

    log::debug!(
        "evaluating continued fraction over shape {:?} (log: {}, maxiter: {})",
        terms.shape(),
        config.log,
        config.maxiter
    );

    if config.log {
        run::<T, LogDomain, A, B>(&mut terms, &config)
    } else {
        run::<T, Linear, A, B>(&mut terms, &config)
    }
}

fn run<T, Ar, A, B>(
    terms: &mut Terms<'_, T, A, B>,
    config: &Config<T::Real>,
) -> Result<ContinuedFractionResult<T>, ContinuedFractionError>
where
    T: Element,
    Ar: Arithmetic<T>,
    A: TermGenerator<T>,
    B: TermGenerator<T>,
{
    let valid = terms.finite_mask();
    terms.eval_a(0)?; // a(0) doesn't enter the fraction but is still generated
    let b0 = terms.eval_b(0)?;
    let mut lentz = Lentz::<T, Ar>::seed(&b0, &valid, config.tiny, config.eps);

    if config.maxiter == 0 {
        // nothing can be checked, the seed is taken as is
        lentz.settle(Status::Converged);
    }

    let mut n = 1;
    while lentz.nit() < config.maxiter && lentz.in_progress() > 0 {
        let an = terms.eval_a(n)?;
        let bn = terms.eval_b(n)?;
        lentz.step(&an, &bn);
        log::trace!("iteration {}: {} elements in progress", n, lentz.in_progress());
        n += 1;
    }
    lentz.settle(Status::MaxIterReached);

    let (f, status, nit) = lentz.finish();
    debug_assert_eq!(terms.nfev(), nit + 1);
    let result = ContinuedFractionResult::assemble(f, status, nit);

    log::debug!(
        "continued fraction finished after {} iterations: {} converged of {}",
        result.nit,
        result.success.iter().filter(|&&s| s).count(),
        result.success.len()
    );
    Ok(result)
}
