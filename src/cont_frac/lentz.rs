//! The modified Lentz recurrence, run elementwise over a batch.
//!
//! For `f = b_0 + a_1 / (b_1 + a_2 / (b_2 + ...))` the recurrence keeps two
//! continuants and multiplies the running value by their product:
//!
//! ```text
//! D_n = 1 / (b_n + a_n D_(n-1))
//! C_n = b_n + a_n / C_(n-1)
//! f_n = f_(n-1) C_n D_n
//! ```
//!
//! A vanishing `C` or `D` is replaced by `tiny`. The value has converged once
//! `|C_n D_n - 1| < eps`.
//!
//! REF: Numerical Recipes, 3rd ed., §5.2

use core::marker::PhantomData;
use core::ops::{Add, Div, Mul};
use ndarray::{ArrayD, Zip};
use num_complex::Complex;
use num_traits::{Float, One, Zero};
use super::log_domain::LogValue;
use super::result::Status;
use crate::traits::Element;

/// The arithmetic the recurrence is carried out in
pub(crate) trait Arithmetic<T: Element> {
    type Value: Copy
        + Zero
        + One
        + Add<Output = Self::Value>
        + Mul<Output = Self::Value>
        + Div<Output = Self::Value>;

    /// Interpret an element produced by the term generators
    fn lift(t: T) -> Self::Value;

    /// Inverse of [Arithmetic::lift]
    fn lower(v: Self::Value) -> T;

    /// The value substituted for a vanishing continuant
    fn floor(tiny: T::Real) -> Self::Value;

    fn converged(delta: Self::Value, eps: T::Real) -> bool;

    /// Whether a running value can no longer be trusted
    fn is_invalid(v: Self::Value) -> bool;
}

/// Plain arithmetic on the elements
pub(crate) struct Linear;

/// Arithmetic on logarithms, the elements being the logarithms of the terms
pub(crate) struct LogDomain;

impl<T: Element> Arithmetic<T> for Linear {
    type Value = T;

    #[inline]
    fn lift(t: T) -> T { t }
    #[inline]
    fn lower(v: T) -> T { v }
    #[inline]
    fn floor(tiny: T::Real) -> T { T::from_real(tiny) }

    #[inline]
    fn converged(delta: T, eps: T::Real) -> bool {
        (delta - T::one()).magnitude() < eps
    }

    #[inline]
    fn is_invalid(v: T) -> bool {
        !v.is_finite()
    }
}

impl<T: Element> Arithmetic<T> for LogDomain {
    type Value = LogValue<T::Real>;

    #[inline]
    fn lift(t: T) -> Self::Value { LogValue::from_log(t.to_complex()) }
    #[inline]
    fn lower(v: Self::Value) -> T { T::from_complex(v.log()) }
    #[inline]
    fn floor(tiny: T::Real) -> Self::Value { LogValue::from_log(Complex::new(tiny, T::Real::zero())) }

    #[inline]
    fn converged(delta: Self::Value, eps: T::Real) -> bool {
        delta.is_near_one(eps)
    }

    #[inline]
    fn is_invalid(v: Self::Value) -> bool {
        // a magnitude of log(0) is a legitimate zero
        v.is_nan() || v.log_magnitude() == T::Real::infinity()
    }
}

/// Working state of the recurrence for a whole batch
pub(crate) struct Lentz<T: Element, A: Arithmetic<T>> {
    f: ArrayD<A::Value>,
    c: ArrayD<A::Value>,
    d: ArrayD<A::Value>,
    status: ArrayD<Status>,
    tiny: A::Value,
    eps: T::Real,
    nit: usize,
    _arith: PhantomData<(T, A)>,
}

impl<T: Element, A: Arithmetic<T>> Lentz<T, A> {
    /// Start the recurrence from the `n = 0` terms. Elements that are not
    /// `valid` are never iterated.
    pub fn seed(b0: &ArrayD<T>, valid: &ArrayD<bool>, tiny: T::Real, eps: T::Real) -> Self {
        let tiny = A::floor(tiny);
        let mut f = b0.mapv(A::lift);
        let mut status = ArrayD::from_elem(f.raw_dim(), Status::InProgress);

        Zip::from(&mut f).and(&mut status).and(valid).for_each(|f, s, &ok| {
            if !ok || A::is_invalid(*f) {
                *s = Status::InvalidValue;
            } else if f.is_zero() {
                *f = tiny;
            }
        });

        let c = f.clone();
        let d = ArrayD::from_elem(f.raw_dim(), A::Value::zero());
        Lentz { f, c, d, status, tiny, eps, nit: 0, _arith: PhantomData }
    }

    /// Advance every element with the `n`-th terms. Only elements in progress
    /// have their value and status updated.
    pub fn step(&mut self, a: &ArrayD<T>, b: &ArrayD<T>) {
        let (tiny, eps) = (self.tiny, self.eps);

        Zip::from(&mut self.f)
            .and(&mut self.c)
            .and(&mut self.d)
            .and(&mut self.status)
            .and(a)
            .and(b)
            .for_each(|f, c, d, s, &a, &b| {
                let (a, b) = (A::lift(a), A::lift(b));

                let mut dn = b + a * *d;
                if dn.is_zero() {
                    dn = tiny;
                }
                *d = A::Value::one() / dn;

                let mut cn = b + a / *c;
                if cn.is_zero() {
                    cn = tiny;
                }
                *c = cn;

                if *s != Status::InProgress {
                    return;
                }

                let delta = *c * *d;
                *f = *f * delta;
                if A::converged(delta, eps) {
                    *s = Status::Converged;
                } else if A::is_invalid(*f) {
                    *s = Status::InvalidValue;
                }
            });

        self.nit += 1;
    }

    #[inline]
    pub fn nit(&self) -> usize {
        self.nit
    }

    pub fn in_progress(&self) -> usize {
        self.status.iter().filter(|s| !s.is_terminal()).count()
    }

    /// Freeze the elements still in progress with `status`
    pub fn settle(&mut self, status: Status) {
        self.status.mapv_inplace(|s| if s.is_terminal() { s } else { status });
    }

    /// Final values converted back to elements, statuses and iteration count
    pub fn finish(self) -> (ArrayD<T>, ArrayD<Status>, usize) {
        (self.f.mapv(A::lower), self.status, self.nit)
    }
}
