//! Arithmetic on logarithms of signed numbers.
//!
//! A value `v` is stored as `log(v)`: the real part is `log|v|` and the
//! imaginary part is the phase, which is `0` for positive and `π` for negative
//! reals. Multiplications become additions, so products of terms with a huge
//! dynamic range neither overflow nor underflow.

use core::ops::{Add, Div, Mul, Neg, Sub};
use num_complex::Complex;
use num_traits::{Float, FloatConst, One, Zero};

/// Logarithmic representation of a signed (or complex) number
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogValue<F>(Complex<F>);

/// Map a phase into (-π, π], snapping values within a few ulps of 0 or π so
/// that signs combine exactly.
#[inline]
fn normalize_phase<F: Float + FloatConst>(phase: F) -> F {
    let pi = F::PI();
    let tau = pi + pi;
    let mut p = phase % tau;
    if p > pi {
        p = p - tau;
    } else if p <= -pi {
        p = p + tau;
    }

    let tol = F::epsilon() * tau; // a few ulps of π
    if p.abs() <= tol {
        F::zero()
    } else if pi - p.abs() <= tol {
        pi
    } else {
        p
    }
}

impl<F: Float + FloatConst> LogValue<F> {
    /// Wrap an existing logarithm
    #[inline]
    pub fn from_log(log: Complex<F>) -> Self {
        LogValue(Complex::new(log.re, normalize_phase(log.im)))
    }

    /// Take the logarithm of a linear value
    pub fn from_value(value: Complex<F>) -> Self {
        if value.is_zero() {
            Self::zero()
        } else {
            Self::from_log(value.ln())
        }
    }

    pub fn from_real(value: F) -> Self {
        let phase = if value.is_sign_negative() { F::PI() } else { F::zero() };
        LogValue(Complex::new(value.abs().ln(), phase))
    }

    /// The logarithm itself
    #[inline]
    pub fn log(self) -> Complex<F> {
        self.0
    }

    /// Back to the linear domain
    pub fn exp(self) -> Complex<F> {
        if self.is_zero() {
            Complex::zero()
        } else {
            self.0.exp()
        }
    }

    #[inline]
    pub fn log_magnitude(self) -> F {
        self.0.re
    }

    #[inline]
    pub fn phase(self) -> F {
        self.0.im
    }

    /// `Some(true)` for negative reals, `Some(false)` for positive reals and
    /// `None` for values off the real axis
    #[inline]
    pub fn sign(self) -> Option<bool> {
        if self.0.im.is_zero() {
            Some(false)
        } else if self.0.im == F::PI() {
            Some(true)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_nan(self) -> bool {
        self.0.re.is_nan() || self.0.im.is_nan()
    }

    #[inline]
    pub fn recip(self) -> Self {
        Self::from_log(-self.0)
    }

    /// Whether the underlying value is within `exp(log_eps)` of one. The
    /// comparison happens between logarithms, so `log_eps` is usually negative.
    #[inline]
    pub fn is_near_one(self, log_eps: F) -> bool {
        (self - Self::one()).log_magnitude() < log_eps
    }
}

impl<F: Float + FloatConst> Zero for LogValue<F> {
    #[inline]
    fn zero() -> Self {
        LogValue(Complex::new(F::neg_infinity(), F::zero()))
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0.re == F::neg_infinity()
    }
}

impl<F: Float + FloatConst> One for LogValue<F> {
    #[inline]
    fn one() -> Self {
        LogValue(Complex::zero())
    }
}

impl<F: Float + FloatConst> Add for LogValue<F> {
    type Output = LogValue<F>;

    /// Logarithm of the sum of the underlying values
    fn add(self, rhs: LogValue<F>) -> LogValue<F> {
        if self.is_zero() {
            return rhs;
        }
        if rhs.is_zero() {
            return self;
        }

        let (hi, lo) = if self.0.re >= rhs.0.re { (self, rhs) } else { (rhs, self) };
        if hi.0.re == F::infinity() {
            return hi;
        }

        match (hi.sign(), lo.sign()) {
            (Some(hs), Some(ls)) => {
                let diff = lo.0.re - hi.0.re; // never positive
                if hs == ls {
                    LogValue(Complex::new(hi.0.re + diff.exp().ln_1p(), hi.0.im))
                } else if diff.is_zero() {
                    Self::zero()
                } else {
                    LogValue(Complex::new(hi.0.re + (-diff.exp()).ln_1p(), hi.0.im))
                }
            }
            _ => {
                let s = Complex::<F>::one() + (lo.0 - hi.0).exp();
                if s.norm() <= F::epsilon() {
                    Self::zero()
                } else {
                    Self::from_log(hi.0 + s.ln())
                }
            }
        }
    }
}

impl<F: Float + FloatConst> Neg for LogValue<F> {
    type Output = LogValue<F>;

    /// Flip the sign of the underlying value
    #[inline]
    fn neg(self) -> LogValue<F> {
        Self::from_log(Complex::new(self.0.re, self.0.im + F::PI()))
    }
}

impl<F: Float + FloatConst> Sub for LogValue<F> {
    type Output = LogValue<F>;

    #[inline]
    fn sub(self, rhs: LogValue<F>) -> LogValue<F> {
        self + (-rhs)
    }
}

impl<F: Float + FloatConst> Mul for LogValue<F> {
    type Output = LogValue<F>;

    #[inline]
    fn mul(self, rhs: LogValue<F>) -> LogValue<F> {
        Self::from_log(self.0 + rhs.0)
    }
}

impl<F: Float + FloatConst> Div for LogValue<F> {
    type Output = LogValue<F>;

    #[inline]
    fn div(self, rhs: LogValue<F>) -> LogValue<F> {
        Self::from_log(self.0 - rhs.0)
    }
}
