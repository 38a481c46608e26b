use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Neg, Sub};
use ndarray::ArrayD;
use num_complex::Complex;
use num_traits::{Float, FloatConst, One, Zero};

/// Scalar type the evaluator can work with elementwise. It's implemented for
/// `f32`, `f64` and their complex counterparts.
pub trait Element:
    Copy
    + Debug
    + PartialEq
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// The underlying real float type, also used for tolerances
    type Real: Float + FloatConst + Debug;

    /// Whether the element carries an imaginary part
    const IS_COMPLEX: bool;

    fn from_real(re: Self::Real) -> Self;

    /// Absolute value (modulus for complex numbers)
    fn magnitude(self) -> Self::Real;

    fn is_finite(self) -> bool;

    fn is_nan(self) -> bool;

    fn nan() -> Self;

    fn to_complex(self) -> Complex<Self::Real>;

    /// Inverse of [Element::to_complex]. Real types keep the real part only.
    fn from_complex(z: Complex<Self::Real>) -> Self;
}

macro_rules! impl_real_element {
    ($T:ty) => {
        impl Element for $T {
            type Real = $T;
            const IS_COMPLEX: bool = false;

            #[inline]
            fn from_real(re: $T) -> Self { re }
            #[inline]
            fn magnitude(self) -> $T { self.abs() }
            #[inline]
            fn is_finite(self) -> bool { <$T>::is_finite(self) }
            #[inline]
            fn is_nan(self) -> bool { <$T>::is_nan(self) }
            #[inline]
            fn nan() -> Self { <$T>::NAN }
            #[inline]
            fn to_complex(self) -> Complex<$T> { Complex::new(self, 0.) }
            #[inline]
            fn from_complex(z: Complex<$T>) -> Self { z.re }
        }
    };
}

macro_rules! impl_complex_element {
    ($T:ty) => {
        impl Element for Complex<$T> {
            type Real = $T;
            const IS_COMPLEX: bool = true;

            #[inline]
            fn from_real(re: $T) -> Self { Complex::new(re, 0.) }
            #[inline]
            fn magnitude(self) -> $T { self.norm() }
            #[inline]
            fn is_finite(self) -> bool { self.re.is_finite() && self.im.is_finite() }
            #[inline]
            fn is_nan(self) -> bool { self.re.is_nan() || self.im.is_nan() }
            #[inline]
            fn nan() -> Self { Complex::new(<$T>::NAN, <$T>::NAN) }
            #[inline]
            fn to_complex(self) -> Complex<$T> { self }
            #[inline]
            fn from_complex(z: Complex<$T>) -> Self { z }
        }
    };
}

impl_real_element!(f32);
impl_real_element!(f64);
impl_complex_element!(f32);
impl_complex_element!(f64);

/// A generator of the continued fraction terms `a(n, x)` or `b(n, x)`.
///
/// The generator receives the iteration index and the broadcast batch (`x`
/// followed by the extra arguments) and returns the terms for every element.
/// Any closure or function with the matching signature is a generator.
pub trait TermGenerator<T> {
    fn term(&self, n: usize, x: &ArrayD<T>, args: &[ArrayD<T>]) -> ArrayD<T>;
}

impl<T, F> TermGenerator<T> for F
where
    F: Fn(usize, &ArrayD<T>, &[ArrayD<T>]) -> ArrayD<T>,
{
    #[inline]
    fn term(&self, n: usize, x: &ArrayD<T>, args: &[ArrayD<T>]) -> ArrayD<T> {
        self(n, x, args)
    }
}
