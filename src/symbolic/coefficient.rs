//! Exact Gaussian-rational coefficients and square-free radicals.
use num_bigint::BigInt;
use num_complex::{Complex, Complex64};
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

/// Exact complex number `re + im*I` with rational parts.
pub type Coefficient = Complex<BigRational>;

/// Largest trial divisor tried when reducing a radicand.
const TRIAL_DIVISOR_LIMIT: u64 = 1 << 20;

/// Returns the real coefficient `value`.
#[inline]
pub fn real(value: BigRational) -> Coefficient {
    Complex::new(value, BigRational::zero())
}

/// Returns the coefficient `n`.
#[inline]
pub fn integer<T>(n: T) -> Coefficient
where
    T: Into<BigInt>,
{
    real(BigRational::from_integer(n.into()))
}

/// Returns the coefficient `0 + 1*I`.
#[inline]
pub fn imaginary_unit() -> Coefficient {
    Complex::new(BigRational::zero(), BigRational::one())
}

/// Returns whether the coefficient has no imaginary part.
#[inline]
pub fn is_real(value: &Coefficient) -> bool {
    value.im.is_zero()
}

/// Splits a positive integer `n` into `(outside, inside)` with
/// `n = outside^2 * inside` and `inside` square-free, so that
/// `sqrt(n) = outside * sqrt(inside)`.
///
/// Trial division runs until the cube of the divisor exceeds the unfactored
/// rest. The rest then has at most two prime factors and is either a perfect
/// square or square-free. Returns `None` if that point is not reached below
/// `TRIAL_DIVISOR_LIMIT`.
pub fn split_square(n: &BigInt) -> Option<(BigInt, BigInt)> {
    debug_assert!(n > &BigInt::zero());
    let root = n.sqrt();
    if &root * &root == *n {
        return Some((root, BigInt::one()));
    }

    let mut outside = BigInt::one();
    let mut inside = BigInt::one();
    let mut rest = n.clone();
    let mut divisor = 2u64;
    loop {
        let k = BigInt::from(divisor);
        if &k * &k * &k > rest {
            break;
        }
        if divisor > TRIAL_DIVISOR_LIMIT {
            return None;
        }
        let mut multiplicity = 0usize;
        while (&rest % &k).is_zero() {
            rest /= &k;
            multiplicity += 1;
        }
        outside *= num_traits::pow(k.clone(), multiplicity / 2);
        if multiplicity % 2 == 1 {
            inside *= &k;
        }
        divisor += if divisor == 2 { 1 } else { 2 };
    }

    let root = rest.sqrt();
    if &root * &root == rest {
        outside *= root;
    } else {
        inside *= rest;
    }
    Some((outside, inside))
}

/// Converts an exact coefficient to a floating point complex number.
pub fn to_complex64(value: &Coefficient) -> Option<Complex64> {
    Some(Complex64::new(value.re.to_f64()?, value.im.to_f64()?))
}
