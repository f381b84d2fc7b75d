//! Canonical symbolic values.
//!
//! A [`Symbolic`] is a finite sum of terms `c * sqrt(r) * x1^k1 * ... * xn^kn`
//! where `c` is an exact Gaussian rational, `r` a square-free positive integer
//! and the `xi` are named binary-network symbols. Like terms are always merged
//! and zero terms dropped, so two values are equal iff they are structurally
//! equal.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::iter::{Product, Sum};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub};

use itertools::Itertools;
use num_bigint::BigInt;
use num_complex::Complex64;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Serialize, Serializer};

use super::coefficient::{self, Coefficient};

/// Largest absolute integer exponent accepted by [`Symbolic::checked_pow`].
pub const MAX_EXPONENT: i64 = 1024;

/// Largest power of a single symbol that checked arithmetic produces.
pub const MAX_DEGREE: u64 = 1 << 20;

/// Errors raised while evaluating symbolic arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("cannot divide by `{0}`, only non-zero constant monomials are invertible")]
    UnsupportedDivision(String),
    #[error("exponent `{0}` is not an integer")]
    NonIntegerExponent(String),
    #[error("exponent `{0}` is out of range")]
    ExponentOutOfRange(String),
    #[error("cannot take the square root of `{0}`")]
    UnsupportedSquareRoot(String),
}

/// Product of symbol powers and a square-free radical.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Monomial {
    powers: BTreeMap<String, u64>,
    radical: BigInt,
}

impl Monomial {
    /// The empty product.
    pub fn one() -> Self {
        Self {
            powers: BTreeMap::new(),
            radical: BigInt::one(),
        }
    }

    pub fn symbol<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            powers: BTreeMap::from([(name.into(), 1)]),
            radical: BigInt::one(),
        }
    }

    /// `sqrt(radical)`; `radical` must already be square-free.
    fn sqrt_of(radical: BigInt) -> Self {
        Self {
            powers: BTreeMap::new(),
            radical,
        }
    }

    /// Total degree in the symbols.
    pub fn degree(&self) -> u64 {
        self.powers
            .values()
            .fold(0, |acc: u64, power| acc.saturating_add(*power))
    }

    /// Highest power of any single symbol.
    pub fn max_power(&self) -> u64 {
        self.powers.values().copied().max().unwrap_or(0)
    }

    /// Whether the monomial contains no symbols (it may still carry a radical).
    pub fn is_constant(&self) -> bool {
        self.powers.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.powers.is_empty() && self.radical.is_one()
    }

    pub fn radical(&self) -> &BigInt {
        &self.radical
    }

    pub fn powers(&self) -> impl Iterator<Item = (&str, u64)> {
        self.powers.iter().map(|(name, power)| (name.as_str(), *power))
    }

    /// Multiplies two monomials. Returns the product together with the integer
    /// factor pulled out of the combined radical.
    ///
    /// Powers saturate; [`Symbolic::checked_mul`] and [`Symbolic::checked_pow`]
    /// keep them far below that.
    fn mul(&self, other: &Self) -> (Self, BigInt) {
        let mut powers = self.powers.clone();
        for (name, power) in &other.powers {
            let entry = powers.entry(name.clone()).or_insert(0);
            *entry = entry.saturating_add(*power);
        }

        // sqrt(a) * sqrt(b) = g * sqrt(a/g * b/g) with g = gcd(a, b). Both
        // radicals are square-free, so a/g and b/g are coprime and square-free
        // and so is their product.
        let (radical, factor) = if self.radical.is_one() {
            (other.radical.clone(), BigInt::one())
        } else if other.radical.is_one() {
            (self.radical.clone(), BigInt::one())
        } else {
            let g = self.radical.gcd(&other.radical);
            ((&self.radical / &g) * (&other.radical / &g), g)
        };
        (Self { powers, radical }, factor)
    }

    /// Ordering used for rendering: symbolic terms by descending degree, then
    /// by symbol names, constants last.
    fn display_key(&self) -> (bool, std::cmp::Reverse<u64>, &BTreeMap<String, u64>, &BigInt) {
        (
            self.is_constant(),
            std::cmp::Reverse(self.degree()),
            &self.powers,
            &self.radical,
        )
    }
}

/// An exact symbolic value in canonical form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Symbolic {
    terms: BTreeMap<Monomial, Coefficient>,
}

impl Symbolic {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::from_coefficient(coefficient::integer(1))
    }

    pub fn imaginary_unit() -> Self {
        Self::from_coefficient(coefficient::imaginary_unit())
    }

    pub fn from_integer(value: i64) -> Self {
        Self::from_coefficient(coefficient::integer(value))
    }

    pub fn from_rational(value: BigRational) -> Self {
        Self::from_coefficient(coefficient::real(value))
    }

    pub fn from_coefficient(value: Coefficient) -> Self {
        let mut out = Self::zero();
        out.add_term(Monomial::one(), value);
        out
    }

    pub fn symbol<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        let mut out = Self::zero();
        out.add_term(Monomial::symbol(name), coefficient::integer(1));
        out
    }

    /// Exact square root of a rational number, `I * sqrt(-q)` for negative `q`.
    ///
    /// # Examples
    /// ```
    /// # use holocontract::symbolic::Symbolic;
    /// # use num_rational::BigRational;
    /// let half = BigRational::new(1.into(), 2.into());
    /// assert_eq!(Symbolic::sqrt_of_rational(&half).unwrap().to_string(), "sqrt(2)/2");
    /// let eight = BigRational::from_integer((-8).into());
    /// assert_eq!(Symbolic::sqrt_of_rational(&eight).unwrap().to_string(), "2*I*sqrt(2)");
    /// ```
    ///
    /// # Errors
    /// Fails if the radicand is too large to be reduced to square-free form.
    pub fn sqrt_of_rational(value: &BigRational) -> Result<Self, EvaluationError> {
        if value.is_zero() {
            return Ok(Self::zero());
        }
        // sqrt(p/d) = sqrt(p*d)/d
        let magnitude = value.abs();
        let (outside, inside) =
            coefficient::split_square(&(magnitude.numer() * magnitude.denom()))
                .ok_or_else(|| EvaluationError::UnsupportedSquareRoot(value.to_string()))?;
        let scale = BigRational::new(outside, magnitude.denom().clone());
        let scale = if value.is_negative() {
            coefficient::imaginary_unit().scale(scale)
        } else {
            coefficient::real(scale)
        };
        let mut out = Self::zero();
        out.add_term(Monomial::sqrt_of(inside), scale);
        Ok(out)
    }

    /// Adds `value * monomial`, merging like terms.
    pub fn add_term(&mut self, monomial: Monomial, value: Coefficient) {
        if value.is_zero() {
            return;
        }
        match self.terms.entry(monomial) {
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(value);
            }
            std::collections::btree_map::Entry::Occupied(mut entry) => {
                let sum = entry.get() + &value;
                if sum.is_zero() {
                    entry.remove();
                } else {
                    *entry.get_mut() = sum;
                }
            }
        }
    }

    /// Returns the canonical form of the value: like terms merged, zero terms
    /// removed. Arithmetic on [`Symbolic`] maintains this form, so this is the
    /// point where values leaving an evaluation are normalized explicitly.
    #[must_use]
    pub fn simplify(mut self) -> Self {
        self.terms.retain(|_, value| !value.is_zero());
        self
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether the value contains no symbols.
    pub fn is_constant(&self) -> bool {
        self.terms.keys().all(Monomial::is_constant)
    }

    /// Highest power of any single symbol in the value.
    pub fn max_power(&self) -> u64 {
        self.terms.keys().map(Monomial::max_power).max().unwrap_or(0)
    }

    /// Iterates the `(monomial, coefficient)` terms in canonical order.
    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &Coefficient)> {
        self.terms.iter()
    }

    /// Names of all symbols occurring in the value.
    pub fn symbols(&self) -> BTreeSet<&str> {
        self.terms
            .keys()
            .flat_map(|monomial| monomial.powers.keys().map(String::as_str))
            .collect()
    }

    /// If the value is a single term without symbols, returns it.
    fn as_constant_monomial(&self) -> Option<(&Monomial, &Coefficient)> {
        match self.terms.iter().exactly_one() {
            Ok((monomial, value)) if monomial.is_constant() => Some((monomial, value)),
            _ => None,
        }
    }

    /// If the value is a real rational number, returns it.
    pub fn as_rational(&self) -> Option<BigRational> {
        if self.is_zero() {
            return Some(BigRational::zero());
        }
        let (monomial, value) = self.as_constant_monomial()?;
        (monomial.is_one() && coefficient::is_real(value)).then(|| value.re.clone())
    }

    /// Multiplicative inverse of a non-zero constant monomial `c * sqrt(r)`,
    /// which is `sqrt(r) / (c * r)`.
    pub fn inverse(&self) -> Result<Self, EvaluationError> {
        if self.is_zero() {
            return Err(EvaluationError::DivisionByZero);
        }
        let (monomial, value) = self
            .as_constant_monomial()
            .ok_or_else(|| EvaluationError::UnsupportedDivision(self.to_string()))?;
        let denominator = value.scale(BigRational::from_integer(monomial.radical.clone()));
        let mut out = Self::zero();
        out.add_term(monomial.clone(), coefficient::integer(1) / denominator);
        Ok(out)
    }

    pub fn checked_div(&self, rhs: &Self) -> Result<Self, EvaluationError> {
        Ok(self * &rhs.inverse()?)
    }

    /// Product that fails once a symbol power exceeds [`MAX_DEGREE`].
    pub fn checked_mul(&self, rhs: &Self) -> Result<Self, EvaluationError> {
        let product = self * rhs;
        match product.max_power() {
            degree if degree > MAX_DEGREE => {
                Err(EvaluationError::ExponentOutOfRange(degree.to_string()))
            }
            _ => Ok(product),
        }
    }

    /// Raises the value to an integer power given as a symbolic value.
    pub fn checked_pow(&self, exponent: &Self) -> Result<Self, EvaluationError> {
        let exponent_value = exponent
            .as_rational()
            .filter(BigRational::is_integer)
            .ok_or_else(|| EvaluationError::NonIntegerExponent(exponent.to_string()))?;
        let n = exponent_value
            .to_integer()
            .to_i64()
            .filter(|n| n.unsigned_abs() <= MAX_EXPONENT.unsigned_abs())
            .ok_or_else(|| EvaluationError::ExponentOutOfRange(exponent.to_string()))?;

        let degree = self.max_power().saturating_mul(n.unsigned_abs());
        if degree > MAX_DEGREE {
            return Err(EvaluationError::ExponentOutOfRange(degree.to_string()));
        }

        let base = if n < 0 { self.inverse()? } else { self.clone() };
        let mut remaining = n.unsigned_abs();
        let mut square = base;
        let mut out = Self::one();
        while remaining > 0 {
            if remaining & 1 == 1 {
                out = &out * &square;
            }
            remaining >>= 1;
            if remaining > 0 {
                square = &square * &square;
            }
        }
        Ok(out)
    }

    /// Square root of a real rational value.
    pub fn checked_sqrt(&self) -> Result<Self, EvaluationError> {
        let value = self
            .as_rational()
            .ok_or_else(|| EvaluationError::UnsupportedSquareRoot(self.to_string()))?;
        Self::sqrt_of_rational(&value)
    }

    /// Numeric value of a symbol-free expression.
    pub fn to_complex64(&self) -> Option<Complex64> {
        if !self.is_constant() {
            return None;
        }
        let mut out = Complex64::new(0.0, 0.0);
        for (monomial, value) in &self.terms {
            let radical = monomial.radical.to_f64()?.sqrt();
            out += coefficient::to_complex64(value)? * radical;
        }
        Some(out)
    }
}

impl From<i64> for Symbolic {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl Add<&Symbolic> for &Symbolic {
    type Output = Symbolic;

    fn add(self, rhs: &Symbolic) -> Symbolic {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Add for Symbolic {
    type Output = Symbolic;

    fn add(mut self, rhs: Symbolic) -> Symbolic {
        self += rhs;
        self
    }
}

impl AddAssign<&Symbolic> for Symbolic {
    fn add_assign(&mut self, rhs: &Symbolic) {
        for (monomial, value) in &rhs.terms {
            self.add_term(monomial.clone(), value.clone());
        }
    }
}

impl AddAssign for Symbolic {
    fn add_assign(&mut self, rhs: Symbolic) {
        for (monomial, value) in rhs.terms {
            self.add_term(monomial, value);
        }
    }
}

impl Neg for &Symbolic {
    type Output = Symbolic;

    fn neg(self) -> Symbolic {
        Symbolic {
            terms: self
                .terms
                .iter()
                .map(|(monomial, value)| (monomial.clone(), -value))
                .collect(),
        }
    }
}

impl Neg for Symbolic {
    type Output = Symbolic;

    fn neg(self) -> Symbolic {
        -&self
    }
}

impl Sub<&Symbolic> for &Symbolic {
    type Output = Symbolic;

    fn sub(self, rhs: &Symbolic) -> Symbolic {
        self + &(-rhs)
    }
}

impl Sub for Symbolic {
    type Output = Symbolic;

    fn sub(self, rhs: Symbolic) -> Symbolic {
        &self - &rhs
    }
}

impl Mul<&Symbolic> for &Symbolic {
    type Output = Symbolic;

    fn mul(self, rhs: &Symbolic) -> Symbolic {
        let mut out = Symbolic::zero();
        for ((m1, c1), (m2, c2)) in self.terms.iter().cartesian_product(rhs.terms.iter()) {
            let (monomial, factor) = m1.mul(m2);
            let mut value = c1 * c2;
            if !factor.is_one() {
                value = value.scale(BigRational::from_integer(factor));
            }
            out.add_term(monomial, value);
        }
        out
    }
}

impl Mul for Symbolic {
    type Output = Symbolic;

    fn mul(self, rhs: Symbolic) -> Symbolic {
        &self * &rhs
    }
}

impl MulAssign<&Symbolic> for Symbolic {
    fn mul_assign(&mut self, rhs: &Symbolic) {
        *self = &*self * rhs;
    }
}

impl Sum for Symbolic {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Symbolic::zero(), |acc, value| acc + value)
    }
}

impl<'a> Product<&'a Symbolic> for Symbolic {
    fn product<I: Iterator<Item = &'a Symbolic>>(iter: I) -> Self {
        iter.fold(Symbolic::one(), |acc, value| &acc * value)
    }
}

/// One signed, purely real or purely imaginary summand of the rendered sum.
struct Piece<'a> {
    negative: bool,
    magnitude: BigRational,
    imaginary: bool,
    monomial: &'a Monomial,
}

impl fmt::Display for Piece<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut factors = Vec::new();
        if !self.magnitude.numer().is_one() {
            factors.push(self.magnitude.numer().to_string());
        }
        if self.imaginary {
            factors.push(String::from("I"));
        }
        if !self.monomial.radical.is_one() {
            factors.push(format!("sqrt({})", self.monomial.radical));
        }
        for (name, power) in &self.monomial.powers {
            if *power == 1 {
                factors.push(name.clone());
            } else {
                factors.push(format!("{name}**{power}"));
            }
        }

        if factors.is_empty() {
            write!(f, "1")?;
        } else {
            write!(f, "{}", factors.join("*"))?;
        }
        if !self.magnitude.denom().is_one() {
            write!(f, "/{}", self.magnitude.denom())?;
        }
        Ok(())
    }
}

/// Renders in a SymPy-like syntax (`a*c + b*d`, `1/2 - I/2`, `sqrt(2)*x**2`)
/// that [`parse_expression`](super::parser::parse_expression) reads back.
impl fmt::Display for Symbolic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }

        let pieces = self
            .terms
            .iter()
            .sorted_by(|(a, _), (b, _)| a.display_key().cmp(&b.display_key()))
            .flat_map(|(monomial, value)| {
                [(&value.re, false), (&value.im, true)]
                    .into_iter()
                    .filter(|(part, _)| !part.is_zero())
                    .map(move |(part, imaginary)| Piece {
                        negative: part.is_negative(),
                        magnitude: part.abs(),
                        imaginary,
                        monomial,
                    })
            });

        for (position, piece) in pieces.enumerate() {
            match (position, piece.negative) {
                (0, false) => write!(f, "{piece}")?,
                (0, true) => write!(f, "-{piece}")?,
                (_, false) => write!(f, " + {piece}")?,
                (_, true) => write!(f, " - {piece}")?,
            }
        }
        Ok(())
    }
}

impl Serialize for Symbolic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
