use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Errors produced by exact fraction arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArithmeticError {
    /// The divisor (or a constructed denominator) was zero.
    #[error("division by zero")]
    DivisionByZero,

    /// The reduced result does not fit in 64-bit components.
    #[error("fraction overflow")]
    Overflow,
}

/// An exact rational number `numer / denom`.
///
/// Always stored in lowest terms with a positive denominator, so the derived
/// `PartialEq`/`Hash` are structural and agree with numeric equality.
/// Intermediate products are computed in 128 bits; a result whose reduced
/// form does not fit back into `i64` is an [`ArithmeticError::Overflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "(i64, i64)", try_from = "(i64, i64)")]
pub struct Fraction {
    numer: i64,
    denom: i64,
}

impl Fraction {
    pub const ZERO: Fraction = Fraction::from_integer(0);
    pub const ONE: Fraction = Fraction::from_integer(1);

    /// An integer as a fraction with denominator 1.
    #[inline]
    pub const fn from_integer(value: i64) -> Self {
        Self {
            numer: value,
            denom: 1,
        }
    }

    /// Build `numer / denom` in lowest terms.
    pub fn new(numer: i64, denom: i64) -> Result<Self, ArithmeticError> {
        Self::reduced(i128::from(numer), i128::from(denom))
    }

    fn reduced(numer: i128, denom: i128) -> Result<Self, ArithmeticError> {
        if denom == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }
        let divisor = gcd(numer.unsigned_abs(), denom.unsigned_abs());
        let divisor = i128::try_from(divisor).map_err(|_| ArithmeticError::Overflow)?;
        let (mut numer, mut denom) = (numer / divisor, denom / divisor);
        if denom < 0 {
            numer = numer.checked_neg().ok_or(ArithmeticError::Overflow)?;
            denom = denom.checked_neg().ok_or(ArithmeticError::Overflow)?;
        }
        Ok(Self {
            numer: i64::try_from(numer).map_err(|_| ArithmeticError::Overflow)?,
            denom: i64::try_from(denom).map_err(|_| ArithmeticError::Overflow)?,
        })
    }

    #[inline]
    pub fn numer(self) -> i64 {
        self.numer
    }

    /// Always positive.
    #[inline]
    pub fn denom(self) -> i64 {
        self.denom
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.numer == 0
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        self.denom == 1
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, ArithmeticError> {
        let (a, b, c, d) = self.wide(rhs);
        let numer = (a * d)
            .checked_add(c * b)
            .ok_or(ArithmeticError::Overflow)?;
        Self::reduced(numer, b * d)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, ArithmeticError> {
        let (a, b, c, d) = self.wide(rhs);
        let numer = (a * d)
            .checked_sub(c * b)
            .ok_or(ArithmeticError::Overflow)?;
        Self::reduced(numer, b * d)
    }

    pub fn checked_mul(self, rhs: Self) -> Result<Self, ArithmeticError> {
        let (a, b, c, d) = self.wide(rhs);
        Self::reduced(a * c, b * d)
    }

    /// Divide by `rhs`, failing with [`ArithmeticError::DivisionByZero`] when
    /// `rhs` is zero.
    pub fn checked_div(self, rhs: Self) -> Result<Self, ArithmeticError> {
        if rhs.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        let (a, b, c, d) = self.wide(rhs);
        Self::reduced(a * d, b * c)
    }

    pub fn checked_neg(self) -> Result<Self, ArithmeticError> {
        let numer = self.numer.checked_neg().ok_or(ArithmeticError::Overflow)?;
        Ok(Self {
            numer,
            denom: self.denom,
        })
    }

    pub fn recip(self) -> Result<Self, ArithmeticError> {
        Self::ONE.checked_div(self)
    }

    /// Nearest `f64`. Use only for display, never for further arithmetic.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.numer as f64 / self.denom as f64
    }

    /// Integer part, truncated toward zero.
    #[inline]
    pub fn to_i64(self) -> i64 {
        self.numer / self.denom
    }

    fn wide(self, rhs: Self) -> (i128, i128, i128, i128) {
        (
            i128::from(self.numer),
            i128::from(self.denom),
            i128::from(rhs.numer),
            i128::from(rhs.denom),
        )
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Default for Fraction {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Fraction {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl TryFrom<(i64, i64)> for Fraction {
    type Error = ArithmeticError;

    fn try_from((numer, denom): (i64, i64)) -> Result<Self, Self::Error> {
        Self::new(numer, denom)
    }
}

impl From<Fraction> for (i64, i64) {
    fn from(value: Fraction) -> Self {
        (value.numer, value.denom)
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b, c, d) = self.wide(*other);
        (a * d).cmp(&(c * b))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

// The operator impls behave like the integer operators: they panic where the
// `checked_*` methods return an error.

impl Add for Fraction {
    type Output = Fraction;

    fn add(self, rhs: Self) -> Self::Output {
        match self.checked_add(rhs) {
            Ok(sum) => sum,
            Err(e) => panic!("fraction addition failed: {e}"),
        }
    }
}

impl Sub for Fraction {
    type Output = Fraction;

    fn sub(self, rhs: Self) -> Self::Output {
        match self.checked_sub(rhs) {
            Ok(difference) => difference,
            Err(e) => panic!("fraction subtraction failed: {e}"),
        }
    }
}

impl Mul for Fraction {
    type Output = Fraction;

    fn mul(self, rhs: Self) -> Self::Output {
        match self.checked_mul(rhs) {
            Ok(product) => product,
            Err(e) => panic!("fraction multiplication failed: {e}"),
        }
    }
}

impl Div for Fraction {
    type Output = Fraction;

    /// # Panics
    ///
    /// Panics if `rhs` is zero. Use [`Fraction::checked_div`] for divisors
    /// read from data.
    fn div(self, rhs: Self) -> Self::Output {
        match self.checked_div(rhs) {
            Ok(quotient) => quotient,
            Err(e) => panic!("fraction division failed: {e}"),
        }
    }
}

impl Neg for Fraction {
    type Output = Fraction;

    fn neg(self) -> Self::Output {
        match self.checked_neg() {
            Ok(negated) => negated,
            Err(e) => panic!("fraction negation failed: {e}"),
        }
    }
}
