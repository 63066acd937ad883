use crate::fraction::Fraction;
use serde::{Deserialize, Serialize};
use std::fmt;

const KILOGRAMS_PER_TON: Fraction = Fraction::from_integer(1000);
const MILLIS_PER_SECOND: Fraction = Fraction::from_integer(1000);
const SECONDS_PER_MINUTE: Fraction = Fraction::from_integer(60);

/// A quantity of goods in kilograms, as stored in the balance files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub i64);

impl Amount {
    #[inline]
    pub const fn from_kilograms(kilograms: i64) -> Self {
        Self(kilograms)
    }

    #[inline]
    pub fn kilograms(self) -> i64 {
        self.0
    }

    /// Exact amount in metric tons.
    pub fn tons(self) -> Fraction {
        Fraction::from(self.0) / KILOGRAMS_PER_TON
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kg", self.0)
    }
}

/// A duration in milliseconds, as stored in the balance files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Time(pub i64);

impl Time {
    #[inline]
    pub const fn from_millis(milliseconds: i64) -> Self {
        Self(milliseconds)
    }

    #[inline]
    pub fn milliseconds(self) -> i64 {
        self.0
    }

    pub fn seconds(self) -> Fraction {
        Fraction::from(self.0) / MILLIS_PER_SECOND
    }

    pub fn minutes(self) -> Fraction {
        self.seconds() / SECONDS_PER_MINUTE
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ms", self.0)
    }
}

/// The name of a ware, e.g. `Wool` or `Cloth`. Opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product(pub String);

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
