//! Anno Core -- exact arithmetic and unit types for Anno 1404 balance data.
//!
//! Raw balance values are stored as integers exactly as the game files hold
//! them (kilograms, milliseconds). Every derived quantity -- tons, minutes,
//! tons per minute -- is computed as an exact [`fraction::Fraction`] so that
//! throughput comparisons never drift the way floating-point would.
//!
//! # Key Types
//!
//! - [`fraction::Fraction`] -- Reduced rational number over 64-bit components.
//! - [`units::Amount`] -- A quantity of goods in kilograms.
//! - [`units::Time`] -- A duration in milliseconds.
//! - [`units::Product`] -- The name of a ware.

pub mod fraction;
pub mod units;

pub use fraction::{ArithmeticError, Fraction};
pub use units::{Amount, Product, Time};
