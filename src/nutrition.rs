//! # Nutrition Units Module
//!
//! Per-100g nutrient values and their conversion to an actual portion weight.
//! The vision model may be unable to estimate a value, so every nutrient is
//! either a known number or the "unknown" sentinel, and the sentinel flows
//! through scaling untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Text shown to users in place of an unknown value
pub const UNKNOWN_MARKER: &str = "—";

/// Errors raised by the nutrition core
#[derive(Debug, Clone, PartialEq)]
pub enum CoachError {
    /// Caller supplied a value outside the accepted domain
    InvalidInput(String),
}

impl fmt::Display for CoachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoachError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
        }
    }
}

impl std::error::Error for CoachError {}

/// A single nutrient amount, or the sentinel for "could not be determined"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Nutrient {
    Known(f64),
    Unknown,
}

impl Nutrient {
    /// Returns the numeric value, if known
    pub fn value(self) -> Option<f64> {
        match self {
            Nutrient::Known(v) => Some(v),
            Nutrient::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Nutrient::Known(_))
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nutrient::Known(v) => write!(f, "{}", format_amount(*v)),
            Nutrient::Unknown => write!(f, "{UNKNOWN_MARKER}"),
        }
    }
}

/// Round to the nearest integer, ties to even
pub fn round_whole(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Round to one decimal place, ties to even
///
/// Rounds the exact stored value, so `0.15` (stored as 0.1499...) gives
/// `0.1`. Multiplying by ten first would round it up.
pub fn round_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Format an amount the way it is shown in chat: integers without a
/// trailing ".0", everything else with a single decimal.
pub fn format_amount(value: f64) -> String {
    let rounded = round_one_decimal(value);
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.1}")
    }
}

/// Scale a per-100g value to the given portion weight
///
/// # Arguments
///
/// * `value_per_100g` - Nutrient amount per 100 g, possibly unknown
/// * `portion_grams` - Actual portion weight in grams, must be positive
///
/// # Returns
///
/// `round(value * portion / 100, 1)` for known values, `Nutrient::Unknown`
/// for the sentinel.
///
/// # Examples
///
/// ```rust
/// use food_coach::nutrition::{scale, Nutrient};
///
/// let fat = scale(Nutrient::Known(50.0), 200).unwrap();
/// assert_eq!(fat, Nutrient::Known(100.0));
/// ```
pub fn scale(value_per_100g: Nutrient, portion_grams: u32) -> Result<Nutrient, CoachError> {
    if portion_grams == 0 {
        return Err(CoachError::InvalidInput(
            "portion weight must be positive".to_string(),
        ));
    }

    Ok(match value_per_100g {
        Nutrient::Known(v) => Nutrient::Known(round_one_decimal(v * portion_grams as f64 / 100.0)),
        Nutrient::Unknown => Nutrient::Unknown,
    })
}

/// Share of a daily target, in percent with one decimal
///
/// Returns `None` when the amount is unknown or the target is zero.
pub fn percent_of(amount: Nutrient, daily_target: i64) -> Option<f64> {
    if daily_target == 0 {
        return None;
    }
    amount
        .value()
        .map(|v| round_one_decimal(v / daily_target as f64 * 100.0))
}
