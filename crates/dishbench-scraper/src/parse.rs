//! Lenient interpretation of [`Scalar`] values.
//!
//! The search API mixes numbers and strings for the same field, and rating
//! counts arrive as display text (`"52 ratings"`, `"1.2K+ ratings"`). These
//! helpers turn them into the types the normalized card uses.

use crate::types::Scalar;

impl Scalar {
    /// Interprets the scalar as an integer amount.
    ///
    /// Floats are accepted only when they carry no fractional part, so a
    /// price is never silently rounded.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            Scalar::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
                Some(*f as i64)
            }
            Scalar::Text(s) => s.trim().parse::<i64>().ok(),
            Scalar::Float(_) | Scalar::Bool(_) => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Scalar::Int(n) => *n as f64,
            Scalar::Float(f) => *f,
            Scalar::Text(s) => s.trim().parse::<f64>().ok()?,
            Scalar::Bool(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Renders the scalar as display text, the form used for fields that
    /// are passed through to the caller unchanged.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.clone(),
            Scalar::Bool(b) => b.to_string(),
        }
    }

    /// Interprets the scalar as a rating count.
    ///
    /// Text counts are parsed with [`parse_count`]. Negative or fractional
    /// numbers are not counts and yield `None`.
    #[must_use]
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Scalar::Int(n) => u64::try_from(*n).ok(),
            Scalar::Float(_) => self.as_i64().and_then(|n| u64::try_from(n).ok()),
            Scalar::Text(s) => parse_count(s),
            Scalar::Bool(_) => None,
        }
    }
}

/// Parses a display count such as `"52"`, `"52 ratings"`, `"1.2K+ ratings"`
/// or `"3M"` into an integer.
///
/// Reads the leading number, an optional `K`/`M` multiplier, and ignores
/// anything after it. Returns `None` when the text does not start with a
/// digit.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn parse_count(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    let number_end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(trimmed.len());
    let number: String = trimmed[..number_end]
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if number.is_empty() || !number.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let base = number.parse::<f64>().ok()?;

    let multiplier = match trimmed[number_end..].chars().next() {
        Some('k' | 'K') => 1_000.0,
        Some('m' | 'M') => 1_000_000.0,
        _ => 1.0,
    };

    let value = (base * multiplier).round();
    (value.is_finite() && value >= 0.0 && value < 1.0e18).then_some(value as u64)
}
