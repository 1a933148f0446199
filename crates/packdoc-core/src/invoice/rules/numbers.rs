//! Tolerant coercion of quantity and currency cells.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

/// A coerced value plus the diagnostic produced when the input was unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced<T> {
    pub value: T,
    pub warning: Option<String>,
}

impl<T> Coerced<T> {
    fn clean(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    fn fallback(value: T, warning: String) -> Self {
        warn!("{}", warning);
        Self {
            value,
            warning: Some(warning),
        }
    }
}

/// Coerce a quantity cell.
///
/// Blank cells are 0. Text with a decimal point is parsed as a float and
/// rounded half-up, anything else as an integer. Unparseable, negative, or
/// out-of-range values become 0 with a warning.
pub fn coerce_quantity(text: &str) -> Coerced<u32> {
    let clean = text.trim();
    if clean.is_empty() {
        return Coerced::clean(0);
    }

    let parsed = if clean.contains('.') {
        clean
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| round_half_up(v) as i64)
    } else {
        clean.parse::<i64>().ok()
    };

    match parsed.map(u32::try_from) {
        Some(Ok(quantity)) => Coerced::clean(quantity),
        Some(Err(_)) => Coerced::fallback(
            0,
            format!("Quantity value '{}' is negative or too large. Using 0 as default.", text),
        ),
        None => Coerced::fallback(
            0,
            format!("Invalid quantity value '{}'. Using 0 as default.", text),
        ),
    }
}

/// Coerce a unit value cell.
///
/// Blank cells are 0. Everything except ASCII digits, `.` and `-` is stripped
/// (currency symbols, codes, thousands separators) before parsing. Unparseable
/// or negative values become 0 with a warning.
pub fn coerce_unit_value(text: &str) -> Coerced<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Coerced::clean(Decimal::ZERO);
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    match Decimal::from_str(&cleaned) {
        Ok(value) if value < Decimal::ZERO => Coerced::fallback(
            Decimal::ZERO,
            format!("Unit value '{}' is negative. Using 0.0 as default.", text),
        ),
        Ok(value) => Coerced::clean(value),
        Err(_) => Coerced::fallback(
            Decimal::ZERO,
            format!("Invalid unit value '{}'. Using 0.0 as default.", text),
        ),
    }
}

/// Quantity without the diagnostic.
pub fn parse_quantity(text: &str) -> u32 {
    coerce_quantity(text).value
}

/// Unit value without the diagnostic.
pub fn parse_unit_value(text: &str) -> Decimal {
    coerce_unit_value(text).value
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
