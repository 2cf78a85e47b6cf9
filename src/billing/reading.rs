//! Loose numeric readings and their parse-or-zero normalization.
//!
//! Meter readings and rates reach the engine as typed numbers, as free text
//! from a form or config file, or not at all. Everything is collapsed to a
//! finite `f64` here so the allocation arithmetic only ever sees numbers.

use serde::{Deserialize, Serialize};

/// A numeric input as supplied by the caller.
///
/// Deserializes untagged, so `12`, `12.5`, `"12.5"` and `null` are all
/// accepted wherever a `Reading` is expected.
///
/// # Examples
///
/// ```
/// use voltshare::billing::reading::Reading;
///
/// assert_eq!(Reading::from(90.0).value(), 90.0);
/// assert_eq!(Reading::from("100 kWh").value(), 100.0);
/// assert_eq!(Reading::from("xyz").value(), 0.0);
/// assert_eq!(Reading::Missing.value(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    /// Already numeric.
    Number(f64),
    /// Text to be parsed.
    Text(String),
    /// Absent or `null`.
    #[default]
    Missing,
}

impl Reading {
    /// Normalized value: the parsed number, or `0.0` when the input is
    /// empty, non-numeric, or not finite.
    pub fn value(&self) -> f64 {
        match self {
            Self::Number(n) => finite_or_zero(*n),
            Self::Text(s) => normalize(s),
            Self::Missing => 0.0,
        }
    }

    /// Whether normalization had to substitute zero for unusable input.
    pub fn is_malformed(&self) -> bool {
        match self {
            Self::Number(n) => !n.is_finite(),
            Self::Text(s) => leading_number(s).is_none_or(|n| !n.is_finite()),
            Self::Missing => true,
        }
    }
}

impl From<f64> for Reading {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Reading {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Reading {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Option<f64>> for Reading {
    fn from(n: Option<f64>) -> Self {
        n.map_or(Self::Missing, Self::Number)
    }
}

/// Parses the leading decimal number of `text`, falling back to `0.0`.
///
/// Leading whitespace is skipped and trailing garbage is ignored, so
/// `"12abc"` reads as `12`. Infinite or unparseable values read as `0`.
pub fn normalize(text: &str) -> f64 {
    leading_number(text).map_or(0.0, finite_or_zero)
}

fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() { n } else { 0.0 }
}

/// Longest `[+-]digits[.digits][(e|E)[+-]digits]` prefix after whitespace.
fn leading_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}
