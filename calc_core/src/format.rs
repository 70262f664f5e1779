//! # Number Formatting
//!
//! Display rules shared by both calculators and the converters.
//!
//! - [`format_number`] is the calculator display form: integral values
//!   print without a fraction, very large or very small magnitudes switch to
//!   exponent form (`1e+21`, `1.5e-7`), everything else prints the shortest
//!   decimal that round-trips.
//! - [`format_fixed`] prints an exact number of decimals for converter output.
//!
//! ```rust
//! use calc_core::format::{format_fixed, format_number};
//!
//! assert_eq!(format_number(8.0), "8");
//! assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
//! assert_eq!(format_number(1e21), "1e+21");
//! assert_eq!(format_fixed(100.0, 4), "100.0000");
//! ```

/// Magnitude at or above which the display switches to exponent form
const EXPONENT_UPPER: f64 = 1e21;

/// Magnitude below which the display switches to exponent form
const EXPONENT_LOWER: f64 = 1e-6;

/// Format a value for a calculator display.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }
    if value == 0.0 {
        // Covers -0 as well
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= EXPONENT_UPPER || magnitude < EXPONENT_LOWER {
        exponent_form(value)
    } else {
        format!("{}", value)
    }
}

/// `1.5e-7` stays as is, `1e21` gains an explicit `+` sign.
fn exponent_form(value: f64) -> String {
    let raw = format!("{:e}", value);
    match raw.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => raw,
    }
}

/// Format a value with exactly `decimals` digits after the point.
///
/// A value that rounds to zero never prints with a leading minus sign.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value);
    match formatted.strip_prefix('-') {
        Some(unsigned) if unsigned.bytes().all(|b| b == b'0' || b == b'.') => unsigned.to_string(),
        _ => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_values() {
        assert_eq!(format_number(120.0), "120");
        assert_eq!(format_number(-5.0), "-5");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_fractional_values() {
        assert_eq!(format_number(0.05), "0.05");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[test]
    fn test_exponent_values() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }

    #[test]
    fn test_non_finite_values() {
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_fixed() {
        assert_eq!(format_fixed(32.0, 4), "32.0000");
        assert_eq!(format_fixed(92.0, 2), "92.00");
        assert_eq!(format_fixed(-0.0, 4), "0.0000");
        assert_eq!(format_fixed(-0.00001, 4), "0.0000");
        assert_eq!(format_fixed(1.23456, 2), "1.23");
    }
}
