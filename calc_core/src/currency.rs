//! # Currency Conversion
//!
//! Lookup against a static table of directed exchange rates. The table is
//! sample data: `rate(A, B)` and `1 / rate(B, A)` need not agree, and no
//! rate is ever derived through a third currency.
//!
//! ```rust
//! use calc_core::currency::{convert_currency, CurrencyRateTable};
//!
//! let rates = CurrencyRateTable::builtin();
//! assert_eq!(convert_currency("100", "USD", "EUR", &rates).unwrap(), "92.00 EUR");
//! assert_eq!(convert_currency("5", "JPY", "JPY", &rates).unwrap(), "5.00 JPY");
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::format::format_fixed;
use crate::units::parse_finite;

/// Decimal places for converted amounts
pub const CURRENCY_DECIMALS: usize = 2;

static BUILTIN: Lazy<CurrencyRateTable> = Lazy::new(|| {
    let rows: [(&str, [(&str, f64); 6]); 7] = [
        ("USD", [("EUR", 0.92), ("GBP", 0.79), ("JPY", 158.42), ("AUD", 1.50), ("CAD", 1.37), ("INR", 83.47)]),
        ("EUR", [("USD", 1.09), ("GBP", 0.86), ("JPY", 172.58), ("AUD", 1.63), ("CAD", 1.49), ("INR", 90.87)]),
        ("GBP", [("USD", 1.27), ("EUR", 1.16), ("JPY", 200.00), ("AUD", 1.88), ("CAD", 1.73), ("INR", 105.47)]),
        ("JPY", [("USD", 0.0063), ("EUR", 0.0058), ("GBP", 0.0050), ("AUD", 0.0095), ("CAD", 0.0086), ("INR", 0.52)]),
        ("AUD", [("USD", 0.67), ("EUR", 0.61), ("GBP", 0.53), ("JPY", 105.74), ("CAD", 0.91), ("INR", 55.72)]),
        ("CAD", [("USD", 0.73), ("EUR", 0.67), ("GBP", 0.58), ("JPY", 115.60), ("AUD", 1.10), ("INR", 60.85)]),
        ("INR", [("USD", 0.012), ("EUR", 0.011), ("GBP", 0.0095), ("JPY", 1.90), ("AUD", 0.018), ("CAD", 0.016)]),
    ];

    let mut table = CurrencyRateTable::default();
    for (from, targets) in rows {
        for (to, rate) in targets {
            table.insert(from, to, rate);
        }
    }
    table
});

/// Directed exchange rates: `from -> to -> rate`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyRateTable {
    rates: BTreeMap<String, BTreeMap<String, f64>>,
}

impl CurrencyRateTable {
    /// The sample table shipped with the toolbox
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>, rate: f64) {
        self.rates.entry(from.into()).or_default().insert(to.into(), rate);
    }

    /// Rate for converting one unit of `from` into `to`
    pub fn rate(&self, from: &str, to: &str) -> Option<f64> {
        self.rates.get(from).and_then(|row| row.get(to)).copied()
    }

    /// Every currency code appearing as a source or target, sorted
    pub fn currencies(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self
            .rates
            .iter()
            .flat_map(|(from, row)| std::iter::once(from.as_str()).chain(row.keys().map(String::as_str)))
            .collect();
        codes.sort_unstable();
        codes.dedup();
        codes
    }

    pub fn is_empty(&self) -> bool {
        self.rates.values().all(BTreeMap::is_empty)
    }

    /// Every rate must be finite and positive.
    pub fn validate(&self) -> CalcResult<()> {
        for (from, row) in &self.rates {
            for (to, rate) in row {
                if !rate.is_finite() || *rate <= 0.0 {
                    return Err(CalcError::invalid_input(
                        "rate",
                        format!("{}->{} = {}", from, to, rate),
                        "rate must be finite and greater than zero",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Convert with an explicit number of decimals.
    pub fn convert(&self, amount: &str, from: &str, to: &str, decimals: usize) -> CalcResult<String> {
        let value = parse_finite("amount", amount)?;
        if value < 0.0 {
            return Err(CalcError::invalid_input("amount", amount, "amount must not be negative"));
        }

        if from == to {
            return Ok(format!("{} {}", format_fixed(value, decimals), to));
        }

        let rate = self
            .rate(from, to)
            .ok_or_else(|| CalcError::lookup_miss("currency rates", format!("{}->{}", from, to)))?;
        let converted = value * rate;
        debug!(from, to, amount = value, rate, converted, "currency conversion");
        Ok(format!("{} {}", format_fixed(converted, decimals), to))
    }
}

/// Convert `amount` from one currency to another, formatted to two decimals
/// followed by the target code.
///
/// A missing directed rate is `LookupMiss`; the caller shows it as
/// "Conversion not available".
pub fn convert_currency(amount: &str, from: &str, to: &str, table: &CurrencyRateTable) -> CalcResult<String> {
    table.convert(amount, from, to, CURRENCY_DECIMALS)
}
