//! # Unit Conversion
//!
//! Table-driven conversion between units of one physical quantity. Every
//! [`UnitTable`] is closed over a single base unit; converting goes through
//! it:
//!
//! ```text
//! value ──to_base(from)──► base ──from_base(to)──► result
//! ```
//!
//! Most units are **linear** (`base = value × multiplier`). Temperature needs
//! an offset, so its units are **affine**: `base = (value + offset) × scale`.
//!
//! ## Built-in Tables
//!
//! Length, area, volume, weight, temperature, speed, pressure and power.
//! See [`tables`] and [`UnitCategory`].
//!
//! ## Example
//!
//! ```rust
//! use calc_core::units::{convert_unit, UnitCategory};
//!
//! let length = UnitCategory::Length.table();
//! assert_eq!(convert_unit("1", "meter", "centimeter", length).unwrap(), "100.0000 cm");
//!
//! let temperature = UnitCategory::Temperature.table();
//! assert_eq!(convert_unit("0", "celsius", "fahrenheit", temperature).unwrap(), "32.0000 °F");
//! ```

pub mod tables;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::format::format_fixed;

/// Decimal places for converted values
pub const UNIT_DECIMALS: usize = 4;

// ============================================================================
// Conversion Rules
// ============================================================================

/// How a unit maps to its table's base unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conversion {
    /// `base = value × multiplier`
    Linear { multiplier: f64 },
    /// `base = (value + offset) × scale`
    Affine { offset: f64, scale: f64 },
}

impl Conversion {
    /// Value in this unit → base unit
    pub fn to_base(self, value: f64) -> f64 {
        match self {
            Conversion::Linear { multiplier } => value * multiplier,
            Conversion::Affine { offset, scale } => (value + offset) * scale,
        }
    }

    /// Base unit → value in this unit
    pub fn from_base(self, base: f64) -> f64 {
        match self {
            Conversion::Linear { multiplier } => base / multiplier,
            Conversion::Affine { offset, scale } => base / scale - offset,
        }
    }

    /// True for the rule of a base unit
    pub fn is_identity(self) -> bool {
        match self {
            Conversion::Linear { multiplier } => multiplier == 1.0,
            Conversion::Affine { offset, scale } => offset == 0.0 && scale == 1.0,
        }
    }

    fn is_valid(self) -> bool {
        match self {
            Conversion::Linear { multiplier } => multiplier.is_finite() && multiplier > 0.0,
            Conversion::Affine { offset, scale } => offset.is_finite() && scale.is_finite() && scale != 0.0,
        }
    }
}

// ============================================================================
// Tables
// ============================================================================

/// One unit of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDef {
    /// Lookup key (e.g., "square_meter")
    pub key: String,
    /// Display name (e.g., "Square Meter")
    pub name: String,
    /// Symbol appended to converted values (e.g., "m²")
    pub symbol: String,
    pub conversion: Conversion,
}

impl UnitDef {
    /// Symbol for output, falling back to the key when none is set
    pub fn label(&self) -> &str {
        if self.symbol.is_empty() {
            &self.key
        } else {
            &self.symbol
        }
    }
}

/// All units of one quantity, in display order.
///
/// The first two units are the default from/to pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTable {
    /// Quantity name (e.g., "length")
    pub category: String,
    /// Key of the base unit
    pub base: String,
    pub units: Vec<UnitDef>,
}

impl UnitTable {
    pub fn new(category: impl Into<String>, base: impl Into<String>, units: Vec<UnitDef>) -> Self {
        UnitTable {
            category: category.into(),
            base: base.into(),
            units,
        }
    }

    /// Look up a unit by key.
    pub fn get(&self, key: &str) -> CalcResult<&UnitDef> {
        self.units
            .iter()
            .find(|unit| unit.key == key)
            .ok_or_else(|| CalcError::lookup_miss(format!("{} units", self.category), key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.units.iter().any(|unit| unit.key == key)
    }

    /// Unit keys in display order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|unit| unit.key.as_str())
    }

    /// Default from/to pair (first and second unit)
    pub fn default_pair(&self) -> Option<(&str, &str)> {
        match self.units.as_slice() {
            [first, second, ..] => Some((first.key.as_str(), second.key.as_str())),
            _ => None,
        }
    }

    /// Check the table invariants: at least two units, unique keys, valid
    /// rules, and a base unit whose rule is the identity.
    pub fn validate(&self) -> CalcResult<()> {
        if self.units.len() < 2 {
            return Err(CalcError::invalid_input(
                "units",
                format!("{} ({} entries)", self.category, self.units.len()),
                "a unit table needs at least two units",
            ));
        }

        let mut seen = HashSet::new();
        for unit in &self.units {
            if !seen.insert(unit.key.as_str()) {
                return Err(CalcError::invalid_input("units", &unit.key, "duplicate unit key"));
            }
            if !unit.conversion.is_valid() {
                return Err(CalcError::invalid_input(
                    "conversion",
                    &unit.key,
                    "multiplier must be positive and finite; affine scale must be non-zero",
                ));
            }
        }

        let base = self.get(&self.base)?;
        if !base.conversion.is_identity() {
            return Err(CalcError::invalid_input(
                "base",
                &self.base,
                "base unit must have multiplier 1 or an identity affine rule",
            ));
        }

        Ok(())
    }

    /// Convert a number between two units of this table.
    pub fn convert_value(&self, value: f64, from: &str, to: &str) -> CalcResult<f64> {
        let from_unit = self.get(from)?;
        let to_unit = self.get(to)?;
        if from == to {
            return Ok(value);
        }

        let base = from_unit.conversion.to_base(value);
        let result = to_unit.conversion.from_base(base);
        debug!(category = %self.category, from, to, value, base, result, "unit conversion");
        Ok(result)
    }

    /// Convert textual input and format the result with `decimals` places
    /// followed by the target unit's symbol.
    pub fn convert_formatted(&self, value: &str, from: &str, to: &str, decimals: usize) -> CalcResult<String> {
        let parsed = parse_finite("value", value)?;
        let result = self.convert_value(parsed, from, to)?;
        let to_unit = self.get(to)?;
        Ok(format!("{} {}", format_fixed(result, decimals), to_unit.label()))
    }
}

/// Convert `value` from one unit to another, formatted to four decimals.
///
/// Fails with `InvalidInput` when `value` is not a finite number and with
/// `LookupMiss` when either unit is not in `table`.
pub fn convert_unit(value: &str, from: &str, to: &str, table: &UnitTable) -> CalcResult<String> {
    table.convert_formatted(value, from, to, UNIT_DECIMALS)
}

/// Parse a finite number from user input.
pub(crate) fn parse_finite(field: &str, value: &str) -> CalcResult<f64> {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CalcError::invalid_input(field, value, "not a finite number")),
    }
}

// ============================================================================
// Categories
// ============================================================================

/// The built-in unit tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitCategory {
    Length,
    Area,
    Volume,
    Weight,
    Temperature,
    Speed,
    Pressure,
    Power,
}

impl UnitCategory {
    pub const ALL: [UnitCategory; 8] = [
        UnitCategory::Length,
        UnitCategory::Area,
        UnitCategory::Volume,
        UnitCategory::Weight,
        UnitCategory::Temperature,
        UnitCategory::Speed,
        UnitCategory::Pressure,
        UnitCategory::Power,
    ];

    /// The built-in table for this category
    pub fn table(self) -> &'static UnitTable {
        match self {
            UnitCategory::Length => &tables::LENGTH,
            UnitCategory::Area => &tables::AREA,
            UnitCategory::Volume => &tables::VOLUME,
            UnitCategory::Weight => &tables::WEIGHT,
            UnitCategory::Temperature => &tables::TEMPERATURE,
            UnitCategory::Speed => &tables::SPEED,
            UnitCategory::Pressure => &tables::PRESSURE,
            UnitCategory::Power => &tables::POWER,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UnitCategory::Length => "length",
            UnitCategory::Area => "area",
            UnitCategory::Volume => "volume",
            UnitCategory::Weight => "weight",
            UnitCategory::Temperature => "temperature",
            UnitCategory::Speed => "speed",
            UnitCategory::Pressure => "pressure",
            UnitCategory::Power => "power",
        }
    }
}

impl fmt::Display for UnitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnitCategory {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        UnitCategory::ALL
            .into_iter()
            .find(|category| category.name() == lower)
            .ok_or_else(|| CalcError::lookup_miss("unit categories", s))
    }
}

/// Find the built-in category holding both units.
pub fn find_category(from: &str, to: &str) -> Option<UnitCategory> {
    UnitCategory::ALL
        .into_iter()
        .find(|category| category.table().contains(from) && category.table().contains(to))
}

/// Find the first table among `tables` holding both units.
pub fn find_table<'a>(tables: &'a [UnitTable], from: &str, to: &str) -> Option<&'a UnitTable> {
    tables.iter().find(|table| table.contains(from) && table.contains(to))
}
