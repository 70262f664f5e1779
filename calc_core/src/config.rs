//! # Toolbox Configuration
//!
//! The lookup data the converters run against, bundled in one JSON file so a
//! caller can supply its own unit tables and exchange rates.
//!
//! ```text
//! ToolboxConfig
//! ├── version: schema version of the file
//! ├── settings: FormatSettings (decimal places)
//! ├── currency: CurrencyRateTable
//! └── unit_tables: Vec<UnitTable>
//! ```
//!
//! Saves are atomic: the JSON goes to a `.tmp` sibling, is synced to disk,
//! then renamed over the target. Loading checks the schema version and
//! validates every table before handing the config out.
//!
//! ## Example
//!
//! ```rust,no_run
//! use calc_core::config::{load_config, save_config, ToolboxConfig};
//! use std::path::Path;
//!
//! let path = Path::new("toolbox.json");
//! save_config(&ToolboxConfig::default(), path)?;
//! let config = load_config(path)?;
//! assert_eq!(config.settings.unit_decimals, 4);
//! # Ok::<(), calc_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::currency::{CurrencyRateTable, CURRENCY_DECIMALS};
use crate::errors::{CalcError, CalcResult};
use crate::units::{find_table, UnitCategory, UnitTable, UNIT_DECIMALS};

/// Current schema version for configuration files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Output formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSettings {
    /// Decimal places for unit conversions
    pub unit_decimals: usize,
    /// Decimal places for currency conversions
    pub currency_decimals: usize,
}

impl Default for FormatSettings {
    fn default() -> Self {
        FormatSettings {
            unit_decimals: UNIT_DECIMALS,
            currency_decimals: CURRENCY_DECIMALS,
        }
    }
}

/// Root configuration container.
///
/// `Default` carries the built-in unit tables and the sample rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolboxConfig {
    pub version: String,
    #[serde(default)]
    pub settings: FormatSettings,
    #[serde(default)]
    pub currency: CurrencyRateTable,
    #[serde(default)]
    pub unit_tables: Vec<UnitTable>,
}

impl Default for ToolboxConfig {
    fn default() -> Self {
        ToolboxConfig {
            version: SCHEMA_VERSION.to_string(),
            settings: FormatSettings::default(),
            currency: CurrencyRateTable::builtin(),
            unit_tables: UnitCategory::ALL.iter().map(|category| category.table().clone()).collect(),
        }
    }
}

impl ToolboxConfig {
    /// Look up a unit table by category name.
    pub fn table(&self, category: &str) -> CalcResult<&UnitTable> {
        self.unit_tables
            .iter()
            .find(|table| table.category.eq_ignore_ascii_case(category))
            .ok_or_else(|| CalcError::lookup_miss("unit categories", category))
    }

    /// The table holding both units, or `LookupMiss` for a cross-table pair.
    pub fn table_for(&self, from: &str, to: &str) -> CalcResult<&UnitTable> {
        find_table(&self.unit_tables, from, to)
            .ok_or_else(|| CalcError::lookup_miss("unit tables", format!("{} -> {}", from, to)))
    }

    /// Convert units with the configured decimals.
    pub fn convert_unit(&self, value: &str, from: &str, to: &str) -> CalcResult<String> {
        self.table_for(from, to)?
            .convert_formatted(value, from, to, self.settings.unit_decimals)
    }

    /// Convert currency with the configured decimals.
    pub fn convert_currency(&self, amount: &str, from: &str, to: &str) -> CalcResult<String> {
        self.currency.convert(amount, from, to, self.settings.currency_decimals)
    }

    /// Validate every table and reject duplicate category names.
    pub fn validate(&self) -> CalcResult<()> {
        for (index, table) in self.unit_tables.iter().enumerate() {
            if let Err(e) = table.validate() {
                warn!(category = %table.category, error = %e, "invalid unit table");
                return Err(e);
            }
            if self.unit_tables[..index]
                .iter()
                .any(|other| other.category.eq_ignore_ascii_case(&table.category))
            {
                warn!(category = %table.category, "duplicate unit table");
                return Err(CalcError::invalid_input("unit_tables", &table.category, "duplicate category"));
            }
        }

        if let Err(e) = self.currency.validate() {
            warn!(error = %e, "invalid currency table");
            return Err(e);
        }

        Ok(())
    }
}

/// Save a configuration with atomic write semantics.
///
/// 1. Serialize to pretty JSON
/// 2. Write to `<path>.tmp`
/// 3. Sync to disk
/// 4. Rename over `path`
pub fn save_config(config: &ToolboxConfig, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(config).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = path.with_extension("json.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), "configuration saved");
    Ok(())
}

/// Load and validate a configuration file.
///
/// # Returns
///
/// * `Err(CalcError::FileError)` - I/O error
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::VersionMismatch)` - Incompatible schema version
/// * `Err(CalcError::InvalidInput)` - A table failed validation
pub fn load_config(path: &Path) -> CalcResult<ToolboxConfig> {
    let mut file = File::open(path).map_err(|e| {
        CalcError::file_error("open", path.display().to_string(), e.to_string())
    })?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| {
        CalcError::file_error("read", path.display().to_string(), e.to_string())
    })?;

    let config: ToolboxConfig =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&config.version)?;
    config.validate()?;

    debug!(
        path = %path.display(),
        unit_tables = config.unit_tables.len(),
        currencies = config.currency.currencies().len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Check that a file version is compatible with [`SCHEMA_VERSION`].
///
/// Major versions must match; while the major is 0 a newer minor is rejected.
pub fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, ..], [current_major, ..]) if file_major != current_major => Err(mismatch()),
        ([_, file_minor, ..], [0, current_minor, ..]) if file_minor > current_minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::path::PathBuf;

    fn temp_config_path(name: &str) -> PathBuf {
        temp_dir().join(format!("calc_toolbox_test_{}.json", name))
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ToolboxConfig::default();
        config.validate().unwrap();
        assert_eq!(config.unit_tables.len(), 8);
        assert_eq!(config.settings, FormatSettings { unit_decimals: 4, currency_decimals: 2 });
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_config_path("roundtrip");

        let mut config = ToolboxConfig::default();
        config.settings.currency_decimals = 3;
        save_config(&config, &path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.convert_currency("100", "USD", "EUR").unwrap(), "92.000 EUR");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_config_path("atomic");
        let tmp_path = path.with_extension("json.tmp");

        save_config(&ToolboxConfig::default(), &path).unwrap();
        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let path = temp_config_path("does_not_exist");
        assert!(matches!(load_config(&path), Err(CalcError::FileError { .. })));
    }

    #[test]
    fn test_load_rejects_bad_json_and_tables() {
        let path = temp_config_path("bad_json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_config(&path), Err(CalcError::SerializationError { .. })));

        let mut config = ToolboxConfig::default();
        config.currency.insert("USD", "EUR", -1.0);
        save_config(&config, &path).unwrap();
        assert!(matches!(load_config(&path), Err(CalcError::InvalidInput { .. })));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let path = temp_config_path("minimal");
        fs::write(&path, r#"{"version":"0.1.0"}"#).unwrap();

        let loaded = load_config(&path).unwrap();
        assert!(loaded.unit_tables.is_empty());
        assert!(loaded.currency.is_empty());
        assert_eq!(loaded.settings, FormatSettings::default());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("banana").is_err());
    }

    #[test]
    fn test_table_lookup() {
        let config = ToolboxConfig::default();
        assert_eq!(config.table("Pressure").unwrap().base, "pascal");
        assert!(config.table("colour").is_err());
        assert_eq!(config.convert_unit("1", "meter", "centimeter").unwrap(), "100.0000 cm");
        assert!(matches!(
            config.convert_unit("1", "meter", "kilogram"),
            Err(CalcError::LookupMiss { .. })
        ));
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let mut config = ToolboxConfig::default();
        let extra = config.unit_tables[0].clone();
        config.unit_tables.push(extra);
        assert!(config.validate().is_err());
    }
}
