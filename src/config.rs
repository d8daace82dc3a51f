//! Resize configuration.
//!
//! Handles loading, validating, and merging `resize.toml`. Stock defaults are
//! the base layer; a config file in the target directory (or one named with
//! `--config`) overrides them, and command-line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! force = false            # Replace even when the re-encode is larger
//! recursive = false        # Descend into subdirectories
//!
//! [trigger]
//! dimension = "either"     # width | height | either
//! value = 1920             # Resize when the chosen side exceeds this
//!
//! [target]
//! dimension = "either"     # either = largest dimension
//! value = 1920             # New size of the chosen side
//!
//! [encoding]
//! jpeg_quality = 75        # 1-100
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::Quality;
use crate::types::{DimensionRule, DimensionSpec, MAX_DIMENSION, RequestError, ResizeRequest};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the target directory.
pub const CONFIG_FILE_NAME: &str = "resize.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Resize settings loaded from `resize.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Commit re-encodes even when they come out larger.
    pub force: bool,
    /// Descend into subdirectories when discovering files.
    pub recursive: bool,
    /// Which images get resized.
    pub trigger: RuleConfig,
    /// How big they become.
    pub target: RuleConfig,
    pub encoding: EncodingConfig,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            force: false,
            recursive: false,
            trigger: RuleConfig::default(),
            target: RuleConfig::default(),
            encoding: EncodingConfig::default(),
        }
    }
}

/// One `[trigger]` or `[target]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleConfig {
    pub dimension: DimensionSpec,
    pub value: u32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            dimension: DimensionSpec::Either,
            value: 1920,
        }
    }
}

impl RuleConfig {
    pub fn rule(self) -> DimensionRule {
        DimensionRule::new(self.dimension, self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// JPEG quality for re-encoded files (1 = worst, 100 = best).
    pub jpeg_quality: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: Quality::default().value(),
        }
    }
}

impl ResizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, rule) in [("trigger.value", self.trigger), ("target.value", self.target)] {
            if rule.value == 0 || rule.value > MAX_DIMENSION {
                return Err(ConfigError::Validation(format!(
                    "{} must be 1-{}",
                    field, MAX_DIMENSION
                )));
            }
        }
        if !(1..=100).contains(&self.encoding.jpeg_quality) {
            return Err(ConfigError::Validation(
                "encoding.jpeg_quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    /// Build a request for `files` from these settings.
    pub fn to_request(&self, files: Vec<PathBuf>) -> Result<ResizeRequest, RequestError> {
        ResizeRequest::new(files, self.trigger.rule(), self.target.rule(), self.force)
            .map(|r| r.with_quality(Quality::new(self.encoding.jpeg_quality)))
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ResizeConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `resize.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    read_toml(&config_path).map(Some)
}

fn read_toml(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ResizeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ResizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `resize.toml` in the given directory, or stock defaults.
pub fn load_config(dir: &Path) -> Result<ResizeConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Load config from an explicitly named file, which must exist.
pub fn load_config_file(path: &Path) -> Result<ResizeConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    resolve_config(stock_defaults_value(), Some(read_toml(path)?))
}

/// Returns a fully-commented stock `resize.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Bulk Resize Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as resize.toml in the directory you resize, or pass it
# with --config. Command-line flags override anything set here.
# Unknown keys will cause an error.

# Replace an image even when the resized file is larger than the original.
force = false

# Also resize images in subdirectories.
recursive = false

# ---------------------------------------------------------------------------
# Trigger: which images get resized
# ---------------------------------------------------------------------------
[trigger]
# width  -> resize when the width exceeds value
# height -> resize when the height exceeds value
# either -> resize when either side exceeds value
dimension = "either"
value = 1920

# ---------------------------------------------------------------------------
# Target: how big resized images become (aspect ratio is always kept)
# ---------------------------------------------------------------------------
[target]
# width  -> new width is value
# height -> new height is value
# either -> the largest dimension becomes value
dimension = "either"
value = 1920

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[encoding]
# JPEG quality for re-encoded files (1 = worst, 100 = best). PNG is lossless.
jpeg_quality = 75
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = ResizeConfig::default();
        assert_eq!(config.trigger.dimension, DimensionSpec::Either);
        assert_eq!(config.trigger.value, 1920);
        assert_eq!(config.target.value, 1920);
        assert_eq!(config.encoding.jpeg_quality, 75);
        assert!(!config.force);
        assert!(!config.recursive);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[trigger]
dimension = "width"
"#;
        let config: ResizeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.trigger.dimension, DimensionSpec::Width);
        // Unspecified values keep their defaults
        assert_eq!(config.trigger.value, 1920);
        assert_eq!(config.target.dimension, DimensionSpec::Either);
    }

    #[test]
    fn dimension_names_are_lowercase() {
        let toml = r#"
[target]
dimension = "Height"
"#;
        assert!(toml::from_str::<ResizeConfig>(toml).is_err());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), ResizeConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
force = true

[target]
dimension = "height"
value = 1080

[encoding]
jpeg_quality = 90
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert!(config.force);
        assert_eq!(config.target.dimension, DimensionSpec::Height);
        assert_eq!(config.target.value, 1080);
        assert_eq!(config.encoding.jpeg_quality, 90);
        assert_eq!(config.trigger, RuleConfig::default());
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_file_requires_existing_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_config_file(&tmp.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_config_file_reads_named_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("web.toml");
        fs::write(&path, "recursive = true\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert!(config.recursive);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[target]
dimension = "either"
value = 1920
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str("[target]\nvalue = 800\n").unwrap();

        let merged = merge_toml(base, overlay);
        let target = merged.get("target").unwrap();
        assert_eq!(target.get("value").unwrap().as_integer(), Some(800));
        assert_eq!(target.get("dimension").unwrap().as_str(), Some("either"));
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("force = false").unwrap();
        let overlay: toml::Value = toml::from_str("force = true").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("force").unwrap().as_bool(), Some(true));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<ResizeConfig, _> = toml::from_str("[trigger]\nvalu = 10\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<ResizeConfig, _> = toml::from_str("[images]\nquality = 90\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(ResizeConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rule_bounds() {
        let mut config = ResizeConfig::default();
        config.trigger.value = 0;
        assert!(config.validate().unwrap_err().to_string().contains("trigger.value"));

        config.trigger.value = 1;
        config.target.value = MAX_DIMENSION + 1;
        assert!(config.validate().unwrap_err().to_string().contains("target.value"));

        config.target.value = MAX_DIMENSION;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = ResizeConfig::default();
        config.encoding.jpeg_quality = 0;
        assert!(config.validate().is_err());
        config.encoding.jpeg_quality = 101;
        assert!(config.validate().is_err());
        config.encoding.jpeg_quality = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let overlay: toml::Value = toml::from_str("[target]\nvalue = 10000\n").unwrap();
        let result = resolve_config(stock_defaults_value(), Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Request building
    // =========================================================================

    #[test]
    fn to_request_carries_rules_and_quality() {
        let mut config = ResizeConfig::default();
        config.force = true;
        config.target = RuleConfig {
            dimension: DimensionSpec::Width,
            value: 800,
        };
        config.encoding.jpeg_quality = 60;

        let request = config.to_request(vec![PathBuf::from("a.jpg")]).unwrap();
        assert!(request.force());
        assert_eq!(request.target(), DimensionRule::new(DimensionSpec::Width, 800));
        assert_eq!(request.quality(), Quality::new(60));
        assert_eq!(request.files().len(), 1);
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ResizeConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, ResizeConfig::default());
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for key in ["force", "recursive", "trigger", "target", "encoding"] {
            assert!(val.get(key).is_some(), "missing {key}");
        }
    }
}
