//! Configuration with layered loading: built-in defaults, then an optional
//! TOML file, then command-line overrides (applied by the binary).
//!
//! ```toml
//! [pricing]
//! margin_pct = 25
//! tax_rate_pct = 9
//! currency = "SGD"
//! round_digits = 2
//!
//! [catalogs]
//! supplier_a = "supplier_a.csv"
//! supplier_b = "supplier_b.csv"
//!
//! [export]
//! items = "items.csv"
//! breakdown = "cost_breakdown.csv"
//! ```

use std::path::{Path, PathBuf};

use quote_core::{PricingConfig, PricingConfigError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "quote-tool.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Pricing(#[from] PricingConfigError),
}

/// Bundled catalog files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogPaths {
    pub supplier_a: PathBuf,
    pub supplier_b: PathBuf,
}

impl Default for CatalogPaths {
    fn default() -> Self {
        Self {
            supplier_a: PathBuf::from("supplier_a.csv"),
            supplier_b: PathBuf::from("supplier_b.csv"),
        }
    }
}

/// Default destinations of the two CSV exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportPaths {
    pub items: PathBuf,
    pub breakdown: PathBuf,
}

impl Default for ExportPaths {
    fn default() -> Self {
        Self {
            items: PathBuf::from("items.csv"),
            breakdown: PathBuf::from("cost_breakdown.csv"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub catalogs: CatalogPaths,
    pub export: ExportPaths,
}

impl AppConfig {
    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml(
        text: &str,
        origin: &Path,
    ) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("loading config from {}", path.display());

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Loads `explicit` if given, else [`DEFAULT_CONFIG_FILE`] if it exists
    /// in `dir`, else the defaults.
    pub fn load(
        explicit: Option<&Path>,
        dir: &Path,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = dir.join(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(&local);
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pricing.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn parse(text: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::from_toml(text, Path::new("test.toml"))
    }

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(parse("").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse(
            "[pricing]\nmargin_pct = 30\ncurrency = \"MYR\"\n\n[export]\nitems = \"out/items.csv\"\n",
        )
        .unwrap();

        assert_eq!(config.pricing.margin_pct, dec!(30));
        assert_eq!(config.pricing.tax_rate_pct, dec!(9));
        assert_eq!(config.pricing.currency, "MYR");
        assert_eq!(config.pricing.round_digits, 2);
        assert_eq!(config.export.items, PathBuf::from("out/items.csv"));
        assert_eq!(config.export.breakdown, PathBuf::from("cost_breakdown.csv"));
        assert_eq!(config.catalogs, CatalogPaths::default());
    }

    #[test]
    fn fractional_rates_are_accepted() {
        let config = parse("[pricing]\ntax_rate_pct = 8.5\n").unwrap();

        assert_eq!(config.pricing.tax_rate_pct, dec!(8.5));
    }

    #[test]
    fn margin_of_one_hundred_is_rejected() {
        let err = parse("[pricing]\nmargin_pct = 100\n").unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Pricing(PricingConfigError::MarginOutOfRange(_))
        ));
    }

    #[test]
    fn unknown_section_is_a_parse_error() {
        let err = parse("[printing]\ncolour = true\n").unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("failed to parse config file test.toml"));
    }

    #[test]
    fn load_prefers_explicit_then_local_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(AppConfig::load(None, dir.path()).unwrap(), AppConfig::default());

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[pricing]\nround_digits = 0\n")
            .unwrap();
        let local = AppConfig::load(None, dir.path()).unwrap();
        assert_eq!(local.pricing.round_digits, 0);

        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "[pricing]\nround_digits = 3\n").unwrap();
        let chosen = AppConfig::load(Some(&explicit), dir.path()).unwrap();
        assert_eq!(chosen.pricing.round_digits, 3);
    }

    #[test]
    fn missing_explicit_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
