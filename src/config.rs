//! Runtime configuration from the environment (and an optional `.env`).

use std::path::PathBuf;

use tracing::info;

use crate::error::{AppError, Result};
use crate::pricing::services::DEFAULT_CURRENCY;
use crate::pricing::Catalog;

pub const CATALOG_ENV: &str = "LASER_QUOTE_CATALOG";
pub const CURRENCY_ENV: &str = "LASER_QUOTE_CURRENCY";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// JSON catalog file; the built-in catalog when unset
    pub catalog_path: Option<PathBuf>,
    pub currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let currency = match get(CURRENCY_ENV) {
            Some(code) => {
                let code = code.trim().to_uppercase();
                if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(AppError::Config(format!(
                        "{} must be a three-letter currency code, got '{}'",
                        CURRENCY_ENV, code
                    )));
                }
                code
            }
            None => DEFAULT_CURRENCY.to_string(),
        };

        Ok(Self {
            catalog_path: get(CATALOG_ENV).map(PathBuf::from),
            currency,
        })
    }

    /// Load the configured catalog once for the life of the process.
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => {
                let catalog = Catalog::load(path)?;
                info!(path = %path.display(), packages = catalog.packages.len(), "loaded catalog");
                Ok(catalog)
            }
            None => Ok(Catalog::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.load_catalog().unwrap(), Catalog::builtin());
    }

    #[test]
    fn test_reads_values() {
        let config = Config::from_lookup(lookup(&[
            (CATALOG_ENV, "/etc/laser/catalog.json"),
            (CURRENCY_ENV, "cad"),
        ]))
        .unwrap();
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/laser/catalog.json"))
        );
        assert_eq!(config.currency, "CAD");
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = Config::from_lookup(lookup(&[(CATALOG_ENV, "  "), (CURRENCY_ENV, "")])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_rejects_bad_currency() {
        let err = Config::from_lookup(lookup(&[(CURRENCY_ENV, "dollars")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_missing_catalog_file() {
        let config = Config {
            catalog_path: Some(PathBuf::from("/nonexistent/laser-catalog.json")),
            ..Default::default()
        };
        assert!(matches!(
            config.load_catalog(),
            Err(AppError::Catalog(crate::pricing::CatalogError::Io(_)))
        ));
    }
}
