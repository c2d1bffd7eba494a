use std::env;
use std::str::FromStr;

use anyhow::Result;

use crate::clusters::kmeans::DEFAULT_SEED;
use crate::topics::emerging::DEFAULT_WINDOW;

pub const DEFAULT_DB_PATH: &str = "./data/blogpulse.db";
pub const DEFAULT_MAX_FEATURES: usize = 500;
pub const DEFAULT_CLUSTERS: usize = 8;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy, so every value here can
/// live there instead of in the shell.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: String,
    /// Vocabulary cap for both the post-level and blog-level vectorizers
    pub max_features: usize,
    /// Cluster count requested when `clusters` is run without `--k`
    pub clusters: usize,
    /// Seed for k-means initialization
    pub seed: u64,
    /// Periods averaged as the emerging-topic baseline
    pub emerging_window: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            max_features: DEFAULT_MAX_FEATURES,
            clusters: DEFAULT_CLUSTERS,
            seed: DEFAULT_SEED,
            emerging_window: DEFAULT_WINDOW,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to defaults. A set but malformed value is
    /// an error rather than silently ignored.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `load` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            db_path: lookup("BLOGPULSE_DB_PATH")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.db_path),
            max_features: parse_var(&lookup, "BLOGPULSE_MAX_FEATURES", defaults.max_features)?,
            clusters: parse_var(&lookup, "BLOGPULSE_CLUSTERS", defaults.clusters)?,
            seed: parse_var(&lookup, "BLOGPULSE_SEED", defaults.seed)?,
            emerging_window: parse_var(&lookup, "BLOGPULSE_EMERGING_WINDOW", defaults.emerging_window)?,
        };

        if config.max_features == 0 {
            anyhow::bail!("BLOGPULSE_MAX_FEATURES must be at least 1");
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse() {
            Ok(value) => Ok(value),
            Err(_) => anyhow::bail!(
                "{key} has invalid value {raw:?}. Expected a non-negative integer.\n\
                 Fix it in your .env file or unset it to use the default."
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_features, 500);
        assert_eq!(config.seed, 42);
        assert_eq!(config.emerging_window, 3);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("BLOGPULSE_DB_PATH", "/tmp/x.db"),
            ("BLOGPULSE_CLUSTERS", " 4 "),
            ("BLOGPULSE_SEED", "7"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, "/tmp/x.db");
        assert_eq!(config.clusters, 4);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("BLOGPULSE_CLUSTERS", "lots")])).unwrap_err();
        assert!(err.to_string().contains("BLOGPULSE_CLUSTERS"));
    }

    #[test]
    fn test_zero_max_features_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("BLOGPULSE_MAX_FEATURES", "0")])).is_err());
    }
}
