use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::scraping::DEFAULT_BESTLIST_URL;
use crate::synchronization::retry::DEFAULT_MAX_ATTEMPTS;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Holds `ignored.json` and the `anomalies/` directory.
    pub data_dir: PathBuf,
    pub score_lists_dir: PathBuf,
    pub bestlist_url: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            database_url: lookup("DATABASE_URL").context("Cannot load DATABASE_URL env variable")?,
            data_dir: lookup("TRACK_DATA_DIR")
                .unwrap_or_else(|| "./data".to_string())
                .into(),
            score_lists_dir: lookup("SCORE_LISTS_DIR")
                .unwrap_or_else(|| "./scores".to_string())
                .into(),
            bestlist_url: lookup("BESTLIST_URL")
                .unwrap_or_else(|| DEFAULT_BESTLIST_URL.to_string()),
            request_timeout: Duration::from_secs(match lookup("REQUEST_TIMEOUT_SECS") {
                Some(value) => value
                    .parse()
                    .context("REQUEST_TIMEOUT_SECS must be a number")?,
                None => 10,
            }),
            max_retries: match lookup("MAX_RETRIES") {
                Some(value) => value.parse().context("MAX_RETRIES must be a number")?,
                None => DEFAULT_MAX_ATTEMPTS,
            },
        })
    }

    pub fn ignored_entries_path(&self) -> PathBuf {
        self.data_dir.join("ignored.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/ti")]))
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.score_lists_dir, PathBuf::from("./scores"));
        assert_eq!(config.bestlist_url, DEFAULT_BESTLIST_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 3);
        assert_eq!(
            config.ignored_entries_path(),
            PathBuf::from("./data/ignored.json")
        );
    }

    #[test]
    fn test_database_url_is_required() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/ti"),
            ("MAX_RETRIES", "three"),
        ]));
        assert!(result.is_err());
    }
}
