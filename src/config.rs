use crate::i18n::Negotiation;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Language selection
    pub default_language: Option<String>,
    pub negotiation: Negotiation,
    pub preferences_file: Option<PathBuf>,

    // Local strings
    pub json_file: Option<PathBuf>,
    pub single_language: Option<String>,

    // Remote strings
    pub remote_url: Option<String>,
    pub cache_file: Option<PathBuf>,
    pub http_timeout_secs: u64,
    pub fetch_attempts: u32,

    // Missing-translation placeholders
    pub placeholders: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_language: None,
            negotiation: Negotiation::Exact,
            preferences_file: None,
            json_file: None,
            single_language: None,
            remote_url: None,
            cache_file: None,
            http_timeout_secs: 10,
            fetch_attempts: 1,
            placeholders: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            default_language: var("LOCALIZATION_DEFAULT_LANGUAGE"),
            negotiation: var("LOCALIZATION_NEGOTIATION")
                .map(|value| value.parse::<Negotiation>())
                .transpose()
                .context("LOCALIZATION_NEGOTIATION must be 'exact' or 'primary-subtag'")?
                .unwrap_or(defaults.negotiation),
            preferences_file: var("LOCALIZATION_PREFERENCES_FILE").map(PathBuf::from),

            json_file: var("LOCALIZATION_JSON_FILE").map(PathBuf::from),
            single_language: var("LOCALIZATION_SINGLE_LANGUAGE"),

            remote_url: var("LOCALIZATION_REMOTE_URL"),
            cache_file: var("LOCALIZATION_CACHE_FILE").map(PathBuf::from),
            http_timeout_secs: var("LOCALIZATION_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.http_timeout_secs),
            fetch_attempts: var("LOCALIZATION_FETCH_ATTEMPTS")
                .and_then(|v| v.parse().ok())
                .filter(|attempts| *attempts > 0)
                .unwrap_or(defaults.fetch_attempts),

            placeholders: var("LOCALIZATION_PLACEHOLDERS")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.placeholders),
        })
    }
}

fn parse_bool(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
