//! Composition root: wires a [`Localization`] from a [`Config`].

use crate::config::Config;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::i18n::{JsonProvider, Localization, PlaceholderProvider, Provider};
use crate::locale::{OsLocale, SystemLocale};
use crate::retry::RetryConfig;
use crate::storage::{JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct App {
    pub localization: Localization,
    /// The remote-backed provider, if a remote URL is configured
    pub remote: Option<Arc<JsonProvider>>,
}

impl App {
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_system_locale(config, Arc::new(OsLocale))
    }

    /// Provider order: local JSON file, remote JSON source, placeholders.
    pub fn with_system_locale(config: &Config, system_locale: Arc<dyn SystemLocale>) -> Result<Self> {
        let store: Arc<dyn PreferenceStore> = match config
            .preferences_file
            .clone()
            .or_else(JsonFilePreferenceStore::default_path)
        {
            Some(path) => {
                info!("Using language preferences at {}", path.display());
                Arc::new(JsonFilePreferenceStore::open(path))
            }
            None => {
                warn!("No config directory available, language choice will not persist");
                Arc::new(MemoryPreferenceStore::new())
            }
        };

        let localization = Localization::builder()
            .preference_store(store)
            .system_locale(system_locale)
            .negotiator(config.negotiation.negotiator())
            .default_language(config.default_language.clone())
            .build();

        let fetcher: Arc<dyn Fetcher> = Arc::new(
            HttpFetcher::new(Duration::from_secs(config.http_timeout_secs))
                .context("Failed to build HTTP client")?,
        );

        if let Some(path) = &config.json_file {
            let provider = JsonProvider::with_fetcher(
                Some(path.clone()),
                None,
                config.single_language.clone(),
                Arc::clone(&fetcher),
            );
            if provider.is_empty() {
                warn!("No strings loaded from {}", path.display());
            }
            localization.add_provider(Arc::new(provider));
        }

        let remote = config.remote_url.as_ref().map(|url| {
            let provider = Arc::new(
                JsonProvider::with_fetcher(
                    config.cache_file.clone(),
                    Some(url.clone()),
                    config.single_language.clone(),
                    Arc::clone(&fetcher),
                )
                .with_retry(RetryConfig::remote_fetch(config.fetch_attempts)),
            );
            localization.add_provider(provider.clone());
            provider
        });

        if config.placeholders {
            localization.add_provider(Arc::new(PlaceholderProvider));
        }

        info!(
            "Localization ready: {} providers, languages [{}]",
            localization.provider_count(),
            localization.available_languages().join(", ")
        );

        Ok(Self {
            localization,
            remote,
        })
    }

    /// Fetch the remote source once and wait for the outcome.
    ///
    /// Returns whether new data was adopted.
    pub async fn refresh_remote(&self) -> bool {
        let Some(handle) = self.remote.as_ref().and_then(|p| p.fetch_asynchronously()) else {
            return false;
        };
        match handle.await {
            Ok(adopted) => adopted,
            Err(e) => {
                warn!("Refresh task failed: {}", e);
                false
            }
        }
    }

    /// Languages the remote provider currently holds.
    pub fn remote_languages(&self) -> Vec<String> {
        self.remote
            .as_ref()
            .map(|provider| provider.languages().into_iter().collect())
            .unwrap_or_default()
    }
}
