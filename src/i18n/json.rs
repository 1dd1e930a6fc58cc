//! JSON-backed provider with an optional remote refresh.
//!
//! A payload is either multi-language (`{"en": {"key": "value"}}`), which
//! replaces the whole table, or single-language (`{"key": "value"}`), which
//! requires a configured language and replaces only that language's entry.
//!
//! # Refresh
//!
//! The local source is read once, synchronously, at construction. After that
//! [`JsonProvider::fetch_asynchronously`] fetches the remote source on a
//! spawned task. Only a payload that parses into one of the two shapes is
//! adopted; any failure leaves the current table untouched. After adoption
//! the raw bytes are written to the local source (best-effort) so the next
//! start can load them, and the resolver is notified through the provider's
//! [`UpdateHandle`].

use crate::error::{LocalizationError, Result};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::i18n::{Provider, UpdateHandle};
use crate::retry::{with_retry_if, RetryConfig};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const CACHE_DIR: &str = "localization-resolver";

/// language -> key -> string
pub type StringTable = HashMap<String, HashMap<String, String>>;

enum Adoption {
    Replace(StringTable),
    Merge(String, HashMap<String, String>),
}

pub struct JsonProvider {
    strings: RwLock<StringTable>,
    synchronous_source: Option<PathBuf>,
    asynchronous_source: Option<String>,
    language: Option<String>,
    fetcher: Arc<dyn Fetcher>,
    retry: RetryConfig,
    handles: Mutex<Vec<UpdateHandle>>,
}

impl JsonProvider {
    /// Create a provider and load `synchronous_source` right away.
    ///
    /// `language` is only needed for single-language payloads.
    pub fn new(
        synchronous_source: Option<PathBuf>,
        asynchronous_source: Option<String>,
        language: Option<String>,
    ) -> Self {
        Self::with_fetcher(
            synchronous_source,
            asynchronous_source,
            language,
            Arc::new(HttpFetcher::default()),
        )
    }

    /// Same as [`JsonProvider::new`] with a custom transport.
    pub fn with_fetcher(
        synchronous_source: Option<PathBuf>,
        asynchronous_source: Option<String>,
        language: Option<String>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let provider = Self {
            strings: RwLock::new(StringTable::new()),
            synchronous_source,
            asynchronous_source,
            language,
            fetcher,
            retry: RetryConfig::default(),
            handles: Mutex::new(Vec::new()),
        };
        provider.load_synchronously();
        provider
    }

    /// A local JSON file, single-language when `language` is set.
    pub fn from_file(language: Option<&str>, path: impl Into<PathBuf>) -> Self {
        Self::new(Some(path.into()), None, language.map(str::to_string))
    }

    /// A local multi-language JSON file.
    pub fn multi_language_file(path: impl Into<PathBuf>) -> Self {
        Self::from_file(None, path)
    }

    /// A remote source cached as `cache_name` in the per-user data directory.
    ///
    /// Without a cache name (or a data directory) nothing is loaded until the
    /// first successful fetch.
    pub fn remote(language: Option<&str>, url: impl Into<String>, cache_name: Option<&str>) -> Self {
        let cache = cache_name.and_then(|name| {
            dirs::data_dir().map(|mut path| {
                path.push(CACHE_DIR);
                path.push(name);
                path
            })
        });
        Self::new(cache, Some(url.into()), language.map(str::to_string))
    }

    /// Retry transient transport failures within a single fetch.
    pub fn with_retry(mut self, mut retry: RetryConfig) -> Self {
        retry.max_attempts = retry.max_attempts.max(1);
        self.retry = retry;
        self
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.read_strings().is_empty()
    }

    /// Spawn a refresh from the remote source on the current tokio runtime.
    ///
    /// Returns `None` when no remote source is configured. The handle
    /// resolves to whether the fetched data was adopted; failures are logged
    /// and otherwise swallowed. Each call fetches independently.
    ///
    /// Observers of the resolver run on the runtime worker thread that
    /// adopted the data, before the handle resolves. Callers that need them
    /// on a particular thread should await the handle there and react to
    /// [`LocalizationEvent`](crate::i18n::LocalizationEvent)s instead.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn fetch_asynchronously(self: &Arc<Self>) -> Option<JoinHandle<bool>> {
        if self.asynchronous_source.is_none() {
            debug!("JSON provider has no remote source, nothing to fetch");
            return None;
        }

        let provider = Arc::clone(self);
        Some(tokio::spawn(async move {
            match provider.refresh().await {
                Ok(()) => true,
                Err(e) => {
                    warn!("String table refresh failed, keeping current data: {}", e);
                    false
                }
            }
        }))
    }

    /// Fetch, parse and adopt the remote source, then notify the resolver.
    ///
    /// On error the table is left exactly as it was.
    pub async fn refresh(&self) -> Result<()> {
        let url = self
            .asynchronous_source
            .as_deref()
            .ok_or(LocalizationError::NoRemoteSource)?;

        let bytes = with_retry_if(
            &self.retry,
            &format!("Fetch {}", url),
            || self.fetcher.read_async(url),
            LocalizationError::is_transient,
        )
        .await?;

        let adoption = parse_payload(&bytes, self.language.as_deref())?;
        self.adopt(adoption);
        info!("Adopted string table from {}", url);

        if let Some(path) = self.synchronous_source.clone() {
            let fetcher = Arc::clone(&self.fetcher);
            match tokio::task::spawn_blocking(move || fetcher.write_sync(&path, &bytes)).await {
                Ok(Ok(())) => debug!("Cached fetched string table"),
                Ok(Err(e)) => warn!("Failed to cache fetched string table: {}", e),
                Err(e) => warn!("Cache write task failed: {}", e),
            }
        }

        self.signal_updated();
        Ok(())
    }

    fn load_synchronously(&self) {
        let Some(path) = &self.synchronous_source else {
            return;
        };

        let loaded = self
            .fetcher
            .read_sync(path)
            .and_then(|bytes| parse_payload(&bytes, self.language.as_deref()));

        match loaded {
            Ok(adoption) => {
                self.adopt(adoption);
                debug!("Loaded string table from {}", path.display());
            }
            Err(LocalizationError::Io { .. }) => {
                debug!("No string table at {}", path.display());
            }
            Err(e) => {
                warn!("Ignoring string table at {}: {}", path.display(), e);
            }
        }
    }

    fn adopt(&self, adoption: Adoption) {
        let mut strings = self.strings.write().unwrap_or_else(PoisonError::into_inner);
        match adoption {
            Adoption::Replace(table) => *strings = table,
            Adoption::Merge(language, table) => {
                strings.insert(language, table);
            }
        }
    }

    fn signal_updated(&self) {
        let handles = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for handle in handles {
            if !handle.notify() {
                debug!("Resolver for {} is gone", handle.provider_id());
            }
        }
    }

    fn read_strings(&self) -> std::sync::RwLockReadGuard<'_, StringTable> {
        self.strings.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Provider for JsonProvider {
    fn languages(&self) -> BTreeSet<String> {
        self.read_strings().keys().cloned().collect()
    }

    fn string_for(&self, key: &str, language: &str) -> Option<String> {
        self.read_strings()
            .get(language)
            .and_then(|strings| strings.get(key))
            .cloned()
    }

    fn attach(&self, handle: UpdateHandle) {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }
}

impl std::fmt::Debug for JsonProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonProvider")
            .field("synchronous_source", &self.synchronous_source)
            .field("asynchronous_source", &self.asynchronous_source)
            .field("language", &self.language)
            .field("languages", &self.languages())
            .finish()
    }
}

/// Interpret raw bytes as one of the two accepted payload shapes.
fn parse_payload(bytes: &[u8], language: Option<&str>) -> Result<Adoption> {
    let value: Value = serde_json::from_slice(bytes)?;

    if let Ok(table) = serde_json::from_value::<StringTable>(value.clone()) {
        return Ok(Adoption::Replace(table));
    }

    match serde_json::from_value::<HashMap<String, String>>(value) {
        Ok(strings) => match language {
            Some(language) => Ok(Adoption::Merge(language.to_string(), strings)),
            None => Err(LocalizationError::MissingLanguage),
        },
        Err(_) => Err(LocalizationError::UnrecognizedShape),
    }
}
