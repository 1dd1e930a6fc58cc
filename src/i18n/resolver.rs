//! The resolver: provider chain, language selection and change fanout.
//!
//! # Invariants
//!
//! 1. **First match wins**: lookups scan providers in registration order and
//!    return the first `Some`.
//!
//! 2. **No silent language fallback**: when no preference matches an
//!    available language, the current language is `None`, even if languages
//!    are available.
//!
//! 3. **Lock-free fanout**: the provider and observer lists are snapshotted
//!    before use and no lock is held while providers or observers run, so
//!    observers may query the resolver and add or remove observers.

use crate::i18n::language::{preference_list, ExactMatch, LanguageNegotiator, LANGUAGE_STORAGE_KEY};
use crate::i18n::{
    LocalizationEvent, LocalizationMetrics, LocalizationObserver, ObserverId, Provider, ProviderId,
    UpdateCause, UpdateHandle,
};
use crate::locale::{OsLocale, SystemLocale};
use crate::storage::{MemoryPreferenceStore, PreferenceStore};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const DEFAULT_EVENT_CAPACITY: usize = 16;

struct ProviderEntry {
    id: ProviderId,
    provider: Arc<dyn Provider>,
}

struct ObserverEntry {
    id: ObserverId,
    observer: Arc<dyn LocalizationObserver>,
}

pub(crate) struct Inner {
    providers: RwLock<Vec<ProviderEntry>>,
    observers: Mutex<Vec<ObserverEntry>>,
    next_id: AtomicU64,
    store: Arc<dyn PreferenceStore>,
    system_locale: Arc<dyn SystemLocale>,
    negotiator: Box<dyn LanguageNegotiator>,
    default_language: RwLock<Option<String>>,
    events: broadcast::Sender<LocalizationEvent>,
    metrics: LocalizationMetrics,
}

/// Builder for [`Localization`].
pub struct LocalizationBuilder {
    store: Arc<dyn PreferenceStore>,
    system_locale: Arc<dyn SystemLocale>,
    negotiator: Box<dyn LanguageNegotiator>,
    default_language: Option<String>,
    event_capacity: usize,
}

impl LocalizationBuilder {
    /// Where the explicitly chosen language is persisted.
    pub fn preference_store(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        self.store = store;
        self
    }

    pub fn system_locale(mut self, system_locale: Arc<dyn SystemLocale>) -> Self {
        self.system_locale = system_locale;
        self
    }

    pub fn negotiator(mut self, negotiator: Box<dyn LanguageNegotiator>) -> Self {
        self.negotiator = negotiator;
        self
    }

    pub fn default_language(mut self, language: Option<String>) -> Self {
        self.default_language = language;
        self
    }

    /// Buffer size of the broadcast channel behind [`Localization::subscribe`].
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> Localization {
        let (events, _) = broadcast::channel(self.event_capacity);
        Localization {
            inner: Arc::new(Inner {
                providers: RwLock::new(Vec::new()),
                observers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                store: self.store,
                system_locale: self.system_locale,
                negotiator: self.negotiator,
                default_language: RwLock::new(self.default_language),
                events,
                metrics: LocalizationMetrics::new(),
            }),
        }
    }
}

impl Default for LocalizationBuilder {
    fn default() -> Self {
        Self {
            store: Arc::new(MemoryPreferenceStore::new()),
            system_locale: Arc::new(OsLocale),
            negotiator: Box::new(ExactMatch),
            default_language: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Localization resolver.
///
/// Cloning is cheap; clones share the same providers, observers and state.
/// Construct one at the application's composition root and pass it to
/// whatever needs it.
#[derive(Clone)]
pub struct Localization {
    inner: Arc<Inner>,
}

impl Localization {
    /// Resolver with an in-memory preference store, the OS locale list and
    /// exact-match negotiation.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> LocalizationBuilder {
        LocalizationBuilder::default()
    }

    pub(crate) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    // ==================== Providers ====================

    /// Append a provider to the end of the lookup chain.
    pub fn add_provider(&self, provider: Arc<dyn Provider>) -> ProviderId {
        let id = ProviderId(self.next_id());
        self.inner
            .providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ProviderEntry {
                id,
                provider: Arc::clone(&provider),
            });

        provider.attach(UpdateHandle {
            id,
            resolver: Arc::downgrade(&self.inner),
        });
        debug!("Registered {}", id);
        id
    }

    pub fn provider_count(&self) -> usize {
        self.inner
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// A registered provider's data changed: notify everyone.
    ///
    /// Unknown ids are ignored.
    pub fn provider_updated(&self, id: ProviderId) {
        let registered = self
            .inner
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|entry| entry.id == id);

        if !registered {
            debug!("Ignoring update from unregistered {}", id);
            self.inner.metrics.record_ignored_provider_update();
            return;
        }

        self.notify(UpdateCause::ProviderUpdated(id));
    }

    fn providers(&self) -> Vec<Arc<dyn Provider>> {
        self.inner
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|entry| Arc::clone(&entry.provider))
            .collect()
    }

    // ==================== Languages ====================

    /// Sorted, deduplicated union of every provider's languages.
    pub fn available_languages(&self) -> Vec<String> {
        self.providers()
            .iter()
            .flat_map(|provider| provider.languages())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The language lookups currently resolve in.
    ///
    /// Walks the stored language, the system's preferred languages and the
    /// default language, in that order, and returns the first one the
    /// negotiator matches against [`available_languages`](Self::available_languages).
    pub fn preferred_language(&self) -> Option<String> {
        let available = self.available_languages();
        if available.is_empty() {
            return None;
        }

        let preferences = preference_list(
            self.inner.store.get(LANGUAGE_STORAGE_KEY),
            self.inner.system_locale.preferred_languages(),
            self.default_language(),
        );

        self.inner.negotiator.negotiate(&preferences, &available)
    }

    /// Alias for [`preferred_language`](Self::preferred_language).
    pub fn language(&self) -> Option<String> {
        self.preferred_language()
    }

    /// Store `language` as the user's choice and notify.
    ///
    /// The language is not checked against the available languages, and the
    /// notification is sent even when the value did not change.
    pub fn set_language(&self, language: &str) {
        if let Err(e) = self.inner.store.set(LANGUAGE_STORAGE_KEY, language) {
            warn!("Failed to persist language '{}': {}", language, e);
        }
        info!("Language set to '{}'", language);
        self.notify(UpdateCause::LanguageChanged);
    }

    /// Forget the stored language and notify.
    pub fn clear_language(&self) {
        if let Err(e) = self.inner.store.remove(LANGUAGE_STORAGE_KEY) {
            warn!("Failed to clear stored language: {}", e);
        }
        info!("Stored language cleared");
        self.notify(UpdateCause::LanguageChanged);
    }

    pub fn stored_language(&self) -> Option<String> {
        self.inner.store.get(LANGUAGE_STORAGE_KEY)
    }

    pub fn default_language(&self) -> Option<String> {
        self.inner
            .default_language
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Change the last-resort preference. Does not notify.
    pub fn set_default_language(&self, language: Option<String>) {
        *self
            .inner
            .default_language
            .write()
            .unwrap_or_else(PoisonError::into_inner) = language;
    }

    // ==================== Strings ====================

    /// Resolve `key` in the current language.
    pub fn string_for(&self, key: &str) -> Option<String> {
        match self.preferred_language() {
            Some(language) => self.string_for_language(key, &language),
            None => {
                self.inner.metrics.record_unresolved_language();
                None
            }
        }
    }

    /// Resolve `key` in the current language and apply `replacements` in
    /// order (see [`apply_replacements`]).
    pub fn string_for_with<I, K, V>(&self, key: &str, replacements: I) -> Option<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.string_for(key)
            .map(|resolved| apply_replacements(resolved, replacements))
    }

    /// Resolve `key` in an explicit language, bypassing negotiation.
    pub fn string_for_language(&self, key: &str, language: &str) -> Option<String> {
        let found = self
            .providers()
            .iter()
            .find_map(|provider| provider.string_for(key, language));

        if found.is_some() {
            self.inner.metrics.record_hit();
        } else {
            debug!("No provider has '{}' for '{}'", key, language);
            self.inner.metrics.record_miss();
        }
        found
    }

    /// [`string_for_with`](Self::string_for_with) on a blocking-capable
    /// background task, for provider chains that may touch cold storage.
    ///
    /// Concurrent calls complete in no particular order.
    ///
    /// # Panics
    ///
    /// Panics if polled outside a tokio runtime.
    pub async fn string_for_async(
        &self,
        key: impl Into<String>,
        replacements: Vec<(String, String)>,
    ) -> Option<String> {
        let localization = self.clone();
        let key = key.into();
        match tokio::task::spawn_blocking(move || localization.string_for_with(&key, replacements))
            .await
        {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("Background lookup failed: {}", e);
                None
            }
        }
    }

    // ==================== Observers ====================

    pub fn add_observer(&self, observer: Arc<dyn LocalizationObserver>) -> ObserverId {
        let id = ObserverId(self.next_id());
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ObserverEntry { id, observer });
        id
    }

    /// Returns whether the observer was registered.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.inner.observers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|entry| entry.id != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Passive listener for update events.
    pub fn subscribe(&self) -> broadcast::Receiver<LocalizationEvent> {
        self.inner.events.subscribe()
    }

    /// Broadcast an update and run every observer.
    pub fn notify_of_updates(&self) {
        self.notify(UpdateCause::Requested);
    }

    fn notify(&self, cause: UpdateCause) {
        self.inner.metrics.record_notification();

        let event = LocalizationEvent::Updated {
            language: self.preferred_language(),
            cause,
        };
        // No receivers is fine
        let _ = self.inner.events.send(event);

        let snapshot: Vec<(ObserverId, Arc<dyn LocalizationObserver>)> = self
            .inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|entry| (entry.id, Arc::clone(&entry.observer)))
            .collect();

        debug!("Notifying {} observers", snapshot.len());
        for (id, observer) in snapshot {
            // Skip observers removed earlier in this fanout
            if self.is_observer_registered(id) {
                observer.localize(self);
            }
        }
    }

    fn is_observer_registered(&self, id: ObserverId) -> bool {
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|entry| entry.id == id)
    }

    // ==================== Misc ====================

    pub fn metrics(&self) -> &LocalizationMetrics {
        &self.inner.metrics
    }

    fn next_id(&self) -> u64 {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for Localization {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Localization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Localization")
            .field("providers", &self.provider_count())
            .field("observers", &self.observer_count())
            .field("default_language", &self.default_language())
            .finish()
    }
}

/// Replace every occurrence of each pattern, one pair at a time.
///
/// Each step sees the output of the previous one, so
/// `[("{x}", "1"), ("1", "2")]` turns `"a{x}"` into `"a2"`.
pub fn apply_replacements<I, K, V>(text: String, replacements: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    replacements
        .into_iter()
        .fold(text, |current, (pattern, replacement)| {
            let pattern = pattern.as_ref();
            if pattern.is_empty() {
                current
            } else {
                current.replace(pattern, replacement.as_ref())
            }
        })
}
