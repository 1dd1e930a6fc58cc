//! Change notification types.

use crate::i18n::{Localization, ProviderId};
use std::fmt;

/// Something that re-renders itself when the language or string data changes.
///
/// Observers get the resolver as an argument, so they do not need to capture
/// a `Localization` clone (which would keep the resolver alive through its
/// own observer list).
pub trait LocalizationObserver: Send + Sync {
    fn localize(&self, localization: &Localization);
}

/// Registration token for an observer, unique within one resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u64);

/// Why a notification was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCause {
    /// The stored language was set or cleared.
    LanguageChanged,
    /// A registered provider adopted new data.
    ProviderUpdated(ProviderId),
    /// `notify_of_updates` was called directly.
    Requested,
}

/// Broadcast to passive subscribers on every update, just before the
/// observers run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalizationEvent {
    Updated {
        /// The current language at the time of the update.
        language: Option<String>,
        cause: UpdateCause,
    },
}

type Handler = Box<dyn Fn(&Localization) + Send + Sync>;

/// An observer made from a closure.
pub struct Localizer {
    handler: Handler,
}

impl Localizer {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Localization) + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }

    /// Register `handler` with `localization` and run it once right away, so
    /// the caller starts out localized without waiting for the first update.
    pub fn attach<F>(localization: &Localization, handler: F) -> ObserverId
    where
        F: Fn(&Localization) + Send + Sync + 'static,
    {
        let localizer = std::sync::Arc::new(Self::new(handler));
        let id = localization.add_observer(localizer.clone());
        localizer.localize(localization);
        id
    }
}

impl LocalizationObserver for Localizer {
    fn localize(&self, localization: &Localization) {
        (self.handler)(localization)
    }
}

impl fmt::Debug for Localizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Localizer").finish_non_exhaustive()
    }
}
