//! The provider capability shared by every string source.

use crate::i18n::resolver::Inner;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Weak;

/// A source of localized strings for one or more languages.
///
/// `string_for` must return `None` (never an empty placeholder) when the
/// provider has no answer, so the resolver can fall through to the next
/// provider in the chain.
pub trait Provider: Send + Sync {
    /// Languages this provider currently has data for.
    fn languages(&self) -> BTreeSet<String>;

    /// Look up `key` for `language`.
    fn string_for(&self, key: &str, language: &str) -> Option<String>;

    /// Called once when the provider is registered with a resolver.
    ///
    /// Providers whose data can change after registration keep the handle and
    /// call [`UpdateHandle::notify`] when they do. The default ignores it.
    fn attach(&self, _handle: UpdateHandle) {}
}

/// Registration token for a provider, unique within one resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(pub(crate) u64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider#{}", self.0)
    }
}

/// Lets a registered provider tell its resolver that its data changed.
///
/// Holds only a weak reference: a dropped resolver turns `notify` into a
/// no-op instead of keeping the resolver alive.
#[derive(Clone)]
pub struct UpdateHandle {
    pub(crate) id: ProviderId,
    pub(crate) resolver: Weak<Inner>,
}

impl UpdateHandle {
    pub fn provider_id(&self) -> ProviderId {
        self.id
    }

    /// Forward to `Localization::provider_updated` for this provider.
    ///
    /// Returns `false` when the resolver no longer exists.
    pub fn notify(&self) -> bool {
        match self.resolver.upgrade() {
            Some(inner) => {
                crate::i18n::Localization::from_inner(inner).provider_updated(self.id);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for UpdateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateHandle")
            .field("id", &self.id)
            .field("resolver_alive", &(self.resolver.strong_count() > 0))
            .finish()
    }
}
