//! Provider over a platform string-table lookup.
//!
//! Platform catalogs usually return *some* string for every key (the key
//! itself or a caller-supplied default) and cannot report "missing" directly.
//! [`CatalogProvider`] passes a per-provider unique sentinel as the default and
//! treats getting it back as "not found", which keeps a stored empty string
//! distinguishable from a missing entry.

use crate::i18n::Provider;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Table name used when none is given.
pub const DEFAULT_TABLE: &str = "Localizable";

/// A platform string catalog.
pub trait StringTableLookup: Send + Sync {
    /// Localizations the catalog ships with.
    fn localizations(&self) -> Vec<String>;

    /// Localized value for `key` in `table`, or `default_value` when missing.
    fn lookup(&self, key: &str, default_value: &str, table: Option<&str>) -> String;
}

/// In-process catalog, keyed by table name then key.
///
/// Holds the strings of the catalog's active localization only, the same way
/// a platform bundle resolves against its own current localization.
#[derive(Debug, Clone, Default)]
pub struct MemoryStringTable {
    localizations: Vec<String>,
    tables: HashMap<String, HashMap<String, String>>,
}

impl MemoryStringTable {
    pub fn new<I, S>(localizations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            localizations: localizations.into_iter().map(Into::into).collect(),
            tables: HashMap::new(),
        }
    }

    pub fn insert(&mut self, table: Option<&str>, key: impl Into<String>, value: impl Into<String>) {
        self.tables
            .entry(table.unwrap_or(DEFAULT_TABLE).to_string())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn with_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(None, key, value);
        self
    }
}

impl StringTableLookup for MemoryStringTable {
    fn localizations(&self) -> Vec<String> {
        self.localizations.clone()
    }

    fn lookup(&self, key: &str, default_value: &str, table: Option<&str>) -> String {
        self.tables
            .get(table.unwrap_or(DEFAULT_TABLE))
            .and_then(|strings| strings.get(key))
            .cloned()
            .unwrap_or_else(|| default_value.to_string())
    }
}

/// Provider backed by a [`StringTableLookup`].
///
/// The catalog answers in its own active localization: the `language`
/// argument of `string_for` does not switch it.
#[derive(Debug)]
pub struct CatalogProvider<L> {
    catalog: L,
    table: Option<String>,
    sentinel: String,
}

impl<L: StringTableLookup> CatalogProvider<L> {
    pub fn new(catalog: L, table: Option<String>) -> Self {
        Self {
            catalog,
            table,
            sentinel: Uuid::new_v4().to_string(),
        }
    }

    pub fn catalog(&self) -> &L {
        &self.catalog
    }
}

impl<L: StringTableLookup> Provider for CatalogProvider<L> {
    fn languages(&self) -> BTreeSet<String> {
        self.catalog.localizations().into_iter().collect()
    }

    fn string_for(&self, key: &str, _language: &str) -> Option<String> {
        let default_value = format!("{}-{}", self.sentinel, key);
        let localized = self
            .catalog
            .lookup(key, &default_value, self.table.as_deref());

        if localized == default_value {
            None
        } else {
            Some(localized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MemoryStringTable {
        MemoryStringTable::new(["en", "ru"])
            .with_string("greeting", "Hello")
            .with_string("empty", "")
    }

    #[test]
    fn test_found_key() {
        let provider = CatalogProvider::new(catalog(), None);
        assert_eq!(provider.string_for("greeting", "en"), Some("Hello".to_string()));
    }

    #[test]
    fn test_missing_key_is_none() {
        let provider = CatalogProvider::new(catalog(), None);
        assert_eq!(provider.string_for("farewell", "en"), None);
    }

    #[test]
    fn test_found_empty_string_is_not_missing() {
        let provider = CatalogProvider::new(catalog(), None);
        assert_eq!(provider.string_for("empty", "en"), Some(String::new()));
    }

    #[test]
    fn test_language_argument_does_not_switch_catalog() {
        let provider = CatalogProvider::new(catalog(), None);
        assert_eq!(provider.string_for("greeting", "ru"), Some("Hello".to_string()));
    }

    #[test]
    fn test_languages_are_catalog_localizations() {
        let provider = CatalogProvider::new(catalog(), None);
        let languages: Vec<_> = provider.languages().into_iter().collect();
        assert_eq!(languages, vec!["en", "ru"]);
    }

    #[test]
    fn test_named_table() {
        let mut strings = MemoryStringTable::new(["en"]);
        strings.insert(Some("Settings"), "title", "Settings");

        let default_table = CatalogProvider::new(strings.clone(), None);
        let settings_table = CatalogProvider::new(strings, Some("Settings".to_string()));

        assert_eq!(default_table.string_for("title", "en"), None);
        assert_eq!(settings_table.string_for("title", "en"), Some("Settings".to_string()));
    }

    #[test]
    fn test_value_equal_to_key_is_found() {
        // Catalogs that echo the key for missing entries would defeat a
        // key-based check; the sentinel does not care.
        let provider = CatalogProvider::new(MemoryStringTable::new(["en"]).with_string("OK", "OK"), None);
        assert_eq!(provider.string_for("OK", "en"), Some("OK".to_string()));
    }

    #[test]
    fn test_sentinels_differ_between_providers() {
        let first = CatalogProvider::new(catalog(), None);
        let second = CatalogProvider::new(catalog(), None);
        assert_ne!(first.sentinel, second.sentinel);
    }
}
