//! Localization core: providers, language negotiation, the resolver and
//! change notifications.
//!
//! # Architecture
//!
//! - `provider`: the `Provider` capability every string source implements
//! - `json`: JSON string tables with an optional remote refresh
//! - `catalog`: platform string catalogs with sentinel-based miss detection
//! - `placeholder`: `[language: key]` answers for untranslated keys
//! - `language`: preference lists and pluggable negotiation
//! - `resolver`: the `Localization` resolver tying it all together
//! - `observer`: observer trait, events and the closure-based `Localizer`
//! - `metrics`: per-resolver lookup counters
//!
//! # Example
//!
//! ```rust,ignore
//! use localization_resolver::i18n::{Localization, JsonProvider, PlaceholderProvider};
//! use std::sync::Arc;
//!
//! let localization = Localization::new();
//! let strings = Arc::new(JsonProvider::multi_language_file("strings.json"));
//! localization.add_provider(strings.clone());
//! localization.add_provider(Arc::new(PlaceholderProvider));
//!
//! let title = localization.string_for("title");
//! let greeting = localization.string_for_with("greeting", [("{name}", "Ada")]);
//! ```

mod catalog;
mod json;
pub mod language;
mod metrics;
mod observer;
mod placeholder;
mod provider;
mod resolver;

pub use catalog::{CatalogProvider, MemoryStringTable, StringTableLookup, DEFAULT_TABLE};
pub use json::{JsonProvider, StringTable};
pub use language::{ExactMatch, LanguageNegotiator, Negotiation, PrimarySubtagMatch, LANGUAGE_STORAGE_KEY};
pub use metrics::{LocalizationMetrics, MetricsReport};
pub use observer::{LocalizationEvent, LocalizationObserver, Localizer, ObserverId, UpdateCause};
pub use placeholder::PlaceholderProvider;
pub use provider::{Provider, ProviderId, UpdateHandle};
pub use resolver::{apply_replacements, Localization, LocalizationBuilder};
