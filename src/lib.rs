//! Runtime localization resolver.
//!
//! Chains string providers in priority order, negotiates the current language
//! from the stored choice, the system locale and a configured default, and
//! notifies observers whenever the language or any provider's data changes.

pub mod app;
pub mod config;
pub mod error;
pub mod fetch;
pub mod i18n;
pub mod locale;
pub mod retry;
pub mod storage;

pub use error::LocalizationError;
pub use i18n::{Localization, Provider};
