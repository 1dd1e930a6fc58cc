//! Language negotiation: picking one available language from an ordered
//! preference list.
//!
//! Language identifiers are opaque strings compared exactly. Region-aware
//! matching is opt-in through [`PrimarySubtagMatch`].

use anyhow::{bail, Result};
use std::str::FromStr;

/// Preference-store key under which the explicitly chosen language is kept.
pub const LANGUAGE_STORAGE_KEY: &str = "MCLocalization.languageStorageKey";

/// Build the ordered preference list: stored override, then the system's
/// preferred languages in system order, then the configured default.
pub fn preference_list(
    stored: Option<String>,
    system: Vec<String>,
    default: Option<String>,
) -> Vec<String> {
    stored.into_iter().chain(system).chain(default).collect()
}

/// Strategy for matching preferences against available languages.
pub trait LanguageNegotiator: Send + Sync {
    /// Return the best available language for `preferences`, or `None` when
    /// nothing matches. `available` is sorted and deduplicated.
    fn negotiate(&self, preferences: &[String], available: &[String]) -> Option<String>;
}

/// The first preference that exactly equals an available language wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl LanguageNegotiator for ExactMatch {
    fn negotiate(&self, preferences: &[String], available: &[String]) -> Option<String> {
        preferences
            .iter()
            .find(|preferred| available.contains(preferred))
            .cloned()
    }
}

/// Like [`ExactMatch`], but a preference that has no exact match may also
/// match on its primary subtag (`en-US` matches `en`, then `en-GB`).
///
/// Preferences are still walked in order: a region match for an earlier
/// preference beats an exact match for a later one.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimarySubtagMatch;

impl LanguageNegotiator for PrimarySubtagMatch {
    fn negotiate(&self, preferences: &[String], available: &[String]) -> Option<String> {
        for preferred in preferences {
            if available.contains(preferred) {
                return Some(preferred.clone());
            }

            let primary = primary_subtag(preferred);
            if let Some(bare) = available.iter().find(|lang| lang.eq_ignore_ascii_case(primary)) {
                return Some(bare.clone());
            }
            if let Some(sibling) = available
                .iter()
                .find(|lang| primary_subtag(lang).eq_ignore_ascii_case(primary))
            {
                return Some(sibling.clone());
            }
        }
        None
    }
}

fn primary_subtag(language: &str) -> &str {
    language
        .split(|c| c == '-' || c == '_')
        .next()
        .unwrap_or(language)
}

/// Negotiation strategy selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Negotiation {
    #[default]
    Exact,
    PrimarySubtag,
}

impl Negotiation {
    pub fn negotiator(self) -> Box<dyn LanguageNegotiator> {
        match self {
            Negotiation::Exact => Box::new(ExactMatch),
            Negotiation::PrimarySubtag => Box::new(PrimarySubtagMatch),
        }
    }
}

impl FromStr for Negotiation {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Negotiation::Exact),
            "primary-subtag" | "primary_subtag" | "region" => Ok(Negotiation::PrimarySubtag),
            other => bail!("Unknown negotiation strategy: '{}'", other),
        }
    }
}
