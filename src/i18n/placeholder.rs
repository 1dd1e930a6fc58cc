use crate::i18n::Provider;
use std::collections::BTreeSet;

/// Answers every lookup with `[language: key]`.
///
/// Register it last so untranslated keys show up visibly instead of
/// rendering as nothing. It advertises no languages of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderProvider;

impl Provider for PlaceholderProvider {
    fn languages(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn string_for(&self, key: &str, language: &str) -> Option<String> {
        Some(format!("[{}: {}]", language, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_format() {
        assert_eq!(
            PlaceholderProvider.string_for("missingKey", "fr"),
            Some("[fr: missingKey]".to_string())
        );
    }

    #[test]
    fn test_placeholder_is_deterministic() {
        let first = PlaceholderProvider.string_for("title", "en");
        let second = PlaceholderProvider.string_for("title", "en");
        assert_eq!(first, second);
    }

    #[test]
    fn test_placeholder_advertises_no_languages() {
        assert!(PlaceholderProvider.languages().is_empty());
    }
}
