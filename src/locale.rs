//! System locale preferences.

/// Source of the user's preferred languages, most preferred first.
pub trait SystemLocale: Send + Sync {
    fn preferred_languages(&self) -> Vec<String>;
}

/// Reads the operating system's locale list via `sys-locale`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsLocale;

impl SystemLocale for OsLocale {
    fn preferred_languages(&self) -> Vec<String> {
        sys_locale::get_locales().collect()
    }
}

/// A fixed preference list, for tests and for hosts that negotiate the
/// locale themselves.
#[derive(Debug, Clone, Default)]
pub struct FixedLocale {
    languages: Vec<String>,
}

impl FixedLocale {
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
        }
    }
}

impl SystemLocale for FixedLocale {
    fn preferred_languages(&self) -> Vec<String> {
        self.languages.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_locale_preserves_order() {
        let locale = FixedLocale::new(["ru", "en-US", "en"]);
        assert_eq!(locale.preferred_languages(), vec!["ru", "en-US", "en"]);
    }

    #[test]
    fn test_fixed_locale_default_is_empty() {
        assert!(FixedLocale::default().preferred_languages().is_empty());
    }

    #[test]
    fn test_os_locale_entries_are_non_empty() {
        // System dependent: only check that whatever comes back is usable
        for language in OsLocale.preferred_languages() {
            assert!(!language.is_empty());
        }
    }
}
