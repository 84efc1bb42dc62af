//! Locale type: validated handle to a registry entry.

use crate::i18n::{LocaleConfig, LocaleRegistry};
use anyhow::{bail, Result};
use std::fmt;

/// A validated site locale.
///
/// Only codes present and enabled in the registry can be turned into a
/// `Locale`, so the handle is cheap to copy and always resolvable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale {
    /// Locale code (e.g., "de", "en")
    code: &'static str,
}

impl Locale {
    pub const DE: Locale = Locale { code: "de" };
    pub const EN: Locale = Locale { code: "en" };
    pub const PT: Locale = Locale { code: "pt" };
    pub const FR: Locale = Locale { code: "fr" };

    /// Create a Locale from a code string.
    ///
    /// # Returns
    /// * `Ok(Locale)` if the code is known and enabled
    /// * `Err` if the code is unknown or disabled
    pub fn from_code(code: &str) -> Result<Locale> {
        match LocaleRegistry::get().get_by_code(code) {
            Some(config) if config.enabled => Ok(Locale { code: config.code }),
            Some(_) => bail!("Locale '{}' is not enabled", code),
            None => bail!("Unknown locale code: '{}'", code),
        }
    }

    /// The source locale all targets are translated from.
    pub fn canonical() -> Locale {
        Locale {
            code: LocaleRegistry::get().canonical().code,
        }
    }

    /// Enabled translation targets, in the order they are synced.
    pub fn targets() -> Vec<Locale> {
        LocaleRegistry::get()
            .targets()
            .map(|config| Locale { code: config.code })
            .collect()
    }

    /// Every enabled locale, canonical first.
    pub fn all() -> Vec<Locale> {
        LocaleRegistry::get()
            .list_enabled()
            .map(|config| Locale { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Registry entry for this locale.
    ///
    /// Locales are only built from registry codes, so the lookup always hits;
    /// the canonical entry is returned as a last resort.
    pub fn config(&self) -> &'static LocaleConfig {
        let registry = LocaleRegistry::get();
        registry
            .get_by_code(self.code)
            .unwrap_or_else(|| registry.canonical())
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Value for the HTML `lang` attribute
    pub fn html_lang(&self) -> &'static str {
        self.config().html_lang
    }

    /// Language code the translation service expects
    pub fn deepl_code(&self) -> &'static str {
        self.config().deepl_code
    }

    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Constant Tests ====================

    #[test]
    fn test_german_constant() {
        let german = Locale::DE;
        assert_eq!(german.code(), "de");
        assert_eq!(german.native_name(), "Deutsch");
        assert!(german.is_canonical());
    }

    #[test]
    fn test_target_constants() {
        assert_eq!(Locale::EN.deepl_code(), "EN-GB");
        assert_eq!(Locale::PT.deepl_code(), "PT-PT");
        assert_eq!(Locale::FR.deepl_code(), "FR");
        assert!(!Locale::FR.is_canonical());
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_known() {
        let locale = Locale::from_code("pt").expect("Should succeed");
        assert_eq!(locale, Locale::PT);
        assert_eq!(locale.name(), "Portuguese");
    }

    #[test]
    fn test_from_code_invalid() {
        assert!(Locale::from_code("es").is_err());
        assert!(Locale::from_code("").is_err());
        assert!(Locale::from_code("DE").is_err());
    }

    #[test]
    fn test_from_code_error_message() {
        let err = Locale::from_code("xx").unwrap_err();
        assert!(err.to_string().contains("Unknown locale code"));
    }

    // ==================== Collection Tests ====================

    #[test]
    fn test_canonical_is_german() {
        assert_eq!(Locale::canonical(), Locale::DE);
    }

    #[test]
    fn test_targets_exclude_canonical() {
        assert_eq!(Locale::targets(), vec![Locale::EN, Locale::PT, Locale::FR]);
    }

    #[test]
    fn test_all_locales() {
        assert_eq!(
            Locale::all(),
            vec![Locale::DE, Locale::EN, Locale::PT, Locale::FR]
        );
    }

    // ==================== Display Tests ====================

    #[test]
    fn test_display_is_code() {
        assert_eq!(Locale::EN.to_string(), "en");
        assert_eq!(format!("{}", Locale::FR), "fr");
    }

    #[test]
    fn test_html_lang() {
        assert_eq!(Locale::EN.html_lang(), "en-GB");
        assert_eq!(Locale::FR.html_lang(), "fr-FR");
    }
}
