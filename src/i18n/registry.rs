//! Locale registry: Single source of truth for all site locales.
//!
//! The registry is built once on first access through a `OnceLock` and is
//! immutable afterwards. Target locales keep their declared order, which is
//! the order the sync processes them in.

use std::sync::OnceLock;

/// Configuration for a site locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleConfig {
    /// Locale code used in file names and URL prefixes (e.g., "de", "en")
    pub code: &'static str,

    /// English name of the language (e.g., "German", "Portuguese")
    pub name: &'static str,

    /// Native name shown in the language switcher (e.g., "Deutsch", "Português")
    pub native_name: &'static str,

    /// Value for the HTML `lang` attribute (e.g., "de-DE", "en-GB")
    pub html_lang: &'static str,

    /// DeepL language code used when translating (e.g., "DE", "EN-GB")
    pub deepl_code: &'static str,

    /// Whether this locale is the translation source
    pub is_canonical: bool,

    /// Whether this locale is built and synced
    pub enabled: bool,
}

/// Global locale registry singleton.
pub struct LocaleRegistry {
    canonical: LocaleConfig,
    targets: Vec<LocaleConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            canonical: canonical_locale(),
            targets: target_locales(),
        })
    }

    /// Get a locale configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LocaleConfig)` if the locale exists
    /// * `None` if the locale is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.list_all().find(|locale| locale.code == code)
    }

    /// All locales, canonical first, then targets in declared order.
    pub fn list_all(&self) -> impl Iterator<Item = &LocaleConfig> {
        std::iter::once(&self.canonical).chain(self.targets.iter())
    }

    /// All enabled locales, canonical first.
    pub fn list_enabled(&self) -> impl Iterator<Item = &LocaleConfig> {
        self.list_all().filter(|locale| locale.enabled)
    }

    /// Enabled translation targets in declared order.
    pub fn targets(&self) -> impl Iterator<Item = &LocaleConfig> {
        self.targets.iter().filter(|locale| locale.enabled)
    }

    /// The canonical (source) locale configuration.
    pub fn canonical(&self) -> &LocaleConfig {
        &self.canonical
    }

    /// Check if a locale code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|locale| locale.enabled)
            .unwrap_or(false)
    }
}

/// German is the language the site content is written in.
fn canonical_locale() -> LocaleConfig {
    LocaleConfig {
        code: "de",
        name: "German",
        native_name: "Deutsch",
        html_lang: "de-DE",
        deepl_code: "DE",
        is_canonical: true,
        enabled: true,
    }
}

fn target_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "en",
            name: "English",
            native_name: "English",
            html_lang: "en-GB",
            deepl_code: "EN-GB",
            is_canonical: false,
            enabled: true,
        },
        LocaleConfig {
            code: "pt",
            name: "Portuguese",
            native_name: "Português",
            html_lang: "pt-PT",
            deepl_code: "PT-PT",
            is_canonical: false,
            enabled: true,
        },
        LocaleConfig {
            code: "fr",
            name: "French",
            native_name: "Français",
            html_lang: "fr-FR",
            deepl_code: "FR",
            is_canonical: false,
            enabled: true,
        },
    ]
}
