//! Site locales and locale-aware helpers.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for the site's locales and their metadata
//! - `language`: `Locale`, a validated handle into the registry
//! - `catalog`: Explicit, load-once cache of locale documents for lookups
//! - `routing`: Locale prefixes in URL paths
//! - `validator`: Checks that glossary placeholders survived translation
//!
//! # Example
//!
//! ```rust,ignore
//! use locale_sync::i18n::{Locale, LocaleCatalog};
//!
//! let mut catalog = LocaleCatalog::new("src/i18n");
//! catalog.load(Locale::EN).await?;
//! let title = catalog.t("nav.home", Locale::EN);
//! ```

mod catalog;
mod language;
mod registry;
mod routing;
mod validator;

pub use catalog::{CatalogEntry, CatalogError, LocaleCatalog};
pub use language::Locale;
pub use registry::{LocaleConfig, LocaleRegistry};
pub use routing::{all_localized_paths, locale_from_path, localized_path};
pub use validator::{TranslationValidator, ValidationReport};
