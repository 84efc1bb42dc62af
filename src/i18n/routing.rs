//! Locale-aware URL paths.
//!
//! The canonical locale is served without a prefix (`/kontakt`), every other
//! locale under its code (`/en/kontakt`).

use crate::i18n::Locale;

/// Locale named by the first path segment, or the canonical locale.
pub fn locale_from_path(path: &str) -> Locale {
    path.split('/')
        .find(|segment| !segment.is_empty())
        .and_then(|segment| Locale::from_code(segment).ok())
        .unwrap_or_else(Locale::canonical)
}

/// Rewrite `path` for `locale`, replacing any existing locale prefix.
pub fn localized_path(path: &str, locale: Locale) -> String {
    let clean = strip_locale_prefix(path);
    if locale.is_canonical() {
        clean.to_string()
    } else {
        format!("/{}{}", locale.code(), clean)
    }
}

/// The same page in every enabled locale, canonical first.
pub fn all_localized_paths(path: &str) -> Vec<(Locale, String)> {
    Locale::all()
        .into_iter()
        .map(|locale| (locale, localized_path(path, locale)))
        .collect()
}

fn strip_locale_prefix(path: &str) -> &str {
    for locale in Locale::all() {
        let prefix = format!("/{}", locale.code());
        if let Some(rest) = path.strip_prefix(prefix.as_str()) {
            if rest.is_empty() {
                return "/";
            }
            if rest.starts_with('/') {
                return rest;
            }
        }
    }
    path
}
