//! Glossary terms that must survive translation unchanged.
//!
//! Before a text is sent out, each glossary term is swapped for a placeholder
//! such as `__GLOSSARY_0__`; after translation the placeholders are swapped
//! back. All terms are matched case-insensitively in a single pass, so a
//! placeholder is never rescanned for later terms. Where two terms match at
//! the same position the one declared first wins.

use regex::{Captures, Regex, RegexBuilder};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GlossaryError {
    #[error("failed to read glossary {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("glossary {path} is not a term list: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("glossary of {terms} terms cannot be compiled: {source}")]
    Pattern {
        terms: usize,
        #[source]
        source: regex::Error,
    },
}

/// Accepted on-disk shapes: `{ "terms": [...] }` or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GlossaryFile {
    Object {
        #[serde(default)]
        terms: Vec<String>,
    },
    List(Vec<String>),
}

/// Ordered list of protected terms, immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    terms: Vec<String>,
    /// One capture group per term, in declared order. `None` when empty.
    pattern: Option<Regex>,
}

impl Glossary {
    /// Build a glossary from terms in priority order. Empty terms are skipped.
    pub fn new<I, S>(terms: I) -> Result<Self, GlossaryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .map(Into::into)
            .filter(|term| !term.is_empty())
            .collect();
        if terms.is_empty() {
            return Ok(Self::default());
        }

        let alternation = terms
            .iter()
            .map(|term| format!("({})", regex::escape(term)))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .map_err(|source| GlossaryError::Pattern {
                terms: terms.len(),
                source,
            })?;

        Ok(Self {
            terms,
            pattern: Some(pattern),
        })
    }

    /// Load the glossary file. A missing file yields an empty glossary.
    pub fn load(path: &Path) -> Result<Self, GlossaryError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No glossary at {}, protecting nothing", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(GlossaryError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let file: GlossaryFile =
            serde_json::from_str(&contents).map_err(|source| GlossaryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        match file {
            GlossaryFile::Object { terms } | GlossaryFile::List(terms) => Self::new(terms),
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Replace every glossary term in `text` with its placeholder.
    pub fn protect(&self, text: &str) -> ProtectedText {
        let mut replacements = Replacements::default();
        let Some(pattern) = &self.pattern else {
            return ProtectedText {
                text: text.to_string(),
                replacements,
            };
        };

        let protected = pattern.replace_all(text, |caps: &Captures<'_>| {
            // Group 0 is the whole match; group i + 1 is term i
            let index = (1..caps.len())
                .find(|&group| caps.get(group).is_some())
                .map_or(0, |group| group - 1);
            let token = placeholder(index);
            if !replacements.entries.iter().any(|(t, _)| *t == token) {
                if let Some(term) = self.terms.get(index) {
                    replacements.entries.push((token.clone(), term.clone()));
                }
            }
            token
        });

        ProtectedText {
            text: protected.into_owned(),
            replacements,
        }
    }
}

/// Placeholder token for the glossary term at `index`
pub fn placeholder(index: usize) -> String {
    format!("__GLOSSARY_{index}__")
}

/// Text with glossary terms swapped out, plus the mapping to swap them back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedText {
    pub text: String,
    pub replacements: Replacements,
}

/// Placeholder-to-term mapping for a single text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replacements {
    entries: Vec<(String, String)>,
}

impl Replacements {
    /// Swap every recorded placeholder back to its glossary term.
    pub fn restore(&self, text: &str) -> String {
        self.entries
            .iter()
            .fold(text.to_string(), |acc, (token, term)| acc.replace(token.as_str(), term))
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(token, _)| token.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Protect `text` with `glossary`
pub fn protect(text: &str, glossary: &Glossary) -> ProtectedText {
    glossary.protect(text)
}

/// Restore glossary terms in `text` using `replacements`
pub fn restore(text: &str, replacements: &Replacements) -> String {
    replacements.restore(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn glossary(terms: &[&str]) -> Glossary {
        Glossary::new(terms.iter().copied()).expect("Should build glossary")
    }

    // ==================== protect Tests ====================

    #[test]
    fn test_protect_replaces_every_occurrence() {
        let g = glossary(&["Casa Sol"]);
        let protected = g.protect("Casa Sol liegt nah am Meer. Casa Sol hat einen Pool.");

        assert_eq!(
            protected.text,
            "__GLOSSARY_0__ liegt nah am Meer. __GLOSSARY_0__ hat einen Pool."
        );
        assert_eq!(protected.replacements.len(), 1);
    }

    #[test]
    fn test_protect_is_case_insensitive() {
        let g = glossary(&["Algarve"]);
        let protected = g.protect("Urlaub an der ALGARVE");
        assert_eq!(protected.text, "Urlaub an der __GLOSSARY_0__");
    }

    #[test]
    fn test_protect_uses_declared_index() {
        let g = glossary(&["Lagos", "Algarve"]);
        let protected = g.protect("Die Algarve ruft");

        assert_eq!(protected.text, "Die __GLOSSARY_1__ ruft");
        let tokens: Vec<_> = protected.replacements.placeholders().collect();
        assert_eq!(tokens, vec!["__GLOSSARY_1__"]);
    }

    #[test]
    fn test_protect_earlier_term_wins_at_same_position() {
        let g = glossary(&["Casa", "Casa Sol"]);
        let protected = g.protect("Casa Sol");
        assert_eq!(protected.text, "__GLOSSARY_0__ Sol");
    }

    #[test]
    fn test_protect_longer_term_first_covers_substring() {
        let g = glossary(&["Casa Sol", "Sol"]);
        let protected = g.protect("Casa Sol und Sol");
        assert_eq!(protected.text, "__GLOSSARY_0__ und __GLOSSARY_1__");
    }

    #[test]
    fn test_protect_never_rewrites_placeholders() {
        // "SA" also matches inside "__GLOSSARY_0__" case-insensitively
        let g = glossary(&["Casa Sol", "SA"]);
        let protected = g.protect("Casa Sol SA");

        assert_eq!(protected.text, "__GLOSSARY_0__ __GLOSSARY_1__");
        assert_eq!(protected.replacements.len(), 2);
        assert_eq!(
            restore(&protected.text, &protected.replacements),
            "Casa Sol SA"
        );
    }

    #[test]
    fn test_protect_placeholder_fragments_as_terms() {
        let g = glossary(&["Algarve", "loss", "Ary", "GLOSSARY"]);
        let text = "Algarve ohne Loss";
        let protected = g.protect(text);

        assert_eq!(protected.text, "__GLOSSARY_0__ ohne __GLOSSARY_1__");
        assert_eq!(
            restore(&protected.text, &protected.replacements),
            "Algarve ohne loss"
        );
    }

    #[test]
    fn test_protect_escapes_regex_metacharacters() {
        let g = glossary(&["A+B (GmbH)"]);
        let protected = g.protect("Betreiber: A+B (GmbH).");
        assert_eq!(protected.text, "Betreiber: __GLOSSARY_0__.");
    }

    #[test]
    fn test_protect_without_match_leaves_text() {
        let g = glossary(&["Algarve"]);
        let protected = g.protect("Ferienwohnung");
        assert_eq!(protected.text, "Ferienwohnung");
        assert!(protected.replacements.is_empty());
    }

    #[test]
    fn test_replacements_do_not_leak_between_texts() {
        let g = glossary(&["Algarve", "Lagos"]);
        let first = g.protect("Algarve");
        let second = g.protect("Lagos");

        assert_eq!(first.replacements.len(), 1);
        assert_eq!(second.replacements.len(), 1);
        assert_eq!(restore("__GLOSSARY_1__", &first.replacements), "__GLOSSARY_1__");
    }

    #[test]
    fn test_empty_terms_are_ignored() {
        let g = glossary(&["", "Lagos"]);
        assert_eq!(g.len(), 1);
        assert_eq!(g.terms().collect::<Vec<_>>(), vec!["Lagos"]);
    }

    // ==================== restore Tests ====================

    #[test]
    fn test_restore_after_translation() {
        let g = glossary(&["Casa Sol"]);
        let protected = protect("Willkommen im Casa Sol", &g);
        let translated = protected.text.replace("Willkommen im", "Welcome to");

        assert_eq!(
            restore(&translated, &protected.replacements),
            "Welcome to Casa Sol"
        );
    }

    #[test]
    fn test_restore_uses_declared_spelling() {
        let g = glossary(&["Algarve"]);
        let protected = g.protect("algarve");
        assert_eq!(protected.replacements.restore(&protected.text), "Algarve");
    }

    // ==================== load Tests ====================

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let g = Glossary::load(&dir.path().join("glossary.json")).unwrap();
        assert!(g.is_empty());
    }

    #[test]
    fn test_load_terms_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("glossary.json");
        fs::write(&path, r#"{ "terms": ["Casa Sol", "Algarve"] }"#).unwrap();

        let g = Glossary::load(&path).unwrap();
        assert_eq!(g.terms().collect::<Vec<_>>(), vec!["Casa Sol", "Algarve"]);
    }

    #[test]
    fn test_load_bare_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("glossary.json");
        fs::write(&path, r#"["Lagos"]"#).unwrap();

        assert_eq!(Glossary::load(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_load_object_without_terms_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("glossary.json");
        fs::write(&path, r#"{ "comment": "none yet" }"#).unwrap();

        assert!(Glossary::load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("glossary.json");
        fs::write(&path, r#"{ "terms": "Lagos" }"#).unwrap();

        let err = Glossary::load(&path).unwrap_err();
        assert!(matches!(err, GlossaryError::Parse { .. }));
    }

    // ==================== Property Tests ====================

    proptest! {
        #[test]
        fn prop_restore_inverts_protect(
            before in "[0-9 ]{0,12}",
            after in "[0-9 ]{0,12}",
        ) {
            let g = glossary(&["Casa Sol", "Algarve"]);
            let text = format!("{before}Casa Sol{after}Algarve");
            let protected = g.protect(&text);
            prop_assert!(!protected.text.contains("Casa Sol"));
            prop_assert_eq!(restore(&protected.text, &protected.replacements), text);
        }

        #[test]
        fn prop_restore_inverts_protect_with_overlapping_terms(
            words in proptest::collection::vec(
                prop_oneof![Just("Casa Sol"), Just("SA"), Just("Lagos"), Just("os"), Just("und")],
                0..8,
            ),
        ) {
            let g = glossary(&["Casa Sol", "SA", "Lagos", "os", "_"]);
            let text = words.join(" ");
            let protected = g.protect(&text);
            prop_assert_eq!(restore(&protected.text, &protected.replacements), text);
        }
    }
}
