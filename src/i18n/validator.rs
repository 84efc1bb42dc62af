//! Translation quality validation.
//!
//! The translation service is expected to pass glossary placeholders through
//! untouched. This module checks that it did, so a mangled placeholder shows
//! up in the log instead of silently dropping a brand name from a page.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Placeholders that went missing or appeared from nowhere
    pub errors: Vec<String>,

    /// Non-critical differences, e.g. a placeholder repeated a different number of times
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Validator for translated, still-protected text.
pub struct TranslationValidator;

static PLACEHOLDER_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

impl TranslationValidator {
    /// Compare glossary placeholders in the protected source text with those in
    /// the service's output.
    ///
    /// * a placeholder absent from the output is an error (the term is lost)
    /// * a placeholder only present in the output is an error (it would leak as-is)
    /// * a different occurrence count is a warning
    pub fn validate(protected_source: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::new();

        let expected = Self::count_placeholders(protected_source);
        let actual = Self::count_placeholders(translated);

        for (token, expected_count) in &expected {
            match actual.get(token) {
                None => report
                    .errors
                    .push(format!("Placeholder {} missing from translation", token)),
                Some(actual_count) if actual_count != expected_count => {
                    report.warnings.push(format!(
                        "Placeholder {} appears {} times, expected {}",
                        token, actual_count, expected_count
                    ))
                }
                Some(_) => {}
            }
        }

        for token in actual.keys() {
            if !expected.contains_key(token) {
                report
                    .errors
                    .push(format!("Unexpected placeholder {} in translation", token));
            }
        }

        report
    }

    /// Count `__GLOSSARY_<n>__` tokens in text
    fn count_placeholders(text: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        let Some(regex) = PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"__GLOSSARY_\d+__").ok())
        else {
            return counts;
        };

        for found in regex.find_iter(text) {
            *counts.entry(found.as_str().to_string()).or_insert(0) += 1;
        }
        counts
    }
}
