//! Source fingerprinting for staleness detection.
//!
//! The fingerprint is a 32-bit shift-subtract rolling hash over the compact,
//! key-sorted JSON form of a flat document, taken over UTF-16 code units and
//! rendered as signed hex. Fingerprints already stored in target documents
//! stay valid, so an unchanged source never triggers a full retranslation.
//!
//! Keys are sorted by UTF-8 bytes, while fingerprints written by JavaScript
//! tooling sorted by UTF-16 code units. The two orders agree except when keys
//! mix characters above U+FFFF with characters in U+E000..=U+FFFF; such a
//! source gets a different fingerprint here and is retranslated once.
//! It only gates skipping work and is not collision resistant.

use crate::document::FlatDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Fingerprint of a flat source document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceHash(String);

impl SourceHash {
    /// Wrap a fingerprint read back from a persisted target
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of a flat document.
///
/// Independent of insertion order: the document is serialized with its keys
/// sorted before hashing.
pub fn compute_hash(flat: &FlatDocument) -> SourceHash {
    let canonical = Value::Object(
        flat.iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect(),
    )
    .to_string();

    hash_canonical(&canonical)
}

fn hash_canonical(canonical: &str) -> SourceHash {
    let hash = canonical.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });

    let magnitude = i64::from(hash).unsigned_abs();
    if hash < 0 {
        SourceHash(format!("-{magnitude:x}"))
    } else {
        SourceHash(format!("{magnitude:x}"))
    }
}
