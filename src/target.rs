//! Persisted target documents: translated content plus sync metadata.

use crate::document::{flatten, unflatten, FlatDocument, TranslationDocument, UnflattenError};
use crate::hash::SourceHash;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reserved top-level field holding the source fingerprint
pub const SOURCE_HASH_FIELD: &str = "_sourceHash";

/// Reserved top-level field holding the generation timestamp
pub const GENERATED_FIELD: &str = "_generated";

/// A target locale document as stored on disk.
///
/// `document` never contains the reserved metadata fields; they are lifted
/// into `source_hash` and `generated` on parse and written back on save.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTarget {
    pub document: TranslationDocument,
    pub source_hash: Option<SourceHash>,
    pub generated: Option<String>,
}

impl PersistedTarget {
    /// Build a fresh target from merged flat content.
    pub fn from_flat(
        flat: &FlatDocument,
        source_hash: SourceHash,
        generated: DateTime<Utc>,
    ) -> Result<Self, UnflattenError> {
        Ok(Self {
            document: unflatten(flat)?,
            source_hash: Some(source_hash),
            generated: Some(generated.to_rfc3339_opts(SecondsFormat::Millis, true)),
        })
    }

    /// Parse a stored target. The top level must be a JSON object.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        let mut document: TranslationDocument = serde_json::from_str(json)?;

        let source_hash = match document.shift_remove(SOURCE_HASH_FIELD) {
            Some(Value::String(hash)) if !hash.is_empty() => Some(SourceHash::from_stored(hash)),
            _ => None,
        };
        let generated = match document.shift_remove(GENERATED_FIELD) {
            Some(Value::String(timestamp)) => Some(timestamp),
            _ => None,
        };

        Ok(Self {
            document,
            source_hash,
            generated,
        })
    }

    /// Load the previous target for a locale.
    ///
    /// A missing file means the locale has never been synced. An unreadable
    /// or malformed file is logged and treated the same way, so the locale is
    /// fully retranslated instead of failing.
    pub fn load(path: &Path) -> Option<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No previous target at {}", path.display());
                return None;
            }
            Err(e) => {
                warn!(
                    "Could not read previous target {} ({}), retranslating everything",
                    path.display(),
                    e
                );
                return None;
            }
        };

        match Self::parse(&contents) {
            Ok(target) => Some(target),
            Err(e) => {
                warn!(
                    "Previous target {} is malformed ({}), retranslating everything",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// Flat view of the translated content, without metadata
    pub fn flat(&self) -> FlatDocument {
        flatten(&self.document)
    }

    /// Render as pretty-printed JSON (two-space indent) with a trailing newline.
    ///
    /// Content keys come first, in document order, followed by `_sourceHash`
    /// and `_generated`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut output = self.document.clone();
        output.shift_remove(SOURCE_HASH_FIELD);
        output.shift_remove(GENERATED_FIELD);
        if let Some(hash) = &self.source_hash {
            output.insert(
                SOURCE_HASH_FIELD.to_string(),
                Value::String(hash.as_str().to_string()),
            );
        }
        if let Some(generated) = &self.generated {
            output.insert(GENERATED_FIELD.to_string(), Value::String(generated.clone()));
        }

        let mut json = serde_json::to_string_pretty(&Value::Object(output))?;
        json.push('\n');
        Ok(json)
    }
}

/// Replace `path` with `contents` in one step.
///
/// The data is written to a sibling temp file first and renamed over the
/// target, so readers never observe a half-written document.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, contents)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
