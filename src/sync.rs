//! Incremental sync of target locale documents.
//!
//! Each target locale goes through the same steps, one locale at a time:
//! load the previous target, diff it against the source, translate the stale
//! keys batch by batch, merge, and persist. Nothing is written for a locale
//! unless every one of its batches succeeded.

use crate::config::Config;
use crate::document::{
    flatten, try_flatten, unflatten, FlattenError, FlatDocument, TranslationDocument,
    UnflattenError,
};
use crate::glossary::{Glossary, GlossaryError, ProtectedText};
use crate::hash::{compute_hash, SourceHash};
use crate::i18n::{Locale, TranslationValidator};
use crate::report::{LocaleOutcome, LocaleReport, SyncSummary};
use crate::target::{write_atomic, PersistedTarget};
use crate::translation::{TranslateError, Translator};
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Stale keys listed per locale in a dry run
pub const DRY_RUN_SAMPLE_SIZE: usize = 5;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to read source document {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("source document {path} is not a JSON object: {source}")]
    ParseSource {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("source document has duplicate keys: {0}")]
    DuplicateSourceKey(#[source] FlattenError),

    #[error("source document has conflicting keys: {0}")]
    SourceKeys(#[source] UnflattenError),

    #[error(transparent)]
    Glossary(#[from] GlossaryError),

    #[error("translation to {locale} failed: {source}")]
    Translate {
        locale: Locale,
        #[source]
        source: TranslateError,
    },

    #[error(transparent)]
    Unflatten(#[from] UnflattenError),

    #[error("failed to serialize target document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The flattened source document and its fingerprint, computed once per run.
#[derive(Debug, Clone)]
pub struct SourceSnapshot {
    pub locale: Locale,
    pub flat: FlatDocument,
    pub hash: SourceHash,
}

impl SourceSnapshot {
    pub fn from_document(locale: Locale, doc: &TranslationDocument) -> Self {
        let flat = flatten(doc);
        let hash = compute_hash(&flat);
        Self { locale, flat, hash }
    }

    /// Read and fingerprint the source document.
    ///
    /// Keys defined twice, or that could never be written back as a nested
    /// document, are rejected here, before anything is sent out for translation.
    pub fn load(locale: Locale, path: &Path) -> Result<Self, SyncError> {
        let contents = fs::read_to_string(path).map_err(|source| SyncError::ReadSource {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: TranslationDocument =
            serde_json::from_str(&contents).map_err(|source| SyncError::ParseSource {
                path: path.to_path_buf(),
                source,
            })?;

        let flat = try_flatten(&doc).map_err(SyncError::DuplicateSourceKey)?;
        unflatten(&flat).map_err(SyncError::SourceKeys)?;

        let hash = compute_hash(&flat);
        Ok(Self { locale, flat, hash })
    }
}

/// Partition of source keys for one target locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Keys whose existing translation is reused
    pub unchanged: Vec<String>,
    /// Keys that need (re)translation
    pub stale: Vec<String>,
    /// Keys in the previous target that the source no longer has
    pub to_remove: Vec<String>,
}

impl SyncPlan {
    /// Diff the source against the previous target.
    ///
    /// A key is stale when the previous target lacks it or was generated from
    /// a different source fingerprint. A fingerprint mismatch therefore marks
    /// every key stale.
    pub fn diff(
        source: &SourceSnapshot,
        prior: &FlatDocument,
        prior_hash: Option<&SourceHash>,
    ) -> Self {
        let hash_matches = prior_hash == Some(&source.hash);
        let mut plan = SyncPlan::default();

        for key in source.flat.keys() {
            if hash_matches && prior.contains_key(key) {
                plan.unchanged.push(key.clone());
            } else {
                plan.stale.push(key.clone());
            }
        }

        plan.to_remove = prior
            .keys()
            .filter(|key| !source.flat.contains_key(*key))
            .cloned()
            .collect();

        plan
    }
}

/// Build the new target content: reused translations plus fresh ones.
/// Keys outside the plan, including `to_remove`, are never carried over.
pub fn merge(plan: &SyncPlan, prior: &FlatDocument, translated: FlatDocument) -> FlatDocument {
    let mut merged: FlatDocument = plan
        .unchanged
        .iter()
        .filter_map(|key| prior.get(key).map(|value| (key.clone(), value.clone())))
        .collect();
    merged.extend(
        translated
            .into_iter()
            .filter(|(key, _)| plan.stale.contains(key)),
    );
    merged
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Texts per translate request
    pub batch_size: usize,
    /// Diff and report only
    pub dry_run: bool,
}

/// Runs the per-locale sync steps against a translator.
pub struct SyncEngine<'a, T> {
    translator: &'a T,
    glossary: &'a Glossary,
    options: SyncOptions,
}

impl<'a, T: Translator> SyncEngine<'a, T> {
    pub fn new(translator: &'a T, glossary: &'a Glossary, options: SyncOptions) -> Self {
        Self {
            translator,
            glossary,
            options,
        }
    }

    /// Sync one target locale document at `path`.
    pub async fn sync_locale(
        &self,
        source: &SourceSnapshot,
        target: Locale,
        path: &Path,
        generated: DateTime<Utc>,
    ) -> Result<LocaleReport, SyncError> {
        let prior = PersistedTarget::load(path);
        let prior_flat = prior.as_ref().map(PersistedTarget::flat).unwrap_or_default();
        let prior_hash = prior.as_ref().and_then(|p| p.source_hash.as_ref());

        let plan = SyncPlan::diff(source, &prior_flat, prior_hash);
        info!("  Keys to translate: {}", plan.stale.len());
        info!("  Keys unchanged: {}", plan.unchanged.len());
        info!("  Keys to remove: {}", plan.to_remove.len());

        let mut report = LocaleReport {
            translated: plan.stale.len(),
            unchanged: plan.unchanged.len(),
            removed: plan.to_remove.len(),
            ..LocaleReport::new(target)
        };

        if self.options.dry_run {
            report.sample = plan
                .stale
                .iter()
                .take(DRY_RUN_SAMPLE_SIZE)
                .cloned()
                .collect();
            if !report.sample.is_empty() {
                let more = if plan.stale.len() > DRY_RUN_SAMPLE_SIZE { "..." } else { "" };
                info!("  Would translate: {}{}", report.sample.join(", "), more);
            }
            return Ok(report);
        }

        let (translated, batches) = self.translate_keys(source, &plan.stale, target).await?;
        report.batches = batches;

        let merged = merge(&plan, &prior_flat, translated);
        let output = PersistedTarget::from_flat(&merged, source.hash.clone(), generated)?;
        let json = output.to_json()?;
        write_atomic(path, &json).map_err(|source| SyncError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("  Written: {}", path.display());

        Ok(report)
    }

    /// Translate `keys` from the source in order-preserving batches.
    ///
    /// Returns the restored translations and the number of requests made.
    /// Any failed batch fails the whole call, discarding earlier batches.
    pub async fn translate_keys(
        &self,
        source: &SourceSnapshot,
        keys: &[String],
        target: Locale,
    ) -> Result<(FlatDocument, usize), SyncError> {
        let mut translated = FlatDocument::new();
        let batch_size = self.options.batch_size.max(1);
        let total_batches = keys.len().div_ceil(batch_size);
        let mut batches = 0;

        for (index, batch) in keys.chunks(batch_size).enumerate() {
            let protected: Vec<ProtectedText> = batch
                .iter()
                .map(|key| {
                    let text = source.flat.get(key).map(String::as_str).unwrap_or_default();
                    self.glossary.protect(text)
                })
                .collect();
            let texts: Vec<String> = protected.iter().map(|p| p.text.clone()).collect();

            info!("  Translating batch {}/{}...", index + 1, total_batches);
            let results = self
                .translator
                .translate_batch(&texts, source.locale, target)
                .await
                .map_err(|source| SyncError::Translate {
                    locale: target,
                    source,
                })?;
            batches += 1;

            if results.len() != texts.len() {
                return Err(SyncError::Translate {
                    locale: target,
                    source: TranslateError::CountMismatch {
                        expected: texts.len(),
                        actual: results.len(),
                    },
                });
            }

            for ((key, protected), result) in batch.iter().zip(&protected).zip(results) {
                let validation = TranslationValidator::validate(&protected.text, &result);
                if !validation.is_clean() {
                    warn!(
                        "  Glossary placeholders changed in '{}' ({}): {:?} {:?}",
                        key, target, validation.errors, validation.warnings
                    );
                }
                translated.insert(key.clone(), protected.replacements.restore(&result));
            }
        }

        debug!("Translated {} keys for {}", translated.len(), target);
        Ok((translated, batches))
    }
}

/// Sync every target locale from the canonical source document.
///
/// Missing or unreadable inputs abort the run before any translation. A
/// failure inside one locale is recorded in the summary and the run moves on
/// to the next locale.
pub async fn run<T: Translator>(
    config: &Config,
    translator: &T,
    dry_run: bool,
) -> Result<SyncSummary, SyncError> {
    let source_locale = Locale::canonical();
    let source = SourceSnapshot::load(source_locale, &config.locale_path(source_locale))?;
    info!(
        "Source {}: {} keys (hash {})",
        source_locale,
        source.flat.len(),
        source.hash
    );

    let glossary = Glossary::load(&config.glossary_file)?;
    info!("Glossary: {} protected terms", glossary.len());

    let engine = SyncEngine::new(
        translator,
        &glossary,
        SyncOptions {
            batch_size: config.batch_size,
            dry_run,
        },
    );

    let mut summary = SyncSummary::default();
    for target in Locale::targets() {
        info!("--- Processing {} ---", target.code().to_uppercase());
        let path = config.locale_path(target);

        match engine.sync_locale(&source, target, &path, Utc::now()).await {
            Ok(report) if dry_run => summary.push(LocaleOutcome::Planned(report)),
            Ok(report) => summary.push(LocaleOutcome::Synced(report)),
            Err(e) => {
                error!("  {} sync failed, keeping previous target: {}", target, e);
                summary.push(LocaleOutcome::Failed {
                    locale: target.code(),
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(summary)
}
