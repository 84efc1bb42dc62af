//! Explicit cache of loaded locale documents for page lookups.
//!
//! A `LocaleCatalog` is owned by whoever renders pages. Every locale starts as
//! `NotLoaded`, becomes `Loaded` after a successful `load`, or `Missing` if its
//! document could not be read. Lookups never touch the disk.

use crate::document::{lookup, TranslationDocument};
use crate::i18n::Locale;
use crate::target::PersistedTarget;
use futures::future::join_all;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEntry {
    NotLoaded,
    Loaded(TranslationDocument),
    Missing,
}

static NOT_LOADED: CatalogEntry = CatalogEntry::NotLoaded;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {locale} translations from {path}: {source}")]
    Read {
        locale: Locale,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{locale} translations in {path} are not a JSON object: {source}")]
    Parse {
        locale: Locale,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug)]
pub struct LocaleCatalog {
    dir: PathBuf,
    entries: HashMap<Locale, CatalogEntry>,
}

impl LocaleCatalog {
    /// Empty catalog over the `<code>.json` documents in `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            entries: Locale::all()
                .into_iter()
                .map(|locale| (locale, CatalogEntry::NotLoaded))
                .collect(),
        }
    }

    pub fn entry(&self, locale: Locale) -> &CatalogEntry {
        self.entries.get(&locale).unwrap_or(&NOT_LOADED)
    }

    pub fn is_loaded(&self, locale: Locale) -> bool {
        matches!(self.entry(locale), CatalogEntry::Loaded(_))
    }

    /// Load one locale's document. Already loaded locales are not re-read.
    pub async fn load(&mut self, locale: Locale) -> Result<(), CatalogError> {
        if self.is_loaded(locale) {
            return Ok(());
        }
        let result = read_document(locale, self.path_for(locale)).await;
        self.store(locale, result)
    }

    /// Load every locale that is not loaded yet, concurrently.
    ///
    /// Returns the failures; the affected locales are marked `Missing` and
    /// lookups for them fall back to the canonical locale.
    pub async fn preload_all(&mut self) -> Vec<CatalogError> {
        let pending: Vec<Locale> = Locale::all()
            .into_iter()
            .filter(|locale| !self.is_loaded(*locale))
            .collect();

        let results = join_all(
            pending
                .iter()
                .map(|&locale| read_document(locale, self.path_for(locale))),
        )
        .await;

        pending
            .into_iter()
            .zip(results)
            .filter_map(|(locale, result)| self.store(locale, result).err())
            .collect()
    }

    /// Translate `key` for `locale`.
    ///
    /// Falls back to the canonical locale when the locale is not loaded or
    /// lacks the key, and to the key itself when nothing matches.
    pub fn t(&self, key: &str, locale: Locale) -> String {
        self.lookup(key, locale)
            .or_else(|| self.lookup(key, Locale::canonical()))
            .unwrap_or(key)
            .to_string()
    }

    /// Loaded document for `locale`, or the canonical one if it is not loaded.
    pub fn document(&self, locale: Locale) -> Option<&TranslationDocument> {
        match self.entry(locale) {
            CatalogEntry::Loaded(doc) => Some(doc),
            _ => match self.entry(Locale::canonical()) {
                CatalogEntry::Loaded(doc) => Some(doc),
                _ => None,
            },
        }
    }

    fn lookup(&self, key: &str, locale: Locale) -> Option<&str> {
        match self.entry(locale) {
            CatalogEntry::Loaded(doc) => lookup(doc, key),
            _ => None,
        }
    }

    fn path_for(&self, locale: Locale) -> PathBuf {
        self.dir.join(format!("{}.json", locale.code()))
    }

    fn store(
        &mut self,
        locale: Locale,
        result: Result<TranslationDocument, CatalogError>,
    ) -> Result<(), CatalogError> {
        match result {
            Ok(doc) => {
                debug!("Loaded {} translations", locale);
                self.entries.insert(locale, CatalogEntry::Loaded(doc));
                Ok(())
            }
            Err(e) => {
                warn!("{}, falling back to {}", e, Locale::canonical());
                self.entries.insert(locale, CatalogEntry::Missing);
                Err(e)
            }
        }
    }
}

async fn read_document(locale: Locale, path: PathBuf) -> Result<TranslationDocument, CatalogError> {
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| CatalogError::Read {
            locale,
            path: path.clone(),
            source,
        })?;

    parse_document(locale, &path, &contents)
}

fn parse_document(
    locale: Locale,
    path: &Path,
    contents: &str,
) -> Result<TranslationDocument, CatalogError> {
    PersistedTarget::parse(contents)
        .map(|target| target.document)
        .map_err(|source| CatalogError::Parse {
            locale,
            path: path.to_path_buf(),
            source,
        })
}
