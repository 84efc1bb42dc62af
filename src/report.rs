//! Per-run sync results.
//!
//! The engine only produces these values; `SyncSummary::log` is the single
//! place they are turned into log lines.

use crate::i18n::Locale;
use serde::Serialize;
use tracing::{error, info};

/// Counts for one target locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocaleReport {
    /// Locale code
    pub locale: &'static str,

    /// Keys sent for (re)translation
    pub translated: usize,

    /// Keys carried over from the previous target
    pub unchanged: usize,

    /// Keys dropped because the source no longer has them
    pub removed: usize,

    /// Translate requests made
    pub batches: usize,

    /// First few stale keys, filled in dry-run mode
    pub sample: Vec<String>,
}

impl LocaleReport {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale: locale.code(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocaleOutcome {
    /// Translated and written
    Synced(LocaleReport),
    /// Dry run: diffed only, nothing called or written
    Planned(LocaleReport),
    /// Sync failed; the previous target was left untouched
    Failed { locale: &'static str, error: String },
}

impl LocaleOutcome {
    pub fn locale(&self) -> &'static str {
        match self {
            LocaleOutcome::Synced(report) | LocaleOutcome::Planned(report) => report.locale,
            LocaleOutcome::Failed { locale, .. } => locale,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, LocaleOutcome::Failed { .. })
    }
}

/// Outcome of a whole run, one entry per target locale in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub outcomes: Vec<LocaleOutcome>,
}

impl SyncSummary {
    pub fn push(&mut self, outcome: LocaleOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn failures(&self) -> impl Iterator<Item = &LocaleOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Total translate requests across locales
    pub fn api_calls(&self) -> usize {
        self.reports().map(|r| r.batches).sum()
    }

    /// Keys actually translated and written, across locales
    pub fn translated(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                LocaleOutcome::Synced(report) => report.translated,
                _ => 0,
            })
            .sum()
    }

    /// Keys a dry run found stale, across locales
    pub fn planned(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                LocaleOutcome::Planned(report) => report.translated,
                _ => 0,
            })
            .sum()
    }

    fn reports(&self) -> impl Iterator<Item = &LocaleReport> {
        self.outcomes.iter().filter_map(|o| match o {
            LocaleOutcome::Synced(report) | LocaleOutcome::Planned(report) => Some(report),
            LocaleOutcome::Failed { .. } => None,
        })
    }

    pub fn log(&self) {
        for outcome in &self.outcomes {
            match outcome {
                LocaleOutcome::Synced(report) => info!(
                    "{}: {} translated, {} unchanged, {} removed ({} requests)",
                    report.locale.to_uppercase(),
                    report.translated,
                    report.unchanged,
                    report.removed,
                    report.batches
                ),
                LocaleOutcome::Planned(report) => info!(
                    "{}: would translate {}, {} unchanged, would remove {}",
                    report.locale.to_uppercase(),
                    report.translated,
                    report.unchanged,
                    report.removed
                ),
                LocaleOutcome::Failed { locale, error } => {
                    error!("{}: failed: {}", locale.to_uppercase(), error)
                }
            }
        }
    }
}
