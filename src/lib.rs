//! Incremental translation sync for a static site's i18n documents.
//!
//! The canonical locale's JSON document is flattened, fingerprinted and diffed
//! against each previously persisted target document. Only stale keys are sent
//! to the translation service, with glossary terms shielded behind
//! placeholders, and every target is rewritten atomically with its sync
//! metadata.

pub mod config;
pub mod document;
pub mod glossary;
pub mod hash;
pub mod i18n;
pub mod report;
pub mod retry;
pub mod sync;
pub mod target;
pub mod translation;
