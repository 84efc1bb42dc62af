use crate::i18n::Locale;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Most texts DeepL accepts in a single translate request
pub const DEEPL_BATCH_LIMIT: usize = 50;

const DEEPL_FREE_API_URL: &str = "https://api-free.deepl.com/v2";
const DEEPL_PRO_API_URL: &str = "https://api.deepl.com/v2";

#[derive(Debug, Clone)]
pub struct Config {
    // DeepL
    pub deepl_api_key: String,
    pub deepl_api_url: String,

    // Documents
    pub i18n_dir: PathBuf,
    pub glossary_file: PathBuf,

    // Batching
    pub batch_size: usize,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// The API key is checked first so a missing credential fails before any
    /// file is touched.
    pub fn from_env() -> Result<Self> {
        let deepl_api_key = std::env::var("DEEPL_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .context("DEEPL_API_KEY not set (get a key at https://www.deepl.com/pro#developer)")?;

        let deepl_api_url = std::env::var("DEEPL_API_URL")
            .unwrap_or_else(|_| default_api_url(&deepl_api_key).to_string());

        let i18n_dir = std::env::var("I18N_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("src/i18n"));

        let glossary_file = std::env::var("GLOSSARY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| i18n_dir.join("glossary.json"));

        let batch_size = std::env::var("TRANSLATE_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEEPL_BATCH_LIMIT)
            .clamp(1, DEEPL_BATCH_LIMIT);

        Ok(Self {
            deepl_api_key,
            deepl_api_url,
            i18n_dir,
            glossary_file,
            batch_size,
        })
    }

    /// Path of the JSON document for `locale`
    pub fn locale_path(&self, locale: Locale) -> PathBuf {
        self.i18n_dir.join(format!("{}.json", locale.code()))
    }
}

/// Pick the DeepL host for an API key. Free-tier keys end in `:fx`.
pub fn default_api_url(api_key: &str) -> &'static str {
    if api_key.ends_with(":fx") {
        DEEPL_FREE_API_URL
    } else {
        DEEPL_PRO_API_URL
    }
}
