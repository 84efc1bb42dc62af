use crate::config::Config;
use crate::i18n::Locale;
use crate::retry::{with_retry_if, RetryConfig};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tracing::debug;

/// HTTP status DeepL uses for an exhausted character quota
const QUOTA_EXCEEDED_STATUS: u16 = 456;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("failed to reach translation service: {0}")]
    Request(#[source] reqwest::Error),

    #[error("translation service returned a malformed response: {0}")]
    MalformedResponse(#[source] reqwest::Error),

    #[error("translation quota exceeded ({status}): {body}")]
    QuotaExceeded { status: u16, body: String },

    #[error("translation service error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("translation service returned {actual} texts for {expected} submitted")]
    CountMismatch { expected: usize, actual: usize },
}

impl TranslateError {
    /// Network failures, rate limiting (429) and server errors (5xx) are
    /// transient. Quota, other 4xx, bad payloads and count mismatches are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslateError::Request(_) => true,
            TranslateError::Api { status, .. } => *status == 429 || *status >= 500,
            TranslateError::MalformedResponse(_)
            | TranslateError::QuotaExceeded { .. }
            | TranslateError::CountMismatch { .. } => false,
        }
    }
}

/// A service that translates batches of plain text.
///
/// Implementations must return exactly one text per submitted text, in the
/// same order.
pub trait Translator {
    fn translate_batch(
        &self,
        texts: &[String],
        source: Locale,
        target: Locale,
    ) -> impl Future<Output = Result<Vec<String>, TranslateError>> + Send;
}

/// DeepL translate request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a [String],
    source_lang: &'a str,
    target_lang: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

/// Character usage of the current billing period
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub character_count: u64,
    #[serde(default)]
    pub character_limit: Option<u64>,
}

/// DeepL REST API client
#[derive(Debug, Clone)]
pub struct DeepLClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    retry: RetryConfig,
}

impl DeepLClient {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            api_url: config.deepl_api_url.trim_end_matches('/').to_string(),
            api_key: config.deepl_api_key.clone(),
            retry: RetryConfig::api_call(),
        }
    }

    /// Override the retry policy (tests use `RetryConfig::no_retry`)
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }

    /// Fetch character usage for the account
    pub async fn usage(&self) -> Result<Usage, TranslateError> {
        with_retry_if(
            &self.retry,
            "DeepL usage",
            || self.fetch_usage(),
            TranslateError::is_retryable,
        )
        .await
    }

    async fn fetch_usage(&self) -> Result<Usage, TranslateError> {
        let response = self
            .client
            .get(format!("{}/usage", self.api_url))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(TranslateError::Request)?;

        check_status(response)
            .await?
            .json::<Usage>()
            .await
            .map_err(TranslateError::MalformedResponse)
    }

    async fn send_batch(
        &self,
        request: &TranslateRequest<'_>,
    ) -> Result<Vec<String>, TranslateError> {
        let response = self
            .client
            .post(format!("{}/translate", self.api_url))
            .header("Authorization", self.auth_header())
            .json(request)
            .send()
            .await
            .map_err(TranslateError::Request)?;

        let response = check_status(response).await?;
        let body: TranslateResponse = response
            .json()
            .await
            .map_err(TranslateError::MalformedResponse)?;

        Ok(body.translations.into_iter().map(|t| t.text).collect())
    }
}

impl Translator for DeepLClient {
    async fn translate_batch(
        &self,
        texts: &[String],
        source: Locale,
        target: Locale,
    ) -> Result<Vec<String>, TranslateError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = TranslateRequest {
            text: texts,
            source_lang: source.deepl_code(),
            target_lang: target.deepl_code(),
        };

        debug!(
            "Sending {} texts to DeepL ({} -> {})",
            texts.len(),
            request.source_lang,
            request.target_lang
        );

        let translated = with_retry_if(
            &self.retry,
            &format!("DeepL translation to {}", target.name()),
            || self.send_batch(&request),
            TranslateError::is_retryable,
        )
        .await?;

        if translated.len() != texts.len() {
            return Err(TranslateError::CountMismatch {
                expected: texts.len(),
                actual: translated.len(),
            });
        }

        Ok(translated)
    }
}

/// Turn a non-success response into an error carrying status and body
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TranslateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));

    if status.as_u16() == QUOTA_EXCEEDED_STATUS {
        Err(TranslateError::QuotaExceeded {
            status: status.as_u16(),
            body,
        })
    } else {
        Err(TranslateError::Api {
            status: status.as_u16(),
            body,
        })
    }
}
