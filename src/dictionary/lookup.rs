use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};

/// Authoritative answer from an external dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Found,
    NotFound,
}

/// A lookup that produced no authoritative answer
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    UnexpectedStatus(StatusCode),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("cannot build lookup url for {0:?}")]
    InvalidUrl(String),
}

#[async_trait]
pub trait DictionaryLookup: Send + Sync {
    async fn lookup(&self, word: &str) -> Result<LookupOutcome, LookupError>;
}

/// Client for the Free Dictionary API (`GET {base}/{word}`).
///
/// 200 with a non-empty entry array is `Found` and 404 is `NotFound`.
/// A 200 whose body is an empty array, or is not an array at all, is
/// `Malformed`: the service gave no real answer, so the validator falls
/// back to its built-in list and caches nothing.
pub struct FreeDictionaryApi {
    client: reqwest::Client,
    base_url: Url,
}

impl FreeDictionaryApi {
    pub fn new(client: reqwest::Client, base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid dictionary API url: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("dictionary API url cannot take path segments: {}", base_url);
        }
        Ok(Self { client, base_url })
    }

    fn entry_url(&self, word: &str) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::InvalidUrl(word.to_string()))?
            .pop_if_empty()
            .push(word);
        Ok(url)
    }
}

#[async_trait]
impl DictionaryLookup for FreeDictionaryApi {
    async fn lookup(&self, word: &str) -> Result<LookupOutcome, LookupError> {
        let response = self.client.get(self.entry_url(word)?).send().await?;

        match response.status() {
            StatusCode::OK => {
                let entries: Vec<serde_json::Value> = response
                    .json()
                    .await
                    .map_err(|e| LookupError::Malformed(e.to_string()))?;
                found_entries(&entries)
            }
            StatusCode::NOT_FOUND => Ok(LookupOutcome::NotFound),
            status => Err(LookupError::UnexpectedStatus(status)),
        }
    }
}

/// Outcome of a 200 response body
fn found_entries(entries: &[serde_json::Value]) -> Result<LookupOutcome, LookupError> {
    if entries.is_empty() {
        return Err(LookupError::Malformed("empty entry list".to_string()));
    }
    Ok(LookupOutcome::Found)
}
