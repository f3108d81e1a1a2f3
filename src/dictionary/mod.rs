pub mod cache;
pub mod fallback;
pub mod lookup;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio::{task::JoinHandle, time};

pub use cache::WordCache;
pub use lookup::{DictionaryLookup, FreeDictionaryApi, LookupError, LookupOutcome};

/// Words shorter than this are rejected without a lookup
const MIN_WORD_LEN: usize = 2;

/// Answer for one word
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// From the cache or an authoritative lookup
    Known(bool),
    /// The lookup failed; the answer comes from the built-in list and was not cached
    Fallback { valid: bool, error: String },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        match self {
            Verdict::Known(valid) => *valid,
            Verdict::Fallback { valid, .. } => *valid,
        }
    }
}

/// Decides whether a word is real: cache first, then a time-bounded
/// external lookup, then the built-in fallback list.
pub struct WordValidator {
    cache: WordCache,
    lookup: Arc<dyn DictionaryLookup>,
    timeout: Duration,
}

impl WordValidator {
    pub fn new(cache: WordCache, lookup: Arc<dyn DictionaryLookup>, timeout: Duration) -> Self {
        Self {
            cache,
            lookup,
            timeout,
        }
    }

    pub fn normalize(word: &str) -> String {
        word.trim().to_lowercase()
    }

    pub async fn validate(&self, word: &str) -> Verdict {
        let word = Self::normalize(word);
        if word.chars().count() < MIN_WORD_LEN {
            return Verdict::Known(false);
        }

        if let Some(valid) = self.cache.get(&word) {
            return Verdict::Known(valid);
        }

        let result = match time::timeout(self.timeout, self.lookup.lookup(&word)).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout(self.timeout)),
        };

        match result {
            Ok(outcome) => {
                let valid = outcome == LookupOutcome::Found;
                self.cache.insert(word, valid);
                Verdict::Known(valid)
            }
            Err(e) => {
                // Transient failures must not poison the cache
                tracing::warn!("Dictionary lookup failed for {:?}: {}", word, e);
                Verdict::Fallback {
                    valid: fallback::contains(&word),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Cached answer for a word, without looking it up
    #[cfg(test)]
    pub fn cached(&self, word: &str) -> Option<bool> {
        self.cache.get(&Self::normalize(word))
    }

    /// Save the cache to disk. Failures are logged, the cache stays in memory.
    pub async fn persist(&self) {
        match self.try_persist().await {
            Ok(count) => tracing::info!("Saved {} words to cache", count),
            Err(e) => tracing::error!("Failed to save word cache: {:#}", e),
        }
    }

    pub async fn try_persist(&self) -> Result<usize> {
        self.cache.save().await
    }
}

/// Save the validator's cache every `every`, starting one interval from now
pub fn spawn_cache_flusher(validator: Arc<WordValidator>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval_at(time::Instant::now() + every, every);
        loop {
            interval.tick().await;
            validator.persist().await;
        }
    })
}
