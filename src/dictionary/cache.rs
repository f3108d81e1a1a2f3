use std::{
    collections::{BTreeMap, HashMap},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use dashmap::DashMap;
use tokio::fs;

/// Normalized word -> validity, backed by a JSON file that is rewritten on every save
pub struct WordCache {
    entries: DashMap<String, bool>,
    path: PathBuf,
}

impl WordCache {
    /// Empty cache that will save to `path`
    pub fn empty<P: AsRef<Path>>(path: P) -> Self {
        Self {
            entries: DashMap::new(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the cache file. A missing or unreadable file leaves the cache empty.
    pub async fn load<P: AsRef<Path>>(path: P) -> Self {
        let cache = Self::empty(path);

        match read_entries(&cache.path).await {
            Ok(Some(entries)) => {
                for (word, valid) in entries {
                    cache.insert(word, valid);
                }
                tracing::info!(
                    "Loaded {} words from cache {}",
                    cache.entries.len(),
                    cache.path.display()
                );
            }
            Ok(None) => {
                tracing::info!(
                    "No word cache at {}, starting empty",
                    cache.path.display()
                );
            }
            Err(e) => {
                tracing::warn!("Failed to load word cache: {:#}. Starting empty.", e);
            }
        }

        cache
    }

    pub fn get(&self, word: &str) -> Option<bool> {
        self.entries.get(word).map(|entry| *entry)
    }

    pub fn insert(&self, word: String, valid: bool) {
        self.entries.insert(word, valid);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Write every entry to disk, replacing the previous file. Returns the entry count.
    pub async fn save(&self) -> Result<usize> {
        let snapshot: BTreeMap<String, bool> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        let json = serde_json::to_string_pretty(&snapshot)?;

        // Write beside the target and rename so a crash never leaves a torn file
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .await
            .with_context(|| format!("writing {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;

        Ok(snapshot.len())
    }
}

async fn read_entries(path: &Path) -> Result<Option<HashMap<String, bool>>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(anyhow::Error::from(e).context(format!("reading {}", path.display())))
        }
    };

    let entries = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(entries))
}
