//! Shared, ordered word store.
//!
//! The dictionary is loaded once at startup and then shared by every
//! connection. Scans, appends and persists all go through one lock and each
//! holds it for its whole duration, so a scan always sees a consistent
//! sequence and a persist always writes one.
//!
//! This lock is never held across client I/O. The interactive exchange is
//! guarded separately by [`crate::gate::InteractiveGate`].

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::{
    fs::File,
    io::{AsyncWriteExt, BufWriter},
    sync::Mutex,
};
use tracing::{debug, info};

use crate::matching::{self, RankedMatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to load dictionary from '{}'", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to persist dictionary to '{}'", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Ordered word collection: load order first, then append order.
///
/// Duplicates are kept as-is.
#[derive(Debug, Default)]
pub struct DictionaryStore {
    words: Mutex<Vec<String>>,
}

impl DictionaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = words
            .into_iter()
            .map(Into::into)
            .map(|word: String| word.trim().to_string())
            .filter(|word| !word.is_empty())
            .collect();

        Self {
            words: Mutex::new(words),
        }
    }

    /// Reads whitespace-delimited words from `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StoreError::Load {
                path: path.to_path_buf(),
                source,
            })?;

        let store = Self::from_words(contents.split_whitespace());
        let count = store.len().await;
        info!(path = %path.display(), words = count, "dictionary loaded");
        Ok(store)
    }

    /// Adds `word` at the end and returns the new size.
    pub async fn append(&self, word: &str) -> usize {
        let mut words = self.words.lock().await;
        words.push(word.trim().to_string());
        debug!(word, size = words.len(), "appended word");
        words.len()
    }

    /// Ranks the current entries against `word`, keeping the `k` closest.
    pub async fn scan(&self, word: &str, k: usize) -> RankedMatch {
        let words = self.words.lock().await;
        matching::top_k(word, words.iter(), k)
    }

    /// Overwrites `path` with every entry, one per line, and returns the
    /// number of words written.
    pub async fn persist(&self, path: impl AsRef<Path>) -> Result<usize, StoreError> {
        let path = path.as_ref();
        let words = self.words.lock().await;

        let persist_error = |source| StoreError::Persist {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).await.map_err(persist_error)?;
        let mut writer = BufWriter::new(file);
        for word in words.iter() {
            writer.write_all(word.as_bytes()).await.map_err(persist_error)?;
            writer.write_all(b"\n").await.map_err(persist_error)?;
        }
        writer.flush().await.map_err(persist_error)?;

        info!(path = %path.display(), words = words.len(), "dictionary saved");
        Ok(words.len())
    }

    pub async fn len(&self) -> usize {
        self.words.lock().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn snapshot(&self) -> Vec<String> {
        self.words.lock().await.clone()
    }
}
