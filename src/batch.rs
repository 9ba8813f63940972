//! Owned batches of tokenized sentences
//!
//! A [`BatchData`] is what crosses the boundary between a caller and the
//! translation engine. Every accessor hands out an owned copy, so nothing
//! outside the batch can alias its buffers.
//!
//! # Example
//!
//! ```
//! use rusty_ctranslate2::BatchData;
//!
//! let mut batch = BatchData::new();
//! batch.append(vec!["▁Hello".to_string(), "▁world".to_string()]);
//! assert_eq!(batch.len(), 1);
//! assert_eq!(batch.get(0).unwrap(), vec!["▁Hello", "▁world"]);
//! assert!(batch.get(1).is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ordered sequence of sentences, each an ordered sequence of tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchData {
    sentences: Vec<Vec<String>>,
}

impl BatchData {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty batch with room for `capacity` sentences
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sentences: Vec::with_capacity(capacity),
        }
    }

    /// Number of sentences in the batch
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Copy of the sentence at `index`
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `index >= self.len()`.
    pub fn get(&self, index: usize) -> Result<Vec<String>> {
        self.sentences
            .get(index)
            .cloned()
            .ok_or(Error::OutOfRange {
                index,
                length: self.sentences.len(),
            })
    }

    /// Add one sentence at the end of the batch
    pub fn append(&mut self, sentence: Vec<String>) {
        self.sentences.push(sentence);
    }

    /// Copy of every sentence, in order
    pub fn export_all(&self) -> Vec<Vec<String>> {
        self.sentences.clone()
    }

    /// Consume the batch and return its sentences
    pub fn into_sentences(self) -> Vec<Vec<String>> {
        self.sentences
    }
}

impl From<Vec<Vec<String>>> for BatchData {
    fn from(sentences: Vec<Vec<String>>) -> Self {
        Self { sentences }
    }
}

impl FromIterator<Vec<String>> for BatchData {
    fn from_iter<I: IntoIterator<Item = Vec<String>>>(iter: I) -> Self {
        Self {
            sentences: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for BatchData {
    type Item = Vec<String>;
    type IntoIter = std::vec::IntoIter<Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sentences.into_iter()
    }
}
