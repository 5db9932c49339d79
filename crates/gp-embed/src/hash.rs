//! Deterministic hashed bag-of-words embedder.
//!
//! Each lowercase word token is hashed into one of `dimension` buckets and
//! the resulting count vector is L2 normalized. No model weights, no
//! network, fully reproducible, which makes it the default provider for
//! tests and offline use. Texts sharing vocabulary score high; disjoint
//! texts score 0.

use crate::distance::normalize_vector;
use crate::error::Result;
use crate::traits::Embedder;
use async_trait::async_trait;

pub const DEFAULT_DIMENSION: usize = 256;

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .map(|w| w.to_lowercase())
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dimension];
        for word in Self::tokenize(text) {
            let bucket = seahash::hash(word.as_bytes()) as usize % self.dimension;
            v[bucket] += 1.0;
        }
        normalize_vector(&mut v);
        Ok(v)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}
