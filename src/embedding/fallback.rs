//! Deterministic hash-based embedding.
//!
//! Keeps ingestion progressing when the real embedding provider fails for a
//! specific chunk. The vector is a bag-of-words hash: each surviving token
//! contributes `1/word_count` at a slot derived from its SHA-256 digest, so
//! the same text always produces the same vector.

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::vector_math::normalize;

pub const FALLBACK_DIMENSION: usize = 384;

pub struct HashEmbedder {
    dimension: usize,
    token_split: Regex,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: FALLBACK_DIMENSION,
            token_split: Regex::new(r"\W+").expect("static token split pattern"),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embeds `text` into a unit vector. Text with no usable tokens yields
    /// the zero vector, which the index stores unchanged.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = self
            .token_split
            .split(&lowered)
            .filter(|token| token.len() > 2)
            .collect();

        if tokens.is_empty() {
            return vector;
        }

        let weight = 1.0 / tokens.len() as f32;
        for token in &tokens {
            vector[self.slot_for(token)] += weight;
        }

        normalize(&mut vector);
        vector
    }

    fn slot_for(&self, token: &str) -> usize {
        let digest = Sha256::digest(token.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        (u64::from_be_bytes(prefix) % self.dimension as u64) as usize
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}
