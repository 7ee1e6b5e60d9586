use serde::{Deserialize, Serialize};

/// Runtime-tunable retrieval configuration.
///
/// Fields are private so every write path goes through a clamping setter;
/// values arriving from persisted JSON are re-clamped via [`RagSettings::clamped`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    enabled: bool,
    top_k: usize,
    chunk_size_tokens: usize,
    min_similarity: f32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: 5,
            chunk_size_tokens: 500,
            min_similarity: 0.3,
        }
    }
}

impl RagSettings {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn set_top_k(&mut self, top_k: usize) {
        self.top_k = top_k.clamp(1, 20);
    }

    pub fn chunk_size_tokens(&self) -> usize {
        self.chunk_size_tokens
    }

    pub fn set_chunk_size_tokens(&mut self, tokens: usize) {
        self.chunk_size_tokens = tokens.clamp(100, 1000);
    }

    pub fn min_similarity(&self) -> f32 {
        self.min_similarity
    }

    pub fn set_min_similarity(&mut self, similarity: f32) {
        self.min_similarity = similarity.clamp(0.0, 0.9);
    }

    /// Re-applies every clamp. Deserialized settings pass through here so a
    /// hand-edited or stale settings document cannot smuggle values out of
    /// range.
    pub fn clamped(mut self) -> Self {
        self.set_top_k(self.top_k);
        self.set_chunk_size_tokens(self.chunk_size_tokens);
        self.set_min_similarity(self.min_similarity);
        self
    }
}
