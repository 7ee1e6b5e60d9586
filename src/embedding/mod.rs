mod fallback;

pub use fallback::{HashEmbedder, FALLBACK_DIMENSION};

use async_trait::async_trait;

use crate::core::errors::RagError;

/// Abstract interface to the loaded embedding model.
///
/// The vector dimension is fixed by whatever model the provider currently
/// has loaded; individual calls may fail (model busy, backend gone) and
/// callers decide how to degrade.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g. "llama_cpp", "lmstudio").
    fn name(&self) -> &str;

    /// Embed one text into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError>;
}
