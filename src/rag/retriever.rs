//! Query-side retrieval and prompt assembly.
//!
//! Retrieval must never block or fail generation: every failure path
//! degrades to an empty result set, and an empty CONTEXT section is
//! indistinguishable from RAG being disabled.

use std::sync::Arc;

use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::rag::index::{SearchResult, VectorIndex};
use crate::rag::settings::RagSettings;

pub struct Retriever {
    index: Arc<VectorIndex>,
}

impl Retriever {
    pub fn new(index: Arc<VectorIndex>) -> Self {
        Self { index }
    }

    /// Finds the most relevant chunks for `query`.
    ///
    /// Returns `[]` immediately when retrieval is disabled or no provider is
    /// available. Queries are embedded by the provider only — a hashed query
    /// vector compared against provider-produced corpus vectors would be
    /// meaningless — and a failed query embedding also yields `[]`.
    pub async fn retrieve(
        &self,
        query: &str,
        provider: Option<&Arc<dyn EmbeddingProvider>>,
        settings: &RagSettings,
    ) -> Vec<SearchResult> {
        if !settings.enabled() {
            return Vec::new();
        }
        let Some(provider) = provider else {
            return Vec::new();
        };

        let embedding = match provider.embed(query).await {
            Ok(vector) => vector,
            Err(err) => {
                debug!(
                    provider = provider.name(),
                    "query embedding failed, returning no context: {err}"
                );
                return Vec::new();
            }
        };

        self.index
            .search(&embedding, settings.top_k(), settings.min_similarity())
            .await
    }
}

/// Assembles the generation prompt from SYSTEM / CONTEXT / USER sections.
///
/// CONTEXT lists the retrieved chunks in descending-similarity order, each
/// prefixed by its source identifier and separated by a blank line. With no
/// results the section is omitted entirely, so the prompt has the same shape
/// as the non-RAG path.
pub fn build_prompt(query: &str, results: &[SearchResult], system_prompt: Option<&str>) -> String {
    let mut sections: Vec<String> = Vec::with_capacity(3);

    if let Some(system) = system_prompt {
        sections.push(format!("SYSTEM:\n{system}"));
    }

    if !results.is_empty() {
        let context = results
            .iter()
            .map(|result| format!("[{}] {}", result.chunk.source, result.chunk.text))
            .collect::<Vec<_>>()
            .join("\n\n");
        sections.push(format!("CONTEXT:\n{context}"));
    }

    sections.push(format!("USER:\n{query}"));
    sections.join("\n\n")
}
