//! Application-facing RAG engine.
//!
//! One explicitly constructed object owns the vector index, the retrieval
//! settings, the indexing pipeline, and the (optional) embedding provider
//! handle. The application layer observes sources, indexing state, last
//! retrieval results, and aggregate stats through it; nothing here is a
//! process-wide singleton.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::warn;

use crate::core::paths::AppPaths;
use crate::embedding::EmbeddingProvider;
use crate::extract::{HttpTextExtractor, TextExtractor};
use crate::rag::index::{Chunk, IndexStats, SearchResult, SourceSummary, VectorIndex};
use crate::rag::pipeline::{IndexingPipeline, IndexingState};
use crate::rag::retriever::{build_prompt, Retriever};
use crate::rag::settings::RagSettings;
use crate::storage::{DocumentStore, FileDocumentStore};

const INDEX_NAMESPACE: &str = "vector_index";
const SETTINGS_KEY: &str = "settings";
const SCRAPE_TIMEOUT_SECS: u64 = 30;

pub struct RagEngine {
    index: Arc<VectorIndex>,
    pipeline: IndexingPipeline,
    retriever: Retriever,
    store: Arc<dyn DocumentStore>,
    settings: Mutex<RagSettings>,
    provider: Mutex<Option<Arc<dyn EmbeddingProvider>>>,
    last_results: Mutex<Vec<SearchResult>>,
}

impl RagEngine {
    /// Wires the engine onto the default file-backed store under `paths`.
    pub async fn initialize(paths: &AppPaths) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn DocumentStore> =
            Arc::new(FileDocumentStore::new(&paths.index_dir, INDEX_NAMESPACE));
        let extractor: Arc<dyn TextExtractor> =
            Arc::new(HttpTextExtractor::new(SCRAPE_TIMEOUT_SECS)?);
        Ok(Arc::new(Self::open(store, extractor).await))
    }

    /// Builds the engine on explicit collaborators. The persisted index and
    /// settings are loaded eagerly; both loads tolerate missing or malformed
    /// documents.
    pub async fn open(store: Arc<dyn DocumentStore>, extractor: Arc<dyn TextExtractor>) -> Self {
        let settings = load_settings(store.as_ref()).await;
        let index = Arc::new(VectorIndex::open(store.clone()).await);
        let pipeline = IndexingPipeline::new(index.clone(), extractor);
        let retriever = Retriever::new(index.clone());

        Self {
            index,
            pipeline,
            retriever,
            store,
            settings: Mutex::new(settings),
            provider: Mutex::new(None),
            last_results: Mutex::new(Vec::new()),
        }
    }

    /// Installs or clears the embedding provider as models load and unload.
    pub async fn set_provider(&self, provider: Option<Arc<dyn EmbeddingProvider>>) {
        *self.provider.lock().await = provider;
    }

    pub async fn settings(&self) -> RagSettings {
        self.settings.lock().await.clone()
    }

    /// Replaces the settings (re-clamped) and persists them. A persistence
    /// failure is logged and the in-memory update kept.
    pub async fn update_settings(&self, settings: RagSettings) -> RagSettings {
        let clamped = settings.clamped();
        *self.settings.lock().await = clamped.clone();

        match serde_json::to_vec_pretty(&clamped) {
            Ok(bytes) => {
                if let Err(err) = self.store.write(SETTINGS_KEY, &bytes).await {
                    warn!("failed to persist settings: {err}");
                }
            }
            Err(err) => warn!("failed to serialize settings: {err}"),
        }

        clamped
    }

    // --- ingestion ---

    /// Scrapes and indexes a URL. Returns the terminal job state; failures
    /// surface only through `IndexingState::Error`.
    pub async fn ingest_url(&self, url: &str) -> IndexingState {
        let provider = self.provider.lock().await.clone();
        let chunk_size = self.settings.lock().await.chunk_size_tokens();
        self.pipeline.ingest_url(url, provider, chunk_size).await
    }

    /// Indexes caller-supplied text under `source_id`, skipping the scrape
    /// stage.
    pub async fn ingest_text(&self, source_id: &str, title: &str, text: &str) -> IndexingState {
        let provider = self.provider.lock().await.clone();
        let chunk_size = self.settings.lock().await.chunk_size_tokens();
        self.pipeline
            .ingest_text(source_id, title, text, provider, chunk_size)
            .await
    }

    pub fn indexing_state(&self) -> IndexingState {
        self.pipeline.state()
    }

    pub fn subscribe_indexing(&self) -> watch::Receiver<IndexingState> {
        self.pipeline.subscribe()
    }

    pub fn cancel_indexing(&self) {
        self.pipeline.cancel();
    }

    pub fn reset_indexing(&self) {
        self.pipeline.reset();
    }

    // --- corpus management ---

    pub async fn sources(&self) -> Vec<SourceSummary> {
        self.index.get_sources().await
    }

    pub async fn chunks_by_source(&self, source_id: &str) -> Vec<Chunk> {
        self.index.get_chunks_by_source(source_id).await
    }

    /// Deletes a source and persists the compacted index. Returns the number
    /// of removed chunks.
    pub async fn delete_source(&self, source_id: &str) -> usize {
        let removed = self.index.delete_by_source(source_id).await;
        if removed > 0 {
            if let Err(err) = self.index.save_to_disk().await {
                warn!("failed to persist index after deleting '{source_id}': {err}");
            }
        }
        removed
    }

    /// Drops the whole corpus, in memory and on disk.
    pub async fn clear_index(&self) {
        self.index.clear().await;
        self.last_results.lock().await.clear();
    }

    pub async fn stats(&self) -> IndexStats {
        self.index.stats().await
    }

    // --- retrieval ---

    /// Retrieves context for `query` and records it as the last result set.
    /// Never fails: disabled RAG, a missing provider, or a failed query
    /// embedding all yield an empty set.
    pub async fn retrieve(&self, query: &str) -> Vec<SearchResult> {
        let settings = self.settings.lock().await.clone();
        let provider = self.provider.lock().await.clone();

        let results = self
            .retriever
            .retrieve(query, provider.as_ref(), &settings)
            .await;

        *self.last_results.lock().await = results.clone();
        results
    }

    pub async fn last_results(&self) -> Vec<SearchResult> {
        self.last_results.lock().await.clone()
    }

    /// Assembles the final generation prompt from a query and its retrieved
    /// context.
    pub fn build_prompt(
        &self,
        query: &str,
        results: &[SearchResult],
        system_prompt: Option<&str>,
    ) -> String {
        build_prompt(query, results, system_prompt)
    }
}

async fn load_settings(store: &dyn DocumentStore) -> RagSettings {
    match store.read(SETTINGS_KEY).await {
        Ok(Some(bytes)) => match serde_json::from_slice::<RagSettings>(&bytes) {
            Ok(settings) => settings.clamped(),
            Err(err) => {
                warn!("malformed settings document, using defaults: {err}");
                RagSettings::default()
            }
        },
        Ok(None) => RagSettings::default(),
        Err(err) => {
            warn!("could not read settings document, using defaults: {err}");
            RagSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::core::errors::RagError;
    use crate::embedding::HashEmbedder;
    use crate::extract::ExtractedPage;

    struct StaticExtractor {
        text: String,
    }

    #[async_trait]
    impl TextExtractor for StaticExtractor {
        async fn scrape(&self, _url: &str) -> Result<ExtractedPage, RagError> {
            Ok(ExtractedPage {
                title: "Static".to_string(),
                text: self.text.clone(),
                word_count: self.text.split_whitespace().count(),
            })
        }
    }

    struct HashProvider {
        embedder: HashEmbedder,
    }

    impl HashProvider {
        fn new() -> Self {
            Self {
                embedder: HashEmbedder::new(),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for HashProvider {
        fn name(&self) -> &str {
            "hash"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
            Ok(self.embedder.embed(text))
        }
    }

    async fn test_engine(root: &std::path::Path, page_text: &str) -> RagEngine {
        let store: Arc<dyn DocumentStore> =
            Arc::new(FileDocumentStore::new(root, INDEX_NAMESPACE));
        let extractor: Arc<dyn TextExtractor> = Arc::new(StaticExtractor {
            text: page_text.to_string(),
        });
        RagEngine::open(store, extractor).await
    }

    #[tokio::test]
    async fn ingest_then_retrieve_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path(), "").await;
        engine.set_provider(Some(Arc::new(HashProvider::new()))).await;

        let text = "Vector search ranks passages by cosine similarity. \
                    Unrelated text about gardening and tomato plants.";
        let state = engine.ingest_text("notes", "Notes", text).await;
        assert!(matches!(state, IndexingState::Complete { .. }));

        let results = engine.retrieve("cosine similarity search").await;
        assert!(!results.is_empty());
        assert!(results[0].chunk.text.contains("cosine"));

        assert_eq!(engine.last_results().await.len(), results.len());

        let prompt = engine.build_prompt("cosine similarity search", &results, None);
        assert!(prompt.contains("CONTEXT:"));
        assert!(prompt.contains("[notes]"));
    }

    #[tokio::test]
    async fn retrieve_without_provider_returns_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path(), "").await;

        engine.ingest_text("notes", "Notes", "some indexed text here").await;
        let results = engine.retrieve("anything at all").await;
        assert!(results.is_empty());
        assert!(engine.last_results().await.is_empty());
    }

    #[tokio::test]
    async fn settings_update_is_clamped_and_persisted() {
        let tmp = tempfile::tempdir().unwrap();

        {
            let engine = test_engine(tmp.path(), "").await;
            let mut settings = engine.settings().await;
            settings.set_top_k(3);
            settings.set_min_similarity(0.5);
            engine.update_settings(settings).await;
        }

        let engine = test_engine(tmp.path(), "").await;
        let settings = engine.settings().await;
        assert_eq!(settings.top_k(), 3);
        assert_eq!(settings.min_similarity(), 0.5);
    }

    #[tokio::test]
    async fn delete_source_persists_compaction() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path(), "").await;

        engine.ingest_text("a", "A", "first document text").await;
        engine.ingest_text("b", "B", "second document text").await;
        assert_eq!(engine.sources().await.len(), 2);

        let removed = engine.delete_source("a").await;
        assert_eq!(removed, 1);

        let reopened = test_engine(tmp.path(), "").await;
        let sources = reopened.sources().await;
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].id, "b");
        assert_eq!(reopened.chunks_by_source("b").await[0].id, 0);
    }

    #[tokio::test]
    async fn url_ingestion_uses_extractor() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(
            tmp.path(),
            "A page about on-device retrieval augmented generation.",
        )
        .await;

        let state = engine.ingest_url("https://example.com/page").await;
        let IndexingState::Complete { source } = state else {
            panic!("expected Complete");
        };
        assert_eq!(source.title.as_deref(), Some("Static"));
        assert_eq!(source.url.as_deref(), Some("https://example.com/page"));

        let stats = engine.stats().await;
        assert_eq!(stats.total_chunks, source.chunks_count);
        assert_eq!(stats.source_count, 1);
    }

    #[tokio::test]
    async fn stats_report_dimension_and_memory() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path(), "").await;
        engine.set_provider(Some(Arc::new(HashProvider::new()))).await;

        engine.ingest_text("s", "S", "enough words to make one chunk").await;

        let stats = engine.stats().await;
        assert_eq!(stats.total_chunks, 1);
        assert_eq!(stats.embedding_dimension, 384);
        assert_eq!(stats.estimated_memory_bytes, 384 * 4);
    }

    #[tokio::test]
    async fn clear_index_drops_corpus_and_last_results() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = test_engine(tmp.path(), "").await;
        engine.set_provider(Some(Arc::new(HashProvider::new()))).await;

        engine.ingest_text("s", "S", "searchable text about indexing").await;
        engine.retrieve("searchable indexing").await;

        engine.clear_index().await;
        assert_eq!(engine.stats().await.total_chunks, 0);
        assert!(engine.last_results().await.is_empty());
    }
}
