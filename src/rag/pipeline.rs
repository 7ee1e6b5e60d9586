//! The indexing pipeline: scrape → chunk → embed → store.
//!
//! Each ingestion job walks an explicit state machine. `Error` is reachable
//! from every non-terminal state and terminal; `Idle` is the initial and
//! resting state between jobs. Job failures never cross this boundary as
//! `Err` — the run methods return the terminal state, and observers follow
//! the same transitions through a watch channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::embedding::{EmbeddingProvider, HashEmbedder};
use crate::extract::TextExtractor;
use crate::rag::chunker::chunk_by_tokens;
use crate::rag::index::{EmbeddedChunk, SourceSummary, VectorIndex};

/// Chunk overlap is not user-tunable; 10% of the default chunk size.
pub const OVERLAP_TOKENS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexingState {
    Idle,
    Scraping { url: String },
    Chunking { title: String },
    Embedding { current: usize, total: usize },
    Storing,
    Complete { source: SourceSummary },
    Error { message: String },
}

impl IndexingState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, IndexingState::Complete { .. } | IndexingState::Error { .. })
    }
}

/// Cooperative cancellation for an in-flight job. Honored only between
/// per-chunk embedding steps, so a cancelled job never leaves a partially
/// persisted batch.
#[derive(Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

pub struct IndexingPipeline {
    index: Arc<VectorIndex>,
    extractor: Arc<dyn TextExtractor>,
    fallback: HashEmbedder,
    cancel: CancelHandle,
    state_tx: watch::Sender<IndexingState>,
    // one ingestion job at a time against the shared store
    job_lock: Mutex<()>,
}

impl IndexingPipeline {
    pub fn new(index: Arc<VectorIndex>, extractor: Arc<dyn TextExtractor>) -> Self {
        let (state_tx, _) = watch::channel(IndexingState::Idle);
        Self {
            index,
            extractor,
            fallback: HashEmbedder::new(),
            cancel: CancelHandle::default(),
            state_tx,
            job_lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> IndexingState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<IndexingState> {
        self.state_tx.subscribe()
    }

    /// Requests cancellation of the in-flight job, if any.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Handle for cancelling the in-flight job from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Returns the state machine to `Idle` between jobs.
    pub fn reset(&self) {
        self.transition(IndexingState::Idle);
    }

    /// Ingests a URL end to end. Returns the terminal state of the job.
    pub async fn ingest_url(
        &self,
        url: &str,
        provider: Option<Arc<dyn EmbeddingProvider>>,
        chunk_size_tokens: usize,
    ) -> IndexingState {
        let _job = self.job_lock.lock().await;
        self.cancel.reset();

        self.transition(IndexingState::Scraping {
            url: url.to_string(),
        });

        let page = match self.extractor.scrape(url).await {
            Ok(page) => page,
            Err(err) => return self.fail(format!("extraction failed for {url}: {err}")),
        };

        if page.text.trim().is_empty() {
            return self.fail(format!("no text extracted from {url}"));
        }

        let source_id = Uuid::new_v4().to_string();
        self.run_ingestion(
            &source_id,
            &page.title,
            Some(url.to_string()),
            &page.text,
            provider,
            chunk_size_tokens,
        )
        .await
    }

    /// Ingests caller-supplied text under an explicit source id, skipping the
    /// scrape stage. Returns the terminal state of the job.
    pub async fn ingest_text(
        &self,
        source_id: &str,
        title: &str,
        text: &str,
        provider: Option<Arc<dyn EmbeddingProvider>>,
        chunk_size_tokens: usize,
    ) -> IndexingState {
        let _job = self.job_lock.lock().await;
        self.cancel.reset();
        self.run_ingestion(source_id, title, None, text, provider, chunk_size_tokens)
            .await
    }

    async fn run_ingestion(
        &self,
        source_id: &str,
        title: &str,
        url: Option<String>,
        text: &str,
        provider: Option<Arc<dyn EmbeddingProvider>>,
        chunk_size_tokens: usize,
    ) -> IndexingState {
        self.transition(IndexingState::Chunking {
            title: title.to_string(),
        });

        let pieces = chunk_by_tokens(text, chunk_size_tokens, OVERLAP_TOKENS);
        if pieces.is_empty() {
            return self.fail(format!("no chunks produced for '{title}'"));
        }

        let total = pieces.len();
        let mut batch = Vec::with_capacity(total);

        for (position, piece) in pieces.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                return self.fail("indexing cancelled".to_string());
            }

            self.transition(IndexingState::Embedding {
                current: position + 1,
                total,
            });

            let vector = self.embed_chunk(&piece, provider.as_deref(), position).await;
            batch.push(EmbeddedChunk {
                text: piece,
                vector,
                title: Some(title.to_string()),
                url: url.clone(),
            });
        }

        self.transition(IndexingState::Storing);
        self.index.add_chunks(batch, source_id).await;

        // Persistence problems are logged, never fatal to the job.
        if let Err(err) = self.index.save_to_disk().await {
            warn!("failed to persist index after ingesting '{source_id}': {err}");
        }

        let Some(source) = self.index.get_source(source_id).await else {
            return self.fail(format!("source '{source_id}' missing after insert"));
        };

        info!(
            source = source_id,
            chunks = source.chunks_count,
            "ingestion complete"
        );
        let state = IndexingState::Complete { source };
        self.transition(state.clone());
        state
    }

    /// Embeds one chunk via the provider, falling back to the deterministic
    /// hash embedding on failure so a single bad call never aborts the batch.
    async fn embed_chunk(
        &self,
        text: &str,
        provider: Option<&dyn EmbeddingProvider>,
        position: usize,
    ) -> Vec<f32> {
        match provider {
            Some(provider) => match provider.embed(text).await {
                Ok(vector) => vector,
                Err(err) => {
                    warn!(
                        chunk = position,
                        provider = provider.name(),
                        "embedding failed, using fallback hash: {err}"
                    );
                    self.fallback.embed(text)
                }
            },
            None => self.fallback.embed(text),
        }
    }

    fn transition(&self, state: IndexingState) {
        debug!(?state, "indexing state");
        let _ = self.state_tx.send(state);
    }

    fn fail(&self, message: String) -> IndexingState {
        warn!("indexing job failed: {message}");
        let state = IndexingState::Error { message };
        self.transition(state.clone());
        state
    }
}
