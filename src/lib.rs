//! Candela's local retrieval-augmented-generation engine.
//!
//! Maintains a semantic index of ingested text on device, retrieves the
//! most relevant passages for a query, and assembles them into a generation
//! prompt. Embedding models, web scraping, and durable storage are
//! collaborators behind traits; the engine owns chunking, the vector index,
//! the indexing pipeline, and retrieval.

pub mod core;
pub mod embedding;
pub mod extract;
pub mod logging;
pub mod rag;
pub mod storage;
pub mod vector_math;

pub use crate::core::errors::RagError;
pub use crate::core::paths::AppPaths;
pub use crate::embedding::{EmbeddingProvider, HashEmbedder, FALLBACK_DIMENSION};
pub use crate::extract::{ExtractedPage, HttpTextExtractor, TextExtractor};
pub use crate::rag::chunker::chunk_by_tokens;
pub use crate::rag::engine::RagEngine;
pub use crate::rag::index::{
    Chunk, EmbeddedChunk, IndexStats, SearchResult, SourceSummary, VectorIndex,
};
pub use crate::rag::pipeline::{CancelHandle, IndexingPipeline, IndexingState};
pub use crate::rag::retriever::{build_prompt, Retriever};
pub use crate::rag::settings::RagSettings;
pub use crate::storage::{DocumentStore, FileDocumentStore};
