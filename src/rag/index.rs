//! Thread-safe, persisted vector index.
//!
//! Stores (chunk, vector) pairs, answers brute-force cosine similarity
//! queries, and round-trips through two documents in a `DocumentStore`
//! (metadata and data). Every read and write is serialized through one lock
//! owned by the index, so readers never observe a partially-inserted batch.
//!
//! Ids are dense `0..n-1`, assigned by insertion order; deleting a source
//! compacts the survivors back to dense ids. The embedding dimension is
//! fixed by the first inserted vector for the life of the store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::core::errors::RagError;
use crate::storage::DocumentStore;
use crate::vector_math::{dot, normalize};

pub const SCHEMA_VERSION: u32 = 1;

const METADATA_KEY: &str = "metadata";
const DATA_KEY: &str = "data";

/// A bounded span of source text with metadata. Immutable once stored,
/// except for the id, which is reassigned when deletion compacts the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: u64,
    pub text: String,
    pub source: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub timestamp: DateTime<Utc>,
    pub title: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub chunk: Chunk,
    /// Cosine similarity in [-1, 1].
    pub score: f32,
}

/// Aggregation of the chunks sharing a source id. Never persisted
/// separately; recomputed on demand by scanning the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub chunks_count: usize,
    pub word_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub total_chunks: usize,
    pub source_count: usize,
    pub embedding_dimension: usize,
    pub estimated_memory_bytes: usize,
}

/// One chunk of an ingestion batch, already embedded.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub text: String,
    pub vector: Vec<f32>,
    pub title: Option<String>,
    pub url: Option<String>,
}

struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

#[derive(Default)]
struct IndexInner {
    entries: Vec<IndexEntry>,
    embedding_dimension: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexMetadata {
    total_chunks: usize,
    embedding_dimension: usize,
    schema_version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChunkMetadata {
    source: String,
    chunk_index: usize,
    total_chunks: usize,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    id: u64,
    text: String,
    metadata: ChunkMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexData {
    documents: Vec<StoredDocument>,
    vectors: Vec<Vec<f32>>,
}

pub struct VectorIndex {
    store: Arc<dyn DocumentStore>,
    inner: Mutex<IndexInner>,
}

impl VectorIndex {
    /// Opens the index, eagerly loading any persisted snapshot. Missing or
    /// malformed documents mean an empty index, never a failure.
    pub async fn open(store: Arc<dyn DocumentStore>) -> Self {
        let inner = match load_snapshot(store.as_ref()).await {
            Ok(Some(inner)) => {
                debug!(chunks = inner.entries.len(), "loaded persisted index");
                inner
            }
            Ok(None) => IndexInner::default(),
            Err(err) => {
                warn!("could not load persisted index, starting empty: {err}");
                IndexInner::default()
            }
        };

        Self {
            store,
            inner: Mutex::new(inner),
        }
    }

    /// Inserts one chunk. The vector is normalized to unit length (zero
    /// vectors stored unchanged); the first insert fixes the embedding
    /// dimension. Returns the assigned id.
    pub async fn add_chunk(
        &self,
        text: &str,
        vector: Vec<f32>,
        source: &str,
        title: Option<String>,
        url: Option<String>,
    ) -> u64 {
        let mut inner = self.inner.lock().await;
        insert_entry(
            &mut inner,
            EmbeddedChunk {
                text: text.to_string(),
                vector,
                title,
                url,
            },
            source,
            0,
            1,
            Utc::now(),
        )
    }

    /// Inserts a whole ingestion batch under one source id, atomically with
    /// respect to readers. Chunk index, total count, and a shared timestamp
    /// are derived from batch position. Returns the assigned ids.
    pub async fn add_chunks(&self, batch: Vec<EmbeddedChunk>, source: &str) -> Vec<u64> {
        let total = batch.len();
        let timestamp = Utc::now();
        let mut inner = self.inner.lock().await;

        batch
            .into_iter()
            .enumerate()
            .map(|(position, chunk)| {
                insert_entry(&mut inner, chunk, source, position, total, timestamp)
            })
            .collect()
    }

    /// Brute-force cosine similarity search. The query is normalized, scored
    /// against every stored vector, filtered by `min_similarity`, sorted
    /// descending (ties keep insertion order), and truncated to `top_k`.
    pub async fn search(&self, query: &[f32], top_k: usize, min_similarity: f32) -> Vec<SearchResult> {
        let inner = self.inner.lock().await;
        if inner.entries.is_empty() {
            return Vec::new();
        }

        let mut query = query.to_vec();
        normalize(&mut query);

        let mut scored: Vec<(usize, f32)> = inner
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, dot(&query, &entry.vector)))
            .filter(|(_, score)| *score >= min_similarity)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(position, score)| SearchResult {
                chunk: inner.entries[position].chunk.clone(),
                score,
            })
            .collect()
    }

    pub async fn get_chunk(&self, id: u64) -> Option<Chunk> {
        let inner = self.inner.lock().await;
        inner.entries.get(id as usize).map(|entry| entry.chunk.clone())
    }

    pub async fn get_chunks_by_source(&self, source: &str) -> Vec<Chunk> {
        let inner = self.inner.lock().await;
        inner
            .entries
            .iter()
            .filter(|entry| entry.chunk.source == source)
            .map(|entry| entry.chunk.clone())
            .collect()
    }

    /// Source summaries in first-seen order. Word counts are summed over
    /// chunks, the earliest timestamp is retained, title/url come from the
    /// first chunk of the source. O(n) by design.
    pub async fn get_sources(&self) -> Vec<SourceSummary> {
        let inner = self.inner.lock().await;
        summarize_sources(&inner.entries)
    }

    pub async fn get_source(&self, source: &str) -> Option<SourceSummary> {
        let inner = self.inner.lock().await;
        summarize_sources(&inner.entries)
            .into_iter()
            .find(|summary| summary.id == source)
    }

    /// Removes every chunk of `source` and compacts surviving ids back to
    /// dense `0..n-1`, preserving their relative order. Returns the removed
    /// count (0 when nothing matched).
    pub async fn delete_by_source(&self, source: &str) -> usize {
        let mut inner = self.inner.lock().await;
        let before = inner.entries.len();
        inner.entries.retain(|entry| entry.chunk.source != source);
        let removed = before - inner.entries.len();

        if removed > 0 {
            for (position, entry) in inner.entries.iter_mut().enumerate() {
                entry.chunk.id = position as u64;
            }
            debug!(source, removed, "deleted source from index");
        }

        removed
    }

    /// Empties the in-memory state and deletes both persisted documents.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        inner.embedding_dimension = None;

        for key in [METADATA_KEY, DATA_KEY] {
            if let Err(err) = self.store.delete(key).await {
                warn!("failed to delete persisted index document '{key}': {err}");
            }
        }
    }

    /// Serializes the metadata and data documents. Held under the index lock
    /// so a snapshot never interleaves with an insert.
    pub async fn save_to_disk(&self) -> Result<(), RagError> {
        let inner = self.inner.lock().await;

        let metadata = IndexMetadata {
            total_chunks: inner.entries.len(),
            embedding_dimension: inner.embedding_dimension.unwrap_or(0),
            schema_version: SCHEMA_VERSION,
        };
        let data = IndexData {
            documents: inner
                .entries
                .iter()
                .map(|entry| StoredDocument {
                    id: entry.chunk.id,
                    text: entry.chunk.text.clone(),
                    metadata: ChunkMetadata {
                        source: entry.chunk.source.clone(),
                        chunk_index: entry.chunk.chunk_index,
                        total_chunks: entry.chunk.total_chunks,
                        timestamp: entry.chunk.timestamp,
                        title: entry.chunk.title.clone(),
                        url: entry.chunk.url.clone(),
                    },
                })
                .collect(),
            vectors: inner.entries.iter().map(|entry| entry.vector.clone()).collect(),
        };

        let metadata_bytes = serde_json::to_vec(&metadata).map_err(RagError::persistence)?;
        let data_bytes = serde_json::to_vec(&data).map_err(RagError::persistence)?;

        self.store.write(METADATA_KEY, &metadata_bytes).await?;
        self.store.write(DATA_KEY, &data_bytes).await?;
        Ok(())
    }

    pub async fn stats(&self) -> IndexStats {
        let inner = self.inner.lock().await;
        let total_chunks = inner.entries.len();
        let embedding_dimension = inner.embedding_dimension.unwrap_or(0);
        let source_count = summarize_sources(&inner.entries).len();

        IndexStats {
            total_chunks,
            source_count,
            embedding_dimension,
            // f32 payload only; chunk text and metadata are not estimated
            estimated_memory_bytes: total_chunks * embedding_dimension * 4,
        }
    }
}

fn insert_entry(
    inner: &mut IndexInner,
    chunk: EmbeddedChunk,
    source: &str,
    chunk_index: usize,
    total_chunks: usize,
    timestamp: DateTime<Utc>,
) -> u64 {
    let EmbeddedChunk {
        text,
        mut vector,
        title,
        url,
    } = chunk;

    normalize(&mut vector);

    match inner.embedding_dimension {
        None => inner.embedding_dimension = Some(vector.len()),
        Some(dimension) if dimension != vector.len() => {
            // Accepted as-is; mismatched vectors simply never match a query.
            warn!(
                expected = dimension,
                got = vector.len(),
                "inserting vector with mismatched dimension"
            );
        }
        Some(_) => {}
    }

    let id = inner.entries.len() as u64;
    inner.entries.push(IndexEntry {
        chunk: Chunk {
            id,
            text,
            source: source.to_string(),
            chunk_index,
            total_chunks,
            timestamp,
            title,
            url,
        },
        vector,
    });
    id
}

fn summarize_sources(entries: &[IndexEntry]) -> Vec<SourceSummary> {
    let mut order: Vec<SourceSummary> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for entry in entries {
        let chunk = &entry.chunk;
        let words = chunk.text.split_whitespace().count();

        match positions.get(chunk.source.as_str()) {
            Some(&position) => {
                let summary = &mut order[position];
                summary.chunks_count += 1;
                summary.word_count += words;
                if chunk.timestamp < summary.timestamp {
                    summary.timestamp = chunk.timestamp;
                }
            }
            None => {
                positions.insert(chunk.source.as_str(), order.len());
                order.push(SourceSummary {
                    id: chunk.source.clone(),
                    title: chunk.title.clone(),
                    url: chunk.url.clone(),
                    chunks_count: 1,
                    word_count: words,
                    timestamp: chunk.timestamp,
                });
            }
        }
    }

    order
}

async fn load_snapshot(store: &dyn DocumentStore) -> Result<Option<IndexInner>, RagError> {
    let Some(metadata_bytes) = store.read(METADATA_KEY).await? else {
        return Ok(None);
    };
    let Some(data_bytes) = store.read(DATA_KEY).await? else {
        return Ok(None);
    };

    let metadata: IndexMetadata =
        serde_json::from_slice(&metadata_bytes).map_err(RagError::persistence)?;
    if metadata.schema_version != SCHEMA_VERSION {
        return Err(RagError::Persistence(format!(
            "unsupported index schema version {}",
            metadata.schema_version
        )));
    }

    let data: IndexData = serde_json::from_slice(&data_bytes).map_err(RagError::persistence)?;
    if data.documents.len() != data.vectors.len() {
        return Err(RagError::Persistence(format!(
            "document/vector count mismatch: {} != {}",
            data.documents.len(),
            data.vectors.len()
        )));
    }

    let entries: Vec<IndexEntry> = data
        .documents
        .into_iter()
        .zip(data.vectors)
        .map(|(document, vector)| IndexEntry {
            chunk: Chunk {
                id: document.id,
                text: document.text,
                source: document.metadata.source,
                chunk_index: document.metadata.chunk_index,
                total_chunks: document.metadata.total_chunks,
                timestamp: document.metadata.timestamp,
                title: document.metadata.title,
                url: document.metadata.url,
            },
            vector,
        })
        .collect();

    let embedding_dimension = if metadata.embedding_dimension > 0 {
        Some(metadata.embedding_dimension)
    } else {
        None
    };

    Ok(Some(IndexInner {
        entries,
        embedding_dimension,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileDocumentStore;
    use crate::vector_math::l2_norm;

    async fn test_index(root: &std::path::Path) -> VectorIndex {
        let store = Arc::new(FileDocumentStore::new(root, "vector_index"));
        VectorIndex::open(store).await
    }

    fn embedded(text: &str, vector: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            text: text.to_string(),
            vector,
            title: None,
            url: None,
        }
    }

    #[tokio::test]
    async fn vectors_are_normalized_on_insert() {
        let tmp = tempfile::tempdir().unwrap();
        let index = test_index(tmp.path()).await;

        index
            .add_chunk("chunk", vec![3.0, 4.0], "s", None, None)
            .await;

        let results = index.search(&[3.0, 4.0], 1, 0.0).await;
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn zero_vector_is_stored_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let index = test_index(tmp.path()).await;

        index
            .add_chunk("chunk", vec![0.0, 0.0], "s", None, None)
            .await;
        index.save_to_disk().await.unwrap();

        let reopened = test_index(tmp.path()).await;
        // a zero vector scores 0.0 against anything, so it is excluded by
        // a positive similarity floor but visible below it
        let results = reopened.search(&[1.0, 0.0], 1, -1.0).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 0.0);
    }

    #[tokio::test]
    async fn dimension_is_fixed_by_first_insert() {
        let tmp = tempfile::tempdir().unwrap();
        let index = test_index(tmp.path()).await;

        index
            .add_chunk("first", vec![1.0, 0.0, 0.0], "s", None, None)
            .await;
        assert_eq!(index.stats().await.embedding_dimension, 3);

        // mismatched insert is accepted but never matches a 3-dim query
        index.add_chunk("second", vec![1.0, 0.0], "s", None, None).await;
        assert_eq!(index.stats().await.embedding_dimension, 3);

        let results = index.search(&[1.0, 0.0, 0.0], 10, 0.5).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.text, "first");
    }

    #[tokio::test]
    async fn search_orders_by_score_and_respects_top_k() {
        let tmp = tempfile::tempdir().unwrap();
        let index = test_index(tmp.path()).await;

        let batch = vec![
            embedded("east", vec![1.0, 0.0]),
            embedded("north", vec![0.0, 1.0]),
            embedded("northeast", vec![1.0, 1.0]),
        ];
        index.add_chunks(batch, "compass").await;

        let results = index.search(&[1.0, 0.0], 2, -1.0).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "east");
        assert_eq!(results[1].chunk.text, "northeast");
        assert!(results[0].score >= results[1].score);
        for result in &results {
            assert!((-1.0..=1.0).contains(&result.score));
        }
    }

    #[tokio::test]
    async fn search_ties_keep_insertion_order() {
        let tmp = tempfile::tempdir().unwrap();
        let index = test_index(tmp.path()).await;

        let batch = vec![
            embedded("first", vec![1.0, 0.0]),
            embedded("second", vec![1.0, 0.0]),
            embedded("third", vec![1.0, 0.0]),
        ];
        index.add_chunks(batch, "dup").await;

        let results = index.search(&[1.0, 0.0], 3, 0.0).await;
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn search_on_empty_index_returns_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let index = test_index(tmp.path()).await;
        assert!(index.search(&[1.0, 0.0], 5, 0.0).await.is_empty());
    }

    #[tokio::test]
    async fn min_similarity_filters_results() {
        let tmp = tempfile::tempdir().unwrap();
        let index = test_index(tmp.path()).await;

        let batch = vec![
            embedded("aligned", vec![1.0, 0.0]),
            embedded("orthogonal", vec![0.0, 1.0]),
        ];
        index.add_chunks(batch, "s").await;

        let results = index.search(&[1.0, 0.0], 10, 0.5).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.text, "aligned");
    }

    #[tokio::test]
    async fn batch_insert_assigns_positions_and_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let index = test_index(tmp.path()).await;

        let batch = vec![
            embedded("one two", vec![1.0, 0.0]),
            embedded("three", vec![0.0, 1.0]),
        ];
        let ids = index.add_chunks(batch, "doc").await;
        assert_eq!(ids, vec![0, 1]);

        let chunks = index.get_chunks_by_source("doc").await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[1].chunk_index, 1);
        assert_eq!(chunks[0].total_chunks, 2);
        assert_eq!(chunks[0].timestamp, chunks[1].timestamp);
    }

    #[tokio::test]
    async fn delete_by_source_compacts_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let index = test_index(tmp.path()).await;

        index
            .add_chunks(
                vec![embedded("a0", vec![1.0, 0.0]), embedded("a1", vec![1.0, 0.0])],
                "A",
            )
            .await;
        index
            .add_chunks(
                vec![
                    embedded("b0", vec![0.0, 1.0]),
                    embedded("b1", vec![0.0, 1.0]),
                    embedded("b2", vec![0.0, 1.0]),
                ],
                "B",
            )
            .await;

        let removed = index.delete_by_source("A").await;
        assert_eq!(removed, 2);
        assert_eq!(index.stats().await.total_chunks, 3);

        let survivors = index.get_chunks_by_source("B").await;
        let ids: Vec<u64> = survivors.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        let texts: Vec<&str> = survivors.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["b0", "b1", "b2"]);

        assert_eq!(index.delete_by_source("A").await, 0);
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_disk() {
        let tmp = tempfile::tempdir().unwrap();

        {
            let index = test_index(tmp.path()).await;
            index
                .add_chunks(
                    vec![
                        EmbeddedChunk {
                            text: "persisted chunk".to_string(),
                            vector: vec![1.0, 2.0, 2.0],
                            title: Some("Title".to_string()),
                            url: Some("https://example.com".to_string()),
                        },
                        embedded("second chunk", vec![0.0, 1.0, 0.0]),
                    ],
                    "doc",
                )
                .await;
            index.save_to_disk().await.unwrap();
        }

        let reopened = test_index(tmp.path()).await;
        let stats = reopened.stats().await;
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.embedding_dimension, 3);
        assert_eq!(stats.estimated_memory_bytes, 2 * 3 * 4);

        let chunk = reopened.get_chunk(0).await.unwrap();
        assert_eq!(chunk.text, "persisted chunk");
        assert_eq!(chunk.source, "doc");
        assert_eq!(chunk.title.as_deref(), Some("Title"));
        assert_eq!(chunk.url.as_deref(), Some("https://example.com"));
        assert_eq!(chunk.total_chunks, 2);

        // persisted vectors are already unit length
        let results = reopened.search(&[1.0, 2.0, 2.0], 1, 0.0).await;
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn malformed_snapshot_loads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(FileDocumentStore::new(tmp.path(), "vector_index"));
        store.write(METADATA_KEY, b"not json at all").await.unwrap();
        store.write(DATA_KEY, b"{}").await.unwrap();

        let index = VectorIndex::open(store).await;
        assert_eq!(index.stats().await.total_chunks, 0);
    }

    #[tokio::test]
    async fn clear_removes_memory_and_disk_state() {
        let tmp = tempfile::tempdir().unwrap();
        let index = test_index(tmp.path()).await;

        index
            .add_chunk("chunk", vec![1.0, 0.0], "s", None, None)
            .await;
        index.save_to_disk().await.unwrap();

        index.clear().await;
        assert_eq!(index.stats().await.total_chunks, 0);

        let reopened = test_index(tmp.path()).await;
        assert_eq!(reopened.stats().await.total_chunks, 0);
    }

    #[tokio::test]
    async fn sources_are_summarized_in_first_seen_order() {
        let tmp = tempfile::tempdir().unwrap();
        let index = test_index(tmp.path()).await;

        index
            .add_chunks(
                vec![
                    EmbeddedChunk {
                        text: "alpha beta".to_string(),
                        vector: vec![1.0, 0.0],
                        title: Some("First".to_string()),
                        url: None,
                    },
                    embedded("gamma", vec![0.0, 1.0]),
                ],
                "A",
            )
            .await;
        index
            .add_chunks(vec![embedded("delta epsilon zeta", vec![1.0, 1.0])], "B")
            .await;

        let sources = index.get_sources().await;
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].id, "A");
        assert_eq!(sources[0].chunks_count, 2);
        assert_eq!(sources[0].word_count, 3);
        assert_eq!(sources[0].title.as_deref(), Some("First"));
        assert_eq!(sources[1].id, "B");
        assert_eq!(sources[1].word_count, 3);
    }

    #[tokio::test]
    async fn stored_vectors_stay_unit_length_after_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let index = test_index(tmp.path()).await;
            index
                .add_chunk("chunk", vec![5.0, 0.0, 12.0], "s", None, None)
                .await;
            index.save_to_disk().await.unwrap();
        }

        let store = Arc::new(FileDocumentStore::new(tmp.path(), "vector_index"));
        let bytes = store.read(DATA_KEY).await.unwrap().unwrap();
        let data: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let vector: Vec<f32> = data["vectors"][0]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap() as f32)
            .collect();
        assert!((l2_norm(&vector) - 1.0).abs() < 1e-5);
    }
}
