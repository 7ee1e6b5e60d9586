use thiserror::Error;

/// Failure taxonomy of the RAG engine.
///
/// Missing persisted documents are deliberately not represented here: stores
/// return `Ok(None)` for an absent key and the index starts empty. Ingestion
/// failures surface through the `Error` state of the indexing job, never as
/// an `Err` crossing the pipeline boundary.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("embedding provider error: {0}")]
    Provider(String),
    #[error("extraction error: {0}")]
    Extraction(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl RagError {
    pub fn provider<E: std::fmt::Display>(err: E) -> Self {
        RagError::Provider(err.to_string())
    }

    pub fn extraction<E: std::fmt::Display>(err: E) -> Self {
        RagError::Extraction(err.to_string())
    }

    pub fn persistence<E: std::fmt::Display>(err: E) -> Self {
        RagError::Persistence(err.to_string())
    }
}
