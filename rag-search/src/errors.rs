//! Unified error types for the crate.

use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error for rag-search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Embedding call failed or timed out. Fatal to the current answer/sync call.
    #[error("embedding unavailable: {reason}")]
    EmbeddingUnavailable { reason: String },

    /// Question interpretation failed (inference call error or no parseable JSON).
    /// Recovered by the query executor with an unconstrained intent.
    #[error("question interpretation failed: {0}")]
    Interpretation(String),

    /// The search engine rejected a request.
    #[error("search backend error: HTTP {status}: {snippet}")]
    Backend {
        /// HTTP status returned by the engine.
        status: StatusCode,
        /// Short snippet of the engine's diagnostic body.
        snippet: String,
    },

    /// The search engine is unreachable.
    #[error("search backend transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Mismatch between a returned embedding and the configured dimension.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// The database collaborator failed to supply a service batch.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),
}
