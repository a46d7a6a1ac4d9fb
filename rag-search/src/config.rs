//! Runtime and index configuration.

use crate::errors::SearchError;

/// Configuration for the search engine connection and query policy.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Search engine HTTP endpoint, e.g. `https://localhost:9200`.
    pub endpoint: String,
    /// Optional basic-auth credentials.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Target index name.
    pub index: String,
    /// Accept self-signed certificates (dev clusters).
    pub accept_invalid_certs: bool,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Embedding dimensionality expected by the index mapping.
    pub embedding_dim: usize,
    /// Nearest-neighbor count requested by the vector clause.
    pub knn_k: u32,
    /// Minimum relevance score for a hit to be returned.
    pub relevance_threshold: f32,
    /// Page size used when reindexing the whole catalog.
    pub reindex_batch: usize,
    /// Concurrent document builds during reindexing.
    pub sync_concurrency: usize,
}

impl SearchConfig {
    /// Creates a sane default config for a given index name and engine endpoint.
    pub fn new_default(endpoint: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: None,
            password: None,
            index: index.into(),
            accept_invalid_certs: false,
            timeout_secs: 30,
            embedding_dim: 768,
            knn_k: 30,
            relevance_threshold: 0.70,
            reindex_batch: 100,
            sync_concurrency: 4,
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.endpoint.trim().is_empty() {
            return Err(SearchError::Config("endpoint is empty".into()));
        }
        if self.index.trim().is_empty() {
            return Err(SearchError::Config("index is empty".into()));
        }
        if self.embedding_dim == 0 {
            return Err(SearchError::Config("embedding_dim must be > 0".into()));
        }
        if self.knn_k == 0 {
            return Err(SearchError::Config("knn_k must be > 0".into()));
        }
        if self.reindex_batch == 0 {
            return Err(SearchError::Config("reindex_batch must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.relevance_threshold) {
            return Err(SearchError::Config(
                "relevance_threshold must be within [0.0, 1.0]".into(),
            ));
        }
        Ok(())
    }
}
