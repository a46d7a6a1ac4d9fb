//! Embedding provider seam.
//!
//! Async is required because real providers perform HTTP requests; the trait
//! is object-safe so tests can substitute deterministic fakes.

use std::sync::Arc;
use std::{future::Future, pin::Pin};

use inference_service::OllamaClient;

use crate::errors::SearchError;

/// Provider interface for embedding generation.
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds the given text into a fixed-dimension vector.
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, SearchError>> + Send + 'a>>;
}

/// Ollama-backed embedding provider.
///
/// Trims the input before submission and validates the returned dimension
/// against the index mapping. Failures surface as
/// [`SearchError::EmbeddingUnavailable`] — never a zero vector or a stale
/// fallback, which would corrupt ranking.
#[derive(Clone)]
pub struct OllamaEmbedder {
    svc: Arc<OllamaClient>,
    dim: usize,
}

impl OllamaEmbedder {
    /// Wraps an embedding-model client with the expected dimension.
    pub fn new(svc: Arc<OllamaClient>, dim: usize) -> Self {
        Self { svc, dim }
    }
}

impl EmbeddingProvider for OllamaEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, SearchError>> + Send + 'a>> {
        Box::pin(async move {
            let vector = self.svc.embeddings(text.trim()).await.map_err(|e| {
                SearchError::EmbeddingUnavailable {
                    reason: e.to_string(),
                }
            })?;

            if vector.len() != self.dim {
                return Err(SearchError::VectorSizeMismatch {
                    got: vector.len(),
                    want: self.dim,
                });
            }

            Ok(vector)
        })
    }
}
