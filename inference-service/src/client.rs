//! HTTP client for the Ollama API.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::InferenceConfig;

/// Errors produced by [`OllamaClient`].
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Invalid endpoint (empty or missing http/https).
    #[error("invalid inference endpoint: {0}")]
    InvalidEndpoint(String),

    /// Transport/HTTP client error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-successful HTTP status from upstream.
    #[error("unexpected HTTP status {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body.
        snippet: String,
    },

    /// Unexpected/invalid JSON response.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Result alias for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;

/// Thin client for one Ollama model profile.
///
/// Reuses an HTTP client with a configurable timeout. Provides:
/// - [`OllamaClient::generate`]   — non-streaming text generation
/// - [`OllamaClient::embeddings`] — embedding retrieval
pub struct OllamaClient {
    client: reqwest::Client,
    cfg: InferenceConfig,
    url_generate: String,
    url_embeddings: String,
}

impl OllamaClient {
    /// Creates a new client from the given profile.
    ///
    /// # Errors
    /// - [`InferenceError::InvalidEndpoint`] if `cfg.endpoint` is invalid
    /// - [`InferenceError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: InferenceConfig) -> Result<Self> {
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(InferenceError::InvalidEndpoint(cfg.endpoint));
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_generate = format!("{}/api/generate", base);
        let url_embeddings = format!("{}/api/embeddings", base);

        Ok(Self {
            client,
            cfg,
            url_generate,
            url_embeddings,
        })
    }

    /// Model identifier of this profile.
    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    /// Performs a **non-streaming** generation request via `/api/generate`.
    ///
    /// # Errors
    /// - [`InferenceError::HttpStatus`] for non-2xx responses
    /// - [`InferenceError::Transport`] for client errors
    /// - [`InferenceError::Decode`] if the response cannot be parsed
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            model: &self.cfg.model,
            prompt,
            stream: false,
        };

        debug!("POST {}", self.url_generate);
        let resp = self
            .client
            .post(&self.url_generate)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(http_status_error(resp, &self.url_generate).await);
        }

        let out: GenerateResponse = resp.json().await.map_err(|e| {
            InferenceError::Decode(format!("serde error: {e}; ensure `stream=false` is used"))
        })?;

        Ok(out.response)
    }

    /// Retrieves an embedding via `/api/embeddings`.
    ///
    /// # Errors
    /// - [`InferenceError::HttpStatus`] for non-2xx responses
    /// - [`InferenceError::Transport`] for client errors
    /// - [`InferenceError::Decode`] if the response cannot be parsed
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, prompt: &str) -> Result<Vec<f32>> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            prompt,
        };

        debug!("POST {}", self.url_embeddings);
        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(http_status_error(resp, &self.url_embeddings).await);
        }

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            InferenceError::Decode(format!("serde error: {e}; expected `{{ embedding: number[] }}`"))
        })?;

        Ok(out.embedding)
    }
}

/// Drains a failed response into an [`InferenceError::HttpStatus`].
async fn http_status_error(resp: reqwest::Response, url: &str) -> InferenceError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let snippet = text.chars().take(240).collect::<String>();
    InferenceError::HttpStatus {
        status,
        url: url.to_string(),
        snippet,
    }
}

/* ==========================
HTTP payloads
========================== */

/// Request body for `/api/generate` (non-streaming).
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body for `/api/generate`.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Request body for `/api/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response body for `/api/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InferenceConfig;

    #[test]
    fn rejects_invalid_endpoint() {
        let cfg = InferenceConfig::new("llama3:8b", "localhost:11434");
        assert!(matches!(
            OllamaClient::new(cfg),
            Err(InferenceError::InvalidEndpoint(_))
        ));

        let cfg = InferenceConfig::new("llama3:8b", "   ");
        assert!(OllamaClient::new(cfg).is_err());
    }

    #[test]
    fn builds_endpoint_urls_without_double_slash() {
        let cfg = InferenceConfig::new("nomic-embed-text", "http://localhost:11434/");
        let client = OllamaClient::new(cfg).unwrap();
        assert_eq!(client.url_generate, "http://localhost:11434/api/generate");
        assert_eq!(
            client.url_embeddings,
            "http://localhost:11434/api/embeddings"
        );
    }

    #[test]
    fn generate_request_wire_shape() {
        let body = GenerateRequest {
            model: "llama3:8b",
            prompt: "hello",
            stream: false,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["model"], "llama3:8b");
        assert_eq!(v["prompt"], "hello");
        assert_eq!(v["stream"], false);
    }

    #[test]
    fn embeddings_request_uses_prompt_field() {
        let body = EmbeddingsRequest {
            model: "nomic-embed-text",
            prompt: "some text",
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["model"], "nomic-embed-text");
        assert_eq!(v["prompt"], "some text");
    }
}
