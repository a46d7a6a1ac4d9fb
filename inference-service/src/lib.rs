//! Thin async client for a local Ollama-compatible inference server.
//!
//! Two endpoints are wrapped:
//! - `POST {endpoint}/api/generate`   — non-streaming text generation (`stream=false`)
//! - `POST {endpoint}/api/embeddings` — embedding retrieval
//!
//! Construct one [`OllamaClient`] per model profile (e.g. one for the
//! generation model, one for the embedding model) and share it via `Arc`.

mod client;
mod config;

pub use client::{InferenceError, OllamaClient};
pub use config::InferenceConfig;
