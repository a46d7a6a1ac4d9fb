//! Client configuration.

/// Configuration for one inference model profile.
///
/// A profile binds a model identifier to an endpoint and a request timeout.
/// Applications typically hold two of these: a generation profile and an
/// embedding profile pointing at the same local server.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Model identifier string (e.g. `"llama3:8b"`, `"nomic-embed-text"`).
    pub model: String,

    /// Server base URL (e.g. `http://localhost:11434`).
    pub endpoint: String,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl InferenceConfig {
    /// Creates a profile with the default timeout.
    pub fn new(model: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            endpoint: endpoint.into(),
            timeout_secs: None,
        }
    }
}
