//! Hybrid search core for a car-service marketplace.
//!
//! This crate provides a clean API to:
//! - Keep a denormalized search index consistent with relational
//!   service/offer/compatibility entities (write path)
//! - Answer free-text questions with a hybrid vector+attribute query,
//!   thresholded by relevance (read path)
//!
//! The design is flat (no deep nesting) and splits responsibilities into
//! focused modules. External inference calls are injected behind the
//! [`EmbeddingProvider`] and [`IntentInterpreter`] traits so tests can
//! substitute deterministic fakes.

mod answer;
mod config;
mod document;
mod domain;
mod embed;
mod errors;
mod index;
mod intent;
mod interpreter;
mod query;
mod sync;

pub use answer::RagAnswer;
pub use config::SearchConfig;
pub use document::{CarCompatibilityDoc, DocumentSource, OfferDoc, SearchDocument};
pub use domain::{
    CarBrand, CarCompatibilityRecord, CarType, Country, Currency, GeoPoint, OfferRecord,
    OfferType, QueryFunction, ServiceGraph, ServiceRecord,
};
pub use embed::{EmbeddingProvider, OllamaEmbedder};
pub use errors::SearchError;
pub use index::{SearchHit, SearchIndexClient, rag_mapping_v1};
pub use intent::QuestionIntent;
pub use interpreter::{IntentInterpreter, LlmIntentInterpreter};
pub use query::{FilterClause, HybridQuery, KnnClause, SortSpec, build_query, clean_json};
pub use sync::{ServiceCatalog, build_document, render_content};

use std::sync::Arc;

use tracing::trace;

/// High-level facade wiring configuration, the index client, and the
/// injected inference providers.
///
/// This is the single entry point recommended for application code. Each
/// call is independent and stateless beyond its own local objects, so one
/// engine instance serves concurrent questions without locking.
pub struct SearchEngine {
    cfg: SearchConfig,
    index: SearchIndexClient,
    embedder: Arc<dyn EmbeddingProvider>,
    interpreter: Arc<dyn IntentInterpreter>,
}

impl SearchEngine {
    /// Constructs a new engine from the given configuration and providers.
    ///
    /// # Errors
    /// Returns `SearchError::Config` if the configuration is invalid.
    pub fn new(
        cfg: SearchConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        interpreter: Arc<dyn IntentInterpreter>,
    ) -> Result<Self, SearchError> {
        trace!("SearchEngine::new index={}", cfg.index);
        let index = SearchIndexClient::new(&cfg)?;
        Ok(Self {
            cfg,
            index,
            embedder,
            interpreter,
        })
    }

    /// Answers a free-text question with a ranked list of services.
    ///
    /// Interpretation failures degrade to broader, less filtered results;
    /// the returned list always contains at least one item (a synthetic
    /// no-match answer when nothing is relevant).
    ///
    /// # Errors
    /// Returns embedding or backend failures; these surface to the caller
    /// as a generic search-unavailable condition.
    pub async fn answer(
        &self,
        question: &str,
        user_point: Option<GeoPoint>,
    ) -> Result<Vec<RagAnswer>, SearchError> {
        trace!("SearchEngine::answer");
        answer::run(
            &self.cfg,
            &self.index,
            self.embedder.as_ref(),
            self.interpreter.as_ref(),
            question,
            user_point,
        )
        .await
    }

    /// Rebuilds and upserts one service's document from its complete
    /// current relational state.
    ///
    /// # Errors
    /// Returns embedding or backend failures.
    pub async fn sync(&self, graph: &ServiceGraph) -> Result<(), SearchError> {
        trace!("SearchEngine::sync id={}", graph.service.id);
        sync::sync(&self.index, self.embedder.as_ref(), graph).await
    }

    /// Pages the whole catalog and syncs every service. Returns the number
    /// of synced services.
    ///
    /// # Errors
    /// Fails fast on the first catalog, embedding, or backend error.
    pub async fn reindex_all(&self, catalog: &dyn ServiceCatalog) -> Result<u64, SearchError> {
        trace!("SearchEngine::reindex_all");
        sync::reindex_all(&self.cfg, &self.index, self.embedder.as_ref(), catalog).await
    }

    /// Creates the index with the current mapping version.
    pub async fn create_index(&self) -> Result<(), SearchError> {
        self.index.create_index().await
    }

    /// Deletes the index and everything in it.
    pub async fn delete_index(&self) -> Result<(), SearchError> {
        self.index.delete_index().await
    }

    /// Deletes every document while keeping the index mapping. Returns the
    /// number of deleted documents.
    pub async fn wipe(&self) -> Result<u64, SearchError> {
        self.index.delete_all_documents().await
    }

    /// Fetches one stored document by service id.
    pub async fn get_document(&self, id: &str) -> Result<Option<SearchDocument>, SearchError> {
        self.index.get_by_id(id).await
    }
}
