//! Thin adapter around the search engine's REST API.
//!
//! This client concentrates all engine interactions behind a minimal API and
//! owns the index mapping. Operations carry no retry policy; every
//! non-success response maps to [`SearchError::Backend`] with the engine's
//! diagnostic and the caller decides what to do with it.

use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::document::SearchDocument;
use crate::errors::SearchError;

/// One search hit in engine order.
///
/// `score` is absent when the engine suppresses `_score` under explicit
/// sorts.
#[derive(Clone, Debug)]
pub struct SearchHit {
    pub id: String,
    pub score: Option<f32>,
    pub document: SearchDocument,
}

/// Index mapping, version 1: knn-enabled settings plus the denormalized
/// service document shape. Schema changes mean a new versioned constant and
/// an explicit recreate + reindex; nothing migrates implicitly.
pub fn rag_mapping_v1(dimension: usize) -> Value {
    json!({
        "settings": { "index": { "knn": true } },
        "mappings": {
            "properties": {
                "content": { "type": "text" },
                "embedding": {
                    "type": "knn_vector",
                    "dimension": dimension,
                    "method": { "name": "hnsw", "space_type": "cosinesimil", "engine": "nmslib" },
                },
                "source": { "type": "keyword" },
                "name": { "type": "text" },
                "point": { "type": "geo_point" },
                "city": { "type": "keyword" },
                "country": { "type": "keyword" },
                "offers": {
                    "type": "nested",
                    "properties": {
                        "base_price": { "type": "float" },
                        "sale": { "type": "integer" },
                        "currency": { "type": "keyword" },
                        "offer_type": { "type": "keyword" },
                        "car_compatibilities": {
                            "type": "nested",
                            "properties": {
                                "car_type": { "type": "keyword" },
                                "car_brand": { "type": "keyword" },
                            },
                        },
                    },
                },
            }
        },
    })
}

/// HTTP client for one index of the search engine.
pub struct SearchIndexClient {
    http: reqwest::Client,
    base: String,
    index: String,
    auth: Option<(String, String)>,
    embedding_dim: usize,
}

impl SearchIndexClient {
    /// Creates a new client from the given configuration.
    ///
    /// # Errors
    /// Returns `SearchError::Config` on invalid configuration and
    /// `SearchError::Transport` if the HTTP client cannot be built.
    pub fn new(cfg: &SearchConfig) -> Result<Self, SearchError> {
        cfg.validate()?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .danger_accept_invalid_certs(cfg.accept_invalid_certs)
            .build()?;

        let auth = match (&cfg.username, &cfg.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };

        Ok(Self {
            http,
            base: cfg.endpoint.trim_end_matches('/').to_string(),
            index: cfg.index.clone(),
            auth,
            embedding_dim: cfg.embedding_dim,
        })
    }

    /// Creates the index with the current mapping version.
    ///
    /// # Errors
    /// Returns `SearchError::Backend` if the engine rejects the request
    /// (e.g. the index already exists).
    pub async fn create_index(&self) -> Result<(), SearchError> {
        info!("Creating index '{}'", self.index);
        let url = format!("{}/{}", self.base, self.index);
        let body = rag_mapping_v1(self.embedding_dim);
        self.send(self.request(Method::PUT, &url).json(&body)).await?;
        Ok(())
    }

    /// Deletes the index and everything in it.
    pub async fn delete_index(&self) -> Result<(), SearchError> {
        info!("Deleting index '{}'", self.index);
        let url = format!("{}/{}", self.base, self.index);
        self.send(self.request(Method::DELETE, &url)).await?;
        Ok(())
    }

    /// Inserts or fully replaces the document stored under `id`.
    /// Idempotent: repeated calls with the same id overwrite, never append.
    pub async fn upsert(&self, id: &str, document: &SearchDocument) -> Result<(), SearchError> {
        debug!("Upserting document '{}' into '{}'", id, self.index);
        let url = format!("{}/{}/_doc/{}", self.base, self.index, id);
        self.send(self.request(Method::PUT, &url).json(document))
            .await?;
        Ok(())
    }

    /// Fetches one document by id; `None` when the engine reports 404.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<SearchDocument>, SearchError> {
        let url = format!("{}/{}/_doc/{}", self.base, self.index, id);
        let resp = self.request(Method::GET, &url).send().await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check_status(resp).await?;

        let envelope: GetDocResponse = resp
            .json()
            .await
            .map_err(SearchError::Transport)?;

        let mut document = envelope.source;
        document.id = envelope.id;
        Ok(Some(document))
    }

    /// Executes a search request body and returns hits in engine order.
    pub async fn search(&self, body: &Value) -> Result<Vec<SearchHit>, SearchError> {
        debug!("Searching index '{}'", self.index);
        let url = format!("{}/{}/_search", self.base, self.index);
        let resp = self
            .send(self.request(Method::POST, &url).json(body))
            .await?;

        let envelope: SearchResponse = resp.json().await.map_err(SearchError::Transport)?;

        let hits = envelope
            .hits
            .hits
            .into_iter()
            .map(|h| {
                let mut document = h.source;
                document.id = h.id.clone();
                SearchHit {
                    id: h.id,
                    score: h.score,
                    document,
                }
            })
            .collect();
        Ok(hits)
    }

    /// Deletes every document while keeping the index and its mapping.
    /// Returns the number of deleted documents.
    pub async fn delete_all_documents(&self) -> Result<u64, SearchError> {
        info!("Wiping all documents from '{}'", self.index);
        let url = format!("{}/{}/_delete_by_query", self.base, self.index);
        let body = json!({ "query": { "match_all": {} } });
        let resp = self
            .send(self.request(Method::POST, &url).json(&body))
            .await?;

        let out: DeleteByQueryResponse = resp.json().await.map_err(SearchError::Transport)?;
        Ok(out.deleted)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, url);
        if let Some((user, pass)) = &self.auth {
            builder = builder.basic_auth(user, Some(pass));
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, SearchError> {
        let resp = builder.send().await?;
        Self::check_status(resp).await
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SearchError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        let snippet = text.chars().take(240).collect::<String>();
        Err(SearchError::Backend { status, snippet })
    }
}

/* ==========================
Response envelopes
========================== */

#[derive(Debug, Deserialize)]
struct GetDocResponse {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: SearchDocument,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct SearchHitsEnvelope {
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score")]
    score: Option<f32>,
    #[serde(rename = "_source")]
    source: SearchDocument,
}

#[derive(Debug, Deserialize)]
struct DeleteByQueryResponse {
    #[serde(default)]
    deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_v1_matches_index_contract() {
        let mapping = rag_mapping_v1(768);

        assert_eq!(mapping["settings"]["index"]["knn"], true);

        let props = &mapping["mappings"]["properties"];
        assert_eq!(props["embedding"]["type"], "knn_vector");
        assert_eq!(props["embedding"]["dimension"], 768);
        assert_eq!(props["embedding"]["method"]["name"], "hnsw");
        assert_eq!(props["embedding"]["method"]["space_type"], "cosinesimil");
        assert_eq!(props["embedding"]["method"]["engine"], "nmslib");
        assert_eq!(props["point"]["type"], "geo_point");
        assert_eq!(props["city"]["type"], "keyword");
        assert_eq!(props["offers"]["type"], "nested");

        let offer_props = &props["offers"]["properties"];
        assert_eq!(offer_props["base_price"]["type"], "float");
        assert_eq!(offer_props["sale"]["type"], "integer");
        assert_eq!(offer_props["car_compatibilities"]["type"], "nested");
        assert_eq!(
            offer_props["car_compatibilities"]["properties"]["car_brand"]["type"],
            "keyword"
        );
    }

    #[test]
    fn search_response_parses_scored_and_unscored_hits() {
        let raw = serde_json::json!({
            "took": 3,
            "hits": {
                "total": { "value": 2 },
                "hits": [
                    {
                        "_id": "svc-1",
                        "_score": 0.91,
                        "_source": {
                            "content": "Service Name: A",
                            "embedding": [0.0, 0.1],
                            "source": "POSTGRESQL",
                            "name": "A",
                            "point": { "lat": 48.1, "lon": 17.1 },
                            "city": "Bratislava",
                            "country": "SLOVAKIA",
                            "offers": []
                        }
                    },
                    {
                        "_id": "svc-2",
                        "_score": null,
                        "_source": {
                            "content": "Service Name: B",
                            "embedding": [0.2, 0.3],
                            "source": "POSTGRESQL",
                            "name": "B",
                            "point": { "lat": 50.0, "lon": 14.4 },
                            "city": "Praha",
                            "country": "CZECHIA",
                            "offers": []
                        }
                    }
                ]
            }
        });

        let envelope: SearchResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.hits.hits.len(), 2);
        assert_eq!(envelope.hits.hits[0].score, Some(0.91));
        assert_eq!(envelope.hits.hits[1].score, None);
        assert_eq!(envelope.hits.hits[1].id, "svc-2");
    }
}
