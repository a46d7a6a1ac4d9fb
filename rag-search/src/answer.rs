//! Query execution: interpret → build → search → threshold → shape.

use serde::Serialize;
use tracing::warn;

use crate::config::SearchConfig;
use crate::domain::GeoPoint;
use crate::embed::EmbeddingProvider;
use crate::errors::SearchError;
use crate::index::{SearchHit, SearchIndexClient};
use crate::intent::QuestionIntent;
use crate::interpreter::IntentInterpreter;
use crate::query::build_query;

/// Score reported for hits the engine returned without `_score`
/// (explicit-sort queries suppress relevance scoring).
const UNSCORED_SCORE: f32 = 100.0;

/// Content of the synthetic answer returned when nothing survives the
/// relevance threshold.
const NO_MATCH_CONTENT: &str = "No relevant service found.";

/// One ranked answer item. `service_id` is `None` only for the synthetic
/// no-match item; callers always receive at least one item.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RagAnswer {
    pub service_id: Option<String>,
    pub content: String,
    pub score: f32,
}

/// Runs the full read path for one question.
///
/// Interpretation failures degrade to an unconstrained intent; embedding and
/// backend failures are fatal to the call.
pub(crate) async fn run(
    cfg: &SearchConfig,
    index: &SearchIndexClient,
    embedder: &dyn EmbeddingProvider,
    interpreter: &dyn IntentInterpreter,
    question: &str,
    user_point: Option<GeoPoint>,
) -> Result<Vec<RagAnswer>, SearchError> {
    let intent = resolve_intent(interpreter, question).await;
    let vector = embedder.embed(question).await?;
    let query = build_query(vector, &intent, user_point, cfg.knn_k);
    let hits = index.search(&query.to_body()).await?;
    Ok(shape_answers(hits, cfg.relevance_threshold))
}

/// Interprets the question, falling back to the unconstrained intent when
/// the interpretation model is unavailable or returns garbage. The failure
/// is logged, never surfaced to the caller.
pub(crate) async fn resolve_intent(
    interpreter: &dyn IntentInterpreter,
    question: &str,
) -> QuestionIntent {
    match interpreter.interpret(question).await {
        Ok(intent) => intent,
        Err(err) => {
            warn!(error = %err, "question interpretation failed; continuing unconstrained");
            QuestionIntent::default()
        }
    }
}

/// Drops hits scoring below the threshold and shapes the survivors,
/// preserving engine order. Zero survivors become the single synthetic
/// no-match answer.
pub(crate) fn shape_answers(hits: Vec<SearchHit>, threshold: f32) -> Vec<RagAnswer> {
    let mut answers = Vec::with_capacity(hits.len());

    for hit in hits {
        let score = match hit.score {
            Some(s) if s < threshold => continue,
            Some(s) => s,
            None => UNSCORED_SCORE,
        };
        answers.push(RagAnswer {
            service_id: Some(hit.id),
            content: hit.document.content,
            score,
        });
    }

    if answers.is_empty() {
        answers.push(RagAnswer {
            service_id: None,
            content: NO_MATCH_CONTENT.into(),
            score: 0.0,
        });
    }

    answers
}
