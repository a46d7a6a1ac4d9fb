//! Question interpretation: free text → structured [`QuestionIntent`].

use std::sync::Arc;
use std::{future::Future, pin::Pin};

use inference_service::OllamaClient;
use tracing::debug;

use crate::errors::SearchError;
use crate::intent::QuestionIntent;

/// Instruction template sent to the interpretation model. Demands strict
/// JSON with the marketplace's closed vocabularies.
const EXTRACTION_PROMPT: &str = r#"
You are an information extraction engine.

Your task is to extract structured data from a user question
about car services.

Return ONLY valid JSON.
Do NOT include explanations, comments, or extra text.
If a field is not mentioned, use null.

Fields:
- country (string or null)
- city (string or null)
- offer_type
- func (INFO | CHEAPEST | MOST_EXPENSIVE | COMPARE | MAX_DISTANCE | AVAILABILITY)
- max_price (number or null)
- max_distance (number in kilometers or null)
- currency (string or null)

Rules:
- Infer intent from words like "cheapest", "most expensive", "compare", "max_distance"
- If location is a country only, leave city as null
- Use diacritics where appropriate for city names, for example "Košice" instead of "Kosice"
- Normalize values to the following enums.

Country:
- SLOVAKIA
- CZECHIA
- AUSTRIA
- POLAND
- HUNGARY

Currency:
- EUR
- USD
- CZK
- PLN
- GBP
- HUF

OfferType (choose the closest match):
- MAINTENANCE
- REPAIR
- DIAGNOSTICS
- ENGINE_REPAIR
- TRANSMISSION_REPAIR
- CLUTCH_REPAIR
- TIMING_BELT_REPLACEMENT
- BRAKE_SERVICE
- SUSPENSION_REPAIR
- STEERING_REPAIR
- ELECTRICAL
- BATTERY_SERVICE
- ALTERNATOR_REPAIR
- STARTER_REPAIR
- LIGHTING_REPAIR
- ECU_PROGRAMMING
- OIL_CHANGE
- FILTER_REPLACEMENT
- COOLANT_SERVICE
- BRAKE_FLUID_SERVICE
- TRANSMISSION_FLUID_SERVICE
- TIRE_CHANGE
- TIRE_BALANCING
- WHEEL_ALIGNMENT
- PUNCTURE_REPAIR
- EXHAUST_REPAIR
- EMISSIONS_SERVICE
- CATALYTIC_CONVERTER_REPAIR
- AC_SERVICE
- AC_REPAIR
- HEATING_REPAIR
- BODY_WORK
- PAINTING
- DENT_REMOVAL
- INTERIOR_REPAIR
- UPHOLSTERY_REPAIR
- WINDOW_MECHANISM_REPAIR
- PRE_PURCHASE_INSPECTION
- SAFETY_INSPECTION
- CAR_WASH
- DETAILING
- TOWING

If no suitable value exists, use null."#;

/// Interpreter interface, object-safe for injection.
pub trait IntentInterpreter: Send + Sync {
    /// Extracts structured intent from a free-text question.
    ///
    /// Fails with [`SearchError::Interpretation`] when the inference call
    /// errors or the response carries no parseable JSON object; callers
    /// recover with an unconstrained intent.
    fn interpret<'a>(
        &'a self,
        question: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<QuestionIntent, SearchError>> + Send + 'a>>;
}

/// LLM-backed interpreter over a local inference server.
#[derive(Clone)]
pub struct LlmIntentInterpreter {
    svc: Arc<OllamaClient>,
}

impl LlmIntentInterpreter {
    /// Wraps a generation-model client.
    pub fn new(svc: Arc<OllamaClient>) -> Self {
        Self { svc }
    }
}

impl IntentInterpreter for LlmIntentInterpreter {
    fn interpret<'a>(
        &'a self,
        question: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<QuestionIntent, SearchError>> + Send + 'a>> {
        Box::pin(async move {
            let prompt = format!("{EXTRACTION_PROMPT}\nQuestion: {question}");

            let response = self
                .svc
                .generate(&prompt)
                .await
                .map_err(|e| SearchError::Interpretation(e.to_string()))?;

            let raw = extract_json_object(&response).ok_or_else(|| {
                SearchError::Interpretation(format!(
                    "no JSON object in model response: {}",
                    response.chars().take(120).collect::<String>()
                ))
            })?;

            let value: serde_json::Value = serde_json::from_str(raw)
                .map_err(|e| SearchError::Interpretation(format!("invalid JSON: {e}")))?;

            let intent = QuestionIntent::from_json(&value);
            debug!(?intent, "interpreted question");
            Ok(intent)
        })
    }
}

/// Isolates the first balanced `{...}` object in the model's response.
/// Models occasionally wrap the JSON in prose despite the instruction.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OfferType, QueryFunction};

    #[test]
    fn extracts_bare_json_object() {
        let raw = r#"{"city": "Bratislava", "func": "CHEAPEST"}"#;
        assert_eq!(extract_json_object(raw), Some(raw));
    }

    #[test]
    fn extracts_object_wrapped_in_prose() {
        let raw = "Sure! Here is the data:\n{\"offer_type\": \"OIL_CHANGE\"}\nHope it helps.";
        let intent =
            QuestionIntent::from_json(&serde_json::from_str(extract_json_object(raw).unwrap()).unwrap());
        assert_eq!(intent.offer_type, Some(OfferType::OilChange));
    }

    #[test]
    fn handles_braces_inside_strings() {
        let raw = r#"{"city": "Brati{slava}", "func": "INFO"}"#;
        let intent =
            QuestionIntent::from_json(&serde_json::from_str(extract_json_object(raw).unwrap()).unwrap());
        assert_eq!(intent.city.as_deref(), Some("Brati{slava}"));
        assert_eq!(intent.func, Some(QueryFunction::Info));
    }

    #[test]
    fn no_object_yields_none() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("{unbalanced"), None);
    }

    #[test]
    fn prompt_carries_closed_vocabularies() {
        for token in ["SLOVAKIA", "OIL_CHANGE", "MAX_DISTANCE", "HUF", "TOWING"] {
            assert!(EXTRACTION_PROMPT.contains(token), "missing {token}");
        }
    }
}
