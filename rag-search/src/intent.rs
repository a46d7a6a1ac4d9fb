//! Structured intent extracted from a free-text question.
//!
//! Decoding is deliberately lenient: the interpretation model is best-effort
//! natural language, so an absent field, a wrong-typed value, or a token
//! outside its closed vocabulary degrades to `None` instead of failing the
//! whole parse.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{Country, Currency, OfferType, QueryFunction};

/// Per-question constraints. All fields optional; absence means
/// "unconstrained". Created fresh per question, never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuestionIntent {
    pub country: Option<Country>,
    pub city: Option<String>,
    pub offer_type: Option<OfferType>,
    pub func: Option<QueryFunction>,
    pub max_price: Option<f64>,
    pub max_distance: Option<f64>,
    pub currency: Option<Currency>,
}

impl QuestionIntent {
    /// Decodes an intent from the interpretation model's JSON object.
    ///
    /// Every field decodes independently; unknown keys are ignored and a
    /// non-object input yields the unconstrained default.
    pub fn from_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            country: enum_field(obj, "country"),
            city: obj
                .get("city")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            offer_type: enum_field(obj, "offer_type"),
            func: enum_field(obj, "func"),
            max_price: number_field(obj, "max_price"),
            max_distance: number_field(obj, "max_distance"),
            currency: enum_field(obj, "currency"),
        }
    }

    /// True when no structured constraint was extracted.
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }
}

/// Decodes one closed-vocabulary field; anything outside the enum set is `None`.
fn enum_field<T: DeserializeOwned>(obj: &serde_json::Map<String, Value>, key: &str) -> Option<T> {
    obj.get(key)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// Decodes one numeric field; non-numbers (including numeric strings) are `None`.
fn number_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}
