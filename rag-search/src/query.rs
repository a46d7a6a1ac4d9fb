//! Hybrid query construction: a required vector-similarity clause plus
//! conditional structured filters and sorts derived from question intent.
//!
//! Clauses are modeled as a typed tree and serialized in one explicit step;
//! empty values are stripped recursively so an absent clause is omitted
//! rather than sent as an empty object (an empty filter would be read by the
//! engine as "match nothing" or "match everything" depending on clause type).

use serde_json::{Value, json};

use crate::domain::{GeoPoint, OfferType, QueryFunction};
use crate::intent::QuestionIntent;

/// The required k-NN clause over the `embedding` field.
#[derive(Clone, Debug)]
pub struct KnnClause {
    pub vector: Vec<f32>,
    pub k: u32,
}

/// One structured filter clause.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterClause {
    /// Exact keyword match on a top-level field.
    Term { field: &'static str, value: String },
    /// Bounds results to a radius around the user's location.
    GeoDistance { distance_km: f64, point: GeoPoint },
    /// Matches offer sub-documents; category and price ceiling compose into
    /// a single compound condition on the same nested scope.
    NestedOffers {
        offer_type: Option<OfferType>,
        max_price: Option<f64>,
    },
}

/// One sort clause.
#[derive(Clone, Debug, PartialEq)]
pub enum SortSpec {
    /// Minimum matching offer price, ascending, optionally scoped to a category.
    MinOfferPrice { offer_type: Option<OfferType> },
    /// Geographic distance from the user's location, ascending.
    GeoDistance { point: GeoPoint },
}

/// A fully composed hybrid query, built fresh per question.
#[derive(Clone, Debug)]
pub struct HybridQuery {
    pub knn: KnnClause,
    pub filters: Vec<FilterClause>,
    pub sorts: Vec<SortSpec>,
}

impl HybridQuery {
    /// Serializes the query into the engine's request body, stripping every
    /// empty value so omitted clauses never appear as empty objects.
    pub fn to_body(&self) -> Value {
        let filters: Vec<Value> = self.filters.iter().map(filter_to_json).collect();
        let sorts: Vec<Value> = self.sorts.iter().map(sort_to_json).collect();

        let raw = json!({
            "query": {
                "bool": {
                    "must": [{
                        "knn": {
                            "embedding": {
                                "vector": self.knn.vector,
                                "k": self.knn.k,
                            }
                        }
                    }],
                    "filter": filters,
                }
            },
            "sort": sorts,
        });

        clean_json(raw)
    }
}

/// Composes a hybrid query from the question's embedding and its intent.
///
/// The vector clause is unconditional; every other clause is added only when
/// the intent constrains it:
/// - geo-distance filter when a distance ceiling is set, the function is
///   `MAX_DISTANCE`, and the user's location is known,
/// - term filters for country and city,
/// - one compound nested filter when a category and/or price ceiling is set,
/// - a min-price sort for `CHEAPEST` (scoped to the category when present),
/// - a geo-distance sort for `MAX_DISTANCE` with a known location.
pub fn build_query(
    vector: Vec<f32>,
    intent: &QuestionIntent,
    user_point: Option<GeoPoint>,
    k: u32,
) -> HybridQuery {
    let mut filters = Vec::new();
    let mut sorts = Vec::new();

    if let (Some(distance_km), Some(QueryFunction::MaxDistance), Some(point)) =
        (intent.max_distance, intent.func, user_point)
    {
        filters.push(FilterClause::GeoDistance { distance_km, point });
    }

    if let Some(country) = intent.country {
        filters.push(FilterClause::Term {
            field: "country",
            value: country.as_str().to_string(),
        });
    }

    if let Some(city) = &intent.city {
        filters.push(FilterClause::Term {
            field: "city",
            value: city.clone(),
        });
    }

    if intent.offer_type.is_some() || intent.max_price.is_some() {
        filters.push(FilterClause::NestedOffers {
            offer_type: intent.offer_type,
            max_price: intent.max_price,
        });
    }

    if intent.func == Some(QueryFunction::Cheapest) {
        sorts.push(SortSpec::MinOfferPrice {
            offer_type: intent.offer_type,
        });
    }

    if intent.func == Some(QueryFunction::MaxDistance) {
        if let Some(point) = user_point {
            sorts.push(SortSpec::GeoDistance { point });
        }
    }

    HybridQuery {
        knn: KnnClause { vector, k },
        filters,
        sorts,
    }
}

fn filter_to_json(clause: &FilterClause) -> Value {
    match clause {
        FilterClause::Term { field, value } => json!({ "term": { (*field): value } }),
        FilterClause::GeoDistance { distance_km, point } => json!({
            "geo_distance": {
                "distance": format!("{distance_km}km"),
                "point": { "lat": point.lat, "lon": point.lon },
            }
        }),
        FilterClause::NestedOffers {
            offer_type,
            max_price,
        } => {
            let mut conditions = Vec::new();
            if let Some(ot) = offer_type {
                conditions.push(json!({ "term": { "offers.offer_type": ot.as_str() } }));
            }
            if let Some(price) = max_price {
                conditions.push(json!({ "range": { "offers.base_price": { "lte": price } } }));
            }
            json!({
                "nested": {
                    "path": "offers",
                    "query": { "bool": { "filter": conditions } },
                }
            })
        }
    }
}

fn sort_to_json(sort: &SortSpec) -> Value {
    match sort {
        SortSpec::MinOfferPrice { offer_type } => json!({
            "offers.base_price": {
                "order": "asc",
                "mode": "min",
                "nested": {
                    "path": "offers",
                    "filter": offer_type
                        .map(|ot| json!({ "term": { "offers.offer_type": ot.as_str() } }))
                        .unwrap_or(Value::Null),
                },
            }
        }),
        SortSpec::GeoDistance { point } => json!({
            "_geo_distance": {
                "point": { "lat": point.lat, "lon": point.lon },
                "order": "asc",
                "unit": "km",
                "mode": "min",
                "distance_type": "arc",
            }
        }),
    }
}

/// Recursively strips empty values (`null`, `""`, `[]`, `{}`) from a JSON
/// tree. Applying it twice yields the same result as once.
pub fn clean_json(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter_map(|(k, v)| {
                    let cleaned = clean_json(v);
                    (!is_empty(&cleaned)).then_some((k, cleaned))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(clean_json)
                .filter(|v| !is_empty(v))
                .collect(),
        ),
        other => other,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Country;
    use serde_json::json;

    fn knn_only_body(intent: &QuestionIntent, user_point: Option<GeoPoint>) -> Value {
        build_query(vec![0.1, 0.2, 0.3], intent, user_point, 30).to_body()
    }

    fn filter_array(body: &Value) -> Vec<Value> {
        body["query"]["bool"]["filter"]
            .as_array()
            .cloned()
            .unwrap_or_default()
    }

    #[test]
    fn unconstrained_intent_yields_single_knn_clause() {
        let body = knn_only_body(&QuestionIntent::default(), None);

        let must = body["query"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 1);
        assert_eq!(must[0]["knn"]["embedding"]["k"], 30);
        assert_eq!(
            must[0]["knn"]["embedding"]["vector"].as_array().unwrap().len(),
            3
        );

        // Empty filter and sort arrays must be stripped, not serialized.
        assert!(body["query"]["bool"].get("filter").is_none());
        assert!(body.get("sort").is_none());
    }

    #[test]
    fn country_intent_yields_exactly_one_term_filter() {
        let intent = QuestionIntent {
            country: Some(Country::Slovakia),
            ..Default::default()
        };
        let body = knn_only_body(&intent, None);

        let filters = filter_array(&body);
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0], json!({ "term": { "country": "SLOVAKIA" } }));
    }

    #[test]
    fn category_and_price_compose_into_one_nested_filter() {
        let intent = QuestionIntent {
            offer_type: Some(OfferType::OilChange),
            max_price: Some(100.0),
            ..Default::default()
        };
        let body = knn_only_body(&intent, None);

        let filters = filter_array(&body);
        assert_eq!(filters.len(), 1);
        let nested = &filters[0]["nested"];
        assert_eq!(nested["path"], "offers");
        let conditions = nested["query"]["bool"]["filter"].as_array().unwrap();
        assert_eq!(conditions.len(), 2);
        assert_eq!(
            conditions[0],
            json!({ "term": { "offers.offer_type": "OIL_CHANGE" } })
        );
        assert_eq!(
            conditions[1],
            json!({ "range": { "offers.base_price": { "lte": 100.0 } } })
        );
    }

    #[test]
    fn price_only_nested_filter_has_single_range_condition() {
        let intent = QuestionIntent {
            max_price: Some(80.0),
            ..Default::default()
        };
        let body = knn_only_body(&intent, None);

        let filters = filter_array(&body);
        assert_eq!(filters.len(), 1);
        let conditions = filters[0]["nested"]["query"]["bool"]["filter"]
            .as_array()
            .unwrap();
        assert_eq!(conditions.len(), 1);
        assert!(conditions[0].get("range").is_some());
    }

    #[test]
    fn geo_filter_requires_distance_function_and_point() {
        let point = GeoPoint {
            lat: 48.14,
            lon: 17.10,
        };

        // Ceiling set but function is not MAX_DISTANCE: no geo filter.
        let intent = QuestionIntent {
            max_distance: Some(15.0),
            ..Default::default()
        };
        assert!(filter_array(&knn_only_body(&intent, Some(point))).is_empty());

        // Function set but no user point: no geo filter and no geo sort.
        let intent = QuestionIntent {
            max_distance: Some(15.0),
            func: Some(QueryFunction::MaxDistance),
            ..Default::default()
        };
        let body = knn_only_body(&intent, None);
        assert!(filter_array(&body).is_empty());
        assert!(body.get("sort").is_none());

        // All three present: one geo filter plus the distance sort.
        let body = knn_only_body(&intent, Some(point));
        let filters = filter_array(&body);
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0]["geo_distance"]["distance"], "15km");
        assert_eq!(filters[0]["geo_distance"]["point"]["lat"], 48.14);

        let sorts = body["sort"].as_array().unwrap();
        assert_eq!(sorts.len(), 1);
        assert_eq!(sorts[0]["_geo_distance"]["unit"], "km");
        assert_eq!(sorts[0]["_geo_distance"]["distance_type"], "arc");
    }

    #[test]
    fn cheapest_oil_change_in_bratislava_scenario() {
        let intent = QuestionIntent {
            city: Some("Bratislava".into()),
            offer_type: Some(OfferType::OilChange),
            func: Some(QueryFunction::Cheapest),
            ..Default::default()
        };
        let body = knn_only_body(&intent, None);

        let filters = filter_array(&body);
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0], json!({ "term": { "city": "Bratislava" } }));
        assert_eq!(
            filters[1]["nested"]["query"]["bool"]["filter"][0],
            json!({ "term": { "offers.offer_type": "OIL_CHANGE" } })
        );

        let sorts = body["sort"].as_array().unwrap();
        assert_eq!(sorts.len(), 1);
        let price_sort = &sorts[0]["offers.base_price"];
        assert_eq!(price_sort["order"], "asc");
        assert_eq!(price_sort["mode"], "min");
        assert_eq!(price_sort["nested"]["path"], "offers");
        assert_eq!(
            price_sort["nested"]["filter"],
            json!({ "term": { "offers.offer_type": "OIL_CHANGE" } })
        );
    }

    #[test]
    fn cheapest_without_category_drops_sort_scope_filter() {
        let intent = QuestionIntent {
            func: Some(QueryFunction::Cheapest),
            ..Default::default()
        };
        let body = knn_only_body(&intent, None);

        let sorts = body["sort"].as_array().unwrap();
        let nested = &sorts[0]["offers.base_price"]["nested"];
        assert_eq!(nested["path"], "offers");
        assert!(nested.get("filter").is_none());
    }

    #[test]
    fn clean_json_strips_nested_empties() {
        let dirty = json!({
            "keep": 1,
            "null": null,
            "blank": "",
            "empty_list": [],
            "empty_map": {},
            "collapses": { "inner": { "deep": null } },
            "list": [null, "", {}, "kept", { "x": [] }],
            "zero": 0,
            "falsy": false
        });
        let cleaned = clean_json(dirty);
        assert_eq!(
            cleaned,
            json!({ "keep": 1, "list": ["kept"], "zero": 0, "falsy": false })
        );
    }

    #[test]
    fn clean_json_is_idempotent() {
        let dirty = json!({
            "a": { "b": [null, { "c": "" }], "d": "x" },
            "sort": [],
            "query": { "bool": { "filter": [{}] } }
        });
        let once = clean_json(dirty.clone());
        let twice = clean_json(once.clone());
        assert_eq!(once, twice);
    }
}
