//! The denormalized document stored in the search index.

use serde::{Deserialize, Serialize};

use crate::domain::{CarBrand, CarType, Country, Currency, GeoPoint, OfferType};

/// Where a document's content originated. Audit metadata, never queried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentSource {
    File,
    Url,
    Postgresql,
    Api,
}

/// One search index entry, keyed by the source service's id.
///
/// The id lives outside the document body (it is the engine's `_id`), so it
/// is excluded from (de)serialization and filled in from the hit envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchDocument {
    #[serde(skip)]
    pub id: String,
    /// Human-readable rendering of the service and all of its offers.
    pub content: String,
    /// Embedding of `content`, fixed dimension per the index mapping.
    pub embedding: Vec<f32>,
    pub source: DocumentSource,
    pub name: String,
    pub point: GeoPoint,
    pub city: String,
    pub country: Country,
    pub offers: Vec<OfferDoc>,
}

/// Embedded offer sub-document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OfferDoc {
    pub base_price: f32,
    pub sale: i32,
    pub currency: Currency,
    pub offer_type: OfferType,
    pub car_compatibilities: Vec<CarCompatibilityDoc>,
}

/// Embedded compatibility pair inside an offer sub-document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarCompatibilityDoc {
    pub car_type: CarType,
    pub car_brand: CarBrand,
}
