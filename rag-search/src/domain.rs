//! Closed marketplace vocabularies and the relational input records
//! supplied by the database collaborator.
//!
//! Every enum serializes as its SCREAMING_SNAKE keyword — the same token
//! stored in the index, demanded from the interpretation model, and shown
//! in rendered document content.

use serde::{Deserialize, Serialize};

/// Countries the marketplace operates in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Country {
    Slovakia,
    Czechia,
    Austria,
    Poland,
    Hungary,
}

impl Country {
    /// Keyword form stored in the index.
    pub fn as_str(&self) -> &'static str {
        match self {
            Country::Slovakia => "SLOVAKIA",
            Country::Czechia => "CZECHIA",
            Country::Austria => "AUSTRIA",
            Country::Poland => "POLAND",
            Country::Hungary => "HUNGARY",
        }
    }
}

/// Offer pricing currencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    Usd,
    Eur,
    Pln,
    Gbp,
    Czk,
    Huf,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Pln => "PLN",
            Currency::Gbp => "GBP",
            Currency::Czk => "CZK",
            Currency::Huf => "HUF",
        }
    }
}

/// Service-catalog offer categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferType {
    Maintenance,
    Repair,
    Diagnostics,
    EngineRepair,
    TransmissionRepair,
    ClutchRepair,
    TimingBeltReplacement,
    BrakeService,
    SuspensionRepair,
    SteeringRepair,
    Electrical,
    BatteryService,
    AlternatorRepair,
    StarterRepair,
    LightingRepair,
    EcuProgramming,
    OilChange,
    FilterReplacement,
    CoolantService,
    BrakeFluidService,
    TransmissionFluidService,
    TireChange,
    TireBalancing,
    WheelAlignment,
    PunctureRepair,
    ExhaustRepair,
    EmissionsService,
    CatalyticConverterRepair,
    AcService,
    AcRepair,
    HeatingRepair,
    BodyWork,
    Painting,
    DentRemoval,
    InteriorRepair,
    UpholsteryRepair,
    WindowMechanismRepair,
    PrePurchaseInspection,
    SafetyInspection,
    CarWash,
    Detailing,
    Towing,
}

impl OfferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferType::Maintenance => "MAINTENANCE",
            OfferType::Repair => "REPAIR",
            OfferType::Diagnostics => "DIAGNOSTICS",
            OfferType::EngineRepair => "ENGINE_REPAIR",
            OfferType::TransmissionRepair => "TRANSMISSION_REPAIR",
            OfferType::ClutchRepair => "CLUTCH_REPAIR",
            OfferType::TimingBeltReplacement => "TIMING_BELT_REPLACEMENT",
            OfferType::BrakeService => "BRAKE_SERVICE",
            OfferType::SuspensionRepair => "SUSPENSION_REPAIR",
            OfferType::SteeringRepair => "STEERING_REPAIR",
            OfferType::Electrical => "ELECTRICAL",
            OfferType::BatteryService => "BATTERY_SERVICE",
            OfferType::AlternatorRepair => "ALTERNATOR_REPAIR",
            OfferType::StarterRepair => "STARTER_REPAIR",
            OfferType::LightingRepair => "LIGHTING_REPAIR",
            OfferType::EcuProgramming => "ECU_PROGRAMMING",
            OfferType::OilChange => "OIL_CHANGE",
            OfferType::FilterReplacement => "FILTER_REPLACEMENT",
            OfferType::CoolantService => "COOLANT_SERVICE",
            OfferType::BrakeFluidService => "BRAKE_FLUID_SERVICE",
            OfferType::TransmissionFluidService => "TRANSMISSION_FLUID_SERVICE",
            OfferType::TireChange => "TIRE_CHANGE",
            OfferType::TireBalancing => "TIRE_BALANCING",
            OfferType::WheelAlignment => "WHEEL_ALIGNMENT",
            OfferType::PunctureRepair => "PUNCTURE_REPAIR",
            OfferType::ExhaustRepair => "EXHAUST_REPAIR",
            OfferType::EmissionsService => "EMISSIONS_SERVICE",
            OfferType::CatalyticConverterRepair => "CATALYTIC_CONVERTER_REPAIR",
            OfferType::AcService => "AC_SERVICE",
            OfferType::AcRepair => "AC_REPAIR",
            OfferType::HeatingRepair => "HEATING_REPAIR",
            OfferType::BodyWork => "BODY_WORK",
            OfferType::Painting => "PAINTING",
            OfferType::DentRemoval => "DENT_REMOVAL",
            OfferType::InteriorRepair => "INTERIOR_REPAIR",
            OfferType::UpholsteryRepair => "UPHOLSTERY_REPAIR",
            OfferType::WindowMechanismRepair => "WINDOW_MECHANISM_REPAIR",
            OfferType::PrePurchaseInspection => "PRE_PURCHASE_INSPECTION",
            OfferType::SafetyInspection => "SAFETY_INSPECTION",
            OfferType::CarWash => "CAR_WASH",
            OfferType::Detailing => "DETAILING",
            OfferType::Towing => "TOWING",
        }
    }
}

/// Car body/drivetrain classes used in compatibility rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarType {
    Classic,
    Sports,
    Electrical,
    Suv,
    Truck,
    Hybrid,
    Bus,
}

impl CarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarType::Classic => "CLASSIC",
            CarType::Sports => "SPORTS",
            CarType::Electrical => "ELECTRICAL",
            CarType::Suv => "SUV",
            CarType::Truck => "TRUCK",
            CarType::Hybrid => "HYBRID",
            CarType::Bus => "BUS",
        }
    }
}

/// Car brands recognized by the marketplace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarBrand {
    Skoda,
    Volkswagen,
    Audi,
    Bmw,
    Mercedes,
    Opel,
    Ford,
    Toyota,
    Honda,
    Hyundai,
    Kia,
    Peugeot,
    Renault,
    Citroen,
    Fiat,
    Volvo,
    Seat,
    Mazda,
    Nissan,
    Suzuki,
    Dacia,
    Tesla,
}

impl CarBrand {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarBrand::Skoda => "SKODA",
            CarBrand::Volkswagen => "VOLKSWAGEN",
            CarBrand::Audi => "AUDI",
            CarBrand::Bmw => "BMW",
            CarBrand::Mercedes => "MERCEDES",
            CarBrand::Opel => "OPEL",
            CarBrand::Ford => "FORD",
            CarBrand::Toyota => "TOYOTA",
            CarBrand::Honda => "HONDA",
            CarBrand::Hyundai => "HYUNDAI",
            CarBrand::Kia => "KIA",
            CarBrand::Peugeot => "PEUGEOT",
            CarBrand::Renault => "RENAULT",
            CarBrand::Citroen => "CITROEN",
            CarBrand::Fiat => "FIAT",
            CarBrand::Volvo => "VOLVO",
            CarBrand::Seat => "SEAT",
            CarBrand::Mazda => "MAZDA",
            CarBrand::Nissan => "NISSAN",
            CarBrand::Suzuki => "SUZUKI",
            CarBrand::Dacia => "DACIA",
            CarBrand::Tesla => "TESLA",
        }
    }
}

/// Question intent functions recognized by the interpreter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryFunction {
    Info,
    Cheapest,
    MostExpensive,
    Compare,
    MaxDistance,
    Availability,
}

impl QueryFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryFunction::Info => "INFO",
            QueryFunction::Cheapest => "CHEAPEST",
            QueryFunction::MostExpensive => "MOST_EXPENSIVE",
            QueryFunction::Compare => "COMPARE",
            QueryFunction::MaxDistance => "MAX_DISTANCE",
            QueryFunction::Availability => "AVAILABILITY",
        }
    }
}

/// Geographic coordinate as stored in the index `point` field and used
/// in geo-distance clauses.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/* ==========================
Relational input records
========================== */

/// Scalar fields of a service entity, eager-loaded by the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub country: Country,
    pub city: String,
    /// Full human-readable address.
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One offer row belonging to a service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OfferRecord {
    pub id: String,
    pub offer_type: OfferType,
    pub description: String,
    pub base_price: f32,
    /// Sale percentage applied to the base price.
    pub sale: i32,
    pub currency: Currency,
}

/// One car-compatibility row belonging to an offer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarCompatibilityRecord {
    pub offer_id: String,
    pub car_type: CarType,
    pub car_brand: CarBrand,
}

/// A service with its full, current set of offers and compatibility rows.
///
/// This is the unit the database collaborator hands to the synchronizer;
/// it must always carry the complete offer set for the service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceGraph {
    pub service: ServiceRecord,
    pub offers: Vec<OfferRecord>,
    pub compatibilities: Vec<CarCompatibilityRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_serialize_as_keywords() {
        assert_eq!(
            serde_json::to_value(OfferType::OilChange).unwrap(),
            serde_json::json!("OIL_CHANGE")
        );
        assert_eq!(
            serde_json::to_value(Country::Slovakia).unwrap(),
            serde_json::json!("SLOVAKIA")
        );
        assert_eq!(
            serde_json::to_value(QueryFunction::MaxDistance).unwrap(),
            serde_json::json!("MAX_DISTANCE")
        );
    }

    #[test]
    fn keyword_matches_as_str() {
        for (value, expected) in [
            (serde_json::to_value(CarType::Suv).unwrap(), CarType::Suv.as_str()),
            (
                serde_json::to_value(Currency::Eur).unwrap(),
                Currency::Eur.as_str(),
            ),
            (
                serde_json::to_value(CarBrand::Skoda).unwrap(),
                CarBrand::Skoda.as_str(),
            ),
        ] {
            assert_eq!(value, serde_json::json!(expected));
        }
    }

    #[test]
    fn out_of_vocabulary_keyword_fails_decode() {
        assert!(serde_json::from_value::<Country>(serde_json::json!("GERMANY")).is_err());
        assert!(serde_json::from_value::<OfferType>(serde_json::json!("oil change")).is_err());
    }
}
