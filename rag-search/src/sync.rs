//! Document synchronization: relational service graphs → index documents.
//!
//! A service's document is always rebuilt from the complete current state of
//! its offers and compatibility rows, then upserted as a full replacement.
//! Nested arrays are never patched incrementally; overwrite keyed by the
//! service id is the consistency invariant.

use std::{future::Future, pin::Pin};

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::document::{CarCompatibilityDoc, DocumentSource, OfferDoc, SearchDocument};
use crate::domain::{CarBrand, CarCompatibilityRecord, CarType, GeoPoint, OfferRecord, ServiceGraph};
use crate::embed::EmbeddingProvider;
use crate::errors::SearchError;
use crate::index::SearchIndexClient;

/// Database collaborator that pages the full service catalog,
/// eager-loaded (each graph carries its complete offer and compatibility
/// rows, no per-service fan-out).
pub trait ServiceCatalog: Send + Sync {
    /// Total number of services.
    fn count<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<u64, SearchError>> + Send + 'a>>;

    /// One page of service graphs at the given offset.
    fn fetch_batch<'a>(
        &'a self,
        offset: u64,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ServiceGraph>, SearchError>> + Send + 'a>>;
}

/// Renders the human-readable content text the document is embedded from.
///
/// Every human-meaningful field ends up in the text — name, description,
/// address, and each offer's category, description, price, and compatible
/// cars grouped per car type — so semantic search can match on any of them.
pub fn render_content(graph: &ServiceGraph) -> String {
    let service = &graph.service;
    let offers = &graph.offers;

    let mut content = format!(
        "Service Name: {}\n\nDescription: {}\n\nAddress: {}\n",
        service.name, service.description, service.address
    );

    if !offers.is_empty() {
        content.push_str("Offers:\n");
    }

    for (idx, offer) in offers.iter().enumerate() {
        content.push_str(&format!(
            "- Offer {}/{}:\n  Offer type: {}\n  Description: {}\n  Price: {} {}\n",
            idx + 1,
            offers.len(),
            offer.offer_type.as_str(),
            offer.description,
            offer.base_price,
            offer.currency.as_str(),
        ));

        let grouped = group_compatibilities(&offer.id, &graph.compatibilities);
        if !grouped.is_empty() {
            content.push_str("  Compatible cars:\n");
            for (car_type, brands) in &grouped {
                let brand_list = brands
                    .iter()
                    .map(|b| b.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                content.push_str(&format!(
                    "  Car type: {}, Car brands: {}\n",
                    car_type.as_str(),
                    brand_list
                ));
            }
        }
        content.push('\n');
    }

    content
}

/// Builds the index document for a service graph, embedding the rendered
/// content.
///
/// # Errors
/// Propagates embedding failures; a document is never written with a
/// missing or mismatched vector.
pub async fn build_document(
    graph: &ServiceGraph,
    embedder: &dyn EmbeddingProvider,
) -> Result<SearchDocument, SearchError> {
    let content = render_content(graph);
    let embedding = embedder.embed(&content).await?;
    let service = &graph.service;

    let offers = graph
        .offers
        .iter()
        .map(|offer| OfferDoc {
            base_price: offer.base_price,
            sale: offer.sale,
            currency: offer.currency,
            offer_type: offer.offer_type,
            car_compatibilities: graph
                .compatibilities
                .iter()
                .filter(|c| c.offer_id == offer.id)
                .map(|c| CarCompatibilityDoc {
                    car_type: c.car_type,
                    car_brand: c.car_brand,
                })
                .collect(),
        })
        .collect();

    Ok(SearchDocument {
        id: service.id.clone(),
        content,
        embedding,
        source: DocumentSource::Postgresql,
        name: service.name.clone(),
        point: GeoPoint {
            lat: service.latitude,
            lon: service.longitude,
        },
        city: service.city.clone(),
        country: service.country,
        offers,
    })
}

/// Rebuilds and upserts one service's document, fully replacing any prior
/// content stored under the same id.
///
/// Callers must pass the complete current offer set; partial sets produce a
/// document missing offers, not a merge.
pub async fn sync(
    index: &SearchIndexClient,
    embedder: &dyn EmbeddingProvider,
    graph: &ServiceGraph,
) -> Result<(), SearchError> {
    debug!("Syncing service '{}'", graph.service.id);
    let document = build_document(graph, embedder).await?;
    index.upsert(&document.id, &document).await
}

/// Pages the whole catalog and syncs every service, building documents
/// concurrently within each page. Returns the number of synced services.
///
/// # Errors
/// Fails fast on the first embedding or backend error.
pub async fn reindex_all(
    cfg: &SearchConfig,
    index: &SearchIndexClient,
    embedder: &dyn EmbeddingProvider,
    catalog: &dyn ServiceCatalog,
) -> Result<u64, SearchError> {
    let total = catalog.count().await?;
    info!("Reindexing {} services", total);
    if total == 0 {
        return Ok(0);
    }

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap()
        .progress_chars("##-"),
    );

    let concurrency = cfg.sync_concurrency.max(1);
    let mut synced: u64 = 0;
    let mut offset: u64 = 0;

    while offset < total {
        let graphs = catalog.fetch_batch(offset, cfg.reindex_batch).await?;
        if graphs.is_empty() {
            break;
        }

        let mut stream = futures::stream::iter(graphs.iter())
            .map(|graph| sync(index, embedder, graph))
            .buffer_unordered(concurrency);

        while let Some(res) = stream.next().await {
            res?;
            synced += 1;
            pb.inc(1);
        }

        offset += cfg.reindex_batch as u64;
    }

    pb.finish_with_message("Reindex complete ✔");
    info!("Reindexed {} services", synced);
    Ok(synced)
}

/// Groups one offer's compatibility rows by car type, preserving
/// first-occurrence order.
fn group_compatibilities(
    offer_id: &str,
    compatibilities: &[CarCompatibilityRecord],
) -> Vec<(CarType, Vec<CarBrand>)> {
    let mut grouped: Vec<(CarType, Vec<CarBrand>)> = Vec::new();
    for row in compatibilities.iter().filter(|c| c.offer_id == offer_id) {
        match grouped.iter_mut().find(|(t, _)| *t == row.car_type) {
            Some((_, brands)) => brands.push(row.car_brand),
            None => grouped.push((row.car_type, vec![row.car_brand])),
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Country, Currency, OfferType, ServiceRecord};

    struct FixedEmbedder {
        dim: usize,
    }

    impl EmbeddingProvider for FixedEmbedder {
        fn embed<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, SearchError>> + Send + 'a>> {
            Box::pin(async move { Ok(vec![0.5; self.dim]) })
        }
    }

    fn sample_graph() -> ServiceGraph {
        ServiceGraph {
            service: ServiceRecord {
                id: "svc-1".into(),
                name: "AutoFix Bratislava".into(),
                description: "Full-range car service".into(),
                country: Country::Slovakia,
                city: "Bratislava".into(),
                address: "Hlavná 1, Bratislava".into(),
                latitude: 48.1486,
                longitude: 17.1077,
            },
            offers: vec![
                OfferRecord {
                    id: "off-1".into(),
                    offer_type: OfferType::OilChange,
                    description: "Synthetic oil change".into(),
                    base_price: 49.9,
                    sale: 0,
                    currency: Currency::Eur,
                },
                OfferRecord {
                    id: "off-2".into(),
                    offer_type: OfferType::TireChange,
                    description: "Seasonal tire swap".into(),
                    base_price: 30.0,
                    sale: 10,
                    currency: Currency::Eur,
                },
            ],
            compatibilities: vec![
                CarCompatibilityRecord {
                    offer_id: "off-1".into(),
                    car_type: CarType::Suv,
                    car_brand: CarBrand::Bmw,
                },
                CarCompatibilityRecord {
                    offer_id: "off-1".into(),
                    car_type: CarType::Suv,
                    car_brand: CarBrand::Audi,
                },
                CarCompatibilityRecord {
                    offer_id: "off-1".into(),
                    car_type: CarType::Classic,
                    car_brand: CarBrand::Skoda,
                },
                CarCompatibilityRecord {
                    offer_id: "off-2".into(),
                    car_type: CarType::Truck,
                    car_brand: CarBrand::Volvo,
                },
            ],
        }
    }

    #[test]
    fn content_contains_every_offer_category() {
        let content = render_content(&sample_graph());
        assert!(content.contains("Service Name: AutoFix Bratislava"));
        assert!(content.contains("Address: Hlavná 1, Bratislava"));
        assert!(content.contains("OIL_CHANGE"));
        assert!(content.contains("TIRE_CHANGE"));
        assert!(content.contains("Price: 49.9 EUR"));
    }

    #[test]
    fn content_groups_compatibilities_by_car_type() {
        let content = render_content(&sample_graph());
        assert!(content.contains("Car type: SUV, Car brands: BMW,AUDI"));
        assert!(content.contains("Car type: CLASSIC, Car brands: SKODA"));
        assert!(content.contains("Car type: TRUCK, Car brands: VOLVO"));
    }

    #[test]
    fn content_omits_offers_header_for_offerless_service() {
        let mut graph = sample_graph();
        graph.offers.clear();
        graph.compatibilities.clear();
        assert!(!render_content(&graph).contains("Offers:"));
    }

    #[tokio::test]
    async fn document_mirrors_the_full_offer_set() {
        let graph = sample_graph();
        let embedder = FixedEmbedder { dim: 8 };

        let doc = build_document(&graph, &embedder).await.unwrap();
        assert_eq!(doc.id, "svc-1");
        assert_eq!(doc.offers.len(), graph.offers.len());
        assert_eq!(doc.embedding.len(), 8);
        assert_eq!(doc.point.lat, 48.1486);
        assert_eq!(doc.source, DocumentSource::Postgresql);

        // Compatibilities land on their own offer only.
        assert_eq!(doc.offers[0].car_compatibilities.len(), 3);
        assert_eq!(doc.offers[1].car_compatibilities.len(), 1);
        assert_eq!(doc.offers[1].car_compatibilities[0].car_brand, CarBrand::Volvo);

        // The content text carries every offer category.
        for offer in &graph.offers {
            assert!(doc.content.contains(offer.offer_type.as_str()));
        }
    }

    #[tokio::test]
    async fn embedding_failure_aborts_document_build() {
        struct FailingEmbedder;
        impl EmbeddingProvider for FailingEmbedder {
            fn embed<'a>(
                &'a self,
                _text: &'a str,
            ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, SearchError>> + Send + 'a>>
            {
                Box::pin(async {
                    Err(SearchError::EmbeddingUnavailable {
                        reason: "connection refused".into(),
                    })
                })
            }
        }

        let res = build_document(&sample_graph(), &FailingEmbedder).await;
        assert!(matches!(
            res,
            Err(SearchError::EmbeddingUnavailable { .. })
        ));
    }
}
