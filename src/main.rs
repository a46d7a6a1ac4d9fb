//! Admin binary for the marketplace search engine.
//!
//! Index lifecycle and migrations are explicit external operations, never
//! implicit side effects of the core — this binary is where they live:
//!
//! ```text
//! car-service-search create-index
//! car-service-search delete-index
//! car-service-search wipe
//! car-service-search reindex
//! car-service-search ask "cheapest oil change in Bratislava" [lat lon]
//! ```

use std::sync::Arc;
use std::{future::Future, pin::Pin};

use colored::Colorize;
use inference_service::{InferenceConfig, OllamaClient};
use rag_search::{
    CarBrand, CarCompatibilityRecord, CarType, Country, Currency, GeoPoint, LlmIntentInterpreter,
    OfferRecord, OfferType, OllamaEmbedder, SearchConfig, SearchEngine, SearchError,
    ServiceCatalog, ServiceGraph, ServiceRecord,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional outside local development.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    let engine = build_engine()?;

    match command.as_str() {
        "create-index" => {
            engine.create_index().await?;
            println!("{}", "Index created.".green());
        }
        "delete-index" => {
            engine.delete_index().await?;
            println!("{}", "Index deleted.".green());
        }
        "wipe" => {
            let deleted = engine.wipe().await?;
            println!("{}", format!("Deleted {deleted} documents.").green());
        }
        "reindex" => {
            let synced = engine.reindex_all(&DemoCatalog::default()).await?;
            println!("{}", format!("Synced {synced} services.").green());
        }
        "ask" => {
            let Some(question) = args.get(1) else {
                eprintln!("{}", "ask requires a question".red());
                print_usage();
                std::process::exit(2);
            };
            let user_point = parse_point(args.get(2), args.get(3))?;
            let answers = engine.answer(question, user_point).await?;
            print_answers(&answers);
        }
        other => {
            eprintln!("{}", format!("unknown command: {other}").red());
            print_usage();
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Wires the engine from environment variables with local-dev defaults.
fn build_engine() -> anyhow::Result<SearchEngine> {
    let mut cfg = SearchConfig::new_default(
        env_or("OPENSEARCH_URL", "http://localhost:9200"),
        env_or("OPENSEARCH_INDEX", "rag_index"),
    );
    cfg.username = std::env::var("OPENSEARCH_USERNAME").ok();
    cfg.password = std::env::var("OPENSEARCH_PASSWORD").ok();
    cfg.accept_invalid_certs = env_or("OPENSEARCH_ACCEPT_INVALID_CERTS", "false") == "true";

    let ollama_endpoint = env_or("OLLAMA_ENDPOINT", "http://localhost:11434");
    let embed_client = Arc::new(OllamaClient::new(InferenceConfig::new(
        env_or("EMBEDDING_MODEL", "nomic-embed-text"),
        ollama_endpoint.clone(),
    ))?);
    let generate_client = Arc::new(OllamaClient::new(InferenceConfig::new(
        env_or("INTERPRETATION_MODEL", "llama3:8b"),
        ollama_endpoint,
    ))?);

    let embedder = Arc::new(OllamaEmbedder::new(embed_client, cfg.embedding_dim));
    let interpreter = Arc::new(LlmIntentInterpreter::new(generate_client));

    Ok(SearchEngine::new(cfg, embedder, interpreter)?)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_point(
    lat: Option<&String>,
    lon: Option<&String>,
) -> anyhow::Result<Option<GeoPoint>> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Some(GeoPoint {
            lat: lat.parse()?,
            lon: lon.parse()?,
        })),
        (None, None) => Ok(None),
        _ => anyhow::bail!("user location needs both lat and lon"),
    }
}

fn print_answers(answers: &[rag_search::RagAnswer]) {
    for (idx, answer) in answers.iter().enumerate() {
        let id = answer.service_id.as_deref().unwrap_or("-");
        println!(
            "{} {} {}",
            format!("{:>2}.", idx + 1).bold(),
            format!("[score {:.2}]", answer.score).cyan(),
            id.yellow(),
        );
        println!("{}\n", answer.content.trim_end());
    }
}

fn print_usage() {
    println!("usage: car-service-search <command>");
    println!("  create-index                       create the index with the current mapping");
    println!("  delete-index                       delete the index");
    println!("  wipe                               delete all documents, keep the mapping");
    println!("  reindex                            sync the demo catalog into the index");
    println!("  ask <question> [lat lon]           answer a free-text question");
}

/* ==========================
Demo catalog
========================== */

/// Small in-memory catalog standing in for the database collaborator, so
/// `reindex` can be exercised end to end against a local cluster.
struct DemoCatalog {
    graphs: Vec<ServiceGraph>,
}

impl Default for DemoCatalog {
    fn default() -> Self {
        Self {
            graphs: vec![
                ServiceGraph {
                    service: ServiceRecord {
                        id: "demo-autofix-ba".into(),
                        name: "AutoFix Bratislava".into(),
                        description: "Full-range car service in the city center".into(),
                        country: Country::Slovakia,
                        city: "Bratislava".into(),
                        address: "Hlavná 1, 811 01 Bratislava".into(),
                        latitude: 48.1486,
                        longitude: 17.1077,
                    },
                    offers: vec![
                        OfferRecord {
                            id: "demo-offer-oil".into(),
                            offer_type: OfferType::OilChange,
                            description: "Synthetic oil change incl. filter".into(),
                            base_price: 49.9,
                            sale: 0,
                            currency: Currency::Eur,
                        },
                        OfferRecord {
                            id: "demo-offer-tire".into(),
                            offer_type: OfferType::TireChange,
                            description: "Seasonal tire swap and balancing".into(),
                            base_price: 35.0,
                            sale: 10,
                            currency: Currency::Eur,
                        },
                    ],
                    compatibilities: vec![
                        CarCompatibilityRecord {
                            offer_id: "demo-offer-oil".into(),
                            car_type: CarType::Classic,
                            car_brand: CarBrand::Skoda,
                        },
                        CarCompatibilityRecord {
                            offer_id: "demo-offer-oil".into(),
                            car_type: CarType::Suv,
                            car_brand: CarBrand::Bmw,
                        },
                        CarCompatibilityRecord {
                            offer_id: "demo-offer-tire".into(),
                            car_type: CarType::Suv,
                            car_brand: CarBrand::Audi,
                        },
                    ],
                },
                ServiceGraph {
                    service: ServiceRecord {
                        id: "demo-pneu-praha".into(),
                        name: "Pneu Servis Praha".into(),
                        description: "Tires, brakes, and quick diagnostics".into(),
                        country: Country::Czechia,
                        city: "Praha".into(),
                        address: "Vinohradská 12, 120 00 Praha".into(),
                        latitude: 50.0755,
                        longitude: 14.4378,
                    },
                    offers: vec![OfferRecord {
                        id: "demo-offer-brake".into(),
                        offer_type: OfferType::BrakeService,
                        description: "Brake pad replacement, both axles".into(),
                        base_price: 1890.0,
                        sale: 0,
                        currency: Currency::Czk,
                    }],
                    compatibilities: vec![CarCompatibilityRecord {
                        offer_id: "demo-offer-brake".into(),
                        car_type: CarType::Hybrid,
                        car_brand: CarBrand::Toyota,
                    }],
                },
            ],
        }
    }
}

impl ServiceCatalog for DemoCatalog {
    fn count<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<u64, SearchError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.graphs.len() as u64) })
    }

    fn fetch_batch<'a>(
        &'a self,
        offset: u64,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ServiceGraph>, SearchError>> + Send + 'a>> {
        Box::pin(async move {
            Ok(self
                .graphs
                .iter()
                .skip(offset as usize)
                .take(limit)
                .cloned()
                .collect())
        })
    }
}
