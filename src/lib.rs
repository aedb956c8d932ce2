pub mod api;
pub mod config;
pub mod dashboard;
pub mod filter;
pub mod models;
pub mod recommend;
pub mod session;
pub mod ticket;
pub mod transform;
mod utils;

#[cfg(test)]
mod fake_backend;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub use api::{ApiClient, ApiError};
pub use config::ApiConfig;
pub use dashboard::{AdminDashboard, AdminTab, Marketplace};
pub use filter::{filter, EventQuery};
pub use models::{DisplayEvent, EventStatus, WireEvent};
pub use session::{Session, SessionStore};
pub use transform::{transform, transform_all};

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed by the embedding application.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn query_from_env() -> EventQuery {
    let var = |name: &str| std::env::var(name).unwrap_or_default();
    EventQuery::default()
        .with_keyword(var("EVENT_KEYWORD"))
        .with_city(var("EVENT_CITY"))
        .between(
            filter::parse_query_date(&var("EVENT_FROM")),
            filter::parse_query_date(&var("EVENT_TO")),
        )
}

/// Prints the marketplace listing narrowed by the `EVENT_*` query variables,
/// plus the curation queue when a saved admin session is still valid.
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::from_env();
    let client = ApiClient::new(&config).context("invalid backend configuration")?;

    let mut market = Marketplace::load(&client)
        .await
        .context("failed to load events")?;
    market.query = query_from_env();
    let visible = market.visible();
    info!(shown = visible.len(), total = market.events().len(), "marketplace");
    for event in &visible {
        println!(
            "{} | {} | {} | {} | {} | source: {}",
            event.date,
            event.title,
            event.location,
            event.category,
            event.status.map_or("-", EventStatus::label),
            ticket::source_host(event)
        );
    }

    let session = SessionStore::load();
    if session.is_authenticated() {
        match client.verify_auth(&session).await {
            Ok(verified) => {
                let mut dashboard = AdminDashboard::new();
                let pending = dashboard.load(&client, &session).await?;
                println!("{} pending events for {}", pending, verified.admin.name);
            }
            Err(err) => warn!(%err, "saved admin session rejected"),
        }
    }

    if let Ok(question) = std::env::var("RECOMMEND_QUERY") {
        let recommender = recommend::Recommender::from_config(&config.recommender)
            .context("invalid recommender configuration")?;
        println!("{}", recommender.recommend(&question).await);
    }

    Ok(())
}
