//! Nutrition Tracker
//!
//! Runs the engine once over an in-memory repository and logs today's
//! targets and progress.
//!
//! ## Architecture
//!
//! - Settings store: profile fields persisted as health metrics
//! - Calculator: BMR, TDEE, calorie target and macro grams
//! - Ledger store: meals for one date, grouped by meal type, with totals

use anyhow::Result;
use nutrition_tracker_engine::{
    config::EngineConfig, repositories::InMemoryRepository, state::NutritionEngine,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = EngineConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if EngineConfig::is_production() { "production" } else { "development" },
        premium = config.account.premium,
        "Starting Nutrition Tracker"
    );

    let repo = Arc::new(InMemoryRepository::new());
    let engine = NutritionEngine::new(config, repo);
    let mut notices = engine.notices();

    engine.start().await;

    while let Ok(notice) = notices.try_recv() {
        warn!(kind = ?notice.kind, "{}", notice.message);
    }

    let snapshot = engine.ledger.snapshot();
    info!(
        date = %snapshot.ledger.date,
        meals = snapshot.ledger.len(),
        "Ledger ready"
    );

    match engine.calculator.current() {
        Some(calculations) => {
            println!("{}", serde_json::to_string_pretty(&calculations)?);
        }
        None => warn!("Profile is incomplete, no targets calculated"),
    }
    println!("{}", serde_json::to_string_pretty(&snapshot.totals)?);
    if let Some(remaining) = engine.remaining() {
        println!("{}", serde_json::to_string_pretty(&remaining)?);
    }

    engine.shutdown();
    info!("Nutrition Tracker finished");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if EngineConfig::is_production() {
            "nutrition_tracker_engine=info".into()
        } else {
            "nutrition_tracker_engine=debug,nutrition_tracker=debug".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if EngineConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
