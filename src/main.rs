// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge-Tracker Scoring Server
//!
//! Serves the gamification scoring core (points, streaks, leaderboards,
//! achievements and badges) to the surrounding controller layer.

use challenge_tracker::{
    config::{Config, StorageBackend},
    db::{FirestoreDb, LeaderboardStore, MemoryStore, UserStatStore},
    services::{Catalog, ScoringService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, storage = ?config.storage, "Starting Challenge-Tracker API");

    // Load the achievement/badge catalog
    tracing::info!(path = %config.catalog_path, "Loading catalog");
    let catalog = Catalog::load_from_file(&config.catalog_path)?;

    // Initialize storage
    let (stats, leaderboard): (Arc<dyn UserStatStore>, Arc<dyn LeaderboardStore>) =
        match config.storage {
            StorageBackend::Firestore => {
                let db = FirestoreDb::new(&config.gcp_project_id).await?;
                (Arc::new(db.clone()), Arc::new(db))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                let store = MemoryStore::new();
                (Arc::new(store.clone()), Arc::new(store))
            }
        };

    let scoring = ScoringService::new(stats, leaderboard, catalog);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        scoring,
    });

    // Build router
    let app = challenge_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("challenge_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
