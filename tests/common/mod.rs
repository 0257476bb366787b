// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use challenge_tracker::config::Config;
use challenge_tracker::db::{LeaderboardStore, MemoryStore};
use challenge_tracker::error::ScoringError;
use challenge_tracker::models::{ChallengeInfo, LeaderboardEntry, Season};
use challenge_tracker::routes::create_router;
use challenge_tracker::services::{Catalog, ScoringService, Submission};
use challenge_tracker::AppState;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Load the bundled catalog.
#[allow(dead_code)]
pub fn test_catalog() -> Catalog {
    Catalog::load_from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/data/catalog.json"))
        .expect("Failed to load data/catalog.json")
}

/// Scoring service over a fresh in-memory store.
#[allow(dead_code)]
pub fn test_service() -> (ScoringService, MemoryStore) {
    let store = MemoryStore::new();
    let service = ScoringService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        test_catalog(),
    );
    (service, store)
}

/// Create a test app backed by in-memory storage.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let (scoring, _) = test_service();
    let state = Arc::new(AppState { config, scoring });
    (create_router(state.clone()), state)
}

/// Noon UTC on the given day.
#[allow(dead_code)]
pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn season(id: i32) -> Season {
    Season::try_from(id).unwrap()
}

/// A plain submission worth exactly `points` with no bonuses (streak < 7).
#[allow(dead_code)]
pub fn plain_submission(points: u64, submitted_at: DateTime<Utc>) -> Submission {
    Submission {
        challenge: ChallengeInfo {
            points,
            average_completion_time: Duration::from_millis(1000),
        },
        execution_time: Duration::from_millis(5000),
        prior_submission_count: 100,
        submitted_at,
    }
}

/// Leaderboard store wrapper whose writes can be made to fail.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct FlakyLeaderboard {
    pub inner: MemoryStore,
    fail_writes: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl FlakyLeaderboard {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl LeaderboardStore for FlakyLeaderboard {
    async fn load_season(&self, season: Season) -> Result<Vec<LeaderboardEntry>, ScoringError> {
        self.inner.load_season(season).await
    }

    async fn save_season(
        &self,
        season: Season,
        entries: &[LeaderboardEntry],
    ) -> Result<(), ScoringError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ScoringError::Storage("injected write failure".to_string()));
        }
        self.inner.save_season(season, entries).await
    }
}
