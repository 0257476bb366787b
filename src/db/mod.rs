// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer.
//!
//! The scoring core talks to storage only through [`UserStatStore`] and
//! [`LeaderboardStore`]. Two implementations exist: an in-memory store used
//! for local development and tests, and a Firestore store for production.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::ScoringError;
use crate::models::{LeaderboardEntry, Season, UserStat};

/// Collection names as constants.
pub mod collections {
    /// User stats aggregates (keyed by user_id)
    pub const USER_STATS: &str = "user_stats";
    /// One document per season (keyed by the season id) holding all its rows
    pub const LEADERBOARD: &str = "leaderboard";
}

/// Read/write access to per-user statistics.
#[async_trait]
pub trait UserStatStore: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<UserStat>, ScoringError>;

    async fn save(&self, stat: &UserStat) -> Result<(), ScoringError>;
}

/// Read/write access to a season's leaderboard rows.
#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    async fn load_season(&self, season: Season) -> Result<Vec<LeaderboardEntry>, ScoringError>;

    /// Replace the season's rows. Either every row is written or none is.
    async fn save_season(
        &self,
        season: Season,
        entries: &[LeaderboardEntry],
    ) -> Result<(), ScoringError>;
}

/// Reject a write that would put rows of another season into `season`.
pub fn ensure_single_season(
    season: Season,
    entries: &[LeaderboardEntry],
) -> Result<(), ScoringError> {
    match entries.iter().find(|e| e.season != season) {
        Some(stray) => Err(ScoringError::SeasonMismatch {
            expected: season,
            found: stray.season,
        }),
        None => Ok(()),
    }
}
