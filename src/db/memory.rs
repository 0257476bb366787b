// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store for local development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ensure_single_season, LeaderboardStore, UserStatStore};
use crate::error::ScoringError;
use crate::models::{LeaderboardEntry, Season, UserStat};

/// Process-local store. Cloning shares the underlying maps.
#[derive(Clone, Default)]
pub struct MemoryStore {
    stats: Arc<RwLock<HashMap<String, UserStat>>>,
    seasons: Arc<RwLock<HashMap<Season, Vec<LeaderboardEntry>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStatStore for MemoryStore {
    async fn load(&self, user_id: &str) -> Result<Option<UserStat>, ScoringError> {
        Ok(self.stats.read().await.get(user_id).cloned())
    }

    async fn save(&self, stat: &UserStat) -> Result<(), ScoringError> {
        self.stats
            .write()
            .await
            .insert(stat.user_id.clone(), stat.clone());
        Ok(())
    }
}

#[async_trait]
impl LeaderboardStore for MemoryStore {
    async fn load_season(&self, season: Season) -> Result<Vec<LeaderboardEntry>, ScoringError> {
        Ok(self
            .seasons
            .read()
            .await
            .get(&season)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_season(
        &self,
        season: Season,
        entries: &[LeaderboardEntry],
    ) -> Result<(), ScoringError> {
        ensure_single_season(season, entries)?;
        // Swapping the whole vector under the write lock keeps readers from
        // ever seeing a partially ranked season.
        self.seasons.write().await.insert(season, entries.to_vec());
        Ok(())
    }
}
