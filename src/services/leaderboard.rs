// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Season-scoped leaderboard ranking.
//!
//! [`SeasonBoard`] holds the rows of one season and does the ranking work
//! synchronously. [`LeaderboardRanker`] wraps it with storage and the
//! per-season single-writer lock: every update runs load, upsert, re-rank and
//! save while holding that season's lock, and the store commits the whole
//! season at once.
//!
//! Every update re-sorts the full season, O(N log N) per scoring event. This
//! is the main scalability ceiling of the scoring core; an order-statistics
//! index keyed by score would keep the same ranks at O(log N) per update.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::db::LeaderboardStore;
use crate::error::ScoringError;
use crate::models::{LeaderboardEntry, Season};

/// Ranks shown on each side of a user in [`UserRank::nearby`].
pub const RANK_WINDOW: u32 = 2;

/// Shared per-season writer locks.
pub type SeasonLocks = Arc<DashMap<Season, Arc<Mutex<()>>>>;

/// Total order used for ranking: points desc, solved desc, user id asc.
fn rank_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.solved_challenges.cmp(&a.solved_challenges))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// A user's entry and the entries ranked close to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRank {
    pub entry: LeaderboardEntry,
    /// Entries within `RANK_WINDOW` ranks of the user, including the user,
    /// ascending by rank
    pub nearby: Vec<LeaderboardEntry>,
}

/// One season's leaderboard rows held in memory.
#[derive(Debug, Clone)]
pub struct SeasonBoard {
    season: Season,
    entries: Vec<LeaderboardEntry>,
}

impl SeasonBoard {
    pub fn new(season: Season, entries: Vec<LeaderboardEntry>) -> Self {
        Self { season, entries }
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Add `points_delta` to the user's entry, creating it if missing.
    ///
    /// Fails with `SeasonMismatch` if `season` is not this board's season.
    pub fn record_score(
        &mut self,
        user_id: &str,
        season: Season,
        points_delta: u64,
        now: DateTime<Utc>,
    ) -> Result<&mut LeaderboardEntry, ScoringError> {
        if season != self.season {
            return Err(ScoringError::SeasonMismatch {
                expected: self.season,
                found: season,
            });
        }

        let index = match self.entries.iter().position(|e| e.user_id == user_id) {
            Some(index) => {
                let entry = &mut self.entries[index];
                entry.points = entry.points.saturating_add(points_delta);
                entry.last_active = now;
                index
            }
            None => {
                self.entries.push(LeaderboardEntry {
                    user_id: user_id.to_string(),
                    season,
                    points: points_delta,
                    rank: 0,
                    solved_challenges: 0,
                    streak: 0,
                    last_active: now,
                    applied_seq: 0,
                });
                self.entries.len() - 1
            }
        };

        Ok(&mut self.entries[index])
    }

    /// Sort the season and assign dense ranks `1..=N`.
    pub fn recompute_ranks(&mut self) {
        self.entries.sort_by(rank_order);
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.rank = index as u32 + 1;
        }
    }

    /// Whether the user's row already applied the credit with sequence `seq`.
    pub fn has_applied(&self, user_id: &str, seq: u64) -> bool {
        self.entries
            .iter()
            .any(|e| e.user_id == user_id && e.applied_seq >= seq)
    }

    /// The user's entry plus its neighbours. Requires a ranked board.
    pub fn user_rank(&self, user_id: &str) -> Option<UserRank> {
        let entry = self.entries.iter().find(|e| e.user_id == user_id)?.clone();
        let low = entry.rank.saturating_sub(RANK_WINDOW);
        let high = entry.rank + RANK_WINDOW;

        let mut nearby: Vec<LeaderboardEntry> = self
            .entries
            .iter()
            .filter(|e| e.rank >= low && e.rank <= high)
            .cloned()
            .collect();
        nearby.sort_by_key(|e| e.rank);

        Some(UserRank { entry, nearby })
    }

    /// The first `limit` entries by rank. Requires a ranked board.
    pub fn top(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut ranked = self.entries.clone();
        ranked.sort_by_key(|e| e.rank);
        ranked.truncate(limit);
        ranked
    }
}

/// One score change for a user in a season.
#[derive(Debug, Clone)]
pub struct ScoreUpdate {
    pub user_id: String,
    pub season: Season,
    pub points_delta: u64,
    /// Whether this update is for a solved challenge
    pub solved: bool,
    /// The user's current streak, stored on the entry
    pub streak: u32,
    pub at: DateTime<Utc>,
    /// Sequence of a queued per-user credit. Sequenced updates are applied
    /// at most once per row, so replaying them is safe.
    pub seq: Option<u64>,
}

/// Leaderboard access with per-season write serialization.
#[derive(Clone)]
pub struct LeaderboardRanker {
    store: Arc<dyn LeaderboardStore>,
    season_locks: SeasonLocks,
}

impl LeaderboardRanker {
    pub fn new(store: Arc<dyn LeaderboardStore>) -> Self {
        Self {
            store,
            season_locks: Arc::new(DashMap::new()),
        }
    }

    fn season_lock(&self, season: Season) -> Arc<Mutex<()>> {
        self.season_locks
            .entry(season)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Apply a score change and re-rank the season as one serialized unit.
    ///
    /// Returns the user's entry with its new rank.
    pub async fn record_score(&self, update: ScoreUpdate) -> Result<LeaderboardEntry, ScoringError> {
        let lock = self.season_lock(update.season);
        let _guard = lock.lock().await;

        let mut board = SeasonBoard::new(
            update.season,
            self.store.load_season(update.season).await?,
        );

        let already_applied = update
            .seq
            .is_some_and(|seq| board.has_applied(&update.user_id, seq));

        if already_applied {
            tracing::debug!(
                user_id = %update.user_id,
                season = %update.season,
                seq = ?update.seq,
                "Credit already applied, skipping"
            );
        } else {
            let entry = board.record_score(
                &update.user_id,
                update.season,
                update.points_delta,
                update.at,
            )?;
            if update.solved {
                entry.solved_challenges = entry.solved_challenges.saturating_add(1);
            }
            entry.streak = update.streak;
            if let Some(seq) = update.seq {
                entry.applied_seq = seq;
            }

            board.recompute_ranks();
            self.commit(&board).await?;
        }

        let entry = board
            .entries()
            .iter()
            .find(|e| e.user_id == update.user_id)
            .cloned()
            .ok_or_else(|| ScoringError::RankRecomputeFailure {
                season: update.season,
                reason: format!("entry for {} missing after re-rank", update.user_id),
            })?;

        tracing::info!(
            user_id = %entry.user_id,
            season = %entry.season,
            points = entry.points,
            rank = entry.rank,
            "Leaderboard updated"
        );
        Ok(entry)
    }

    /// Re-rank a season without changing any scores.
    pub async fn recompute_ranks(&self, season: Season) -> Result<(), ScoringError> {
        let lock = self.season_lock(season);
        let _guard = lock.lock().await;

        let mut board = SeasonBoard::new(season, self.store.load_season(season).await?);
        board.recompute_ranks();
        self.commit(&board).await?;

        tracing::info!(%season, entries = board.entries().len(), "Season re-ranked");
        Ok(())
    }

    /// The user's standing and neighbours, or `None` if the user has no
    /// entry in the season.
    pub async fn get_user_rank(
        &self,
        user_id: &str,
        season: Season,
    ) -> Result<Option<UserRank>, ScoringError> {
        let board = SeasonBoard::new(season, self.store.load_season(season).await?);
        Ok(board.user_rank(user_id))
    }

    /// Leading entries of a season.
    pub async fn top(
        &self,
        season: Season,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, ScoringError> {
        let board = SeasonBoard::new(season, self.store.load_season(season).await?);
        Ok(board.top(limit))
    }

    async fn commit(&self, board: &SeasonBoard) -> Result<(), ScoringError> {
        self.store
            .save_season(board.season(), board.entries())
            .await
            .map_err(|e| {
                tracing::error!(season = %board.season(), error = %e, "Failed to commit ranks");
                match e {
                    ScoringError::SeasonMismatch { .. } => e,
                    other => ScoringError::RankRecomputeFailure {
                        season: board.season(),
                        reason: other.to_string(),
                    },
                }
            })
    }
}
