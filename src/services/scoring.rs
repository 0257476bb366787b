// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scoring orchestration.
//!
//! Handles a submission end to end:
//! 1. Compute points with the user's streak as it stood before the activity
//! 2. Apply the points and advance the streak (may unlock milestones)
//! 3. Persist the user's stats together with a queued leaderboard credit
//! 4. Commit every queued credit to its season leaderboard and re-rank
//!
//! Steps 1-3 hold the user's lock; step 4 additionally takes the season's
//! lock inside [`LeaderboardRanker`]. Locks are always acquired user first,
//! then season.
//!
//! Once step 3 succeeds the submission counts. If a season commit fails, the
//! credit stays queued on the stored stats and is replayed by the user's next
//! submission or by [`ScoringService::reconcile`]. Each credit carries a
//! per-user sequence number that the season row remembers, so a replay never
//! credits the same points twice.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::db::{LeaderboardStore, UserStatStore};
use crate::error::ScoringError;
use crate::models::{ChallengeInfo, LeaderboardEntry, Season, UserStat};
use crate::services::achievements::{self, AchievementProgress, AchievementSummary};
use crate::services::badges::{self, BadgeProgress, BadgeSummary};
use crate::services::catalog::Catalog;
use crate::services::leaderboard::{LeaderboardRanker, ScoreUpdate, UserRank};
use crate::services::points::{points_breakdown, PointsBreakdown};
use crate::services::streak::{record_activity, StreakUpdate};
use crate::time_utils::format_utc_rfc3339;

/// Shared per-user writer locks.
pub type UserLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// A successful challenge submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub challenge: ChallengeInfo,
    pub execution_time: Duration,
    /// Successful submissions for this challenge before this one
    pub prior_submission_count: u32,
    pub submitted_at: DateTime<Utc>,
}

/// Everything a submission changed.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreOutcome {
    pub season: Season,
    pub points: PointsBreakdown,
    pub streak: StreakUpdate,
    /// Submission points plus milestone rewards
    pub points_awarded: u64,
    pub total_points: u64,
    /// `None` when the season commit failed and the credit is still queued
    pub leaderboard: Option<LeaderboardEntry>,
}

/// Result of committing a user's queued credits.
struct Flush {
    /// Committed credits as `(seq, entry)`, oldest first
    committed: Vec<(u64, LeaderboardEntry)>,
    failure: Option<ScoringError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementReport {
    pub achievements_progress: Vec<AchievementProgress>,
    pub stats: AchievementSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct BadgeReport {
    pub badges_progress: Vec<BadgeProgress>,
    pub stats: BadgeSummary,
}

/// Entry point for the surrounding controller layer.
#[derive(Clone)]
pub struct ScoringService {
    stats: Arc<dyn UserStatStore>,
    leaderboard: LeaderboardRanker,
    catalog: Arc<Catalog>,
    user_locks: UserLocks,
}

impl ScoringService {
    pub fn new(
        stats: Arc<dyn UserStatStore>,
        leaderboard: Arc<dyn LeaderboardStore>,
        catalog: Catalog,
    ) -> Self {
        Self {
            stats,
            leaderboard: LeaderboardRanker::new(leaderboard),
            catalog: Arc::new(catalog),
            user_locks: Arc::new(DashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn leaderboard(&self) -> &LeaderboardRanker {
        &self.leaderboard
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn load_or_new(&self, user_id: &str) -> Result<UserStat, ScoringError> {
        Ok(self
            .stats
            .load(user_id)
            .await?
            .unwrap_or_else(|| UserStat::new(user_id)))
    }

    /// Current stats for a user; a user who never scored gets empty stats.
    pub async fn get_stats(&self, user_id: &str) -> Result<UserStat, ScoringError> {
        self.load_or_new(user_id).await
    }

    /// Score a successful submission.
    ///
    /// If the submission is dated before the user's last activity, nothing is
    /// written and `InvalidActivityDate` is returned. Any error is returned
    /// before the stats are saved; after that the submission is recorded and
    /// leaderboard trouble only leaves the credit queued.
    pub async fn submit(
        &self,
        user_id: &str,
        submission: Submission,
    ) -> Result<ScoreOutcome, ScoringError> {
        // Resolve the season once so a quarter boundary crossed mid-flight
        // cannot split this event across two seasons.
        let season = Season::at(submission.submitted_at);

        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let mut stat = self.load_or_new(user_id).await?;

        let points = points_breakdown(
            &submission.challenge,
            submission.execution_time,
            submission.prior_submission_count,
            stat.streak.current,
        );
        stat.record_success(points.total);
        let streak = record_activity(&mut stat, submission.submitted_at)?;

        let points_awarded = points.total.saturating_add(streak.bonus_points());
        let seq = stat.queue_score(
            season,
            points_awarded,
            streak.current_streak,
            submission.submitted_at,
        );
        stat.updated_at = format_utc_rfc3339(Utc::now());

        self.stats.save(&stat).await?;

        let flush = self.flush_pending(&mut stat).await;
        let leaderboard = flush
            .committed
            .into_iter()
            .find(|(committed, _)| *committed == seq)
            .map(|(_, entry)| entry);

        match &leaderboard {
            Some(entry) => tracing::info!(
                user_id,
                %season,
                points = points.total,
                milestone_bonus = streak.bonus_points(),
                streak = streak.current_streak,
                rank = entry.rank,
                "Submission scored"
            ),
            None => tracing::warn!(
                user_id,
                %season,
                seq,
                points = points.total,
                queued = stat.pending_scores.len(),
                "Submission scored, leaderboard credit queued"
            ),
        }

        Ok(ScoreOutcome {
            season,
            points,
            points_awarded,
            total_points: stat.total_points,
            streak,
            leaderboard,
        })
    }

    /// Commit the user's queued leaderboard credits, replaying any left over
    /// from earlier failures.
    ///
    /// Returns the entries for the committed credits. Fails with the first
    /// commit error; credits from that one on stay queued.
    pub async fn reconcile(&self, user_id: &str) -> Result<Vec<LeaderboardEntry>, ScoringError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let Some(mut stat) = self.stats.load(user_id).await? else {
            return Ok(Vec::new());
        };
        if stat.pending_scores.is_empty() {
            return Ok(Vec::new());
        }

        let flush = self.flush_pending(&mut stat).await;
        match flush.failure {
            Some(err) => Err(err),
            None => Ok(flush.committed.into_iter().map(|(_, entry)| entry).collect()),
        }
    }

    /// Commit queued credits oldest first, stopping at the first failure,
    /// then save the stats without the committed ones.
    ///
    /// The caller must hold the user's lock.
    async fn flush_pending(&self, stat: &mut UserStat) -> Flush {
        let mut committed = Vec::new();
        let mut failure = None;

        for pending in &stat.pending_scores {
            let update = ScoreUpdate {
                user_id: stat.user_id.clone(),
                season: pending.season,
                points_delta: pending.points,
                solved: true,
                streak: pending.streak,
                at: pending.at,
                seq: Some(pending.seq),
            };
            match self.leaderboard.record_score(update).await {
                Ok(entry) => committed.push((pending.seq, entry)),
                Err(err) => {
                    tracing::warn!(
                        user_id = %stat.user_id,
                        season = %pending.season,
                        seq = pending.seq,
                        error = %err,
                        "Leaderboard credit left queued"
                    );
                    failure = Some(err);
                    break;
                }
            }
        }

        if !committed.is_empty() {
            stat.pending_scores.drain(..committed.len());
            stat.updated_at = format_utc_rfc3339(Utc::now());
            // A failed save only leaves applied credits queued; replaying them
            // is a no-op.
            if let Err(err) = self.stats.save(stat).await {
                tracing::warn!(
                    user_id = %stat.user_id,
                    error = %err,
                    "Failed to clear committed leaderboard credits"
                );
                failure.get_or_insert(err);
            }
        }

        Flush { committed, failure }
    }

    /// Count a submission that did not solve the challenge.
    pub async fn record_failed_submission(&self, user_id: &str) -> Result<UserStat, ScoringError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let mut stat = self.load_or_new(user_id).await?;
        stat.record_failure();
        stat.updated_at = format_utc_rfc3339(Utc::now());
        self.stats.save(&stat).await?;

        tracing::debug!(user_id, success_rate = stat.success_rate, "Failed submission recorded");
        Ok(stat)
    }

    pub async fn evaluate_achievements(
        &self,
        user_id: &str,
    ) -> Result<AchievementReport, ScoringError> {
        let stat = self.load_or_new(user_id).await?;
        let catalog = self.catalog.achievements();
        Ok(AchievementReport {
            achievements_progress: achievements::evaluate_achievements(&stat, catalog),
            stats: achievements::summarize_achievements(&stat, catalog),
        })
    }

    /// Grant an achievement; `Ok(false)` if the user already had it.
    pub async fn award_achievement(
        &self,
        user_id: &str,
        achievement_id: &str,
    ) -> Result<bool, ScoringError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let mut stat = self.load_or_new(user_id).await?;
        let granted = achievements::award_achievement(
            &mut stat,
            self.catalog.achievements(),
            achievement_id,
            Utc::now(),
        )?;
        if granted {
            stat.updated_at = format_utc_rfc3339(Utc::now());
            self.stats.save(&stat).await?;
        }
        Ok(granted)
    }

    pub async fn evaluate_badges(&self, user_id: &str) -> Result<BadgeReport, ScoringError> {
        let stat = self.load_or_new(user_id).await?;
        let catalog = self.catalog.badges();
        Ok(BadgeReport {
            badges_progress: badges::evaluate_badges(&stat, catalog, Utc::now()),
            stats: badges::summarize_badges(&stat, catalog),
        })
    }

    /// Grant a badge; `Ok(false)` if the user already had it.
    pub async fn award_badge(&self, user_id: &str, badge_id: &str) -> Result<bool, ScoringError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let mut stat = self.load_or_new(user_id).await?;
        let granted = badges::award_badge(&mut stat, self.catalog.badges(), badge_id, Utc::now())?;
        if granted {
            stat.updated_at = format_utc_rfc3339(Utc::now());
            self.stats.save(&stat).await?;
        }
        Ok(granted)
    }

    pub async fn get_user_rank(
        &self,
        user_id: &str,
        season: Season,
    ) -> Result<Option<UserRank>, ScoringError> {
        self.leaderboard.get_user_rank(user_id, season).await
    }

    pub async fn recompute_ranks(&self, season: Season) -> Result<(), ScoringError> {
        self.leaderboard.recompute_ranks(season).await
    }
}
