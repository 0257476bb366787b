// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user gamification statistics.
//!
//! A `UserStat` is the single aggregate document owned by a user. It is
//! mutated only by explicit state-transition calls (streak tracking, point
//! application, awards) and written back as a whole by the scoring service.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::leaderboard::Season;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Aggregated statistics for a single user.
///
/// Stored at: `user_stats/{user_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserStat {
    pub user_id: String,

    // ─── Scoring ─────────────────────────────────────────────────
    /// Lifetime points, including streak milestone rewards
    #[serde(default)]
    pub total_points: u64,
    /// Number of successful challenge submissions
    #[serde(default)]
    pub challenges_completed: u32,
    /// Number of submissions attempted, successful or not
    #[serde(default)]
    pub submissions_attempted: u32,
    /// `challenges_completed / submissions_attempted`, 0 when nothing attempted
    #[serde(default)]
    pub success_rate: f64,

    // ─── Streak ──────────────────────────────────────────────────
    #[serde(default)]
    pub streak: StreakState,

    // ─── Awards ──────────────────────────────────────────────────
    /// Achievements and badges owned by the user (append-only)
    #[serde(default)]
    pub awards: Vec<AwardRecord>,

    // ─── Leaderboard hand-off ────────────────────────────────────
    /// Leaderboard credits saved with these stats but not yet committed to
    /// their season, oldest first
    #[serde(default)]
    pub pending_scores: Vec<PendingScore>,
    /// Last sequence number handed out by [`UserStat::queue_score`]
    #[serde(default)]
    pub score_seq: u64,

    // ─── Metadata ────────────────────────────────────────────────
    /// Last update timestamp (ISO 8601)
    #[serde(default)]
    pub updated_at: String,
}

impl UserStat {
    /// Fresh statistics for a user that has never scored.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_points: 0,
            challenges_completed: 0,
            submissions_attempted: 0,
            success_rate: 0.0,
            streak: StreakState::default(),
            awards: Vec::new(),
            pending_scores: Vec::new(),
            score_seq: 0,
            updated_at: String::new(),
        }
    }

    /// Apply a successful submission worth `points`.
    pub fn record_success(&mut self, points: u64) {
        self.total_points = self.total_points.saturating_add(points);
        self.challenges_completed = self.challenges_completed.saturating_add(1);
        self.submissions_attempted = self.submissions_attempted.saturating_add(1);
        self.refresh_success_rate();
    }

    /// Apply a submission that did not solve the challenge.
    pub fn record_failure(&mut self) {
        self.submissions_attempted = self.submissions_attempted.saturating_add(1);
        self.refresh_success_rate();
    }

    /// Queue a leaderboard credit for a solved challenge.
    ///
    /// The credit is persisted with the stats and removed once its season
    /// has committed it. Returns the credit's sequence number.
    pub fn queue_score(
        &mut self,
        season: Season,
        points: u64,
        streak: u32,
        at: DateTime<Utc>,
    ) -> u64 {
        self.score_seq += 1;
        self.pending_scores.push(PendingScore {
            seq: self.score_seq,
            season,
            points,
            streak,
            at,
        });
        self.score_seq
    }

    fn refresh_success_rate(&mut self) {
        self.success_rate = if self.submissions_attempted == 0 {
            0.0
        } else {
            f64::from(self.challenges_completed) / f64::from(self.submissions_attempted)
        };
    }

    /// Whether the user owns the given catalog item.
    pub fn owns(&self, kind: AwardKind, catalog_id: &str) -> bool {
        self.awards
            .iter()
            .any(|a| a.kind == kind && a.catalog_id == catalog_id)
    }

    /// Record ownership of a catalog item.
    ///
    /// Returns `true` if the award is new, `false` if it was already owned.
    pub fn grant(&mut self, kind: AwardKind, catalog_id: &str, now: DateTime<Utc>) -> bool {
        if self.owns(kind, catalog_id) {
            return false;
        }
        self.awards.push(AwardRecord {
            kind,
            catalog_id: catalog_id.to_string(),
            awarded_at: now,
        });
        true
    }
}

/// A leaderboard credit waiting to be committed to its season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PendingScore {
    /// Per-user sequence; a season row skips credits at or below the last
    /// sequence it applied
    pub seq: u64,
    pub season: Season,
    pub points: u64,
    pub streak: u32,
    pub at: DateTime<Utc>,
}

/// Daily-activity streak state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakState {
    #[serde(default)]
    pub current: u32,
    #[serde(default)]
    pub longest: u32,
    /// Calendar day (UTC) of the most recent qualifying activity
    #[serde(default)]
    pub last_activity_date: Option<NaiveDate>,
    /// Closed streaks, oldest first
    #[serde(default)]
    pub streak_history: Vec<StreakHistoryEntry>,
    /// Milestones reached, at most one per threshold
    #[serde(default)]
    pub streak_milestones: Vec<StreakMilestone>,
}

/// A streak that has ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakHistoryEntry {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: u32,
    pub break_reason: String,
}

/// A streak length threshold the user has reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakMilestone {
    pub days: u32,
    pub achieved_at: DateTime<Utc>,
    pub reward: MilestoneReward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MilestoneReward {
    pub points: u64,
    pub badge_ref: String,
}

/// Which catalog an award refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum AwardKind {
    Achievement,
    Badge,
}

/// Ownership of an achievement or badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AwardRecord {
    pub kind: AwardKind,
    pub catalog_id: String,
    pub awarded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_tracks_attempts() {
        let mut stat = UserStat::new("alice");
        assert_eq!(stat.success_rate, 0.0);

        stat.record_success(10);
        stat.record_failure();
        stat.record_failure();
        stat.record_success(20);

        assert_eq!(stat.total_points, 30);
        assert_eq!(stat.challenges_completed, 2);
        assert_eq!(stat.submissions_attempted, 4);
        assert_eq!(stat.success_rate, 0.5);
    }

    #[test]
    fn test_grant_is_idempotent() {
        let mut stat = UserStat::new("alice");
        let now = Utc::now();

        assert!(stat.grant(AwardKind::Achievement, "first_step", now));
        assert!(!stat.grant(AwardKind::Achievement, "first_step", now));
        assert_eq!(stat.awards.len(), 1);
    }

    #[test]
    fn test_award_kinds_are_separate_namespaces() {
        let mut stat = UserStat::new("alice");
        let now = Utc::now();

        stat.grant(AwardKind::Achievement, "shared_id", now);
        assert!(stat.owns(AwardKind::Achievement, "shared_id"));
        assert!(!stat.owns(AwardKind::Badge, "shared_id"));

        assert!(stat.grant(AwardKind::Badge, "shared_id", now));
        assert_eq!(stat.awards.len(), 2);
    }

    #[test]
    fn test_queue_score_numbers_credits_in_order() {
        let mut stat = UserStat::new("alice");
        let season = Season::try_from(202501).unwrap();
        let now = Utc::now();

        assert_eq!(stat.queue_score(season, 10, 1, now), 1);
        assert_eq!(stat.queue_score(season, 20, 2, now), 2);

        let seqs: Vec<u64> = stat.pending_scores.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![1, 2]);

        // Sequence numbers keep increasing after the queue drains
        stat.pending_scores.clear();
        assert_eq!(stat.queue_score(season, 5, 3, now), 3);
    }

    #[test]
    fn test_deserialize_sparse_document() {
        let stat: UserStat = serde_json::from_str(r#"{"user_id":"bob"}"#).unwrap();
        assert_eq!(stat, UserStat::new("bob"));
    }
}
