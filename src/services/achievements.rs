// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Achievement progress and awarding.
//!
//! Evaluation only reports progress; it never unlocks anything. Unlocking is
//! the explicit, idempotent [`award_achievement`] call.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ScoringError;
use crate::models::{Achievement, AwardKind, CriteriaType, UserStat};

/// Progress of one user towards one achievement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementProgress {
    pub achievement: Achievement,
    pub unlocked: bool,
    /// Percentage in `[0, 100]`
    pub progress: f64,
}

/// Totals over the achievements a user owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementSummary {
    pub total_achievements: usize,
    pub total_points: u64,
}

/// Percentage of `value` towards `threshold`, clamped to `[0, 100]`.
pub(crate) fn percent(value: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        return 100.0;
    }
    (value * 100.0 / threshold).clamp(0.0, 100.0)
}

/// Progress towards a single achievement.
pub fn achievement_progress(stat: &UserStat, achievement: &Achievement) -> f64 {
    let value = match achievement.criteria.kind {
        CriteriaType::ChallengesCompleted => f64::from(stat.challenges_completed),
        CriteriaType::PointsEarned => stat.total_points as f64,
        CriteriaType::StreakDays => f64::from(stat.streak.longest),
    };
    percent(value, achievement.criteria.threshold as f64)
}

/// Progress for every achievement in the catalog.
pub fn evaluate_achievements(stat: &UserStat, catalog: &[Achievement]) -> Vec<AchievementProgress> {
    catalog
        .iter()
        .map(|achievement| AchievementProgress {
            achievement: achievement.clone(),
            unlocked: stat.owns(AwardKind::Achievement, &achievement.id),
            progress: achievement_progress(stat, achievement),
        })
        .collect()
}

/// Count and point total of owned achievements still present in the catalog.
pub fn summarize_achievements(stat: &UserStat, catalog: &[Achievement]) -> AchievementSummary {
    let owned: Vec<&Achievement> = catalog
        .iter()
        .filter(|a| stat.owns(AwardKind::Achievement, &a.id))
        .collect();
    AchievementSummary {
        total_achievements: owned.len(),
        total_points: owned.iter().map(|a| a.points).sum(),
    }
}

/// Grant an achievement to the user.
///
/// Returns `true` if newly awarded, `false` if the user already owned it.
pub fn award_achievement(
    stat: &mut UserStat,
    catalog: &[Achievement],
    achievement_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, ScoringError> {
    if !catalog.iter().any(|a| a.id == achievement_id) {
        return Err(ScoringError::UnknownAchievement(achievement_id.to_string()));
    }

    let granted = stat.grant(AwardKind::Achievement, achievement_id, now);
    if granted {
        tracing::info!(user_id = %stat.user_id, achievement_id, "Achievement awarded");
    } else {
        tracing::debug!(user_id = %stat.user_id, achievement_id, "Achievement already owned");
    }
    Ok(granted)
}
