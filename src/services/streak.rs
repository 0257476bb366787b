// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily-activity streak tracking.
//!
//! Each call to [`record_activity`] is one transition of the per-user streak
//! state machine:
//! 1. Normalize the activity to a UTC calendar day
//! 2. Extend, keep, or break the current streak based on the day gap
//! 3. Unlock any streak milestone reached for the first time
//! 4. Remember the activity day
//!
//! Callers must hold the user's exclusive lock while calling this.

use chrono::{DateTime, Days, Utc};
use serde::Serialize;

use crate::error::ScoringError;
use crate::models::{MilestoneReward, StreakHistoryEntry, StreakMilestone, UserStat};
use crate::time_utils::{calendar_day, days_between};

pub use crate::services::points::calculate_streak_bonus;

/// Reason recorded when a streak ends because a day was skipped.
pub const BREAK_MISSED_DAY: &str = "missed_day";

/// A streak length that unlocks a one-time reward.
#[derive(Debug, Clone, Copy)]
pub struct MilestoneSpec {
    pub days: u32,
    pub points: u64,
    pub badge_ref: &'static str,
}

/// Streak milestones in ascending order.
pub const STREAK_MILESTONES: [MilestoneSpec; 5] = [
    MilestoneSpec {
        days: 3,
        points: 30,
        badge_ref: "three_day_streak",
    },
    MilestoneSpec {
        days: 7,
        points: 100,
        badge_ref: "week_warrior",
    },
    MilestoneSpec {
        days: 14,
        points: 250,
        badge_ref: "two_week_master",
    },
    MilestoneSpec {
        days: 30,
        points: 1000,
        badge_ref: "monthly_champion",
    },
    MilestoneSpec {
        days: 100,
        points: 5000,
        badge_ref: "streak_legend",
    },
];

/// Outcome of one streak transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakUpdate {
    pub previous_streak: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// The streak that ended, if this activity broke one
    pub broken: Option<StreakHistoryEntry>,
    /// Milestones unlocked by this activity
    pub milestones: Vec<StreakMilestone>,
}

impl StreakUpdate {
    /// Points added to `total_points` by newly unlocked milestones.
    pub fn bonus_points(&self) -> u64 {
        self.milestones.iter().map(|m| m.reward.points).sum()
    }
}

/// Record a qualifying activity at `activity_at`.
///
/// Repeat activity on the same calendar day leaves the streak unchanged.
/// Activity dated before the last recorded day is rejected without touching
/// any state.
pub fn record_activity(
    stat: &mut UserStat,
    activity_at: DateTime<Utc>,
) -> Result<StreakUpdate, ScoringError> {
    let today = calendar_day(activity_at);
    let streak = &mut stat.streak;
    let previous_streak = streak.current;
    let mut broken = None;

    match streak.last_activity_date {
        None => {
            streak.current = 1;
            streak.longest = streak.longest.max(1);
        }
        Some(last) => match days_between(last, today) {
            gap if gap < 0 => {
                tracing::warn!(
                    user_id = %stat.user_id,
                    %last,
                    attempted = %today,
                    "Rejected activity dated before last activity"
                );
                return Err(ScoringError::InvalidActivityDate {
                    last,
                    attempted: today,
                });
            }
            0 => {
                tracing::debug!(user_id = %stat.user_id, %today, "Same-day activity, streak unchanged");
            }
            1 => {
                streak.current += 1;
                streak.longest = streak.longest.max(streak.current);
            }
            _ => {
                if streak.current > 0 {
                    let start_date = last
                        .checked_sub_days(Days::new(u64::from(streak.current - 1)))
                        .unwrap_or(last);
                    let entry = StreakHistoryEntry {
                        start_date,
                        end_date: last,
                        duration: streak.current,
                        break_reason: BREAK_MISSED_DAY.to_string(),
                    };
                    streak.streak_history.push(entry.clone());
                    broken = Some(entry);
                }
                tracing::info!(
                    user_id = %stat.user_id,
                    ended_streak = streak.current,
                    %last,
                    %today,
                    "Streak broken"
                );
                streak.current = 1;
                streak.longest = streak.longest.max(1);
            }
        },
    }

    let milestones = unlock_milestones(stat, activity_at);
    stat.streak.last_activity_date = Some(today);

    Ok(StreakUpdate {
        previous_streak,
        current_streak: stat.streak.current,
        longest_streak: stat.streak.longest,
        broken,
        milestones,
    })
}

/// Append milestones reached by the current streak that were never recorded,
/// crediting their points.
fn unlock_milestones(stat: &mut UserStat, now: DateTime<Utc>) -> Vec<StreakMilestone> {
    let current = stat.streak.current;
    let mut unlocked = Vec::new();

    for spec in STREAK_MILESTONES.iter().filter(|m| m.days == current) {
        let already_achieved = stat
            .streak
            .streak_milestones
            .iter()
            .any(|m| m.days == spec.days);
        if already_achieved {
            continue;
        }

        let milestone = StreakMilestone {
            days: spec.days,
            achieved_at: now,
            reward: MilestoneReward {
                points: spec.points,
                badge_ref: spec.badge_ref.to_string(),
            },
        };
        stat.total_points = stat.total_points.saturating_add(spec.points);
        stat.streak.streak_milestones.push(milestone.clone());

        tracing::info!(
            user_id = %stat.user_id,
            days = spec.days,
            points = spec.points,
            badge = spec.badge_ref,
            "Streak milestone unlocked"
        );
        unlocked.push(milestone);
    }

    unlocked
}
