// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Point computation for successful submissions.
//!
//! The streak multiplier is kept in integer tenths so that rounding the
//! final score is exact rather than subject to float error. Challenge points
//! arrive from callers unchecked, so every step saturates at `u64::MAX`
//! instead of wrapping.

use crate::models::ChallengeInfo;
use serde::Serialize;
use std::time::Duration;

/// Flat bonus for beating the challenge's average completion time.
pub const SPEED_BONUS: u64 = 5;
/// Early-solver bonus is `EARLY_SOLVER_WINDOW - prior_submissions`.
pub const EARLY_SOLVER_WINDOW: u32 = 10;

const MULTIPLIER_BASE_TENTHS: u64 = 10;
const MULTIPLIER_CAP_TENTHS: u64 = 20;
const DAYS_PER_STEP: u32 = 7;

/// Streak multiplier in tenths: +0.1 per full week, capped at 2.0.
fn streak_multiplier_tenths(current_streak: u32) -> u64 {
    let weeks = u64::from(current_streak / DAYS_PER_STEP);
    (MULTIPLIER_BASE_TENTHS + weeks).min(MULTIPLIER_CAP_TENTHS)
}

/// Multiplier applied to a submission's points for the given streak length.
pub fn calculate_streak_bonus(current_streak: u32) -> f64 {
    streak_multiplier_tenths(current_streak) as f64 / 10.0
}

/// Each component of a points award.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointsBreakdown {
    pub base: u64,
    pub speed_bonus: u64,
    pub early_bonus: u64,
    pub streak_multiplier: f64,
    pub total: u64,
}

/// Compute the points awarded for a successful submission.
pub fn compute_points(
    challenge: &ChallengeInfo,
    execution_time: Duration,
    prior_submission_count: u32,
    current_streak: u32,
) -> u64 {
    points_breakdown(
        challenge,
        execution_time,
        prior_submission_count,
        current_streak,
    )
    .total
}

/// Like [`compute_points`], but reports every component.
pub fn points_breakdown(
    challenge: &ChallengeInfo,
    execution_time: Duration,
    prior_submission_count: u32,
    current_streak: u32,
) -> PointsBreakdown {
    let base = challenge.points;

    let speed_bonus = if execution_time < challenge.average_completion_time {
        SPEED_BONUS
    } else {
        0
    };

    let early_bonus = if prior_submission_count < EARLY_SOLVER_WINDOW {
        u64::from(EARLY_SOLVER_WINDOW - prior_submission_count)
    } else {
        0
    };

    let tenths = streak_multiplier_tenths(current_streak);
    let subtotal = base.saturating_add(speed_bonus).saturating_add(early_bonus);
    // Round half up, in u128 so that the product cannot overflow
    let scaled = (u128::from(subtotal) * u128::from(tenths) + 5) / 10;
    let total = u64::try_from(scaled).unwrap_or(u64::MAX);

    PointsBreakdown {
        base,
        speed_bonus,
        early_bonus,
        streak_multiplier: tenths as f64 / 10.0,
        total,
    }
}
