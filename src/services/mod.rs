// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - scoring logic layer.

pub mod achievements;
pub mod badges;
pub mod catalog;
pub mod leaderboard;
pub mod points;
pub mod scoring;
pub mod streak;

pub use achievements::{award_achievement, evaluate_achievements};
pub use badges::{award_badge, evaluate_badges};
pub use catalog::{Catalog, CatalogError};
pub use leaderboard::{LeaderboardRanker, SeasonBoard, UserRank};
pub use points::{calculate_streak_bonus, compute_points};
pub use scoring::{ScoreOutcome, ScoringService, Submission};
pub use streak::{record_activity, StreakUpdate};
