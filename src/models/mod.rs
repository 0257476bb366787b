// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the scoring core.

pub mod catalog;
pub mod challenge;
pub mod leaderboard;
pub mod stats;

pub use catalog::{
    Achievement, Badge, BadgeRequirements, BadgeTier, Criteria, CriteriaType, Rarity,
};
pub use challenge::ChallengeInfo;
pub use leaderboard::{LeaderboardEntry, Season};
pub use stats::{
    AwardKind, AwardRecord, MilestoneReward, PendingScore, StreakHistoryEntry, StreakMilestone,
    StreakState, UserStat,
};
