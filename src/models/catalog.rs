// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Achievement and badge catalog entries.
//!
//! Catalog entries are managed by admins elsewhere; the scoring core only
//! reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// An achievement users can unlock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Free-form grouping (e.g., "Streak", "Milestone")
    #[serde(default)]
    pub category: String,
    pub criteria: Criteria,
    #[serde(default = "default_achievement_points")]
    pub points: u64,
    #[serde(default)]
    pub rarity: Rarity,
}

fn default_achievement_points() -> u64 {
    10
}

/// What an achievement measures and the value needed to complete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Criteria {
    #[serde(rename = "type")]
    pub kind: CriteriaType,
    pub threshold: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum CriteriaType {
    ChallengesCompleted,
    PointsEarned,
    StreakDays,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

/// A badge earned by meeting a combination of requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Badge {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tier: BadgeTier,
    #[serde(default)]
    pub requirements: BadgeRequirements,
    #[serde(default)]
    pub bonus_points: u64,
    #[serde(default)]
    pub is_limited: bool,
    /// End of availability for limited badges
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Badge {
    /// Whether the badge can currently be evaluated and awarded.
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        match self.valid_until {
            Some(until) if self.is_limited => now <= until,
            _ => true,
        }
    }
}

/// Requirement categories; empty or zero categories are not requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BadgeRequirements {
    #[serde(default)]
    pub achievement_ids: Vec<String>,
    #[serde(default)]
    pub points_required: u64,
    #[serde(default)]
    pub challenges_required: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum BadgeTier {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}
