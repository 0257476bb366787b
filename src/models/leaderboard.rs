// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Season-scoped leaderboard rows.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Quarter-based leaderboard partition, encoded as `year * 100 + quarter`.
///
/// The quarter is `month0 / 3 + 1` with a zero-based month, so January 2025
/// is `202501` and December 2025 is `202504`. Persisted leaderboard rows are
/// keyed by this exact integer, and deserialization applies the same
/// validation as [`Season::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Season(i32);

impl Season {
    /// Season containing the given calendar day.
    pub fn from_date(date: NaiveDate) -> Self {
        let quarter = date.month0() / 3 + 1;
        Self(date.year() * 100 + quarter as i32)
    }

    /// Season containing the given instant (UTC).
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self::from_date(instant.date_naive())
    }

    pub fn year(self) -> i32 {
        self.0.div_euclid(100)
    }

    pub fn quarter(self) -> u32 {
        self.0.rem_euclid(100) as u32
    }

    /// Raw integer key.
    pub fn id(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Season {
    type Error = InvalidSeason;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if (1..=4).contains(&value.rem_euclid(100)) && value > 0 {
            Ok(Self(value))
        } else {
            Err(InvalidSeason(value))
        }
    }
}

impl From<Season> for i32 {
    fn from(season: Season) -> Self {
        season.0
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid season identifier: {0} (expected YYYYQ with quarter 1-4)")]
pub struct InvalidSeason(pub i32);

/// One user's standing within one season.
///
/// Stored as a row of the season document `leaderboard/{season}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub season: Season,
    pub points: u64,
    /// 1-based position; 0 only before the first re-rank
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub solved_challenges: u32,
    /// Current streak at the time of the last update
    #[serde(default)]
    pub streak: u32,
    pub last_active: DateTime<Utc>,
    /// Last per-user credit sequence applied to this row
    #[serde(default)]
    pub applied_seq: u64,
}
