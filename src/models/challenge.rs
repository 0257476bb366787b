// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge data consumed by the scoring core.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The parts of a challenge that affect scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeInfo {
    /// Base points for solving the challenge
    pub points: u64,
    /// Typical solve time; faster submissions earn a speed bonus
    #[serde(rename = "average_completion_time_ms", with = "duration_ms")]
    pub average_completion_time: Duration,
}

/// Serialize a `Duration` as whole milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
