// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes exposing the scoring core to the controller layer.
//!
//! Authentication happens upstream; handlers trust the `user_id` path segment.

use crate::error::{AppError, Result};
use crate::models::{ChallengeInfo, LeaderboardEntry, Season, UserStat};
use crate::services::leaderboard::UserRank;
use crate::services::scoring::{AchievementReport, BadgeReport, ScoreOutcome, Submission};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_LEADERBOARD_LIMIT: usize = 50;
const MAX_LEADERBOARD_LIMIT: usize = 100;

/// API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/{user_id}/submissions", post(submit))
        .route("/api/users/{user_id}/stats", get(get_stats))
        .route("/api/users/{user_id}/reconcile", post(reconcile))
        .route("/api/users/{user_id}/achievements", get(get_achievements))
        .route(
            "/api/users/{user_id}/achievements/{achievement_id}",
            post(award_achievement),
        )
        .route("/api/users/{user_id}/badges", get(get_badges))
        .route("/api/users/{user_id}/badges/{badge_id}", post(award_badge))
        .route("/api/leaderboard/{season}", get(get_leaderboard))
        .route(
            "/api/leaderboard/{season}/users/{user_id}",
            get(get_user_rank),
        )
}

fn parse_season(raw: i32) -> Result<Season> {
    Season::try_from(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

// ─── Submissions ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    pub challenge: ChallengeInfo,
    #[serde(default)]
    pub execution_time_ms: u64,
    #[serde(default)]
    pub prior_submission_count: u32,
    /// Whether the submission solved the challenge
    #[serde(default = "default_solved")]
    pub solved: bool,
    /// Defaults to the time the request is handled
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

fn default_solved() -> bool {
    true
}

#[derive(Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SubmissionResponse {
    Scored(ScoreOutcome),
    Attempted {
        submissions_attempted: u32,
        success_rate: f64,
    },
}

/// Score a submission, or count a failed attempt.
async fn submit(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<SubmissionRequest>,
) -> Result<Json<SubmissionResponse>> {
    if !req.solved {
        let stat = state.scoring.record_failed_submission(&user_id).await?;
        return Ok(Json(SubmissionResponse::Attempted {
            submissions_attempted: stat.submissions_attempted,
            success_rate: stat.success_rate,
        }));
    }

    let submission = Submission {
        challenge: req.challenge,
        execution_time: Duration::from_millis(req.execution_time_ms),
        prior_submission_count: req.prior_submission_count,
        submitted_at: req.submitted_at.unwrap_or_else(Utc::now),
    };

    let outcome = state.scoring.submit(&user_id, submission).await?;
    Ok(Json(SubmissionResponse::Scored(outcome)))
}

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStat>> {
    Ok(Json(state.scoring.get_stats(&user_id).await?))
}

/// Commit leaderboard credits left queued by earlier failures.
async fn reconcile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    Ok(Json(state.scoring.reconcile(&user_id).await?))
}

// ─── Achievements & Badges ───────────────────────────────────

#[derive(Serialize)]
pub struct AwardResponse {
    /// `false` when the user already owned the item
    pub awarded: bool,
}

async fn get_achievements(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<AchievementReport>> {
    Ok(Json(state.scoring.evaluate_achievements(&user_id).await?))
}

async fn award_achievement(
    State(state): State<Arc<AppState>>,
    Path((user_id, achievement_id)): Path<(String, String)>,
) -> Result<Json<AwardResponse>> {
    let awarded = state
        .scoring
        .award_achievement(&user_id, &achievement_id)
        .await?;
    Ok(Json(AwardResponse { awarded }))
}

async fn get_badges(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<BadgeReport>> {
    Ok(Json(state.scoring.evaluate_badges(&user_id).await?))
}

async fn award_badge(
    State(state): State<Arc<AppState>>,
    Path((user_id, badge_id)): Path<(String, String)>,
) -> Result<Json<AwardResponse>> {
    let awarded = state.scoring.award_badge(&user_id, &badge_id).await?;
    Ok(Json(AwardResponse { awarded }))
}

// ─── Leaderboard ─────────────────────────────────────────────

#[derive(Deserialize)]
struct LeaderboardQuery {
    limit: Option<usize>,
}

async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Path(season): Path<i32>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    let season = parse_season(season)?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .min(MAX_LEADERBOARD_LIMIT);

    Ok(Json(state.scoring.leaderboard().top(season, limit).await?))
}

async fn get_user_rank(
    State(state): State<Arc<AppState>>,
    Path((season, user_id)): Path<(i32, String)>,
) -> Result<Json<UserRank>> {
    let season = parse_season(season)?;
    let rank = state
        .scoring
        .get_user_rank(&user_id, season)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("User {} has no entry in season {}", user_id, season))
        })?;
    Ok(Json(rank))
}
