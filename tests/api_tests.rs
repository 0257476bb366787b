// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP API tests against the router with in-memory storage.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn submission(points: u64, submitted_at: &str) -> Value {
    json!({
        "challenge": { "points": points, "average_completion_time_ms": 1000 },
        "execution_time_ms": 500,
        "prior_submission_count": 3,
        "submitted_at": submitted_at
    })
}

#[tokio::test]
async fn test_health() {
    let (app, _) = common::create_test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_submit_and_rank() {
    let (app, _) = common::create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/alice/submissions",
        Some(submission(100, "2025-01-10T08:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "scored");
    // (100 + 5 + 7) * 1.0
    assert_eq!(body["points"]["total"], 112);
    assert_eq!(body["season"], 202501);
    assert_eq!(body["leaderboard"]["rank"], 1);

    send(
        &app,
        "POST",
        "/api/users/bob/submissions",
        Some(submission(200, "2025-01-10T09:00:00Z")),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/leaderboard/202501/users/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entry"]["rank"], 2);
    assert_eq!(body["nearby"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, "GET", "/api/leaderboard/202501?limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["user_id"], "bob");
}

#[tokio::test]
async fn test_oversized_challenge_points_saturate() {
    let (app, _) = common::create_test_app();
    let huge = u64::MAX / 10 + 1;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/alice/submissions",
        Some(submission(huge, "2025-01-10T08:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points"]["total"], huge + 12);

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/alice/submissions",
        Some(submission(u64::MAX, "2025-01-11T08:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points"]["total"], u64::MAX);
    assert_eq!(body["total_points"], u64::MAX);
    assert_eq!(body["leaderboard"]["points"], u64::MAX);
}

#[tokio::test]
async fn test_reconcile_with_nothing_queued() {
    let (app, _) = common::create_test_app();
    send(
        &app,
        "POST",
        "/api/users/alice/submissions",
        Some(submission(10, "2025-01-10T08:00:00Z")),
    )
    .await;

    let (status, body) = send(&app, "POST", "/api/users/alice/reconcile", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_failed_attempt_updates_success_rate() {
    let (app, _) = common::create_test_app();

    send(
        &app,
        "POST",
        "/api/users/alice/submissions",
        Some(submission(10, "2025-01-10T08:00:00Z")),
    )
    .await;

    let mut failed = submission(10, "2025-01-10T09:00:00Z");
    failed["solved"] = json!(false);
    let (status, body) = send(&app, "POST", "/api/users/alice/submissions", Some(failed)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "attempted");
    assert_eq!(body["submissions_attempted"], 2);
    assert_eq!(body["success_rate"], 0.5);
}

#[tokio::test]
async fn test_out_of_order_submission_rejected() {
    let (app, _) = common::create_test_app();

    send(
        &app,
        "POST",
        "/api/users/alice/submissions",
        Some(submission(10, "2025-01-10T08:00:00Z")),
    )
    .await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/users/alice/submissions",
        Some(submission(10, "2025-01-09T08:00:00Z")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (_, stats) = send(&app, "GET", "/api/users/alice/stats", None).await;
    assert_eq!(stats["challenges_completed"], 1);
}

#[tokio::test]
async fn test_invalid_season_rejected() {
    let (app, _) = common::create_test_app();
    let (status, _) = send(&app, "GET", "/api/leaderboard/202507", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rank_for_unranked_user_not_found() {
    let (app, _) = common::create_test_app();
    let (status, body) = send(&app, "GET", "/api/leaderboard/202501/users/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_award_achievement_idempotent_over_http() {
    let (app, _) = common::create_test_app();

    let (status, body) = send(&app, "POST", "/api/users/alice/achievements/first_step", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["awarded"], true);

    let (status, body) = send(&app, "POST", "/api/users/alice/achievements/first_step", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["awarded"], false);

    let (_, body) = send(&app, "GET", "/api/users/alice/achievements", None).await;
    assert_eq!(body["stats"]["total_achievements"], 1);
    let first = body["achievements_progress"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["achievement"]["id"] == "first_step")
        .unwrap();
    assert_eq!(first["unlocked"], true);
}

#[tokio::test]
async fn test_award_unknown_and_unavailable() {
    let (app, _) = common::create_test_app();

    let (status, _) = send(&app, "POST", "/api/users/alice/achievements/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/api/users/alice/badges/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "POST", "/api/users/alice/badges/launch_week", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_badge_progress_report() {
    let (app, _) = common::create_test_app();
    let (status, body) = send(&app, "GET", "/api/users/newbie/badges", None).await;

    assert_eq!(status, StatusCode::OK);
    let badges = body["badges_progress"].as_array().unwrap();
    let veteran = badges.iter().find(|b| b["badge"]["id"] == "veteran").unwrap();
    assert_eq!(veteran["progress"], 0.0);
    assert_eq!(veteran["requirements_met"]["challenges"], false);
    assert!(veteran["requirements_met"]["points"].is_null());
}
