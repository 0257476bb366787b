// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use challenge_tracker::error::{AppError, ScoringError};
use challenge_tracker::models::Season;
use chrono::NaiveDate;

fn status_of(err: ScoringError) -> StatusCode {
    AppError::from(err).into_response().status()
}

fn season(id: i32) -> Season {
    Season::try_from(id).unwrap()
}

#[test]
fn test_caller_errors_map_to_client_statuses() {
    let err = ScoringError::InvalidActivityDate {
        last: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        attempted: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    };
    assert_eq!(status_of(err), StatusCode::BAD_REQUEST);

    assert_eq!(
        status_of(ScoringError::UnknownAchievement("x".into())),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        status_of(ScoringError::UnknownBadge("x".into())),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        status_of(ScoringError::BadgeUnavailable("x".into())),
        StatusCode::CONFLICT
    );
}

#[test]
fn test_server_errors_map_to_500() {
    assert_eq!(
        status_of(ScoringError::Storage("down".into())),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        status_of(ScoringError::SeasonMismatch {
            expected: season(202501),
            found: season(202502),
        }),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        status_of(ScoringError::RankRecomputeFailure {
            season: season(202501),
            reason: "write failed".into(),
        }),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_error_messages_name_the_dates() {
    let err = ScoringError::InvalidActivityDate {
        last: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
        attempted: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
    };
    let msg = err.to_string();
    assert!(msg.contains("2025-03-04"));
    assert!(msg.contains("2025-03-05"));
}

#[tokio::test]
async fn test_offline_store_reports_storage_error() {
    use challenge_tracker::db::{FirestoreDb, UserStatStore};

    let db = FirestoreDb::new_mock();
    let err = db.load("alice").await.unwrap_err();
    assert!(matches!(err, ScoringError::Storage(_)));
}
