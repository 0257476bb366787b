// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed stores.
//!
//! Layout:
//! - `user_stats/{user_id}`: one [`UserStat`] document per user
//! - `leaderboard/{season}`: one document holding every row of a season
//!
//! Keeping a season in a single document makes `save_season` one atomic
//! write, so readers observe either the old ranking or the new one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{collections, ensure_single_season, LeaderboardStore, UserStatStore};
use crate::error::ScoringError;
use crate::models::{LeaderboardEntry, Season, UserStat};
use crate::time_utils::format_utc_rfc3339;

/// Stored shape of a season's leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SeasonDocument {
    season: Season,
    #[serde(default)]
    entries: Vec<LeaderboardEntry>,
    #[serde(default)]
    updated_at: String,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, ScoringError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            ScoringError::Storage(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, ScoringError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            ScoringError::Storage(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client; every operation returns a storage error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, ScoringError> {
        self.client.as_ref().ok_or_else(|| {
            ScoringError::Storage("Database not connected (offline mode)".to_string())
        })
    }
}

#[async_trait]
impl UserStatStore for FirestoreDb {
    async fn load(&self, user_id: &str) -> Result<Option<UserStat>, ScoringError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_STATS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| ScoringError::Storage(e.to_string()))
    }

    async fn save(&self, stat: &UserStat) -> Result<(), ScoringError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_STATS)
            .document_id(&stat.user_id)
            .object(stat)
            .execute()
            .await
            .map_err(|e| ScoringError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl LeaderboardStore for FirestoreDb {
    async fn load_season(&self, season: Season) -> Result<Vec<LeaderboardEntry>, ScoringError> {
        let doc: Option<SeasonDocument> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::LEADERBOARD)
            .obj()
            .one(&season.to_string())
            .await
            .map_err(|e| ScoringError::Storage(e.to_string()))?;

        match doc {
            Some(doc) if doc.season != season => Err(ScoringError::SeasonMismatch {
                expected: season,
                found: doc.season,
            }),
            Some(doc) => Ok(doc.entries),
            None => Ok(Vec::new()),
        }
    }

    async fn save_season(
        &self,
        season: Season,
        entries: &[LeaderboardEntry],
    ) -> Result<(), ScoringError> {
        ensure_single_season(season, entries)?;

        let doc = SeasonDocument {
            season,
            entries: entries.to_vec(),
            updated_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::LEADERBOARD)
            .document_id(season.to_string())
            .object(&doc)
            .execute()
            .await
            .map_err(|e| ScoringError::Storage(e.to_string()))?;

        tracing::debug!(%season, rows = entries.len(), "Season leaderboard written");
        Ok(())
    }
}
