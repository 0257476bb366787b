// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Achievement/badge catalog loading.

use crate::models::{Achievement, Badge};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Read-only catalog of achievements and badges.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    achievements: Vec<Achievement>,
    #[serde(default)]
    badges: Vec<Badge>,
}

impl Catalog {
    pub fn new(achievements: Vec<Achievement>, badges: Vec<Badge>) -> Self {
        Self {
            achievements,
            badges,
        }
    }

    /// Load the catalog from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load the catalog from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json_data)
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        check_unique(catalog.achievements.iter().map(|a| a.id.as_str()))?;
        check_unique(catalog.badges.iter().map(|b| b.id.as_str()))?;

        tracing::info!(
            achievements = catalog.achievements.len(),
            badges = catalog.badges.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }
}

fn check_unique<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse catalog: {0}")]
    ParseError(String),

    #[error("Duplicate catalog id: {0}")]
    DuplicateId(String),
}
