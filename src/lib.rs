// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Challenge Tracker: gamification scoring core
//!
//! This crate scores challenge submissions: points with speed, early-solver
//! and streak bonuses, daily streaks with milestone rewards, quarterly
//! leaderboards with dense ranks, and achievement/badge progress.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::ScoringService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub scoring: ScoringService,
}
