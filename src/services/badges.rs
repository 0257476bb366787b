// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badge progress and awarding.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ScoringError;
use crate::models::{AwardKind, Badge, UserStat};
use crate::services::achievements::percent;

/// Per-category requirement status; `None` when the badge does not require
/// that category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequirementsMet {
    pub achievements: Option<bool>,
    pub points: Option<bool>,
    pub challenges: Option<bool>,
}

impl RequirementsMet {
    /// Every specified requirement is met.
    pub fn all(&self) -> bool {
        [self.achievements, self.points, self.challenges]
            .into_iter()
            .flatten()
            .all(|met| met)
    }
}

/// Progress of one user towards one badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeProgress {
    pub badge: Badge,
    pub unlocked: bool,
    /// Mean of the specified categories' progress, in `[0, 100]`
    pub progress: f64,
    pub requirements_met: RequirementsMet,
}

/// Totals over the badges a user owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeSummary {
    pub total_badges: usize,
    pub total_bonus_points: u64,
}

/// Progress and requirement status for a single badge.
pub fn badge_progress(stat: &UserStat, badge: &Badge) -> (f64, RequirementsMet) {
    let req = &badge.requirements;
    let mut met = RequirementsMet::default();
    let mut parts = Vec::with_capacity(3);

    if !req.achievement_ids.is_empty() {
        let owned = req
            .achievement_ids
            .iter()
            .filter(|id| stat.owns(AwardKind::Achievement, id))
            .count();
        parts.push(percent(owned as f64, req.achievement_ids.len() as f64));
        met.achievements = Some(owned == req.achievement_ids.len());
    }

    if req.points_required > 0 {
        parts.push(percent(
            stat.total_points as f64,
            req.points_required as f64,
        ));
        met.points = Some(stat.total_points >= req.points_required);
    }

    if req.challenges_required > 0 {
        parts.push(percent(
            f64::from(stat.challenges_completed),
            f64::from(req.challenges_required),
        ));
        met.challenges = Some(stat.challenges_completed >= req.challenges_required);
    }

    // A badge with no requirements is trivially complete
    let progress = if parts.is_empty() {
        100.0
    } else {
        parts.iter().sum::<f64>() / parts.len() as f64
    };

    (progress, met)
}

/// Progress for every badge available at `now`.
pub fn evaluate_badges(stat: &UserStat, catalog: &[Badge], now: DateTime<Utc>) -> Vec<BadgeProgress> {
    catalog
        .iter()
        .filter(|badge| badge.is_available(now))
        .map(|badge| {
            let (progress, requirements_met) = badge_progress(stat, badge);
            BadgeProgress {
                badge: badge.clone(),
                unlocked: stat.owns(AwardKind::Badge, &badge.id),
                progress,
                requirements_met,
            }
        })
        .collect()
}

/// Count and bonus total of owned badges still present in the catalog.
pub fn summarize_badges(stat: &UserStat, catalog: &[Badge]) -> BadgeSummary {
    let owned: Vec<&Badge> = catalog
        .iter()
        .filter(|b| stat.owns(AwardKind::Badge, &b.id))
        .collect();
    BadgeSummary {
        total_badges: owned.len(),
        total_bonus_points: owned.iter().map(|b| b.bonus_points).sum(),
    }
}

/// Grant a badge to the user.
///
/// Returns `true` if newly awarded, `false` if the user already owned it.
/// Inactive or expired badges cannot be awarded.
pub fn award_badge(
    stat: &mut UserStat,
    catalog: &[Badge],
    badge_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, ScoringError> {
    let badge = catalog
        .iter()
        .find(|b| b.id == badge_id)
        .ok_or_else(|| ScoringError::UnknownBadge(badge_id.to_string()))?;

    if stat.owns(AwardKind::Badge, badge_id) {
        tracing::debug!(user_id = %stat.user_id, badge_id, "Badge already owned");
        return Ok(false);
    }

    if !badge.is_available(now) {
        return Err(ScoringError::BadgeUnavailable(badge_id.to_string()));
    }

    stat.grant(AwardKind::Badge, badge_id, now);
    tracing::info!(user_id = %stat.user_id, badge_id, "Badge awarded");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BadgeRequirements, BadgeTier};
    use chrono::Duration;

    fn badge(id: &str, requirements: BadgeRequirements) -> Badge {
        Badge {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            category: "achievement".to_string(),
            tier: BadgeTier::Silver,
            requirements,
            bonus_points: 25,
            is_limited: false,
            valid_until: None,
            is_active: true,
        }
    }

    fn stat_with(points: u64, challenges: u32, achievements: &[&str]) -> UserStat {
        let mut stat = UserStat::new("u");
        stat.total_points = points;
        stat.challenges_completed = challenges;
        for id in achievements {
            stat.grant(AwardKind::Achievement, id, Utc::now());
        }
        stat
    }

    #[test]
    fn test_averages_only_specified_categories() {
        let b = badge(
            "pts",
            BadgeRequirements {
                points_required: 200,
                ..Default::default()
            },
        );
        let (progress, met) = badge_progress(&stat_with(50, 0, &[]), &b);

        assert_eq!(progress, 25.0);
        assert_eq!(met.points, Some(false));
        assert_eq!(met.achievements, None);
        assert_eq!(met.challenges, None);
    }

    #[test]
    fn test_all_categories() {
        let b = badge(
            "all",
            BadgeRequirements {
                achievement_ids: vec!["a".into(), "b".into()],
                points_required: 100,
                challenges_required: 4,
            },
        );
        let (progress, met) = badge_progress(&stat_with(100, 1, &["a"]), &b);

        // (50 + 100 + 25) / 3
        assert!((progress - 175.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            met,
            RequirementsMet {
                achievements: Some(false),
                points: Some(true),
                challenges: Some(false),
            }
        );
        assert!(!met.all());
    }

    #[test]
    fn test_overshoot_in_one_category_is_capped() {
        let b = badge(
            "mix",
            BadgeRequirements {
                points_required: 10,
                challenges_required: 10,
                ..Default::default()
            },
        );
        let (progress, _) = badge_progress(&stat_with(1000, 0, &[]), &b);
        assert_eq!(progress, 50.0);
    }

    #[test]
    fn test_no_requirements_complete() {
        let (progress, met) = badge_progress(&stat_with(0, 0, &[]), &badge("free", Default::default()));
        assert_eq!(progress, 100.0);
        assert!(met.all());
    }

    #[test]
    fn test_evaluate_skips_unavailable() {
        let now = Utc::now();
        let mut inactive = badge("off", Default::default());
        inactive.is_active = false;
        let mut expired = badge("old", Default::default());
        expired.is_limited = true;
        expired.valid_until = Some(now - Duration::hours(1));
        let live = badge("on", Default::default());

        let report = evaluate_badges(&stat_with(0, 0, &[]), &[inactive, expired, live], now);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].badge.id, "on");
    }

    #[test]
    fn test_award_badge_idempotent() {
        let catalog = vec![badge("b", Default::default())];
        let mut stat = UserStat::new("u");
        let now = Utc::now();

        assert!(award_badge(&mut stat, &catalog, "b", now).unwrap());
        assert!(!award_badge(&mut stat, &catalog, "b", now).unwrap());
        assert_eq!(stat.awards.len(), 1);

        let summary = summarize_badges(&stat, &catalog);
        assert_eq!(summary.total_badges, 1);
        assert_eq!(summary.total_bonus_points, 25);
    }

    #[test]
    fn test_award_badge_errors() {
        let now = Utc::now();
        let mut inactive = badge("off", Default::default());
        inactive.is_active = false;
        let catalog = vec![inactive];
        let mut stat = UserStat::new("u");

        assert!(matches!(
            award_badge(&mut stat, &catalog, "missing", now),
            Err(ScoringError::UnknownBadge(_))
        ));
        assert!(matches!(
            award_badge(&mut stat, &catalog, "off", now),
            Err(ScoringError::BadgeUnavailable(_))
        ));
        assert!(stat.awards.is_empty());
    }
}
