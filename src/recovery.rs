//! Muscle recovery model
//!
//! Reconstructs the *current* soreness of each muscle group from a sparse
//! history of daily check-ins.
//!
//! # Model
//!
//! Every muscle group belongs to a size class. Each class has a full-recovery
//! time under perfect rest and under horrible rest:
//!
//! | size   | perfect (days) | horrible (days) |
//! |--------|----------------|-----------------|
//! | small  | 1.25           | 3               |
//! | medium | 1.75           | 4               |
//! | large  | 2.5            | 6               |
//!
//! Only the most recent check-in that flagged a muscle (level > 0) matters.
//! The overall subjective soreness (0-10) recorded on that day interpolates
//! between the perfect and horrible recovery time, and the time elapsed since
//! then decides the current status:
//!
//! - elapsed >= recovery time: recovered (0)
//! - elapsed < 1 day: sore (2), the flagging day is always sore
//! - elapsed >= half the recovery time: recovering (1)
//! - otherwise: still sore (2)
//!
//! "Now" is the date of the newest check-in, never wall-clock time, so the
//! model can be replayed against historical data.

use crate::models::{DailyCheckIn, MuscleGroup, MuscleSoreness, SorenessLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Muscle size class driving the base recovery window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuscleSize {
    Small,
    Medium,
    Large,
}

impl MuscleSize {
    /// Size class of a muscle group
    pub fn of(group: MuscleGroup) -> Self {
        match group {
            MuscleGroup::Biceps
            | MuscleGroup::Triceps
            | MuscleGroup::Calves
            | MuscleGroup::Forearms => MuscleSize::Small,
            MuscleGroup::Chest
            | MuscleGroup::Shoulders
            | MuscleGroup::Lats
            | MuscleGroup::Abs
            | MuscleGroup::Traps
            | MuscleGroup::LowerBack => MuscleSize::Medium,
            MuscleGroup::Quads | MuscleGroup::Hamstrings | MuscleGroup::Glutes => {
                MuscleSize::Large
            }
        }
    }

    pub fn recovery_window(&self) -> RecoveryWindow {
        match self {
            MuscleSize::Small => RecoveryWindow {
                perfect_days: 1.25,
                horrible_days: 3.0,
            },
            MuscleSize::Medium => RecoveryWindow {
                perfect_days: 1.75,
                horrible_days: 4.0,
            },
            MuscleSize::Large => RecoveryWindow {
                perfect_days: 2.5,
                horrible_days: 6.0,
            },
        }
    }
}

impl fmt::Display for MuscleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuscleSize::Small => write!(f, "small"),
            MuscleSize::Medium => write!(f, "medium"),
            MuscleSize::Large => write!(f, "large"),
        }
    }
}

/// Full-recovery time bounds for a size class, in days
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoveryWindow {
    /// Recovery time after perfect rest
    pub perfect_days: f64,
    /// Recovery time after horrible rest
    pub horrible_days: f64,
}

impl RecoveryWindow {
    /// Interpolate the recovery time for a subjective soreness rating (0-10)
    ///
    /// Soreness outside 0-10 is clamped.
    pub fn recovery_days(&self, subjective_soreness: f64) -> f64 {
        let t = if subjective_soreness.is_nan() {
            0.0
        } else {
            subjective_soreness.clamp(0.0, 10.0) / 10.0
        };
        self.perfect_days + t * (self.horrible_days - self.perfect_days)
    }
}

/// Expected full recovery time of a muscle group in days
pub fn recovery_days(group: MuscleGroup, subjective_soreness: f64) -> f64 {
    MuscleSize::of(group)
        .recovery_window()
        .recovery_days(subjective_soreness)
}

/// Map elapsed time since the flag onto a status
pub fn classify_recovery(elapsed_days: f64, recovery_days: f64) -> SorenessLevel {
    if elapsed_days >= recovery_days {
        SorenessLevel::None
    } else if elapsed_days < 1.0 {
        SorenessLevel::Sore
    } else if elapsed_days >= recovery_days * 0.5 {
        SorenessLevel::Moderate
    } else {
        SorenessLevel::Sore
    }
}

/// Detailed recovery state of one muscle group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleRecovery {
    pub group: MuscleGroup,

    /// Current reconstructed status
    pub status: SorenessLevel,

    /// Date of the most recent flag, if any
    pub last_flagged: Option<DateTime<Utc>>,

    /// Overall soreness recorded with that flag
    pub flag_soreness: Option<u8>,

    /// Expected full recovery time for that flag
    pub recovery_days: Option<f64>,

    /// Days between the flag and the newest check-in
    pub elapsed_days: Option<f64>,
}

impl MuscleRecovery {
    fn unflagged(group: MuscleGroup) -> Self {
        Self {
            group,
            status: SorenessLevel::None,
            last_flagged: None,
            flag_soreness: None,
            recovery_days: None,
            elapsed_days: None,
        }
    }

    /// Days left until full recovery (0 when recovered or never flagged)
    pub fn remaining_days(&self) -> f64 {
        match (self.recovery_days, self.elapsed_days) {
            (Some(recovery), Some(elapsed)) => (recovery - elapsed).max(0.0),
            _ => 0.0,
        }
    }
}

/// Recovery model over a newest-first check-in history
pub struct RecoveryModel;

impl RecoveryModel {
    /// Current status of every muscle group
    ///
    /// `history` must be ordered newest-first. An empty history yields all
    /// zeros.
    pub fn current_status(history: &[DailyCheckIn]) -> MuscleSoreness {
        MuscleGroup::ALL
            .into_iter()
            .map(|group| (group, Self::muscle_recovery(group, history).status))
            .collect()
    }

    /// Full recovery breakdown for every muscle group, in canonical order
    pub fn breakdown(history: &[DailyCheckIn]) -> Vec<MuscleRecovery> {
        MuscleGroup::ALL
            .into_iter()
            .map(|group| Self::muscle_recovery(group, history))
            .collect()
    }

    /// Recovery state of a single muscle group
    pub fn muscle_recovery(group: MuscleGroup, history: &[DailyCheckIn]) -> MuscleRecovery {
        let Some(newest) = history.first() else {
            return MuscleRecovery::unflagged(group);
        };

        // Most recent flag wins; older flags are superseded
        let Some(flag) = history
            .iter()
            .find(|entry| entry.muscle_soreness.get(group).is_flagged())
        else {
            return MuscleRecovery::unflagged(group);
        };

        let recovery = recovery_days(group, f64::from(flag.subjective_soreness));
        let elapsed = elapsed_days(flag.date, newest.date);
        let status = classify_recovery(elapsed, recovery);

        tracing::trace!(
            muscle = %group,
            recovery_days = recovery,
            elapsed_days = elapsed,
            status = status.value(),
            "Muscle recovery classified"
        );

        MuscleRecovery {
            group,
            status,
            last_flagged: Some(flag.date),
            flag_soreness: Some(flag.subjective_soreness),
            recovery_days: Some(recovery),
            elapsed_days: Some(elapsed),
        }
    }
}

/// Convenience wrapper for [`RecoveryModel::current_status`]
pub fn compute_recovery_status(history: &[DailyCheckIn]) -> MuscleSoreness {
    RecoveryModel::current_status(history)
}

/// Fractional days between two timestamps
fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClockTime;
    use chrono::{Duration, TimeZone};

    fn base_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 15, 12, 0, 0).unwrap()
    }

    fn check_in(date: DateTime<Utc>, soreness: u8, muscles: MuscleSoreness) -> DailyCheckIn {
        DailyCheckIn {
            date,
            sleep_duration_hours: 7.5,
            wake_time: ClockTime::new(6, 45).unwrap(),
            stress: 2,
            yesterday_workout: String::new(),
            last_session_rpe: 7,
            subjective_soreness: soreness,
            muscle_soreness: muscles,
        }
    }

    fn quads(level: SorenessLevel) -> MuscleSoreness {
        MuscleSoreness::new().with(MuscleGroup::Quads, level)
    }

    #[test]
    fn test_size_classification() {
        assert_eq!(MuscleSize::of(MuscleGroup::Forearms), MuscleSize::Small);
        assert_eq!(MuscleSize::of(MuscleGroup::LowerBack), MuscleSize::Medium);
        assert_eq!(MuscleSize::of(MuscleGroup::Glutes), MuscleSize::Large);

        let small = MuscleGroup::ALL
            .iter()
            .filter(|g| MuscleSize::of(**g) == MuscleSize::Small)
            .count();
        let large = MuscleGroup::ALL
            .iter()
            .filter(|g| MuscleSize::of(**g) == MuscleSize::Large)
            .count();
        assert_eq!(small, 4);
        assert_eq!(large, 3);
    }

    #[test]
    fn test_recovery_days_interpolation() {
        assert!((recovery_days(MuscleGroup::Quads, 0.0) - 2.5).abs() < 1e-9);
        assert!((recovery_days(MuscleGroup::Quads, 10.0) - 6.0).abs() < 1e-9);
        assert!((recovery_days(MuscleGroup::Biceps, 5.0) - 2.125).abs() < 1e-9);
        assert!((recovery_days(MuscleGroup::Chest, 4.0) - 2.65).abs() < 1e-9);

        // Out-of-range soreness is clamped
        assert!((recovery_days(MuscleGroup::Quads, 25.0) - 6.0).abs() < 1e-9);
        assert!((recovery_days(MuscleGroup::Quads, -3.0) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_history_all_recovered() {
        let status = RecoveryModel::current_status(&[]);
        assert!(status.is_clear());
        assert_eq!(status.iter().count(), MuscleGroup::COUNT);
    }

    #[test]
    fn test_flag_day_is_always_sore() {
        let history = vec![check_in(base_date(), 10, quads(SorenessLevel::Sore))];
        let status = compute_recovery_status(&history);
        assert_eq!(status.get(MuscleGroup::Quads), SorenessLevel::Sore);

        // Even the mildest soreness keeps the flag day red
        let history = vec![check_in(base_date(), 0, quads(SorenessLevel::Moderate))];
        let status = compute_recovery_status(&history);
        assert_eq!(status.get(MuscleGroup::Quads), SorenessLevel::Sore);
    }

    #[test]
    fn test_large_muscle_decay_after_horrible_rest() {
        let flagged = base_date();

        // 3.5 days later: past half of the 6 day window
        let history = vec![
            check_in(flagged + Duration::hours(84), 2, MuscleSoreness::new()),
            check_in(flagged, 10, quads(SorenessLevel::Sore)),
        ];
        let status = compute_recovery_status(&history);
        assert_eq!(status.get(MuscleGroup::Quads), SorenessLevel::Moderate);

        // 6.5 days later: fully recovered
        let history = vec![
            check_in(flagged + Duration::hours(156), 2, MuscleSoreness::new()),
            check_in(flagged, 10, quads(SorenessLevel::Sore)),
        ];
        let status = compute_recovery_status(&history);
        assert_eq!(status.get(MuscleGroup::Quads), SorenessLevel::None);

        // 2 days later: past day one but before the halfway mark
        let history = vec![
            check_in(flagged + Duration::days(2), 2, MuscleSoreness::new()),
            check_in(flagged, 10, quads(SorenessLevel::Sore)),
        ];
        let status = compute_recovery_status(&history);
        assert_eq!(status.get(MuscleGroup::Quads), SorenessLevel::Sore);
    }

    #[test]
    fn test_decay_rate_uses_overall_soreness_not_flag_level() {
        let flagged = base_date();
        // Moderate flag but horrible overall soreness: 6 day window, 2 days in -> sore
        let history = vec![
            check_in(flagged + Duration::days(2), 0, MuscleSoreness::new()),
            check_in(flagged, 10, quads(SorenessLevel::Moderate)),
        ];
        assert_eq!(
            compute_recovery_status(&history).get(MuscleGroup::Quads),
            SorenessLevel::Sore
        );

        // Sore flag but no overall soreness: 2.5 day window, 2 days in -> recovering
        let history = vec![
            check_in(flagged + Duration::days(2), 0, MuscleSoreness::new()),
            check_in(flagged, 0, quads(SorenessLevel::Sore)),
        ];
        assert_eq!(
            compute_recovery_status(&history).get(MuscleGroup::Quads),
            SorenessLevel::Moderate
        );
    }

    #[test]
    fn test_most_recent_flag_supersedes_older_flags() {
        let oldest = base_date();
        // Old flag with a long window is ignored; the newer light flag has expired
        let history = vec![
            check_in(oldest + Duration::days(4), 0, MuscleSoreness::new()),
            check_in(oldest + Duration::days(1), 0, quads(SorenessLevel::Moderate)),
            check_in(oldest, 10, quads(SorenessLevel::Sore)),
        ];
        assert_eq!(
            compute_recovery_status(&history).get(MuscleGroup::Quads),
            SorenessLevel::None
        );
    }

    #[test]
    fn test_groups_are_independent() {
        let flagged = base_date();
        let muscles = MuscleSoreness::new()
            .with(MuscleGroup::Biceps, SorenessLevel::Sore)
            .with(MuscleGroup::Hamstrings, SorenessLevel::Sore);
        let history = vec![
            check_in(flagged + Duration::days(2), 0, MuscleSoreness::new()),
            check_in(flagged, 5, muscles),
        ];
        let status = compute_recovery_status(&history);

        // Biceps window 2.125 days: 2 days is past halfway
        assert_eq!(status.get(MuscleGroup::Biceps), SorenessLevel::Moderate);
        // Hamstrings window 4.25 days: 2 days is before halfway
        assert_eq!(status.get(MuscleGroup::Hamstrings), SorenessLevel::Sore);
        assert_eq!(status.get(MuscleGroup::Chest), SorenessLevel::None);
    }

    #[test]
    fn test_breakdown_details() {
        let flagged = base_date();
        let history = vec![
            check_in(flagged + Duration::days(3), 0, MuscleSoreness::new()),
            check_in(flagged, 10, quads(SorenessLevel::Sore)),
        ];
        let breakdown = RecoveryModel::breakdown(&history);
        assert_eq!(breakdown.len(), MuscleGroup::COUNT);

        let quads = &breakdown[MuscleGroup::Quads.index()];
        assert_eq!(quads.last_flagged, Some(flagged));
        assert_eq!(quads.flag_soreness, Some(10));
        assert!((quads.remaining_days() - 3.0).abs() < 1e-9);
        assert_eq!(quads.status, SorenessLevel::Moderate);

        let chest = &breakdown[MuscleGroup::Chest.index()];
        assert_eq!(chest.last_flagged, None);
        assert_eq!(chest.remaining_days(), 0.0);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify_recovery(6.0, 6.0), SorenessLevel::None);
        assert_eq!(classify_recovery(0.99, 6.0), SorenessLevel::Sore);
        assert_eq!(classify_recovery(3.0, 6.0), SorenessLevel::Moderate);
        assert_eq!(classify_recovery(2.99, 6.0), SorenessLevel::Sore);
        // Window shorter than a day: recovered takes precedence over day-one rule
        assert_eq!(classify_recovery(0.5, 0.5), SorenessLevel::None);
    }
}
