//! Daily training readiness
//!
//! Converts the latest check-in, the profile's sleep target and a short
//! rolling history into a 0-100 score and a traffic-light state.
//!
//! # Scoring
//!
//! Starting from a baseline of 96, weighted penalties are subtracted:
//!
//! - sleep: `max(0, target - actual) * 10`
//! - stress: `stress * 4`
//! - exertion: `max(0, rpe - 7) * 3`
//! - subjective soreness: `soreness * 2.3`
//! - muscle average: `mean(per-muscle level) * 5.5`
//! - recovery trend: up to 3 prior check-ins weighted `[0.65, 0.45, 0.25]`
//!   by their mean muscle level, summed, times 2.2
//!
//! The result is rounded and clamped to 0-100.
//!
//! # States
//!
//! - score >= 85: green
//! - 30 <= score < 85: yellow
//! - score < 30: red
//!
//! The scorer never emits anything beyond these three states. Forced rest-day
//! messaging for very low scores lives in [`crate::directive`].

use crate::circadian::build_hourly_performance;
use crate::models::{DailyCheckIn, PeakWindow, ReadinessScore, ReadinessState, UserProfile};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Lowest score classified green
pub const GREEN_THRESHOLD: u8 = 85;

/// Lowest score classified yellow
pub const YELLOW_THRESHOLD: u8 = 30;

/// Readiness scoring parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Score before any penalty is applied
    pub baseline: f64,

    /// Penalty per hour of sleep below target
    pub sleep_weight: f64,

    /// Penalty per stress point
    pub stress_weight: f64,

    /// RPE above which exertion is penalized
    pub exertion_threshold: f64,

    /// Penalty per RPE point above the threshold
    pub exertion_weight: f64,

    /// Penalty per subjective soreness point
    pub soreness_weight: f64,

    /// Penalty per unit of mean muscle soreness level
    pub muscle_weight: f64,

    /// Recency weights for prior check-ins, newest first
    pub trend_weights: Vec<f64>,

    /// Multiplier applied to the weighted trend load
    pub trend_multiplier: f64,

    /// Lowest score classified green
    pub green_threshold: u8,

    /// Lowest score classified yellow
    pub yellow_threshold: u8,

    /// Peak window reported with every score (hours after wake)
    pub peak_window: PeakWindow,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            baseline: 96.0,
            sleep_weight: 10.0,
            stress_weight: 4.0,
            exertion_threshold: 7.0,
            exertion_weight: 3.0,
            soreness_weight: 2.3,
            muscle_weight: 5.5,
            trend_weights: vec![0.65, 0.45, 0.25],
            trend_multiplier: 2.2,
            green_threshold: GREEN_THRESHOLD,
            yellow_threshold: YELLOW_THRESHOLD,
            // TODO: derive from the chronotype-shifted curve once the dashboard copy is updated
            peak_window: PeakWindow {
                start_hour: 6,
                end_hour: 11,
            },
        }
    }
}

/// Individual penalties subtracted from the baseline
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyBreakdown {
    pub sleep: f64,
    pub stress: f64,
    pub exertion: f64,
    pub soreness: f64,
    pub muscle: f64,
    pub recovery_trend: f64,
}

impl PenaltyBreakdown {
    pub fn total(&self) -> f64 {
        self.sleep + self.stress + self.exertion + self.soreness + self.muscle + self.recovery_trend
    }
}

impl ReadinessState {
    /// Classify a score with the default thresholds
    pub fn from_score(score: u8) -> Self {
        classify(score, GREEN_THRESHOLD, YELLOW_THRESHOLD)
    }
}

fn classify(score: u8, green_threshold: u8, yellow_threshold: u8) -> ReadinessState {
    if score >= green_threshold {
        ReadinessState::Green
    } else if score >= yellow_threshold {
        ReadinessState::Yellow
    } else {
        ReadinessState::Red
    }
}

/// Readiness scoring engine
#[derive(Debug, Clone, Default)]
pub struct ReadinessCalculator {
    config: ReadinessConfig,
}

impl ReadinessCalculator {
    /// Create calculator with default weights
    pub fn new() -> Self {
        Self::default()
    }

    /// Create calculator with custom weights
    pub fn with_config(config: ReadinessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReadinessConfig {
        &self.config
    }

    /// Compute every penalty for a check-in
    ///
    /// `history` is newest-first; entries sharing the check-in's timestamp
    /// are skipped when computing the trend.
    pub fn penalties(
        &self,
        profile: &UserProfile,
        check_in: &DailyCheckIn,
        history: &[DailyCheckIn],
    ) -> PenaltyBreakdown {
        let cfg = &self.config;

        PenaltyBreakdown {
            sleep: (profile.target_sleep_hours - check_in.sleep_duration_hours).max(0.0)
                * cfg.sleep_weight,
            stress: f64::from(check_in.stress) * cfg.stress_weight,
            exertion: (f64::from(check_in.last_session_rpe) - cfg.exertion_threshold).max(0.0)
                * cfg.exertion_weight,
            soreness: f64::from(check_in.subjective_soreness) * cfg.soreness_weight,
            muscle: check_in.muscle_soreness.average_level() * cfg.muscle_weight,
            recovery_trend: self.recovery_trend_penalty(check_in, history),
        }
    }

    fn recovery_trend_penalty(&self, check_in: &DailyCheckIn, history: &[DailyCheckIn]) -> f64 {
        let weighted_load: f64 = history
            .iter()
            .filter(|entry| entry.date != check_in.date)
            .zip(self.config.trend_weights.iter())
            .map(|(entry, weight)| entry.muscle_soreness.average_level() * weight)
            .sum();

        weighted_load * self.config.trend_multiplier
    }

    /// Numeric score only
    pub fn score_value(
        &self,
        profile: &UserProfile,
        check_in: &DailyCheckIn,
        history: &[DailyCheckIn],
    ) -> u8 {
        let penalties = self.penalties(profile, check_in, history);
        let raw = (self.config.baseline - penalties.total()).round();
        if raw.is_nan() {
            return 0;
        }
        raw.clamp(0.0, 100.0) as u8
    }

    /// Classify a score with this calculator's thresholds
    pub fn classify(&self, score: u8) -> ReadinessState {
        classify(score, self.config.green_threshold, self.config.yellow_threshold)
    }

    /// Full readiness view, stamped with the current time
    pub fn score(
        &self,
        profile: &UserProfile,
        check_in: &DailyCheckIn,
        history: &[DailyCheckIn],
    ) -> ReadinessScore {
        self.score_at(profile, check_in, history, Utc::now())
    }

    /// Full readiness view with an explicit computation timestamp
    pub fn score_at(
        &self,
        profile: &UserProfile,
        check_in: &DailyCheckIn,
        history: &[DailyCheckIn],
        computed_at: DateTime<Utc>,
    ) -> ReadinessScore {
        let score = self.score_value(profile, check_in, history);
        let state = self.classify(score);

        tracing::debug!(
            day = %check_in.day_key(),
            score,
            state = %state,
            history_len = history.len(),
            "Readiness computed"
        );

        ReadinessScore {
            score,
            state,
            summary: state.summary().to_string(),
            peak_window: self.config.peak_window,
            hourly_performance: build_hourly_performance(
                check_in.wake_time,
                profile.chronotype,
                check_in.stress,
                check_in.sleep_duration_hours,
            ),
            updated_at: computed_at,
        }
    }

    /// Rescore every entry of a newest-first history against the entries
    /// older than it. The result is newest-first as well.
    pub fn score_timeline(
        &self,
        profile: &UserProfile,
        history: &[DailyCheckIn],
    ) -> Vec<ReadinessScore> {
        let computed_at = Utc::now();
        (0..history.len())
            .into_par_iter()
            .map(|index| {
                self.score_at(profile, &history[index], &history[index + 1..], computed_at)
            })
            .collect()
    }
}

/// Score a check-in with the default weights
pub fn build_readiness_score(
    profile: &UserProfile,
    check_in: &DailyCheckIn,
    history: &[DailyCheckIn],
) -> ReadinessScore {
    ReadinessCalculator::new().score(profile, check_in, history)
}
