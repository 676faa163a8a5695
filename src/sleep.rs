//! Rolling sleep debt against the profile's nightly target

use crate::models::DailyCheckIn;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of most recent check-ins considered
pub const SLEEP_DEBT_WINDOW: usize = 7;

/// Debt at which the gauge reads full
const GAUGE_FULL_HOURS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SleepDebtLevel {
    Low,      // <= 2h
    Moderate, // <= 5h
    High,     // > 5h
}

impl SleepDebtLevel {
    pub fn from_debt(hours: f64) -> Self {
        if hours <= 2.0 {
            SleepDebtLevel::Low
        } else if hours <= 5.0 {
            SleepDebtLevel::Moderate
        } else {
            SleepDebtLevel::High
        }
    }
}

impl fmt::Display for SleepDebtLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SleepDebtLevel::Low => write!(f, "Low Debt"),
            SleepDebtLevel::Moderate => write!(f, "Moderate"),
            SleepDebtLevel::High => write!(f, "High Debt"),
        }
    }
}

/// Sleep surplus (+) or deficit (-) for one night
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepDelta {
    pub date: NaiveDate,
    pub delta_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepDebt {
    /// Accumulated deficit in hours (surplus nights do not pay it back)
    pub total_debt_hours: f64,

    pub level: SleepDebtLevel,

    /// Per-night deltas, oldest first
    pub daily_deltas: Vec<SleepDelta>,
}

impl SleepDebt {
    /// Fraction of the debt gauge to fill (0.0-1.0)
    pub fn gauge_fraction(&self) -> f64 {
        (self.total_debt_hours / GAUGE_FULL_HOURS).min(1.0)
    }

    pub fn nights_considered(&self) -> usize {
        self.daily_deltas.len()
    }
}

/// Compute sleep debt over the most recent check-ins of a newest-first history
pub fn sleep_debt(history: &[DailyCheckIn], target_sleep_hours: f64) -> SleepDebt {
    let mut daily_deltas: Vec<SleepDelta> = history
        .iter()
        .take(SLEEP_DEBT_WINDOW)
        .map(|entry| SleepDelta {
            date: entry.day_key(),
            delta_hours: round_tenth(entry.sleep_duration_hours - target_sleep_hours),
        })
        .collect();

    let debt: f64 = daily_deltas
        .iter()
        .map(|delta| (-delta.delta_hours).max(0.0))
        .sum();
    let total_debt_hours = round_tenth(debt);

    daily_deltas.reverse();

    SleepDebt {
        total_debt_hours,
        level: SleepDebtLevel::from_debt(total_debt_hours),
        daily_deltas,
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
