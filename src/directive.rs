//! Display-layer decisions layered on top of a readiness score
//!
//! The scorer only ever emits green, yellow or red. Everything here is a
//! presentation concern: the critical-fatigue override for scores under 10,
//! the full-readiness view for a brand new account, and mapping the peak
//! window onto a 24-hour clock face.

use crate::models::{ClockTime, PeakWindow, ReadinessScore, ReadinessState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores below this force rest-day messaging regardless of state
pub const CRITICAL_FATIGUE_THRESHOLD: u8 = 10;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// What the dashboard tells the athlete to do today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingDirective {
    /// Green: heavy compounds, high intent
    FullIntensity,
    /// Yellow: calibrated volume
    CalibratedVolume,
    /// Red: mobility and recovery work only
    RecoveryOnly,
    /// Critical fatigue: no training at all
    MandatoryRest,
}

impl TrainingDirective {
    pub fn for_readiness(readiness: &ReadinessScore) -> Self {
        Self::for_score(readiness.score, readiness.state)
    }

    pub fn for_score(score: u8, state: ReadinessState) -> Self {
        if score < CRITICAL_FATIGUE_THRESHOLD {
            return TrainingDirective::MandatoryRest;
        }
        match state {
            ReadinessState::Green => TrainingDirective::FullIntensity,
            ReadinessState::Yellow => TrainingDirective::CalibratedVolume,
            ReadinessState::Red => TrainingDirective::RecoveryOnly,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            TrainingDirective::FullIntensity => "GO for high-intent training",
            TrainingDirective::CalibratedVolume => "Caution: use calibrated volume",
            TrainingDirective::RecoveryOnly => "NO-GO for max loading",
            TrainingDirective::MandatoryRest => "Critical fatigue: mandatory rest day",
        }
    }

    /// True when the directive overrides the scorer's own state
    pub fn is_override(&self) -> bool {
        matches!(self, TrainingDirective::MandatoryRest)
    }
}

impl fmt::Display for TrainingDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.headline())
    }
}

/// A brand new account is shown at full readiness
pub fn fresh_account_view(mut readiness: ReadinessScore) -> ReadinessScore {
    readiness.score = 100;
    readiness.state = ReadinessState::Green;
    readiness.summary = ReadinessState::Green.summary().to_string();
    readiness
}

/// A stretch of the 24-hour clock, in minutes since midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSegment {
    pub start_minute: u32,
    pub end_minute: u32,
}

impl PeakWindow {
    /// Place the window on the clock face; splits in two when it wraps midnight
    pub fn clock_segments(&self, wake_time: ClockTime) -> Vec<ClockSegment> {
        let wake = wake_time.minutes_of_day();
        let start = (wake + u32::from(self.start_hour) * 60) % MINUTES_PER_DAY;
        let end = (wake + u32::from(self.end_hour) * 60) % MINUTES_PER_DAY;

        if start <= end {
            vec![ClockSegment {
                start_minute: start,
                end_minute: end,
            }]
        } else {
            vec![
                ClockSegment {
                    start_minute: start,
                    end_minute: MINUTES_PER_DAY,
                },
                ClockSegment {
                    start_minute: 0,
                    end_minute: end,
                },
            ]
        }
    }

    /// Window boundaries as 12-hour clock labels, e.g. `("12:45 PM", "5:45 PM")`
    pub fn clock_labels(&self, wake_time: ClockTime) -> (String, String) {
        let wake = wake_time.minutes_of_day();
        (
            format_clock_minutes(wake + u32::from(self.start_hour) * 60),
            format_clock_minutes(wake + u32::from(self.end_hour) * 60),
        )
    }
}

/// Format minutes since midnight as `h:mm AM|PM`, wrapping past midnight
pub fn format_clock_minutes(minutes: u32) -> String {
    let normalized = minutes % MINUTES_PER_DAY;
    let hour24 = normalized / 60;
    let minute = normalized % 60;
    let suffix = if hour24 >= 12 { "PM" } else { "AM" };
    let hour12 = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hour12, minute, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn readiness(score: u8) -> ReadinessScore {
        ReadinessScore {
            score,
            state: ReadinessState::from_score(score),
            summary: ReadinessState::from_score(score).summary().to_string(),
            peak_window: PeakWindow {
                start_hour: 6,
                end_hour: 11,
            },
            hourly_performance: [50; 24],
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_directive_follows_state() {
        assert_eq!(
            TrainingDirective::for_readiness(&readiness(90)),
            TrainingDirective::FullIntensity
        );
        assert_eq!(
            TrainingDirective::for_readiness(&readiness(50)),
            TrainingDirective::CalibratedVolume
        );
        assert_eq!(
            TrainingDirective::for_readiness(&readiness(20)),
            TrainingDirective::RecoveryOnly
        );
    }

    #[test]
    fn test_critical_fatigue_override() {
        let view = readiness(9);
        let directive = TrainingDirective::for_readiness(&view);
        assert_eq!(directive, TrainingDirective::MandatoryRest);
        assert!(directive.is_override());
        // The underlying score object keeps its own state
        assert_eq!(view.state, ReadinessState::Red);

        assert_eq!(
            TrainingDirective::for_readiness(&readiness(10)),
            TrainingDirective::RecoveryOnly
        );
    }

    #[test]
    fn test_fresh_account_view() {
        let view = fresh_account_view(readiness(40));
        assert_eq!(view.score, 100);
        assert_eq!(view.state, ReadinessState::Green);
        assert_eq!(view.summary, ReadinessState::Green.summary());
    }

    #[test]
    fn test_peak_window_on_clock() {
        let window = PeakWindow {
            start_hour: 6,
            end_hour: 11,
        };
        let wake = ClockTime::new(6, 45).unwrap();
        let segments = window.clock_segments(wake);
        assert_eq!(
            segments,
            vec![ClockSegment {
                start_minute: 765,
                end_minute: 1065
            }]
        );
        assert_eq!(
            window.clock_labels(wake),
            ("12:45 PM".to_string(), "5:45 PM".to_string())
        );
    }

    #[test]
    fn test_peak_window_wraps_midnight() {
        let window = PeakWindow {
            start_hour: 6,
            end_hour: 11,
        };
        let segments = window.clock_segments(ClockTime::new(16, 0).unwrap());
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start_minute, 22 * 60);
        assert_eq!(segments[0].end_minute, 1440);
        assert_eq!(segments[1].end_minute, 3 * 60);
    }

    #[test]
    fn test_format_clock_minutes() {
        assert_eq!(format_clock_minutes(0), "12:00 AM");
        assert_eq!(format_clock_minutes(405), "6:45 AM");
        assert_eq!(format_clock_minutes(720), "12:00 PM");
        assert_eq!(format_clock_minutes(1439), "11:59 PM");
        assert_eq!(format_clock_minutes(1440 + 61), "1:01 AM");
    }
}
