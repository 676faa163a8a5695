//! Validation of check-in and profile payloads at the ingestion boundary
//!
//! The scoring core assumes well-typed input; shape and range checks happen
//! here before anything is scored or stored.

use crate::error::{AuraError, Result};
use crate::models::{ClockTime, DailyCheckIn, MuscleSoreness, ReadinessState, UserProfile};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound for any 0-10 self-report scale
const SCALE_MAX: f64 = 10.0;

/// Check-in as submitted by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInPayload {
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub date: String,
    pub sleep_duration_hours: f64,
    pub wake_time: String,
    pub stress: f64,
    #[serde(default)]
    pub yesterday_workout: Option<String>,
    pub last_session_rpe: f64,
    pub subjective_soreness: f64,
    pub muscle_soreness: MuscleSoreness,

    // Client-side projections; the server always recomputes these
    #[serde(default)]
    pub readiness_score: Option<f64>,
    #[serde(default)]
    pub readiness_state: Option<ReadinessState>,
    #[serde(default)]
    pub profile_snapshot: Option<UserProfile>,
}

/// Validate payloads before they reach the scorer
pub struct CheckInValidator;

impl CheckInValidator {
    /// Validate a payload and convert it into a check-in
    pub fn validate(payload: &CheckInPayload) -> Result<DailyCheckIn> {
        let date = parse_check_in_date(&payload.date)?;

        let sleep = payload.sleep_duration_hours;
        if !sleep.is_finite() || !(0.0..=24.0).contains(&sleep) {
            return Err(AuraError::Validation(format!(
                "sleep duration must be between 0 and 24 hours, got {}",
                sleep
            )));
        }

        let wake_time: ClockTime = payload
            .wake_time
            .parse()
            .map_err(|e| AuraError::Validation(format!("{}", e)))?;

        let stress = scale_value("stress", payload.stress)?;
        let last_session_rpe = scale_value("last session RPE", payload.last_session_rpe)?;
        let subjective_soreness = scale_value("subjective soreness", payload.subjective_soreness)?;

        Ok(DailyCheckIn {
            date,
            sleep_duration_hours: sleep,
            wake_time,
            stress,
            yesterday_workout: payload
                .yesterday_workout
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            last_session_rpe,
            subjective_soreness,
            muscle_soreness: payload.muscle_soreness,
        })
    }

    /// Validate profile invariants
    pub fn validate_profile(profile: &UserProfile) -> Result<()> {
        if profile.id.trim().is_empty() {
            return Err(AuraError::Validation("profile id must not be empty".to_string()));
        }

        let target = profile.target_sleep_hours;
        if !target.is_finite() || target <= 0.0 || target > 24.0 {
            return Err(AuraError::Validation(format!(
                "target sleep must be greater than 0 and at most 24 hours, got {}",
                target
            )));
        }

        if profile.timezone.trim().is_empty() {
            return Err(AuraError::Validation("timezone must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Parse an RFC 3339 timestamp, or a bare date taken at 12:00 UTC
pub fn parse_check_in_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AuraError::Validation(format!("invalid check-in date: {:?}", raw)))
}

/// Whole number on the 0-10 self-report scale
fn scale_value(field: &str, value: f64) -> Result<u8> {
    if !value.is_finite() || value.fract() != 0.0 || !(0.0..=SCALE_MAX).contains(&value) {
        return Err(AuraError::Validation(format!(
            "{} must be a whole number between 0 and 10, got {}",
            field, value
        )));
    }
    Ok(value as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MuscleGroup, SorenessLevel};
    use chrono::{TimeZone, Timelike};

    fn payload() -> CheckInPayload {
        CheckInPayload {
            date: "2026-02-16T12:00:00.000Z".to_string(),
            sleep_duration_hours: 7.1,
            wake_time: "06:40".to_string(),
            stress: 4.0,
            yesterday_workout: Some("  Upper strength block ".to_string()),
            last_session_rpe: 8.0,
            subjective_soreness: 5.0,
            muscle_soreness: MuscleSoreness::new().with(MuscleGroup::Chest, SorenessLevel::Moderate),
            readiness_score: None,
            readiness_state: None,
            profile_snapshot: None,
        }
    }

    fn assert_rejected(payload: CheckInPayload) {
        match CheckInValidator::validate(&payload) {
            Err(AuraError::Validation(_)) => {}
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_payload() {
        let check_in = CheckInValidator::validate(&payload()).unwrap();
        assert_eq!(check_in.date, Utc.with_ymd_and_hms(2026, 2, 16, 12, 0, 0).unwrap());
        assert_eq!(check_in.stress, 4);
        assert_eq!(check_in.yesterday_workout, "Upper strength block");
        assert_eq!(check_in.wake_time.to_string(), "06:40");
    }

    #[test]
    fn test_bare_date_is_noon_utc() {
        let date = parse_check_in_date("2026-02-16").unwrap();
        assert_eq!(date.hour(), 12);
        assert!(parse_check_in_date("16/02/2026").is_err());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert_rejected(CheckInPayload { stress: 11.0, ..payload() });
        assert_rejected(CheckInPayload { stress: 2.5, ..payload() });
        assert_rejected(CheckInPayload { last_session_rpe: -1.0, ..payload() });
        assert_rejected(CheckInPayload { subjective_soreness: f64::NAN, ..payload() });
        assert_rejected(CheckInPayload { sleep_duration_hours: 25.0, ..payload() });
        assert_rejected(CheckInPayload { wake_time: "25:00".to_string(), ..payload() });
        assert_rejected(CheckInPayload { date: "yesterday".to_string(), ..payload() });
    }

    #[test]
    fn test_payload_json_with_client_projection() {
        let json = r#"{
            "date": "2026-02-16",
            "sleepDurationHours": 8,
            "wakeTime": "07:00",
            "stress": 0,
            "lastSessionRpe": 0,
            "subjectiveSoreness": 0,
            "muscleSoreness": {},
            "readinessScore": 100,
            "readinessState": "green"
        }"#;
        let payload: CheckInPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.readiness_state, Some(ReadinessState::Green));
        let check_in = CheckInValidator::validate(&payload).unwrap();
        assert!(check_in.muscle_soreness.is_clear());
        assert_eq!(check_in.yesterday_workout, "");
    }

    #[test]
    fn test_profile_validation() {
        let mut profile = UserProfile {
            id: "athlete-01".to_string(),
            chronotype: crate::models::Chronotype::Bear,
            experience_level: crate::models::ExperienceLevel::Beginner,
            training_goal: crate::models::TrainingGoal::Hypertrophy,
            target_sleep_hours: 8.0,
            workout_split: crate::models::WorkoutSplit::Ppl,
            wake_time: ClockTime::new(7, 0).unwrap(),
            timezone: "UTC".to_string(),
        };
        assert!(CheckInValidator::validate_profile(&profile).is_ok());

        profile.target_sleep_hours = 0.0;
        assert!(CheckInValidator::validate_profile(&profile).is_err());
    }
}
