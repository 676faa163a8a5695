//! Integration tests for the scoring core
//!
//! Exercises recovery, readiness and the hourly curve through the public
//! crate API only.

use aura::circadian::{MAX_PERFORMANCE, MIN_PERFORMANCE};
use aura::{
    build_hourly_performance, build_readiness_score, compute_recovery_status, Chronotype,
    ClockTime, DailyCheckIn, ExperienceLevel, MuscleGroup, MuscleSoreness, ReadinessState,
    SorenessLevel, TrainingGoal, UserProfile, WorkoutSplit,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

fn profile(target_sleep_hours: f64) -> UserProfile {
    UserProfile {
        id: "athlete-01".to_string(),
        chronotype: Chronotype::Bear,
        experience_level: ExperienceLevel::Intermediate,
        training_goal: TrainingGoal::Strength,
        target_sleep_hours,
        workout_split: WorkoutSplit::UpperLower,
        wake_time: ClockTime::new(7, 0).unwrap(),
        timezone: "UTC".to_string(),
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn check_in(date: DateTime<Utc>, soreness: u8, muscles: MuscleSoreness) -> DailyCheckIn {
    DailyCheckIn {
        date,
        sleep_duration_hours: 7.5,
        wake_time: ClockTime::new(7, 0).unwrap(),
        stress: 0,
        yesterday_workout: String::new(),
        last_session_rpe: 7,
        subjective_soreness: soreness,
        muscle_soreness: muscles,
    }
}

fn quads_sore() -> MuscleSoreness {
    MuscleSoreness::new().with(MuscleGroup::Quads, SorenessLevel::Sore)
}

#[test]
fn test_empty_history_is_fully_recovered() {
    let status = compute_recovery_status(&[]);
    for group in MuscleGroup::ALL {
        assert_eq!(status.get(group), SorenessLevel::None);
    }
}

#[test]
fn test_flag_on_newest_entry_is_sore() {
    let history = vec![check_in(now(), 10, quads_sore())];
    let status = compute_recovery_status(&history);
    assert_eq!(status.get(MuscleGroup::Quads), SorenessLevel::Sore);
    assert_eq!(status.flagged().count(), 1);
}

#[test]
fn test_large_muscle_decay_over_days() {
    // Quads are large: 6 days to recover at soreness 10
    let flagged_at = |days: f64| now() - Duration::milliseconds((days * 86_400_000.0) as i64);

    let recovering = vec![
        check_in(now(), 0, MuscleSoreness::new()),
        check_in(flagged_at(3.5), 10, quads_sore()),
    ];
    assert_eq!(
        compute_recovery_status(&recovering).get(MuscleGroup::Quads),
        SorenessLevel::Moderate
    );

    let recovered = vec![
        check_in(now(), 0, MuscleSoreness::new()),
        check_in(flagged_at(6.5), 10, quads_sore()),
    ];
    assert_eq!(
        compute_recovery_status(&recovered).get(MuscleGroup::Quads),
        SorenessLevel::None
    );
}

#[test]
fn test_newer_flag_supersedes_older() {
    let history = vec![
        check_in(now(), 0, MuscleSoreness::new()),
        // Most recent flag, mild day: large muscle needs 2.5 + 0.35 * 1 days
        check_in(now() - Duration::days(3), 1, quads_sore()),
        // Older, brutal flag that alone would still be open
        check_in(now() - Duration::days(4), 10, quads_sore()),
    ];
    assert_eq!(
        compute_recovery_status(&history).get(MuscleGroup::Quads),
        SorenessLevel::None
    );
}

#[test]
fn test_baseline_readiness() {
    let readiness = build_readiness_score(
        &profile(7.5),
        &check_in(now(), 0, MuscleSoreness::new()),
        &[],
    );
    assert_eq!(readiness.score, 96);
    assert_eq!(readiness.state, ReadinessState::Green);
    assert_eq!(readiness.peak_window.start_hour, 6);
    assert_eq!(readiness.peak_window.end_hour, 11);
}

#[test]
fn test_readiness_wire_shape() {
    let readiness = build_readiness_score(
        &profile(7.5),
        &check_in(now(), 0, MuscleSoreness::new()),
        &[],
    );
    let json = serde_json::to_value(&readiness).unwrap();
    assert_eq!(json["state"], "green");
    assert_eq!(json["peakWindow"]["startHour"], 6);
    assert_eq!(json["hourlyPerformance"].as_array().unwrap().len(), 24);
    assert!(json["updatedAt"].is_string());
}

#[test]
fn test_check_in_wire_shape_tolerates_unknown_muscles() {
    let json = r#"{
        "date": "2026-03-01T12:00:00Z",
        "sleepDurationHours": 6.5,
        "wakeTime": "06:15",
        "stress": 3,
        "lastSessionRpe": 8,
        "subjectiveSoreness": 4,
        "muscleSoreness": { "quads": 2, "neck": 1, "lower_back": 5 }
    }"#;
    let parsed: DailyCheckIn = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.muscle_soreness.get(MuscleGroup::Quads), SorenessLevel::Sore);
    assert_eq!(parsed.muscle_soreness.get(MuscleGroup::LowerBack), SorenessLevel::Sore);
    assert_eq!(parsed.muscle_soreness.flagged().count(), 2);
    assert_eq!(parsed.yesterday_workout, "");
}

#[test]
fn test_curve_bounds_at_extremes() {
    for chronotype in Chronotype::ALL {
        let curve = build_hourly_performance(ClockTime::new(5, 0).unwrap(), chronotype, 10, 0.0);
        assert_eq!(curve.len(), 24);
        assert!(curve.iter().all(|v| (MIN_PERFORMANCE..=MAX_PERFORMANCE).contains(v)));
        assert!(curve.contains(&MIN_PERFORMANCE));

        let curve = build_hourly_performance(ClockTime::new(5, 0).unwrap(), chronotype, 0, 14.0);
        assert!(curve.iter().all(|v| (MIN_PERFORMANCE..=MAX_PERFORMANCE).contains(v)));
        assert!(curve.contains(&MAX_PERFORMANCE));
    }
}

proptest! {
    #[test]
    fn test_readiness_is_deterministic_and_bounded(
        sleep in 0.0f64..14.0,
        stress in 0u8..=10,
        rpe in 0u8..=10,
        soreness in 0u8..=10,
        levels in proptest::collection::vec(0i64..=2, 13),
        prior_levels in proptest::collection::vec(0i64..=2, 0..5)
    ) {
        let muscles: MuscleSoreness = MuscleGroup::ALL
            .into_iter()
            .zip(levels.into_iter().map(SorenessLevel::from_level))
            .collect();
        let mut current = check_in(now(), soreness, muscles);
        current.sleep_duration_hours = sleep;
        current.stress = stress;
        current.last_session_rpe = rpe;

        let history: Vec<DailyCheckIn> = prior_levels
            .iter()
            .enumerate()
            .map(|(i, level)| {
                let all: MuscleSoreness = MuscleGroup::ALL
                    .into_iter()
                    .map(|g| (g, SorenessLevel::from_level(*level)))
                    .collect();
                check_in(now() - Duration::days(i as i64 + 1), 0, all)
            })
            .collect();

        let first = build_readiness_score(&profile(8.0), &current, &history);
        let second = build_readiness_score(&profile(8.0), &current, &history);
        prop_assert_eq!(first.score, second.score);
        prop_assert_eq!(first.state, second.state);
        prop_assert_eq!(first.hourly_performance, second.hourly_performance);
        prop_assert!(first.score <= 100);
        prop_assert_eq!(first.state, ReadinessState::from_score(first.score));
    }

    #[test]
    fn test_curve_always_in_range(
        hour in 0u8..24,
        minute in 0u8..60,
        chronotype_index in 0usize..4,
        stress in 0u8..=10,
        sleep in 0.0f64..24.0
    ) {
        let wake = ClockTime::new(hour, minute).unwrap();
        let curve = build_hourly_performance(wake, Chronotype::ALL[chronotype_index], stress, sleep);
        prop_assert!(curve.iter().all(|v| (MIN_PERFORMANCE..=MAX_PERFORMANCE).contains(v)));
    }
}
