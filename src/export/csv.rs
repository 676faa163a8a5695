use super::{ExportError, HistoryRow};
use crate::database::StoredCheckIn;
use std::path::Path;

/// Export check-in history to CSV, one row per day
pub fn export_history<P: AsRef<Path>>(
    records: &[&StoredCheckIn],
    output_path: P,
) -> Result<(), ExportError> {
    let mut writer = ::csv::Writer::from_path(output_path)?;

    for record in records {
        writer.serialize(HistoryRow::from(*record))?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ClockTime, DailyCheckIn, MuscleGroup, MuscleSoreness, ReadinessState, SorenessLevel,
    };
    use chrono::{TimeZone, Utc};
    use tempfile::NamedTempFile;

    fn record(day: u32, score: Option<u8>) -> StoredCheckIn {
        let date = Utc.with_ymd_and_hms(2026, 2, day, 12, 0, 0).unwrap();
        StoredCheckIn {
            user_id: "athlete-01".to_string(),
            day_key: date.date_naive(),
            check_in: DailyCheckIn {
                date,
                sleep_duration_hours: 7.5,
                wake_time: ClockTime::new(6, 30).unwrap(),
                stress: 2,
                yesterday_workout: "Push, heavy".to_string(),
                last_session_rpe: 8,
                subjective_soreness: 3,
                muscle_soreness: MuscleSoreness::new()
                    .with(MuscleGroup::Chest, SorenessLevel::Sore)
                    .with(MuscleGroup::Triceps, SorenessLevel::Moderate),
            },
            readiness_score: score,
            readiness_state: score.map(ReadinessState::from_score),
            profile_snapshot: None,
            created_at: date,
            updated_at: date,
        }
    }

    #[test]
    fn test_export_history_csv() {
        let first = record(16, Some(88));
        let second = record(15, None);
        let temp_file = NamedTempFile::new().unwrap();

        export_history(&[&first, &second], temp_file.path()).unwrap();

        let mut reader = ::csv::Reader::from_path(temp_file.path()).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "day");
        assert_eq!(&headers[6], "sore_muscles");

        let rows: Vec<HistoryRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sore_muscles, "chest:2;triceps:1");
        assert_eq!(rows[0].readiness_state.as_deref(), Some("green"));
        assert_eq!(rows[0].yesterday_workout, "Push, heavy");
        assert_eq!(rows[1].readiness_score, None);
    }
}
