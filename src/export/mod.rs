use crate::database::StoredCheckIn;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub mod csv;
pub mod json;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl ExportFormat {
    /// Infer the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        extension.parse()
    }
}

/// Date range filter for exports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        DateRange { start, end }
    }

    /// Check if a date falls within this range
    pub fn contains(&self, date: &NaiveDate) -> bool {
        let after_start = self.start.map_or(true, |start| date >= &start);
        let before_end = self.end.map_or(true, |end| date <= &end);
        after_start && before_end
    }

    pub fn filter<'a>(&self, records: &'a [StoredCheckIn]) -> Vec<&'a StoredCheckIn> {
        records.iter().filter(|r| self.contains(&r.day_key)).collect()
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] ::csv::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// One check-in flattened for spreadsheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub day: NaiveDate,
    pub sleep_hours: f64,
    pub wake_time: String,
    pub stress: u8,
    pub last_session_rpe: u8,
    pub subjective_soreness: u8,
    /// Flagged muscles as `group:level`, separated by `;`
    pub sore_muscles: String,
    pub readiness_score: Option<u8>,
    pub readiness_state: Option<String>,
    pub yesterday_workout: String,
}

impl From<&StoredCheckIn> for HistoryRow {
    fn from(stored: &StoredCheckIn) -> Self {
        let check_in = &stored.check_in;
        let sore_muscles = check_in
            .muscle_soreness
            .iter()
            .filter(|(_, level)| level.is_flagged())
            .map(|(group, level)| format!("{}:{}", group.as_str(), level.value()))
            .collect::<Vec<_>>()
            .join(";");

        HistoryRow {
            day: stored.day_key,
            sleep_hours: check_in.sleep_duration_hours,
            wake_time: check_in.wake_time.to_string(),
            stress: check_in.stress,
            last_session_rpe: check_in.last_session_rpe,
            subjective_soreness: check_in.subjective_soreness,
            sore_muscles,
            readiness_score: stored.readiness_score,
            readiness_state: stored.readiness_state.map(|s| s.as_str().to_string()),
            yesterday_workout: check_in.yesterday_workout.clone(),
        }
    }
}

/// Write stored check-ins in the requested format, returning the number written
pub fn export_history<P: AsRef<Path>>(
    records: &[&StoredCheckIn],
    format: ExportFormat,
    output_path: P,
) -> Result<usize, ExportError> {
    match format {
        ExportFormat::Csv => csv::export_history(records, output_path)?,
        ExportFormat::Json => json::export_json(&records, output_path)?,
    }

    tracing::info!(count = records.len(), format = ?format, "Exported check-in history");
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path("out/history.json").unwrap(), ExportFormat::Json);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(_))
        ));
        assert!(ExportFormat::from_path("history").is_err());
    }

    #[test]
    fn test_date_range() {
        let range = DateRange::new(NaiveDate::from_ymd_opt(2026, 2, 1), None);
        assert!(range.contains(&NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()));
        assert!(!range.contains(&NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()));
        assert!(DateRange::default().contains(&NaiveDate::MIN));
    }
}
