//! Analytics warehouse mirror
//!
//! Every stored check-in (and the profile it was scored against) is copied to
//! an analytics sink after the primary write succeeds. The copy runs off the
//! request path: failures are logged and dropped, and nothing waits on it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::database::StoredCheckIn;
use crate::models::{MuscleSoreness, UserProfile};

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Warehouse unavailable: {0}")]
    Unavailable(String),
}

/// One row of the `DAILY_LOGS` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct WarehouseLogRow {
    pub user_id: String,
    pub log_date: NaiveDate,
    pub sleep_hours: f64,
    pub wake_time: String,
    pub stress: u8,
    pub last_session_rpe: u8,
    pub subjective_soreness: u8,
    pub yesterday_workout: String,
    pub muscle_soreness: MuscleSoreness,
    pub readiness_score: Option<u8>,
    pub readiness_state: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&StoredCheckIn> for WarehouseLogRow {
    fn from(stored: &StoredCheckIn) -> Self {
        let check_in = &stored.check_in;
        Self {
            user_id: stored.user_id.clone(),
            log_date: stored.day_key,
            sleep_hours: check_in.sleep_duration_hours,
            wake_time: check_in.wake_time.to_string(),
            stress: check_in.stress,
            last_session_rpe: check_in.last_session_rpe,
            subjective_soreness: check_in.subjective_soreness,
            yesterday_workout: check_in.yesterday_workout.clone(),
            muscle_soreness: check_in.muscle_soreness,
            readiness_score: stored.readiness_score,
            readiness_state: stored.readiness_state.map(|s| s.as_str().to_string()),
            created_at: stored.created_at,
        }
    }
}

/// One row of the `USER_PROFILES` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct WarehouseProfileRow {
    pub user_id: String,
    pub chronotype: String,
    pub experience_level: String,
    pub training_goal: String,
    pub workout_split: String,
    pub target_sleep_hours: f64,
    pub wake_time: String,
    pub updated_at: DateTime<Utc>,
}

impl WarehouseProfileRow {
    pub fn from_profile(profile: &UserProfile, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id: profile.id.clone(),
            chronotype: profile.chronotype.as_str().to_string(),
            experience_level: profile.experience_level.as_str().to_string(),
            training_goal: profile.training_goal.as_str().to_string(),
            workout_split: profile.workout_split.as_str().to_string(),
            target_sleep_hours: profile.target_sleep_hours,
            wake_time: profile.wake_time.to_string(),
            updated_at,
        }
    }
}

/// Destination for mirrored rows
pub trait WarehouseSink: Send + Sync {
    fn sync_log(&self, row: &WarehouseLogRow) -> Result<(), WarehouseError>;

    fn sync_profile(&self, row: &WarehouseProfileRow) -> Result<(), WarehouseError>;
}

#[derive(Serialize)]
#[serde(tag = "table")]
enum TaggedRow<'a> {
    #[serde(rename = "DAILY_LOGS")]
    Log(&'a WarehouseLogRow),
    #[serde(rename = "USER_PROFILES")]
    Profile(&'a WarehouseProfileRow),
}

/// Appends one JSON object per line, tagged with its table name
pub struct JsonLinesWarehouse {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesWarehouse {
    /// Open (or create) the file for appending
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WarehouseError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, row: TaggedRow<'_>) -> Result<(), WarehouseError> {
        let line = serde_json::to_string(&row)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| WarehouseError::Unavailable("writer lock poisoned".to_string()))?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

impl WarehouseSink for JsonLinesWarehouse {
    fn sync_log(&self, row: &WarehouseLogRow) -> Result<(), WarehouseError> {
        self.append(TaggedRow::Log(row))
    }

    fn sync_profile(&self, row: &WarehouseProfileRow) -> Result<(), WarehouseError> {
        self.append(TaggedRow::Profile(row))
    }
}

/// Mirror rows into the sink without blocking the caller
///
/// Runs on the tokio blocking pool when called inside a runtime, otherwise on
/// a detached thread. Errors are logged at `warn` and never retried.
pub fn spawn_mirror(
    sink: Arc<dyn WarehouseSink>,
    log: WarehouseLogRow,
    profile: Option<WarehouseProfileRow>,
) {
    let task = move || {
        mirror_rows(sink.as_ref(), &log, profile.as_ref());
    };

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(task);
        }
        Err(_) => {
            std::thread::spawn(task);
        }
    }
}

fn mirror_rows(
    sink: &dyn WarehouseSink,
    log: &WarehouseLogRow,
    profile: Option<&WarehouseProfileRow>,
) -> bool {
    let mut mirrored = true;

    if let Err(e) = sink.sync_log(log) {
        tracing::warn!(
            user_id = %log.user_id,
            day = %log.log_date,
            error = %e,
            "Warehouse log sync failed"
        );
        mirrored = false;
    }

    // Independent of the log row
    if let Some(profile) = profile {
        if let Err(e) = sink.sync_profile(profile) {
            tracing::warn!(user_id = %profile.user_id, error = %e, "Warehouse profile sync failed");
            mirrored = false;
        }
    }

    if mirrored {
        tracing::debug!(user_id = %log.user_id, day = %log.log_date, "Mirrored check-in to warehouse");
    }
    mirrored
}
