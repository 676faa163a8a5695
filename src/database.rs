use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::{DailyCheckIn, ReadinessState, UserProfile};

/// Database error types
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Data not found: {0}")]
    NotFound(String),
}

/// A persisted check-in with the readiness stamped at write time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCheckIn {
    pub user_id: String,

    /// Upsert key together with `user_id`
    pub day_key: NaiveDate,

    #[serde(flatten)]
    pub check_in: DailyCheckIn,

    pub readiness_score: Option<u8>,

    pub readiness_state: Option<ReadinessState>,

    /// Profile as it was when the check-in was submitted
    pub profile_snapshot: Option<UserProfile>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Fields written by an upsert
pub struct NewCheckIn<'a> {
    pub user_id: &'a str,
    pub check_in: &'a DailyCheckIn,
    pub readiness_score: Option<u8>,
    pub readiness_state: Option<ReadinessState>,
    pub profile_snapshot: Option<&'a UserProfile>,
}

/// Database connection and management
pub struct Database {
    conn: Connection,
}

const CHECK_IN_COLUMNS: &str = "user_id, day_key, date, sleep_duration_hours, wake_time, stress, \
     yesterday_workout, last_session_rpe, subjective_soreness, muscle_soreness, \
     readiness_score, readiness_state, profile_snapshot, created_at, updated_at";

impl Database {
    /// Create or open a database at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, DatabaseError> {
        let conn = Connection::open(db_path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Private in-memory database
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema with tables and indexes
    fn init_schema(&self) -> Result<(), DatabaseError> {
        // In-memory databases answer "memory" here
        let _mode: String = self
            .conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;

        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                chronotype TEXT NOT NULL,
                experience_level TEXT NOT NULL,
                training_goal TEXT NOT NULL,
                target_sleep_hours REAL NOT NULL,
                workout_split TEXT NOT NULL,
                wake_time TEXT NOT NULL,
                timezone TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS check_ins (
                user_id TEXT NOT NULL,
                day_key DATE NOT NULL,
                date DATETIME NOT NULL,
                sleep_duration_hours REAL NOT NULL,
                wake_time TEXT NOT NULL,
                stress INTEGER NOT NULL,
                yesterday_workout TEXT NOT NULL DEFAULT '',
                last_session_rpe INTEGER NOT NULL,
                subjective_soreness INTEGER NOT NULL,
                muscle_soreness TEXT NOT NULL,

                -- Stamped at write time
                readiness_score INTEGER,
                readiness_state TEXT,
                profile_snapshot TEXT,

                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL,

                UNIQUE (user_id, day_key)
            )
            "#,
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_check_ins_user_date ON check_ins (user_id, date DESC)",
            [],
        )?;

        Ok(())
    }

    /// Insert or replace a profile
    pub fn upsert_profile(&self, profile: &UserProfile) -> Result<(), DatabaseError> {
        self.conn.execute(
            r#"
            INSERT INTO profiles (
                id, chronotype, experience_level, training_goal, target_sleep_hours,
                workout_split, wake_time, timezone
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                chronotype = excluded.chronotype,
                experience_level = excluded.experience_level,
                training_goal = excluded.training_goal,
                target_sleep_hours = excluded.target_sleep_hours,
                workout_split = excluded.workout_split,
                wake_time = excluded.wake_time,
                timezone = excluded.timezone,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![
                profile.id,
                profile.chronotype.as_str(),
                profile.experience_level.as_str(),
                profile.training_goal.as_str(),
                profile.target_sleep_hours,
                profile.workout_split.as_str(),
                profile.wake_time.to_string(),
                profile.timezone,
            ],
        )?;
        Ok(())
    }

    /// Fetch a profile by id
    pub fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DatabaseError> {
        let profile = self
            .conn
            .query_row(
                r#"
                SELECT id, chronotype, experience_level, training_goal, target_sleep_hours,
                       workout_split, wake_time, timezone
                FROM profiles WHERE id = ?1
                "#,
                params![user_id],
                |row| {
                    Ok(UserProfile {
                        id: row.get(0)?,
                        chronotype: parse_text(row, 1)?,
                        experience_level: parse_text(row, 2)?,
                        training_goal: parse_text(row, 3)?,
                        target_sleep_hours: row.get(4)?,
                        workout_split: parse_text(row, 5)?,
                        wake_time: parse_text(row, 6)?,
                        timezone: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    /// Insert a check-in, or replace the one already stored for that user and day
    pub fn upsert_check_in(&self, new: NewCheckIn<'_>) -> Result<StoredCheckIn, DatabaseError> {
        let check_in = new.check_in;
        let day_key = check_in.day_key();
        let now = Utc::now();

        let muscle_soreness = serde_json::to_string(&check_in.muscle_soreness)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
        let profile_snapshot = new
            .profile_snapshot
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        self.conn.execute(
            r#"
            INSERT INTO check_ins (
                user_id, day_key, date, sleep_duration_hours, wake_time, stress,
                yesterday_workout, last_session_rpe, subjective_soreness, muscle_soreness,
                readiness_score, readiness_state, profile_snapshot, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
            ON CONFLICT(user_id, day_key) DO UPDATE SET
                date = excluded.date,
                sleep_duration_hours = excluded.sleep_duration_hours,
                wake_time = excluded.wake_time,
                stress = excluded.stress,
                yesterday_workout = excluded.yesterday_workout,
                last_session_rpe = excluded.last_session_rpe,
                subjective_soreness = excluded.subjective_soreness,
                muscle_soreness = excluded.muscle_soreness,
                readiness_score = excluded.readiness_score,
                readiness_state = excluded.readiness_state,
                profile_snapshot = excluded.profile_snapshot,
                updated_at = excluded.updated_at
            "#,
            params![
                new.user_id,
                day_key,
                check_in.date,
                check_in.sleep_duration_hours,
                check_in.wake_time.to_string(),
                check_in.stress,
                check_in.yesterday_workout,
                check_in.last_session_rpe,
                check_in.subjective_soreness,
                muscle_soreness,
                new.readiness_score,
                new.readiness_state.map(|state| state.as_str()),
                profile_snapshot,
                now,
            ],
        )?;

        self.get_check_in(new.user_id, day_key)?.ok_or_else(|| {
            DatabaseError::NotFound(format!("check-in {} for {}", day_key, new.user_id))
        })
    }

    /// Fetch the check-in stored for a user and day
    pub fn get_check_in(
        &self,
        user_id: &str,
        day_key: NaiveDate,
    ) -> Result<Option<StoredCheckIn>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM check_ins WHERE user_id = ?1 AND day_key = ?2",
            CHECK_IN_COLUMNS
        );
        let stored = self
            .conn
            .query_row(&sql, params![user_id, day_key], row_to_stored)
            .optional()?;
        Ok(stored)
    }

    /// Check-ins for a user, newest first
    pub fn list_check_ins(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<StoredCheckIn>, DatabaseError> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let sql = format!(
            "SELECT {} FROM check_ins WHERE user_id = ?1 ORDER BY date DESC LIMIT ?2",
            CHECK_IN_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, limit], row_to_stored)?;

        let mut check_ins = Vec::new();
        for row in rows {
            check_ins.push(row?);
        }
        Ok(check_ins)
    }

    /// Delete every check-in of a user, returning how many were removed
    pub fn delete_check_ins(&self, user_id: &str) -> Result<usize, DatabaseError> {
        let deleted = self
            .conn
            .execute("DELETE FROM check_ins WHERE user_id = ?1", params![user_id])?;
        Ok(deleted)
    }

    pub fn count_check_ins(&self, user_id: &str) -> Result<usize, DatabaseError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM check_ins WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn row_to_stored(row: &Row<'_>) -> rusqlite::Result<StoredCheckIn> {
    let muscle_soreness = parse_json(row, 9)?;
    let readiness_state = row
        .get::<_, Option<String>>(11)?
        .map(|raw| {
            raw.parse::<ReadinessState>()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))
        })
        .transpose()?;
    let profile_snapshot = row
        .get::<_, Option<String>>(12)?
        .map(|raw| {
            serde_json::from_str(&raw)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(12, Type::Text, Box::new(e)))
        })
        .transpose()?;

    Ok(StoredCheckIn {
        user_id: row.get(0)?,
        day_key: row.get(1)?,
        check_in: DailyCheckIn {
            date: row.get(2)?,
            sleep_duration_hours: row.get(3)?,
            wake_time: parse_text(row, 4)?,
            stress: row.get(5)?,
            yesterday_workout: row.get(6)?,
            last_session_rpe: row.get(7)?,
            subjective_soreness: row.get(8)?,
            muscle_soreness,
        },
        readiness_score: row.get(10)?,
        readiness_state,
        profile_snapshot,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

/// Read a TEXT column through `FromStr`
fn parse_text<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a JSON TEXT column
fn parse_json<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
