//! Check-in ingestion and dashboard assembly
//!
//! Ties the pure scoring core to storage: payloads are validated, scored
//! against the stored history, persisted one-per-day, and mirrored to the
//! warehouse in the background.

use crate::database::{Database, NewCheckIn, StoredCheckIn};
use crate::directive::{fresh_account_view, TrainingDirective};
use crate::error::{AuraError, Result};
use crate::models::{DailyCheckIn, MuscleSoreness, ReadinessScore, UserProfile};
use crate::readiness::ReadinessCalculator;
use crate::recovery::{MuscleRecovery, RecoveryModel};
use crate::sleep::{sleep_debt, SleepDebt};
use crate::validation::{CheckInPayload, CheckInValidator};
use crate::warehouse::{spawn_mirror, WarehouseLogRow, WarehouseProfileRow, WarehouseSink};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Result of a successful submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedCheckIn {
    pub record: StoredCheckIn,
    pub readiness: ReadinessScore,
}

/// Everything the daily dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub profile: UserProfile,
    pub readiness: ReadinessScore,
    pub directive: TrainingDirective,
    pub recovery: Vec<MuscleRecovery>,
    pub recovery_status: MuscleSoreness,
    pub sleep_debt: SleepDebt,
    /// False for an account without any check-ins yet
    pub has_history: bool,
}

/// Averages over a run of stored check-ins
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub avg_sleep_hours: f64,
    pub avg_stress: f64,
    /// Mean over entries that carry a score, `None` when none do
    pub avg_readiness: Option<f64>,
    pub days: usize,
}

impl HistorySummary {
    /// `None` for an empty history
    pub fn from_records(records: &[StoredCheckIn]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let days = records.len();
        let avg_sleep_hours = records
            .iter()
            .map(|r| r.check_in.sleep_duration_hours)
            .sum::<f64>()
            / days as f64;
        let avg_stress = records
            .iter()
            .map(|r| f64::from(r.check_in.stress))
            .sum::<f64>()
            / days as f64;

        let scores: Vec<f64> = records
            .iter()
            .filter_map(|r| r.readiness_score.map(f64::from))
            .collect();
        let avg_readiness =
            (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);

        Some(Self {
            avg_sleep_hours,
            avg_stress,
            avg_readiness,
            days,
        })
    }
}

pub struct CheckInService {
    db: Database,
    calculator: ReadinessCalculator,
    mirror: Option<Arc<dyn WarehouseSink>>,
}

impl CheckInService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            calculator: ReadinessCalculator::new(),
            mirror: None,
        }
    }

    pub fn with_calculator(mut self, calculator: ReadinessCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn with_mirror(mut self, sink: Arc<dyn WarehouseSink>) -> Self {
        self.mirror = Some(sink);
        self
    }

    pub fn calculator(&self) -> &ReadinessCalculator {
        &self.calculator
    }

    /// Store a new profile, assigning a fresh id when none is given
    pub fn register_profile(&self, mut profile: UserProfile) -> Result<UserProfile> {
        if profile.id.trim().is_empty() {
            profile.id = uuid::Uuid::new_v4().to_string();
        }
        CheckInValidator::validate_profile(&profile)?;
        self.db.upsert_profile(&profile)?;

        tracing::info!(user_id = %profile.id, chronotype = %profile.chronotype, "Profile registered");
        Ok(profile)
    }

    /// Replace an existing profile
    pub fn update_profile(&self, profile: &UserProfile) -> Result<()> {
        CheckInValidator::validate_profile(profile)?;
        self.profile(&profile.id)?;
        self.db.upsert_profile(profile)?;

        tracing::info!(user_id = %profile.id, "Profile updated");
        Ok(())
    }

    pub fn profile(&self, user_id: &str) -> Result<UserProfile> {
        self.db
            .get_profile(user_id)?
            .ok_or_else(|| AuraError::NotFound(format!("profile {}", user_id)))
    }

    /// Validate, score, persist and mirror one check-in
    ///
    /// A second submission for the same calendar day replaces the first.
    /// Scores supplied by the client are ignored.
    pub fn submit(&self, user_id: &str, payload: &CheckInPayload) -> Result<SubmittedCheckIn> {
        let profile = self.profile(user_id)?;
        let check_in = CheckInValidator::validate(payload)?;

        let history = self.prior_history(user_id, &check_in)?;
        let readiness = self.calculator.score(&profile, &check_in, &history);

        if let Some(client_score) = payload.readiness_score {
            if client_score.round() != f64::from(readiness.score) {
                tracing::debug!(
                    user_id,
                    client_score,
                    server_score = readiness.score,
                    "Ignoring client-supplied readiness score"
                );
            }
        }

        let record = self.db.upsert_check_in(NewCheckIn {
            user_id,
            check_in: &check_in,
            readiness_score: Some(readiness.score),
            readiness_state: Some(readiness.state),
            profile_snapshot: Some(&profile),
        })?;

        tracing::info!(
            user_id,
            day = %record.day_key,
            score = readiness.score,
            state = %readiness.state,
            "Check-in stored"
        );

        if let Some(sink) = &self.mirror {
            spawn_mirror(
                Arc::clone(sink),
                WarehouseLogRow::from(&record),
                Some(WarehouseProfileRow::from_profile(&profile, record.updated_at)),
            );
        }

        Ok(SubmittedCheckIn { record, readiness })
    }

    /// Stored check-ins strictly older than `check_in`, newest first,
    /// excluding anything recorded on the same day
    fn prior_history(&self, user_id: &str, check_in: &DailyCheckIn) -> Result<Vec<DailyCheckIn>> {
        let day = check_in.day_key();
        Ok(self
            .db
            .list_check_ins(user_id, None)?
            .into_iter()
            .filter(|stored| stored.day_key != day && stored.check_in.date < check_in.date)
            .map(|stored| stored.check_in)
            .collect())
    }

    /// Stored check-ins, newest first
    pub fn history(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<StoredCheckIn>> {
        Ok(self.db.list_check_ins(user_id, limit)?)
    }

    /// Summary of the same check-ins `history` returns
    pub fn history_summary(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Option<HistorySummary>> {
        Ok(HistorySummary::from_records(&self.history(user_id, limit)?))
    }

    /// Delete every check-in of a user, returning the number removed
    pub fn reset_history(&self, user_id: &str) -> Result<usize> {
        let deleted = self.db.delete_check_ins(user_id)?;
        tracing::info!(user_id, deleted, "Check-in history reset");
        Ok(deleted)
    }

    pub fn dashboard(&self, user_id: &str) -> Result<Dashboard> {
        self.dashboard_at(user_id, Utc::now())
    }

    /// Dashboard with an explicit computation timestamp
    pub fn dashboard_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<Dashboard> {
        let profile = self.profile(user_id)?;
        let history: Vec<DailyCheckIn> = self
            .db
            .list_check_ins(user_id, None)?
            .into_iter()
            .map(|stored| stored.check_in)
            .collect();

        let readiness = match history.split_first() {
            Some((latest, older)) => self.calculator.score_at(&profile, latest, older, now),
            None => {
                let baseline = DailyCheckIn::baseline_for(&profile, now);
                fresh_account_view(self.calculator.score_at(&profile, &baseline, &[], now))
            }
        };

        Ok(Dashboard {
            directive: TrainingDirective::for_readiness(&readiness),
            recovery: RecoveryModel::breakdown(&history),
            recovery_status: RecoveryModel::current_status(&history),
            sleep_debt: sleep_debt(&history, profile.target_sleep_hours),
            has_history: !history.is_empty(),
            readiness,
            profile,
        })
    }

    /// Rescored history, newest first
    pub fn timeline(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<ReadinessScore>> {
        let profile = self.profile(user_id)?;
        let history: Vec<DailyCheckIn> = self
            .db
            .list_check_ins(user_id, None)?
            .into_iter()
            .map(|stored| stored.check_in)
            .collect();

        let mut timeline = self.calculator.score_timeline(&profile, &history);
        if let Some(limit) = limit {
            timeline.truncate(limit);
        }
        Ok(timeline)
    }
}
