use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a categorical or clock value cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseModelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseModelError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Circadian archetype used to shift the predicted performance peak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chronotype {
    /// Early riser, peaks before midday
    Lion,
    /// Most common rhythm, steady midday peak
    Bear,
    /// Night-leaning rhythm, peaks late
    Wolf,
    /// Light sleeper with a variable peak
    Dolphin,
}

impl Chronotype {
    pub const ALL: [Chronotype; 4] = [
        Chronotype::Lion,
        Chronotype::Bear,
        Chronotype::Wolf,
        Chronotype::Dolphin,
    ];

    /// Phase shift of the circadian peak in hours
    pub fn phase_shift_hours(&self) -> i32 {
        match self {
            Chronotype::Lion => -1,
            Chronotype::Bear => 0,
            Chronotype::Wolf => 2,
            Chronotype::Dolphin => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Chronotype::Lion => "lion",
            Chronotype::Bear => "bear",
            Chronotype::Wolf => "wolf",
            Chronotype::Dolphin => "dolphin",
        }
    }
}

impl fmt::Display for Chronotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chronotype {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lion" => Ok(Chronotype::Lion),
            "bear" => Ok(Chronotype::Bear),
            "wolf" => Ok(Chronotype::Wolf),
            "dolphin" => Ok(Chronotype::Dolphin),
            _ => Err(ParseModelError::new("chronotype", s)),
        }
    }
}

/// Lifting experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,     // 0-1 year structured lifting
    Intermediate, // 1-3 years with progressive overload
    Advanced,     // 3+ years, periodized blocks
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperienceLevel {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(ExperienceLevel::Beginner),
            "intermediate" => Ok(ExperienceLevel::Intermediate),
            "advanced" => Ok(ExperienceLevel::Advanced),
            _ => Err(ParseModelError::new("experience level", s)),
        }
    }
}

/// Primary training goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingGoal {
    Hypertrophy,
    Strength,
    Cutting,
}

impl TrainingGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingGoal::Hypertrophy => "hypertrophy",
            TrainingGoal::Strength => "strength",
            TrainingGoal::Cutting => "cutting",
        }
    }
}

impl fmt::Display for TrainingGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingGoal {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hypertrophy" => Ok(TrainingGoal::Hypertrophy),
            "strength" => Ok(TrainingGoal::Strength),
            "cutting" => Ok(TrainingGoal::Cutting),
            _ => Err(ParseModelError::new("training goal", s)),
        }
    }
}

/// Weekly workout split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutSplit {
    /// Push, Pull, Legs
    Ppl,
    /// Alternating upper and lower sessions
    UpperLower,
    /// Chest/Back, Shoulders/Arms, Legs
    Arnold,
}

impl WorkoutSplit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutSplit::Ppl => "ppl",
            WorkoutSplit::UpperLower => "upper_lower",
            WorkoutSplit::Arnold => "arnold",
        }
    }
}

impl fmt::Display for WorkoutSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutSplit {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "ppl" => Ok(WorkoutSplit::Ppl),
            "upper_lower" => Ok(WorkoutSplit::UpperLower),
            "arnold" => Ok(WorkoutSplit::Arnold),
            _ => Err(ParseModelError::new("workout split", s)),
        }
    }
}

/// The 13 muscle groups tracked on the body map
///
/// Discriminants double as indices into [`MuscleSoreness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Shoulders = 0,
    Chest = 1,
    Biceps = 2,
    Forearms = 3,
    Abs = 4,
    Quads = 5,
    Calves = 6,
    Traps = 7,
    Lats = 8,
    Triceps = 9,
    LowerBack = 10,
    Glutes = 11,
    Hamstrings = 12,
}

impl MuscleGroup {
    pub const COUNT: usize = 13;

    pub const ALL: [MuscleGroup; MuscleGroup::COUNT] = [
        MuscleGroup::Shoulders,
        MuscleGroup::Chest,
        MuscleGroup::Biceps,
        MuscleGroup::Forearms,
        MuscleGroup::Abs,
        MuscleGroup::Quads,
        MuscleGroup::Calves,
        MuscleGroup::Traps,
        MuscleGroup::Lats,
        MuscleGroup::Triceps,
        MuscleGroup::LowerBack,
        MuscleGroup::Glutes,
        MuscleGroup::Hamstrings,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire key, e.g. `lower_back`
    pub fn as_str(&self) -> &'static str {
        match self {
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Chest => "chest",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Forearms => "forearms",
            MuscleGroup::Abs => "abs",
            MuscleGroup::Quads => "quads",
            MuscleGroup::Calves => "calves",
            MuscleGroup::Traps => "traps",
            MuscleGroup::Lats => "lats",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::LowerBack => "lower_back",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Hamstrings => "hamstrings",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Biceps => "Biceps",
            MuscleGroup::Forearms => "Forearms",
            MuscleGroup::Abs => "Abs",
            MuscleGroup::Quads => "Quads",
            MuscleGroup::Calves => "Calves",
            MuscleGroup::Traps => "Traps",
            MuscleGroup::Lats => "Lats",
            MuscleGroup::Triceps => "Triceps",
            MuscleGroup::LowerBack => "Lower Back",
            MuscleGroup::Glutes => "Glutes",
            MuscleGroup::Hamstrings => "Hamstrings",
        }
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MuscleGroup {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        MuscleGroup::ALL
            .into_iter()
            .find(|group| group.as_str() == key)
            .ok_or_else(|| ParseModelError::new("muscle group", s))
    }
}

/// Per-muscle soreness flag: 0 none, 1 moderate, 2 sore
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SorenessLevel {
    #[default]
    None = 0,
    Moderate = 1,
    Sore = 2,
}

impl SorenessLevel {
    /// Convert a raw integer level, clamping into 0..=2
    pub fn from_level(level: i64) -> Self {
        match level {
            i64::MIN..=0 => SorenessLevel::None,
            1 => SorenessLevel::Moderate,
            _ => SorenessLevel::Sore,
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    /// A level above zero marks the muscle as flagged
    pub fn is_flagged(self) -> bool {
        self != SorenessLevel::None
    }

    pub fn label(&self) -> &'static str {
        match self {
            SorenessLevel::None => "Recovered",
            SorenessLevel::Moderate => "Recovering",
            SorenessLevel::Sore => "Sore",
        }
    }
}

impl fmt::Display for SorenessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Serialize for SorenessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

impl<'de> Deserialize<'de> for SorenessLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        if raw.is_nan() {
            return Ok(SorenessLevel::None);
        }
        Ok(SorenessLevel::from_level(raw.round() as i64))
    }
}

/// Soreness level for every muscle group, indexed by [`MuscleGroup`]
///
/// On the wire this is a map keyed by muscle name. Missing groups read as
/// zero and unknown keys are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MuscleSoreness([SorenessLevel; MuscleGroup::COUNT]);

impl MuscleSoreness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, group: MuscleGroup) -> SorenessLevel {
        self.0[group.index()]
    }

    pub fn set(&mut self, group: MuscleGroup, level: SorenessLevel) {
        self.0[group.index()] = level;
    }

    /// Builder-style setter
    pub fn with(mut self, group: MuscleGroup, level: SorenessLevel) -> Self {
        self.set(group, level);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (MuscleGroup, SorenessLevel)> + '_ {
        MuscleGroup::ALL.into_iter().map(move |group| (group, self.get(group)))
    }

    /// Groups with a level above zero
    pub fn flagged(&self) -> impl Iterator<Item = MuscleGroup> + '_ {
        self.iter()
            .filter(|(_, level)| level.is_flagged())
            .map(|(group, _)| group)
    }

    /// Mean level across all 13 groups (0.0-2.0)
    pub fn average_level(&self) -> f64 {
        let total: u32 = self.0.iter().map(|level| u32::from(level.value())).sum();
        f64::from(total) / MuscleGroup::COUNT as f64
    }

    pub fn is_clear(&self) -> bool {
        self.0.iter().all(|level| !level.is_flagged())
    }
}

impl Index<MuscleGroup> for MuscleSoreness {
    type Output = SorenessLevel;

    fn index(&self, group: MuscleGroup) -> &Self::Output {
        &self.0[group.index()]
    }
}

impl FromIterator<(MuscleGroup, SorenessLevel)> for MuscleSoreness {
    fn from_iter<I: IntoIterator<Item = (MuscleGroup, SorenessLevel)>>(iter: I) -> Self {
        let mut soreness = MuscleSoreness::new();
        for (group, level) in iter {
            soreness.set(group, level);
        }
        soreness
    }
}

impl Serialize for MuscleSoreness {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MuscleGroup::COUNT))?;
        for (group, level) in self.iter() {
            map.serialize_entry(group.as_str(), &level)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MuscleSoreness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SorenessMapVisitor;

        impl<'de> Visitor<'de> for SorenessMapVisitor {
            type Value = MuscleSoreness;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of muscle group to soreness level")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(MuscleSoreness::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut soreness = MuscleSoreness::new();
                while let Some(key) = access.next_key::<String>()? {
                    match key.parse::<MuscleGroup>() {
                        Ok(group) => {
                            let level = access.next_value::<SorenessLevel>()?;
                            soreness.set(group, level);
                        }
                        Err(_) => {
                            access.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(soreness)
            }
        }

        deserializer.deserialize_any(SorenessMapVisitor)
    }
}

/// Wall-clock time of day in 24-hour `HH:MM` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn minutes_of_day(&self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseModelError::new("clock time", s);
        let (hour, minute) = s.trim().split_once(':').ok_or_else(err)?;

        let valid_part = |part: &str| {
            (1..=2).contains(&part.len()) && part.chars().all(|c| c.is_ascii_digit())
        };
        if !valid_part(hour) || minute.len() != 2 || !valid_part(minute) {
            return Err(err());
        }

        let hour: u8 = hour.parse().map_err(|_| err())?;
        let minute: u8 = minute.parse().map_err(|_| err())?;
        ClockTime::new(hour, minute).ok_or_else(err)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// User fitness profile captured during onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Unique user identifier
    pub id: String,

    pub chronotype: Chronotype,

    pub experience_level: ExperienceLevel,

    pub training_goal: TrainingGoal,

    /// Nightly sleep target in hours
    pub target_sleep_hours: f64,

    pub workout_split: WorkoutSplit,

    /// Habitual wake time (local)
    pub wake_time: ClockTime,

    /// IANA timezone name, e.g. `America/New_York`
    pub timezone: String,
}

/// One daily self-report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCheckIn {
    /// When the check-in was recorded
    pub date: DateTime<Utc>,

    /// Hours slept the previous night
    pub sleep_duration_hours: f64,

    pub wake_time: ClockTime,

    /// Perceived stress 0-10
    pub stress: u8,

    /// Free-text note on the prior day's session
    #[serde(default)]
    pub yesterday_workout: String,

    /// RPE of the last session, conventionally 1-10
    pub last_session_rpe: u8,

    /// Whole-body soreness 0-10
    pub subjective_soreness: u8,

    #[serde(default)]
    pub muscle_soreness: MuscleSoreness,
}

impl DailyCheckIn {
    /// Calendar day (UTC) this check-in belongs to
    pub fn day_key(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// Neutral check-in used for an account with no history: target sleep,
    /// habitual wake time, nothing sore.
    pub fn baseline_for(profile: &UserProfile, date: DateTime<Utc>) -> Self {
        Self {
            date,
            sleep_duration_hours: profile.target_sleep_hours,
            wake_time: profile.wake_time,
            stress: 0,
            yesterday_workout: String::new(),
            last_session_rpe: 0,
            subjective_soreness: 0,
            muscle_soreness: MuscleSoreness::new(),
        }
    }
}

/// Traffic-light training recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessState {
    /// GO, full intensity
    Green,
    /// CAUTION, calibrated volume
    Yellow,
    /// NO-GO, recovery only
    Red,
}

impl ReadinessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessState::Green => "green",
            ReadinessState::Yellow => "yellow",
            ReadinessState::Red => "red",
        }
    }

    /// Fixed rationale attached to each state
    pub fn summary(&self) -> &'static str {
        match self {
            ReadinessState::Green => "Go for heavy compounds and high intent sets.",
            ReadinessState::Yellow => {
                "Proceed with calibrated volume and keep 1-2 reps in reserve."
            }
            ReadinessState::Red => {
                "No-go for maximal lifting. Prioritize mobility, blood flow, and recovery."
            }
        }
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadinessState {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "green" => Ok(ReadinessState::Green),
            "yellow" => Ok(ReadinessState::Yellow),
            "red" => Ok(ReadinessState::Red),
            _ => Err(ParseModelError::new("readiness state", s)),
        }
    }
}

/// Hour offsets from wake bounding the modeled strength peak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakWindow {
    pub start_hour: u8,
    pub end_hour: u8,
}

/// Modeled performance for each hour of the day (index = hour of day)
pub type HourlyPerformance = [u8; 24];

/// Daily readiness view derived from the latest check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessScore {
    /// Composite score 0-100
    pub score: u8,

    pub state: ReadinessState,

    pub summary: String,

    pub peak_window: PeakWindow,

    pub hourly_performance: HourlyPerformance,

    /// When this view was computed
    pub updated_at: DateTime<Utc>,
}
