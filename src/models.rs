use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Habits every fresh profile starts with.
pub const DEFAULT_HABITS: [&str; 3] = ["Drink water", "Move your body", "Read 10 pages"];

/// Habit name to completion flag for one date. Missing habits count as `false`.
pub type DayRecord = BTreeMap<String, bool>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub habits: Vec<String>,
    pub completions: BTreeMap<String, DayRecord>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            habits: DEFAULT_HABITS.iter().map(|habit| habit.to_string()).collect(),
            completions: BTreeMap::new(),
        }
    }
}

impl Profile {
    pub fn has_habit(&self, name: &str) -> bool {
        self.habits.iter().any(|habit| habit == name)
    }

    /// True when there is nothing worth keeping: no habits and no history.
    pub fn is_blank(&self) -> bool {
        self.habits.is_empty() && self.completions.is_empty()
    }

    pub fn day(&self, key: &str) -> Option<&DayRecord> {
        self.completions.get(key)
    }

    /// Returns the record for `key`, creating an empty one on first access.
    pub fn ensure_day(&mut self, key: &str) -> &mut DayRecord {
        self.completions.entry(key.to_string()).or_default()
    }

    pub fn is_done(&self, key: &str, habit: &str) -> bool {
        self.day(key)
            .and_then(|day| day.get(habit).copied())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProfileId {
    #[default]
    Me,
    Friend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Profiles {
    pub me: Profile,
    pub friend: Profile,
}

/// The whole persisted state: both profiles plus bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDocument {
    pub profiles: Profiles,
    pub active_profile: ProfileId,
    /// Epoch milliseconds of the last save. Only used to rank recovery candidates.
    pub updated_at: i64,
}

impl StateDocument {
    /// Both profiles seeded with the default habits and no history.
    pub fn seeded(updated_at: i64) -> Self {
        Self {
            profiles: Profiles::default(),
            active_profile: ProfileId::Me,
            updated_at,
        }
    }

    /// The profile all queries and mutations act on. `active_profile` is
    /// stored but never consulted; this is always `me`.
    pub fn current_profile(&self) -> &Profile {
        &self.profiles.me
    }

    pub fn current_profile_mut(&mut self) -> &mut Profile {
        &mut self.profiles.me
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a canonical `YYYY-MM-DD` key. Unpadded or otherwise
/// non-canonical spellings are rejected.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    if key.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()?;
    (date_key(date) == key).then_some(date)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayState {
    Done,
    Partial,
    None,
    NoHabits,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStatus {
    pub label: String,
    pub percent: f64,
    pub color_hint: &'static str,
    pub state: DayState,
}

#[derive(Debug, Serialize)]
pub struct DayPoint {
    pub date: String,
    pub percent: f64,
    pub state: DayState,
}

#[derive(Debug, Serialize)]
pub struct MonthlySummary {
    pub month: String,
    pub days_completed: u32,
    pub partial_days: u32,
    pub no_progress_days: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Serialize)]
pub struct CalendarCell {
    pub date: String,
    pub day: u32,
    pub muted: bool,
    pub state: DayState,
    pub ticks: Vec<bool>,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub month: String,
    pub cells: Vec<CalendarCell>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub weekly: Vec<DayPoint>,
    pub chart: Vec<DayPoint>,
    pub monthly: MonthlySummary,
}

#[derive(Debug, Serialize)]
pub struct HabitEntry {
    pub name: String,
    pub done: bool,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub date: String,
    pub habits: Vec<HabitEntry>,
    pub status: DayStatus,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddHabitRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AddHabitResponse {
    pub added: bool,
    pub habits: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub date: String,
    pub habit: String,
    pub value: bool,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub confirm: bool,
    pub document: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    pub outcome: crate::ops::Outcome,
}
