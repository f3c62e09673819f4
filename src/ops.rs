//! Everything that changes the state document.
//!
//! Each operation validates completely before touching the document, then
//! mutates and saves. There is no rollback.

use crate::errors::{HabitError, StorageError};
use crate::migrate::find_best_candidate;
use crate::models::{DayRecord, Profile, date_key, parse_date_key};
use crate::normalize::normalize;
use crate::storage::SlotStore;
use crate::store::StateStore;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::ops::Bound;
use tracing::info;

/// Questions the user must answer before destructive operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    ClearAll,
    ImportBackup,
    RestoreRecovered,
    AutoRestore,
}

impl Prompt {
    pub fn message(self) -> &'static str {
        match self {
            Prompt::ClearAll => "Clear all saved habit data? This will erase past days too.",
            Prompt::ImportBackup => "Import this backup? It will replace current data.",
            Prompt::RestoreRecovered => {
                "Restore the most recent data found? This will replace current data."
            }
            Prompt::AutoRestore => "Found previous data. Restore it now?",
        }
    }
}

/// Asks the user to confirm a [`Prompt`].
pub trait Confirmation {
    fn confirm(&mut self, prompt: Prompt) -> bool;
}

impl<F: FnMut(Prompt) -> bool> Confirmation for F {
    fn confirm(&mut self, prompt: Prompt) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    /// The user declined. Nothing changed.
    Cancelled,
    /// There was nothing to recover.
    NotFound,
    /// Auto-recovery only runs for a blank profile.
    Skipped,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl<S: SlotStore> StateStore<S> {
    /// Appends a trimmed, previously unknown habit name.
    pub fn add_habit(&mut self, name: &str) -> Result<(), HabitError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HabitError::EmptyHabitName);
        }
        if self.current_profile().has_habit(name) {
            return Err(HabitError::DuplicateHabit(name.to_string()));
        }

        self.current_profile_mut().habits.push(name.to_string());
        self.save()?;
        Ok(())
    }

    pub fn remove_habit(&mut self, name: &str) -> Result<(), HabitError> {
        self.remove_habit_at(today(), name)
    }

    /// Removes a habit and its flags everywhere, unless any day before
    /// `today` has a flag for it.
    pub fn remove_habit_at(&mut self, today: NaiveDate, name: &str) -> Result<(), HabitError> {
        if !self.current_profile().has_habit(name) {
            return Err(HabitError::UnknownHabit(name.to_string()));
        }
        if has_locked_history(self.current_profile(), today, name) {
            return Err(HabitError::LockedHistory(name.to_string()));
        }

        let profile = self.current_profile_mut();
        profile.habits.retain(|habit| habit != name);
        for day in profile.completions.values_mut() {
            day.remove(name);
        }
        self.save()?;
        Ok(())
    }

    pub fn toggle_completion(
        &mut self,
        key: &str,
        habit: &str,
        value: bool,
    ) -> Result<(), HabitError> {
        self.toggle_completion_at(today(), key, habit, value)
    }

    /// Sets one habit's flag. Only `today`'s record may change.
    pub fn toggle_completion_at(
        &mut self,
        today: NaiveDate,
        key: &str,
        habit: &str,
        value: bool,
    ) -> Result<(), HabitError> {
        if parse_date_key(key).is_none() {
            return Err(HabitError::InvalidDateKey(key.to_string()));
        }
        if key != date_key(today) {
            return Err(HabitError::PastDayLocked(key.to_string()));
        }
        if !self.current_profile().has_habit(habit) {
            return Err(HabitError::UnknownHabit(habit.to_string()));
        }

        self.current_profile_mut()
            .ensure_day(key)
            .insert(habit.to_string(), value);
        self.save()?;
        Ok(())
    }

    pub fn reset_today(&mut self) -> Result<(), HabitError> {
        self.reset_today_at(today())
    }

    /// Leaves an empty record for `today`.
    pub fn reset_today_at(&mut self, today: NaiveDate) -> Result<(), HabitError> {
        *self.current_profile_mut().ensure_day(&date_key(today)) = DayRecord::new();
        self.save()?;
        Ok(())
    }

    /// Puts the current profile back to the default habits with no history.
    /// The other profile is untouched.
    pub fn clear_all(
        &mut self,
        confirmation: &mut dyn Confirmation,
    ) -> Result<Outcome, HabitError> {
        if !confirmation.confirm(Prompt::ClearAll) {
            return Ok(Outcome::Cancelled);
        }
        *self.current_profile_mut() = Profile::default();
        self.save()?;
        info!("cleared current profile");
        Ok(Outcome::Applied)
    }

    /// The whole document as indented JSON.
    pub fn export(&self) -> Result<String, HabitError> {
        serde_json::to_string_pretty(self.document())
            .map_err(|err| HabitError::Storage(StorageError::Encode(err)))
    }

    /// Replaces the state with a backup file's content.
    pub fn import(
        &mut self,
        content: &str,
        confirmation: &mut dyn Confirmation,
    ) -> Result<Outcome, HabitError> {
        let raw: serde_json::Value = serde_json::from_str(content)
            .map_err(|err| HabitError::ValidationRejected(format!("not valid JSON: {err}")))?;
        self.import_value(&raw, confirmation)
    }

    pub fn import_value(
        &mut self,
        raw: &serde_json::Value,
        confirmation: &mut dyn Confirmation,
    ) -> Result<Outcome, HabitError> {
        let doc = normalize(raw).ok_or_else(|| {
            HabitError::ValidationRejected("not a habit tracker backup".to_string())
        })?;
        if !confirmation.confirm(Prompt::ImportBackup) {
            return Ok(Outcome::Cancelled);
        }
        self.replace_wholesale(doc)?;
        Ok(Outcome::Applied)
    }

    /// Offers the best document found in storage as a replacement.
    pub fn recover(
        &mut self,
        confirmation: &mut dyn Confirmation,
    ) -> Result<Outcome, HabitError> {
        self.restore_candidate(Prompt::RestoreRecovered, confirmation)
    }

    /// Startup variant of [`StateStore::recover`]: only runs while the current
    /// profile has no habits and no history.
    pub fn auto_recover(
        &mut self,
        confirmation: &mut dyn Confirmation,
    ) -> Result<Outcome, HabitError> {
        if !self.current_profile().is_blank() {
            return Ok(Outcome::Skipped);
        }
        self.restore_candidate(Prompt::AutoRestore, confirmation)
    }

    fn restore_candidate(
        &mut self,
        prompt: Prompt,
        confirmation: &mut dyn Confirmation,
    ) -> Result<Outcome, HabitError> {
        let Some(candidate) = find_best_candidate(self.slots())? else {
            return Ok(Outcome::NotFound);
        };
        if !confirmation.confirm(prompt) {
            return Ok(Outcome::Cancelled);
        }
        self.replace_wholesale(candidate)?;
        Ok(Outcome::Applied)
    }
}

/// Whether any day strictly before `today` has a flag for `habit`,
/// whatever its value.
pub fn has_locked_history(profile: &Profile, today: NaiveDate, habit: &str) -> bool {
    let today = date_key(today);
    profile
        .completions
        .range::<str, _>((Bound::Unbounded, Bound::Excluded(today.as_str())))
        .any(|(_, day)| day.contains_key(habit))
}
