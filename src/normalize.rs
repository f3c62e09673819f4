//! Turns arbitrary parsed JSON into a well-formed [`StateDocument`].
//!
//! The top level is strict: the value must be recognisably one of the known
//! shapes or it is rejected. Everything below a profile is lenient and is
//! coerced to defaults instead.

use crate::models::{
    DayRecord, Profile, ProfileId, Profiles, StateDocument, now_millis, parse_date_key,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The document shapes that have been persisted over time.
enum Shape<'a> {
    /// `{profiles: {me, friend}, activeProfile, updatedAt}`
    Current { me: &'a Value, friend: &'a Value },
    /// `{habits, completions}` from before profiles existed.
    SingleProfile(&'a Value),
}

pub fn normalize(raw: &Value) -> Option<StateDocument> {
    normalize_at(raw, now_millis())
}

/// Like [`normalize`], stamping `now` when the input carries no usable
/// `updatedAt`.
pub fn normalize_at(raw: &Value, now: i64) -> Option<StateDocument> {
    let profiles = match classify(raw)? {
        Shape::Current { me, friend } => Profiles {
            me: ensure_profile(me),
            friend: ensure_profile(friend),
        },
        Shape::SingleProfile(legacy) => Profiles {
            me: ensure_profile(legacy),
            friend: Profile::default(),
        },
    };

    Some(StateDocument {
        profiles,
        active_profile: ProfileId::Me,
        updated_at: timestamp(raw.get("updatedAt")).unwrap_or(now),
    })
}

/// Parses `text` as JSON and normalizes it. Parse errors are a rejection.
pub fn normalize_str(text: &str) -> Option<StateDocument> {
    let raw: Value = serde_json::from_str(text).ok()?;
    normalize(&raw)
}

/// Always yields a usable profile, substituting defaults field by field.
pub fn ensure_profile(raw: &Value) -> Profile {
    let habits = match raw.get("habits").and_then(Value::as_array) {
        Some(items) => coerce_habits(items),
        None => Profile::default().habits,
    };
    let completions = raw
        .get("completions")
        .and_then(Value::as_object)
        .map(coerce_completions)
        .unwrap_or_default();

    Profile {
        habits,
        completions,
    }
}

fn classify(raw: &Value) -> Option<Shape<'_>> {
    let object = raw.as_object()?;

    if let Some(profiles) = object.get("profiles").and_then(Value::as_object) {
        if let (Some(me), Some(friend)) = (present(profiles, "me"), present(profiles, "friend")) {
            return Some(Shape::Current { me, friend });
        }
    }

    if present(object, "habits").is_some() && present(object, "completions").is_some() {
        return Some(Shape::SingleProfile(raw));
    }

    None
}

fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

fn timestamp(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    let millis = value
        .as_i64()
        .or_else(|| value.as_f64().filter(|ms| ms.is_finite()).map(|ms| ms as i64))?;
    (millis > 0).then_some(millis)
}

/// Keeps non-blank string entries exactly as stored, since day records
/// are keyed by the same spelling. First occurrence wins.
fn coerce_habits(items: &[Value]) -> Vec<String> {
    let mut habits: Vec<String> = Vec::with_capacity(items.len());
    for name in items.iter().filter_map(Value::as_str) {
        if !name.trim().is_empty() && !habits.iter().any(|habit| habit == name) {
            habits.push(name.to_string());
        }
    }
    habits
}

fn coerce_completions(days: &Map<String, Value>) -> BTreeMap<String, DayRecord> {
    days.iter()
        .filter(|(key, _)| parse_date_key(key).is_some())
        .filter_map(|(key, day)| {
            let flags = day.as_object()?;
            let record: DayRecord = flags
                .iter()
                .filter_map(|(habit, flag)| Some((habit.clone(), flag.as_bool()?)))
                .collect();
            Some((key.clone(), record))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_HABITS, DayState};
    use crate::stats::{day_status, longest_streak};
    use serde_json::json;

    fn sample_document() -> StateDocument {
        let mut doc = StateDocument::seeded(1_700_000_000_000);
        let me = doc.current_profile_mut();
        me.habits.push("Stretch".into());
        me.ensure_day("2024-01-01").insert("Stretch".into(), true);
        me.ensure_day("2024-01-02").insert("Drink water".into(), false);
        me.ensure_day("2024-01-03");
        doc.profiles.friend.habits = vec!["Run".into()];
        doc
    }

    #[test]
    fn current_shape_round_trips() {
        let doc = sample_document();
        let text = serde_json::to_string(&doc).unwrap();
        assert_eq!(normalize_str(&text), Some(doc));
    }

    #[test]
    fn single_profile_legacy_shape_is_wrapped_as_me() {
        let raw = json!({"habits": ["Run"], "completions": {"2024-01-01": {"Run": true}}});
        let doc = normalize_at(&raw, 77).unwrap();

        assert_eq!(doc.profiles.me.habits, vec!["Run".to_string()]);
        assert!(doc.profiles.me.is_done("2024-01-01", "Run"));
        assert_eq!(doc.profiles.friend, Profile::default());
        assert_eq!(doc.profiles.friend.habits, DEFAULT_HABITS.map(String::from).to_vec());
        assert_eq!(doc.active_profile, ProfileId::Me);
        assert_eq!(doc.updated_at, 77);
    }

    #[test]
    fn unrecognised_inputs_are_rejected() {
        for raw in [
            json!(null),
            json!(42),
            json!("habits"),
            json!([{"habits": [], "completions": {}}]),
            json!({}),
            json!({"habits": ["Run"]}),
            json!({"completions": {}}),
            json!({"habits": null, "completions": {}}),
            json!({"profiles": {"me": {"habits": []}}}),
            json!({"profiles": {"me": {}, "friend": null}}),
            json!({"profiles": "me,friend"}),
        ] {
            assert_eq!(normalize_at(&raw, 1), None, "accepted {raw}");
        }
    }

    #[test]
    fn unparseable_text_is_rejected() {
        assert_eq!(normalize_str("{not json"), None);
        assert_eq!(normalize_str(""), None);
    }

    #[test]
    fn malformed_profile_fields_fall_back_to_defaults() {
        let raw = json!({
            "profiles": {
                "me": {"habits": "Run", "completions": ["2024-01-01"]},
                "friend": 7
            }
        });
        let doc = normalize_at(&raw, 5).unwrap();
        assert_eq!(doc.profiles.me, Profile::default());
        assert_eq!(doc.profiles.friend, Profile::default());
    }

    #[test]
    fn blank_and_duplicate_habit_names_are_dropped() {
        let raw = json!({"habits": ["Run", "Run", "", 3, "Swim", "  "], "completions": {}});
        let doc = normalize_at(&raw, 1).unwrap();
        assert_eq!(doc.profiles.me.habits, vec!["Run".to_string(), "Swim".to_string()]);
    }

    #[test]
    fn padded_habit_names_keep_their_history() {
        let raw = json!({
            "habits": [" Run"],
            "completions": {
                "2024-01-01": {" Run": true},
                "2024-01-02": {" Run": true}
            }
        });
        let doc = normalize_at(&raw, 1).unwrap();
        let me = doc.current_profile();
        assert_eq!(me.habits, vec![" Run".to_string()]);
        assert_eq!(day_status(me, "2024-01-02").state, DayState::Done);
        assert_eq!(longest_streak(me), 2);
    }

    #[test]
    fn bad_date_keys_and_non_boolean_flags_are_dropped() {
        let raw = json!({
            "habits": ["Run"],
            "completions": {
                "2024-01-01": {"Run": true, "Swim": "yes"},
                "someday": {"Run": true},
                "2024-01-02": true
            }
        });
        let doc = normalize_at(&raw, 1).unwrap();
        let completions = &doc.profiles.me.completions;
        assert_eq!(completions.len(), 1);
        assert_eq!(completions["2024-01-01"].len(), 1);
    }

    #[test]
    fn missing_or_zero_timestamp_is_stamped() {
        let stamped = json!({"habits": [], "completions": {}, "updatedAt": 0});
        assert_eq!(normalize_at(&stamped, 99).unwrap().updated_at, 99);

        let carried = json!({"habits": [], "completions": {}, "updatedAt": 1234});
        assert_eq!(normalize_at(&carried, 99).unwrap().updated_at, 1234);
    }

    #[test]
    fn active_profile_always_normalizes_to_me() {
        let raw = json!({
            "profiles": {"me": {}, "friend": {}},
            "activeProfile": "friend",
            "updatedAt": 10
        });
        assert_eq!(normalize_at(&raw, 1).unwrap().active_profile, ProfileId::Me);
    }
}
