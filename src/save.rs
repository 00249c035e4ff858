//! Snapshot codec.
//!
//! ## Versioning
//!
//! - `SCHEMA_VERSION` is written into every snapshot. Snapshots from other
//!   versions still load: unknown fields are ignored, missing ones defaulted,
//!   and the version read is reported in [`Snapshot::schema_version`].
//! - Decoding goes field by field over a `serde_json::Value`, so one bad field
//!   costs that field only. Only a payload that is not a JSON object is
//!   rejected as corrupt.
//! - Legacy keys: `upgrades` for `generators`, `last_time` for `last_saved`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::achievements::AchievementId;
use crate::discovery;
use crate::economy::{generator_index, EconomyState, GENERATORS};
use crate::error::SnapshotError;

pub const SCHEMA_VERSION: u32 = 670;

/// Persisted form. Derived values (CPS, multiplier) are never written.
#[derive(Serialize)]
struct SnapshotRecord<'a> {
    schema_version: u32,
    gold: f64,
    cpc_level: u64,
    /// Generator name to owned count, every generator listed.
    generators: BTreeMap<&'a str, u64>,
    total_earned: f64,
    prestige_shards: u64,
    prestige_spent_levels: u64,
    achievements: Vec<&'static str>,
    discovered: Vec<&'a str>,
    last_saved: f64,
}

/// A decoded snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub schema_version: u32,
    pub state: EconomyState,
    /// Wall-clock seconds of the save, if the snapshot had a usable one.
    pub last_saved: Option<f64>,
}

/// Serialize `state` stamped with `now` (wall-clock seconds).
pub fn encode(state: &EconomyState, now: f64) -> Result<String, serde_json::Error> {
    let record = SnapshotRecord {
        schema_version: SCHEMA_VERSION,
        gold: state.gold,
        cpc_level: state.cpc_level,
        generators: GENERATORS
            .iter()
            .enumerate()
            .map(|(i, def)| (def.name, state.count(i)))
            .collect(),
        total_earned: state.total_earned,
        prestige_shards: state.prestige_shards,
        prestige_spent_levels: state.prestige_spent_levels,
        achievements: state.achievements.iter().map(|id| id.key()).collect(),
        discovered: GENERATORS
            .iter()
            .enumerate()
            .filter(|&(i, _)| state.is_discovered(i))
            .map(|(_, def)| def.name)
            .collect(),
        last_saved: now,
    };
    serde_json::to_string(&record)
}

pub fn decode(text: &str) -> Result<Snapshot, SnapshotError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| SnapshotError::Corrupt(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(SnapshotError::Corrupt(
            "snapshot is not a JSON object".to_string(),
        ));
    };

    let schema_version = fields
        .get("schema_version")
        .and_then(as_count)
        .map_or(0, |v| v.min(u32::MAX as u64) as u32);
    if schema_version != SCHEMA_VERSION {
        tracing::info!(
            target: "idle_gold::save",
            found = schema_version,
            current = SCHEMA_VERSION,
            "snapshot.version_mismatch"
        );
    }

    let mut state = EconomyState::new();
    state.gold = fields.get("gold").and_then(as_amount).unwrap_or(0.0);
    state.total_earned = fields
        .get("total_earned")
        .and_then(as_amount)
        .unwrap_or(state.gold);
    state.cpc_level = fields.get("cpc_level").and_then(as_count).unwrap_or(0);
    state.prestige_shards = fields.get("prestige_shards").and_then(as_count).unwrap_or(0);
    state.prestige_spent_levels = fields
        .get("prestige_spent_levels")
        .and_then(as_count)
        .unwrap_or(0);

    if let Some(saved) = legacy_field(&fields, "generators", "upgrades").and_then(Value::as_object) {
        for (name, count) in saved {
            if let Some(index) = generator_index(name) {
                state.counts[index] = as_count(count).unwrap_or(0);
            }
        }
    }

    if let Some(ids) = fields.get("achievements").and_then(Value::as_array) {
        state.achievements = ids
            .iter()
            .filter_map(Value::as_str)
            .filter_map(AchievementId::from_key)
            .collect();
    }

    if let Some(names) = fields.get("discovered").and_then(Value::as_array) {
        for index in names.iter().filter_map(Value::as_str).filter_map(generator_index) {
            discovery::discover(&mut state, index);
        }
    }
    discovery::discover_owned(&mut state);

    let last_saved = legacy_field(&fields, "last_saved", "last_time")
        .and_then(as_number)
        .filter(|t| t.is_finite());

    Ok(Snapshot {
        schema_version,
        state,
        last_saved,
    })
}

fn legacy_field<'a>(fields: &'a Map<String, Value>, key: &str, legacy: &str) -> Option<&'a Value> {
    fields.get(key).or_else(|| fields.get(legacy))
}

/// A JSON number, or a string holding one.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Gold-like quantity. Negative or non-finite values become 0.
fn as_amount(value: &Value) -> Option<f64> {
    let n = as_number(value)?;
    Some(if n.is_finite() && n > 0.0 { n } else { 0.0 })
}

/// Integer counter. Floats are truncated, negatives become 0.
fn as_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let n = as_number(value)?;
    if n.is_nan() || n <= 0.0 {
        Some(0)
    } else {
        // saturating float-to-int cast
        Some(n.trunc() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::logic;

    fn sample_state() -> EconomyState {
        let mut state = EconomyState::new();
        state.gold = 5_000.0;
        for _ in 0..3 {
            logic::tap(&mut state);
        }
        logic::buy_tap_upgrade(&mut state).unwrap_or_default();
        logic::buy_generator_one(&mut state, 1).unwrap();
        logic::buy_generator_max(&mut state, 0).unwrap();
        crate::achievements::evaluate(&mut state);
        state.gold += 123.456;
        state.total_earned = 98_765.25;
        state.prestige_shards = 2;
        state.prestige_spent_levels = 2;
        state
    }

    #[test]
    fn encode_decode_roundtrip() {
        let state = sample_state();
        let json = encode(&state, 1_700_000_000.5).unwrap();
        let snapshot = decode(&json).unwrap();

        assert_eq!(snapshot.schema_version, SCHEMA_VERSION);
        assert_eq!(snapshot.last_saved, Some(1_700_000_000.5));
        assert_eq!(snapshot.state, state);
    }

    #[test]
    fn empty_state_roundtrip() {
        let state = EconomyState::new();
        let snapshot = decode(&encode(&state, 0.0).unwrap()).unwrap();
        assert_eq!(snapshot.state, state);
    }

    #[test]
    fn encoded_snapshot_uses_names_and_keys() {
        let json = encode(&sample_state(), 1.0).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["schema_version"], 670);
        assert_eq!(value["generators"]["Mine"], 1);
        assert_eq!(value["generators"]["Cosmic Forge"], 0);
        assert!(value["achievements"]
            .as_array()
            .unwrap()
            .contains(&Value::from("first_click")));
        assert!(value.get("cps").is_none());
    }

    #[test]
    fn old_version_loads_and_reports_version() {
        let json = r#"{ "schema_version": 600, "gold": 42.0, "cpc_level": 3 }"#;
        let snapshot = decode(json).unwrap();
        assert_eq!(snapshot.schema_version, 600);
        assert!((snapshot.state.gold - 42.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.state.cpc_level, 3);
        assert_eq!(snapshot.state.prestige_shards, 0);
        assert_eq!(snapshot.last_saved, None);
    }

    #[test]
    fn missing_version_is_zero() {
        assert_eq!(decode("{}").unwrap().schema_version, 0);
        assert_eq!(decode("{}").unwrap().state, EconomyState::new());
    }

    #[test]
    fn unknown_fields_in_json_are_ignored() {
        let json = r#"{
            "schema_version": 670,
            "gold": 10.0,
            "future_feature": { "nested": [1, 2, 3] },
            "cps": 999999.0
        }"#;
        let snapshot = decode(json).unwrap();
        assert!((snapshot.state.gold - 10.0).abs() < f64::EPSILON);
        assert!((snapshot.state.cps() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ghost_achievement_dropped_and_total_earned_defaults_to_gold() {
        let json = r#"{ "gold": 250.0, "achievements": ["first_click", "ghost"] }"#;
        let state = decode(json).unwrap().state;
        assert!((state.total_earned - 250.0).abs() < f64::EPSILON);
        assert_eq!(state.achievements.len(), 1);
        assert!(state.achievements.contains(&AchievementId::FirstClick));
    }

    #[test]
    fn legacy_keys_are_accepted() {
        let json = r#"{
            "upgrades": { "Assistant": 4, "Mine": 2, "Time Machine": 9 },
            "last_time": 1234.5
        }"#;
        let snapshot = decode(json).unwrap();
        assert_eq!(snapshot.state.count(0), 4);
        assert_eq!(snapshot.state.count(1), 2);
        assert_eq!(snapshot.state.counts.iter().sum::<u64>(), 6);
        assert_eq!(snapshot.last_saved, Some(1234.5));
    }

    #[test]
    fn current_keys_win_over_legacy() {
        let json = r#"{ "generators": { "Mine": 1 }, "upgrades": { "Mine": 7 } }"#;
        assert_eq!(decode(json).unwrap().state.count(1), 1);
    }

    #[test]
    fn malformed_fields_fall_back_individually() {
        let json = r#"{
            "gold": "12.5",
            "total_earned": -4.0,
            "cpc_level": 2.9,
            "prestige_shards": "lots",
            "prestige_spent_levels": -3,
            "generators": { "Assistant": 3.7, "Mine": -1, "Factory": "2" },
            "achievements": "first_click",
            "discovered": ["Rocket", 7, "Nowhere"],
            "last_saved": "yesterday"
        }"#;
        let snapshot = decode(json).unwrap();
        let state = &snapshot.state;
        assert!((state.gold - 12.5).abs() < f64::EPSILON);
        assert!((state.total_earned - 0.0).abs() < f64::EPSILON);
        assert_eq!(state.cpc_level, 2);
        assert_eq!(state.prestige_shards, 0);
        assert_eq!(state.prestige_spent_levels, 0);
        assert_eq!(state.count(0), 3);
        assert_eq!(state.count(1), 0);
        assert_eq!(state.count(2), 2);
        assert!(state.achievements.is_empty());
        assert_eq!(snapshot.last_saved, None);
    }

    #[test]
    fn discovery_is_persisted_list_plus_owned() {
        let json = r#"{ "generators": { "Factory": 1 }, "discovered": ["Assistant"] }"#;
        let state = decode(json).unwrap().state;
        assert!(state.is_discovered(0));
        assert!(!state.is_discovered(1));
        assert!(state.is_discovered(2));
    }

    #[test]
    fn non_object_payloads_are_corrupt() {
        for text in ["", "not json", "{ \"gold\": ", "[1, 2, 3]", "42", "\"gold\"", "null"] {
            assert!(
                matches!(decode(text), Err(SnapshotError::Corrupt(_))),
                "expected corrupt: {text:?}"
            );
        }
    }
}
