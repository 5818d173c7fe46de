//! Merge-vs-replace semantics for the nested game-data document.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Open-ended game-data document: string keys, arbitrary JSON values,
/// insertion order preserved.
pub type GameData = IndexMap<String, Value>;

/// Top-level keys whose values deep-merge instead of being replaced.
///
/// The list is deliberately fixed; clients relying on merge semantics for
/// other keys get replace semantics instead.
const DEEP_MERGE_KEYS: [&str; 3] = ["cards", "bids", "round"];

/// Apply a partial update to a game-data document.
///
/// For each key present in `patch`: reserved keys ([`DEEP_MERGE_KEYS`])
/// shallow-merge one level, with patch sub-keys overriding and current-only
/// sub-keys kept; every other key is replaced wholesale. Keys absent from
/// the patch are untouched. `current` is never mutated.
pub fn merge_game_data(current: &GameData, patch: GameData) -> GameData {
    let mut merged = current.clone();
    for (key, value) in patch {
        let next = if DEEP_MERGE_KEYS.contains(&key.as_str()) {
            merge_one_level(current.get(&key), value)
        } else {
            value
        };
        merged.insert(key, next);
    }
    merged
}

/// Shallow merge of one reserved key's value. A current value that is
/// missing or not an object counts as an empty mapping; a non-object patch
/// value falls back to replacing.
fn merge_one_level(current: Option<&Value>, patch: Value) -> Value {
    let Value::Object(patch_entries) = patch else {
        return patch;
    };
    let mut base = match current {
        Some(Value::Object(entries)) => entries.clone(),
        _ => Map::new(),
    };
    for (sub_key, value) in patch_entries {
        base.insert(sub_key, value);
    }
    Value::Object(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> GameData {
        serde_json::from_value(value).expect("object literal")
    }

    #[test]
    fn plain_keys_replace_wholesale() {
        let current = data(json!({"dealer": "N", "phase": {"stage": "bidding"}}));
        let merged = merge_game_data(&current, data(json!({"phase": {"turn": 3}})));

        assert_eq!(merged["dealer"], json!("N"));
        // "phase" is not reserved so its old sub-keys are gone.
        assert_eq!(merged["phase"], json!({"turn": 3}));
    }

    #[test]
    fn reserved_keys_merge_one_level() {
        let current = data(json!({"round": {"trick": 1, "leader": "N"}}));
        let merged = merge_game_data(&current, data(json!({"round": {"trick": 2}})));
        assert_eq!(merged["round"], json!({"trick": 2, "leader": "N"}));
    }

    #[test]
    fn reserved_key_absent_from_current_starts_empty() {
        let current = GameData::new();
        let merged = merge_game_data(&current, data(json!({"cards": {"x": 1}})));
        assert_eq!(merged["cards"], json!({"x": 1}));
    }

    #[test]
    fn deep_merge_keeps_unrelated_sub_keys() {
        let current = data(json!({"cards": {"x": 1, "y": 2}, "bids": {"N": 20}}));
        let merged = merge_game_data(&current, data(json!({"cards": {"x": 7}})));

        assert_eq!(merged["cards"], json!({"x": 7, "y": 2}));
        assert_eq!(merged["bids"], json!({"N": 20}));
    }

    #[test]
    fn keys_absent_from_patch_are_untouched() {
        let current = data(json!({"dealer": "S", "round": {"trick": 4}}));
        let merged = merge_game_data(&current, GameData::new());
        assert_eq!(merged, current);
    }

    #[test]
    fn merge_is_idempotent_for_plain_keys() {
        let current = data(json!({"dealer": "N", "score": [12, 8]}));
        let patch = data(json!({"dealer": "E", "deck": "blue"}));

        let once = merge_game_data(&current, patch.clone());
        let twice = merge_game_data(&once, patch);
        assert_eq!(once, twice);
    }

    #[test]
    fn non_object_patch_under_reserved_key_replaces() {
        let current = data(json!({"round": {"trick": 1}}));
        let merged = merge_game_data(&current, data(json!({"round": 5})));
        assert_eq!(merged["round"], json!(5));
    }

    #[test]
    fn current_is_not_mutated() {
        let current = data(json!({"round": {"trick": 1}}));
        let _ = merge_game_data(&current, data(json!({"round": {"trick": 9}})));
        assert_eq!(current["round"], json!({"trick": 1}));
    }
}
