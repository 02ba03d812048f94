//! Per-player camera corrections learned from manual adjustment
//!
//! Keys are case-folded on insert, lookup, and load, so a correction saved
//! for "NovaStar" also applies to "novastar".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::CameraIndex;

/// Player name → signed offset added to the resolver's suggestion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, i32>", into = "BTreeMap<String, i32>")]
pub struct CorrectionMap {
    offsets: BTreeMap<String, i32>,
}

fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

impl CorrectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset stored for this player, if any
    pub fn get(&self, player: &str) -> Option<i32> {
        self.offsets.get(&fold(player)).copied()
    }

    /// Store an offset, replacing any previous one
    pub fn set(&mut self, player: &str, offset: i32) {
        self.offsets.insert(fold(player), offset);
    }

    /// Store `desired - suggested` as the player's offset and return it
    pub fn record(&mut self, player: &str, desired: CameraIndex, suggested: CameraIndex) -> i32 {
        let offset = desired.get().saturating_sub(suggested.get());
        self.set(player, offset);
        offset
    }

    /// Suggested index shifted by the stored offset. No clamping.
    pub fn apply(&self, player: &str, suggested: CameraIndex) -> CameraIndex {
        match self.get(player) {
            Some(offset) => suggested.offset(offset),
            None => suggested,
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.offsets.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl From<BTreeMap<String, i32>> for CorrectionMap {
    fn from(raw: BTreeMap<String, i32>) -> Self {
        let mut map = CorrectionMap::new();
        for (name, offset) in raw {
            let key = fold(&name);
            if let Some(previous) = map.offsets.insert(key.clone(), offset) {
                if previous != offset {
                    warn!(
                        "Correction for {:?} ({:+}) replaced by {:?} ({:+}); keys differ only in case",
                        key, previous, name, offset
                    );
                }
            }
        }
        map
    }
}

impl From<CorrectionMap> for BTreeMap<String, i32> {
    fn from(map: CorrectionMap) -> Self {
        map.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_stores_difference() {
        let mut map = CorrectionMap::new();
        let offset = map.record("A", CameraIndex(3), CameraIndex(1));
        assert_eq!(offset, 2);
        assert_eq!(map.get("A"), Some(2));
        assert_eq!(map.apply("A", CameraIndex(1)), CameraIndex(3));
    }

    #[test]
    fn test_record_matching_suggestion_is_zero() {
        let mut map = CorrectionMap::new();
        assert_eq!(map.record("A", CameraIndex(2), CameraIndex(2)), 0);
        assert_eq!(map.apply("A", CameraIndex(2)), CameraIndex(2));
    }

    #[test]
    fn test_apply_without_entry_is_identity() {
        let map = CorrectionMap::new();
        assert_eq!(map.apply("nobody", CameraIndex(7)), CameraIndex(7));
    }

    #[test]
    fn test_negative_offset_is_not_clamped() {
        let mut map = CorrectionMap::new();
        map.set("A", -3);
        assert_eq!(map.apply("A", CameraIndex(1)), CameraIndex(-2));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut map = CorrectionMap::new();
        map.set("NovaStar", 1);
        assert_eq!(map.get("novastar"), Some(1));
        assert_eq!(map.apply("NOVASTAR", CameraIndex(6)), CameraIndex(7));

        map.set("novastar", -1);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("NovaStar"), Some(-1));
    }

    #[test]
    fn test_load_folds_mixed_case_keys() {
        let map: CorrectionMap = serde_json::from_str(r#"{"NovaStar": 2, "Kite": -1}"#).unwrap();
        assert_eq!(map.get("novastar"), Some(2));
        assert_eq!(map.get("KITE"), Some(-1));

        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"novastar\":2"));
    }

    #[test]
    fn test_load_case_collision_keeps_one_entry() {
        // BTreeMap order: "KITE" sorts before "kite", so the lowercase entry wins
        let map: CorrectionMap = serde_json::from_str(r#"{"KITE": 3, "kite": -1}"#).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Kite"), Some(-1));
    }

    #[test]
    fn test_huge_stored_offset_does_not_overflow() {
        let map: CorrectionMap = serde_json::from_str(r#"{"A": 2147483647}"#).unwrap();
        assert_eq!(map.apply("A", CameraIndex(1)), CameraIndex(i32::MAX));

        let mut map = CorrectionMap::new();
        assert_eq!(map.record("A", CameraIndex(i32::MIN), CameraIndex(6)), i32::MIN);
    }
}
