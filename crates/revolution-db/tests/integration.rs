//! Integration tests for the `revolution-db` persistence layer.
//!
//! File-backed tests write under a unique directory in the system temp
//! dir and remove it afterwards.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use revolution_db::{
    DEFAULT_KEY_PREFIX, DbError, FileStore, MemoryStore, SaveManager, SaveSlot, SaveStore,
    SlotStatus,
};
use revolution_types::{
    Character, DelayedEffect, Epoch, Flag, FlagValue, GameSnapshot, JournalLine, Location,
    Metric, RelationshipSource, Season, TimeState,
};

struct TempDir(PathBuf);

impl TempDir {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("revolution-db-{}", uuid::Uuid::new_v4()));
        Self(path)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn snapshot() -> GameSnapshot {
    let mut time = TimeState {
        year: 2,
        season: Season::Autumn,
        turn: 6,
        current_epoch: Epoch::new(2),
        epochs_completed: BTreeSet::new(),
    };
    time.epochs_completed.extend(Epoch::new(1));

    GameSnapshot {
        metrics: Metric::ALL.iter().map(|m| (*m, 42)).collect(),
        flags: BTreeMap::from([
            (Flag::WindmillBuilt, FlagValue::Bool(true)),
            (Flag::DogsTrained, FlagValue::Variant("guard".to_owned())),
        ]),
        relationships: BTreeMap::from([(
            Character::Boxer,
            BTreeMap::from([(RelationshipSource::Decision, 70)]),
        )]),
        time,
        pending_effects: vec![DelayedEffect {
            kind: "WindmillCompletion".to_owned(),
            effects: BTreeMap::from([(Metric::Innovation, 20)]),
            registered_at: 5,
            fires_at: 7,
            success: true,
            applied: false,
        }],
        location: Location::Windmill,
        visited_locations: BTreeSet::from([Location::Barn, Location::Windmill]),
        decision_history: Vec::new(),
        scene_history: Vec::new(),
        location_history: Vec::new(),
        journal: vec![JournalLine {
            turn: 6,
            text: "The harvest was poor.".to_owned(),
        }],
        seasonal_resolved_turn: Some(6),
        specials_resolved: BTreeSet::new(),
        ending: None,
    }
}

#[test]
fn file_store_save_load_round_trip() {
    let dir = TempDir::new();
    let store = FileStore::open(&dir.0).unwrap();
    let mut saves = SaveManager::new(Box::new(store), DEFAULT_KEY_PREFIX);
    let slot = SaveSlot::new(2).unwrap();

    let written = saves.save(slot, &snapshot()).unwrap();
    let loaded = saves.load(slot).unwrap();

    assert_eq!(loaded, written);
    assert_eq!(loaded.state, snapshot());
    assert!(dir.0.join("animal_farm_save_2.json").exists());
}

#[test]
fn missing_slot_is_key_not_found() {
    let saves = SaveManager::new(Box::new(MemoryStore::new()), DEFAULT_KEY_PREFIX);
    let err = saves.load(SaveSlot::AUTOSAVE).unwrap_err();
    assert!(matches!(err, DbError::KeyNotFound(key) if key == "animal_farm_save_0"));
}

#[test]
fn corrupted_slot_fails_to_parse_and_lists_as_corrupted() {
    let mut store = MemoryStore::new();
    store.set("animal_farm_save_1", "{ not json").unwrap();
    store
        .set("animal_farm_save_3", r#"{"timestamp": "2026-01-01T00:00:00Z"}"#)
        .unwrap();
    let mut saves = SaveManager::new(Box::new(store), DEFAULT_KEY_PREFIX);
    saves.save(SaveSlot::new(2).unwrap(), &snapshot()).unwrap();

    assert!(matches!(
        saves.load(SaveSlot::new(1).unwrap()),
        Err(DbError::Serialization(_))
    ));

    let slots = saves.list_slots();
    assert_eq!(slots.len(), 5);
    assert_eq!(slots[0].status, SlotStatus::Corrupted);
    assert!(matches!(
        slots[1].status,
        SlotStatus::Saved {
            year: 2,
            season: Season::Autumn,
            turn: 6,
            ..
        }
    ));
    assert_eq!(slots[2].status, SlotStatus::Corrupted);
    assert_eq!(slots[3].status, SlotStatus::Empty);
}

#[test]
fn delete_clears_slot() {
    let dir = TempDir::new();
    let mut saves = SaveManager::new(Box::new(FileStore::open(&dir.0).unwrap()), "test_");
    let slot = SaveSlot::new(5).unwrap();
    saves.save(slot, &snapshot()).unwrap();
    saves.delete(slot).unwrap();
    assert_eq!(saves.summarize(slot).status, SlotStatus::Empty);
    saves.delete(slot).unwrap();
}
