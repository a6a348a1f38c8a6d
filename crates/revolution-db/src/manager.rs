//! Typed save records on top of a [`SaveStore`].
//!
//! Each slot holds a JSON [`SaveRecord`] `{ timestamp, state }` under the
//! key `<prefix><slot>`. A failed load never touches the caller's state:
//! the record is parsed in full before anything is returned.

use chrono::{DateTime, Utc};
use revolution_types::{GameSnapshot, Season};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::DbError;
use crate::slot::SaveSlot;
use crate::store::SaveStore;

/// Key prefix used when configuration does not override it.
pub const DEFAULT_KEY_PREFIX: &str = "animal_farm_save_";

/// One persisted save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// When the save was written.
    pub timestamp: DateTime<Utc>,
    /// The saved state.
    pub state: GameSnapshot,
}

/// What a slot currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    /// Nothing saved.
    Empty,
    /// Data present but unreadable.
    Corrupted,
    /// A readable save.
    Saved {
        /// When it was written.
        timestamp: DateTime<Utc>,
        /// In-game year.
        year: u32,
        /// In-game season.
        season: Season,
        /// In-game turn.
        turn: u64,
    },
}

/// Summary of one slot for a save/load menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSummary {
    /// The slot.
    pub slot: SaveSlot,
    /// Its contents.
    pub status: SlotStatus,
}

/// Reads and writes save records.
pub struct SaveManager {
    store: Box<dyn SaveStore>,
    prefix: String,
}

impl SaveManager {
    /// Wrap a store, keying slots with `prefix`.
    pub fn new(store: Box<dyn SaveStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Serialize `value` as JSON and store it at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if serialization fails, or the
    /// store's error if the write fails.
    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)
    }

    /// Read the value at `key` and deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::KeyNotFound`] if the key does not exist and
    /// [`DbError::Serialization`] if deserialization fails.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<T, DbError> {
        self.store.get(key)?.map_or_else(
            || Err(DbError::KeyNotFound(key.to_owned())),
            |s| Ok(serde_json::from_str(&s)?),
        )
    }

    /// Write a snapshot to a slot, stamped with the current time.
    pub fn save(&mut self, slot: SaveSlot, state: &GameSnapshot) -> Result<SaveRecord, DbError> {
        let record = SaveRecord {
            timestamp: Utc::now(),
            state: state.clone(),
        };
        let key = slot.key(&self.prefix);
        self.set_json(&key, &record)?;
        info!(slot = slot.number(), turn = state.time.turn, "Game saved");
        Ok(record)
    }

    /// Read the record in a slot.
    pub fn load(&self, slot: SaveSlot) -> Result<SaveRecord, DbError> {
        let record: SaveRecord = self.get_json(&slot.key(&self.prefix))?;
        debug!(slot = slot.number(), turn = record.state.time.turn, "Save loaded");
        Ok(record)
    }

    /// Delete a slot's record.
    pub fn delete(&mut self, slot: SaveSlot) -> Result<(), DbError> {
        self.store.delete(&slot.key(&self.prefix))
    }

    /// Summarize one slot without failing on bad data.
    pub fn summarize(&self, slot: SaveSlot) -> SlotSummary {
        let status = match self.load(slot) {
            Ok(record) => SlotStatus::Saved {
                timestamp: record.timestamp,
                year: record.state.time.year,
                season: record.state.time.season,
                turn: record.state.time.turn,
            },
            Err(DbError::KeyNotFound(_)) => SlotStatus::Empty,
            Err(e) => {
                warn!(slot = slot.number(), error = %e, "Unreadable save slot");
                SlotStatus::Corrupted
            }
        };
        SlotSummary { slot, status }
    }

    /// Summaries of the manual slots, in order.
    pub fn list_slots(&self) -> Vec<SlotSummary> {
        SaveSlot::MANUAL.iter().map(|s| self.summarize(*s)).collect()
    }
}

impl core::fmt::Debug for SaveManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SaveManager")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
