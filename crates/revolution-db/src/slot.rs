//! Save slot numbering.
//!
//! Slot 0 is the autosave, slots 1 through 5 are manual, and slot 9 is
//! written by the emergency save at the outer error boundary.

use core::fmt;

use crate::error::DbError;

/// A validated save slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SaveSlot(u8);

impl SaveSlot {
    /// The autosave slot.
    pub const AUTOSAVE: Self = Self(0);
    /// The emergency slot.
    pub const EMERGENCY: Self = Self(9);
    /// Manual slots, in order.
    pub const MANUAL: [Self; 5] = [Self(1), Self(2), Self(3), Self(4), Self(5)];

    /// Validate a slot number.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidSlot`] for anything other than 0, 1-5 or 9.
    pub fn new(slot: u8) -> Result<Self, DbError> {
        match slot {
            0..=5 | 9 => Ok(Self(slot)),
            other => Err(DbError::InvalidSlot(other)),
        }
    }

    /// The slot number.
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Whether this is one of the manual slots.
    pub const fn is_manual(self) -> bool {
        matches!(self.0, 1..=5)
    }

    /// Storage key for this slot under `prefix` (e.g. `animal_farm_save_3`).
    pub fn key(self, prefix: &str) -> String {
        format!("{prefix}{}", self.0)
    }
}

impl fmt::Display for SaveSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn only_known_slots_validate() {
        for n in [0, 1, 5, 9] {
            assert!(SaveSlot::new(n).is_ok(), "slot {n}");
        }
        for n in [6, 7, 8, 10, 255] {
            assert!(matches!(SaveSlot::new(n), Err(DbError::InvalidSlot(x)) if x == n));
        }
    }

    #[test]
    fn key_uses_prefix() {
        let slot = SaveSlot::new(3).unwrap();
        assert_eq!(slot.key("animal_farm_save_"), "animal_farm_save_3");
        assert!(slot.is_manual());
        assert!(!SaveSlot::AUTOSAVE.is_manual());
    }
}
