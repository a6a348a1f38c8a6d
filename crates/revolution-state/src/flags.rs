//! Story flags.
//!
//! Flags are set by decision resolution and never cleared automatically.
//! An unset flag reads as `false`.

use std::collections::BTreeMap;

use revolution_types::{Flag, FlagValue};

/// The set of story flags written so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    values: BTreeMap<Flag, FlagValue>,
}

impl FlagSet {
    /// An empty flag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a flag, `false` when unset.
    pub fn get(&self, flag: Flag) -> FlagValue {
        self.values.get(&flag).cloned().unwrap_or_default()
    }

    /// Whether the flag is set to a truthy value.
    pub fn is_set(&self, flag: Flag) -> bool {
        self.values.get(&flag).is_some_and(FlagValue::is_truthy)
    }

    /// Whether the flag equals `expected`, treating unset as `false`.
    pub fn matches(&self, flag: Flag, expected: &FlagValue) -> bool {
        self.get(flag) == *expected
    }

    /// Write a flag. Returns whether the stored value changed.
    pub fn set(&mut self, flag: Flag, value: FlagValue) -> bool {
        self.values.insert(flag, value.clone()) != Some(value)
    }

    /// Copy of every written flag.
    pub fn snapshot(&self) -> BTreeMap<Flag, FlagValue> {
        self.values.clone()
    }

    /// Replace every flag from a snapshot.
    pub fn restore(&mut self, snapshot: &BTreeMap<Flag, FlagValue>) {
        self.values.clone_from(snapshot);
    }
}
