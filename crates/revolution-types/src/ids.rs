//! Type-safe identifier wrappers.
//!
//! Content tables key decisions, options and scenes by short stable
//! strings (`"windmill_debate"`, `"epoch1_windmill"`). Each kind gets its
//! own newtype so a scene id can never be passed where a decision id is
//! expected. Epochs are numbered `1..=5` and wrap a `u8`.

use core::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Identifier of a decision in the catalog.
    DecisionId
}

define_id! {
    /// Identifier of an option within a decision.
    OptionId
}

define_id! {
    /// Identifier of an authored or generated scene.
    SceneId
}

/// One of the five story epochs, numbered `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Epoch(u8);

impl Epoch {
    /// Lowest epoch number.
    pub const FIRST: u8 = 1;
    /// Highest epoch number.
    pub const LAST: u8 = 5;

    /// Create an epoch, returning `None` outside `1..=5`.
    pub const fn new(number: u8) -> Option<Self> {
        if number >= Self::FIRST && number <= Self::LAST {
            Some(Self(number))
        } else {
            None
        }
    }

    /// The epoch number.
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Whether the number is inside `1..=5`. Deserialized values are
    /// checked with this at content load.
    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST && self.0 <= Self::LAST
    }

    /// Short story name of the epoch, used in scene ids.
    pub const fn name(self) -> &'static str {
        match self.0 {
            1 => "windmill",
            2 => "purges",
            3 => "commandments",
            4 => "boxer",
            _ => "humans",
        }
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn epoch_range_is_enforced() {
        assert!(Epoch::new(0).is_none());
        assert!(Epoch::new(6).is_none());
        let boxer = Epoch::new(4).unwrap();
        assert_eq!(boxer.number(), 4);
        assert_eq!(boxer.name(), "boxer");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = SceneId::new("epoch1_windmill");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"epoch1_windmill\"");
        let epoch: Epoch = serde_json::from_str("3").unwrap();
        assert_eq!(epoch.name(), "commandments");
    }

    #[test]
    fn ids_key_maps_by_str() {
        let mut map = BTreeMap::new();
        map.insert(DecisionId::from("purges"), 2);
        assert_eq!(map.get("purges"), Some(&2));
    }
}
