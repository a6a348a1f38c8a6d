//! Character relationships decomposed by source.
//!
//! Each (character, source) pair holds an affinity in `[0, 100]`, starting
//! at [`NEUTRAL_AFFINITY`] the first time it is touched. A character's
//! overall relationship is the rounded mean of its sources, or neutral
//! when it has none. Sources persist for the whole game.

use std::collections::BTreeMap;

use revolution_events::{EventSink, GameEvent, RelationshipChanged};
use revolution_types::{Character, RelationshipSource, RelationshipTable};
use tracing::debug;

/// Affinity of an untouched source or a character with no sources.
pub const NEUTRAL_AFFINITY: i32 = 50;

/// Relationship sources for every character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipBook {
    entries: RelationshipTable,
}

impl RelationshipBook {
    /// An empty book; every character reads neutral.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of one source for a character.
    pub fn source(&self, character: Character, source: RelationshipSource) -> i32 {
        self.entries
            .get(&character)
            .and_then(|sources| sources.get(&source))
            .copied()
            .unwrap_or(NEUTRAL_AFFINITY)
    }

    /// Overall relationship: `round(mean(sources))`.
    pub fn overall(&self, character: Character) -> i32 {
        let Some(sources) = self.entries.get(&character) else {
            return NEUTRAL_AFFINITY;
        };
        let count = i64::try_from(sources.len()).unwrap_or(i64::MAX);
        if count == 0 {
            return NEUTRAL_AFFINITY;
        }
        let sum: i64 = sources.values().map(|v| i64::from(*v)).sum();
        // Sources are non-negative, so half-up rounding is (2s + n) / 2n.
        let rounded = sum
            .saturating_mul(2)
            .saturating_add(count)
            .checked_div(count.saturating_mul(2))
            .unwrap_or(i64::from(NEUTRAL_AFFINITY));
        i32::try_from(rounded).unwrap_or(NEUTRAL_AFFINITY)
    }

    /// Apply a delta to one source, clamped to `[0, 100]`, and publish the
    /// change.
    pub fn adjust(
        &mut self,
        character: Character,
        source: RelationshipSource,
        delta: i32,
        sink: &mut dyn EventSink,
    ) -> RelationshipChanged {
        let current = self.source(character, source);
        let source_value = current.saturating_add(delta).clamp(0, 100);
        self.entries
            .entry(character)
            .or_default()
            .insert(source, source_value);
        let change = RelationshipChanged {
            character,
            source,
            delta,
            source_value,
            overall: self.overall(character),
        };
        debug!(
            character = character.as_str(),
            source = source.as_str(),
            delta,
            overall = change.overall,
            "Relationship changed"
        );
        sink.emit(GameEvent::RelationshipChanged(change));
        change
    }

    /// Copy of every source value.
    pub fn snapshot(&self) -> RelationshipTable {
        self.entries.clone()
    }

    /// Replace every source from a snapshot, clamping stored values.
    pub fn restore(&mut self, snapshot: &RelationshipTable) {
        self.entries = snapshot
            .iter()
            .map(|(character, sources)| {
                let clamped: BTreeMap<RelationshipSource, i32> = sources
                    .iter()
                    .map(|(source, value)| (*source, (*value).clamp(0, 100)))
                    .collect();
                (*character, clamped)
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use revolution_events::GameEvent;

    use super::*;

    #[test]
    fn untouched_character_is_neutral() {
        let book = RelationshipBook::new();
        assert_eq!(book.overall(Character::Boxer), NEUTRAL_AFFINITY);
        assert_eq!(
            book.source(Character::Boxer, RelationshipSource::Dialogue),
            NEUTRAL_AFFINITY
        );
    }

    #[test]
    fn overall_is_rounded_mean_of_touched_sources() {
        let mut book = RelationshipBook::new();
        let mut events: Vec<GameEvent> = Vec::new();
        book.adjust(Character::Snowball, RelationshipSource::Decision, 15, &mut events);
        book.adjust(Character::Snowball, RelationshipSource::Dialogue, -20, &mut events);
        // (65 + 30) / 2 = 47.5 rounds to 48.
        assert_eq!(book.overall(Character::Snowball), 48);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn sources_clamp_independently() {
        let mut book = RelationshipBook::new();
        let mut events: Vec<GameEvent> = Vec::new();
        let change = book.adjust(Character::Napoleon, RelationshipSource::Location, 80, &mut events);
        assert_eq!(change.source_value, 100);
        let change = book.adjust(Character::Napoleon, RelationshipSource::Decision, -90, &mut events);
        assert_eq!(change.source_value, 0);
        assert_eq!(change.overall, 50);
    }
}
