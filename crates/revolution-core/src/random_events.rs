//! Random farm events.
//!
//! After a season advance there is a configurable chance of a random event.
//! The candidates depend on the season and the state; one applicable event
//! is picked uniformly and applied by the session through the resolver.

use rand::Rng;
use revolution_state::GameState;
use revolution_types::{Metric, MetricDeltas, Season};

/// Chance that the memory event is applicable when truth is low.
const MEMORY_EVENT_CHANCE: f64 = 0.2;

/// Broad class of a random event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RandomEventKind {
    /// Seasonal weather.
    Weather,
    /// Sickness among the animals.
    Animal,
    /// The pigs' excesses exposed.
    Corruption,
    /// The dogs overreaching.
    Security,
    /// Someone remembering the original Commandments.
    Memory,
}

/// One random event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomEvent {
    /// Class of event.
    pub kind: RandomEventKind,
    /// Journal message.
    pub message: &'static str,
    /// Metric deltas to apply.
    pub effects: MetricDeltas,
}

impl RandomEvent {
    fn new(kind: RandomEventKind, message: &'static str, effects: &[(Metric, i32)]) -> Self {
        Self {
            kind,
            message,
            effects: effects.iter().copied().collect(),
        }
    }
}

/// Events that could happen now. The memory event rolls its own chance.
pub fn applicable_events<R: Rng + ?Sized>(
    season: Season,
    state: &GameState,
    rng: &mut R,
) -> Vec<RandomEvent> {
    let mut events = Vec::new();

    match season {
        Season::Spring => events.push(RandomEvent::new(
            RandomEventKind::Weather,
            "Heavy spring rains flood the fields!",
            &[(Metric::Rations, -10), (Metric::Innovation, -5)],
        )),
        Season::Summer => events.push(RandomEvent::new(
            RandomEventKind::Weather,
            "A summer drought parches the crops!",
            &[(Metric::Rations, -15)],
        )),
        Season::Winter => events.push(RandomEvent::new(
            RandomEventKind::Weather,
            "A brutal winter storm hits the farm!",
            &[(Metric::Rations, -20), (Metric::Loyalty, -5)],
        )),
        Season::Autumn => {}
    }

    if state.metric(Metric::Rations) < 40 {
        events.push(RandomEvent::new(
            RandomEventKind::Animal,
            "A sickness spreads among the animals!",
            &[(Metric::Rations, -5), (Metric::Loyalty, -10)],
        ));
    }
    if state.metric(Metric::Corruption) > 60 {
        events.push(RandomEvent::new(
            RandomEventKind::Corruption,
            "The pigs are caught with human luxuries!",
            &[(Metric::Loyalty, -15), (Metric::Corruption, 5)],
        ));
    }
    if state.metric(Metric::Security) > 70 {
        events.push(RandomEvent::new(
            RandomEventKind::Security,
            "The dogs intimidate the animals into submission!",
            &[(Metric::Loyalty, -10), (Metric::Security, 5)],
        ));
    }
    if state.metric(Metric::HistoricalTruth) < 50 && rng.random_bool(MEMORY_EVENT_CHANCE) {
        events.push(RandomEvent::new(
            RandomEventKind::Memory,
            "An old animal remembers the original Commandments!",
            &[(Metric::HistoricalTruth, 10), (Metric::Loyalty, 5)],
        ));
    }

    events
}

/// Pick one applicable event, if any.
pub fn pick_event<R: Rng + ?Sized>(
    season: Season,
    state: &GameState,
    rng: &mut R,
) -> Option<RandomEvent> {
    let events = applicable_events(season, state, rng);
    if events.is_empty() {
        return None;
    }
    let index = rng.random_range(0..events.len());
    events.into_iter().nth(index)
}
