//! Farm locations, access rules and location events.
//!
//! Moving to a location can do three things besides updating the current
//! location: roll a location event (metric deltas plus a journal line), route
//! a scene into the narrative queue, and start a chance encounter with a
//! character found there. All randomness comes from the caller's seeded RNG.

use rand::Rng;
use revolution_state::GameState;
use revolution_types::{Character, Flag, Location, Metric, MetricDeltas, SceneId};

/// Chance of meeting a character on arrival.
pub const ENCOUNTER_CHANCE: f64 = 0.2;

/// Static description of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationInfo {
    /// Which location.
    pub id: Location,
    /// Display name.
    pub name: &'static str,
    /// Flavour text.
    pub description: &'static str,
    /// Background key for the renderer.
    pub background: &'static str,
    /// Characters that can be met there.
    pub characters: &'static [Character],
    /// Whether entry is gated on the state.
    pub restricted: bool,
}

/// Static description of a location.
pub const fn info(location: Location) -> LocationInfo {
    match location {
        Location::Barn => LocationInfo {
            id: Location::Barn,
            name: "The Barn",
            description: "The heart of the farm. Meetings are held here, and the Commandments wall stands at one end.",
            background: "barn",
            characters: &[Character::Napoleon, Character::Squealer, Character::Animals],
            restricted: false,
        },
        Location::Windmill => LocationInfo {
            id: Location::Windmill,
            name: "The Windmill",
            description: "A monument to animal labor and either hope or folly, depending on who you ask.",
            background: "windmill",
            characters: &[Character::Boxer, Character::Animals],
            restricted: false,
        },
        Location::Commandments => LocationInfo {
            id: Location::Commandments,
            name: "Commandments Wall",
            description: "The Seven Commandments of Animalism are painted here. The paint has been refreshed many times.",
            background: "commandments",
            characters: &[Character::Squealer, Character::Animals],
            restricted: false,
        },
        Location::Fields => LocationInfo {
            id: Location::Fields,
            name: "The Fields",
            description: "The farm's lifeblood. Crops grow or fail here, determining the animals' survival.",
            background: "fields",
            characters: &[Character::Boxer, Character::Animals],
            restricted: false,
        },
        Location::Farmhouse => LocationInfo {
            id: Location::Farmhouse,
            name: "The Farmhouse",
            description: "Once Mr. Jones' home, now occupied by the pigs. Lights burn late into the night.",
            background: "farmhouse",
            characters: &[Character::Napoleon, Character::Squealer],
            restricted: true,
        },
    }
}

/// Whether the player may enter a location.
///
/// The farmhouse needs security of at least 50 and corruption of at least
/// 30; everything else is always open.
pub fn is_accessible(location: Location, state: &GameState) -> bool {
    !info(location).restricted
        || (state.metric(Metric::Security) >= 50 && state.metric(Metric::Corruption) >= 30)
}

/// Locations the player may enter, in declaration order.
pub fn accessible_locations(state: &GameState) -> Vec<Location> {
    Location::ALL
        .iter()
        .copied()
        .filter(|l| is_accessible(*l, state))
        .collect()
}

/// Something that happened on arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationEvent {
    /// Journal line.
    pub text: String,
    /// Metric deltas to apply.
    pub effects: MetricDeltas,
}

const WINDMILL_SUCCESS: [&str; 3] = [
    "The windmill turns smoothly, generating power for the farm.",
    "Animals take pride in their work on the windmill.",
    "The windmill becomes a symbol of animal achievement.",
];

const WINDMILL_PROBLEMS: [&str; 3] = [
    "The windmill creaks ominously in the wind.",
    "Repairs are constantly needed on the poorly-built structure.",
    "Animals grumble about the wasted labor on the windmill.",
];

const FARMHOUSE_REVELATIONS: [&str; 3] = [
    "Through the window, you see the pigs feasting while the animals go hungry.",
    "Whiskey bottles litter the farmhouse floor.",
    "The pigs sleep in human beds, wrapped in human clothes.",
];

/// Roll for a location event on arrival.
pub fn roll_location_event<R: Rng + ?Sized>(
    location: Location,
    state: &GameState,
    rng: &mut R,
) -> Option<LocationEvent> {
    let truth = state.metric(Metric::HistoricalTruth);
    match location {
        Location::Commandments => {
            if truth < 50 && state.flag_set(Flag::PurgesCompleted) && rng.random_bool(0.4) {
                return Some(if truth < 40 {
                    event(
                        "Strange stains mar the Commandments wall. No one remembers how they got there.",
                        &[(Metric::HistoricalTruth, -5)],
                    )
                } else {
                    event(
                        "At the Commandments wall, an animal points to blood seeping through the paint. \"That's not what it used to say,\" they whisper.",
                        &[(Metric::HistoricalTruth, 5), (Metric::Loyalty, -5)],
                    )
                });
            }
            None
        }
        Location::Windmill => {
            if !state.flag_set(Flag::WindmillBuilt) {
                return None;
            }
            let innovation = state.metric(Metric::Innovation);
            if innovation > 60 && rng.random_bool(0.3) {
                Some(event(
                    pick(&WINDMILL_SUCCESS, rng),
                    &[(Metric::Loyalty, 5), (Metric::Innovation, 3)],
                ))
            } else if innovation < 30 && rng.random_bool(0.3) {
                Some(event(
                    pick(&WINDMILL_PROBLEMS, rng),
                    &[(Metric::Loyalty, -5), (Metric::Rations, -3)],
                ))
            } else {
                None
            }
        }
        Location::Farmhouse => {
            if state.metric(Metric::Corruption) > 70 && rng.random_bool(0.5) {
                Some(event(
                    pick(&FARMHOUSE_REVELATIONS, rng),
                    &[(Metric::Corruption, 5), (Metric::Loyalty, -10)],
                ))
            } else {
                None
            }
        }
        Location::Barn | Location::Fields => None,
    }
}

/// A scene routed by arriving somewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationScene {
    /// A view of the location itself.
    View(SceneId),
    /// A memory surfacing on arrival.
    Memory(SceneId),
}

/// The scene, if any, that arriving at `location` should queue.
///
/// The Commandments wall shows the blood-stained wall once truth has fallen
/// below 50 after the purges, or the revised wall once the commandments
/// changed. The barn may surface the massacre memory with probability
/// `memory_chance` when truth is below 60 after the purges.
pub fn route_scene<R: Rng + ?Sized>(
    location: Location,
    state: &GameState,
    memory_chance: f64,
    rng: &mut R,
) -> Option<LocationScene> {
    let truth = state.metric(Metric::HistoricalTruth);
    let purged = state.flag_set(Flag::PurgesCompleted);
    match location {
        Location::Commandments if truth < 50 && purged => {
            Some(LocationScene::View(SceneId::from("commandments_bloody")))
        }
        Location::Commandments if state.flag_set(Flag::CommandmentsRevised) => {
            Some(LocationScene::View(SceneId::from("commandments_view")))
        }
        Location::Barn if truth < 60 && purged && rng.random_bool(memory_chance) => {
            Some(LocationScene::Memory(SceneId::from("massacre_memory")))
        }
        _ => None,
    }
}

/// Roll for a chance encounter with one of the location's characters.
pub fn roll_encounter<R: Rng + ?Sized>(location: Location, rng: &mut R) -> Option<Character> {
    let characters = info(location).characters;
    if characters.is_empty() || !rng.random_bool(ENCOUNTER_CHANCE) {
        return None;
    }
    characters
        .get(rng.random_range(0..characters.len()))
        .copied()
}

fn event(text: &str, effects: &[(Metric, i32)]) -> LocationEvent {
    LocationEvent {
        text: text.to_owned(),
        effects: effects.iter().copied().collect(),
    }
}

fn pick<'a, R: Rng + ?Sized>(lines: &[&'a str], rng: &mut R) -> &'a str {
    lines
        .get(rng.random_range(0..lines.len()))
        .copied()
        .unwrap_or_default()
}
