//! Scene catalog and generated seasonal scenes.
//!
//! Authored scenes come from the content table. When a season has no
//! authored scene, one is synthesized from the season, the year and the
//! current metrics, and kept alongside the authored ones so it can be
//! presented by id like any other scene.

use std::collections::BTreeMap;

use rand::Rng;
use revolution_state::GameState;
use revolution_types::{Epoch, Metric, Requirements, SceneId, SceneRecord, Season, TimeState};

use crate::content::{self, ContentError};

/// Scene shown when an ending has no scene of its own.
pub const FALLBACK_ENDING_SCENE: &str = "ending_compromised";

/// Authored scenes plus any generated so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneCatalog {
    authored: BTreeMap<SceneId, SceneRecord>,
    order: Vec<SceneId>,
    generated: BTreeMap<SceneId, SceneRecord>,
}

impl SceneCatalog {
    /// The catalog built from the embedded content table.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the table fails to parse or repeats an id.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_records(content::builtin_scenes()?)
    }

    /// Build a catalog, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Invalid`] on a duplicate scene id.
    pub fn from_records(scenes: Vec<SceneRecord>) -> Result<Self, ContentError> {
        let mut authored = BTreeMap::new();
        let mut order = Vec::with_capacity(scenes.len());
        for scene in scenes {
            let id = scene.id.clone();
            if authored.insert(id.clone(), scene).is_some() {
                return Err(ContentError::Invalid {
                    table: "scenes",
                    reason: format!("duplicate scene id {id}"),
                });
            }
            order.push(id);
        }
        Ok(Self {
            authored,
            order,
            generated: BTreeMap::new(),
        })
    }

    /// Look up a scene, authored or generated.
    pub fn get(&self, id: &str) -> Option<&SceneRecord> {
        self.authored.get(id).or_else(|| self.generated.get(id))
    }

    /// Whether a scene exists.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Id of the authored scene for a season visit, e.g. `year1_spring`.
    pub fn seasonal_scene_id(year: u32, season: Season) -> SceneId {
        SceneId::new(format!(
            "year{year}_{}",
            season.as_str().to_ascii_lowercase()
        ))
    }

    /// Id of an epoch's scene, e.g. `epoch2_purges`.
    pub fn epoch_scene_id(epoch: Epoch) -> SceneId {
        SceneId::new(format!("epoch{}_{}", epoch.number(), epoch.name()))
    }

    /// Synthesize and store a scene for a season visit.
    ///
    /// The text is one of three lines for the season, each phrased from the
    /// current metrics; `rng` picks which.
    pub fn generate_seasonal<R: Rng + ?Sized>(
        &mut self,
        season: Season,
        year: u32,
        state: &GameState,
        rng: &mut R,
    ) -> SceneRecord {
        let texts = seasonal_texts(season, year, state);
        let index = rng.random_range(0..texts.len());
        let text = texts
            .into_iter()
            .nth(index)
            .unwrap_or_else(|| "The seasons turn.".to_owned());

        let scene = SceneRecord {
            id: SceneId::new(format!("gen_{year}_{season}")),
            title: format!("{season}, Year {year}"),
            text,
            characters: vec!["animals".to_owned()],
            background: seasonal_background(season).to_owned(),
            mood: None,
            effects: Vec::new(),
            epoch: None,
            ending: None,
            requirements: Requirements::default(),
            trigger: None,
            next: None,
            generated: true,
        };
        self.generated.insert(scene.id.clone(), scene.clone());
        scene
    }

    /// Authored scenes whose requirements hold and whose calendar trigger
    /// has been reached, in declaration order.
    ///
    /// A trigger year is the earliest year the scene applies; a trigger
    /// season must match exactly.
    pub fn available_scenes(&self, time: &TimeState, state: &GameState) -> Vec<&SceneRecord> {
        self.order
            .iter()
            .filter_map(|id| self.authored.get(id))
            .filter(|scene| state.satisfies(&scene.requirements))
            .filter(|scene| {
                scene.trigger.is_none_or(|trigger| {
                    trigger.year.is_none_or(|y| time.year >= y)
                        && trigger.season.is_none_or(|s| time.season == s)
                })
            })
            .collect()
    }

    /// Drop generated scenes.
    pub fn clear_generated(&mut self) {
        self.generated.clear();
    }
}

const fn seasonal_background(season: Season) -> &'static str {
    match season {
        Season::Winter => "barn",
        Season::Spring | Season::Summer | Season::Autumn => "fields",
    }
}

fn seasonal_texts(season: Season, year: u32, state: &GameState) -> [String; 3] {
    let above = |metric: Metric, threshold: i32| state.metric(metric) > threshold;
    match season {
        Season::Spring => spring_texts(year, above),
        Season::Summer => summer_texts(year, above),
        Season::Autumn => autumn_texts(year, above),
        Season::Winter => winter_texts(year, above),
    }
}

const fn pick(cond: bool, yes: &'static str, no: &'static str) -> &'static str {
    if cond { yes } else { no }
}

fn spring_texts(year: u32, above: impl Fn(Metric, i32) -> bool) -> [String; 3] {
    [
        format!(
            "SPRING, YEAR {year}. New shoots push through the thawing earth. The animals work with {}.",
            pick(above(Metric::Loyalty, 60), "renewed hope", "quiet resignation")
        ),
        format!(
            "The first buds appear. {}.",
            pick(
                above(Metric::Rations, 50),
                "The planting proceeds smoothly",
                "The empty stomachs make the work harder"
            )
        ),
        format!(
            "Spring rain washes the farm. {}.",
            pick(
                above(Metric::Innovation, 40),
                "New tools make the planting easier",
                "The old tools break in tired hands"
            )
        ),
    ]
}

fn summer_texts(year: u32, above: impl Fn(Metric, i32) -> bool) -> [String; 3] {
    [
        format!(
            "SUMMER, YEAR {year}. The sun beats down. {}.",
            pick(
                above(Metric::Fatigue, 60),
                "The animals move slowly in the heat",
                "Work proceeds at a steady pace"
            )
        ),
        format!(
            "Crops grow tall. {}.",
            pick(
                above(Metric::Security, 60),
                "The dogs patrol the perimeter",
                "The fields are quiet but for animal sounds"
            )
        ),
        format!(
            "The longest day. {}.",
            pick(
                above(Metric::Loyalty, 70),
                "The animals sing as they work",
                "Silence hangs heavy over the farm"
            )
        ),
    ]
}

fn autumn_texts(year: u32, above: impl Fn(Metric, i32) -> bool) -> [String; 3] {
    [
        format!(
            "AUTUMN, YEAR {year}. The harvest {}. {}.",
            pick(above(Metric::Rations, 30), "is bountiful", "is meager"),
            pick(
                above(Metric::Loyalty, 50),
                "The animals work together",
                "Arguments break out over shares"
            )
        ),
        format!(
            "Leaves turn. {}.",
            pick(
                above(Metric::HistoricalTruth, 60),
                "Old Major's words are remembered",
                "The original dream feels distant"
            )
        ),
        format!(
            "The last fruits are gathered. {}.",
            pick(
                above(Metric::Corruption, 50),
                "The pigs take the best for themselves",
                "The distribution is fair, if sparse"
            )
        ),
    ]
}

fn winter_texts(year: u32, above: impl Fn(Metric, i32) -> bool) -> [String; 3] {
    [
        format!(
            "WINTER, YEAR {year}. Cold grips the farm. {}.",
            pick(above(Metric::Rations, 40), "The stores are adequate", "Hunger gnaws")
        ),
        format!(
            "Snow falls. {}.",
            pick(
                above(Metric::Security, 70),
                "The dogs keep watch through the night",
                "The farm sleeps uneasily"
            )
        ),
        format!(
            "The deepest cold. {}.",
            pick(
                above(Metric::Innovation, 50),
                "The windmill provides some heat",
                "The animals huddle together for warmth"
            )
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use revolution_state::EffectResolver;
    use revolution_types::{DecisionOption, Flag, FlagValue, OptionId};

    use super::*;

    fn state(pairs: &[(Metric, i32)]) -> GameState {
        GameState::new(&pairs.iter().copied().collect())
    }

    #[test]
    fn ids_follow_naming_scheme() {
        assert_eq!(
            SceneCatalog::seasonal_scene_id(1, Season::Spring).as_str(),
            "year1_spring"
        );
        assert_eq!(
            SceneCatalog::epoch_scene_id(Epoch::new(4).unwrap()).as_str(),
            "epoch4_boxer"
        );
    }

    #[test]
    fn builtin_catalog_has_epoch_and_ending_scenes() {
        let catalog = SceneCatalog::builtin().unwrap();
        for n in Epoch::FIRST..=Epoch::LAST {
            let id = SceneCatalog::epoch_scene_id(Epoch::new(n).unwrap());
            assert!(catalog.contains(id.as_str()), "missing {id}");
        }
        assert!(catalog.contains(FALLBACK_ENDING_SCENE));
    }

    #[test]
    fn generated_scene_reflects_metrics_and_is_stored() {
        let mut catalog = SceneCatalog::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let state = state(&[
            (Metric::Rations, 10),
            (Metric::Security, 10),
            (Metric::Innovation, 10),
        ]);

        let scene = catalog.generate_seasonal(Season::Winter, 3, &state, &mut rng);
        assert_eq!(scene.id.as_str(), "gen_3_Winter");
        assert_eq!(scene.title, "Winter, Year 3");
        assert_eq!(scene.background, "barn");
        assert!(scene.generated);
        assert!(
            scene.text.contains("Hunger gnaws")
                || scene.text.contains("The farm sleeps uneasily")
                || scene.text.contains("huddle together")
        );
        assert_eq!(catalog.get("gen_3_Winter"), Some(&scene));

        catalog.clear_generated();
        assert!(!catalog.contains("gen_3_Winter"));
    }

    #[test]
    fn available_scenes_respect_requirements_and_triggers() {
        let catalog = SceneCatalog::builtin().unwrap();
        let mut state = state(&[]);
        let mut time = TimeState::default();

        let ids = |scenes: Vec<&SceneRecord>| -> Vec<String> {
            scenes.iter().map(|s| s.id.to_string()).collect()
        };

        let available = ids(catalog.available_scenes(&time, &state));
        assert!(available.contains(&"year1_spring".to_owned()));
        assert!(!available.contains(&"massacre_memory".to_owned()));
        assert!(!available.iter().any(|id| id.starts_with("gen_")));

        time.season = Season::Summer;
        let option = DecisionOption {
            id: OptionId::from("purge"),
            title: "Purge".to_owned(),
            description: String::new(),
            costs: BTreeMap::new(),
            benefits: BTreeMap::new(),
            delayed: None,
            flags: BTreeMap::from([(Flag::PurgesCompleted, FlagValue::Bool(true))]),
            relationships: BTreeMap::new(),
            requirements: Requirements::default(),
            narrative: None,
        };
        EffectResolver::new()
            .apply_decision(&option, &mut state, 1, &mut Vec::new())
            .unwrap();

        let available = ids(catalog.available_scenes(&time, &state));
        assert!(!available.contains(&"year1_spring".to_owned()));
        assert!(available.contains(&"massacre_memory".to_owned()));
    }
}
