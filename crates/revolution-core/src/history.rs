//! Decision, scene and location history.
//!
//! Decision and location history grow for the whole game. Scene history
//! is capped and evicts its oldest entries.

use std::collections::{BTreeMap, VecDeque};

use revolution_types::{
    DecisionCategory, DecisionHistoryEntry, LocationVisit, SceneHistoryEntry, Season,
};

/// How many entries [`DecisionStats::recent`] carries.
pub const RECENT_DECISIONS: usize = 5;

/// Aggregate view over the decision history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionStats {
    /// Decisions resolved.
    pub total: usize,
    /// Count per decision category.
    pub by_category: BTreeMap<DecisionCategory, usize>,
    /// Count per season of resolution.
    pub by_season: BTreeMap<Season, usize>,
    /// The most recent decisions, newest last.
    pub recent: Vec<DecisionHistoryEntry>,
}

/// Everything the player has done, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    decisions: Vec<DecisionHistoryEntry>,
    scenes: VecDeque<SceneHistoryEntry>,
    scene_cap: usize,
    locations: Vec<LocationVisit>,
}

impl History {
    /// Empty history keeping at most `scene_cap` scene entries.
    pub fn new(scene_cap: usize) -> Self {
        Self {
            decisions: Vec::new(),
            scenes: VecDeque::new(),
            scene_cap: scene_cap.max(1),
            locations: Vec::new(),
        }
    }

    /// Record a resolved decision.
    pub fn record_decision(&mut self, entry: DecisionHistoryEntry) {
        self.decisions.push(entry);
    }

    /// Record a presented scene, evicting the oldest past the cap.
    pub fn record_scene(&mut self, entry: SceneHistoryEntry) {
        self.scenes.push_back(entry);
        while self.scenes.len() > self.scene_cap {
            self.scenes.pop_front();
        }
    }

    /// Record a move.
    pub fn record_location(&mut self, visit: LocationVisit) {
        self.locations.push(visit);
    }

    /// The last `limit` decisions (all when `None`), oldest first.
    pub fn decisions(&self, limit: Option<usize>) -> Vec<DecisionHistoryEntry> {
        tail(&self.decisions, limit)
    }

    /// The last `limit` scenes (all when `None`), oldest first.
    pub fn scenes(&self, limit: Option<usize>) -> Vec<SceneHistoryEntry> {
        let skip = limit.map_or(0, |n| self.scenes.len().saturating_sub(n));
        self.scenes.iter().skip(skip).cloned().collect()
    }

    /// Every move, oldest first.
    pub fn locations(&self) -> Vec<LocationVisit> {
        self.locations.clone()
    }

    /// Totals by category and season plus the most recent decisions.
    pub fn decision_stats(&self) -> DecisionStats {
        let mut stats = DecisionStats {
            total: self.decisions.len(),
            recent: tail(&self.decisions, Some(RECENT_DECISIONS)),
            ..DecisionStats::default()
        };
        for entry in &self.decisions {
            let category = stats.by_category.entry(entry.category).or_insert(0);
            *category = category.saturating_add(1);
            let season = stats.by_season.entry(entry.season).or_insert(0);
            *season = season.saturating_add(1);
        }
        stats
    }

    /// Replace the contents from saved lists.
    pub fn restore(
        &mut self,
        decisions: Vec<DecisionHistoryEntry>,
        scenes: &[SceneHistoryEntry],
        locations: Vec<LocationVisit>,
    ) {
        self.decisions = decisions;
        let skip = scenes.len().saturating_sub(self.scene_cap);
        self.scenes = scenes.iter().skip(skip).cloned().collect();
        self.locations = locations;
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.decisions.clear();
        self.scenes.clear();
        self.locations.clear();
    }
}

fn tail<T: Clone>(items: &[T], limit: Option<usize>) -> Vec<T> {
    let skip = limit.map_or(0, |n| items.len().saturating_sub(n));
    items.iter().skip(skip).cloned().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use revolution_types::{DecisionId, OptionId, SceneId};

    use super::*;

    fn decision(id: &str, category: DecisionCategory, season: Season) -> DecisionHistoryEntry {
        DecisionHistoryEntry {
            decision_id: DecisionId::from(id),
            option_id: OptionId::from("x"),
            category,
            season,
            year: 1,
            turn: 0,
            recorded_at: Utc::now(),
        }
    }

    fn scene(turn: u64) -> SceneHistoryEntry {
        SceneHistoryEntry {
            scene_id: SceneId::new(format!("s{turn}")),
            season: Season::Spring,
            year: 1,
            turn,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn scene_history_is_capped() {
        let mut history = History::new(50);
        for turn in 0..60 {
            history.record_scene(scene(turn));
        }
        let scenes = history.scenes(None);
        assert_eq!(scenes.len(), 50);
        assert_eq!(scenes.first().unwrap().turn, 10);
        assert_eq!(history.scenes(Some(2)).first().unwrap().turn, 58);
    }

    #[test]
    fn stats_count_by_category_and_season() {
        let mut history = History::new(10);
        history.record_decision(decision("windmill_debate", DecisionCategory::Epoch, Season::Spring));
        history.record_decision(decision("spring_planting", DecisionCategory::Seasonal, Season::Spring));
        history.record_decision(decision("summer_labor", DecisionCategory::Seasonal, Season::Summer));
        for _ in 0..4 {
            history.record_decision(decision("x", DecisionCategory::Special, Season::Winter));
        }

        let stats = history.decision_stats();
        assert_eq!(stats.total, 7);
        assert_eq!(stats.by_category.get(&DecisionCategory::Seasonal), Some(&2));
        assert_eq!(stats.by_category.get(&DecisionCategory::Special), Some(&4));
        assert_eq!(stats.by_season.get(&Season::Spring), Some(&2));
        assert_eq!(stats.recent.len(), RECENT_DECISIONS);
        assert_eq!(stats.recent.first().unwrap().decision_id.as_str(), "summer_labor");
    }
}
