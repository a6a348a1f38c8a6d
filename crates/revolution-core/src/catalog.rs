//! Decision catalog and availability rules.
//!
//! The catalog is an immutable table of [`DecisionRecord`]s. Which decisions
//! are on offer at a given moment depends on the calendar, the state and two
//! pieces of bookkeeping owned by the session: the turn on which the seasonal
//! decision was last resolved, and the special decisions already resolved.

use std::collections::{BTreeMap, BTreeSet};

use revolution_state::GameState;
use revolution_types::{
    DecisionId, DecisionKind, DecisionOption, DecisionRecord, Epoch, Season, TimeState,
};

use crate::content::{self, ContentError};

/// Immutable decision table with lookup indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionCatalog {
    decisions: Vec<DecisionRecord>,
    by_id: BTreeMap<DecisionId, usize>,
    by_epoch: BTreeMap<Epoch, usize>,
    by_season: BTreeMap<Season, usize>,
}

impl DecisionCatalog {
    /// The catalog built from the embedded content table.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the table fails to parse or validate.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_records(content::builtin_decisions()?)
    }

    /// Build and validate a catalog.
    ///
    /// Decision ids are unique, option ids are unique within a decision,
    /// every decision has at least one option, and there is at most one
    /// decision per epoch and per season.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Invalid`] describing the first violation.
    pub fn from_records(decisions: Vec<DecisionRecord>) -> Result<Self, ContentError> {
        let invalid = |reason: String| ContentError::Invalid {
            table: "decisions",
            reason,
        };

        let mut by_id = BTreeMap::new();
        let mut by_epoch = BTreeMap::new();
        let mut by_season = BTreeMap::new();

        for (index, decision) in decisions.iter().enumerate() {
            if by_id.insert(decision.id.clone(), index).is_some() {
                return Err(invalid(format!("duplicate decision id {}", decision.id)));
            }
            if decision.options.is_empty() {
                return Err(invalid(format!("decision {} has no options", decision.id)));
            }
            let mut option_ids = BTreeSet::new();
            for option in &decision.options {
                if !option_ids.insert(option.id.as_str()) {
                    return Err(invalid(format!(
                        "decision {} repeats option id {}",
                        decision.id, option.id
                    )));
                }
            }
            match &decision.kind {
                DecisionKind::Epoch { epoch, .. } => {
                    if by_epoch.insert(*epoch, index).is_some() {
                        return Err(invalid(format!("epoch {epoch} has two decisions")));
                    }
                }
                DecisionKind::Seasonal { season } => {
                    if by_season.insert(*season, index).is_some() {
                        return Err(invalid(format!("season {season} has two decisions")));
                    }
                }
                DecisionKind::Special { .. } => {}
            }
        }

        Ok(Self {
            decisions,
            by_id,
            by_epoch,
            by_season,
        })
    }

    /// Every decision, in declaration order.
    pub fn all(&self) -> &[DecisionRecord] {
        &self.decisions
    }

    /// Look up a decision by id.
    pub fn get(&self, id: &str) -> Option<&DecisionRecord> {
        self.by_id.get(id).and_then(|i| self.decisions.get(*i))
    }

    /// The decision belonging to an epoch.
    pub fn epoch_decision(&self, epoch: Epoch) -> Option<&DecisionRecord> {
        self.by_epoch.get(&epoch).and_then(|i| self.decisions.get(*i))
    }

    /// The decision offered in a season.
    pub fn seasonal_decision(&self, season: Season) -> Option<&DecisionRecord> {
        self.by_season.get(&season).and_then(|i| self.decisions.get(*i))
    }

    /// `(epoch, year, season)` for every epoch decision, for the clock's
    /// trigger table.
    pub fn epoch_triggers(&self) -> Vec<(Epoch, u32, Season)> {
        self.decisions
            .iter()
            .filter_map(|d| match d.kind {
                DecisionKind::Epoch {
                    epoch,
                    year,
                    season,
                } => Some((epoch, year, season)),
                _ => None,
            })
            .collect()
    }

    /// Decisions on offer, ordered epoch, seasonal, special.
    ///
    /// - The epoch decision for the current epoch, unless it has completed.
    /// - The decision for the current season, unless it already resolved on
    ///   this turn.
    /// - Every special decision whose predicate and minimum year hold and
    ///   which has not been resolved before.
    pub fn decisions_available(
        &self,
        time: &TimeState,
        state: &GameState,
        seasonal_resolved_turn: Option<u64>,
        specials_resolved: &BTreeSet<DecisionId>,
    ) -> Vec<&DecisionRecord> {
        let mut available = Vec::new();

        if let Some(epoch) = time.current_epoch {
            if !time.epochs_completed.contains(&epoch) {
                available.extend(self.epoch_decision(epoch));
            }
        }

        if seasonal_resolved_turn != Some(time.turn) {
            available.extend(self.seasonal_decision(time.season));
        }

        available.extend(self.decisions.iter().filter(|d| match &d.kind {
            DecisionKind::Special {
                offer_when,
                min_year,
            } => {
                !specials_resolved.contains(&d.id)
                    && min_year.is_none_or(|y| time.year >= y)
                    && state.satisfies(offer_when)
            }
            _ => false,
        }));

        available
    }

    /// Whether an option's requirements hold. Read-only.
    pub fn option_available(option: &DecisionOption, state: &GameState) -> bool {
        state.satisfies(&option.requirements)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use revolution_state::EffectResolver;
    use revolution_types::{Flag, FlagValue, Metric};

    use super::*;

    fn state(pairs: &[(Metric, i32)]) -> GameState {
        GameState::new(&pairs.iter().copied().collect())
    }

    fn ids(decisions: &[&DecisionRecord]) -> Vec<String> {
        decisions.iter().map(|d| d.id.to_string()).collect()
    }

    #[test]
    fn builtin_catalog_indexes_epochs_and_seasons() {
        let catalog = DecisionCatalog::builtin().unwrap();
        assert_eq!(catalog.epoch_triggers().len(), 5);
        for season in Season::ALL {
            assert!(catalog.seasonal_decision(*season).is_some());
        }
        let boxer = catalog.epoch_decision(Epoch::new(4).unwrap()).unwrap();
        assert_eq!(boxer.id.as_str(), "boxer_fate");
    }

    #[test]
    fn availability_is_ordered_epoch_seasonal_special() {
        let catalog = DecisionCatalog::builtin().unwrap();
        let time = TimeState {
            year: 2,
            season: Season::Autumn,
            turn: 6,
            current_epoch: Epoch::new(2),
            ..TimeState::default()
        };
        let state = state(&[(Metric::Security, 60), (Metric::Innovation, 40)]);

        let available = catalog.decisions_available(&time, &state, None, &BTreeSet::new());
        assert_eq!(
            ids(&available),
            ["purges", "autumn_harvest", "dogs_training", "education_program"]
        );
    }

    #[test]
    fn resolved_decisions_are_not_offered_again() {
        let catalog = DecisionCatalog::builtin().unwrap();
        let mut time = TimeState {
            year: 1,
            season: Season::Spring,
            turn: 4,
            current_epoch: Epoch::new(1),
            ..TimeState::default()
        };
        time.epochs_completed.extend(Epoch::new(1));
        let mut state = state(&[(Metric::Security, 60)]);
        let specials = BTreeSet::from([DecisionId::from("dogs_training")]);

        let available = catalog.decisions_available(&time, &state, Some(4), &specials);
        assert!(available.is_empty());

        // Next visit of the season offers the seasonal decision again.
        time.turn = 8;
        let available = catalog.decisions_available(&time, &state, Some(4), &specials);
        assert_eq!(ids(&available), ["spring_planting"]);

        // A trained dog pack closes the special even without bookkeeping.
        let guard = catalog.get("dogs_training").unwrap().option("guard").unwrap();
        EffectResolver::new()
            .apply_decision(guard, &mut state, 8, &mut Vec::new())
            .unwrap();
        assert_eq!(
            state.flag(Flag::DogsTrained),
            FlagValue::Variant("guard".to_owned())
        );
        let available =
            catalog.decisions_available(&time, &state, Some(8), &BTreeSet::new());
        assert!(available.is_empty());
    }

    #[test]
    fn special_respects_minimum_year() {
        let catalog = DecisionCatalog::builtin().unwrap();
        let time = TimeState::default();
        let state = state(&[(Metric::Innovation, 90), (Metric::Security, 10)]);
        let available = catalog.decisions_available(&time, &state, Some(0), &BTreeSet::new());
        assert!(available.is_empty());
    }

    #[test]
    fn option_availability_checks_requirements() {
        let catalog = DecisionCatalog::builtin().unwrap();
        let boxer = catalog.get("boxer_fate").unwrap();
        let poor = state(&[(Metric::Rations, 74), (Metric::Loyalty, 90)]);
        assert!(!DecisionCatalog::option_available(&boxer.options[0], &poor));
        assert!(DecisionCatalog::option_available(&boxer.options[1], &poor));
        assert!(DecisionCatalog::option_available(&boxer.options[2], &poor));
    }

    #[test]
    fn duplicate_seasonal_decision_is_rejected() {
        let mut records = content::builtin_decisions().unwrap();
        let mut copy = records
            .iter()
            .find(|d| d.id.as_str() == "summer_labor")
            .cloned()
            .unwrap();
        copy.id = DecisionId::from("summer_labor_2");
        records.push(copy);
        assert!(matches!(
            DecisionCatalog::from_records(records),
            Err(ContentError::Invalid { .. })
        ));
    }
}
