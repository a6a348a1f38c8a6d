//! The mutable game state bundle and requirement evaluation.

use std::collections::BTreeMap;

use revolution_events::{EventSink, MetricChanged, RelationshipChanged};
use revolution_types::{
    Character, Flag, FlagValue, Metric, RelationshipSource, RelationshipTable, Requirements,
};

use crate::error::Unmet;
use crate::flags::FlagSet;
use crate::metrics::MetricStore;
use crate::relationships::RelationshipBook;

/// Metrics, flags and relationships.
///
/// Read access is by value; mutation goes through the resolver or the
/// narrow methods here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) metrics: MetricStore,
    pub(crate) flags: FlagSet,
    pub(crate) relationships: RelationshipBook,
}

impl GameState {
    /// Fresh state with the given initial metrics and no flags.
    pub fn new(initial_metrics: &BTreeMap<Metric, i32>) -> Self {
        Self {
            metrics: MetricStore::new(initial_metrics),
            flags: FlagSet::new(),
            relationships: RelationshipBook::new(),
        }
    }

    /// Current value of a metric.
    pub fn metric(&self, metric: Metric) -> i32 {
        self.metrics.get(metric)
    }

    /// Copy of every metric value.
    pub fn metrics(&self) -> BTreeMap<Metric, i32> {
        self.metrics.snapshot()
    }

    /// Value of a flag, `false` when unset.
    pub fn flag(&self, flag: Flag) -> FlagValue {
        self.flags.get(flag)
    }

    /// Whether a flag is set to a truthy value.
    pub fn flag_set(&self, flag: Flag) -> bool {
        self.flags.is_set(flag)
    }

    /// Copy of every written flag.
    pub fn flags(&self) -> BTreeMap<Flag, FlagValue> {
        self.flags.snapshot()
    }

    /// Overall relationship with a character.
    pub fn relationship(&self, character: Character) -> i32 {
        self.relationships.overall(character)
    }

    /// Copy of every relationship source.
    pub fn relationships(&self) -> RelationshipTable {
        self.relationships.snapshot()
    }

    /// Adjust a relationship source outside decision resolution
    /// (dialogue, location visits).
    pub fn adjust_relationship(
        &mut self,
        character: Character,
        source: RelationshipSource,
        delta: i32,
        sink: &mut dyn EventSink,
    ) -> RelationshipChanged {
        self.relationships.adjust(character, source, delta, sink)
    }

    /// Check a requirement set, reporting the first failure.
    ///
    /// Metrics are checked before flags, each in key order.
    pub fn check(&self, requirements: &Requirements) -> Result<(), Unmet> {
        for (metric, bound) in &requirements.metrics {
            let actual = self.metrics.get(*metric);
            if !bound.holds(actual) {
                return Err(Unmet::Metric {
                    metric: *metric,
                    bound: *bound,
                    actual,
                });
            }
        }
        for (flag, required) in &requirements.flags {
            if !self.flags.matches(*flag, required) {
                return Err(Unmet::Flag {
                    flag: *flag,
                    required: required.clone(),
                    actual: self.flags.get(*flag),
                });
            }
        }
        Ok(())
    }

    /// Whether every requirement holds.
    pub fn satisfies(&self, requirements: &Requirements) -> bool {
        self.check(requirements).is_ok()
    }

    /// Replace everything from snapshot parts. No events are emitted.
    pub fn restore(
        &mut self,
        metrics: &BTreeMap<Metric, i32>,
        flags: &BTreeMap<Flag, FlagValue>,
        relationships: &RelationshipTable,
    ) {
        self.metrics.restore(metrics);
        self.flags.restore(flags);
        self.relationships.restore(relationships);
    }

    /// Overwrite a metric without validation. Used by debug hooks.
    pub fn force_metric(
        &mut self,
        metric: Metric,
        value: i32,
        sink: &mut dyn EventSink,
    ) -> Option<MetricChanged> {
        self.metrics.set(metric, value, sink)
    }
}
