//! Decision effect resolution.
//!
//! [`EffectResolver::apply_decision`] is the only path by which a chosen
//! option mutates the game state. It runs in a fixed order:
//!
//! 1. Validate requirements. On failure nothing is touched.
//! 2. Sum costs and benefits per metric, then clamp each metric once.
//! 3. Apply relationship deltas under the `decision` source.
//! 4. Write flags.
//! 5. Register the delayed effect, if any.
//!
//! Delayed effects fire from [`EffectResolver::fire_due`], called once per
//! turn, in registration order, each at most once.

use std::collections::BTreeMap;

use revolution_events::{
    DelayedEffectFired, EventSink, GameEvent, MetricChanged, RelationshipChanged,
};
use revolution_types::{
    DecisionOption, DelayedEffect, Flag, FlagValue, Metric, MetricDeltas, RelationshipSource,
};
use tracing::{debug, info};

use crate::error::ResolveError;
use crate::state::GameState;

/// Everything a resolved option changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Metric changes, one per metric that moved.
    pub metric_changes: Vec<MetricChanged>,
    /// Flags written by the option.
    pub flags: BTreeMap<Flag, FlagValue>,
    /// Relationship changes.
    pub relationship_changes: Vec<RelationshipChanged>,
    /// The delayed effect registered, if any.
    pub scheduled: Option<DelayedEffect>,
}

/// A delayed effect that fired, with the changes it caused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredEffect {
    /// The effect, marked applied.
    pub effect: DelayedEffect,
    /// Metric changes it caused.
    pub changes: Vec<MetricChanged>,
}

/// Applies option effects and owns the pending delayed effects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectResolver {
    pending: Vec<DelayedEffect>,
}

impl EffectResolver {
    /// A resolver with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver restored from saved pending effects. Applied entries are
    /// dropped.
    pub fn with_pending(pending: Vec<DelayedEffect>) -> Self {
        Self {
            pending: pending.into_iter().filter(|e| !e.applied).collect(),
        }
    }

    /// Copy of the pending effects, in registration order.
    pub fn pending(&self) -> Vec<DelayedEffect> {
        self.pending.clone()
    }

    /// Drop every pending effect.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Resolve a chosen option against the state.
    ///
    /// `turn` is the current turn; a delayed effect with delay `d` fires on
    /// turn `turn + d`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::RequirementNotMet`] without mutating anything
    /// when the option's requirements do not hold.
    pub fn apply_decision(
        &mut self,
        option: &DecisionOption,
        state: &mut GameState,
        turn: u64,
        sink: &mut dyn EventSink,
    ) -> Result<Resolution, ResolveError> {
        state
            .check(&option.requirements)
            .map_err(|unmet| ResolveError::RequirementNotMet { unmet })?;

        let totals = sum_deltas([&option.costs, &option.benefits]);
        let metric_changes = Self::apply_effects(&totals, state, sink);

        let relationship_changes = option
            .relationships
            .iter()
            .map(|(character, delta)| {
                state
                    .relationships
                    .adjust(*character, RelationshipSource::Decision, *delta, sink)
            })
            .collect();

        for (flag, value) in &option.flags {
            if state.flags.set(*flag, value.clone()) {
                debug!(flag = flag.as_str(), value = %value, "Flag set");
            }
        }

        let scheduled = option.delayed.as_ref().map(|spec| {
            let effect = DelayedEffect {
                kind: spec.kind.clone(),
                effects: spec.effects.clone(),
                registered_at: turn,
                fires_at: turn.saturating_add(u64::from(spec.delay)),
                success: spec.success,
                applied: false,
            };
            info!(
                kind = %effect.kind,
                fires_at = effect.fires_at,
                "Delayed effect scheduled"
            );
            self.pending.push(effect.clone());
            effect
        });

        Ok(Resolution {
            metric_changes,
            flags: option.flags.clone(),
            relationship_changes,
            scheduled,
        })
    }

    /// Apply summed deltas, clamping each metric once.
    pub fn apply_effects(
        deltas: &MetricDeltas,
        state: &mut GameState,
        sink: &mut dyn EventSink,
    ) -> Vec<MetricChanged> {
        deltas
            .iter()
            .filter(|(_, delta)| **delta != 0)
            .filter_map(|(metric, delta)| state.metrics.adjust(*metric, *delta, sink))
            .collect()
    }

    /// Fire every pending effect due on or before `turn`, in registration
    /// order. Fired effects leave the pending list.
    pub fn fire_due(
        &mut self,
        turn: u64,
        state: &mut GameState,
        sink: &mut dyn EventSink,
    ) -> Vec<FiredEffect> {
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|e| e.fires_at <= turn);
        self.pending = waiting;

        due.into_iter()
            .map(|mut effect| {
                let changes = Self::apply_effects(&effect.effects, state, sink);
                effect.applied = true;
                info!(kind = %effect.kind, turn, changes = changes.len(), "Delayed effect fired");
                sink.emit(GameEvent::DelayedEffectFired(DelayedEffectFired {
                    kind: effect.kind.clone(),
                    effects: effect.effects.clone(),
                    turn,
                }));
                FiredEffect { effect, changes }
            })
            .collect()
    }

    /// Parse string-keyed deltas into typed ones.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownMetric`] for the first key outside
    /// the fixed metric set; nothing is returned partially.
    pub fn parse_deltas<'a, I>(raw: I) -> Result<MetricDeltas, ResolveError>
    where
        I: IntoIterator<Item = (&'a str, i32)>,
    {
        let mut deltas = MetricDeltas::new();
        for (key, delta) in raw {
            let metric: Metric = key.parse().map_err(|_| ResolveError::UnknownMetric {
                key: key.to_owned(),
            })?;
            let entry = deltas.entry(metric).or_insert(0);
            *entry = entry.saturating_add(delta);
        }
        Ok(deltas)
    }
}

/// Sum several delta maps per metric.
fn sum_deltas<'a>(parts: impl IntoIterator<Item = &'a MetricDeltas>) -> MetricDeltas {
    let mut totals = MetricDeltas::new();
    for part in parts {
        for (metric, delta) in part {
            let entry = totals.entry(*metric).or_insert(0);
            *entry = entry.saturating_add(*delta);
        }
    }
    totals
}
