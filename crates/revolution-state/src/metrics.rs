//! Bounded metric storage.
//!
//! Every metric always holds a value in `[0, 100]`. A write that changes a
//! value emits exactly one [`MetricChanged`] before returning; a write that
//! lands on the current value emits nothing.

use std::collections::BTreeMap;

use revolution_events::{EventSink, GameEvent, MetricChanged};
use revolution_types::Metric;
use tracing::debug;

/// Value a metric takes when configuration does not name it.
pub const DEFAULT_METRIC_VALUE: i32 = 50;

/// The seven game metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricStore {
    values: BTreeMap<Metric, i32>,
}

impl MetricStore {
    /// Create a store from initial values. Missing metrics take
    /// [`DEFAULT_METRIC_VALUE`]; out-of-range values are clamped.
    pub fn new(initial: &BTreeMap<Metric, i32>) -> Self {
        let values = Metric::ALL
            .iter()
            .map(|m| {
                let raw = initial.get(m).copied().unwrap_or(DEFAULT_METRIC_VALUE);
                (*m, Metric::clamp(raw))
            })
            .collect();
        Self { values }
    }

    /// Current value of a metric.
    pub fn get(&self, metric: Metric) -> i32 {
        self.values
            .get(&metric)
            .copied()
            .unwrap_or(DEFAULT_METRIC_VALUE)
    }

    /// Set a metric, clamping into range.
    ///
    /// Returns the change when the stored value moved, after publishing it
    /// to `sink`.
    pub fn set(
        &mut self,
        metric: Metric,
        value: i32,
        sink: &mut dyn EventSink,
    ) -> Option<MetricChanged> {
        let old_value = self.get(metric);
        let new_value = Metric::clamp(value);
        if new_value == old_value {
            return None;
        }
        self.values.insert(metric, new_value);
        let change = MetricChanged {
            metric,
            old_value,
            new_value,
            delta: new_value.saturating_sub(old_value),
        };
        debug!(
            metric = metric.as_str(),
            old_value,
            new_value,
            "Metric changed"
        );
        sink.emit(GameEvent::MetricChanged(change));
        Some(change)
    }

    /// Add a signed delta to a metric, clamping once.
    pub fn adjust(
        &mut self,
        metric: Metric,
        delta: i32,
        sink: &mut dyn EventSink,
    ) -> Option<MetricChanged> {
        let target = self.get(metric).saturating_add(delta);
        self.set(metric, target, sink)
    }

    /// Copy of every metric value.
    pub fn snapshot(&self) -> BTreeMap<Metric, i32> {
        self.values.clone()
    }

    /// Replace every value from a snapshot. No events are emitted.
    pub fn restore(&mut self, snapshot: &BTreeMap<Metric, i32>) {
        *self = Self::new(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use revolution_events::GameEvent;

    use super::*;

    fn store() -> MetricStore {
        MetricStore::new(&BTreeMap::from([
            (Metric::Loyalty, 60),
            (Metric::Rations, 150),
        ]))
    }

    #[test]
    fn initial_values_are_defined_and_clamped() {
        let store = store();
        assert_eq!(store.get(Metric::Loyalty), 60);
        assert_eq!(store.get(Metric::Rations), 100);
        assert_eq!(store.get(Metric::Fatigue), DEFAULT_METRIC_VALUE);
        assert_eq!(store.snapshot().len(), Metric::ALL.len());
    }

    #[test]
    fn set_clamps_and_emits_once() {
        let mut store = store();
        let mut events: Vec<GameEvent> = Vec::new();

        let change = store.set(Metric::Loyalty, -40, &mut events);
        assert_eq!(
            change,
            Some(MetricChanged {
                metric: Metric::Loyalty,
                old_value: 60,
                new_value: 0,
                delta: -60,
            })
        );
        assert_eq!(events.len(), 1);

        // Writing the same clamped value is silent.
        assert!(store.set(Metric::Loyalty, -5, &mut events).is_none());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn adjust_saturates_on_extreme_deltas() {
        let mut store = store();
        let mut events: Vec<GameEvent> = Vec::new();
        store.adjust(Metric::Security, i32::MAX, &mut events);
        assert_eq!(store.get(Metric::Security), 100);
        store.adjust(Metric::Security, i32::MIN, &mut events);
        assert_eq!(store.get(Metric::Security), 0);
    }

    #[test]
    fn restore_replaces_values_silently() {
        let mut store = store();
        let saved = store.snapshot();
        let mut events: Vec<GameEvent> = Vec::new();
        store.set(Metric::Loyalty, 5, &mut events);
        store.restore(&saved);
        assert_eq!(store.get(Metric::Loyalty), 60);
        assert_eq!(events.len(), 1);
    }
}
