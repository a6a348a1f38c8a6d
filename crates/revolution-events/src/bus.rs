//! Synchronous observer bus.
//!
//! Mutations publish through an [`EventSink`]. The [`ObserverBus`] delivers
//! each event to every subscribed [`GameObserver`] in subscription order
//! before `emit` returns. Observers that want the events elsewhere (a UI
//! task, a websocket) forward them into a channel with
//! [`BroadcastObserver`] or [`ChannelObserver`].

use tokio::sync::{broadcast, mpsc};
use tracing::trace;

use crate::payload::{
    DecisionCompleted, DecisionStarted, DelayedEffectFired, EndgameTriggered, EpochTriggered,
    GameEvent, JournalEntryAdded, LocationChanged, MetricChanged, Notice, RelationshipChanged,
    SceneStarted, SeasonChanged, StateRestored,
};

/// Capacity of the broadcast channel used by [`BroadcastObserver`].
///
/// A subscriber that falls further behind receives `Lagged` and skips to
/// the newest event.
pub const BROADCAST_CAPACITY: usize = 256;

/// Anything that accepts published events.
pub trait EventSink {
    /// Publish one event.
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Typed per-kind observer.
///
/// Every method defaults to a no-op; implementors override the kinds they
/// care about. [`GameObserver::on_event`] dispatches to the typed methods
/// and can be overridden to take the whole stream instead.
#[allow(unused_variables)]
pub trait GameObserver: Send {
    /// A metric changed.
    fn on_metric_changed(&mut self, event: &MetricChanged) {}
    /// The season advanced.
    fn on_season_changed(&mut self, event: &SeasonChanged) {}
    /// A decision was offered.
    fn on_decision_started(&mut self, event: &DecisionStarted) {}
    /// A decision resolved.
    fn on_decision_completed(&mut self, event: &DecisionCompleted) {}
    /// A scene became current.
    fn on_scene_started(&mut self, event: &SceneStarted) {}
    /// An epoch became current.
    fn on_epoch_triggered(&mut self, event: &EpochTriggered) {}
    /// The game ended.
    fn on_endgame_triggered(&mut self, event: &EndgameTriggered) {}
    /// A relationship changed.
    fn on_relationship_changed(&mut self, event: &RelationshipChanged) {}
    /// The player moved.
    fn on_location_changed(&mut self, event: &LocationChanged) {}
    /// A delayed effect fired.
    fn on_delayed_effect_fired(&mut self, event: &DelayedEffectFired) {}
    /// A journal line was written.
    fn on_journal_entry(&mut self, event: &JournalEntryAdded) {}
    /// State was restored from a snapshot.
    fn on_state_restored(&mut self, event: &StateRestored) {}
    /// A notice was raised.
    fn on_notice(&mut self, event: &Notice) {}

    /// Receive any event. Dispatches to the typed methods by default.
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::MetricChanged(e) => self.on_metric_changed(e),
            GameEvent::SeasonChanged(e) => self.on_season_changed(e),
            GameEvent::DecisionStarted(e) => self.on_decision_started(e),
            GameEvent::DecisionCompleted(e) => self.on_decision_completed(e),
            GameEvent::SceneStarted(e) => self.on_scene_started(e),
            GameEvent::EpochTriggered(e) => self.on_epoch_triggered(e),
            GameEvent::EndgameTriggered(e) => self.on_endgame_triggered(e),
            GameEvent::RelationshipChanged(e) => self.on_relationship_changed(e),
            GameEvent::LocationChanged(e) => self.on_location_changed(e),
            GameEvent::DelayedEffectFired(e) => self.on_delayed_effect_fired(e),
            GameEvent::JournalEntry(e) => self.on_journal_entry(e),
            GameEvent::StateRestored(e) => self.on_state_restored(e),
            GameEvent::Notice(e) => self.on_notice(e),
        }
    }
}

/// Ordered list of observers.
#[derive(Default)]
pub struct ObserverBus {
    observers: Vec<Box<dyn GameObserver>>,
    published: u64,
}

impl ObserverBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer. Returns its position in delivery order.
    pub fn subscribe(&mut self, observer: Box<dyn GameObserver>) -> usize {
        self.observers.push(observer);
        self.observers.len().saturating_sub(1)
    }

    /// Number of subscribed observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observer is subscribed.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Total events published since creation.
    pub const fn published(&self) -> u64 {
        self.published
    }
}

impl EventSink for ObserverBus {
    fn emit(&mut self, event: GameEvent) {
        trace!(kind = event.kind(), observers = self.observers.len(), "Publishing event");
        self.published = self.published.saturating_add(1);
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }
}

impl core::fmt::Debug for ObserverBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObserverBus")
            .field("observers", &self.observers.len())
            .field("published", &self.published)
            .finish()
    }
}

/// Forwards every event to a tokio broadcast channel.
pub struct BroadcastObserver {
    tx: broadcast::Sender<GameEvent>,
}

impl BroadcastObserver {
    /// Create an observer with a fresh channel of [`BROADCAST_CAPACITY`].
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Subscribe to the forwarded stream.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }

    /// A sender handle, for subscribing after the observer is boxed.
    pub fn sender(&self) -> broadcast::Sender<GameEvent> {
        self.tx.clone()
    }
}

impl Default for BroadcastObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl GameObserver for BroadcastObserver {
    fn on_event(&mut self, event: &GameEvent) {
        // Zero receivers is normal when no consumer is attached.
        let receivers = self.tx.send(event.clone()).unwrap_or(0);
        trace!(kind = event.kind(), receivers, "Event broadcast");
    }
}

/// Forwards every event to a single unbounded mpsc consumer.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<GameEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiving half of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<GameEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl GameObserver for ChannelObserver {
    fn on_event(&mut self, event: &GameEvent) {
        if self.tx.send(event.clone()).is_err() {
            trace!(kind = event.kind(), "Channel consumer dropped");
        }
    }
}
