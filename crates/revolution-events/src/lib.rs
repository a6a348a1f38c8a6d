//! Notifications for the Revolution narrative engine.
//!
//! Every state mutation publishes typed notifications synchronously, in
//! subscription order, before the mutating call returns. This crate defines
//! the payloads and the observer interface; it knows nothing about how the
//! events are produced.
//!
//! # Modules
//!
//! - [`payload`] -- One struct per notification kind plus the [`GameEvent`] union
//! - [`bus`] -- [`EventSink`], [`GameObserver`], [`ObserverBus`] and channel observers

pub mod bus;
pub mod payload;

pub use bus::{
    BROADCAST_CAPACITY, BroadcastObserver, ChannelObserver, EventSink, GameObserver, ObserverBus,
};
pub use payload::{
    DecisionCompleted, DecisionStarted, DelayedEffectFired, EndgameTriggered, EpochTriggered,
    GameEvent, JournalEntryAdded, LocationChanged, MetricChanged, Notice, OptionAvailability,
    RelationshipChanged, SceneStarted, SeasonChanged, StateRestored,
};
