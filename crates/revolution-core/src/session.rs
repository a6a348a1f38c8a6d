//! The game session: all mutable game state and the entry points that
//! change it.
//!
//! [`GameSession`] is a plain synchronous value. Every entry point runs to
//! completion, publishing its notifications to the subscribed observers
//! before it returns. Scene presentation is the one deferred effect: entry
//! points record [`SceneCue`]s, and the async [`crate::game::Game`] handle
//! moves them into the narrative scheduler.
//!
//! # Entry points
//!
//! - [`GameSession::begin`] -- Opening scene and first offered decision
//! - [`GameSession::start_decision`] / [`GameSession::make_choice`] -- Decision lifecycle
//! - [`GameSession::tick`] -- Advance one season
//! - [`GameSession::change_location`] / [`GameSession::talk`] -- Exploration
//! - [`GameSession::snapshot`] / [`GameSession::restore`] / [`GameSession::reset`] -- Persistence

use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use revolution_events::{
    DecisionCompleted, DecisionStarted, EndgameTriggered, EpochTriggered, EventSink, GameEvent,
    GameObserver, JournalEntryAdded, LocationChanged, MetricChanged, Notice, ObserverBus,
    OptionAvailability, RelationshipChanged, SceneStarted, SeasonChanged, StateRestored,
};
use revolution_state::{EffectResolver, FiredEffect, GameState, Resolution, ResolveError};
use revolution_types::{
    Character, DecisionCategory, DecisionHistoryEntry, DecisionId, DecisionKind, DecisionOption,
    DecisionRecord, DelayedEffect, Emotion, Ending, Epoch, GameSnapshot, JournalLine, Location,
    LocationVisit, Metric, NoticeLevel, OptionId, RelationshipSource, SceneHistoryEntry, SceneId,
    SceneRecord, Season, TimeState, UnknownKey,
};
use tracing::{debug, error, info, warn};

use crate::catalog::DecisionCatalog;
use crate::characters::{self, Dialogue, Topic};
use crate::clock::{ClockError, GameClock};
use crate::config::GameConfig;
use crate::content::ContentError;
use crate::ending::EndingResolver;
use crate::history::{DecisionStats, History};
use crate::journal::Journal;
use crate::locations::{self, LocationEvent, LocationScene};
use crate::random_events::{self, RandomEvent};
use crate::scenes::{FALLBACK_ENDING_SCENE, SceneCatalog};

/// Scene queued when the game begins.
pub const OPENING_SCENE: &str = "opening";

/// How many dialogues are remembered.
pub const DIALOGUE_HISTORY_CAP: usize = 100;

/// Errors raised by session entry points. None of them leave a partial
/// mutation behind.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Content tables failed to load.
    #[error("content error: {source}")]
    Content {
        /// The underlying content error.
        #[from]
        source: ContentError,
    },

    /// The clock refused to advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The chosen option could not be applied.
    #[error("resolve error: {source}")]
    Resolve {
        /// The underlying resolver error.
        #[from]
        source: ResolveError,
    },

    /// A string did not name a known key.
    #[error("{source}")]
    UnknownKey {
        /// The failed lookup.
        #[from]
        source: UnknownKey,
    },

    /// No decision with this id exists.
    #[error("unknown decision: {id}")]
    UnknownDecision {
        /// The requested id.
        id: String,
    },

    /// The decision exists but may not be offered again.
    #[error("decision {id} is no longer available")]
    DecisionUnavailable {
        /// The decision.
        id: DecisionId,
    },

    /// A choice was made with nothing on offer.
    #[error("no decision is active")]
    NoActiveDecision,

    /// The active decision has no option with this id.
    #[error("decision {decision} has no option {option}")]
    UnknownOption {
        /// The active decision.
        decision: DecisionId,
        /// The requested option.
        option: String,
    },

    /// An epoch number outside `1..=5`.
    #[error("unknown epoch: {number}")]
    UnknownEpoch {
        /// The requested number.
        number: u8,
    },

    /// A snapshot is internally inconsistent.
    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot {
        /// What is wrong.
        reason: String,
    },
}

/// A request to present a scene, waiting to be handed to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneCue {
    /// The scene.
    pub scene_id: SceneId,
    /// Wait before presenting.
    pub delay: Duration,
    /// Whether it jumps the queue.
    pub priority: bool,
}

/// What one season advance did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The new turn.
    pub turn: u64,
    /// The new year.
    pub year: u32,
    /// The new season.
    pub season: Season,
    /// Delayed effects that fired.
    pub fired: Vec<FiredEffect>,
    /// Epoch triggered by the advance.
    pub epoch: Option<Epoch>,
    /// Decision offered automatically.
    pub offered: Option<DecisionId>,
    /// Random event that struck.
    pub random_event: Option<RandomEvent>,
    /// Ending reached at the final boundary.
    pub ending: Option<Ending>,
}

/// What a resolved choice did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOutcome {
    /// The decision.
    pub decision_id: DecisionId,
    /// The chosen option.
    pub option_id: OptionId,
    /// Changes made by the resolver.
    pub resolution: Resolution,
    /// Epoch completed by the choice.
    pub epoch_completed: Option<Epoch>,
}

/// What a move attempt did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationOutcome {
    /// Whether the player moved.
    pub moved: bool,
    /// Arrival event, if one happened.
    pub event: Option<LocationEvent>,
    /// Scene queued by arriving.
    pub scene: Option<LocationScene>,
    /// Character met on arrival.
    pub encounter: Option<Dialogue>,
}

/// One game in progress.
#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    catalog: DecisionCatalog,
    scenes: SceneCatalog,
    endings: EndingResolver,
    state: GameState,
    resolver: EffectResolver,
    clock: GameClock,
    bus: ObserverBus,
    rng: StdRng,
    active_decision: Option<DecisionRecord>,
    current_scene: Option<SceneRecord>,
    location: Location,
    visited: BTreeSet<Location>,
    history: History,
    journal: Journal,
    dialogues: VecDeque<Dialogue>,
    seasonal_resolved_turn: Option<u64>,
    specials_resolved: BTreeSet<DecisionId>,
    ending: Option<Ending>,
    cues: Vec<SceneCue>,
}

impl GameSession {
    /// A fresh session over the given content.
    pub fn new(
        config: GameConfig,
        catalog: DecisionCatalog,
        scenes: SceneCatalog,
        endings: EndingResolver,
    ) -> Self {
        let clock = fresh_clock(&config, &catalog);
        Self {
            state: GameState::new(&config.metrics.initial),
            resolver: EffectResolver::new(),
            clock,
            bus: ObserverBus::new(),
            rng: StdRng::seed_from_u64(config.game.seed),
            active_decision: None,
            current_scene: None,
            location: Location::Barn,
            visited: BTreeSet::from([Location::Barn]),
            history: History::new(config.narrative.scene_history_cap),
            journal: Journal::new(config.journal.max_entries),
            dialogues: VecDeque::new(),
            seasonal_resolved_turn: None,
            specials_resolved: BTreeSet::new(),
            ending: None,
            cues: Vec::new(),
            config,
            catalog,
            scenes,
            endings,
        }
    }

    /// A fresh session over the embedded content tables.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Content`] if a table fails to load.
    pub fn with_builtin_content(config: GameConfig) -> Result<Self, SessionError> {
        Ok(Self::new(
            config,
            DecisionCatalog::builtin()?,
            SceneCatalog::builtin()?,
            EndingResolver::builtin()?,
        ))
    }

    /// Add an observer. Observers are called in subscription order.
    pub fn subscribe(&mut self, observer: Box<dyn GameObserver>) -> usize {
        self.bus.subscribe(observer)
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// The configuration the session was built with.
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read-only view of metrics, flags and relationships.
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// The decision catalog.
    pub const fn catalog(&self) -> &DecisionCatalog {
        &self.catalog
    }

    /// The scene catalog, including generated scenes.
    pub const fn scenes(&self) -> &SceneCatalog {
        &self.scenes
    }

    /// Current value of a metric.
    pub fn metric(&self, metric: Metric) -> i32 {
        self.state.metric(metric)
    }

    /// Copy of the calendar.
    pub fn time(&self) -> TimeState {
        self.clock.time()
    }

    /// The decision on offer.
    pub fn active_decision(&self) -> Option<DecisionRecord> {
        self.active_decision.clone()
    }

    /// The scene on stage.
    pub fn current_scene(&self) -> Option<SceneRecord> {
        self.current_scene.clone()
    }

    /// Where the player is.
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Every location visited so far.
    pub fn visited_locations(&self) -> BTreeSet<Location> {
        self.visited.clone()
    }

    /// Every move, oldest first.
    pub fn location_history(&self) -> Vec<LocationVisit> {
        self.history.locations()
    }

    /// Delayed effects still waiting.
    pub fn pending_effects(&self) -> Vec<DelayedEffect> {
        self.resolver.pending()
    }

    /// The ending reached, once the game is over.
    pub const fn ending(&self) -> Option<Ending> {
        self.ending
    }

    /// Whether the game has ended.
    pub const fn is_over(&self) -> bool {
        self.clock.is_ended()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Queue the opening scene and offer the first decision.
    ///
    /// Returns the decision offered, if any.
    pub fn begin(&mut self) -> Option<DecisionId> {
        let time = self.clock.time();
        info!(
            seed = self.config.game.seed,
            year = time.year,
            season = time.season.as_str(),
            "Game started"
        );
        self.cue(SceneId::from(OPENING_SCENE), Duration::ZERO, false);
        self.offer_for_turn(false).1
    }

    /// Advance one season.
    ///
    /// In order: advance the calendar, fire due delayed effects, publish
    /// the season change, queue the season's scene, trigger the epoch or
    /// offer the seasonal decision, roll for a random event, and resolve
    /// the ending at the final boundary.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Clock`] once the game has ended.
    pub fn tick(&mut self) -> Result<TickSummary, SessionError> {
        let advance = self.clock.advance()?;

        let fired = self
            .resolver
            .fire_due(advance.turn, &mut self.state, &mut self.bus);
        for fired_effect in &fired {
            self.add_to_log(delayed_effect_line(&fired_effect.effect));
        }

        self.bus.emit(GameEvent::SeasonChanged(SeasonChanged {
            season: advance.season,
            year: advance.year,
            turn: advance.turn,
        }));
        if advance.new_year {
            self.add_to_log(format!("Year {} begins.", advance.year));
        }
        self.cue_season_scene(advance.year, advance.season);

        let (epoch, offered) = self.offer_for_turn(true);
        let random_event = self.maybe_random_event();

        let ending = if self.clock.at_final_boundary() {
            Some(self.finish())
        } else {
            None
        };

        Ok(TickSummary {
            turn: advance.turn,
            year: advance.year,
            season: advance.season,
            fired,
            epoch,
            offered,
            random_event,
            ending,
        })
    }

    /// Return to the configured initial state.
    ///
    /// Observers stay subscribed; everything else starts over, including
    /// the random seed.
    pub fn reset(&mut self) {
        self.state = GameState::new(&self.config.metrics.initial);
        self.resolver.clear();
        self.clock = fresh_clock(&self.config, &self.catalog);
        self.rng = StdRng::seed_from_u64(self.config.game.seed);
        self.active_decision = None;
        self.current_scene = None;
        self.location = Location::Barn;
        self.visited = BTreeSet::from([Location::Barn]);
        self.history.clear();
        self.journal.clear();
        self.dialogues.clear();
        self.seasonal_resolved_turn = None;
        self.specials_resolved.clear();
        self.ending = None;
        self.cues.clear();
        self.scenes.clear_generated();
        info!("Game reset");
        self.notify(NoticeLevel::Info, "Game reset");
    }

    /// Take the scene cues recorded since the last drain, oldest first.
    pub fn drain_scene_cues(&mut self) -> Vec<SceneCue> {
        std::mem::take(&mut self.cues)
    }

    /// Publish a notice for the player.
    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Info => info!(%message, "Notice"),
            NoticeLevel::Warning => warn!(%message, "Notice"),
            NoticeLevel::Error => error!(%message, "Notice"),
        }
        self.bus.emit(GameEvent::Notice(Notice { level, message }));
    }

    // -----------------------------------------------------------------------
    // Decisions
    // -----------------------------------------------------------------------

    /// Decisions the player may start now, ordered epoch, seasonal, special.
    pub fn decisions_available(&self) -> Vec<DecisionRecord> {
        self.catalog
            .decisions_available(
                &self.clock.time(),
                &self.state,
                self.seasonal_resolved_turn,
                &self.specials_resolved,
            )
            .into_iter()
            .cloned()
            .collect()
    }

    /// Offer a decision, annotating which options are currently available.
    ///
    /// Replaces any decision already on offer.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownDecision`] for an unknown id and
    /// [`SessionError::DecisionUnavailable`] for a completed epoch, a
    /// special already resolved, or a seasonal decision that belongs to
    /// another season or was already resolved this season.
    pub fn start_decision(&mut self, id: &str) -> Result<DecisionRecord, SessionError> {
        let decision = self
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownDecision { id: id.to_owned() })?;
        if self.is_exhausted(&decision) {
            return Err(SessionError::DecisionUnavailable { id: decision.id });
        }

        let options: Vec<OptionAvailability> = decision
            .options
            .iter()
            .map(|option| OptionAvailability {
                option_id: option.id.clone(),
                available: DecisionCatalog::option_available(option, &self.state),
            })
            .collect();
        info!(
            decision = %decision.id,
            category = decision.category().as_str(),
            available = options.iter().filter(|o| o.available).count(),
            "Decision started"
        );
        self.bus.emit(GameEvent::DecisionStarted(DecisionStarted {
            decision: decision.clone(),
            options,
        }));
        self.active_decision = Some(decision.clone());
        Ok(decision)
    }

    /// Choose an option of the decision on offer.
    ///
    /// On success the decision leaves the active slot. On any error it
    /// stays on offer and nothing has changed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveDecision`],
    /// [`SessionError::UnknownOption`], or [`SessionError::Resolve`] when
    /// the option's requirements do not hold.
    pub fn make_choice(&mut self, option_id: &str) -> Result<ChoiceOutcome, SessionError> {
        let decision = self
            .active_decision
            .take()
            .ok_or(SessionError::NoActiveDecision)?;

        let Some(option) = decision.option(option_id).cloned() else {
            let err = SessionError::UnknownOption {
                decision: decision.id.clone(),
                option: option_id.to_owned(),
            };
            self.active_decision = Some(decision);
            return Err(err);
        };

        match self.resolver.apply_decision(
            &option,
            &mut self.state,
            self.clock.turn(),
            &mut self.bus,
        ) {
            Ok(resolution) => Ok(self.complete_decision(&decision, &option, resolution)),
            Err(source) => {
                warn!(decision = %decision.id, option = option_id, error = %source, "Choice rejected");
                self.active_decision = Some(decision);
                Err(source.into())
            }
        }
    }

    /// Resolved decisions, oldest first. `None` returns all of them.
    pub fn decision_history(&self, limit: Option<usize>) -> Vec<DecisionHistoryEntry> {
        self.history.decisions(limit)
    }

    /// Totals by category and season plus the most recent decisions.
    pub fn decision_stats(&self) -> DecisionStats {
        self.history.decision_stats()
    }

    // -----------------------------------------------------------------------
    // Scenes
    // -----------------------------------------------------------------------

    /// Put a scene on stage.
    ///
    /// Unless `force` is set, an authored scene whose requirements do not
    /// hold is rejected with no state change. Generated scenes never have
    /// requirements.
    pub fn start_scene(&mut self, id: &str, force: bool) -> Option<SceneRecord> {
        let Some(scene) = self.scenes.get(id).cloned() else {
            warn!(scene = id, "Unknown scene");
            return None;
        };
        let gate = if force || scene.generated {
            Ok(())
        } else {
            self.state.check(&scene.requirements)
        };
        if let Err(unmet) = gate {
            debug!(scene = id, %unmet, "Scene requirements not met");
            return None;
        }

        let time = self.clock.time();
        self.history.record_scene(SceneHistoryEntry {
            scene_id: scene.id.clone(),
            season: time.season,
            year: time.year,
            turn: time.turn,
            recorded_at: Utc::now(),
        });
        self.current_scene = Some(scene.clone());
        info!(scene = %scene.id, forced = force, "Scene started");
        self.bus.emit(GameEvent::SceneStarted(SceneStarted {
            scene: scene.clone(),
        }));
        Some(scene)
    }

    /// Take the current scene off stage.
    pub fn clear_scene(&mut self) -> Option<SceneRecord> {
        self.current_scene.take()
    }

    /// Presented scenes, oldest first. `None` returns all of them.
    pub fn scene_history(&self, limit: Option<usize>) -> Vec<SceneHistoryEntry> {
        self.history.scenes(limit)
    }

    /// Authored scenes whose requirements and calendar triggers hold.
    pub fn available_scenes(&self) -> Vec<SceneRecord> {
        self.scenes
            .available_scenes(&self.clock.time(), &self.state)
            .into_iter()
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Exploration and characters
    // -----------------------------------------------------------------------

    /// Move the player.
    ///
    /// A restricted location is refused with a journal line. Moving to the
    /// current location does nothing. Otherwise the move is recorded and
    /// may trigger an arrival event, a scene and a chance encounter.
    pub fn change_location(&mut self, location: Location) -> LocationOutcome {
        let details = locations::info(location);
        if !locations::is_accessible(location, &self.state) {
            info!(location = location.as_str(), "Location restricted");
            self.add_to_log(format!("Access to {} is restricted.", details.name));
            return LocationOutcome::default();
        }
        let previous = self.location;
        if previous == location {
            return LocationOutcome::default();
        }

        self.location = location;
        self.visited.insert(location);
        self.history.record_location(LocationVisit {
            from: previous,
            to: location,
            turn: self.clock.turn(),
        });
        info!(from = previous.as_str(), to = location.as_str(), "Location changed");
        self.bus.emit(GameEvent::LocationChanged(LocationChanged {
            location,
            previous,
        }));
        self.add_to_log(format!("Traveled to {}", details.name));

        let event = locations::roll_location_event(location, &self.state, &mut self.rng);
        if let Some(event) = &event {
            let changes = EffectResolver::apply_effects(&event.effects, &mut self.state, &mut self.bus);
            self.add_to_log(event.text.clone());
            self.react(&changes);
        }

        let memory_chance = probability(self.config.events.memory_scene_chance);
        let scene = locations::route_scene(location, &self.state, memory_chance, &mut self.rng);
        match &scene {
            Some(LocationScene::View(id)) => {
                let delay = Duration::from_millis(self.config.narrative.location_scene_delay_ms);
                self.cue(id.clone(), delay, false);
            }
            Some(LocationScene::Memory(id)) => {
                let delay = Duration::from_millis(self.config.narrative.memory_scene_delay_ms);
                self.cue(id.clone(), delay, false);
            }
            None => {}
        }

        let encounter = locations::roll_encounter(location, &mut self.rng)
            .map(|character| self.talk(character, None));

        LocationOutcome {
            moved: true,
            event,
            scene,
            encounter,
        }
    }

    /// Speak with a character, optionally about a topic. The dialogue is
    /// remembered.
    pub fn talk(&mut self, character: Character, topic: Option<Topic>) -> Dialogue {
        let dialogue = characters::dialogue(character, topic, &self.state);
        debug!(
            character = character.as_str(),
            emotion = dialogue.emotion.as_str(),
            lines = dialogue.lines.len(),
            "Dialogue"
        );
        self.dialogues.push_back(dialogue.clone());
        while self.dialogues.len() > DIALOGUE_HISTORY_CAP {
            self.dialogues.pop_front();
        }
        dialogue
    }

    /// Remembered dialogues, oldest first, optionally for one character.
    pub fn dialogue_history(&self, character: Option<Character>, limit: usize) -> Vec<Dialogue> {
        let matching: Vec<&Dialogue> = self
            .dialogues
            .iter()
            .filter(|d| character.is_none_or(|c| d.character == c))
            .collect();
        let skip = matching.len().saturating_sub(limit);
        matching.into_iter().skip(skip).cloned().collect()
    }

    /// A character's current emotion.
    pub fn emotion(&self, character: Character) -> Emotion {
        characters::emotion(character, &self.state)
    }

    /// Overall relationship with a character.
    pub fn relationship(&self, character: Character) -> i32 {
        self.state.relationship(character)
    }

    /// Adjust one relationship source.
    pub fn adjust_relationship(
        &mut self,
        character: Character,
        delta: i32,
        source: RelationshipSource,
    ) -> RelationshipChanged {
        self.state
            .adjust_relationship(character, source, delta, &mut self.bus)
    }

    // -----------------------------------------------------------------------
    // Journal and random events
    // -----------------------------------------------------------------------

    /// Append a line to the journal.
    pub fn add_to_log(&mut self, text: impl Into<String>) {
        let line = self.journal.push(self.clock.turn(), text);
        debug!(turn = line.turn, text = %line.text, "Journal entry");
        self.bus.emit(GameEvent::JournalEntry(JournalEntryAdded {
            text: line.text,
            turn: line.turn,
        }));
    }

    /// The last `n` journal lines, oldest first.
    pub fn recent_log(&self, n: usize) -> Vec<JournalLine> {
        self.journal.recent(n)
    }

    /// Pick and apply one applicable random event, if there is one.
    pub fn trigger_random_event(&mut self) -> Option<RandomEvent> {
        let event = random_events::pick_event(self.clock.season(), &self.state, &mut self.rng)?;
        let changes = EffectResolver::apply_effects(&event.effects, &mut self.state, &mut self.bus);
        info!(kind = ?event.kind, changes = changes.len(), "Random event");
        self.add_to_log(format!("RANDOM EVENT: {}", event.message));
        self.react(&changes);
        Some(event)
    }

    /// Roll the configured chance and trigger a random event on success.
    pub fn maybe_random_event(&mut self) -> Option<RandomEvent> {
        let chance = probability(self.config.events.random_event_chance);
        if self.rng.random_bool(chance) {
            self.trigger_random_event()
        } else {
            None
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Serializable copy of every piece of mutable state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            metrics: self.state.metrics(),
            flags: self.state.flags(),
            relationships: self.state.relationships(),
            time: self.clock.time(),
            pending_effects: self.resolver.pending(),
            location: self.location,
            visited_locations: self.visited.clone(),
            decision_history: self.history.decisions(None),
            scene_history: self.history.scenes(None),
            location_history: self.history.locations(),
            journal: self.journal.lines(),
            seasonal_resolved_turn: self.seasonal_resolved_turn,
            specials_resolved: self.specials_resolved.clone(),
            ending: self.ending,
        }
    }

    /// Replace every piece of mutable state from a snapshot.
    ///
    /// The active decision, current scene, queued cues and generated
    /// scenes are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidSnapshot`], leaving the session
    /// untouched, when the snapshot's calendar is inconsistent.
    pub fn restore(&mut self, snapshot: &GameSnapshot) -> Result<(), SessionError> {
        validate_snapshot(snapshot)?;

        self.state.restore(
            &snapshot.metrics,
            &snapshot.flags,
            &snapshot.relationships,
        );
        self.clock
            .restore(snapshot.time.clone(), snapshot.ending.is_some());
        self.resolver = EffectResolver::with_pending(snapshot.pending_effects.clone());
        self.location = snapshot.location;
        self.visited.clone_from(&snapshot.visited_locations);
        self.visited.insert(snapshot.location);
        self.history.restore(
            snapshot.decision_history.clone(),
            &snapshot.scene_history,
            snapshot.location_history.clone(),
        );
        self.journal.restore(&snapshot.journal);
        self.seasonal_resolved_turn = snapshot.seasonal_resolved_turn;
        self.specials_resolved.clone_from(&snapshot.specials_resolved);
        self.ending = snapshot.ending;

        self.active_decision = None;
        self.current_scene = None;
        self.cues.clear();
        self.dialogues.clear();
        self.scenes.clear_generated();

        let turn = snapshot.time.turn;
        info!(turn, year = snapshot.time.year, "State restored");
        self.bus
            .emit(GameEvent::StateRestored(StateRestored { turn }));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Debug hooks
    // -----------------------------------------------------------------------

    /// Adjust a metric by name, bypassing decisions.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Resolve`] when the name is not a metric.
    pub fn debug_adjust_metric(
        &mut self,
        name: &str,
        delta: i32,
    ) -> Result<Vec<MetricChanged>, SessionError> {
        let deltas = EffectResolver::parse_deltas([(name, delta)])?;
        warn!(metric = name, delta, "Debug hook adjusting metric outside decision resolution");
        Ok(EffectResolver::apply_effects(
            &deltas,
            &mut self.state,
            &mut self.bus,
        ))
    }

    /// Force an epoch to trigger now, bypassing the calendar.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownEpoch`] outside `1..=5` and
    /// [`SessionError::DecisionUnavailable`] when the epoch has completed.
    pub fn debug_trigger_epoch(&mut self, number: u8) -> Result<Option<DecisionId>, SessionError> {
        let epoch = Epoch::new(number).ok_or(SessionError::UnknownEpoch { number })?;
        warn!(epoch = number, "Debug hook forcing epoch outside its trigger");
        if !self.clock.set_current_epoch(epoch) {
            let id = self
                .catalog
                .epoch_decision(epoch)
                .map_or_else(|| DecisionId::new(epoch.name()), |d| d.id.clone());
            return Err(SessionError::DecisionUnavailable { id });
        }
        Ok(self.enter_epoch(epoch, true))
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn cue(&mut self, scene_id: SceneId, delay: Duration, priority: bool) {
        debug!(scene = %scene_id, priority, "Scene cued");
        self.cues.push(SceneCue {
            scene_id,
            delay,
            priority,
        });
    }

    /// Queue the authored scene for a season visit, or a generated one
    /// when none is authored.
    fn cue_season_scene(&mut self, year: u32, season: Season) {
        let authored = SceneCatalog::seasonal_scene_id(year, season);
        if self.scenes.contains(authored.as_str()) {
            let delay = Duration::from_millis(self.config.narrative.season_scene_delay_ms);
            self.cue(authored, delay, false);
        } else {
            let scene = self
                .scenes
                .generate_seasonal(season, year, &self.state, &mut self.rng);
            let delay = Duration::from_millis(self.config.narrative.generated_scene_delay_ms);
            self.cue(scene.id, delay, false);
        }
    }

    /// Trigger the epoch due now, or offer the seasonal decision when no
    /// epoch is pending and no other kind of decision is on offer.
    fn offer_for_turn(&mut self, priority: bool) -> (Option<Epoch>, Option<DecisionId>) {
        if let Some(epoch) = self.clock.check_epoch() {
            return (Some(epoch), self.enter_epoch(epoch, priority));
        }
        if self.clock.current_epoch().is_some() {
            return (None, None);
        }
        let replaceable = self
            .active_decision
            .as_ref()
            .is_none_or(|d| d.category() == DecisionCategory::Seasonal);
        if !replaceable {
            return (None, None);
        }
        let offered = self
            .catalog
            .seasonal_decision(self.clock.season())
            .map(|d| d.id.clone())
            .and_then(|id| self.start_decision(id.as_str()).ok())
            .map(|d| d.id);
        (None, offered)
    }

    /// Publish an epoch, queue its scene and offer its decision.
    fn enter_epoch(&mut self, epoch: Epoch, priority: bool) -> Option<DecisionId> {
        let time = self.clock.time();
        info!(epoch = epoch.number(), name = epoch.name(), "Epoch triggered");
        self.bus.emit(GameEvent::EpochTriggered(EpochTriggered {
            epoch,
            year: time.year,
            season: time.season,
        }));
        let delay = Duration::from_millis(self.config.narrative.epoch_scene_delay_ms);
        self.cue(SceneCatalog::epoch_scene_id(epoch), delay, priority);

        let id = self.catalog.epoch_decision(epoch).map(|d| d.id.clone())?;
        match self.start_decision(id.as_str()) {
            Ok(decision) => Some(decision.id),
            Err(e) => {
                warn!(epoch = epoch.number(), error = %e, "Epoch decision not offered");
                None
            }
        }
    }

    /// Bookkeeping after the resolver has applied a choice.
    fn complete_decision(
        &mut self,
        decision: &DecisionRecord,
        option: &DecisionOption,
        resolution: Resolution,
    ) -> ChoiceOutcome {
        let time = self.clock.time();
        self.history.record_decision(DecisionHistoryEntry {
            decision_id: decision.id.clone(),
            option_id: option.id.clone(),
            category: decision.category(),
            season: time.season,
            year: time.year,
            turn: time.turn,
            recorded_at: Utc::now(),
        });

        let epoch_completed = decision.epoch();
        match &decision.kind {
            DecisionKind::Epoch { epoch, .. } => self.clock.complete_epoch(*epoch),
            DecisionKind::Seasonal { .. } => self.seasonal_resolved_turn = Some(time.turn),
            DecisionKind::Special { .. } => {
                self.specials_resolved.insert(decision.id.clone());
            }
        }

        info!(
            decision = %decision.id,
            option = %option.id,
            changes = resolution.metric_changes.len(),
            "Decision resolved"
        );
        self.bus.emit(GameEvent::DecisionCompleted(DecisionCompleted {
            decision_id: decision.id.clone(),
            option_id: option.id.clone(),
            changes: resolution.metric_changes.clone(),
            flags: resolution.flags.clone(),
        }));

        let line = option
            .narrative
            .clone()
            .unwrap_or_else(|| format!("{}: {}", decision.title, option.title));
        self.add_to_log(line);
        self.react(&resolution.metric_changes);

        ChoiceOutcome {
            decision_id: decision.id.clone(),
            option_id: option.id.clone(),
            resolution,
            epoch_completed,
        }
    }

    /// Journal reactions to large metric swings.
    fn react(&mut self, changes: &[MetricChanged]) {
        let threshold = self.config.journal.reaction_threshold;
        let lines: Vec<&'static str> = changes
            .iter()
            .filter_map(|c| characters::reaction_line(c.metric, c.delta, threshold, &mut self.rng))
            .collect();
        for line in lines {
            self.add_to_log(line);
        }
    }

    /// Resolve the ending, publish it and stage its scene.
    fn finish(&mut self) -> Ending {
        let definition = self.endings.resolve(&self.state).clone();
        self.bus.emit(GameEvent::EndgameTriggered(EndgameTriggered {
            ending: definition.id,
            metrics: self.state.metrics(),
            flags: self.state.flags(),
            time: self.clock.time(),
        }));

        if self.start_scene(definition.scene.as_str(), true).is_none() {
            warn!(scene = %definition.scene, "Ending scene missing, using fallback");
            self.start_scene(FALLBACK_ENDING_SCENE, true);
        }

        self.active_decision = None;
        self.ending = Some(definition.id);
        self.clock.mark_ended();
        self.add_to_log(format!("The story ends: {}", definition.title));
        info!(ending = definition.id.as_str(), "Game over");
        definition.id
    }

    /// Whether a decision may not be offered again.
    fn is_exhausted(&self, decision: &DecisionRecord) -> bool {
        match &decision.kind {
            DecisionKind::Epoch { epoch, .. } => self.clock.is_epoch_completed(*epoch),
            DecisionKind::Seasonal { season } => {
                *season != self.clock.season()
                    || self.seasonal_resolved_turn == Some(self.clock.turn())
            }
            DecisionKind::Special { .. } => self.specials_resolved.contains(&decision.id),
        }
    }
}

fn fresh_clock(config: &GameConfig, catalog: &DecisionCatalog) -> GameClock {
    GameClock::new(
        config.game.start_year,
        catalog.epoch_triggers(),
        config.game.final_year,
        config.game.final_season,
    )
}

fn delayed_effect_line(effect: &DelayedEffect) -> String {
    if effect.success {
        format!("{} completed successfully.", effect.kind)
    } else {
        format!("{} takes effect.", effect.kind)
    }
}

/// Clamp a configured chance into `[0, 1]`, treating NaN as zero.
fn probability(chance: f64) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

fn validate_snapshot(snapshot: &GameSnapshot) -> Result<(), SessionError> {
    let invalid = |reason: String| SessionError::InvalidSnapshot { reason };
    let time = &snapshot.time;
    if time.year == 0 {
        return Err(invalid("year must be at least 1".to_owned()));
    }
    if let Some(epoch) = time.current_epoch.filter(|e| !e.is_valid()) {
        return Err(invalid(format!("current epoch {epoch} out of range")));
    }
    if let Some(epoch) = time.epochs_completed.iter().find(|e| !e.is_valid()) {
        return Err(invalid(format!("completed epoch {epoch} out of range")));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use revolution_types::Flag;

    use super::*;

    #[derive(Clone, Default)]
    struct Kinds(Arc<Mutex<Vec<&'static str>>>);

    impl Kinds {
        fn take(&self) -> Vec<&'static str> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl GameObserver for Kinds {
        fn on_event(&mut self, event: &GameEvent) {
            self.0.lock().unwrap().push(event.kind());
        }
    }

    fn quiet_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.events.random_event_chance = 0.0;
        config.events.memory_scene_chance = 0.0;
        config
    }

    fn session() -> GameSession {
        GameSession::with_builtin_content(quiet_config()).unwrap()
    }

    #[test]
    fn begin_offers_the_windmill_debate() {
        let mut session = session();
        let offered = session.begin();
        assert_eq!(offered.unwrap().as_str(), "windmill_debate");

        let cues: Vec<String> = session
            .drain_scene_cues()
            .into_iter()
            .map(|c| c.scene_id.to_string())
            .collect();
        assert_eq!(cues, ["opening", "epoch1_windmill"]);
        assert!(session.drain_scene_cues().is_empty());
    }

    #[test]
    fn choice_needs_an_active_decision() {
        let mut session = session();
        assert!(matches!(
            session.make_choice("speed"),
            Err(SessionError::NoActiveDecision)
        ));
    }

    #[test]
    fn unknown_option_keeps_decision_offered() {
        let mut session = session();
        session.begin();
        assert!(matches!(
            session.make_choice("teleport"),
            Err(SessionError::UnknownOption { .. })
        ));
        assert_eq!(
            session.active_decision().unwrap().id.as_str(),
            "windmill_debate"
        );
    }

    #[test]
    fn failed_requirement_leaves_state_identical() {
        let mut session = session();
        session.debug_trigger_epoch(4).unwrap();
        let before = session.snapshot();

        let result = session.make_choice("save_loyalty");
        assert!(matches!(
            result,
            Err(SessionError::Resolve {
                source: ResolveError::RequirementNotMet { .. }
            })
        ));
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.active_decision().unwrap().id.as_str(), "boxer_fate");
    }

    #[test]
    fn completed_epoch_is_never_offered_again() {
        let mut session = session();
        session.begin();
        let outcome = session.make_choice("speed").unwrap();
        assert_eq!(outcome.epoch_completed.map(Epoch::number), Some(1));
        assert!(session.active_decision().is_none());
        assert!(session.state().flag_set(Flag::WindmillBuilt));

        let time = session.time();
        assert!(time.current_epoch.is_none());
        assert!(
            !session
                .decisions_available()
                .iter()
                .any(|d| d.id.as_str() == "windmill_debate")
        );
        assert!(matches!(
            session.start_decision("windmill_debate"),
            Err(SessionError::DecisionUnavailable { .. })
        ));
        assert!(matches!(
            session.debug_trigger_epoch(1),
            Err(SessionError::DecisionUnavailable { .. })
        ));
    }

    #[test]
    fn delayed_effect_fires_once_after_two_turns() {
        let mut session = session();
        session.begin();
        session.make_choice("speed").unwrap();
        assert_eq!(session.pending_effects().len(), 1);

        assert!(session.tick().unwrap().fired.is_empty());
        let second = session.tick().unwrap();
        assert_eq!(second.turn, 2);
        assert_eq!(second.fired.len(), 1);
        assert!(session.pending_effects().is_empty());
        assert!(session.tick().unwrap().fired.is_empty());
    }

    #[test]
    fn seasonal_decision_resolves_once_per_visit() {
        let mut session = session();
        session.begin();
        session.make_choice("safety").unwrap();

        let summary = session.tick().unwrap();
        assert_eq!(summary.season, Season::Summer);
        assert_eq!(summary.offered.unwrap().as_str(), "summer_labor");
        session.make_choice("shifts").unwrap();

        assert!(
            !session
                .decisions_available()
                .iter()
                .any(|d| d.id.as_str() == "summer_labor")
        );
        assert!(matches!(
            session.start_decision("summer_labor"),
            Err(SessionError::DecisionUnavailable { .. })
        ));
        let stats = session.decision_stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_category.get(&DecisionCategory::Seasonal), Some(&1));
    }

    #[test]
    fn seasonal_decision_of_another_season_cannot_start() {
        let mut session = session();
        session.begin();
        assert!(matches!(
            session.start_decision("autumn_harvest"),
            Err(SessionError::DecisionUnavailable { .. })
        ));
        assert_eq!(
            session.active_decision().map(|d| d.id.to_string()).as_deref(),
            Some("windmill_debate")
        );
        session.make_choice("safety").unwrap();

        let summary = session.tick().unwrap();
        assert_eq!(summary.offered.unwrap().as_str(), "summer_labor");
        assert!(matches!(
            session.start_decision("spring_planting"),
            Err(SessionError::DecisionUnavailable { .. })
        ));
        assert!(
            session
                .decisions_available()
                .iter()
                .any(|d| d.id.as_str() == "summer_labor")
        );
        session.start_decision("summer_labor").unwrap();
    }

    #[test]
    fn season_without_authored_scene_is_generated() {
        let mut session = session();
        session.begin();
        session.drain_scene_cues();
        session.tick().unwrap();

        let cue = session.drain_scene_cues().into_iter().next().unwrap();
        assert_eq!(cue.scene_id.as_str(), "gen_1_Summer");
        assert!(session.start_scene("gen_1_Summer", false).unwrap().generated);
    }

    #[test]
    fn scene_requirements_gate_unforced_starts() {
        let mut session = session();
        assert!(session.start_scene("massacre_memory", false).is_none());
        assert!(session.current_scene().is_none());
        assert!(session.scene_history(None).is_empty());

        let scene = session.start_scene("massacre_memory", true).unwrap();
        assert_eq!(session.current_scene(), Some(scene));
        assert_eq!(session.scene_history(None).len(), 1);
        assert!(session.start_scene("no_such_scene", true).is_none());
        assert!(session.clear_scene().is_some());
    }

    #[test]
    fn farmhouse_is_restricted_at_start() {
        let mut session = session();
        let outcome = session.change_location(Location::Farmhouse);
        assert!(!outcome.moved);
        assert_eq!(session.location(), Location::Barn);
        let last = session.recent_log(1).pop().unwrap();
        assert_eq!(last.text, "Access to The Farmhouse is restricted.");

        let outcome = session.change_location(Location::Fields);
        assert!(outcome.moved);
        assert_eq!(session.location(), Location::Fields);
        assert!(session.visited_locations().contains(&Location::Fields));
        assert_eq!(session.location_history().len(), 1);
    }

    #[test]
    fn game_ends_at_final_boundary() {
        let mut session = session();
        let kinds = Kinds::default();
        session.subscribe(Box::new(kinds.clone()));
        session.begin();

        let mut ending = None;
        let mut ticks = 0;
        while ending.is_none() {
            ending = session.tick().unwrap().ending;
            ticks += 1;
        }
        assert_eq!(ticks, 23);
        assert!(session.is_over());
        assert_eq!(session.ending(), ending);
        let scene = session.current_scene().unwrap();
        assert!(scene.id.as_str().starts_with("ending_"));
        assert!(kinds.take().contains(&"endgame_triggered"));
        assert!(matches!(
            session.tick(),
            Err(SessionError::Clock {
                source: ClockError::GameOver
            })
        ));
    }

    #[test]
    fn restore_replaces_everything() {
        let mut session = session();
        session.begin();
        session.make_choice("compromise").unwrap();
        session.tick().unwrap();
        let saved = session.snapshot();

        session.tick().unwrap();
        session.change_location(Location::Windmill);
        assert_ne!(session.snapshot(), saved);

        let kinds = Kinds::default();
        session.subscribe(Box::new(kinds.clone()));
        session.restore(&saved).unwrap();
        assert_eq!(session.snapshot(), saved);
        assert!(session.active_decision().is_none());
        assert_eq!(kinds.take(), ["state_restored"]);
    }

    #[test]
    fn invalid_snapshot_is_rejected_untouched() {
        let mut session = session();
        let before = session.snapshot();
        let mut bad = before.clone();
        bad.time.year = 0;
        bad.metrics.insert(Metric::Loyalty, 3);
        assert!(matches!(
            session.restore(&bad),
            Err(SessionError::InvalidSnapshot { .. })
        ));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut session = session();
        let initial = session.snapshot();
        session.begin();
        session.make_choice("speed").unwrap();
        session.tick().unwrap();
        session.reset();
        assert_eq!(session.snapshot(), initial);
        assert!(session.active_decision().is_none());
        assert!(session.drain_scene_cues().is_empty());
    }

    #[test]
    fn debug_metric_rejects_unknown_names() {
        let mut session = session();
        assert!(matches!(
            session.debug_adjust_metric("happiness", 5),
            Err(SessionError::Resolve {
                source: ResolveError::UnknownMetric { .. }
            })
        ));
        let changes = session.debug_adjust_metric("loyalty", 500).unwrap();
        assert_eq!(changes.first().unwrap().new_value, 100);
    }

    #[test]
    fn talking_is_remembered() {
        let mut session = session();
        session.talk(Character::Boxer, Some(Topic::Windmill));
        session.talk(Character::Napoleon, None);
        session.talk(Character::Boxer, None);
        assert_eq!(session.dialogue_history(Some(Character::Boxer), 10).len(), 2);
        assert_eq!(session.dialogue_history(None, 1).len(), 1);
        assert_eq!(
            session.dialogue_history(None, 1).first().unwrap().character,
            Character::Boxer
        );
    }
}
