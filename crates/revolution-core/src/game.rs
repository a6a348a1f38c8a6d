//! Shared game handle.
//!
//! [`Game`] owns a [`GameSession`] behind a mutex together with the
//! [`NarrativeScheduler`] and the [`SaveManager`]. Every entry point locks
//! the session, runs to completion, takes the scene cues the session
//! recorded and hands them to the scheduler. When the scheduler is idle a
//! drain loop is spawned on the current tokio runtime.
//!
//! # Architecture
//!
//! The session lock is never held across an await point, and the session
//! and save locks are never held together. The drain loop presents scenes
//! through [`ScenePresenter`], which takes the session lock only for the
//! duration of one `start_scene` call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use revolution_db::{DbError, SaveManager, SaveSlot, SaveStore, SlotSummary};
use revolution_types::{DecisionId, Location, NoticeLevel, SceneId, SceneRecord};
use tracing::{debug, error, info, warn};

use crate::config::GameConfig;
use crate::scheduler::{NarrativeScheduler, SceneRequest, ScenePresenter};
use crate::session::{ChoiceOutcome, GameSession, LocationOutcome, SceneCue, SessionError, TickSummary};

/// Poll interval while waiting for a spawned drain loop to finish.
const DRAIN_POLL: Duration = Duration::from_millis(10);

/// A running game shared between the front end and the narrative loop.
#[derive(Debug)]
pub struct Game {
    session: Mutex<GameSession>,
    scheduler: NarrativeScheduler,
    saves: Mutex<SaveManager>,
    autosave: bool,
}

impl Game {
    /// Wrap a session and a save manager.
    pub fn new(session: GameSession, saves: SaveManager) -> Arc<Self> {
        let config = session.config();
        let gap = Duration::from_millis(config.narrative.inter_scene_gap_ms);
        let autosave = config.persistence.autosave;
        Arc::new(Self {
            session: Mutex::new(session),
            scheduler: NarrativeScheduler::new(gap),
            saves: Mutex::new(saves),
            autosave,
        })
    }

    /// A game over the embedded content, saving to `store`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Content`] if a content table fails to load.
    pub fn from_config(
        config: GameConfig,
        store: Box<dyn SaveStore>,
    ) -> Result<Arc<Self>, SessionError> {
        let saves = SaveManager::new(store, config.persistence.key_prefix.clone());
        let session = GameSession::with_builtin_content(config)?;
        Ok(Self::new(session, saves))
    }

    /// Run a closure against the session, then schedule any scenes it cued.
    pub fn with_session<T>(self: &Arc<Self>, f: impl FnOnce(&mut GameSession) -> T) -> T {
        let (out, cues) = {
            let mut session = self.lock_session();
            let out = f(&mut session);
            (out, session.drain_scene_cues())
        };
        self.schedule(cues);
        out
    }

    /// Start the game: opening scene and first decision.
    pub fn begin(self: &Arc<Self>) -> Option<DecisionId> {
        self.with_session(GameSession::begin)
    }

    /// Offer a decision by id.
    ///
    /// # Errors
    ///
    /// See [`GameSession::start_decision`].
    pub fn start_decision(self: &Arc<Self>, id: &str) -> Result<(), SessionError> {
        self.with_session(|s| s.start_decision(id).map(|_| ()))
    }

    /// Choose an option of the decision on offer.
    ///
    /// # Errors
    ///
    /// See [`GameSession::make_choice`].
    pub fn make_choice(self: &Arc<Self>, option_id: &str) -> Result<ChoiceOutcome, SessionError> {
        self.with_session(|s| s.make_choice(option_id))
    }

    /// Advance one season, autosaving afterwards when configured.
    ///
    /// # Errors
    ///
    /// See [`GameSession::tick`].
    pub fn next_season(self: &Arc<Self>) -> Result<TickSummary, SessionError> {
        let summary = self.with_session(GameSession::tick)?;
        if self.autosave {
            self.save_game(SaveSlot::AUTOSAVE.number());
        }
        Ok(summary)
    }

    /// Move the player.
    pub fn change_location(self: &Arc<Self>, location: Location) -> LocationOutcome {
        self.with_session(|s| s.change_location(location))
    }

    /// Return to the initial state and drop every queued scene.
    ///
    /// The queue is cleared under the session lock, so a scene the drain
    /// loop is about to present sees the cleared queue and is dropped.
    pub fn reset(self: &Arc<Self>) {
        self.with_session(|session| {
            let dropped = self.scheduler.clear();
            debug!(dropped, "Narrative queue cleared for reset");
            session.reset();
        });
    }

    /// Write the current state to a slot. Returns `false` on failure.
    pub fn save_game(&self, slot: u8) -> bool {
        let snapshot = self.lock_session().snapshot();
        let result = SaveSlot::new(slot).and_then(|slot| self.lock_saves().save(slot, &snapshot));
        match result {
            Ok(record) => {
                debug!(slot, at = %record.timestamp, "Save written");
                true
            }
            Err(e) => {
                warn!(slot, error = %e, "Save failed");
                self.lock_session()
                    .notify(NoticeLevel::Warning, format!("Could not save to slot {slot}"));
                false
            }
        }
    }

    /// Restore the state saved in a slot.
    ///
    /// Returns `false`, leaving the state untouched, when the slot is
    /// invalid, empty or unreadable. On success the scene queue is cleared.
    pub fn load_game(&self, slot: u8) -> bool {
        let record = match SaveSlot::new(slot).and_then(|slot| self.lock_saves().load(slot)) {
            Ok(record) => record,
            Err(e) => {
                match e {
                    DbError::KeyNotFound(_) => info!(slot, "Nothing saved in slot"),
                    _ => warn!(slot, error = %e, "Load failed"),
                }
                return false;
            }
        };

        let mut session = self.lock_session();
        match session.restore(&record.state) {
            Ok(()) => {
                let dropped = self.scheduler.clear();
                info!(slot, dropped, saved_at = %record.timestamp, "Game loaded");
                true
            }
            Err(e) => {
                warn!(slot, error = %e, "Saved state rejected");
                session.notify(NoticeLevel::Warning, format!("Slot {slot} holds an unusable save"));
                false
            }
        }
    }

    /// Best-effort save to the emergency slot after an unrecoverable
    /// error, surfaced to the player as a notice.
    pub fn emergency_save(&self, reason: &str) -> bool {
        error!(reason, "Unrecoverable error, writing emergency save");
        let saved = self.save_game(SaveSlot::EMERGENCY.number());
        let message = if saved {
            format!("Something went wrong ({reason}). Your game was saved to slot 9.")
        } else {
            format!("Something went wrong ({reason}). The emergency save failed.")
        };
        self.lock_session().notify(NoticeLevel::Error, message);
        saved
    }

    /// Summaries of the manual save slots.
    pub fn list_slots(&self) -> Vec<SlotSummary> {
        self.lock_saves().list_slots()
    }

    /// Present every queued scene, waiting for a spawned loop if one is
    /// already draining.
    pub async fn drain_narrative(&self) {
        self.scheduler.run_loop(self).await;
        while self.scheduler.is_running() {
            tokio::time::sleep(DRAIN_POLL).await;
        }
    }

    /// Ids of the scenes waiting to be presented.
    pub fn pending_scenes(&self) -> Vec<SceneId> {
        self.scheduler.pending()
    }

    fn schedule(self: &Arc<Self>, cues: Vec<SceneCue>) {
        let mut start = false;
        for cue in cues {
            start |= self.scheduler.enqueue(cue.scene_id, cue.delay, cue.priority);
        }
        if !start {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let game = Arc::clone(self);
                handle.spawn(async move {
                    game.scheduler.run_loop(&*game).await;
                });
            }
            Err(_) => debug!("No runtime, scenes wait for drain_narrative"),
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, GameSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_saves(&self) -> MutexGuard<'_, SaveManager> {
        self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScenePresenter for Game {
    fn present(&self, request: &SceneRequest) -> Option<SceneRecord> {
        let mut session = self.lock_session();
        if self.scheduler.is_stale(request) {
            debug!(scene = %request.scene_id, "Queue cleared before presentation, dropping scene");
            return None;
        }
        session.start_scene(request.scene_id.as_str(), false)
    }
}
