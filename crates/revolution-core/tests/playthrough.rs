//! Whole-game tests for the `revolution-core` orchestration.
//!
//! Sessions are driven synchronously through their entry points; the
//! file-backed save test writes under a unique directory in the system
//! temp dir and removes it afterwards.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use revolution_core::{Game, GameConfig, GameSession, SessionError};
use revolution_db::FileStore;
use revolution_events::{ChannelObserver, GameEvent};
use revolution_types::{DecisionCategory, Ending, Location, Metric};
use tokio::sync::mpsc::UnboundedReceiver;

struct TempDir(PathBuf);

impl TempDir {
    fn new() -> Self {
        let path =
            std::env::temp_dir().join(format!("revolution-core-{}", uuid::Uuid::new_v4()));
        Self(path)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn config(seed: u64) -> GameConfig {
    let mut config = GameConfig::default();
    config.game.seed = seed;
    config.persistence.autosave = false;
    config
}

fn drain(rx: &mut UnboundedReceiver<GameEvent>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn assert_bounded(session: &GameSession) {
    for metric in Metric::ALL {
        let value = session.metric(*metric);
        assert!(
            (Metric::MIN..=Metric::MAX).contains(&value),
            "{metric} out of bounds: {value}"
        );
    }
}

/// Choose a random option; fall back to the first available one when the
/// random pick is rejected.
fn choose(session: &mut GameSession, rng: &mut StdRng) {
    let Some(decision) = session.active_decision() else {
        return;
    };
    let pick = &decision.options[rng.random_range(0..decision.options.len())];
    if let Err(e) = session.make_choice(pick.id.as_str()) {
        assert!(matches!(e, SessionError::Resolve { .. }), "unexpected: {e}");
        assert_eq!(session.active_decision(), Some(decision.clone()));
        for option in &decision.options {
            if session.make_choice(option.id.as_str()).is_ok() {
                break;
            }
        }
    }
}

#[test]
fn random_playthroughs_stay_bounded_and_end() {
    for seed in 0..20 {
        let mut cfg = config(seed);
        cfg.events.random_event_chance = 1.0;
        let mut session = GameSession::with_builtin_content(cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(seed.wrapping_mul(31));
        session.begin();

        while !session.is_over() {
            choose(&mut session, &mut rng);
            assert_bounded(&session);

            let location = Location::ALL[rng.random_range(0..Location::ALL.len())];
            session.change_location(location);
            assert_bounded(&session);

            if rng.random_bool(0.3) {
                let specials: Vec<String> = session
                    .decisions_available()
                    .into_iter()
                    .filter(|d| d.category() == DecisionCategory::Special)
                    .map(|d| d.id.to_string())
                    .collect();
                if let Some(id) = specials.first() {
                    session.start_decision(id).unwrap();
                    choose(&mut session, &mut rng);
                }
            }

            session.tick().unwrap();
            assert_bounded(&session);
        }

        let ending = session.ending().unwrap();
        assert!(Ending::ALL.contains(&ending));
        assert!(session.current_scene().is_some());
    }
}

#[test]
fn notifications_arrive_before_the_call_returns() {
    let mut session = GameSession::with_builtin_content(config(1)).unwrap();
    let (observer, mut rx) = ChannelObserver::new();
    session.subscribe(Box::new(observer));

    session.begin();
    let kinds: Vec<&str> = drain(&mut rx).iter().map(GameEvent::kind).collect();
    assert_eq!(kinds, ["epoch_triggered", "decision_started"]);

    session.make_choice("speed").unwrap();
    let kinds: Vec<&str> = drain(&mut rx).iter().map(GameEvent::kind).collect();
    let completed = kinds.iter().position(|k| *k == "decision_completed").unwrap();
    assert!(kinds[..completed].contains(&"metric_changed"));
    assert!(kinds[..completed].contains(&"relationship_changed"));
    assert!(kinds[completed..].contains(&"journal_entry"));

    session.tick().unwrap();
    let events = drain(&mut rx);
    assert!(matches!(events.first(), Some(GameEvent::SeasonChanged(_))));
}

#[test]
fn epoch_decisions_are_offered_exactly_once() {
    let mut session = GameSession::with_builtin_content(config(7)).unwrap();
    let (observer, mut rx) = ChannelObserver::new();
    session.subscribe(Box::new(observer));
    let mut rng = StdRng::seed_from_u64(7);

    session.begin();
    while !session.is_over() {
        choose(&mut session, &mut rng);
        session.tick().unwrap();
    }

    let mut started: BTreeMap<String, usize> = BTreeMap::new();
    for event in drain(&mut rx) {
        if let GameEvent::DecisionStarted(started_event) = event {
            if started_event.decision.category() == DecisionCategory::Epoch {
                *started.entry(started_event.decision.id.to_string()).or_default() += 1;
            }
        }
    }
    assert_eq!(started.len(), 5);
    assert!(started.values().all(|count| *count == 1), "{started:?}");
    assert_eq!(session.time().epochs_completed.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn file_saves_survive_reset() {
    let dir = TempDir::new();
    let store = FileStore::open(dir.0.clone()).unwrap();
    let game = Game::from_config(config(3), Box::new(store)).unwrap();

    game.begin();
    game.make_choice("compromise").unwrap();
    game.next_season().unwrap();
    game.change_location(Location::Windmill);
    game.drain_narrative().await;
    let saved = game.with_session(|s| s.snapshot());
    assert!(game.save_game(1));

    game.reset();
    assert_ne!(game.with_session(|s| s.snapshot()), saved);

    assert!(game.load_game(1));
    assert_eq!(game.with_session(|s| s.snapshot()), saved);
    assert!(!game.load_game(4));
}
