//! Observer that prints game events to the terminal.
//!
//! Rendering is a pure function of the event so it can be tested without
//! capturing stdout. Events without a player-facing rendering (location
//! bookkeeping, relationship deltas, restores) are skipped; the journal
//! line that accompanies them is printed instead.

use std::fmt::Write as _;

use revolution_events::{GameEvent, GameObserver};
use revolution_types::NoticeLevel;

/// Prints every renderable event to stdout.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl GameObserver for ConsoleObserver {
    fn on_event(&mut self, event: &GameEvent) {
        if let Some(text) = render(event) {
            println!("{text}");
        }
    }
}

/// Player-facing text for an event, if it has any.
pub fn render(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::SeasonChanged(e) => Some(format!("\n--- {} of year {} ---", e.season, e.year)),
        GameEvent::MetricChanged(e) => Some(format!(
            "    {} {} -> {} ({:+})",
            e.metric, e.old_value, e.new_value, e.delta
        )),
        GameEvent::SceneStarted(e) => Some(format!("\n== {} ==\n{}", e.scene.title, e.scene.text)),
        GameEvent::EpochTriggered(e) => Some(format!(
            "\n*** Epoch {}: {} ***",
            e.epoch,
            e.epoch.name()
        )),
        GameEvent::DecisionStarted(e) => {
            let mut out = format!("\nDECISION: {}\n{}", e.decision.title, e.decision.description);
            for option in &e.decision.options {
                let available = e
                    .options
                    .iter()
                    .find(|a| a.option_id == option.id)
                    .is_none_or(|a| a.available);
                let marker = if available { "" } else { " (unavailable)" };
                let _ = write!(out, "\n  [{}] {}{marker}", option.id, option.title);
            }
            Some(out)
        }
        GameEvent::JournalEntry(e) => Some(format!("  * {}", e.text)),
        GameEvent::EndgameTriggered(e) => Some(format!("\nTHE END: {}", e.ending)),
        GameEvent::Notice(e) => {
            let level = match e.level {
                NoticeLevel::Info => "info",
                NoticeLevel::Warning => "warning",
                NoticeLevel::Error => "error",
            };
            Some(format!("[{level}] {}", e.message))
        }
        GameEvent::DecisionCompleted(_)
        | GameEvent::RelationshipChanged(_)
        | GameEvent::LocationChanged(_)
        | GameEvent::DelayedEffectFired(_)
        | GameEvent::StateRestored(_) => None,
    }
}
