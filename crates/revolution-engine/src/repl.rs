//! Interactive command loop.
//!
//! Each input line is parsed into a [`Command`] and executed against the
//! shared [`Game`]. Narrative output arrives through the console observer;
//! [`execute`] only returns the direct answer to the command. Command
//! failures are reported to the player and never end the loop.

use std::sync::Arc;

use revolution_core::Game;
use revolution_db::{SaveSlot, SlotStatus};
use revolution_types::Metric;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::commands::{Command, CommandError, HELP};

/// Scenes shown by `scenes`.
const SCENE_HISTORY_LINES: usize = 5;

/// What the loop does after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Print these lines and read the next command.
    Continue(Vec<String>),
    /// Leave the loop.
    Quit,
}

/// Read commands until `quit` or end of input.
///
/// Scenes queued by a command are presented before the next prompt.
pub async fn run<R>(game: &Arc<Game>, input: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    game.drain_narrative().await;
    println!("Type 'help' for commands.");

    while let Some(line) = lines.next_line().await? {
        let flow = match Command::parse(&line) {
            Ok(command) => {
                debug!(?command, "Command");
                execute(game, command)
            }
            Err(CommandError::Empty) => continue,
            Err(e) => Flow::Continue(vec![e.to_string()]),
        };
        match flow {
            Flow::Continue(output) => {
                for text in output {
                    println!("{text}");
                }
            }
            Flow::Quit => break,
        }
        game.drain_narrative().await;
    }

    info!("Command loop finished");
    Ok(())
}

/// Run one command.
pub fn execute(game: &Arc<Game>, command: Command) -> Flow {
    let output = match command {
        Command::Status => status(game),
        Command::Decisions => decisions(game),
        Command::Start(id) => match game.start_decision(&id) {
            Ok(()) => Vec::new(),
            Err(e) => vec![e.to_string()],
        },
        Command::Choose(option) => match game.make_choice(&option) {
            Ok(outcome) => vec![format!("You chose '{}'.", outcome.option_id)],
            Err(e) => vec![e.to_string()],
        },
        Command::Next => match game.next_season() {
            Ok(summary) if summary.ending.is_some() => {
                vec!["The story is over. Type 'reset' to play again.".to_owned()]
            }
            Ok(_) => Vec::new(),
            Err(e) => vec![e.to_string()],
        },
        Command::Go(location) => {
            let outcome = game.change_location(location);
            let mut out = Vec::new();
            if let Some(dialogue) = outcome.encounter {
                out.push(format!("{} is here.", dialogue.character));
                out.extend(dialogue.lines);
            }
            out
        }
        Command::Talk(character, topic) => {
            let dialogue = game.with_session(|s| s.talk(character, topic));
            let mut out = vec![format!("{} ({}):", dialogue.character, dialogue.emotion)];
            out.extend(dialogue.lines.into_iter().map(|l| format!("  \"{l}\"")));
            out
        }
        Command::Scenes => game.with_session(|s| {
            s.scene_history(Some(SCENE_HISTORY_LINES))
                .into_iter()
                .map(|e| format!("  {} ({} year {})", e.scene_id, e.season, e.year))
                .collect()
        }),
        Command::Log(n) => game.with_session(|s| {
            s.recent_log(n)
                .into_iter()
                .map(|l| format!("  [{}] {}", l.turn, l.text))
                .collect()
        }),
        Command::Save(slot) => saved(slot, game.save_game(slot)),
        Command::Load(slot) => {
            if game.load_game(slot) {
                vec![format!("Loaded slot {slot}.")]
            } else {
                vec![format!("Slot {slot} could not be loaded.")]
            }
        }
        Command::Slots => slots(game),
        Command::Reset => {
            game.reset();
            game.begin();
            vec!["A new story begins.".to_owned()]
        }
        Command::Help => HELP.iter().map(|l| format!("  {l}")).collect(),
        Command::Quit => return Flow::Quit,
    };
    Flow::Continue(output)
}

fn status(game: &Arc<Game>) -> Vec<String> {
    game.with_session(|s| {
        let time = s.time();
        let mut out = vec![
            format!("Year {}, {} (turn {})", time.year, time.season, time.turn),
            format!("Location: {}", s.location()),
        ];
        if let Some(epoch) = time.current_epoch {
            out.push(format!("Epoch {epoch}: {}", epoch.name()));
        }
        for metric in Metric::ALL {
            out.push(format!("  {:<16}{:>4}", metric.as_str(), s.metric(*metric)));
        }
        if let Some(ending) = s.ending() {
            out.push(format!("Ending: {ending}"));
        }
        out
    })
}

fn decisions(game: &Arc<Game>) -> Vec<String> {
    game.with_session(|s| {
        let mut out = Vec::new();
        if let Some(active) = s.active_decision() {
            out.push(format!("On offer: {} ({})", active.title, active.id));
            for option in &active.options {
                out.push(format!("  [{}] {}", option.id, option.title));
            }
        }
        let startable = s.decisions_available();
        if !startable.is_empty() {
            out.push("You can start:".to_owned());
            for decision in startable {
                out.push(format!("  {}  {}", decision.id, decision.title));
            }
        }
        if out.is_empty() {
            out.push("No decisions right now.".to_owned());
        }
        out
    })
}

fn saved(slot: u8, ok: bool) -> Vec<String> {
    if ok {
        vec![format!("Saved to slot {slot}.")]
    } else {
        vec![format!("Slot {slot} could not be written.")]
    }
}

fn slots(game: &Arc<Game>) -> Vec<String> {
    let mut out: Vec<String> = game
        .list_slots()
        .into_iter()
        .map(|summary| match summary.status {
            SlotStatus::Empty => format!("  {}: empty", summary.slot),
            SlotStatus::Corrupted => format!("  {}: corrupted", summary.slot),
            SlotStatus::Saved {
                timestamp,
                year,
                season,
                ..
            } => format!(
                "  {}: year {year}, {season} (saved {})",
                summary.slot,
                timestamp.format("%Y-%m-%d %H:%M")
            ),
        })
        .collect();
    if game.with_session(|s| s.config().persistence.autosave) {
        out.push(format!("  autosave is slot {}", SaveSlot::AUTOSAVE));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use revolution_core::GameConfig;
    use revolution_db::MemoryStore;

    use super::*;

    fn game() -> Arc<Game> {
        let mut config = GameConfig::default();
        config.events.random_event_chance = 0.0;
        config.events.memory_scene_chance = 0.0;
        config.persistence.autosave = false;
        Game::from_config(config, Box::new(MemoryStore::new())).unwrap()
    }

    fn lines(flow: Flow) -> Vec<String> {
        match flow {
            Flow::Continue(lines) => lines,
            Flow::Quit => Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn commands_drive_the_game() {
        let game = game();
        game.begin();

        let offer = lines(execute(&game, Command::Decisions));
        assert!(offer.iter().any(|l| l.contains("windmill_debate")));

        let chose = lines(execute(&game, Command::Choose("speed".to_owned())));
        assert_eq!(chose, ["You chose 'speed'."]);

        assert!(lines(execute(&game, Command::Next)).is_empty());
        let status = lines(execute(&game, Command::Status));
        assert!(status.first().unwrap().contains("turn 1"));

        let rejected = lines(execute(&game, Command::Choose("nonsense".to_owned())));
        assert_eq!(rejected.len(), 1);

        assert_eq!(execute(&game, Command::Quit), Flow::Quit);
        game.drain_narrative().await;
    }

    #[tokio::test(start_paused = true)]
    async fn save_and_load_report_outcome() {
        let game = game();
        game.begin();

        assert_eq!(lines(execute(&game, Command::Save(1))), ["Saved to slot 1."]);
        assert_eq!(lines(execute(&game, Command::Load(1))), ["Loaded slot 1."]);
        assert_eq!(
            lines(execute(&game, Command::Load(2))),
            ["Slot 2 could not be loaded."]
        );
        let slots = lines(execute(&game, Command::Slots));
        assert!(slots.iter().any(|l| l.starts_with("  1: year 1")));
    }

    #[tokio::test(start_paused = true)]
    async fn run_reads_until_quit() {
        let game = game();
        game.begin();
        let script: &[u8] = b"choose safety\n\nnext\nquit\nnext\n";
        run(&game, script).await.unwrap();
        assert_eq!(game.with_session(|s| s.time().turn), 1);
    }
}
