//! Player command parsing.
//!
//! One line of input becomes one [`Command`]. Parsing never touches the
//! game; names of locations, characters and topics are checked here so the
//! command loop only ever sees valid values.

use revolution_core::characters::Topic;
use revolution_types::{Character, Location, UnknownKey};

/// Lines shown by `help`.
pub const HELP: &[&str] = &[
    "status                  metrics, date and location",
    "decisions               the decision on offer and the ones you can start",
    "start <decision>        start a decision by id",
    "choose <option>         choose an option of the decision on offer",
    "next                    advance one season",
    "go <location>           barn, windmill, commandments, fields, farmhouse",
    "talk <character> [topic]",
    "scenes                  recently presented scenes",
    "log [n]                 the last n journal lines (default 10)",
    "save <slot> | load <slot> | slots",
    "reset                   start over",
    "quit",
];

/// Journal lines shown by a bare `log`.
const DEFAULT_LOG_LINES: usize = 10;

/// A parsed player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show metrics, date and location.
    Status,
    /// List the active and startable decisions.
    Decisions,
    /// Start a decision by id.
    Start(String),
    /// Choose an option of the active decision.
    Choose(String),
    /// Advance one season.
    Next,
    /// Move to a location.
    Go(Location),
    /// Speak with a character.
    Talk(Character, Option<Topic>),
    /// Show recent scenes.
    Scenes,
    /// Show the last n journal lines.
    Log(usize),
    /// Save to a slot.
    Save(u8),
    /// Load from a slot.
    Load(u8),
    /// Summarize the save slots.
    Slots,
    /// Start over.
    Reset,
    /// Show the command list.
    Help,
    /// Leave the game.
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The line was blank.
    #[error("empty command")]
    Empty,

    /// The first word is not a command.
    #[error("unknown command '{verb}', type 'help'")]
    Unknown {
        /// The word that was typed.
        verb: String,
    },

    /// A required argument is missing.
    #[error("'{verb}' needs a {what}")]
    MissingArgument {
        /// The command.
        verb: &'static str,
        /// What was expected.
        what: &'static str,
    },

    /// A name did not match any location, character or topic.
    #[error("{source}")]
    UnknownName {
        /// The failed lookup.
        #[from]
        source: UnknownKey,
    },

    /// A number argument did not parse.
    #[error("'{value}' is not a number")]
    NotANumber {
        /// The offending text.
        value: String,
    },
}

impl Command {
    /// Parse one line of input.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandError::Empty);
        };
        let arg = words.next();

        let command = match verb.to_ascii_lowercase().as_str() {
            "status" | "s" => Self::Status,
            "decisions" | "d" => Self::Decisions,
            "start" => Self::Start(required(arg, "start", "decision id")?.to_owned()),
            "choose" | "c" => Self::Choose(required(arg, "choose", "option id")?.to_owned()),
            "next" | "n" => Self::Next,
            "go" => Self::Go(required(arg, "go", "location")?.parse()?),
            "talk" => {
                let character: Character = required(arg, "talk", "character")?.parse()?;
                let topic: Option<Topic> = words.next().map(str::parse).transpose()?;
                Self::Talk(character, topic)
            }
            "scenes" => Self::Scenes,
            "log" => Self::Log(arg.map_or(Ok(DEFAULT_LOG_LINES), number)?),
            "save" => Self::Save(number(required(arg, "save", "slot")?)?),
            "load" => Self::Load(number(required(arg, "load", "slot")?)?),
            "slots" => Self::Slots,
            "reset" => Self::Reset,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => {
                return Err(CommandError::Unknown {
                    verb: verb.to_owned(),
                });
            }
        };
        Ok(command)
    }
}

fn required<'a>(
    arg: Option<&'a str>,
    verb: &'static str,
    what: &'static str,
) -> Result<&'a str, CommandError> {
    arg.ok_or(CommandError::MissingArgument { verb, what })
}

fn number<T: core::str::FromStr>(value: &str) -> Result<T, CommandError> {
    value.parse().map_err(|_e| CommandError::NotANumber {
        value: value.to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(Command::parse("  status ").unwrap(), Command::Status);
        assert_eq!(
            Command::parse("choose speed").unwrap(),
            Command::Choose("speed".to_owned())
        );
        assert_eq!(
            Command::parse("GO Windmill").unwrap(),
            Command::Go(Location::Windmill)
        );
        assert_eq!(
            Command::parse("talk boxer rations").unwrap(),
            Command::Talk(Character::Boxer, Some(Topic::Rations))
        );
        assert_eq!(
            Command::parse("talk squealer").unwrap(),
            Command::Talk(Character::Squealer, None)
        );
        assert_eq!(Command::parse("log").unwrap(), Command::Log(10));
        assert_eq!(Command::parse("log 3").unwrap(), Command::Log(3));
        assert_eq!(Command::parse("save 2").unwrap(), Command::Save(2));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert!(matches!(
            Command::parse("dance"),
            Err(CommandError::Unknown { .. })
        ));
        assert_eq!(
            Command::parse("go"),
            Err(CommandError::MissingArgument {
                verb: "go",
                what: "location"
            })
        );
        assert!(matches!(
            Command::parse("go pigsty"),
            Err(CommandError::UnknownName { .. })
        ));
        assert!(matches!(
            Command::parse("talk boxer weather"),
            Err(CommandError::UnknownName { .. })
        ));
        assert!(matches!(
            Command::parse("load nine"),
            Err(CommandError::NotANumber { .. })
        ));
        assert!(matches!(
            Command::parse("save 300"),
            Err(CommandError::NotANumber { .. })
        ));
    }
}
