//! Ending resolution.
//!
//! Every non-default ending is evaluated against the state. The first match
//! in fixed priority order wins (Utopia, Cycle of Tyranny, Stagnation,
//! Martyr's Revolt, then anything else in declaration order). When nothing
//! matches the single default ending applies, so resolution is total.

use revolution_state::GameState;
use revolution_types::{Ending, EndingDefinition};
use tracing::info;

use crate::content::{self, ContentError};

/// Evaluation order for non-default endings.
const PRIORITY: [Ending; 4] = [
    Ending::Utopia,
    Ending::CycleOfTyranny,
    Ending::Stagnation,
    Ending::MartyrRevolt,
];

/// Ending definitions in evaluation order, plus the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndingResolver {
    ordered: Vec<EndingDefinition>,
    default: EndingDefinition,
}

impl EndingResolver {
    /// The resolver built from the embedded content table.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the table fails to parse or validate.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_definitions(content::builtin_endings()?)
    }

    /// Build a resolver. Exactly one definition must be the default and no
    /// ending may be defined twice.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Invalid`] otherwise.
    pub fn from_definitions(definitions: Vec<EndingDefinition>) -> Result<Self, ContentError> {
        let invalid = |reason: String| ContentError::Invalid {
            table: "endings",
            reason,
        };

        for (i, definition) in definitions.iter().enumerate() {
            if definitions
                .iter()
                .skip(i.saturating_add(1))
                .any(|other| other.id == definition.id)
            {
                return Err(invalid(format!("ending {} defined twice", definition.id)));
            }
        }

        let (mut defaults, mut rest): (Vec<_>, Vec<_>) =
            definitions.into_iter().partition(|d| d.is_default);
        let default = match (defaults.pop(), defaults.is_empty()) {
            (Some(default), true) => default,
            (None, _) => return Err(invalid("no default ending".to_owned())),
            (Some(_), false) => return Err(invalid("more than one default ending".to_owned())),
        };

        // Stable sort keeps declaration order among unprioritized endings.
        rest.sort_by_key(|d| {
            PRIORITY
                .iter()
                .position(|p| *p == d.id)
                .unwrap_or(PRIORITY.len())
        });

        Ok(Self {
            ordered: rest,
            default,
        })
    }

    /// The ending the state qualifies for.
    pub fn resolve(&self, state: &GameState) -> &EndingDefinition {
        let ending = self
            .ordered
            .iter()
            .find(|d| state.satisfies(&d.requirements))
            .unwrap_or(&self.default);
        info!(ending = ending.id.as_str(), "Ending resolved");
        ending
    }

    /// Look up a definition by ending.
    pub fn definition(&self, ending: Ending) -> Option<&EndingDefinition> {
        self.ordered
            .iter()
            .chain(std::iter::once(&self.default))
            .find(|d| d.id == ending)
    }

    /// The default ending.
    pub const fn default_ending(&self) -> &EndingDefinition {
        &self.default
    }
}
