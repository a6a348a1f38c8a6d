//! Game clock and epoch tracking.
//!
//! The clock is the single source of truth for the calendar. One call to
//! [`GameClock::advance`] is one turn and one season; the year rolls over on
//! the Winter to Spring transition. Epoch triggers are looked up from a table
//! keyed by `(year, season)` and each epoch is offered until its decision
//! resolves, never again afterwards.
//!
//! # Design Principles
//!
//! - All calendar arithmetic is checked (no silent overflow).
//! - The clock refuses to advance once the game has ended.
//! - Completed epochs are never re-triggered.

use std::collections::BTreeMap;

use revolution_types::{Epoch, Season, TimeState};
use tracing::{debug, info};

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// The game has reached its ending; no further turns are played.
    #[error("the game has ended")]
    GameOver,

    /// Turn counter would overflow.
    #[error("turn counter overflow: cannot advance beyond u64::MAX")]
    TurnOverflow,

    /// Year counter would overflow.
    #[error("year counter overflow: cannot advance beyond u32::MAX")]
    YearOverflow,
}

/// Result of a single season advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonAdvance {
    /// The new turn number.
    pub turn: u64,
    /// The new season.
    pub season: Season,
    /// The new year.
    pub year: u32,
    /// Whether this advance started a new year.
    pub new_year: bool,
}

/// Calendar, epoch progress and the final boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameClock {
    time: TimeState,
    triggers: BTreeMap<(u32, Season), Epoch>,
    final_year: u32,
    final_season: Season,
    ended: bool,
}

impl GameClock {
    /// A clock at turn 0 of `start_year`, Spring.
    ///
    /// `triggers` maps each epoch to the year and season that opens it.
    pub fn new(
        start_year: u32,
        triggers: impl IntoIterator<Item = (Epoch, u32, Season)>,
        final_year: u32,
        final_season: Season,
    ) -> Self {
        Self {
            time: TimeState {
                year: start_year,
                ..TimeState::default()
            },
            triggers: triggers
                .into_iter()
                .map(|(epoch, year, season)| ((year, season), epoch))
                .collect(),
            final_year,
            final_season,
            ended: false,
        }
    }

    /// Copy of the current time state.
    pub fn time(&self) -> TimeState {
        self.time.clone()
    }

    /// Current turn.
    pub const fn turn(&self) -> u64 {
        self.time.turn
    }

    /// Current season.
    pub const fn season(&self) -> Season {
        self.time.season
    }

    /// Current year.
    pub const fn year(&self) -> u32 {
        self.time.year
    }

    /// Epoch waiting for its decision, if any.
    pub const fn current_epoch(&self) -> Option<Epoch> {
        self.time.current_epoch
    }

    /// Whether an epoch's decision has resolved.
    pub fn is_epoch_completed(&self, epoch: Epoch) -> bool {
        self.time.epochs_completed.contains(&epoch)
    }

    /// Whether the game has ended.
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Advance one season.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::GameOver`] once the game has ended, or an
    /// overflow error if a counter would wrap.
    pub fn advance(&mut self) -> Result<SeasonAdvance, ClockError> {
        if self.ended {
            return Err(ClockError::GameOver);
        }
        let turn = self
            .time
            .turn
            .checked_add(1)
            .ok_or(ClockError::TurnOverflow)?;
        let season = self.time.season.next();
        let new_year = season == Season::Spring;
        let year = if new_year {
            self.time
                .year
                .checked_add(1)
                .ok_or(ClockError::YearOverflow)?
        } else {
            self.time.year
        };

        self.time.turn = turn;
        self.time.season = season;
        self.time.year = year;

        info!(turn, year, season = season.as_str(), "Season advanced");
        Ok(SeasonAdvance {
            turn,
            season,
            year,
            new_year,
        })
    }

    /// Check the trigger table for the current year and season.
    ///
    /// When an epoch is registered there and has not completed, it becomes
    /// the current epoch and is returned. Repeated calls in the same season
    /// return the same epoch without side effects.
    pub fn check_epoch(&mut self) -> Option<Epoch> {
        let epoch = *self.triggers.get(&(self.time.year, self.time.season))?;
        if self.is_epoch_completed(epoch) {
            debug!(epoch = epoch.number(), "Epoch already completed");
            return None;
        }
        self.time.current_epoch = Some(epoch);
        Some(epoch)
    }

    /// Force an epoch to become current, bypassing the trigger table.
    ///
    /// Returns `false` if the epoch is already completed.
    pub fn set_current_epoch(&mut self, epoch: Epoch) -> bool {
        if self.is_epoch_completed(epoch) {
            return false;
        }
        self.time.current_epoch = Some(epoch);
        true
    }

    /// Mark an epoch completed and clear it from the current slot.
    pub fn complete_epoch(&mut self, epoch: Epoch) {
        self.time.epochs_completed.insert(epoch);
        if self.time.current_epoch == Some(epoch) {
            self.time.current_epoch = None;
        }
        info!(epoch = epoch.number(), name = epoch.name(), "Epoch completed");
    }

    /// Whether the calendar has reached or passed the final boundary.
    pub fn at_final_boundary(&self) -> bool {
        (self.time.year, self.time.season) >= (self.final_year, self.final_season)
    }

    /// Mark the game ended. Later advances fail with
    /// [`ClockError::GameOver`].
    pub const fn mark_ended(&mut self) {
        self.ended = true;
    }

    /// Replace the time state, e.g. after loading a save.
    pub fn restore(&mut self, time: TimeState, ended: bool) {
        self.time = time;
        self.ended = ended;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn epoch(n: u8) -> Epoch {
        Epoch::new(n).unwrap()
    }

    fn clock() -> GameClock {
        GameClock::new(
            1,
            [(epoch(1), 1, Season::Summer), (epoch(2), 2, Season::Spring)],
            2,
            Season::Summer,
        )
    }

    #[test]
    fn advance_rolls_year_on_winter_to_spring() {
        let mut clock = clock();
        for _ in 0..3 {
            clock.advance().unwrap();
        }
        assert_eq!(clock.season(), Season::Winter);
        assert_eq!(clock.year(), 1);

        let advance = clock.advance().unwrap();
        assert!(advance.new_year);
        assert_eq!(advance.season, Season::Spring);
        assert_eq!(advance.year, 2);
        assert_eq!(advance.turn, 4);
    }

    #[test]
    fn epoch_triggers_until_completed() {
        let mut clock = clock();
        assert_eq!(clock.check_epoch(), None);
        clock.advance().unwrap();
        assert_eq!(clock.check_epoch(), Some(epoch(1)));
        assert_eq!(clock.check_epoch(), Some(epoch(1)));

        clock.complete_epoch(epoch(1));
        assert_eq!(clock.current_epoch(), None);
        assert_eq!(clock.check_epoch(), None);
        assert!(!clock.set_current_epoch(epoch(1)));
    }

    #[test]
    fn final_boundary_and_game_over() {
        let mut clock = clock();
        while !clock.at_final_boundary() {
            clock.advance().unwrap();
        }
        assert_eq!((clock.year(), clock.season()), (2, Season::Summer));
        clock.mark_ended();
        assert_eq!(clock.advance(), Err(ClockError::GameOver));
        assert_eq!(clock.turn(), 5);
    }
}
