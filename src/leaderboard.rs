//! Cumulative scores
//!
//! Each slot earns one point per round it wins, as guesser or as giver.
//! Scores only ever grow.

use enum_map::EnumMap;
use serde::Serialize;

use super::watcher::Slot;

/// Per-slot score totals for the session
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Scoreboard {
    points: EnumMap<Slot, u32>,
}

/// Wire form of the scores, keyed by player number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreMessage {
    /// Points of player 1
    pub p1: u32,
    /// Points of player 2
    pub p2: u32,
}

impl Scoreboard {
    /// Adds one point to `slot`
    pub fn award(&mut self, slot: Slot) {
        self.points[slot] = self.points[slot].saturating_add(1);
    }

    /// Points of `slot`
    #[cfg(test)]
    pub fn points(&self, slot: Slot) -> u32 {
        self.points[slot]
    }

    /// The scores as sent to clients
    pub fn message(&self) -> ScoreMessage {
        ScoreMessage {
            p1: self.points[Slot::First],
            p2: self.points[Slot::Second],
        }
    }
}
