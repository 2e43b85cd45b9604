//! Configuration constants for the hangman duel
//!
//! This module contains the fixed limits used throughout the game so that
//! validation and the state machine agree on the same boundaries.

/// Room capacity constants
pub mod room {
    /// Maximum number of participants in the single game session
    pub const MAX_PLAYER_COUNT: usize = 2;
}

/// Round configuration constants
pub mod round {
    /// Number of wrong guesses the guesser may make in a round by default
    pub const STARTING_TRIES: u32 = 9;
    /// Lowest configurable number of tries per round
    pub const MIN_TRIES: u32 = 1;
    /// Highest configurable number of tries per round
    pub const MAX_TRIES: u32 = 26;
    /// Placeholder rendered for letters that have not been guessed yet
    pub const MASK_GLYPH: char = '_';
}

/// Secret phrase constants
pub mod phrase {
    /// Maximum length of a secret phrase in characters
    pub const MAX_LENGTH: usize = 100;
}

/// Display name constants
pub mod names {
    /// Maximum length of a display name in characters
    pub const MAX_LENGTH: usize = 30;
}
