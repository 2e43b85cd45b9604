//! Round lifecycle and guessing rules
//!
//! The [`RoundEngine`] owns everything that changes while the two players
//! take turns: the phase, the secret of the current round, wrong guesses,
//! remaining tries, scores and the round counter. Every transition returns
//! an [`Outbox`] with the messages it produced; nothing here talks to a
//! transport.

use serde::Serialize;
use thiserror::Error;

use super::{
    game::{Options, UpdateMessage},
    leaderboard::{ScoreMessage, Scoreboard},
    phrase::{self, Phrase},
    session::Outbox,
    watcher::{Slot, Watchers},
};

/// Errors for events that do not fit the current phase
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The game cannot start from the current phase
    #[error("game already started")]
    AlreadyStarted,
    /// A phrase was submitted while none was expected
    #[error("no phrase expected right now")]
    NotAwaitingPhrase,
    /// A guess was submitted while no round was being guessed
    #[error("no round is being guessed")]
    NotGuessing,
    /// The sender does not hold the role this action needs
    #[error("sender does not hold the required role")]
    WrongRole,
}

/// The state of a round that is being guessed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    phrase: Phrase,
    wrong_guesses: Vec<char>,
    tries_left: u32,
}

impl Round {
    fn new(phrase: Phrase, tries: u32) -> Self {
        Self {
            phrase,
            wrong_guesses: Vec::new(),
            tries_left: tries,
        }
    }

    /// The secret phrase
    pub fn phrase(&self) -> &Phrase {
        &self.phrase
    }

    /// Distinct wrong letters in the order they were guessed
    pub fn wrong_guesses(&self) -> &[char] {
        &self.wrong_guesses
    }

    /// Remaining wrong guesses before the giver wins
    pub fn tries_left(&self) -> u32 {
        self.tries_left
    }

    /// Applies a guess, returning `true` if the letter is in the phrase
    fn guess(&mut self, letter: char) -> bool {
        if self.phrase.reveal(letter) {
            return true;
        }
        if !self.wrong_guesses.contains(&letter) {
            self.wrong_guesses.push(letter);
            self.tries_left = self.tries_left.saturating_sub(1);
        }
        false
    }
}

/// Where the session currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Fewer than two named participants
    AwaitingPlayers,
    /// Waiting for the giver to submit a phrase
    AwaitingPhrase,
    /// The guesser is guessing letters
    Guessing(Round),
    /// A participant left mid-game; nothing resumes
    Abandoned,
}

/// The phase without its round data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    /// See [`Phase::AwaitingPlayers`]
    AwaitingPlayers,
    /// See [`Phase::AwaitingPhrase`]
    AwaitingPhrase,
    /// See [`Phase::Guessing`]
    Guessing,
    /// See [`Phase::Abandoned`]
    Abandoned,
}

impl Phase {
    /// Returns the kind of this phase without the associated data
    pub fn kind(&self) -> PhaseKind {
        match self {
            Self::AwaitingPlayers => PhaseKind::AwaitingPlayers,
            Self::AwaitingPhrase => PhaseKind::AwaitingPhrase,
            Self::Guessing(_) => PhaseKind::Guessing,
            Self::Abandoned => PhaseKind::Abandoned,
        }
    }
}

/// Who took the round
enum Winner {
    Guesser,
    Giver { phrase: String },
}

/// The round state machine
#[derive(Debug, Clone)]
pub struct RoundEngine {
    phase: Phase,
    round: u32,
    scoreboard: Scoreboard,
    options: Options,
}

impl RoundEngine {
    /// Creates an engine waiting for players, at round 1 with zero scores
    pub fn new(options: Options) -> Self {
        Self {
            phase: Phase::AwaitingPlayers,
            round: 1,
            scoreboard: Scoreboard::default(),
            options,
        }
    }

    /// The current phase
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The current round number, starting at 1
    pub fn round_number(&self) -> u32 {
        self.round
    }

    /// The slot supplying the phrase this round
    pub fn giver(&self) -> Slot {
        Slot::giver(self.round)
    }

    /// The slot guessing this round
    pub fn guesser(&self) -> Slot {
        Slot::guesser(self.round)
    }

    /// Current scores
    pub fn scores(&self) -> ScoreMessage {
        self.scoreboard.message()
    }

    /// Remaining tries; the starting value when no round is being guessed
    pub fn tries_left(&self) -> u32 {
        match &self.phase {
            Phase::Guessing(round) => round.tries_left,
            _ => self.options.starting_tries(),
        }
    }

    /// Moves from waiting for players to waiting for the first phrase
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyStarted` unless the engine is awaiting players.
    pub fn start(&mut self, watchers: &Watchers) -> Result<Outbox, Error> {
        if self.phase != Phase::AwaitingPlayers {
            return Err(Error::AlreadyStarted);
        }
        self.phase = Phase::AwaitingPhrase;

        let giver = self.giver();
        let mut outbox = Outbox::default();
        outbox.to_everyone(UpdateMessage::Message(format!(
            "Both players ready! {} starts as the giver.",
            watchers.display_name(giver)
        )));
        outbox.to_slot(giver, UpdateMessage::ShowPhraseInput);

        Ok(outbox)
    }

    /// Starts guessing on a phrase submitted by `sender`
    ///
    /// # Errors
    ///
    /// * `Error::NotAwaitingPhrase` - No phrase is expected in this phase
    /// * `Error::WrongRole` - Roles are enforced and `sender` is not the giver
    /// * `phrase::Error` - The phrase failed validation
    pub fn set_phrase(
        &mut self,
        sender: Slot,
        raw: &str,
        watchers: &Watchers,
    ) -> Result<Outbox, crate::Error> {
        if self.phase != Phase::AwaitingPhrase {
            return Err(Error::NotAwaitingPhrase.into());
        }
        if self.options.enforce_roles() && sender != self.giver() {
            return Err(Error::WrongRole.into());
        }

        let phrase = Phrase::new(raw)?;
        let (giver, guesser) = (self.giver(), self.guesser());
        let tries = self.options.starting_tries();

        let mut outbox = Outbox::default();
        outbox.to_slot(giver, UpdateMessage::ShowGiverPhrase(phrase.text().to_owned()));
        outbox.to_slot(guesser, UpdateMessage::DisplayPhrase(phrase.mask()));
        outbox.to_everyone(UpdateMessage::UpdateTries(tries));
        outbox.to_everyone(UpdateMessage::Message(format!(
            "{} has set the phrase! {}, start guessing.",
            watchers.display_name(giver),
            watchers.display_name(guesser)
        )));
        outbox.to_slot(guesser, UpdateMessage::ShowGuessInput);

        self.phase = Phase::Guessing(Round::new(phrase, tries));

        Ok(outbox)
    }

    /// Applies a letter guessed by `sender`
    ///
    /// # Errors
    ///
    /// * `phrase::Error::NotALetter` - The guess is not a single letter
    /// * `Error::NotGuessing` - No round is being guessed
    /// * `Error::WrongRole` - Roles are enforced and `sender` is not the guesser
    pub fn guess_letter(
        &mut self,
        sender: Slot,
        raw: &str,
        watchers: &Watchers,
    ) -> Result<Outbox, crate::Error> {
        let enforce_roles = self.options.enforce_roles();
        let guesser = self.guesser();

        let Phase::Guessing(round) = &mut self.phase else {
            return Err(Error::NotGuessing.into());
        };
        if enforce_roles && sender != guesser {
            return Err(Error::WrongRole.into());
        }
        let letter = phrase::parse_guess(raw)?;

        let mut outbox = Outbox::default();
        let winner = if round.guess(letter) {
            outbox.to_everyone(UpdateMessage::DisplayPhrase(round.phrase.mask()));
            outbox.to_everyone(UpdateMessage::UpdateTries(round.tries_left));
            round.phrase.is_revealed().then_some(Winner::Guesser)
        } else {
            outbox.to_everyone(UpdateMessage::WrongGuess(round.wrong_guesses.clone()));
            outbox.to_everyone(UpdateMessage::UpdateTries(round.tries_left));
            (round.tries_left == 0).then(|| Winner::Giver {
                phrase: round.phrase.text().to_owned(),
            })
        };

        if let Some(winner) = winner {
            outbox.append(self.resolve(winner, watchers));
        }

        Ok(outbox)
    }

    /// Scores the finished round and hands the phrase input to the other player
    fn resolve(&mut self, winner: Winner, watchers: &Watchers) -> Outbox {
        let mut outbox = Outbox::default();

        match winner {
            Winner::Guesser => {
                let guesser = self.guesser();
                self.scoreboard.award(guesser);
                outbox.to_everyone(UpdateMessage::Message(format!(
                    "🎉 {} guessed it right!",
                    watchers.display_name(guesser)
                )));
            }
            Winner::Giver { phrase } => {
                let giver = self.giver();
                outbox.to_everyone(UpdateMessage::RevealPhrase(phrase.clone()));
                self.scoreboard.award(giver);
                outbox.to_everyone(UpdateMessage::Message(format!(
                    "😢 {} wins this round! The phrase was '{phrase}'.",
                    watchers.display_name(giver)
                )));
            }
        }
        outbox.to_everyone(UpdateMessage::Scores(self.scoreboard.message()));

        outbox.append(self.swap_roles(watchers));
        outbox
    }

    /// Advances the round counter, which swaps giver and guesser
    fn swap_roles(&mut self, watchers: &Watchers) -> Outbox {
        self.round += 1;
        self.phase = Phase::AwaitingPhrase;

        let (giver, guesser) = (self.giver(), self.guesser());

        let mut outbox = Outbox::default();
        outbox.to_everyone(UpdateMessage::Message(format!(
            "Next round! {} is now the giver.",
            watchers.display_name(giver)
        )));
        outbox.to_slot(giver, UpdateMessage::ShowPhraseInput);
        outbox.to_slot(guesser, UpdateMessage::HideGuessInput);
        outbox.to_slot(giver, UpdateMessage::ClearGiverPhrase);
        outbox.to_slot(guesser, UpdateMessage::ClearGiverPhrase);
        outbox
    }

    /// Stops the game for good; any round in progress is discarded
    pub fn abandon(&mut self) {
        self.phase = Phase::Abandoned;
    }

    /// Returns to a fresh session: no players, round 1, zero scores
    pub fn reset(&mut self) {
        *self = Self::new(self.options);
    }
}
