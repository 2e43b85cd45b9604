//! Core game session
//!
//! This module contains the [`Game`] struct that ties the participant
//! registry to the round engine. It accepts connections and client events,
//! applies them, and delivers every resulting message through the
//! connected clients' tunnels.

use garde::Validate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    Error,
    constants::round::{MAX_TRIES, MIN_TRIES, STARTING_TRIES},
    leaderboard::ScoreMessage,
    round::{Phase, PhaseKind, RoundEngine},
    session::{Envelope, Outbox, Recipient, Tunnel},
    watcher::{self, Id, Slot, Watchers},
};

const ROOM_FULL: &str = "Game room full. Only two players allowed.";
const ROOM_CLOSED: &str = "This game was stopped. Wait for the room to empty before joining.";
const GAME_STOPPED: &str = "A player disconnected. Game stopped.";
const PLAYER_LEFT: &str = "A player disconnected. Waiting for another player.";

/// Global configuration options for the game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct Options {
    /// Wrong guesses allowed per round
    #[garde(range(min = MIN_TRIES, max = MAX_TRIES))]
    starting_tries: u32,
    /// Only accept phrases from the giver and guesses from the guesser
    #[garde(skip)]
    enforce_roles: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            starting_tries: STARTING_TRIES,
            enforce_roles: false,
        }
    }
}

impl Options {
    /// Wrong guesses allowed per round
    pub fn starting_tries(&self) -> u32 {
        self.starting_tries
    }

    /// Whether actions are restricted to the player holding the matching role
    pub fn enforce_roles(&self) -> bool {
        self.enforce_roles
    }

    /// Returns a copy with a different number of tries per round
    #[must_use]
    pub fn with_starting_tries(self, starting_tries: u32) -> Self {
        Self {
            starting_tries,
            ..self
        }
    }

    /// Returns a copy with role enforcement switched on or off
    #[must_use]
    pub fn with_enforced_roles(self, enforce_roles: bool) -> Self {
        Self {
            enforce_roles,
            ..self
        }
    }
}

/// Messages that can be sent by a connected client
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum IncomingMessage {
    /// Choose a display name
    SetNickname {
        /// The requested name
        nickname: String,
    },
    /// Submit the secret phrase for the round
    SetPhrase {
        /// The phrase as typed by the giver
        phrase: String,
    },
    /// Guess a letter of the phrase
    GuessLetter {
        /// The guessed letter
        letter: String,
    },
}

impl IncomingMessage {
    /// Parses a client message from its JSON text
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the text is not a known event.
    pub fn from_message(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Update messages sent to clients about game state changes
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum UpdateMessage {
    /// The 1-based player number assigned on join
    PlayerNumber(u8),
    /// Informational text
    Message(String),
    /// Show the phrase input (giver)
    ShowPhraseInput,
    /// Hide the letter input (guesser)
    HideGuessInput,
    /// Show the letter input (guesser)
    ShowGuessInput,
    /// Remove the giver's plaintext phrase from view
    ClearGiverPhrase,
    /// The plaintext phrase, for the giver only
    ShowGiverPhrase(String),
    /// The masked phrase
    DisplayPhrase(String),
    /// The full phrase after the giver won
    RevealPhrase(String),
    /// Remaining tries
    UpdateTries(u32),
    /// Wrong letters so far, in guess order
    WrongGuess(Vec<char>),
    /// Cumulative scores
    Scores(ScoreMessage),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// The single game session
///
/// `Game` is mutated through `&mut self` only, and every call finishes
/// delivering its messages before returning. Transports that handle
/// connections on several threads must serialize access, for example with
/// a `Mutex<Game>`.
#[derive(Debug)]
pub struct Game {
    /// Connected participants
    pub watchers: Watchers,
    /// Round state machine
    pub engine: RoundEngine,
}

impl Default for Game {
    fn default() -> Self {
        Self {
            watchers: Watchers::default(),
            engine: RoundEngine::new(Options::default()),
        }
    }
}

impl Game {
    /// Creates a session waiting for two players
    ///
    /// # Errors
    ///
    /// Returns a `garde::Report` if `options` fail validation.
    pub fn new(options: Options) -> Result<Self, garde::Report> {
        options.validate()?;

        Ok(Self {
            watchers: Watchers::default(),
            engine: RoundEngine::new(options),
        })
    }

    /// The current phase of the round state machine
    pub fn phase(&self) -> &Phase {
        self.engine.phase()
    }

    /// Current scores
    pub fn scores(&self) -> ScoreMessage {
        self.engine.scores()
    }

    /// Registers a new connection
    ///
    /// The connection is seated and told its player number, or told why it
    /// cannot play. A refused connection is left open.
    ///
    /// # Errors
    ///
    /// * `watcher::Error::RoomFull` - Two players are already seated
    /// * `watcher::Error::Closed` - The game was stopped and has not reset yet
    /// * `watcher::Error::AlreadyJoined` - The connection is already seated
    pub fn add_connection<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        watcher_id: Id,
        tunnel_finder: F,
    ) -> Result<Slot, watcher::Error> {
        let joined = if self.engine.phase().kind() == PhaseKind::Abandoned {
            Err(watcher::Error::Closed)
        } else {
            self.watchers.join(watcher_id)
        };

        match joined {
            Ok(slot) => {
                info!(%watcher_id, %slot, "player joined");
                self.watchers.send_message(
                    &UpdateMessage::PlayerNumber(slot.number()),
                    watcher_id,
                    tunnel_finder,
                );
                Ok(slot)
            }
            Err(error) => {
                warn!(%watcher_id, %error, "connection refused");
                let notice = match error {
                    watcher::Error::RoomFull => Some(ROOM_FULL),
                    watcher::Error::Closed => Some(ROOM_CLOSED),
                    _ => None,
                };
                if let Some(notice) = notice {
                    self.watchers.send_message(
                        &UpdateMessage::Message(notice.to_owned()),
                        watcher_id,
                        tunnel_finder,
                    );
                }
                Err(error)
            }
        }
    }

    /// Handles a closed connection
    ///
    /// Losing a player after the game started stops it for good; the other
    /// player is told so. Once nobody is left the session resets.
    pub fn remove_connection<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        watcher_id: Id,
        tunnel_finder: F,
    ) {
        let Some(slot) = self.watchers.leave(watcher_id) else {
            debug!(%watcher_id, "unseated connection closed");
            return;
        };
        info!(%watcher_id, %slot, "player left");

        let notice = match self.engine.phase().kind() {
            PhaseKind::AwaitingPlayers => PLAYER_LEFT,
            PhaseKind::Abandoned => GAME_STOPPED,
            PhaseKind::AwaitingPhrase | PhaseKind::Guessing => {
                info!(round = self.engine.round_number(), "game abandoned");
                self.engine.abandon();
                GAME_STOPPED
            }
        };
        self.watchers
            .announce(&UpdateMessage::Message(notice.to_owned()), &tunnel_finder);

        if self.watchers.is_empty() {
            self.reset(tunnel_finder);
        }
    }

    /// Starts over with round 1 and zero scores
    ///
    /// Seated players keep their seats and names; if both are present a new
    /// game begins right away.
    pub fn reset<T: Tunnel, F: Fn(Id) -> Option<T>>(&mut self, tunnel_finder: F) {
        self.engine.reset();
        info!(players = self.watchers.len(), "session reset");

        if self.watchers.is_ready() {
            match self.engine.start(&self.watchers) {
                Ok(outbox) => self.dispatch(outbox, tunnel_finder),
                Err(error) => debug!(%error, "could not restart after reset"),
            }
        }
    }

    /// Handles incoming messages from connected clients
    ///
    /// Messages from unknown connections and messages that do not fit the
    /// current phase are ignored. Input that fails validation is answered
    /// with an explanation to the sender only.
    pub fn receive_message<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        watcher_id: Id,
        message: IncomingMessage,
        tunnel_finder: F,
    ) {
        match self.handle(watcher_id, message) {
            Ok(outbox) => self.dispatch(outbox, tunnel_finder),
            Err(Error::Watcher(watcher::Error::UnknownConnection)) => {
                debug!(%watcher_id, "ignoring message from unknown connection");
            }
            Err(Error::Round(error)) => {
                debug!(%watcher_id, %error, "ignoring message");
            }
            Err(error) => {
                debug!(%watcher_id, %error, "rejected input");
                self.watchers.send_message(
                    &UpdateMessage::Message(format!("Not accepted: {error}.")),
                    watcher_id,
                    tunnel_finder,
                );
            }
        }
    }

    fn handle(&mut self, watcher_id: Id, message: IncomingMessage) -> Result<Outbox, Error> {
        let slot = self
            .watchers
            .slot(watcher_id)
            .ok_or(watcher::Error::UnknownConnection)?;

        match message {
            IncomingMessage::SetNickname { nickname } => {
                let name = self.watchers.set_name(watcher_id, &nickname)?;
                info!(%watcher_id, %slot, %name, "nickname set");

                let mut outbox = Outbox::default();
                outbox.to_everyone(UpdateMessage::Message(format!("{name} joined the game!")));

                if self.watchers.is_ready()
                    && self.engine.phase().kind() == PhaseKind::AwaitingPlayers
                {
                    outbox.append(self.engine.start(&self.watchers)?);
                    info!(giver = %self.engine.giver(), "both players ready");
                }
                Ok(outbox)
            }
            IncomingMessage::SetPhrase { phrase } => {
                let outbox = self.engine.set_phrase(slot, &phrase, &self.watchers)?;
                info!(round = self.engine.round_number(), %slot, "phrase set");
                Ok(outbox)
            }
            IncomingMessage::GuessLetter { letter } => {
                let round = self.engine.round_number();
                let outbox = self.engine.guess_letter(slot, &letter, &self.watchers)?;
                if self.engine.round_number() != round {
                    let ScoreMessage { p1, p2 } = self.engine.scores();
                    info!(round, p1, p2, "round resolved");
                }
                Ok(outbox)
            }
        }
    }

    /// Delivers queued messages through the participants' tunnels
    fn dispatch<T: Tunnel, F: Fn(Id) -> Option<T>>(&self, outbox: Outbox, tunnel_finder: F) {
        for Envelope { recipient, message } in outbox {
            match recipient {
                Recipient::Everyone => self.watchers.announce(&message, &tunnel_finder),
                Recipient::Slot(slot) => {
                    if let Some(id) = self.watchers.id(slot) {
                        self.watchers.send_message(&message, id, &tunnel_finder);
                    }
                }
            }
        }
    }
}
