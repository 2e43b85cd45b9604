//! Participant registry
//!
//! This module tracks the (at most two) participants connected to the game
//! session: their transport identity, the slot they were seated in, and
//! their display name. It also offers the small set of helpers used to
//! deliver messages to a single participant or to everyone.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use enum_map::{Enum, EnumMap};
use serde::Serialize;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;

use super::{
    constants::room::MAX_PLAYER_COUNT,
    game::UpdateMessage,
    names::{self, Names},
    session::Tunnel,
};

/// A unique identifier for a connection
///
/// The transport layer assigns one per connected client; it stays the same
/// for the lifetime of that connection.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    /// Parses an ID from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// A seat at the table
///
/// Slots are handed out in join order and decide which participant gives
/// and which guesses in a given round. They display as the 1-based player
/// number shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, derive_more::Display)]
pub enum Slot {
    /// Slot index 0, player number 1
    #[display("1")]
    First,
    /// Slot index 1, player number 2
    #[display("2")]
    Second,
}

impl Slot {
    /// The 0-based slot index
    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// The 1-based player number shown to clients
    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }

    fn from_parity(value: u32) -> Self {
        if value % 2 == 0 {
            Self::First
        } else {
            Self::Second
        }
    }

    /// The slot that supplies the phrase in `round` (1-based)
    ///
    /// The giver is always slot `(round + 1) mod 2`.
    pub fn giver(round: u32) -> Self {
        Self::from_parity(round.wrapping_add(1))
    }

    /// The slot that guesses in `round` (1-based)
    ///
    /// The guesser is always slot `round mod 2`.
    pub fn guesser(round: u32) -> Self {
        Self::from_parity(round)
    }
}

/// Errors that can occur when managing participants
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Both slots are taken
    #[error("game room full")]
    RoomFull,
    /// The connection is already seated
    #[error("connection already joined")]
    AlreadyJoined,
    /// The game was stopped and is waiting for the room to empty
    #[error("game was stopped")]
    Closed,
    /// No participant with this connection ID exists
    #[error("unknown connection")]
    UnknownConnection,
    /// The requested display name was rejected
    #[error(transparent)]
    Name(#[from] names::Error),
}

/// Manages the participants of the game session
#[derive(Debug, Default)]
pub struct Watchers {
    /// Primary mapping from connection ID to its slot
    mapping: HashMap<Id, Slot>,
    /// Reverse mapping from slot to the connection seated there
    reverse_mapping: EnumMap<Slot, Option<Id>>,
    /// Display names of the seated participants
    names: Names,
}

impl Watchers {
    /// Seats a new participant in the lowest free slot
    ///
    /// # Errors
    ///
    /// * `Error::AlreadyJoined` - The connection already has a slot
    /// * `Error::RoomFull` - Both slots are taken
    pub fn join(&mut self, id: Id) -> Result<Slot, Error> {
        if self.mapping.contains_key(&id) {
            return Err(Error::AlreadyJoined);
        }
        if self.mapping.len() >= MAX_PLAYER_COUNT {
            return Err(Error::RoomFull);
        }

        let slot = self
            .reverse_mapping
            .iter()
            .find_map(|(slot, seated)| seated.is_none().then_some(slot))
            .ok_or(Error::RoomFull)?;

        self.mapping.insert(id, slot);
        self.reverse_mapping[slot] = Some(id);

        Ok(slot)
    }

    /// Removes a participant, returning the slot it occupied
    pub fn leave(&mut self, id: Id) -> Option<Slot> {
        let slot = self.mapping.remove(&id)?;
        self.reverse_mapping[slot] = None;
        self.names.remove(&id);
        Some(slot)
    }

    /// Validates and assigns a display name
    ///
    /// # Errors
    ///
    /// * `Error::UnknownConnection` - The connection is not seated
    /// * `Error::Name` - The name failed validation
    pub fn set_name(&mut self, id: Id, name: &str) -> Result<String, Error> {
        if !self.mapping.contains_key(&id) {
            return Err(Error::UnknownConnection);
        }

        Ok(self.names.set_name(id, name)?)
    }

    /// Gets the slot of a connection
    pub fn slot(&self, id: Id) -> Option<Slot> {
        self.mapping.get(&id).copied()
    }

    /// Gets the connection seated in `slot`
    pub fn id(&self, slot: Slot) -> Option<Id> {
        self.reverse_mapping[slot]
    }

    /// Gets the display name of the participant in `slot`, if it has one
    pub fn name(&self, slot: Slot) -> Option<String> {
        self.id(slot).and_then(|id| self.names.get_name(&id))
    }

    /// Gets a name suitable for announcements, falling back to the player number
    pub fn display_name(&self, slot: Slot) -> String {
        self.name(slot)
            .unwrap_or_else(|| format!("Player {}", slot.number()))
    }

    /// Number of seated participants
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Returns `true` if nobody is seated
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Returns `true` when both slots are taken and both participants are named
    pub fn is_ready(&self) -> bool {
        self.reverse_mapping
            .values()
            .all(|seated| seated.is_some_and(|id| self.names.get_name(&id).is_some()))
    }

    /// Sends an update message to a specific participant
    pub fn send_message<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &UpdateMessage,
        watcher_id: Id,
        tunnel_finder: F,
    ) {
        let Some(session) = tunnel_finder(watcher_id) else {
            return;
        };

        session.send_message(message);
    }

    /// Broadcasts an update message to every seated participant
    pub fn announce<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &UpdateMessage,
        tunnel_finder: F,
    ) {
        for id in self.reverse_mapping.values().flatten() {
            self.send_message(message, *id, &tunnel_finder);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{cell::RefCell, rc::Rc};

    #[derive(Clone)]
    struct MockTunnel {
        id: Id,
        log: Rc<RefCell<Vec<(Id, UpdateMessage)>>>,
    }

    impl Tunnel for MockTunnel {
        fn send_message(&self, message: &UpdateMessage) {
            self.log.borrow_mut().push((self.id, message.clone()));
        }
    }

    #[test]
    fn test_id_round_trips_through_string() {
        let id = Id::new();
        let parsed: Id = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<Id>().is_err());
    }

    #[test]
    fn test_slot_numbers() {
        assert_eq!(Slot::First.index(), 0);
        assert_eq!(Slot::Second.index(), 1);
        assert_eq!(Slot::First.number(), 1);
        assert_eq!(Slot::Second.to_string(), "2");
    }

    #[test]
    fn test_role_rotation() {
        assert_eq!(Slot::giver(1), Slot::First);
        assert_eq!(Slot::guesser(1), Slot::Second);
        assert_eq!(Slot::giver(2), Slot::Second);
        assert_eq!(Slot::guesser(2), Slot::First);

        for round in 1..=50u32 {
            assert_eq!(Slot::guesser(round).index(), (round % 2) as usize);
            assert_eq!(Slot::giver(round).index(), ((round + 1) % 2) as usize);
            assert_ne!(Slot::giver(round), Slot::guesser(round));
            assert_eq!(Slot::giver(round), Slot::guesser(round + 1));
        }
    }

    #[test]
    fn test_join_in_order_and_room_full() {
        let mut watchers = Watchers::default();
        let (a, b, c) = (Id::new(), Id::new(), Id::new());

        assert_eq!(watchers.join(a), Ok(Slot::First));
        assert_eq!(watchers.join(b), Ok(Slot::Second));
        assert_eq!(watchers.join(c), Err(Error::RoomFull));

        assert_eq!(watchers.len(), 2);
        assert_eq!(watchers.slot(c), None);
        assert_eq!(watchers.id(Slot::First), Some(a));
        assert_eq!(watchers.id(Slot::Second), Some(b));
    }

    #[test]
    fn test_join_twice_is_rejected() {
        let mut watchers = Watchers::default();
        let a = Id::new();

        watchers.join(a).unwrap();
        assert_eq!(watchers.join(a), Err(Error::AlreadyJoined));
        assert_eq!(watchers.len(), 1);
    }

    #[test]
    fn test_leave_frees_lowest_slot() {
        let mut watchers = Watchers::default();
        let (a, b, c) = (Id::new(), Id::new(), Id::new());

        watchers.join(a).unwrap();
        watchers.join(b).unwrap();
        watchers.set_name(a, "Alice").unwrap();

        assert_eq!(watchers.leave(a), Some(Slot::First));
        assert_eq!(watchers.leave(a), None);
        assert_eq!(watchers.name(Slot::First), None);

        assert_eq!(watchers.join(c), Ok(Slot::First));
        assert!(watchers.set_name(c, "Alice").is_ok());
    }

    #[test]
    fn test_set_name_unknown_connection() {
        let mut watchers = Watchers::default();
        assert_eq!(
            watchers.set_name(Id::new(), "Ghost"),
            Err(Error::UnknownConnection)
        );
    }

    #[test]
    fn test_set_name_validation_is_forwarded() {
        let mut watchers = Watchers::default();
        let a = Id::new();
        watchers.join(a).unwrap();

        assert_eq!(
            watchers.set_name(a, "  "),
            Err(Error::Name(names::Error::Empty))
        );
        assert_eq!(watchers.name(Slot::First), None);
    }

    #[test]
    fn test_is_ready_requires_two_named_players() {
        let mut watchers = Watchers::default();
        let (a, b) = (Id::new(), Id::new());

        assert!(!watchers.is_ready());
        watchers.join(a).unwrap();
        watchers.set_name(a, "Alice").unwrap();
        assert!(!watchers.is_ready());

        watchers.join(b).unwrap();
        assert!(!watchers.is_ready());
        assert_eq!(watchers.display_name(Slot::Second), "Player 2");

        watchers.set_name(b, "Bob").unwrap();
        assert!(watchers.is_ready());
        assert_eq!(watchers.display_name(Slot::Second), "Bob");
    }

    #[test]
    fn test_announce_reaches_every_participant() {
        let mut watchers = Watchers::default();
        let (a, b) = (Id::new(), Id::new());
        watchers.join(a).unwrap();
        watchers.join(b).unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        let finder = |id: Id| {
            Some(MockTunnel {
                id,
                log: Rc::clone(&log),
            })
        };

        watchers.announce(&UpdateMessage::UpdateTries(9), &finder);
        watchers.send_message(&UpdateMessage::ShowGuessInput, b, &finder);

        assert_eq!(
            *log.borrow(),
            vec![
                (a, UpdateMessage::UpdateTries(9)),
                (b, UpdateMessage::UpdateTries(9)),
                (b, UpdateMessage::ShowGuessInput),
            ]
        );
    }

    #[test]
    fn test_send_message_without_tunnel_is_noop() {
        let mut watchers = Watchers::default();
        let a = Id::new();
        watchers.join(a).unwrap();

        let finder = |_id: Id| None::<MockTunnel>;
        watchers.announce(&UpdateMessage::UpdateTries(9), finder);
    }
}
