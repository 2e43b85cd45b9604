//! # Hangman Duel
//!
//! This library provides the game logic for a real-time, two-player
//! word-guessing game. One player sets a secret phrase, the other guesses it
//! letter by letter, and the roles swap after every round. It handles the
//! participant registry, the round state machine, scoring, and the messages
//! sent to both clients.
//!
//! The transport is left to the caller: implement [`session::Tunnel`] for a
//! connection handle and feed connections and [`game::IncomingMessage`]s into
//! a [`game::Game`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
use serde::Serialize;
use thiserror::Error;

pub mod constants;

pub mod game;
pub mod leaderboard;
pub mod names;
pub mod phrase;
pub mod round;
pub mod session;
pub mod watcher;

/// Any reason an incoming event was not applied
///
/// Validation failures ([`Error::Phrase`] and name errors inside
/// [`Error::Watcher`]) are reported back to the sender; the others are
/// ignored by the session.
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq, derive_more::From)]
pub enum Error {
    /// Registry problems, including rejected names
    #[error(transparent)]
    Watcher(watcher::Error),
    /// The phrase or guess failed validation
    #[error(transparent)]
    Phrase(phrase::Error),
    /// The event does not fit the current phase or role
    #[error(transparent)]
    Round(round::Error),
}
