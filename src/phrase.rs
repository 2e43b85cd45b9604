//! Secret phrases and their masked rendering
//!
//! A [`Phrase`] stores the normalized secret together with the letters that
//! have been guessed correctly so far, and renders the mask shown to the
//! guesser.

use std::collections::HashSet;

use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;

use super::constants::{phrase::MAX_LENGTH, round::MASK_GLYPH};

/// Errors that can occur when validating a phrase or a guess
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The phrase is empty or contains only whitespace
    #[error("phrase cannot be empty")]
    Empty,
    /// The phrase has nothing to guess
    #[error("phrase must contain at least one letter")]
    NoLetters,
    /// The phrase exceeds the maximum allowed length
    #[error("phrase is too long")]
    TooLong,
    /// The guess is not exactly one letter
    #[error("guess must be a single letter")]
    NotALetter,
}

/// Renders `text` with every unguessed alphabetic character hidden
///
/// Non-alphabetic characters are always shown, so the mask has exactly as
/// many characters as `text`.
pub fn mask(text: &str, guessed: &HashSet<char>) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphabetic() && !guessed.contains(&c) {
                MASK_GLYPH
            } else {
                c
            }
        })
        .collect()
}

/// Normalizes a raw guess into a single lowercase letter
///
/// # Errors
///
/// Returns `Error::NotALetter` unless the trimmed input lowercases to exactly
/// one alphabetic character.
pub fn parse_guess(raw: &str) -> Result<char, Error> {
    let lowered = raw.trim().to_lowercase();
    match lowered.chars().exactly_one() {
        Ok(letter) if letter.is_alphabetic() => Ok(letter),
        _ => Err(Error::NotALetter),
    }
}

/// The secret of the current round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    text: String,
    guessed: HashSet<char>,
}

impl Phrase {
    /// Normalizes and validates a phrase submitted by the giver
    ///
    /// The phrase is trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// * `Error::Empty` - Nothing is left after trimming
    /// * `Error::TooLong` - More than 100 characters
    /// * `Error::NoLetters` - No alphabetic character to guess
    pub fn new(raw: &str) -> Result<Self, Error> {
        let text = raw.trim().to_lowercase();
        if text.is_empty() {
            return Err(Error::Empty);
        }
        if text.chars().count() > MAX_LENGTH {
            return Err(Error::TooLong);
        }
        if !text.chars().any(char::is_alphabetic) {
            return Err(Error::NoLetters);
        }

        Ok(Self {
            text,
            guessed: HashSet::new(),
        })
    }

    /// The full, unmasked phrase
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The phrase as the guesser currently sees it
    pub fn mask(&self) -> String {
        mask(&self.text, &self.guessed)
    }

    /// Reveals every position holding `letter`
    ///
    /// Returns `true` if the letter occurs in the phrase.
    pub fn reveal(&mut self, letter: char) -> bool {
        if !self.text.contains(letter) {
            return false;
        }
        self.guessed.insert(letter);
        true
    }

    /// Returns `true` once every letter of the phrase has been revealed
    pub fn is_revealed(&self) -> bool {
        self.text
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(|c| self.guessed.contains(&c))
    }
}
