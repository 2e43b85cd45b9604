//! Player name management and validation
//!
//! This module handles the assignment and validation of display names. It
//! keeps names unique between the two participants, filters inappropriate
//! content, and frees a name again when its owner leaves.

use std::collections::{HashMap, HashSet, hash_map::Entry};

use rustrict::CensorStr;
use serde::Serialize;
use thiserror::Error;

use super::{constants::names::MAX_LENGTH, watcher::Id};

/// Manages display names and their associations with participant IDs
#[derive(Debug, Default, Clone)]
pub struct Names {
    /// Mapping from participant ID to name
    mapping: HashMap<Id, String>,
    /// Set of all names in use for quick uniqueness checks
    existing: HashSet<String>,
}

/// Errors that can occur during name validation and assignment
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested name is already in use by the other player
    #[error("name already in-use")]
    Used,
    /// The player already has an assigned name
    #[error("player has an existing name")]
    Assigned,
    /// The name is empty or contains only whitespace
    #[error("name cannot be empty")]
    Empty,
    /// The name contains inappropriate content
    #[error("name is inappropriate")]
    Sinful,
    /// The name exceeds the maximum allowed length
    #[error("name is too long")]
    TooLong,
}

impl Names {
    /// Retrieves the name associated with a participant ID
    pub fn get_name(&self, id: &Id) -> Option<String> {
        self.mapping.get(id).map(std::borrow::ToOwned::to_owned)
    }

    /// Assigns a name to a participant after validation
    ///
    /// # Returns
    ///
    /// The trimmed and assigned name on success.
    ///
    /// # Errors
    ///
    /// * `Error::TooLong` - Name exceeds 30 characters
    /// * `Error::Empty` - Name is empty after trimming whitespace
    /// * `Error::Sinful` - Name contains inappropriate content
    /// * `Error::Assigned` - Participant already has a name assigned
    /// * `Error::Used` - Name is already taken by the other participant
    pub fn set_name(&mut self, id: Id, name: &str) -> Result<String, Error> {
        let name = rustrict::trim_whitespace(name);
        if name.chars().count() > MAX_LENGTH {
            return Err(Error::TooLong);
        }
        if name.is_empty() {
            return Err(Error::Empty);
        }
        if name.is_inappropriate() {
            return Err(Error::Sinful);
        }
        match self.mapping.entry(id) {
            Entry::Occupied(_) => Err(Error::Assigned),
            Entry::Vacant(v) => {
                if !self.existing.insert(name.to_owned()) {
                    return Err(Error::Used);
                }
                v.insert(name.to_owned());
                Ok(name.to_owned())
            }
        }
    }

    /// Forgets the name of a participant, making it available again
    pub fn remove(&mut self, id: &Id) -> Option<String> {
        let name = self.mapping.remove(id)?;
        self.existing.remove(&name);
        Some(name)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_names_set_and_get() {
        let mut names = Names::default();
        let id = Id::new();

        let result = names.set_name(id, "TestPlayer");
        assert_eq!(result, Ok("TestPlayer".to_string()));
        assert_eq!(names.get_name(&id), Some("TestPlayer".to_string()));
    }

    #[test]
    fn test_names_too_long() {
        let mut names = Names::default();
        let id = Id::new();

        assert_eq!(names.set_name(id, &"a".repeat(31)), Err(Error::TooLong));
        assert!(names.set_name(id, &"a".repeat(30)).is_ok());
    }

    #[test]
    fn test_names_empty_name() {
        let mut names = Names::default();
        let id = Id::new();

        assert_eq!(names.set_name(id, ""), Err(Error::Empty));
        assert_eq!(names.set_name(id, "   "), Err(Error::Empty));
        assert_eq!(names.set_name(id, "\t\n"), Err(Error::Empty));
    }

    #[test]
    fn test_names_whitespace_trimming() {
        let mut names = Names::default();
        let id = Id::new();

        assert_eq!(names.set_name(id, "  Alice  "), Ok("Alice".to_string()));
        assert_eq!(names.get_name(&id), Some("Alice".to_string()));
    }

    #[test]
    fn test_names_duplicate_error() {
        let mut names = Names::default();
        let id1 = Id::new();
        let id2 = Id::new();

        names.set_name(id1, "Player").unwrap();
        assert_eq!(names.set_name(id2, "Player"), Err(Error::Used));
        assert_eq!(names.set_name(id2, "  Player  "), Err(Error::Used));
    }

    #[test]
    fn test_names_already_assigned_error() {
        let mut names = Names::default();
        let id = Id::new();

        names.set_name(id, "FirstName").unwrap();
        assert_eq!(names.set_name(id, "SecondName"), Err(Error::Assigned));
        assert_eq!(names.get_name(&id), Some("FirstName".to_string()));

        // A rejected rename must not reserve the new name
        let other = Id::new();
        assert!(names.set_name(other, "SecondName").is_ok());
    }

    #[test]
    fn test_names_inappropriate_content() {
        let mut names = Names::default();
        let id = Id::new();

        for name in ["fuck", "shit"] {
            assert_eq!(
                names.set_name(id, name),
                Err(Error::Sinful),
                "Expected '{name}' to be flagged as inappropriate"
            );
        }
    }

    #[test]
    fn test_names_remove_frees_name() {
        let mut names = Names::default();
        let id1 = Id::new();
        let id2 = Id::new();

        names.set_name(id1, "Alice").unwrap();
        assert_eq!(names.remove(&id1), Some("Alice".to_string()));
        assert_eq!(names.get_name(&id1), None);
        assert_eq!(names.remove(&id1), None);

        assert!(names.set_name(id2, "Alice").is_ok());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Used.to_string(), "name already in-use");
        assert_eq!(Error::Assigned.to_string(), "player has an existing name");
        assert_eq!(Error::Empty.to_string(), "name cannot be empty");
        assert_eq!(Error::Sinful.to_string(), "name is inappropriate");
        assert_eq!(Error::TooLong.to_string(), "name is too long");
    }
}
