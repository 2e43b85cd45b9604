//! Communication session management
//!
//! This module defines the trait for tunneling messages between the game
//! engine and the connected clients, plus the [`Outbox`] that state
//! transitions fill with the messages they want delivered. Transitions never
//! talk to a tunnel directly; the session owner drains the outbox.

use crate::{game::UpdateMessage, watcher::Slot};

/// Trait for sending messages through a communication tunnel
///
/// This trait abstracts the communication mechanism used to send messages
/// to a connected client. Implementations might use WebSockets, Socket.IO
/// style event channels, or an in-memory queue in tests.
pub trait Tunnel {
    /// Sends an update message to the client
    fn send_message(&self, message: &UpdateMessage);
}

/// Who an outgoing message is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every registered participant
    Everyone,
    /// The participant occupying the given slot
    Slot(Slot),
}

/// A message paired with its recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Who should receive the message
    pub recipient: Recipient,
    /// The message itself
    pub message: UpdateMessage,
}

/// Ordered list of messages produced by a state transition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outbox(Vec<Envelope>);

impl Outbox {
    /// Queues a message for every participant
    pub fn to_everyone(&mut self, message: UpdateMessage) {
        self.0.push(Envelope {
            recipient: Recipient::Everyone,
            message,
        });
    }

    /// Queues a message for the participant in `slot`
    pub fn to_slot(&mut self, slot: Slot, message: UpdateMessage) {
        self.0.push(Envelope {
            recipient: Recipient::Slot(slot),
            message,
        });
    }

    /// Appends every envelope of `other`, keeping order
    pub fn append(&mut self, other: Outbox) {
        self.0.extend(other.0);
    }

    /// The queued envelopes in delivery order
    #[cfg(test)]
    pub fn envelopes(&self) -> &[Envelope] {
        &self.0
    }

    /// Messages a participant in `slot` would receive, in order
    #[cfg(test)]
    pub fn received_by(&self, slot: Slot) -> Vec<&UpdateMessage> {
        self.0
            .iter()
            .filter(|envelope| match envelope.recipient {
                Recipient::Everyone => true,
                Recipient::Slot(target) => target == slot,
            })
            .map(|envelope| &envelope.message)
            .collect()
    }

    /// Returns `true` if nothing was queued
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Outbox {
    type Item = Envelope;
    type IntoIter = std::vec::IntoIter<Envelope>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_outbox_preserves_order() {
        let mut outbox = Outbox::default();
        outbox.to_everyone(UpdateMessage::UpdateTries(9));
        outbox.to_slot(Slot::First, UpdateMessage::ShowPhraseInput);

        let recipients: Vec<_> = outbox.envelopes().iter().map(|e| e.recipient).collect();
        assert_eq!(
            recipients,
            vec![Recipient::Everyone, Recipient::Slot(Slot::First)]
        );
    }

    #[test]
    fn test_received_by_filters_targeted_messages() {
        let mut outbox = Outbox::default();
        outbox.to_slot(Slot::First, UpdateMessage::ShowGiverPhrase("cat".to_owned()));
        outbox.to_slot(Slot::Second, UpdateMessage::DisplayPhrase("___".to_owned()));
        outbox.to_everyone(UpdateMessage::UpdateTries(9));

        assert_eq!(
            outbox.received_by(Slot::Second),
            vec![
                &UpdateMessage::DisplayPhrase("___".to_owned()),
                &UpdateMessage::UpdateTries(9)
            ]
        );
    }

    #[test]
    fn test_append_and_empty() {
        let mut first = Outbox::default();
        assert!(first.is_empty());

        let mut second = Outbox::default();
        second.to_everyone(UpdateMessage::HideGuessInput);
        first.append(second);

        assert!(!first.is_empty());
        assert_eq!(first.into_iter().count(), 1);
    }
}
