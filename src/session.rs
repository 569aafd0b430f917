//! Quiz session client abstraction
//!
//! This module defines the trait for driving one bot's connection to the
//! live quiz session, along with the event vocabulary the embedding layer
//! feeds back into the coordinator. The client abstraction keeps the wire
//! protocol out of the coordination core: implementations might speak a
//! WebSocket protocol, a vendor SDK, or a test double.
//!
//! All inbound protocol traffic is expressed as [`SessionEvent`] values and
//! delivered through the coordinator's single mutation entrypoint; the trait
//! itself carries only outbound commands.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::challenge::ChallengeGuess;

/// The parameters a bot presents when joining a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    /// The session join code
    pub code: String,
    /// The bot's display name
    pub name: String,
    /// Auxiliary identity pair sent alongside the display name
    pub auxiliary: (String, String),
}

/// Trait for driving one bot's session connection
///
/// A client is created per bot by a connector closure and owned by its
/// bot for as long as that identity lives; on a duplicate-identity retry
/// the old client is discarded wholesale and a fresh one created.
pub trait SessionClient {
    /// Begins joining the session
    ///
    /// Joining is asynchronous on the wire; the outcome arrives later as a
    /// [`SessionEvent::Joined`] or [`SessionEvent::Disconnected`] event.
    fn join(&mut self, request: &JoinRequest);

    /// Submits a guess for an outstanding auth challenge
    ///
    /// # Errors
    ///
    /// Returns a [`SubmitError`] if the session rejects the submission or
    /// the connection is gone. Failures are per-bot and never fatal.
    fn submit_challenge_guess(&mut self, guess: ChallengeGuess) -> Result<(), SubmitError>;

    /// Submits an answer to the currently open question by choice index
    ///
    /// # Errors
    ///
    /// Returns a [`SubmitError`] if the session rejects the submission or
    /// the connection is gone. Failures are per-bot and never fatal.
    fn submit_answer(&mut self, choice: usize) -> Result<(), SubmitError>;

    /// Leaves the session and releases the connection
    ///
    /// Leaving is advisory cleanup; it cannot fail from the coordinator's
    /// point of view.
    fn leave(self);
}

/// Why a bot's connection ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisconnectReason {
    /// Another participant already holds this display name
    DuplicateIdentity,
    /// The session is locked to new participants
    SessionLocked,
    /// No session exists for the presented join code
    SessionNotFound,
    /// Any other drop, kick, or transport failure
    Other(String),
}

/// Lifecycle events emitted by a bot's session connection
///
/// The embedding layer translates protocol traffic into these events and
/// delivers them, per bot and in arrival order, to the coordinator. Join
/// failures arrive as [`SessionEvent::Disconnected`] carrying the reason,
/// so the coordinator has exactly one mutation entrypoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The bot was admitted to the session
    Joined {
        /// Whether the session demands an auth challenge before play
        challenge_required: bool,
    },
    /// The session issued an auth challenge to this bot
    ChallengeIssued,
    /// The session accepted this bot's challenge guess
    ChallengeConfirmed,
    /// A question opened on the session
    QuestionReady {
        /// What kind of question opened; only quiz questions are answerable
        kind: QuestionKind,
        /// Number of answer choices offered
        choice_count: usize,
    },
    /// The open question closed
    QuestionEnded {
        /// Whether this bot's answer was correct
        correct: bool,
    },
    /// The whole session finished
    SessionEnded {
        /// This bot's final rank
        rank: usize,
    },
    /// The connection dropped or the join was rejected
    Disconnected {
        /// Why the connection ended
        reason: DisconnectReason,
    },
}

/// The kind of question a session presents
///
/// Only [`QuestionKind::Quiz`] questions carry answerable choices; the
/// other kinds are display-only and never open a question swarm-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    /// A scored multiple-choice question
    Quiz,
    /// An unscored poll
    Survey,
    /// A content-only slide
    Content,
    /// Any question kind this crate does not model
    Other,
}

/// Errors returned when the session rejects an outbound submission
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The session rejected the submission
    #[error("submission rejected by session: {0}")]
    Rejected(String),
    /// The connection is no longer alive
    #[error("client is not connected")]
    NotConnected,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_session_event_serializes() {
        let event = SessionEvent::QuestionReady {
            kind: QuestionKind::Quiz,
            choice_count: 4,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("QuestionReady"));
        assert!(json.contains('4'));
    }

    #[test]
    fn test_disconnect_reason_round_trips() {
        let reason = DisconnectReason::Other("kicked".to_string());
        let json = serde_json::to_string(&reason).unwrap();
        let back: DisconnectReason = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reason);
    }
}
