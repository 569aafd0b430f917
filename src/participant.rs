//! Per-bot identity and lifecycle state
//!
//! Each bot in the swarm is a participant: a stable numeric id, a display
//! name, a connection status, and an owned session client. The id never
//! changes for the swarm's lifetime; the name and client may be replaced
//! wholesale when a duplicate-identity retry or an opt-in rejoin creates a
//! fresh connection under the same id. A participant is never removed
//! merely because it disconnected; it stays on the roster for status
//! accounting until the swarm resets.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{
    challenge::ChallengeSolver,
    session::{JoinRequest, SessionClient},
};

/// A stable numeric identifier for a bot in the swarm
///
/// Ids are dense: a swarm of `n` bots uses exactly `0..n`. The id survives
/// name retries and reconnects.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ParticipantId(usize);

impl ParticipantId {
    /// Creates an id from a swarm slot index
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The swarm slot index this id occupies
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The connection status of one bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Join issued, admission pending
    Connecting,
    /// Admitted to the session
    Joined,
    /// Connection ended; terminal unless a retry replaces this bot
    Disconnected,
}

/// One bot: identity, connection status, and its owned session client
#[derive(Debug)]
pub struct Participant<C> {
    id: ParticipantId,
    name: String,
    status: ConnectionStatus,
    retries: u32,
    solver: Option<ChallengeSolver>,
    client: C,
}

impl<C: SessionClient> Participant<C> {
    /// Creates a participant and issues its join
    ///
    /// The connector opens a fresh client for the request; the join outcome
    /// arrives later as a session event.
    ///
    /// # Arguments
    ///
    /// * `id` - The stable slot id this participant occupies
    /// * `request` - The join parameters, including the display name
    /// * `attempt` - How many earlier clients this id has burned through
    /// * `connector` - Closure creating a fresh session client
    pub fn connect<F: FnMut(&JoinRequest) -> C>(
        id: ParticipantId,
        request: &JoinRequest,
        attempt: u32,
        connector: &mut F,
    ) -> Self {
        let mut client = connector(request);
        client.join(request);

        Self {
            id,
            name: request.name.clone(),
            status: ConnectionStatus::Connecting,
            retries: attempt,
            solver: None,
            client,
        }
    }

    /// This bot's stable id
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// This bot's current display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This bot's connection status
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Whether the bot has been admitted to the session
    pub fn is_joined(&self) -> bool {
        matches!(self.status, ConnectionStatus::Joined)
    }

    /// Whether the bot's connection is still alive
    pub fn is_connected(&self) -> bool {
        !matches!(self.status, ConnectionStatus::Disconnected)
    }

    /// How many replacement clients this id has required
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Marks the bot admitted
    pub(crate) fn mark_joined(&mut self) {
        self.status = ConnectionStatus::Joined;
    }

    /// Marks the bot's connection ended and drops any outstanding solver
    pub(crate) fn mark_disconnected(&mut self) {
        self.status = ConnectionStatus::Disconnected;
        self.solver = None;
    }

    /// Begins challenge solving for this bot; idempotent
    ///
    /// Returns `true` if a solver was freshly started, `false` if one was
    /// already running.
    pub(crate) fn start_solver(&mut self) -> bool {
        if self.solver.is_some() {
            return false;
        }
        let mut solver = ChallengeSolver::new();
        solver.begin();
        self.solver = Some(solver);
        true
    }

    /// The outstanding challenge solver, if any
    pub(crate) fn solver_mut(&mut self) -> Option<&mut ChallengeSolver> {
        self.solver.as_mut()
    }

    /// Mutable access to the owned session client
    pub(crate) fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Consumes the participant, yielding its client for cleanup
    pub(crate) fn into_client(self) -> C {
        self.client
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{challenge::ChallengeGuess, session::SubmitError};
    use std::{cell::RefCell, rc::Rc};

    #[derive(Debug, Clone, Default)]
    struct MockClient {
        joins: Rc<RefCell<Vec<JoinRequest>>>,
    }

    impl SessionClient for MockClient {
        fn join(&mut self, request: &JoinRequest) {
            self.joins.borrow_mut().push(request.clone());
        }

        fn submit_challenge_guess(&mut self, _guess: ChallengeGuess) -> Result<(), SubmitError> {
            Ok(())
        }

        fn submit_answer(&mut self, _choice: usize) -> Result<(), SubmitError> {
            Ok(())
        }

        fn leave(self) {}
    }

    fn request(name: &str) -> JoinRequest {
        JoinRequest {
            code: "123456".to_string(),
            name: name.to_string(),
            auxiliary: ("Snug".to_string(), "Otter".to_string()),
        }
    }

    #[test]
    fn test_connect_issues_join() {
        let joins = Rc::new(RefCell::new(Vec::new()));
        let mut connector = |_request: &JoinRequest| MockClient {
            joins: Rc::clone(&joins),
        };

        let participant =
            Participant::connect(ParticipantId::new(3), &request("Bot3"), 0, &mut connector);

        assert_eq!(participant.id(), ParticipantId::new(3));
        assert_eq!(participant.name(), "Bot3");
        assert_eq!(participant.status(), ConnectionStatus::Connecting);
        assert_eq!(joins.borrow().len(), 1);
        assert_eq!(joins.borrow()[0].name, "Bot3");
    }

    #[test]
    fn test_status_transitions() {
        let mut connector = |_request: &JoinRequest| MockClient::default();
        let mut participant =
            Participant::connect(ParticipantId::new(0), &request("Bot0"), 0, &mut connector);

        assert!(participant.is_connected());
        assert!(!participant.is_joined());

        participant.mark_joined();
        assert!(participant.is_joined());

        participant.mark_disconnected();
        assert!(!participant.is_joined());
        assert!(!participant.is_connected());
    }

    #[test]
    fn test_disconnect_drops_solver() {
        let mut connector = |_request: &JoinRequest| MockClient::default();
        let mut participant =
            Participant::connect(ParticipantId::new(0), &request("Bot0"), 0, &mut connector);

        assert!(participant.start_solver());
        assert!(!participant.start_solver());
        assert!(participant.solver_mut().is_some());

        participant.mark_disconnected();
        assert!(participant.solver_mut().is_none());
    }
}
