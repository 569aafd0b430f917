//! Swarm coordination core
//!
//! This module contains the coordinator that owns the whole swarm: the bot
//! roster, the designated leader, and the shared session phase and open
//! question. All mutation funnels through three operations (`start`, the
//! per-bot event entrypoint, and the answer commit), each taking `&mut self`
//! so at most one mutation is ever in flight; `status` reads a snapshot
//! without blocking or mutating.
//!
//! Phase and question state move only on events from the leader bot;
//! events from every other bot are bookkeeping only. Deferred work
//! (challenge ticks, jittered answer submissions) is scheduled through the
//! injected `schedule_message` closure and carries the swarm generation, so
//! a reset cancels everything outstanding by making it stale.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use web_time::Duration;

use super::{
    challenge,
    config::{AnswerPolicy, ConfigError, ResolvedConfig, SwarmConfig},
    constants,
    names,
    participant::{Participant, ParticipantId},
    session::{DisconnectReason, JoinRequest, QuestionKind, SessionClient, SessionEvent},
    status::{BotCounts, StatusView},
};

/// The shared phase of the quiz session as observed through the leader
///
/// A single value owned exclusively by the coordinator; only leader events
/// (and the answer commit) move it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No swarm has been started yet
    Idle,
    /// Bots are joining, or the swarm awaits the next question
    Joining,
    /// A question is open and awaiting an answer decision
    QuestionOpen,
    /// The decided answer is committed; awaiting the question's end
    QuestionClosed,
    /// The session finished
    Finished,
}

/// The question currently open on the session, as seen by the leader
///
/// At most one exists swarm-wide; it is created and cleared atomically with
/// the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenQuestion {
    /// Number of answer choices the question offers
    pub choice_count: usize,
    /// Whether an answer has already been committed for it
    pub answered: bool,
}

/// Alarm messages for deferred swarm work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Deliver the committed answer for one bot after its jitter delay
    SubmitAnswer {
        /// The bot that should submit
        participant: ParticipantId,
        /// The committed choice index
        choice: usize,
        /// Swarm generation the submission belongs to; stale ones are dropped
        generation: u64,
    },
}

/// Errors rejecting an answer command
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerError {
    /// No question is open, or the open question is already answered
    #[error("no open question or already answered")]
    NoOpenQuestion,
}

/// Coordinates a swarm of session bots joined to one live quiz
///
/// Owns the bot roster, the leader designation, and the shared
/// phase/question state. IO is injected per call: a connector closure
/// creates fresh session clients, and a schedule closure arms deferred
/// alarms that the embedding layer later feeds back via
/// [`SwarmCoordinator::receive_alarm`].
#[derive(Debug)]
pub struct SwarmCoordinator<C> {
    config: Option<ResolvedConfig>,
    phase: SessionPhase,
    leader_id: ParticipantId,
    participants: Vec<Participant<C>>,
    current_question: Option<OpenQuestion>,
    generation: u64,
}

impl<C> SwarmCoordinator<C> {
    /// Creates an idle coordinator with no swarm running
    pub fn new() -> Self {
        Self {
            config: None,
            phase: SessionPhase::Idle,
            leader_id: ParticipantId::new(0),
            participants: Vec::new(),
            current_question: None,
            generation: 0,
        }
    }

    /// The bot whose events drive the shared phase
    pub fn leader_id(&self) -> ParticipantId {
        self.leader_id
    }

    /// Reassigns the leader
    ///
    /// Nothing reassigns the leader automatically: if the leader
    /// disconnects mid-quiz, phase tracking stalls until the operator
    /// intervenes or the swarm restarts.
    pub fn set_leader(&mut self, id: ParticipantId) {
        self.leader_id = id;
    }
}

impl<C> Default for SwarmCoordinator<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: SessionClient> SwarmCoordinator<C> {
    /// Starts a swarm, replacing any previous run
    ///
    /// Validates and resolves the configuration first; on failure the prior
    /// state is untouched. On success the previous bots are asked to leave
    /// (advisory cleanup, leave cannot fail), all outstanding timers are
    /// invalidated, and `bots_count` fresh bots with ids `0..bots_count`
    /// are spawned synchronously, each issuing its join immediately.
    ///
    /// # Arguments
    ///
    /// * `config` - The operator-supplied swarm configuration
    /// * `connector` - Closure creating a fresh session client per bot
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration is invalid.
    pub fn start<F: FnMut(&JoinRequest) -> C>(
        &mut self,
        config: &SwarmConfig,
        mut connector: F,
    ) -> Result<(), ConfigError> {
        let resolved = config.resolve()?;

        // Bumping the generation makes every outstanding alarm stale.
        self.generation = self.generation.wrapping_add(1);
        for participant in self.participants.drain(..) {
            participant.into_client().leave();
        }
        self.current_question = None;
        self.phase = SessionPhase::Joining;

        info!(
            join_code = %resolved.join_code,
            bots = resolved.bots_count,
            stealth = resolved.stealth,
            random_names = resolved.identity.is_random(),
            "starting swarm"
        );

        for index in 0..resolved.bots_count {
            let id = ParticipantId::new(index);
            let request = JoinRequest {
                code: resolved.join_code.clone(),
                name: resolved.identity.display_name(id),
                auxiliary: names::auxiliary_identity(),
            };
            self.participants
                .push(Participant::connect(id, &request, 0, &mut connector));
        }

        self.config = Some(resolved);
        Ok(())
    }

    /// The single mutation entrypoint for bot lifecycle events
    ///
    /// Events from one bot arrive in order; no cross-bot ordering is
    /// assumed. Phase and question state move only when the sending bot is
    /// the leader. Join rejections arrive here as [`SessionEvent::Disconnected`]
    /// and drive the duplicate-identity retry (random identities only) and
    /// the opt-in rejoin-on-drop path.
    ///
    /// # Arguments
    ///
    /// * `participant_id` - The bot the event originated from
    /// * `event` - The lifecycle event
    /// * `connector` - Closure creating a fresh session client on retry
    /// * `schedule_message` - Closure arming deferred alarms
    pub fn on_participant_event<F, S>(
        &mut self,
        participant_id: ParticipantId,
        event: SessionEvent,
        mut connector: F,
        mut schedule_message: S,
    ) where
        F: FnMut(&JoinRequest) -> C,
        S: FnMut(crate::AlarmMessage, Duration),
    {
        let Some(config) = self.config.as_ref() else {
            debug!(%participant_id, "event before start ignored");
            return;
        };
        let auto_solve = config.auto_solve_challenge;
        let answer_policy = config.answer_policy;
        let rejoin_on_drop = config.rejoin_on_drop;
        let random_identity = config.identity.is_random();
        let bots_count = config.bots_count;

        let Some(index) = self
            .participants
            .iter()
            .position(|participant| participant.id() == participant_id)
        else {
            debug!(%participant_id, "event for unknown bot ignored");
            return;
        };

        match event {
            SessionEvent::Joined { challenge_required } => {
                if let Some(participant) = self.participants.get_mut(index) {
                    participant.mark_joined();
                    info!(
                        %participant_id,
                        name = participant.name(),
                        challenge_required,
                        "bot joined"
                    );
                }
                if challenge_required && auto_solve {
                    self.begin_challenge(index, &mut schedule_message);
                }
                let joined = self
                    .participants
                    .iter()
                    .filter(|participant| participant.is_joined())
                    .count();
                if joined == bots_count {
                    info!("all {joined} bots joined, waiting for the first question");
                }
            }
            SessionEvent::ChallengeIssued => {
                if auto_solve {
                    self.begin_challenge(index, &mut schedule_message);
                } else {
                    debug!(%participant_id, "challenge issued but auto-solve is off");
                }
            }
            SessionEvent::ChallengeConfirmed => {
                if let Some(solver) = self
                    .participants
                    .get_mut(index)
                    .and_then(Participant::solver_mut)
                {
                    solver.confirm();
                    info!(%participant_id, "challenge pattern confirmed");
                }
            }
            SessionEvent::QuestionReady { kind, choice_count } => {
                if participant_id != self.leader_id {
                    return;
                }
                if !matches!(kind, QuestionKind::Quiz) {
                    debug!(?kind, "non-quiz question ignored");
                    return;
                }
                if choice_count < constants::swarm::MIN_CHOICE_COUNT {
                    warn!(choice_count, "question with too few choices ignored");
                    return;
                }
                self.current_question = Some(OpenQuestion {
                    choice_count,
                    answered: false,
                });
                self.phase = SessionPhase::QuestionOpen;
                info!(choice_count, "question open, awaiting answer");

                if matches!(answer_policy, AnswerPolicy::Random) {
                    let choice = fastrand::usize(0..choice_count);
                    info!(choice, "auto policy picked a random answer");
                    // The question just opened unanswered, so this cannot fail.
                    let _ = self.commit_answer(choice, &mut schedule_message);
                }
            }
            SessionEvent::QuestionEnded { correct } => {
                if participant_id != self.leader_id {
                    return;
                }
                info!(correct, "question ended");
                self.current_question = None;
                self.phase = SessionPhase::Joining;
            }
            SessionEvent::SessionEnded { rank } => {
                if participant_id != self.leader_id {
                    return;
                }
                info!(rank, "session ended");
                self.current_question = None;
                self.phase = SessionPhase::Finished;
            }
            SessionEvent::Disconnected { reason } => {
                if let Some(participant) = self.participants.get_mut(index) {
                    participant.mark_disconnected();
                    warn!(
                        %participant_id,
                        name = participant.name(),
                        ?reason,
                        "bot disconnected"
                    );
                }
                match reason {
                    DisconnectReason::DuplicateIdentity if random_identity => {
                        info!(%participant_id, "duplicate identity, retrying with a fresh name");
                        self.replace_participant(index, &mut connector);
                    }
                    DisconnectReason::Other(_) if rejoin_on_drop => {
                        info!(%participant_id, "rejoin-on-drop enabled, reconnecting");
                        self.replace_participant(index, &mut connector);
                    }
                    _ => {}
                }
            }
        }
    }

    /// Commits an answer for the open question and fans it out
    ///
    /// The question is marked answered immediately, so a second call before
    /// the next question opens is rejected. Every joined-and-connected bot
    /// gets one submission alarm with an independent jitter delay drawn
    /// uniformly from the configured range; bots that are disconnected get
    /// none. A single bot's later submission failure never affects its
    /// siblings or the committed answer.
    ///
    /// # Arguments
    ///
    /// * `choice` - The answer choice index to submit swarm-wide
    /// * `schedule_message` - Closure arming the jittered submission alarms
    ///
    /// # Errors
    ///
    /// Returns [`AnswerError::NoOpenQuestion`] when no question is open or
    /// the open question is already answered.
    pub fn submit_answer<S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        choice: usize,
        mut schedule_message: S,
    ) -> Result<(), AnswerError> {
        self.commit_answer(choice, &mut schedule_message)
    }

    /// Handles a fired alarm
    ///
    /// Alarms scheduled before the most recent `start` carry an older
    /// generation and are dropped, as are alarms whose bot has since
    /// disconnected; that is how cancellation works. Challenge ticks re-arm
    /// themselves for as long as their solver lives.
    pub fn receive_alarm<S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        message: &crate::AlarmMessage,
        mut schedule_message: S,
    ) {
        match *message {
            crate::AlarmMessage::Challenge(challenge::AlarmMessage::Tick {
                participant,
                generation,
            }) => {
                if generation != self.generation {
                    return;
                }
                let Some(bot) = self
                    .participants
                    .iter_mut()
                    .find(|candidate| candidate.id() == participant)
                else {
                    return;
                };
                if !bot.is_connected() {
                    return;
                }
                let Some(solver) = bot.solver_mut() else {
                    return;
                };
                let guess = solver.next_guess();
                if let Err(error) = bot.client_mut().submit_challenge_guess(guess) {
                    warn!(%participant, %error, "challenge guess submission failed");
                }
                schedule_message(
                    challenge::AlarmMessage::Tick {
                        participant,
                        generation,
                    }
                    .into(),
                    Duration::from_millis(constants::challenge::TICK_MILLIS),
                );
            }
            crate::AlarmMessage::Swarm(AlarmMessage::SubmitAnswer {
                participant,
                choice,
                generation,
            }) => {
                if generation != self.generation {
                    return;
                }
                let Some(bot) = self
                    .participants
                    .iter_mut()
                    .find(|candidate| candidate.id() == participant)
                else {
                    return;
                };
                if !bot.is_joined() || !bot.is_connected() {
                    return;
                }
                if let Err(error) = bot.client_mut().submit_answer(choice) {
                    warn!(%participant, choice, %error, "answer submission failed");
                }
            }
        }
    }

    /// Builds a read-only snapshot of the swarm for external reporting
    ///
    /// Never blocks and never mutates.
    pub fn status(&self) -> StatusView {
        StatusView {
            phase: self.phase,
            config: self.config.as_ref().map(ResolvedConfig::summary),
            bots: BotCounts {
                total: self.participants.len(),
                joined: self
                    .participants
                    .iter()
                    .filter(|participant| participant.is_joined())
                    .count(),
                connected: self
                    .participants
                    .iter()
                    .filter(|participant| participant.is_connected())
                    .count(),
            },
            current_question: self.current_question,
        }
    }

    /// Replaces the bot at `index` with a fresh client under the same id
    ///
    /// The new bot gets a name per the identity mode (a fresh draw under
    /// random identities), an incremented retry count, and issues its join
    /// immediately. The old client is discarded; its connection already
    /// ended.
    fn replace_participant<F: FnMut(&JoinRequest) -> C>(&mut self, index: usize, connector: &mut F) {
        let Some(config) = self.config.as_ref() else {
            return;
        };
        let Some(old) = self.participants.get(index) else {
            return;
        };

        let id = old.id();
        let attempt = old.retries() + 1;
        let request = JoinRequest {
            code: config.join_code.clone(),
            name: config.identity.display_name(id),
            auxiliary: names::auxiliary_identity(),
        };

        let replacement = Participant::connect(id, &request, attempt, connector);
        if let Some(slot) = self.participants.get_mut(index) {
            *slot = replacement;
        }
    }

    /// Starts challenge solving for the bot at `index` and arms its tick
    ///
    /// Idempotent: a bot already solving keeps its running tick.
    fn begin_challenge<S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        index: usize,
        schedule_message: &mut S,
    ) {
        let generation = self.generation;
        let Some(participant) = self.participants.get_mut(index) else {
            return;
        };
        if !participant.start_solver() {
            return;
        }
        debug!(participant = %participant.id(), "challenge solver started");
        schedule_message(
            challenge::AlarmMessage::Tick {
                participant: participant.id(),
                generation,
            }
            .into(),
            Duration::from_millis(constants::challenge::TICK_MILLIS),
        );
    }

    fn commit_answer<S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        choice: usize,
        schedule_message: &mut S,
    ) -> Result<(), AnswerError> {
        match self.current_question.as_mut() {
            Some(question) if !question.answered => question.answered = true,
            _ => return Err(AnswerError::NoOpenQuestion),
        }
        self.phase = SessionPhase::QuestionClosed;

        let generation = self.generation;
        let mut scheduled = 0usize;
        for participant in self
            .participants
            .iter()
            .filter(|participant| participant.is_joined() && participant.is_connected())
        {
            let jitter =
                fastrand::u64(constants::jitter::MIN_MILLIS..=constants::jitter::MAX_MILLIS);
            schedule_message(
                AlarmMessage::SubmitAnswer {
                    participant: participant.id(),
                    choice,
                    generation,
                }
                .into(),
                Duration::from_millis(jitter),
            );
            scheduled += 1;
        }

        info!(choice, scheduled, "answer committed and fanned out");
        Ok(())
    }
}
