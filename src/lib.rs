//! # Quizswarm Coordination Library
//!
//! This library provides the coordination core for a swarm of independent
//! quiz-session bots that join the same live session and submit
//! synchronized answers. It handles bot lifecycle management (spawn,
//! retry-on-duplicate, opt-in reconnect), the leader-driven question state
//! machine, jittered answer fan-out, brute-force auth challenge solving,
//! and the aggregate status view consumed by a thin operator surface.
//!
//! The crate is sans-io: the quiz wire protocol lives behind the
//! [`session::SessionClient`] trait, fresh clients come from an injected
//! connector closure, and deferred work is armed through an injected
//! scheduler closure and later delivered back as an [`AlarmMessage`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

use serde::{Deserialize, Serialize};

pub mod constants;

pub mod challenge;
pub mod config;
pub mod names;
pub mod participant;
pub mod session;
pub mod status;
pub mod swarm;

/// Messages scheduled for deferred delivery back into the coordinator
///
/// The embedding layer arms a timer per message and feeds the message to
/// [`swarm::SwarmCoordinator::receive_alarm`] when it fires. Stale messages
/// are harmless: the coordinator re-validates every alarm against its
/// current state, which is how canceled timers are expressed.
#[derive(Debug, Clone, derive_more::From, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Challenge solving ticks
    Challenge(challenge::AlarmMessage),
    /// Swarm-level deferred work (jittered answer submissions)
    Swarm(swarm::AlarmMessage),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::participant::ParticipantId;

    #[test]
    fn test_alarm_message_from_conversions() {
        let tick: AlarmMessage = challenge::AlarmMessage::Tick {
            participant: ParticipantId::new(0),
            generation: 1,
        }
        .into();
        assert!(matches!(tick, AlarmMessage::Challenge(_)));

        let submit: AlarmMessage = swarm::AlarmMessage::SubmitAnswer {
            participant: ParticipantId::new(2),
            choice: 1,
            generation: 1,
        }
        .into();
        assert!(matches!(submit, AlarmMessage::Swarm(_)));
    }

    #[test]
    fn test_alarm_message_round_trips_through_json() {
        let message: AlarmMessage = swarm::AlarmMessage::SubmitAnswer {
            participant: ParticipantId::new(5),
            choice: 3,
            generation: 2,
        }
        .into();

        let json = serde_json::to_string(&message).expect("default serializer cannot fail");
        let back: AlarmMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            back,
            AlarmMessage::Swarm(swarm::AlarmMessage::SubmitAnswer { choice: 3, .. })
        ));
    }
}
