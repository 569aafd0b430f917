//! Aggregate status reporting
//!
//! Read-only projections of the coordinator's state for the thin operator
//! surface. A status snapshot is built on demand, owns all its data, and
//! stays valid however the swarm moves on afterwards.

use serde::Serialize;
use serde_with::skip_serializing_none;

use super::swarm::{OpenQuestion, SessionPhase};

/// Aggregate bot counts across the swarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BotCounts {
    /// Bots on the roster, whatever their state
    pub total: usize,
    /// Bots admitted to the session
    pub joined: usize,
    /// Bots whose connection is still alive (connecting or joined)
    pub connected: usize,
}

/// The configuration block reported alongside the swarm status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    /// The session join code
    pub join_code: String,
    /// How many bots were requested
    pub bots_count: usize,
    /// Whether anti-detection mode is on
    pub stealth: bool,
    /// Whether bots carry random identities
    pub random_names: bool,
    /// The fixed base name (empty under random identities)
    pub base_name: String,
}

/// A point-in-time snapshot of the swarm for external reporting
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    /// The shared session phase
    pub phase: SessionPhase,
    /// Configuration of the current run; `None` before the first start
    pub config: Option<ConfigSummary>,
    /// Aggregate bot counts
    pub bots: BotCounts,
    /// The open question, if one exists swarm-wide
    pub current_question: Option<OpenQuestion>,
}

impl StatusView {
    /// Converts the snapshot to a JSON string for the operator surface
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_status_view_serializes_without_question() {
        let view = StatusView {
            phase: SessionPhase::Idle,
            config: None,
            bots: BotCounts {
                total: 0,
                joined: 0,
                connected: 0,
            },
            current_question: None,
        };

        let json = view.to_message();
        assert!(json.contains("Idle"));
        assert!(!json.contains("current_question"));
    }

    #[test]
    fn test_status_view_serializes_open_question() {
        let view = StatusView {
            phase: SessionPhase::QuestionOpen,
            config: None,
            bots: BotCounts {
                total: 3,
                joined: 3,
                connected: 3,
            },
            current_question: Some(OpenQuestion {
                choice_count: 4,
                answered: false,
            }),
        };

        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("choice_count"));
        assert!(json.contains("QuestionOpen"));
    }
}
