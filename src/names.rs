//! Bot display name generation
//!
//! This module produces the display names bots present to the quiz session.
//! Fixed-identity swarms derive names from a shared base name plus the bot's
//! index, while random-identity swarms draw a fresh name per bot from a
//! configurable naming style. It also generates the auxiliary identity pair
//! sent alongside the display name during the join handshake.

use heck::ToTitleCase;
use serde::{Deserialize, Serialize};

use super::participant::ParticipantId;

/// Defines the style of automatically generated bot names
///
/// When random identities are enabled, this enum determines what type of
/// names are generated for the bots in the swarm.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, garde::Validate)]
pub enum NameStyle {
    /// Roman-style names (praenomen + nomen, optionally + cognomen)
    Roman(#[garde(range(min = 2, max = 3))] usize),
    /// Pet-style names (adjective + animal combinations)
    Petname(#[garde(range(min = 2, max = 3))] usize),
}

impl Default for NameStyle {
    /// Default name style is Petname with 2 words
    fn default() -> Self {
        Self::Petname(2)
    }
}

impl NameStyle {
    /// Generates a random name according to this style
    ///
    /// # Returns
    ///
    /// A randomly generated name as a String.
    pub fn get_name(&self) -> String {
        match self {
            Self::Roman(count) => romanname::romanname(romanname::NameConfig {
                praenomen: *count > 2,
            }),
            Self::Petname(count) => petname::petname(*count as u8, " ").unwrap_or_default(),
        }
        .to_title_case()
    }
}

/// Computes the display name for a fixed-identity bot
///
/// Fixed identities append the bot's numeric id to the shared base name,
/// so a swarm started with base name `"Bot"` produces `Bot0`, `Bot1`, ...
pub fn indexed_name(base: &str, id: ParticipantId) -> String {
    format!("{base}{id}")
}

/// Generates the auxiliary identity pair sent during the join handshake
///
/// The session protocol expects a secondary identity alongside the display
/// name; a two-word pet name split into its halves serves as one.
pub fn auxiliary_identity() -> (String, String) {
    let mut words = petname::petname(2, " ")
        .unwrap_or_default()
        .to_title_case()
        .split_whitespace()
        .map(ToOwned::to_owned)
        .collect::<Vec<_>>()
        .into_iter();

    (
        words.next().unwrap_or_default(),
        words.next().unwrap_or_default(),
    )
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_petname_style_produces_name() {
        let name = NameStyle::Petname(2).get_name();
        assert!(!name.is_empty());
        assert_eq!(name.split_whitespace().count(), 2);
    }

    #[test]
    fn test_roman_style_produces_name() {
        let name = NameStyle::Roman(2).get_name();
        assert!(!name.is_empty());
    }

    #[test]
    fn test_default_style_is_petname() {
        assert!(matches!(NameStyle::default(), NameStyle::Petname(2)));
    }

    #[test]
    fn test_indexed_name_appends_id() {
        assert_eq!(indexed_name("Bot", ParticipantId::new(7)), "Bot7");
        assert_eq!(indexed_name("Bot", ParticipantId::new(0)), "Bot0");
    }

    #[test]
    fn test_auxiliary_identity_has_two_parts() {
        let (first, last) = auxiliary_identity();
        assert!(!first.is_empty());
        assert!(!last.is_empty());
    }
}
