//! Swarm configuration and validation
//!
//! This module defines the operator-facing configuration for a swarm run
//! and the resolution step that turns it into the immutable settings a
//! running swarm follows. Resolution enforces the cross-field identity
//! rules: anti-detection mode always forces random identities, and a
//! fixed-identity swarm must carry a base name.

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    constants, names::NameStyle, participant::ParticipantId, status::ConfigSummary,
};

/// How the swarm decides what each bot answers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerPolicy {
    /// The operator supplies every answer through `submit_answer`
    #[default]
    Manual,
    /// The coordinator commits a uniformly random choice as soon as the
    /// leader observes a question open
    Random,
}

/// Operator-supplied configuration for starting a swarm
///
/// # Examples
///
/// ```rust
/// use quizswarm::config::SwarmConfig;
/// use quizswarm::names::NameStyle;
///
/// let config = SwarmConfig {
///     join_code: "123456".to_string(),
///     bots_count: 3,
///     random_names: Some(NameStyle::default()),
///     ..SwarmConfig::default()
/// };
/// assert!(config.resolve().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SwarmConfig {
    /// The session join code
    #[garde(length(min = 1, max = constants::swarm::MAX_JOIN_CODE_LENGTH))]
    pub join_code: String,
    /// How many bots to spawn
    #[garde(range(min = 1, max = constants::swarm::MAX_SWARM_SIZE))]
    pub bots_count: usize,
    /// Anti-detection mode; forces random identities regardless of the
    /// other naming fields
    #[garde(skip)]
    pub stealth: bool,
    /// Style for randomly generated bot names; `None` requests fixed
    /// base-name identities
    #[garde(dive)]
    pub random_names: Option<NameStyle>,
    /// Shared base name for fixed identities (ignored when names are random)
    #[garde(length(max = constants::swarm::MAX_BASE_NAME_LENGTH))]
    pub base_name: String,
    /// Whether bots brute-force auth challenges automatically
    #[garde(skip)]
    pub auto_solve_challenge: bool,
    /// How answers are decided
    #[garde(skip)]
    pub answer_policy: AnswerPolicy,
    /// Whether a bot whose connection drops for a non-terminal reason is
    /// replaced with a fresh join under the same id
    #[garde(skip)]
    pub rejoin_on_drop: bool,
}

/// How bots derive their display names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IdentityMode {
    /// Base name plus the bot's numeric id
    Fixed {
        /// The shared base name
        base: String,
    },
    /// A fresh random name per bot (and per retry)
    Random(NameStyle),
}

impl IdentityMode {
    /// Whether this mode draws a fresh name per bot
    pub fn is_random(&self) -> bool {
        matches!(self, Self::Random(_))
    }

    /// Computes the display name for the bot occupying `id`
    pub fn display_name(&self, id: ParticipantId) -> String {
        match self {
            Self::Fixed { base } => super::names::indexed_name(base, id),
            Self::Random(style) => style.get_name(),
        }
    }
}

/// The immutable settings a running swarm follows
///
/// Produced by [`SwarmConfig::resolve`] when a swarm starts; never changes
/// until the next start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// The session join code
    pub join_code: String,
    /// How many bots the swarm runs
    pub bots_count: usize,
    /// Whether anti-detection mode is on
    pub stealth: bool,
    /// How bots derive their display names
    pub identity: IdentityMode,
    /// Whether bots brute-force auth challenges automatically
    pub auto_solve_challenge: bool,
    /// How answers are decided
    pub answer_policy: AnswerPolicy,
    /// Whether dropped bots are replaced with a fresh join
    pub rejoin_on_drop: bool,
}

impl ResolvedConfig {
    /// Builds the configuration block reported by the status view
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            join_code: self.join_code.clone(),
            bots_count: self.bots_count,
            stealth: self.stealth,
            random_names: self.identity.is_random(),
            base_name: match &self.identity {
                IdentityMode::Fixed { base } => base.clone(),
                IdentityMode::Random(_) => String::new(),
            },
        }
    }
}

/// Errors rejecting a swarm configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A field failed validation (empty join code, zero or oversized swarm)
    #[error(transparent)]
    Invalid(#[from] garde::Report),
    /// Fixed identities were requested without a base name
    #[error("base name is required when random names are disabled")]
    MissingBaseName,
}

impl SwarmConfig {
    /// Validates the configuration and fixes the identity mode
    ///
    /// Anti-detection mode forces random identities even when a base name
    /// was supplied; otherwise random names win over the base name, and a
    /// fixed-identity swarm without a base name is rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a field is out of bounds or the
    /// identity fields are inconsistent. The caller's state is untouched.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        self.validate()?;

        let identity = if self.stealth {
            IdentityMode::Random(self.random_names.unwrap_or_default())
        } else if let Some(style) = self.random_names {
            IdentityMode::Random(style)
        } else if self.base_name.is_empty() {
            return Err(ConfigError::MissingBaseName);
        } else {
            IdentityMode::Fixed {
                base: self.base_name.clone(),
            }
        };

        Ok(ResolvedConfig {
            join_code: self.join_code.clone(),
            bots_count: self.bots_count,
            stealth: self.stealth,
            identity,
            auto_solve_challenge: self.auto_solve_challenge,
            answer_policy: self.answer_policy,
            rejoin_on_drop: self.rejoin_on_drop,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn base_config() -> SwarmConfig {
        SwarmConfig {
            join_code: "123456".to_string(),
            bots_count: 5,
            base_name: "Bot".to_string(),
            ..SwarmConfig::default()
        }
    }

    #[test]
    fn test_fixed_identity_resolves() {
        let resolved = base_config().resolve().unwrap();
        assert!(matches!(resolved.identity, IdentityMode::Fixed { ref base } if base == "Bot"));
        assert_eq!(resolved.bots_count, 5);
    }

    #[test]
    fn test_empty_join_code_rejected() {
        let mut config = base_config();
        config.join_code = String::new();
        assert!(matches!(config.resolve(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_bots_rejected() {
        let mut config = base_config();
        config.bots_count = 0;
        assert!(matches!(config.resolve(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_oversized_swarm_rejected() {
        let mut config = base_config();
        config.bots_count = constants::swarm::MAX_SWARM_SIZE + 1;
        assert!(matches!(config.resolve(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_base_name_rejected() {
        let mut config = base_config();
        config.base_name = String::new();
        assert!(matches!(config.resolve(), Err(ConfigError::MissingBaseName)));
    }

    #[test]
    fn test_stealth_forces_random_identity() {
        let mut config = base_config();
        config.stealth = true;
        let resolved = config.resolve().unwrap();
        assert!(resolved.identity.is_random());
    }

    #[test]
    fn test_random_names_win_over_base_name() {
        let mut config = base_config();
        config.random_names = Some(NameStyle::Petname(2));
        let resolved = config.resolve().unwrap();
        assert!(resolved.identity.is_random());
    }

    #[test]
    fn test_summary_reports_identity_fields() {
        let summary = base_config().resolve().unwrap().summary();
        assert_eq!(summary.join_code, "123456");
        assert_eq!(summary.bots_count, 5);
        assert!(!summary.random_names);
        assert_eq!(summary.base_name, "Bot");

        let mut stealthy = base_config();
        stealthy.stealth = true;
        let summary = stealthy.resolve().unwrap().summary();
        assert!(summary.random_names);
        assert!(summary.base_name.is_empty());
    }

    #[test]
    fn test_display_names_per_mode() {
        let fixed = IdentityMode::Fixed {
            base: "Bot".to_string(),
        };
        assert_eq!(fixed.display_name(ParticipantId::new(4)), "Bot4");

        let random = IdentityMode::Random(NameStyle::default());
        let first = random.display_name(ParticipantId::new(0));
        assert!(!first.is_empty());
    }
}
