//! Configuration constants for the swarm coordination core
//!
//! This module contains all the limits and timing parameters used
//! throughout the swarm system to ensure consistent boundaries for
//! configuration validation, answer timing, and challenge solving.

/// Swarm-wide configuration constants
pub mod swarm {
    /// Maximum number of bots allowed in a single swarm
    pub const MAX_SWARM_SIZE: usize = 200;
    /// Maximum length of a session join code in characters
    pub const MAX_JOIN_CODE_LENGTH: usize = 16;
    /// Maximum length of a fixed base name in characters
    pub const MAX_BASE_NAME_LENGTH: usize = 30;
    /// Minimum number of answer choices a question can carry
    pub const MIN_CHOICE_COUNT: usize = 2;
}

/// Answer submission jitter constants
pub mod jitter {
    /// Minimum delay in milliseconds before a bot submits the decided answer
    pub const MIN_MILLIS: u64 = 50;
    /// Maximum delay in milliseconds before a bot submits the decided answer
    pub const MAX_MILLIS: u64 = 900;
}

/// Auth challenge solving constants
pub mod challenge {
    /// Number of distinct symbols in a challenge pattern
    pub const SYMBOL_COUNT: usize = 4;
    /// Period in milliseconds between challenge guess submissions
    pub const TICK_MILLIS: u64 = 1000;
}
