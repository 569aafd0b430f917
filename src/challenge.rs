//! Auth challenge brute-force solving
//!
//! Some sessions issue a short interactive auth challenge before a bot is
//! fully admitted: the bot must reproduce a hidden ordering of a small fixed
//! symbol space. The space is tiny, so periodic brute force converges
//! quickly. Each solver permutes a candidate pattern on every tick until the
//! session confirms one, then freezes on the confirmed pattern and keeps
//! resubmitting it, since the protocol may demand the value again after a
//! later nonce change.

use serde::{Deserialize, Serialize};

use super::{constants::challenge::SYMBOL_COUNT, participant::ParticipantId};

/// An ordered arrangement of the challenge symbol space
///
/// A guess always contains every symbol exactly once; only the order varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeGuess([u8; SYMBOL_COUNT]);

impl ChallengeGuess {
    /// The identity ordering of the symbol space
    fn ordered() -> Self {
        let mut symbols = [0; SYMBOL_COUNT];
        for (index, symbol) in symbols.iter_mut().enumerate() {
            *symbol = index as u8;
        }
        Self(symbols)
    }

    /// Shuffles the ordering in place, keeping every symbol present
    fn shuffle(&mut self) {
        fastrand::shuffle(&mut self.0);
    }

    /// Returns the symbols in their current order
    pub fn symbols(&self) -> &[u8] {
        &self.0
    }
}

impl Default for ChallengeGuess {
    fn default() -> Self {
        Self::ordered()
    }
}

/// The solving progress of a single bot's challenge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverPhase {
    /// No challenge is outstanding
    #[default]
    Idle,
    /// Permuting candidate guesses every tick
    Guessing,
    /// A guess was confirmed; it is frozen and resubmitted unconditionally
    Confirmed,
}

/// Per-bot brute-force state for an outstanding auth challenge
///
/// The solver moves `Idle → Guessing → Confirmed` and never re-enters
/// `Guessing` for the same challenge instance.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChallengeSolver {
    phase: SolverPhase,
    candidate: ChallengeGuess,
}

impl ChallengeSolver {
    /// Creates an idle solver
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts guessing; a no-op once the solver has left `Idle`
    pub fn begin(&mut self) {
        if matches!(self.phase, SolverPhase::Idle) {
            self.phase = SolverPhase::Guessing;
        }
    }

    /// Freezes the last emitted guess as the confirmed pattern
    ///
    /// Called when the session acknowledges a correct guess. Idempotent;
    /// the first confirmed pattern wins.
    pub fn confirm(&mut self) {
        if matches!(self.phase, SolverPhase::Guessing) {
            self.phase = SolverPhase::Confirmed;
        }
    }

    /// Produces the guess to submit on this tick
    ///
    /// While guessing, this draws a fresh uniform permutation. Once
    /// confirmed, it returns the frozen pattern every time.
    pub fn next_guess(&mut self) -> ChallengeGuess {
        if matches!(self.phase, SolverPhase::Guessing) {
            self.candidate.shuffle();
        }
        self.candidate
    }

    /// The solver's current phase
    pub fn phase(&self) -> SolverPhase {
        self.phase
    }
}

/// Alarm messages for challenge solving ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Submit the next guess for one bot's outstanding challenge
    Tick {
        /// The bot whose solver should tick
        participant: ParticipantId,
        /// Swarm generation the tick belongs to; stale ticks are dropped
        generation: u64,
    },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_new_solver_is_idle() {
        let solver = ChallengeSolver::new();
        assert_eq!(solver.phase(), SolverPhase::Idle);
    }

    #[test]
    fn test_begin_enters_guessing() {
        let mut solver = ChallengeSolver::new();
        solver.begin();
        assert_eq!(solver.phase(), SolverPhase::Guessing);
    }

    #[test]
    fn test_guess_contains_every_symbol_once() {
        let mut solver = ChallengeSolver::new();
        solver.begin();

        for _ in 0..20 {
            let mut symbols = solver.next_guess().symbols().to_vec();
            symbols.sort_unstable();
            assert_eq!(symbols, vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn test_confirm_freezes_guess() {
        let mut solver = ChallengeSolver::new();
        solver.begin();
        let last = solver.next_guess();
        solver.confirm();

        assert_eq!(solver.phase(), SolverPhase::Confirmed);
        for _ in 0..10 {
            assert_eq!(solver.next_guess(), last);
        }
    }

    #[test]
    fn test_confirm_before_begin_is_ignored() {
        let mut solver = ChallengeSolver::new();
        solver.confirm();
        assert_eq!(solver.phase(), SolverPhase::Idle);
    }

    #[test]
    fn test_confirmed_solver_never_resumes_guessing() {
        let mut solver = ChallengeSolver::new();
        solver.begin();
        solver.next_guess();
        solver.confirm();
        solver.begin();
        assert_eq!(solver.phase(), SolverPhase::Confirmed);
    }
}
