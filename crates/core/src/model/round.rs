use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoundConfigError {
    #[error("round size must be > 0")]
    InvalidRoundSize,

    #[error("choice set size must be an even number >= 2, got {0}")]
    InvalidChoiceSetSize(usize),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoundSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("correct answers ({correct}) exceed total guesses ({total})")]
    CountMismatch { correct: u32, total: u32 },
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Shape of a round: how many items and how many choices per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    round_size: usize,
    choice_set_size: usize,
}

impl RoundConfig {
    /// Flags per round in the classic quiz.
    pub const DEFAULT_ROUND_SIZE: usize = 10;

    /// # Errors
    ///
    /// Returns `RoundConfigError` if `round_size` is zero or `choice_set_size`
    /// is odd or smaller than two.
    pub fn new(round_size: usize, choice_set_size: usize) -> Result<Self, RoundConfigError> {
        if round_size == 0 {
            return Err(RoundConfigError::InvalidRoundSize);
        }
        if choice_set_size < 2 || choice_set_size % 2 != 0 {
            return Err(RoundConfigError::InvalidChoiceSetSize(choice_set_size));
        }
        Ok(Self {
            round_size,
            choice_set_size,
        })
    }

    #[must_use]
    pub fn round_size(&self) -> usize {
        self.round_size
    }

    #[must_use]
    pub fn choice_set_size(&self) -> usize {
        self.choice_set_size
    }

    /// Minimum catalog size needed to draw the round without repeats.
    #[must_use]
    pub fn required_items(&self) -> usize {
        self.round_size.max(self.choice_set_size)
    }
}

//
// ─── GUESSES ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessOutcome {
    Correct,
    Incorrect,
}

impl GuessOutcome {
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// Running score of the active round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStats {
    correct_count: u32,
    total_guesses: u32,
}

impl RoundStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: GuessOutcome) {
        self.total_guesses = self.total_guesses.saturating_add(1);
        if outcome.is_correct() {
            self.correct_count = self.correct_count.saturating_add(1);
        }
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total_guesses(&self) -> u32 {
        self.total_guesses
    }

    /// Percentage of guesses that were correct; `0.0` before any guess.
    ///
    /// With every item eventually answered this is `round_size * 100 / total_guesses`.
    #[must_use]
    pub fn average(&self) -> f64 {
        if self.total_guesses == 0 {
            return 0.0;
        }
        f64::from(self.correct_count) * 100.0 / f64::from(self.total_guesses)
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Final statistics for a completed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    round_size: usize,
    stats: RoundStats,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl RoundSummary {
    /// # Errors
    ///
    /// Returns `RoundSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    pub fn new(
        round_size: usize,
        stats: RoundStats,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, RoundSummaryError> {
        if completed_at < started_at {
            return Err(RoundSummaryError::InvalidTimeRange);
        }
        if stats.correct_count > stats.total_guesses {
            return Err(RoundSummaryError::CountMismatch {
                correct: stats.correct_count,
                total: stats.total_guesses,
            });
        }
        Ok(Self {
            round_size,
            stats,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn round_size(&self) -> usize {
        self.round_size
    }

    #[must_use]
    pub fn stats(&self) -> RoundStats {
        self.stats
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.stats.correct_count()
    }

    #[must_use]
    pub fn total_guesses(&self) -> u32 {
        self.stats.total_guesses()
    }

    #[must_use]
    pub fn average(&self) -> f64 {
        self.stats.average()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}
