use chrono::{DateTime, Utc};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info};

use quiz_core::Clock;
use quiz_core::model::{
    Catalog, ChoiceSet, GuessOutcome, Item, RoundConfig, RoundStats, RoundSummary,
};

use super::plan;
use super::progress::RoundProgress;
use crate::error::SessionError;

//
// ─── SNAPSHOTS ─────────────────────────────────────────────────────────────────
//

/// The item the user must identify next, with its choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundHandle {
    pub item: Item,
    pub choices: ChoiceSet,
    /// 1-based position of `item` within the round.
    pub question: usize,
    pub round_size: usize,
}

/// Result of moving past the current item.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Next(RoundHandle),
    Complete(RoundSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    RoundActive,
    RoundComplete,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

struct ActiveRound {
    config: RoundConfig,
    catalog: Catalog,
    /// Front is the current item.
    pending: VecDeque<Item>,
    choices: ChoiceSet,
    stats: RoundStats,
    started_at: DateTime<Utc>,
}

impl ActiveRound {
    fn current(&self) -> Result<&Item, SessionError> {
        self.pending.front().ok_or(SessionError::NoActiveRound)
    }

    fn question(&self) -> usize {
        self.config.round_size() - self.pending.len() + 1
    }

    fn handle(&self) -> Result<RoundHandle, SessionError> {
        Ok(RoundHandle {
            item: self.current()?.clone(),
            choices: self.choices.clone(),
            question: self.question(),
            round_size: self.config.round_size(),
        })
    }
}

enum RoundState {
    Idle,
    Active(ActiveRound),
    Complete(RoundSummary),
}

/// Quiz round state machine.
///
/// `Idle → RoundActive → … → RoundComplete`; only [`QuizSession::start_round`]
/// leaves `Idle` or `RoundComplete`. All randomness comes from the injected `R`,
/// so a seeded generator reproduces the exact item order and choice layout.
pub struct QuizSession<R = StdRng> {
    rng: R,
    clock: Clock,
    state: RoundState,
}

impl QuizSession<StdRng> {
    /// Session seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Session with a reproducible sequence.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for QuizSession<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> QuizSession<R> {
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            clock: Clock::system(),
            state: RoundState::Idle,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Start a round of `round_size` items with `choice_set_size` choices each.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidConfiguration` for a zero round size or an
    /// odd/too small choice count, and `SessionError::InsufficientItems` when the
    /// catalog cannot fill the round or the choice set.
    pub fn start_round(
        &mut self,
        catalog: Catalog,
        round_size: usize,
        choice_set_size: usize,
    ) -> Result<RoundHandle, SessionError> {
        let config = RoundConfig::new(round_size, choice_set_size)?;
        self.start_configured(catalog, config)
    }

    /// Start a round from an already validated config.
    ///
    /// Any previous round is discarded only once the new one is ready; on error
    /// the session keeps its prior state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InsufficientItems` when the catalog is too small.
    pub fn start_configured(
        &mut self,
        catalog: Catalog,
        config: RoundConfig,
    ) -> Result<RoundHandle, SessionError> {
        let distinct = catalog.distinct_names();
        if distinct < config.choice_set_size() {
            return Err(SessionError::InsufficientItems {
                available: distinct,
                required: config.choice_set_size(),
            });
        }

        let pending: VecDeque<Item> =
            plan::draw_round(&catalog, config.round_size(), &mut self.rng)?.into();
        let first = pending.front().ok_or(SessionError::NoActiveRound)?;
        let choices = plan::choice_set(&catalog, first, config.choice_set_size(), &mut self.rng)?;

        let round = ActiveRound {
            config,
            catalog,
            pending,
            choices,
            stats: RoundStats::new(),
            started_at: self.clock.now(),
        };
        let handle = round.handle()?;
        debug!(
            round_size = config.round_size(),
            choices = config.choice_set_size(),
            catalog = round.catalog.len(),
            "round started"
        );
        self.state = RoundState::Active(round);
        Ok(handle)
    }

    /// Record a guess for the current item. Does not advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveRound` outside an active round.
    pub fn submit_guess(&mut self, name: &str) -> Result<GuessOutcome, SessionError> {
        let round = self.active_mut()?;
        let outcome = if round.current()?.name() == name {
            GuessOutcome::Correct
        } else {
            GuessOutcome::Incorrect
        };
        round.stats.record(outcome);
        debug!(
            question = round.question(),
            ?outcome,
            total_guesses = round.stats.total_guesses(),
            "guess recorded"
        );
        Ok(outcome)
    }

    /// Move past the current item.
    ///
    /// Returns the next item with freshly drawn choices, or the final summary
    /// once the round is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveRound` outside an active round.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        let RoundState::Active(round) = &mut self.state else {
            return Err(SessionError::NoActiveRound);
        };

        // Everything fallible runs before the current item is dropped.
        if let Some(next) = round.pending.get(1) {
            let choices = plan::choice_set(
                &round.catalog,
                next,
                round.config.choice_set_size(),
                &mut self.rng,
            )?;
            round.pending.pop_front();
            round.choices = choices;
            debug!(question = round.question(), "advanced to next item");
            return Ok(Advance::Next(round.handle()?));
        }

        // A wall clock stepping backwards must not strand a finished round.
        let completed_at = self.clock.now().max(round.started_at);
        let summary = RoundSummary::new(
            round.config.round_size(),
            round.stats,
            round.started_at,
            completed_at,
        )?;
        info!(
            correct = summary.correct_count(),
            total_guesses = summary.total_guesses(),
            average = summary.average(),
            "round complete"
        );
        self.state = RoundState::Complete(summary.clone());
        Ok(Advance::Complete(summary))
    }

    /// Drop any round and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = RoundState::Idle;
    }

    fn active_mut(&mut self) -> Result<&mut ActiveRound, SessionError> {
        match &mut self.state {
            RoundState::Active(round) => Ok(round),
            _ => Err(SessionError::NoActiveRound),
        }
    }
}

impl<R> QuizSession<R> {
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self.state {
            RoundState::Idle => SessionState::Idle,
            RoundState::Active(_) => SessionState::RoundActive,
            RoundState::Complete(_) => SessionState::RoundComplete,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.state, RoundState::Complete(_))
    }

    /// The item the user must currently identify.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveRound` when idle or complete.
    pub fn current_item(&self) -> Result<&Item, SessionError> {
        match &self.state {
            RoundState::Active(round) => round.current(),
            _ => Err(SessionError::NoActiveRound),
        }
    }

    /// Choices for the current item, in presentation order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveRound` when idle or complete.
    pub fn current_choices(&self) -> Result<&ChoiceSet, SessionError> {
        match &self.state {
            RoundState::Active(round) => Ok(&round.choices),
            _ => Err(SessionError::NoActiveRound),
        }
    }

    /// Running statistics of the active or just completed round.
    #[must_use]
    pub fn stats(&self) -> Option<RoundStats> {
        match &self.state {
            RoundState::Idle => None,
            RoundState::Active(round) => Some(round.stats),
            RoundState::Complete(summary) => Some(summary.stats()),
        }
    }

    #[must_use]
    pub fn summary(&self) -> Option<&RoundSummary> {
        match &self.state {
            RoundState::Complete(summary) => Some(summary),
            _ => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Option<RoundProgress> {
        match &self.state {
            RoundState::Idle => None,
            RoundState::Active(round) => {
                let total = round.config.round_size();
                Some(RoundProgress {
                    total,
                    answered: total - round.pending.len(),
                    remaining: round.pending.len(),
                    is_complete: false,
                })
            }
            RoundState::Complete(summary) => Some(RoundProgress {
                total: summary.round_size(),
                answered: summary.round_size(),
                remaining: 0,
                is_complete: true,
            }),
        }
    }

    /// Items left in the round, the current one included; `None` when idle.
    #[must_use]
    pub fn remaining(&self) -> Option<usize> {
        self.progress().map(|p| p.remaining)
    }

    /// 1-based number of the current item; `None` when idle.
    #[must_use]
    pub fn question_number(&self) -> Option<usize> {
        self.progress().map(|p| p.question_number())
    }
}

impl<R> fmt::Debug for QuizSession<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("QuizSession");
        dbg.field("state", &self.state());
        if let RoundState::Active(round) = &self.state {
            dbg.field("config", &round.config)
                .field("pending_len", &round.pending.len())
                .field("stats", &round.stats)
                .field("started_at", &round.started_at);
        }
        dbg.finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::RoundConfigError;
    use quiz_core::time::{fixed_clock, fixed_now};
    use std::collections::HashSet;

    fn catalog(region: &str, names: &[&str]) -> Catalog {
        names
            .iter()
            .map(|name| Item::parse_id(&format!("{region}-{name}")).unwrap())
            .collect()
    }

    fn ten_flags() -> Catalog {
        catalog(
            "Europe",
            &[
                "Austria", "Belgium", "Denmark", "Finland", "France", "Germany", "Greece",
                "Ireland", "Italy", "Spain", "Sweden", "Norway",
            ],
        )
    }

    fn session() -> QuizSession {
        QuizSession::seeded(11).with_clock(fixed_clock())
    }

    #[test]
    fn five_item_catalog_fills_a_five_item_round() {
        let items = catalog("x", &["A", "B", "C", "D", "E"]);
        let mut session = session();
        let first = session.start_round(items.clone(), 5, 2).unwrap();
        assert_eq!(first.question, 1);
        assert_eq!(first.round_size, 5);

        let mut seen = vec![first.item];
        while let Advance::Next(handle) = session.advance().unwrap() {
            seen.push(handle.item);
        }
        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(seen.len(), 5);
        assert_eq!(unique.len(), 5);
        assert!(seen.iter().all(|item| items.contains(item)));
    }

    #[test]
    fn small_catalog_is_rejected() {
        let mut session = session();
        let err = session
            .start_round(catalog("x", &["A", "B", "C"]), 10, 2)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InsufficientItems {
                available: 3,
                required: 10
            }
        ));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn choice_count_larger_than_catalog_is_rejected() {
        let mut session = session();
        let err = session
            .start_round(catalog("x", &["A", "B", "C"]), 2, 4)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InsufficientItems {
                available: 3,
                required: 4
            }
        ));
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let mut session = session();
        let err = session.start_round(ten_flags(), 0, 2).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidConfiguration(RoundConfigError::InvalidRoundSize)
        ));
        let err = session.start_round(ten_flags(), 5, 3).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidConfiguration(RoundConfigError::InvalidChoiceSetSize(3))
        ));
    }

    #[test]
    fn perfect_round_scores_one_hundred() {
        let mut session = session();
        session.start_round(ten_flags(), 10, 4).unwrap();

        let mut advances = 0;
        let summary = loop {
            let name = session.current_item().unwrap().name().to_string();
            assert_eq!(session.submit_guess(&name).unwrap(), GuessOutcome::Correct);
            advances += 1;
            if let Advance::Complete(summary) = session.advance().unwrap() {
                break summary;
            }
        };

        assert_eq!(advances, 10);
        assert_eq!(summary.total_guesses(), 10);
        assert_eq!(summary.correct_count(), 10);
        assert!((summary.average() - 100.0).abs() < f64::EPSILON);
        assert_eq!(summary.started_at(), fixed_now());
        assert_eq!(session.state(), SessionState::RoundComplete);
    }

    #[test]
    fn wrong_guesses_count_but_do_not_score() {
        let mut session = session();
        session.start_round(ten_flags(), 3, 4).unwrap();

        let correct = session.current_item().unwrap().name().to_string();
        let wrong = session
            .current_choices()
            .unwrap()
            .iter()
            .find(|name| *name != correct)
            .unwrap()
            .to_string();

        assert_eq!(session.submit_guess(&wrong).unwrap(), GuessOutcome::Incorrect);
        assert_eq!(session.submit_guess(&wrong).unwrap(), GuessOutcome::Incorrect);
        assert_eq!(session.submit_guess(&correct).unwrap(), GuessOutcome::Correct);

        let stats = session.stats().unwrap();
        assert_eq!(stats.total_guesses(), 3);
        assert_eq!(stats.correct_count(), 1);
        // Still on the same item until advanced.
        assert_eq!(session.current_item().unwrap().name(), correct);
    }

    #[test]
    fn every_choice_set_contains_the_answer_once() {
        let mut session = session();
        let first = session.start_round(ten_flags(), 10, 6).unwrap();
        let mut handles = vec![first];
        while let Advance::Next(handle) = session.advance().unwrap() {
            handles.push(handle);
        }
        for handle in handles {
            assert_eq!(handle.choices.len(), 6);
            let unique: HashSet<_> = handle.choices.iter().collect();
            assert_eq!(unique.len(), 6);
            assert_eq!(
                handle
                    .choices
                    .iter()
                    .filter(|name| *name == handle.item.name())
                    .count(),
                1
            );
        }
    }

    #[test]
    fn operations_outside_a_round_fail() {
        let mut session = session();
        assert!(matches!(
            session.submit_guess("France"),
            Err(SessionError::NoActiveRound)
        ));
        assert!(matches!(session.advance(), Err(SessionError::NoActiveRound)));
        assert!(matches!(
            session.current_item(),
            Err(SessionError::NoActiveRound)
        ));

        session.start_round(ten_flags(), 1, 2).unwrap();
        assert!(matches!(session.advance().unwrap(), Advance::Complete(_)));
        assert!(matches!(
            session.current_choices(),
            Err(SessionError::NoActiveRound)
        ));
        assert!(matches!(
            session.submit_guess("France"),
            Err(SessionError::NoActiveRound)
        ));
        assert!(session.summary().is_some());

        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.stats().is_none());
    }

    #[test]
    fn starting_again_discards_previous_round() {
        let mut session = session();
        session.start_round(ten_flags(), 5, 2).unwrap();
        let name = session.current_item().unwrap().name().to_string();
        session.submit_guess(&name).unwrap();
        session.advance().unwrap();

        let handle = session.start_round(ten_flags(), 5, 2).unwrap();
        assert_eq!(handle.question, 1);
        assert_eq!(session.stats(), Some(RoundStats::new()));
        assert_eq!(session.progress().unwrap().remaining, 5);
    }

    #[test]
    fn same_seed_reproduces_the_round() {
        let mut a = QuizSession::seeded(99);
        let mut b = QuizSession::seeded(99);
        let ha = a.start_round(ten_flags(), 10, 4).unwrap();
        let hb = b.start_round(ten_flags(), 10, 4).unwrap();
        assert_eq!(ha, hb);
        assert_eq!(a.advance().unwrap(), b.advance().unwrap());
    }

    #[test]
    fn progress_tracks_position() {
        let mut session = session();
        session.start_round(ten_flags(), 3, 2).unwrap();
        assert_eq!(session.progress().unwrap().answered, 0);
        let Advance::Next(handle) = session.advance().unwrap() else {
            panic!("expected next item");
        };
        assert_eq!(handle.question, 2);
        let progress = session.progress().unwrap();
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining, 2);
        assert!(!progress.is_complete);
        assert_eq!(session.remaining(), Some(2));
        assert_eq!(session.question_number(), Some(2));

        session.advance().unwrap();
        session.advance().unwrap();
        assert_eq!(session.remaining(), Some(0));
        assert_eq!(session.question_number(), Some(3));

        session.reset();
        assert_eq!(session.remaining(), None);
        assert_eq!(session.question_number(), None);
    }

    #[test]
    fn clock_stepping_back_still_completes_the_round() {
        let mut session = session();
        let first = session.start_round(ten_flags(), 1, 2).unwrap();
        session.submit_guess(first.item.name()).unwrap();
        session.clock = Clock::fixed(fixed_now() - chrono::Duration::seconds(1));

        let Advance::Complete(summary) = session.advance().unwrap() else {
            panic!("expected the round to complete");
        };
        assert_eq!(summary.completed_at(), summary.started_at());
        assert_eq!(summary.correct_count(), 1);
        assert_eq!(session.state(), SessionState::RoundComplete);
        assert!(matches!(session.advance(), Err(SessionError::NoActiveRound)));
    }
}
