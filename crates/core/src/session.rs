//! In-memory practice session engine.
//!
//! A session is drawn once from the question repository under the user's
//! filters and then worked through position by position. Answers are graded
//! in the canonical option ordering of each question; callers that present
//! shuffled options translate the selection with
//! `PresentedQuestion::original_index` first.

use rand::Rng;
use thiserror::Error;

use crate::model::{PositionSet, Question, SessionSummary, UserPreferences, summarize};
use crate::shuffle::shuffle_vec;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionInvariantError {
    #[error("no unattempted position found although {attempted} of {total} are attempted")]
    NoUnattemptedPosition { attempted: usize, total: usize },
}

/// Lifecycle of a drawn session. Restarting always returns to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    Summary,
}

/// Result of `SessionState::record_answer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    /// The position was already attempted, or the session has no current question.
    Ignored,
}

impl AnswerOutcome {
    #[must_use]
    pub fn is_recorded(self) -> bool {
        !matches!(self, AnswerOutcome::Ignored)
    }
}

/// Result of `SessionState::advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved { position: usize },
    Completed,
}

/// Filter the repository by preferences and draw a random subset.
///
/// Takes the first `min(question_count, matches)` of a Fisher–Yates shuffle
/// of the matching questions.
pub fn draw_questions<R: Rng + ?Sized>(
    repository: &[Question],
    preferences: &UserPreferences,
    rng: &mut R,
) -> Vec<Question> {
    let candidates: Vec<Question> = repository
        .iter()
        .filter(|q| preferences.matches(q))
        .cloned()
        .collect();
    let take = usize::try_from(preferences.question_count()).unwrap_or(usize::MAX);
    let mut drawn = shuffle_vec(candidates, rng).shuffled;
    drawn.truncate(take);
    drawn
}

/// Progress of one practice session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    questions: Vec<Question>,
    position: usize,
    answered: PositionSet,
    correct: PositionSet,
    skipped: PositionSet,
    selections: Vec<Option<usize>>,
    terminal: bool,
}

impl SessionState {
    /// Draw a fresh session from `repository` under `preferences`.
    ///
    /// Empty filters or no matching questions yield a zero-question session.
    pub fn start<R: Rng + ?Sized>(
        repository: &[Question],
        preferences: &UserPreferences,
        rng: &mut R,
    ) -> Self {
        Self::from_questions(draw_questions(repository, preferences, rng))
    }

    /// Start a session over an already drawn, fixed question sequence.
    #[must_use]
    pub fn from_questions(questions: Vec<Question>) -> Self {
        let len = questions.len();
        Self {
            questions,
            position: 0,
            answered: PositionSet::with_len(len),
            correct: PositionSet::with_len(len),
            skipped: PositionSet::with_len(len),
            selections: vec![None; len],
            terminal: false,
        }
    }

    /// Replace this session with a freshly drawn one; progress is discarded.
    pub fn restart<R: Rng + ?Sized>(
        &mut self,
        repository: &[Question],
        preferences: &UserPreferences,
        rng: &mut R,
    ) {
        *self = Self::start(repository, preferences, rng);
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.terminal {
            SessionPhase::Summary
        } else {
            SessionPhase::Active
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.terminal
    }

    #[must_use]
    pub fn answered(&self) -> &PositionSet {
        &self.answered
    }

    #[must_use]
    pub fn correct(&self) -> &PositionSet {
        &self.correct
    }

    #[must_use]
    pub fn skipped(&self) -> &PositionSet {
        &self.skipped
    }

    /// Answered plus skipped positions.
    #[must_use]
    pub fn attempted_count(&self) -> usize {
        self.answered.len() + self.skipped.len()
    }

    #[must_use]
    pub fn is_attempted(&self, position: usize) -> bool {
        self.answered.contains(position) || self.skipped.contains(position)
    }

    /// Canonical option index chosen at `position`, if answered.
    #[must_use]
    pub fn selection(&self, position: usize) -> Option<usize> {
        self.selections.get(position).copied().flatten()
    }

    /// The question at the current position, unless the session is empty or over.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.terminal {
            return None;
        }
        self.questions.get(self.position)
    }

    /// Grade `selected` (canonical option index) for the current position.
    ///
    /// The first answer is final: calling again on an attempted position is
    /// a no-op. Does not advance.
    pub fn record_answer(&mut self, selected: usize) -> AnswerOutcome {
        let position = self.position;
        let Some(question) = self.current_question() else {
            return AnswerOutcome::Ignored;
        };
        if self.is_attempted(position) {
            return AnswerOutcome::Ignored;
        }

        let is_correct = question.is_correct(selected);
        self.answered.insert(position);
        self.selections[position] = Some(selected);
        if is_correct {
            self.correct.insert(position);
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect
        }
    }

    /// Mark the current position skipped. Returns false if it was a no-op.
    pub fn skip(&mut self) -> bool {
        if self.current_question().is_none() || self.is_attempted(self.position) {
            return false;
        }
        self.skipped.insert(self.position)
    }

    /// Move to the next unattempted position, wrapping around, or finish.
    ///
    /// # Errors
    ///
    /// Returns `SessionInvariantError::NoUnattemptedPosition` when the
    /// attempted count says work remains but every position is attempted.
    /// That means the bookkeeping is corrupt; callers should treat it as fatal.
    pub fn advance(&mut self) -> Result<Advance, SessionInvariantError> {
        let total = self.total();
        let attempted = self.attempted_count();
        if attempted >= total {
            self.terminal = true;
            return Ok(Advance::Completed);
        }

        let mut next = self.position;
        for _ in 0..total {
            next = (next + 1) % total;
            if !self.is_attempted(next) {
                self.position = next;
                return Ok(Advance::Moved { position: next });
            }
        }

        Err(SessionInvariantError::NoUnattemptedPosition { attempted, total })
    }

    /// Aggregate statistics for the session as it stands.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        summarize(&self.questions, &self.answered, &self.correct, &self.skipped)
    }
}
