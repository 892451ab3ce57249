use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use std::fmt;

use quiz_core::Clock;
use quiz_core::model::{PresentedQuestion, Question, SessionSummary, UserPreferences};
use quiz_core::session::{Advance, AnswerOutcome, SessionPhase, SessionState};

use super::presentation::PresentationCache;
use super::progress::SessionProgress;
use super::view::SessionReport;
use crate::error::SessionError;
use crate::identity::Identity;

/// Guests are nudged to sign up once they have answered this many questions.
const SIGN_UP_PROMPT_AFTER: usize = 2;

//
// ─── ANSWER RESULT ─────────────────────────────────────────────────────────────
//

/// Outcome of answering the question on screen.
///
/// Option indices are in the presented (shuffled) ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAnswerResult {
    pub outcome: AnswerOutcome,
    pub position: usize,
    pub selected: usize,
    pub correct_option: usize,
    pub explanation: String,
    /// Set once per session when a guest reaches the sign-up threshold.
    pub prompt_sign_up: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One live practice session.
///
/// Wraps the engine state with the presentation shuffle of the current
/// question, session timestamps and the guest sign-up nudge. Every mutating
/// call is synchronous; storage is only touched by `SessionLoopService`.
pub struct PracticeSession {
    identity: Identity,
    preferences: UserPreferences,
    state: SessionState,
    rng: StdRng,
    presentation: PresentationCache,
    clock: Clock,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    sign_up_prompted: bool,
}

impl PracticeSession {
    /// Draw a session from `questions` under `preferences`.
    ///
    /// A zero-question session is returned when nothing matches.
    #[must_use]
    pub fn start(
        identity: Identity,
        preferences: UserPreferences,
        questions: &[Question],
        mut rng: StdRng,
        clock: Clock,
    ) -> Self {
        let state = SessionState::start(questions, &preferences, &mut rng);
        log_start(&identity, &state, questions.len());
        Self {
            identity,
            preferences,
            state,
            rng,
            presentation: PresentationCache::default(),
            clock,
            started_at: clock.now(),
            completed_at: None,
            sign_up_prompted: false,
        }
    }

    /// Discard progress and draw again from `questions`.
    pub fn restart(&mut self, questions: &[Question]) {
        self.state
            .restart(questions, &self.preferences, &mut self.rng);
        self.presentation.clear();
        self.started_at = self.clock.now();
        self.completed_at = None;
        self.sign_up_prompted = false;
        log_start(&self.identity, &self.state, questions.len());
    }

    /// Swap in new preferences and redraw from `questions`.
    pub fn apply_preferences(&mut self, preferences: UserPreferences, questions: &[Question]) {
        self.preferences = preferences;
        self.restart(questions);
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// The current question with its options in presentation order.
    ///
    /// The shuffle is computed once per question and reused until the
    /// session moves to a different one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Question` if the shuffled question fails
    /// re-validation.
    pub fn current(&mut self) -> Result<Option<&PresentedQuestion>, SessionError> {
        let Some(question) = self.state.current_question() else {
            return Ok(None);
        };
        let presented = self.presentation.get_or_shuffle(question, &mut self.rng)?;
        Ok(Some(presented))
    }

    /// Presented index of the answer already given at the current position.
    #[must_use]
    pub fn current_selection(&self) -> Option<usize> {
        let question = self.state.current_question()?;
        let canonical = self.state.selection(self.state.position())?;
        self.presentation
            .get(question)
            .map_or(Some(canonical), |p| p.presented_index(canonical))
    }

    /// Answer the current question with a presented option index.
    ///
    /// The first answer is final; later calls report `AnswerOutcome::Ignored`.
    /// Does not advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Question` if the presentation shuffle fails.
    pub fn answer(&mut self, selected: usize) -> Result<SessionAnswerResult, SessionError> {
        let position = self.state.position();
        let Some((canonical, correct_option, explanation)) = self.current()?.map(|p| {
            (
                p.original_index(selected).unwrap_or(selected),
                p.question().correct_answer(),
                p.question().explanation().to_string(),
            )
        }) else {
            tracing::debug!(selected, "answer ignored: no current question");
            return Ok(SessionAnswerResult {
                outcome: AnswerOutcome::Ignored,
                position,
                selected,
                correct_option: selected,
                explanation: String::new(),
                prompt_sign_up: false,
            });
        };

        let outcome = self.state.record_answer(canonical);
        if !outcome.is_recorded() {
            tracing::debug!(position, "answer ignored: position already attempted");
        }

        let prompt_sign_up = outcome.is_recorded()
            && !self.identity.is_signed_in()
            && !self.sign_up_prompted
            && self.state.answered().len() == SIGN_UP_PROMPT_AFTER;
        if prompt_sign_up {
            self.sign_up_prompted = true;
        }

        Ok(SessionAnswerResult {
            outcome,
            position,
            selected,
            correct_option,
            explanation,
            prompt_sign_up,
        })
    }

    /// Skip the current question. Returns false if it was already attempted.
    pub fn skip(&mut self) -> bool {
        let skipped = self.state.skip();
        if !skipped {
            tracing::debug!(position = self.state.position(), "skip ignored");
        }
        skipped
    }

    /// Move to the next unattempted question, or finish the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Invariant` if the session bookkeeping is
    /// inconsistent. The session should be discarded.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        let step = self.state.advance().inspect_err(|err| {
            tracing::error!(error = %err, "session bookkeeping is inconsistent");
        })?;
        if step == Advance::Completed && self.completed_at.is_none() {
            self.completed_at = Some(self.clock.now());
            let summary = self.state.summary();
            tracing::info!(
                user = %self.identity.user_id(),
                total = summary.total(),
                correct = summary.correct(),
                skipped = summary.skipped(),
                percentage = summary.overall_percentage(),
                "practice session completed"
            );
        }
        Ok(step)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.state.total();
        let attempted = self.state.attempted_count();
        SessionProgress {
            total,
            answered: self.state.answered().len(),
            correct: self.state.correct().len(),
            skipped: self.state.skipped().len(),
            attempted,
            remaining: total.saturating_sub(attempted),
            current: self
                .state
                .current_question()
                .map(|_| self.state.position() + 1),
            is_complete: self.state.is_complete(),
        }
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        self.state.summary()
    }

    #[must_use]
    pub fn report(&self) -> SessionReport {
        SessionReport::from_summary(&self.summary(), self.started_at, self.completed_at)
    }
}

fn log_start(identity: &Identity, state: &SessionState, pool: usize) {
    if state.is_empty() {
        tracing::warn!(
            user = %identity.user_id(),
            pool,
            "no questions match the current preferences"
        );
    } else {
        tracing::info!(
            user = %identity.user_id(),
            questions = state.total(),
            pool,
            "practice session started"
        );
    }
}

impl fmt::Debug for PracticeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticeSession")
            .field("user", self.identity.user_id())
            .field("total", &self.state.total())
            .field("position", &self.state.position())
            .field("attempted", &self.state.attempted_count())
            .field("phase", &self.state.phase())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{
        Category, CategoryId, Difficulty, FeedbackTier, QuestionDraft, QuestionId, Topic, UserId,
    };
    use quiz_core::time::{fixed_clock, fixed_now};
    use rand::SeedableRng;

    fn question(id: &str, category: &str) -> Question {
        QuestionDraft {
            id: QuestionId::new(id),
            prompt: format!("Prompt {id}"),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_answer: 1,
            explanation: format!("Because {id}"),
            topic: Topic::new("Basics", Category::new(category, "")),
            difficulty: Difficulty::Medium,
            tags: Default::default(),
        }
        .validate()
        .unwrap()
    }

    fn bank() -> Vec<Question> {
        vec![
            question("q1", "Cardiology"),
            question("q2", "Cardiology"),
            question("q3", "Neurology"),
            question("q4", "Neurology"),
        ]
    }

    fn prefs(count: u32) -> UserPreferences {
        UserPreferences::from_persisted(
            [CategoryId::new("cardiology"), CategoryId::new("neurology")],
            count,
            Difficulty::ALL,
        )
    }

    fn session(identity: Identity, count: u32) -> PracticeSession {
        PracticeSession::start(
            identity,
            prefs(count),
            &bank(),
            StdRng::seed_from_u64(7),
            fixed_clock(),
        )
    }

    /// Presented index of the correct option for the question on screen.
    fn correct_choice(session: &mut PracticeSession) -> usize {
        session.current().unwrap().unwrap().question().correct_answer()
    }

    #[test]
    fn presentation_is_stable_until_the_question_changes() {
        let mut s = session(Identity::guest(), 4);
        let first = s.current().unwrap().cloned().unwrap();
        let again = s.current().unwrap().cloned().unwrap();
        assert_eq!(first, again);

        s.skip();
        s.advance().unwrap();
        let next = s.current().unwrap().cloned().unwrap();
        assert_ne!(next.question().id(), first.question().id());
    }

    #[test]
    fn correct_presented_choice_is_graded_correct() {
        let mut s = session(Identity::guest(), 4);
        let choice = correct_choice(&mut s);
        let result = s.answer(choice).unwrap();

        assert_eq!(result.outcome, AnswerOutcome::Correct);
        assert_eq!(result.correct_option, choice);
        assert!(result.explanation.starts_with("Because"));
        assert_eq!(s.current_selection(), Some(choice));
    }

    #[test]
    fn second_answer_is_ignored() {
        let mut s = session(Identity::guest(), 4);
        let choice = correct_choice(&mut s);
        let wrong = (choice + 1) % 4;

        assert_eq!(s.answer(wrong).unwrap().outcome, AnswerOutcome::Incorrect);
        assert_eq!(s.answer(choice).unwrap().outcome, AnswerOutcome::Ignored);
        assert_eq!(s.progress().correct, 0);
        assert!(!s.skip());
    }

    #[test]
    fn guest_is_prompted_once_at_second_answer() {
        let mut s = session(Identity::guest(), 4);
        let mut prompts = Vec::new();
        for _ in 0..4 {
            prompts.push(s.answer(0).unwrap().prompt_sign_up);
            s.advance().unwrap();
        }
        assert_eq!(prompts, vec![false, true, false, false]);
    }

    #[test]
    fn signed_in_user_is_never_prompted() {
        let mut s = session(Identity::signed_in(UserId::new("ana")), 4);
        for _ in 0..4 {
            assert!(!s.answer(0).unwrap().prompt_sign_up);
            s.advance().unwrap();
        }
    }

    #[test]
    fn completing_sets_timestamp_and_report() {
        let mut s = session(Identity::guest(), 3);
        assert_eq!(s.progress().label().as_deref(), Some("Question 1 of 3"));

        let choice = correct_choice(&mut s);
        s.answer(choice).unwrap();
        s.advance().unwrap();
        s.skip();
        s.advance().unwrap();
        let choice = correct_choice(&mut s);
        s.answer(choice).unwrap();

        assert_eq!(s.advance().unwrap(), Advance::Completed);
        assert!(s.is_complete());
        assert_eq!(s.completed_at(), Some(fixed_now()));
        assert_eq!(s.progress().current, None);

        let report = s.report();
        assert_eq!(report.total, 3);
        assert_eq!(report.correct, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.rounded_percentage(), 100);
        assert_eq!(report.title, FeedbackTier::Perfect.title());
        assert!(report.message.contains("the 1 skipped question"));
    }

    #[test]
    fn empty_session_completes_immediately() {
        let mut s = PracticeSession::start(
            Identity::guest(),
            UserPreferences::from_persisted([CategoryId::new("oncology")], 5, Difficulty::ALL),
            &bank(),
            StdRng::seed_from_u64(1),
            fixed_clock(),
        );
        assert!(s.is_empty());
        assert!(s.current().unwrap().is_none());
        assert_eq!(s.answer(0).unwrap().outcome, AnswerOutcome::Ignored);
        assert_eq!(s.advance().unwrap(), Advance::Completed);
        assert_eq!(s.summary().feedback(), FeedbackTier::NoneAttempted);
    }

    #[test]
    fn restart_discards_progress() {
        let mut s = session(Identity::guest(), 2);
        s.answer(0).unwrap();
        s.advance().unwrap();
        s.skip();
        s.advance().unwrap();
        assert!(s.is_complete());

        s.restart(&bank());
        assert!(!s.is_complete());
        assert_eq!(s.progress().attempted, 0);
        assert_eq!(s.completed_at(), None);
        assert_eq!(s.state().total(), 2);
    }
}
