use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use quiz_core::model::{PreferencesDraft, UserPreferences};
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::repository::QuestionRepository;

use super::service::PracticeSession;
use crate::Clock;
use crate::error::SessionError;
use crate::identity::IdentityProvider;
use crate::preferences_service::{PreferencesService, PreferencesUpdate};

/// Orchestrates session start, restart and preference changes.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    questions: Arc<dyn QuestionRepository>,
    preferences: PreferencesService,
    identity: Arc<dyn IdentityProvider>,
    seed: Option<u64>,
    sessions_started: Arc<AtomicU64>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionRepository>,
        preferences: PreferencesService,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            clock,
            questions,
            preferences,
            identity,
            seed: None,
            sessions_started: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Make draws reproducible. Each started session still gets its own stream.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn preferences(&self) -> &PreferencesService {
        &self.preferences
    }

    fn next_rng(&self) -> StdRng {
        let n = self.sessions_started.fetch_add(1, Ordering::Relaxed);
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(n)),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Start a session with the current user's saved preferences.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MissingPreferences` if the user has not been
    /// through onboarding, or `SessionError::Storage` if the question bank
    /// cannot be read.
    pub async fn start_session(&self) -> Result<PracticeSession, SessionError> {
        let identity = self.identity.current();
        let Some(preferences) = self.preferences.load(identity.user_id()).await else {
            return Err(SessionError::MissingPreferences {
                user: identity.user_id().to_string(),
            });
        };
        self.start_with(preferences).await
    }

    /// Start a session with explicit preferences, without touching the store.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the question bank cannot be read.
    pub async fn start_with(
        &self,
        preferences: UserPreferences,
    ) -> Result<PracticeSession, SessionError> {
        let questions = self.questions.all_questions().await?;
        Ok(PracticeSession::start(
            self.identity.current(),
            preferences,
            &questions,
            self.next_rng(),
            self.clock,
        ))
    }

    /// Redraw `session` under its current preferences.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the question bank cannot be read.
    pub async fn restart(&self, session: &mut PracticeSession) -> Result<(), SessionError> {
        let questions = self.questions.all_questions().await?;
        session.restart(&questions);
        Ok(())
    }

    /// Validate and save preferences for the current user.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Preferences` if the draft is invalid.
    pub async fn save_preferences(
        &self,
        draft: PreferencesDraft,
    ) -> Result<PreferencesUpdate, SessionError> {
        let identity = self.identity.current();
        self.preferences.save(identity.user_id(), draft).await
    }

    /// Save new preferences and redraw `session` under them.
    ///
    /// A failed write is reported through `PreferencesUpdate::persisted`;
    /// the session still uses the new preferences.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Preferences` if the draft is invalid, or
    /// `SessionError::Storage` if the question bank cannot be read.
    pub async fn apply_preferences(
        &self,
        session: &mut PracticeSession,
        draft: PreferencesDraft,
    ) -> Result<PreferencesUpdate, SessionError> {
        let update = self.save_preferences(draft).await?;
        let questions = self.questions.all_questions().await?;
        session.apply_preferences(update.preferences.clone(), &questions);
        Ok(update)
    }
}
