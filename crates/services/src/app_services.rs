use std::sync::Arc;

use storage::bank::builtin_questions;
use storage::repository::{QuestionRepository, Storage};

use crate::Clock;
use crate::error::AppServicesError;
use crate::identity::IdentityProvider;
use crate::preferences_service::PreferencesService;
use crate::sessions::SessionLoopService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    questions: Arc<dyn QuestionRepository>,
    preferences: PreferencesService,
    session_loop: Arc<SessionLoopService>,
    seeded_bank: bool,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// An empty question bank is seeded with the built-in sample questions.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or seeding fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, clock, identity).await
    }

    /// Build services over an existing `Storage`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if seeding an empty bank fails.
    pub async fn from_storage(
        storage: Storage,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, AppServicesError> {
        let seeded_bank = ensure_question_bank(storage.questions.as_ref()).await?;
        let preferences = PreferencesService::new(Arc::clone(&storage.preferences));
        let session_loop = Arc::new(SessionLoopService::new(
            clock,
            Arc::clone(&storage.questions),
            preferences.clone(),
            identity,
        ));

        Ok(Self {
            questions: storage.questions,
            preferences,
            session_loop,
            seeded_bank,
        })
    }

    /// Make session draws reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.session_loop = Arc::new(self.session_loop.as_ref().clone().with_seed(seed));
        self
    }

    #[must_use]
    pub fn questions(&self) -> Arc<dyn QuestionRepository> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn preferences(&self) -> &PreferencesService {
        &self.preferences
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }

    /// Whether the sample bank was written during startup.
    #[must_use]
    pub fn seeded_bank(&self) -> bool {
        self.seeded_bank
    }
}

async fn ensure_question_bank(questions: &dyn QuestionRepository) -> Result<bool, AppServicesError> {
    if !questions.all_questions().await?.is_empty() {
        return Ok(false);
    }

    let bank = builtin_questions()?;
    questions.upsert_questions(&bank).await?;
    tracing::info!(count = bank.len(), "seeded empty question bank");
    Ok(true)
}
