use async_trait::async_trait;
use quiz_core::model::{CategoryId, Difficulty, Question, UserId, UserPreferences};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of `UserPreferences`.
///
/// Serialized as `{"categories": [..], "questionCount": n, "difficulties": [..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesRecord {
    pub categories: Vec<CategoryId>,
    pub question_count: u32,
    pub difficulties: Vec<Difficulty>,
}

impl PreferencesRecord {
    #[must_use]
    pub fn from_preferences(preferences: &UserPreferences) -> Self {
        Self {
            categories: preferences.categories().iter().cloned().collect(),
            question_count: preferences.question_count(),
            difficulties: preferences.difficulties().iter().copied().collect(),
        }
    }

    /// Convert the record back into domain preferences. Not validated.
    #[must_use]
    pub fn into_preferences(self) -> UserPreferences {
        UserPreferences::from_persisted(self.categories, self.question_count, self.difficulties)
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` on malformed JSON or a
    /// difficulty other than `easy`, `medium`, `hard`.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Read access to the question bank.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Every question, in repository order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bank cannot be read.
    async fn all_questions(&self) -> Result<Vec<Question>, StorageError>;

    /// Insert questions, replacing any with the same id in place.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the questions cannot be stored.
    async fn upsert_questions(&self, questions: &[Question]) -> Result<(), StorageError>;
}

/// Per-user persistence for `UserPreferences`.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Load preferences for `user`, or `None` if never saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored value is unreadable.
    async fn load_preferences(&self, user: &UserId)
    -> Result<Option<UserPreferences>, StorageError>;

    /// Persist preferences for `user`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the preferences cannot be stored.
    async fn save_preferences(
        &self,
        user: &UserId,
        preferences: &UserPreferences,
    ) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Preferences are held as JSON text, the same shape a cookie would carry.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<Vec<Question>>>,
    preferences: Arc<Mutex<HashMap<UserId, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions: Arc::new(Mutex::new(questions)),
            preferences: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Raw JSON stored for `user`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw_preferences(&self, user: &UserId) -> Result<Option<String>, StorageError> {
        let guard = self
            .preferences
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user).cloned())
    }

    /// Overwrite the raw JSON stored for `user`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn put_raw_preferences(&self, user: &UserId, raw: impl Into<String>) -> Result<(), StorageError> {
        let mut guard = self
            .preferences
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(user.clone(), raw.into());
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn all_questions(&self) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn upsert_questions(&self, questions: &[Question]) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for question in questions {
            match guard.iter_mut().find(|q| q.id() == question.id()) {
                Some(existing) => *existing = question.clone(),
                None => guard.push(question.clone()),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for InMemoryRepository {
    async fn load_preferences(
        &self,
        user: &UserId,
    ) -> Result<Option<UserPreferences>, StorageError> {
        self.raw_preferences(user)?
            .map(|raw| PreferencesRecord::from_json(&raw).map(PreferencesRecord::into_preferences))
            .transpose()
    }

    async fn save_preferences(
        &self,
        user: &UserId,
        preferences: &UserPreferences,
    ) -> Result<(), StorageError> {
        let raw = PreferencesRecord::from_preferences(preferences).to_json()?;
        self.put_raw_preferences(user, raw)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub preferences: Arc<dyn PreferenceStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(questions: Vec<Question>) -> Self {
        let repo = InMemoryRepository::with_questions(questions);
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo.clone());
        let preferences: Arc<dyn PreferenceStore> = Arc::new(repo);
        Self {
            questions,
            preferences,
        }
    }
}
