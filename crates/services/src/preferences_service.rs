use std::sync::Arc;

use quiz_core::model::{PreferencesDraft, UserId, UserPreferences};
use storage::repository::PreferenceStore;

use crate::error::SessionError;

/// Outcome of saving preferences.
///
/// `persisted` is false when the store failed; the preferences are still
/// valid for the current process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferencesUpdate {
    pub preferences: UserPreferences,
    pub persisted: bool,
}

#[derive(Clone)]
pub struct PreferencesService {
    store: Arc<dyn PreferenceStore>,
}

impl PreferencesService {
    #[must_use]
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Load persisted preferences for `user`.
    ///
    /// Unreadable values are logged and reported as absent, so the user is
    /// sent back through onboarding instead of being locked out.
    pub async fn load(&self, user: &UserId) -> Option<UserPreferences> {
        match self.store.load_preferences(user).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(user = %user, error = %err, "ignoring unreadable preferences");
                None
            }
        }
    }

    /// Starting point for the onboarding form: saved values if any, else defaults.
    pub async fn load_draft(&self, user: &UserId) -> PreferencesDraft {
        self.load(user)
            .await
            .map_or_else(PreferencesDraft::default, |prefs| PreferencesDraft {
                categories: prefs.categories().clone(),
                question_count: prefs.question_count(),
                difficulties: prefs.difficulties().clone(),
            })
    }

    /// Validate and persist new preferences.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Preferences` if validation fails. Storage
    /// failures are not errors; see `PreferencesUpdate::persisted`.
    pub async fn save(
        &self,
        user: &UserId,
        draft: PreferencesDraft,
    ) -> Result<PreferencesUpdate, SessionError> {
        let preferences = draft.validate()?;
        let persisted = self.persist(user, &preferences).await;
        Ok(PreferencesUpdate {
            preferences,
            persisted,
        })
    }

    /// Best-effort write. Returns whether the store accepted it.
    pub async fn persist(&self, user: &UserId, preferences: &UserPreferences) -> bool {
        match self.store.save_preferences(user, preferences).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(user = %user, error = %err, "failed to persist preferences");
                false
            }
        }
    }
}
