use async_trait::async_trait;
use chrono::Utc;
use quiz_core::model::{UserId, UserPreferences};

use super::SqliteRepository;
use super::mapping::conn;
use crate::repository::{PreferenceStore, PreferencesRecord, StorageError};

#[async_trait]
impl PreferenceStore for SqliteRepository {
    async fn load_preferences(
        &self,
        user: &UserId,
    ) -> Result<Option<UserPreferences>, StorageError> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT preferences FROM user_preferences WHERE user_id = ?1")
                .bind(user.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(conn)?;

        raw.map(|raw| PreferencesRecord::from_json(&raw).map(PreferencesRecord::into_preferences))
            .transpose()
    }

    async fn save_preferences(
        &self,
        user: &UserId,
        preferences: &UserPreferences,
    ) -> Result<(), StorageError> {
        let raw = PreferencesRecord::from_preferences(preferences).to_json()?;

        sqlx::query(
            r"
            INSERT INTO user_preferences (user_id, preferences, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                preferences = excluded.preferences,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user.as_str())
        .bind(raw)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
