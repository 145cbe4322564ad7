use async_trait::async_trait;
use sqlx::Row;

use crate::repository::{SettingsRecord, SettingsRepository, StorageError};
use quiz_core::model::QuizSettings;

use super::SqliteRepository;

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<QuizSettings>, StorageError> {
        let row = sqlx::query("SELECT choices, regions FROM quiz_settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let choices: i64 = row
            .try_get("choices")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let regions: String = row
            .try_get("regions")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let choices = u32::try_from(choices)
            .map_err(|_| StorageError::Serialization(format!("choices out of range: {choices}")))?;

        SettingsRecord { choices, regions }.into_settings().map(Some)
    }

    async fn save_settings(&self, settings: &QuizSettings) -> Result<(), StorageError> {
        let record = SettingsRecord::from_settings(settings);
        sqlx::query(
            r"
            INSERT INTO quiz_settings (id, choices, regions)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                choices = excluded.choices,
                regions = excluded.regions
            ",
        )
        .bind(1_i64)
        .bind(i64::from(record.choices))
        .bind(record.regions)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
