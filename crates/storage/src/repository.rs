use async_trait::async_trait;
use quiz_core::model::QuizSettings;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of the quiz settings row.
///
/// Regions are stored as a comma separated list so the row stays a plain
/// key-value record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRecord {
    pub choices: u32,
    pub regions: String,
}

impl SettingsRecord {
    #[must_use]
    pub fn from_settings(settings: &QuizSettings) -> Self {
        let regions = settings
            .regions()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Self {
            choices: settings.choices(),
            regions,
        }
    }

    /// Convert the record back into validated settings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored values no longer validate.
    pub fn into_settings(self) -> Result<QuizSettings, StorageError> {
        let regions = self
            .regions
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect();
        QuizSettings::from_persisted(self.choices, regions)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }
}

/// Repository contract for the single settings record.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Fetch stored settings, if any were saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures or unreadable rows.
    async fn get_settings(&self) -> Result<Option<QuizSettings>, StorageError>;

    /// Persist settings, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &QuizSettings) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    settings: Arc<Mutex<Option<SettingsRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<QuizSettings>, StorageError> {
        let guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clone().map(SettingsRecord::into_settings).transpose()
    }

    async fn save_settings(&self, settings: &QuizSettings) -> Result<(), StorageError> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(SettingsRecord::from_settings(settings));
        Ok(())
    }
}

/// Repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub settings: Arc<dyn SettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let settings: Arc<dyn SettingsRepository> = Arc::new(InMemoryRepository::new());
        Self { settings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuizSettingsDraft;

    #[tokio::test]
    async fn in_memory_starts_empty_and_round_trips() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_settings().await.unwrap().is_none());

        let settings = QuizSettingsDraft::new(6, ["Europe", "Asia"])
            .validate()
            .unwrap();
        repo.save_settings(&settings).await.unwrap();

        let fetched = repo.get_settings().await.unwrap().unwrap();
        assert_eq!(fetched, settings);
    }

    #[test]
    fn record_joins_regions_in_order() {
        let settings = QuizSettingsDraft::new(2, ["Oceania", "Africa"])
            .validate()
            .unwrap();
        let record = SettingsRecord::from_settings(&settings);
        assert_eq!(record.regions, "Africa,Oceania");
        assert_eq!(record.into_settings().unwrap(), settings);
    }

    #[test]
    fn record_with_invalid_choices_fails_to_load() {
        let record = SettingsRecord {
            choices: 5,
            regions: "Europe".into(),
        };
        assert!(matches!(
            record.into_settings(),
            Err(StorageError::Serialization(_))
        ));
    }
}
