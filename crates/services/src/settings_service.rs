use std::sync::Arc;

use quiz_core::model::{QuizSettings, QuizSettingsDraft, Region};
use storage::repository::SettingsRepository;
use tracing::warn;

use crate::error::SettingsServiceError;

/// Settings after a save, flagging whether the default region had to be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSettings {
    pub settings: QuizSettings,
    pub defaulted_region: bool,
}

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<QuizSettings, SettingsServiceError> {
        let settings = self.repo.get_settings().await?;
        Ok(settings.unwrap_or_default())
    }

    /// Validate and persist new settings.
    ///
    /// An empty region selection is replaced by [`Region::DEFAULT`] before
    /// validation so the quiz always has something to draw from.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if validation fails or persistence fails.
    pub async fn save(
        &self,
        mut draft: QuizSettingsDraft,
    ) -> Result<SavedSettings, SettingsServiceError> {
        let defaulted_region = draft.ensure_region();
        if defaulted_region {
            warn!(region = Region::DEFAULT, "no regions selected, using default");
        }
        let settings = draft.validate()?;
        self.repo.save_settings(&settings).await?;
        Ok(SavedSettings {
            settings,
            defaulted_region,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuizSettingsError;
    use storage::repository::InMemoryRepository;

    fn service() -> SettingsService {
        SettingsService::new(Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn load_falls_back_to_defaults() {
        let settings = service().load().await.unwrap();
        assert_eq!(settings, QuizSettings::default());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let service = service();
        let saved = service
            .save(QuizSettingsDraft::new(8, ["Asia"]))
            .await
            .unwrap();
        assert!(!saved.defaulted_region);
        assert_eq!(service.load().await.unwrap(), saved.settings);
    }

    #[tokio::test]
    async fn empty_selection_gets_default_region() {
        let service = service();
        let saved = service
            .save(QuizSettingsDraft::new(2, Vec::<String>::new()))
            .await
            .unwrap();
        assert!(saved.defaulted_region);
        let regions: Vec<_> = saved.settings.regions().iter().collect();
        assert_eq!(regions, vec![&Region::default_region()]);
    }

    #[tokio::test]
    async fn invalid_choices_are_not_persisted() {
        let service = service();
        let err = service
            .save(QuizSettingsDraft::new(5, ["Europe"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsServiceError::Settings(QuizSettingsError::InvalidChoices(5))
        ));
        assert_eq!(service.load().await.unwrap(), QuizSettings::default());
    }
}
