use std::sync::Arc;

use quiz_core::model::{Catalog, RoundConfig};
use rand::Rng;
use storage::catalog::CatalogProvider;

use super::service::{QuizSession, RoundHandle};
use crate::error::{QuizLoopError, SessionError};
use crate::settings_service::SettingsService;

/// Starts rounds from the stored settings and a fresh catalog.
#[derive(Clone)]
pub struct QuizLoopService {
    settings: SettingsService,
    catalogs: Arc<dyn CatalogProvider>,
    round_size: usize,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(settings: SettingsService, catalogs: Arc<dyn CatalogProvider>) -> Self {
        Self {
            settings,
            catalogs,
            round_size: RoundConfig::DEFAULT_ROUND_SIZE,
        }
    }

    #[must_use]
    pub fn with_round_size(mut self, round_size: usize) -> Self {
        self.round_size = round_size;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    /// Rebuild the catalog for the currently selected regions.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoopError` when settings or assets cannot be read.
    pub async fn current_catalog(&self) -> Result<Catalog, QuizLoopError> {
        let settings = self.settings.load().await?;
        Ok(self.catalogs.catalog_for(settings.regions())?)
    }

    /// Start a new round on `session`, discarding whatever it was doing.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoopError` for settings, catalog, or session start failures.
    pub async fn start_round<R: Rng>(
        &self,
        session: &mut QuizSession<R>,
    ) -> Result<RoundHandle, QuizLoopError> {
        let settings = self.settings.load().await?;
        let catalog = self.catalogs.catalog_for(settings.regions())?;
        let choices = usize::try_from(settings.choices()).unwrap_or(usize::MAX);
        let config = RoundConfig::new(self.round_size, choices).map_err(SessionError::from)?;
        Ok(session.start_configured(catalog, config)?)
    }
}
