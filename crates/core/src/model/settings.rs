use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::item::{ItemError, Region};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSettingsError {
    #[error("number of choices must be an even number between 2 and 8, got {0}")]
    InvalidChoices(u32),

    #[error("at least one region must be selected")]
    NoRegions,

    #[error(transparent)]
    Region(#[from] ItemError),
}

/// User-facing quiz preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    choices: u32,
    regions: BTreeSet<Region>,
}

#[derive(Debug, Clone, Default)]
pub struct QuizSettingsDraft {
    pub choices: u32,
    pub regions: Vec<String>,
}

impl QuizSettings {
    pub const DEFAULT_CHOICES: u32 = 4;
    /// Four rows of two buttons.
    pub const MAX_CHOICES: u32 = 8;

    /// Rehydrate settings from storage.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError` when stored values no longer validate.
    pub fn from_persisted(choices: u32, regions: Vec<String>) -> Result<Self, QuizSettingsError> {
        QuizSettingsDraft { choices, regions }.validate()
    }

    #[must_use]
    pub fn choices(&self) -> u32 {
        self.choices
    }

    #[must_use]
    pub fn regions(&self) -> &BTreeSet<Region> {
        &self.regions
    }

    #[must_use]
    pub fn to_draft(&self) -> QuizSettingsDraft {
        QuizSettingsDraft {
            choices: self.choices,
            regions: self.regions.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            choices: Self::DEFAULT_CHOICES,
            regions: Region::all_known().into_iter().collect(),
        }
    }
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new(choices: u32, regions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            choices,
            regions: regions.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether no non-blank region is selected.
    #[must_use]
    pub fn has_no_regions(&self) -> bool {
        self.regions.iter().all(|r| r.trim().is_empty())
    }

    /// Select the default region when nothing is selected.
    ///
    /// Returns `true` if the default was inserted.
    pub fn ensure_region(&mut self) -> bool {
        if self.has_no_regions() {
            self.regions = vec![Region::DEFAULT.to_string()];
            return true;
        }
        false
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError` for an invalid choice count, an empty
    /// selection, or a malformed region name.
    pub fn validate(self) -> Result<QuizSettings, QuizSettingsError> {
        if self.choices < 2 || self.choices > QuizSettings::MAX_CHOICES || self.choices % 2 != 0 {
            return Err(QuizSettingsError::InvalidChoices(self.choices));
        }

        let regions = self
            .regions
            .into_iter()
            .filter(|r| !r.trim().is_empty())
            .map(Region::new)
            .collect::<Result<BTreeSet<_>, _>>()?;
        if regions.is_empty() {
            return Err(QuizSettingsError::NoRegions);
        }

        Ok(QuizSettings {
            choices: self.choices,
            regions,
        })
    }
}
