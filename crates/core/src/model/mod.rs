mod catalog;
mod choice;
mod item;
mod round;
mod settings;

pub use catalog::Catalog;
pub use choice::ChoiceSet;
pub use item::{Item, ItemError, Region, display_name};
pub use round::{
    GuessOutcome, RoundConfig, RoundConfigError, RoundStats, RoundSummary, RoundSummaryError,
};
pub use settings::{QuizSettings, QuizSettingsDraft, QuizSettingsError};
