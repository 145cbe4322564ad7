#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;
pub mod settings_service;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::{QuizLoopError, SessionError, SettingsServiceError};
pub use sessions::{Advance, QuizLoopService, QuizSession, RoundHandle, RoundProgress, SessionState};
pub use settings_service::{SavedSettings, SettingsService};
