mod plan;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::RoundProgress;
pub use service::{Advance, QuizSession, RoundHandle, SessionState};
pub use workflow::QuizLoopService;
