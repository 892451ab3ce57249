mod presentation;
mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use service::{PracticeSession, SessionAnswerResult};
pub use view::{CategoryReportItem, SessionReport};
pub use workflow::SessionLoopService;
