#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod identity;
pub mod preferences_service;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, SessionError};
pub use identity::{Identity, IdentityProvider};
pub use preferences_service::{PreferencesService, PreferencesUpdate};

pub use sessions::{
    CategoryReportItem, PracticeSession, SessionAnswerResult, SessionLoopService,
    SessionProgress, SessionReport,
};
