#![forbid(unsafe_code)]

pub mod content_service;
pub mod error;
pub mod import;
pub mod profile_service;
pub mod sessions;

pub use quiz_core::Clock;

pub use content_service::ContentService;
pub use error::{ContentError, ImportError, ProfileError, SessionRunError};
pub use import::{ContentBundle, ImportReport, ImportService};
pub use profile_service::ProfileService;
pub use sessions::{ActiveSession, AttemptOutcome, SessionRunner, SessionSnapshot};
