mod runner;
mod snapshot;

// Public API of the session subsystem.
pub use crate::error::SessionRunError;
pub use runner::{ActiveSession, SessionRunner};
pub use snapshot::{AttemptOutcome, SessionSnapshot};
