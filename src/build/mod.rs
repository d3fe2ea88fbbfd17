//! build
//!
//! Remote build service client.
//!
//! # Modules
//!
//! - [`protocol`] - Wire frames and event parsing
//! - [`session`] - One build session over a WebSocket
//! - [`artifacts`] - Lookup of previously published artifacts
//!
//! # Outcomes
//!
//! A session ends in exactly one of:
//!
//! - `Ok(BuildOutcome { success: true, .. })` after a clean disconnect
//! - `Ok(BuildOutcome { success: false, .. })` when a failure action was seen
//!   before the disconnect
//! - `Err(BuildError)` on an `error` event, a timeout or a transport failure

pub mod artifacts;
pub mod protocol;
pub mod session;

use std::time::Duration;

use thiserror::Error;

pub use artifacts::{ArtifactIndex, HttpArtifactIndex, StaticArtifactIndex};
pub use protocol::{is_failure_action, BuildEvent, FAILED_ACTIONS};
pub use session::{BuildOutcome, BuildParams, BuildSession, SessionState, SessionTimeouts};

/// Errors from the build service.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid build service URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("failed to connect to the build service: {0}")]
    Connect(String),

    #[error("build service did not acknowledge the session within {0:?}")]
    ConnectTimeout(Duration),

    #[error("build session went silent for {0:?}")]
    SessionTimeout(Duration),

    #[error("build service reported an error: {0}")]
    Remote(String),

    #[error("build channel failed: {0}")]
    Transport(String),

    #[error("artifact index lookup failed: {0}")]
    ArtifactIndex(String),
}

impl BuildError {
    /// Whether the error came from one of the session timers.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            BuildError::ConnectTimeout(_) | BuildError::SessionTimeout(_)
        )
    }
}
