//! Error types for mirrorpane-core

use thiserror::Error;

/// Main error type for the mirrorpane-core library
#[derive(Error, Debug)]
pub enum Error {
    /// State accessed through a handle whose owning scope has been torn down.
    ///
    /// This is a structural wiring bug in the caller, never a transient
    /// condition: handles must not outlive the [`StateScope`](crate::StateScope)
    /// that produced them.
    #[error("state accessed outside an active scope")]
    InactiveScope,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decode error for host messages
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for mirrorpane-core
pub type Result<T> = std::result::Result<T, Error>;
