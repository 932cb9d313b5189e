use thiserror::Error;

/// Errors surfaced by the publishing workflow.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Usage: {0}")]
    Usage(String),

    /// The edit could not be opened, is stale, conflicts with another
    /// committed edit, or was already committed or discarded.
    #[error("Edit session error: {0}")]
    Session(String),

    #[error("Track not found: {0}")]
    TrackNotFound(String),

    #[error("No release on track '{track}' contains version code {version_code}")]
    ReleaseNotFound { track: String, version_code: i64 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Server(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
