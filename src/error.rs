//! Error types for the stream supervisor
//!
//! The taxonomy is deliberately closed: callers can match on the exact
//! failure class instead of parsing error strings. Worker-local failures
//! (`FetchError`, `SpawnError`) are recoverable and drive the backoff path;
//! the remaining variants surface synchronously from supervisor calls.

use thiserror::Error;

/// Error type for supervisor operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Spec store was unreadable or malformed. Fatal to the load or reload
    /// that hit it; already-running streams are unaffected.
    #[error("config error: {0}")]
    Config(String),

    /// Caller referenced a stream name absent from the loaded specs.
    #[error("unknown stream: {0}")]
    UnknownStream(String),

    /// No working transcoder binary was found at startup.
    #[error("transcoder binary not available")]
    TranscoderUnavailable,

    /// Mutating call arrived after `shutdown`.
    #[error("supervisor has been shut down")]
    SupervisorStopped,

    /// Snapshot fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Transcoder subprocess failed to start.
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    /// Filesystem failure (buffer file or buffer directory).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Network or source failure while fetching a snapshot.
///
/// Always recoverable: the worker records it, backs off, and retries.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The request never produced a response (connect failure, timeout).
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The source answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body could not be read.
    #[error("failed to read body from {url}: {reason}")]
    Body { url: String, reason: String },
}

/// Transcoder subprocess failed to start or died right after starting.
///
/// Recoverable: the worker treats it like a fetch failure and retries on
/// the next iteration.
#[derive(Debug, Clone, Error)]
pub enum SpawnError {
    /// The binary could not be executed at all.
    #[error("failed to launch {binary}: {reason}")]
    Launch { binary: String, reason: String },

    /// The process started but exited within the probe window.
    #[error("transcoder exited immediately: {detail}")]
    EarlyExit { detail: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
