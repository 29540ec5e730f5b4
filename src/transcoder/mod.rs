//! Transcoder subprocess management
//!
//! One external ffmpeg process per active stream turns the stream's buffer
//! file into a continuous RTSP publish. The subprocess plumbing sits behind
//! two seams: [`TranscoderLauncher`] (how a process is started) and
//! [`LiveFeed`] (one running process), so the worker loop can be exercised
//! in tests without ffmpeg installed.

pub mod command;
pub mod detect;
pub mod process;

pub use detect::detect_transcoder;
pub use process::{FfmpegLauncher, FfmpegTranscoder};

use std::future::Future;
use std::path::Path;

use crate::error::SpawnError;

/// One live transcoding subprocess publishing a single stream.
pub trait LiveFeed: Send {
    /// Non-blocking liveness poll.
    fn is_alive(&mut self) -> bool;

    /// Terminate the process: graceful signal, bounded grace, then force
    /// kill. Completes within the configured graces and is idempotent.
    fn shutdown(&mut self) -> impl Future<Output = ()> + Send;
}

/// Starts transcoder subprocesses.
pub trait TranscoderLauncher: Send + Sync {
    /// Handle type for processes this launcher starts.
    type Feed: LiveFeed + 'static;

    /// Spawn a transcoder publishing `image` as stream `name`.
    ///
    /// At most one live feed may exist per stream name; callers shut the
    /// previous handle down before respawning.
    fn spawn(
        &self,
        name: &str,
        image: &Path,
    ) -> impl Future<Output = Result<Self::Feed, SpawnError>> + Send;

    /// Path of the binary this launcher invokes, for status reporting.
    fn binary(&self) -> &str;
}
