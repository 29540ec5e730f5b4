//! # stillcast
//!
//! Still-image to RTSP live stream supervisor.
//!
//! Turns periodically refreshed still images (webcams, radar tiles, status
//! boards) into continuous RTSP video feeds. A [`StreamSupervisor`] runs
//! one worker task per stream; each worker fetches its snapshot on an
//! interval, rewrites a buffer file, and keeps an ffmpeg process publishing
//! that file as live video to an RTSP server such as MediaMTX.
//!
//! # Quick Start
//!
//! ```no_run
//! use stillcast::{StreamSupervisor, SupervisorConfig};
//!
//! #[tokio::main]
//! async fn main() -> stillcast::Result<()> {
//!     let config = SupervisorConfig::from_env();
//!     let supervisor = StreamSupervisor::start(config).await?;
//!
//!     for listing in supervisor.list_streams().await {
//!         println!("{} -> {}", listing.name, listing.published_url);
//!     }
//!
//!     tokio::signal::ctrl_c().await?;
//!     supervisor.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: supervisor settings and the stream spec store
//! - [`fetch`]: snapshot download over HTTP
//! - [`transcoder`]: ffmpeg detection, invocation, and process lifecycle
//! - [`registry`]: the supervisor and per-stream runtime state

pub mod config;
pub mod error;
pub mod fetch;
pub mod registry;
pub mod transcoder;

mod worker;

pub use config::{Credentials, SpecStore, StreamSpec, SupervisorConfig};
pub use error::{Error, FetchError, Result, SpawnError};
pub use fetch::{HttpFetcher, SnapshotFetcher};
pub use registry::{
    ReloadOutcome, ServiceStatus, StartOutcome, StopOutcome, StreamListing, StreamPhase,
    StreamStatus, StreamSupervisor,
};
pub use transcoder::{
    detect_transcoder, FfmpegLauncher, FfmpegTranscoder, LiveFeed, TranscoderLauncher,
};
