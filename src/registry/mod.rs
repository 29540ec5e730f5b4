//! Active-stream registry and supervisor
//!
//! The registry maps stream names to worker handles and is the single
//! authority on which streams are live. Every lifecycle operation (start,
//! stop, reload, shutdown) goes through [`StreamSupervisor`].
//!
//! # Architecture
//!
//! ```text
//!                        StreamSupervisor
//!                 ┌───────────────────────────┐
//!                 │ specs:   Vec<StreamSpec>  │
//!                 │ streams: HashMap<Name,    │
//!                 │   StreamHandle {          │
//!                 │     runtime: RwLock<..>,  │
//!                 │     cancel, task,         │
//!                 │   }                       │
//!                 │ >                         │
//!                 └─────────────┬─────────────┘
//!                               │ one task per active stream
//!            ┌──────────────────┼──────────────────┐
//!            │                  │                  │
//!            ▼                  ▼                  ▼
//!       [worker cam1]      [worker cam2]      [worker cam3]
//!       fetch snapshot     fetch snapshot     fetch snapshot
//!            │                  │                  │
//!            └──► buffer file ──► ffmpeg ──► rtsp://host:port/name
//! ```
//!
//! Workers never touch the registry itself: each one shares an
//! `Arc<RwLock<StreamRuntime>>` with its handle, so status queries read
//! fresh per-stream state without coordinating with the loop.

pub mod entry;
pub mod status;
pub mod supervisor;

pub use entry::{StreamPhase, StreamRuntime};
pub use status::{ServiceStatus, StreamListing, StreamStatus};
pub use supervisor::{ReloadOutcome, StartOutcome, StopOutcome, StreamSupervisor};
