//! Per-stream runtime state
//!
//! [`StreamRuntime`] is the mutable record a worker task updates as its
//! cycles complete; the supervisor shares it through an `Arc<RwLock<_>>`
//! inside a [`StreamHandle`] so status queries never touch the worker.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::StreamSpec;

/// Lifecycle phase of a supervised stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamPhase {
    /// Worker accepted, no update cycle completed yet.
    Starting,
    /// Last update cycle succeeded.
    Running,
    /// Last update cycle failed; the worker is backing off before retrying.
    Error,
    /// The worker has exited.
    Stopped,
}

/// Mutable runtime state of one supervised stream.
#[derive(Debug, Clone)]
pub struct StreamRuntime {
    /// Spec this worker was started from.
    pub spec: StreamSpec,

    /// Current lifecycle phase.
    pub phase: StreamPhase,

    /// Time of the most recent successful update cycle.
    pub last_update: Option<DateTime<Utc>>,

    /// Failed cycles since the last success.
    pub consecutive_errors: u32,

    /// Reason of the most recent failed cycle; cleared on recovery.
    pub last_error: Option<String>,
}

impl StreamRuntime {
    /// Fresh runtime for a newly accepted stream.
    pub fn new(spec: StreamSpec) -> Self {
        Self {
            spec,
            phase: StreamPhase::Starting,
            last_update: None,
            consecutive_errors: 0,
            last_error: None,
        }
    }

    /// Record a completed update cycle.
    pub fn record_success(&mut self) {
        self.phase = StreamPhase::Running;
        self.last_update = Some(Utc::now());
        self.consecutive_errors = 0;
        self.last_error = None;
    }

    /// Record a failed update cycle and return the new consecutive count.
    pub fn record_failure(&mut self, reason: String) -> u32 {
        self.phase = StreamPhase::Error;
        self.consecutive_errors += 1;
        self.last_error = Some(reason);
        self.consecutive_errors
    }
}

/// Supervisor-side handle to one worker task.
pub(crate) struct StreamHandle {
    /// Shared with the worker, which mutates it as cycles complete.
    pub(crate) runtime: Arc<RwLock<StreamRuntime>>,

    /// Cancelling this asks the worker to exit and tear its feed down.
    pub(crate) cancel: CancellationToken,

    /// Worker task; the stop path takes it so exactly one caller joins.
    pub(crate) task: Option<JoinHandle<()>>,

    /// Set while a stop is in flight so a concurrent start neither reuses
    /// nor duplicates the entry.
    pub(crate) stopping: bool,
}

impl StreamHandle {
    pub(crate) fn new(
        runtime: Arc<RwLock<StreamRuntime>>,
        cancel: CancellationToken,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            runtime,
            cancel,
            task: Some(task),
            stopping: false,
        }
    }
}
