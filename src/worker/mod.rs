//! Per-stream worker loop
//!
//! Each active stream is one spawned task running [`run`]: fetch the
//! snapshot, write it into the buffer file, make sure a transcoder is
//! publishing it, sleep, repeat. A failed cycle marks the runtime and
//! stretches the sleep; cancellation tears the transcoder down before the
//! task exits.

mod backoff;

pub(crate) use backoff::backoff_delay;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::config::StreamSpec;
use crate::error::Error;
use crate::fetch::SnapshotFetcher;
use crate::registry::entry::{StreamPhase, StreamRuntime};
use crate::transcoder::{LiveFeed, TranscoderLauncher};

/// Everything one worker task needs, moved into the task at spawn.
pub(crate) struct WorkerContext<F, L>
where
    F: SnapshotFetcher,
    L: TranscoderLauncher,
{
    pub(crate) spec: StreamSpec,
    pub(crate) runtime: Arc<RwLock<StreamRuntime>>,
    pub(crate) fetcher: Arc<F>,
    pub(crate) launcher: Arc<L>,
    pub(crate) buffer_path: PathBuf,
    pub(crate) backoff_base: Duration,
    pub(crate) backoff_cap: Duration,
    pub(crate) cancel: CancellationToken,
}

/// Worker task body. Runs until the cancellation token fires, then shuts
/// the live feed down and marks the runtime `Stopped`.
pub(crate) async fn run<F, L>(ctx: WorkerContext<F, L>)
where
    F: SnapshotFetcher,
    L: TranscoderLauncher,
{
    let name = ctx.spec.name.clone();
    tracing::debug!(stream = %name, "Worker started");
    let mut feed: Option<L::Feed> = None;

    loop {
        let sleep_for = tokio::select! {
            _ = ctx.cancel.cancelled() => break,
            outcome = update_cycle(&ctx, &mut feed) => match outcome {
                Ok(()) => {
                    ctx.runtime.write().await.record_success();
                    ctx.spec.poll_interval()
                }
                Err(e) => {
                    let errors = ctx.runtime.write().await.record_failure(e.to_string());
                    let delay = backoff_delay(errors, ctx.backoff_base, ctx.backoff_cap);
                    tracing::warn!(
                        stream = %name,
                        error = %e,
                        consecutive_errors = errors,
                        backoff_secs = delay.as_secs(),
                        "Update cycle failed"
                    );
                    delay
                }
            },
        };

        tokio::select! {
            _ = ctx.cancel.cancelled() => break,
            _ = tokio::time::sleep(sleep_for) => {}
        }
    }

    if let Some(mut live) = feed.take() {
        live.shutdown().await;
    }
    ctx.runtime.write().await.phase = StreamPhase::Stopped;
    tracing::debug!(stream = %name, "Worker exited");
}

/// One update cycle: fetch, rewrite the buffer file, and respawn the
/// transcoder if it is missing or dead.
async fn update_cycle<F, L>(
    ctx: &WorkerContext<F, L>,
    feed: &mut Option<L::Feed>,
) -> Result<(), Error>
where
    F: SnapshotFetcher,
    L: TranscoderLauncher,
{
    let image = ctx.fetcher.fetch(&ctx.spec.source_url).await?;
    tokio::fs::write(&ctx.buffer_path, &image).await?;
    tracing::trace!(
        stream = %ctx.spec.name,
        bytes = image.len(),
        "Buffer file updated"
    );

    // ffmpeg keeps re-reading the buffer file, so an alive feed picks the
    // new frame up on its own and only a dead one needs replacing.
    let alive = feed.as_mut().map(|f| f.is_alive()).unwrap_or(false);
    if !alive {
        if let Some(mut dead) = feed.take() {
            tracing::warn!(stream = %ctx.spec.name, "Transcoder died, respawning");
            dead.shutdown().await;
        }
        *feed = Some(ctx.launcher.spawn(&ctx.spec.name, &ctx.buffer_path).await?);
    }

    Ok(())
}
