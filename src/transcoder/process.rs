//! ffmpeg process lifecycle
//!
//! Spawning with an early-exit probe, stderr draining into the log, and
//! bounded two-stage teardown (terminate, wait, kill, wait).

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::time::timeout;

use crate::config::SupervisorConfig;
use crate::error::SpawnError;

use super::command::transcode_args;
use super::{LiveFeed, TranscoderLauncher};

/// How long to wait for stderr output from a transcoder that died at spawn.
const STDERR_TAIL_TIMEOUT: Duration = Duration::from_millis(250);

/// A running ffmpeg process publishing one stream.
#[derive(Debug)]
pub struct FfmpegTranscoder {
    child: Child,
    stream: String,
    term_grace: Duration,
    kill_grace: Duration,
}

impl LiveFeed for FfmpegTranscoder {
    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    async fn shutdown(&mut self) {
        if !self.is_alive() {
            return;
        }

        send_term(&mut self.child);
        match timeout(self.term_grace, self.child.wait()).await {
            Ok(_) => {
                tracing::debug!(stream = %self.stream, "Transcoder exited after terminate");
                return;
            }
            Err(_) => {
                tracing::warn!(
                    stream = %self.stream,
                    grace_secs = self.term_grace.as_secs(),
                    "Transcoder ignored terminate, killing"
                );
            }
        }

        let _ = self.child.start_kill();
        if timeout(self.kill_grace, self.child.wait()).await.is_err() {
            tracing::error!(stream = %self.stream, "Transcoder still not reaped after kill");
        }
    }
}

/// SIGTERM first so ffmpeg can close the RTSP session cleanly.
#[cfg(unix)]
fn send_term(child: &mut Child) {
    if let Some(pid) = child.id() {
        // pid belongs to our own un-reaped child.
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGTERM);
        }
    }
}

#[cfg(not(unix))]
fn send_term(child: &mut Child) {
    let _ = child.start_kill();
}

/// Spawns ffmpeg processes configured for still-image RTSP publishing.
pub struct FfmpegLauncher {
    binary: String,
    config: SupervisorConfig,
}

impl FfmpegLauncher {
    /// Create a launcher around a detected ffmpeg binary.
    pub fn new(binary: impl Into<String>, config: SupervisorConfig) -> Self {
        Self {
            binary: binary.into(),
            config,
        }
    }
}

impl TranscoderLauncher for FfmpegLauncher {
    type Feed = FfmpegTranscoder;

    async fn spawn(&self, name: &str, image: &Path) -> Result<FfmpegTranscoder, SpawnError> {
        let publish_url = self.config.publish_url(name);
        let args = transcode_args(image, &publish_url, self.config.frame_rate);

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpawnError::Launch {
                binary: self.binary.clone(),
                reason: e.to_string(),
            })?;

        let stderr = child.stderr.take();

        // A rejected invocation (bad args, unreachable RTSP server) dies
        // within the probe window rather than limping along.
        tokio::time::sleep(self.config.spawn_probe_delay).await;
        if let Ok(Some(status)) = child.try_wait() {
            let tail = match stderr {
                Some(pipe) => stderr_tail(pipe).await,
                None => String::new(),
            };
            let detail = if tail.is_empty() {
                status.to_string()
            } else {
                format!("{}; {}", status, tail)
            };
            tracing::error!(stream = %name, %status, "Transcoder exited immediately after spawn");
            return Err(SpawnError::EarlyExit { detail });
        }

        if let Some(pipe) = stderr {
            drain_stderr(name.to_string(), pipe);
        }

        tracing::info!(
            stream = %name,
            binary = %self.binary,
            image = %image.display(),
            "Transcoder started"
        );

        Ok(FfmpegTranscoder {
            child,
            stream: name.to_string(),
            term_grace: self.config.term_grace,
            kill_grace: self.config.kill_grace,
        })
    }

    fn binary(&self) -> &str {
        &self.binary
    }
}

/// Collect the last few stderr lines of a transcoder that already exited.
async fn stderr_tail(mut pipe: ChildStderr) -> String {
    let mut buf = Vec::new();
    let _ = timeout(STDERR_TAIL_TIMEOUT, pipe.read_to_end(&mut buf)).await;
    let text = String::from_utf8_lossy(&buf);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(4);
    lines[start..].join("; ")
}

/// Forward transcoder stderr to the log so encoder noise is visible at
/// debug level instead of filling the pipe.
fn drain_stderr(stream: String, pipe: ChildStderr) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            tracing::debug!(stream = %stream, "ffmpeg: {}", line);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> SupervisorConfig {
        SupervisorConfig::default().spawn_probe_delay(Duration::from_millis(50))
    }

    #[cfg(unix)]
    fn spawn_raw(program: &str, args: &[&str]) -> Child {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .unwrap()
    }

    #[cfg(unix)]
    fn wrap(child: Child, term_grace: Duration, kill_grace: Duration) -> FfmpegTranscoder {
        FfmpegTranscoder {
            child,
            stream: "cam1".to_string(),
            term_grace,
            kill_grace,
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_live_process_reports_alive_until_shutdown() {
        let child = spawn_raw("sleep", &["30"]);
        let mut feed = wrap(child, Duration::from_secs(2), Duration::from_secs(1));

        assert!(feed.is_alive());
        feed.shutdown().await;
        assert!(!feed.is_alive());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exited_process_reports_dead() {
        let child = spawn_raw("true", &[]);
        let mut feed = wrap(child, Duration::from_secs(1), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!feed.is_alive());

        // Shutdown on an already-dead process is a no-op.
        feed.shutdown().await;
        assert!(!feed.is_alive());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shutdown_escalates_to_kill() {
        // Ignores SIGTERM, so only the kill stage can end it.
        let child = spawn_raw("sh", &["-c", "trap '' TERM; sleep 30"]);
        let mut feed = wrap(child, Duration::from_millis(300), Duration::from_secs(2));

        assert!(feed.is_alive());
        let started = std::time::Instant::now();
        feed.shutdown().await;
        assert!(!feed.is_alive());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_early_exit_is_spawn_error() {
        let launcher = FfmpegLauncher::new("false", quick_config());

        let err = launcher
            .spawn("cam1", Path::new("/tmp/cam1.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, SpawnError::EarlyExit { .. }));
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_error() {
        let launcher = FfmpegLauncher::new("/no/such/dir/ffmpeg", quick_config());

        let err = launcher
            .spawn("cam1", Path::new("/tmp/cam1.jpg"))
            .await
            .unwrap_err();
        match err {
            SpawnError::Launch { binary, .. } => assert_eq!(binary, "/no/such/dir/ffmpeg"),
            other => panic!("expected launch error, got {other:?}"),
        }
    }
}
