//! Transcoder binary discovery
//!
//! ffmpeg lands in different places depending on how it was installed, so
//! startup probes a small candidate list instead of trusting `PATH` alone.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// Probe `candidates` in order and return the first path whose `-version`
/// run exits successfully within `timeout`. `None` means no usable binary.
pub async fn detect_transcoder(candidates: &[String], timeout: Duration) -> Option<String> {
    for path in candidates {
        if probe(path, timeout).await {
            tracing::info!(binary = %path, "Found working transcoder");
            return Some(path.clone());
        }
        tracing::debug!(binary = %path, "Transcoder probe failed");
    }
    tracing::error!("No working transcoder binary found, install ffmpeg");
    None
}

async fn probe(path: &str, timeout: Duration) -> bool {
    let spawned = Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(_) => return false,
    };

    // A hung probe is dropped and killed with it.
    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => status.success(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

    #[cfg(unix)]
    #[tokio::test]
    async fn test_detect_skips_missing_candidates() {
        // `true` ignores its arguments and exits 0, which is exactly what a
        // working `-version` run looks like to the probe.
        let candidates = vec![
            "/definitely/not/installed/ffmpeg".to_string(),
            "true".to_string(),
        ];

        let found = detect_transcoder(&candidates, PROBE_TIMEOUT).await;

        assert_eq!(found.as_deref(), Some("true"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_detect_rejects_failing_binary() {
        // `false` exits non-zero, so the probe must reject it.
        let candidates = vec!["false".to_string()];

        assert_eq!(detect_transcoder(&candidates, PROBE_TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn test_detect_none_when_all_missing() {
        let candidates = vec![
            "/nope/ffmpeg".to_string(),
            "/also/nope/ffmpeg".to_string(),
        ];

        assert_eq!(detect_transcoder(&candidates, PROBE_TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn test_detect_empty_candidate_list() {
        assert_eq!(detect_transcoder(&[], PROBE_TIMEOUT).await, None);
    }
}
