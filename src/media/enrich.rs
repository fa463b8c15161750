//! Best-effort file-size enrichment via header probes.
//!
//! A HEAD request against each entry's video URL backfills
//! `file_size_bytes` from `content-length`. Probes are restricted to an
//! allow-listed set of hosts and run concurrently under a short timeout;
//! every failure downgrades to "enrichment skipped" and never touches the
//! entry, let alone the resolution as a whole.

use std::time::Duration;

use futures::future::join_all;
use tracing::debug;

use super::MediaEntry;

/// Per-probe timeout.
pub const HEAD_TIMEOUT: Duration = Duration::from_secs(3);

/// Hosts the prober is allowed to touch.
pub const ALLOWED_VIDEO_HOSTS: &[&str] = &["video.twimg.com", "pbs.twimg.com"];

fn is_allowed_host(url: &str, allowed: &[&str]) -> bool {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| allowed.contains(&h)))
        .unwrap_or(false)
}

/// Backfill `file_size_bytes` on each entry whose URL points at an allowed
/// host. Entries with disallowed hosts, failed probes, or unparsable
/// headers are left unmodified.
pub async fn enrich_file_sizes(
    client: &reqwest::Client,
    entries: &mut [MediaEntry],
    allowed_hosts: &[&str],
) {
    let probes = entries
        .iter()
        .map(|entry| probe_size(client, &entry.video_url, allowed_hosts));
    let sizes = join_all(probes).await;

    for (entry, size) in entries.iter_mut().zip(sizes) {
        if size.is_some() {
            entry.file_size_bytes = size;
        }
    }
}

async fn probe_size(client: &reqwest::Client, url: &str, allowed_hosts: &[&str]) -> Option<u64> {
    if !is_allowed_host(url, allowed_hosts) {
        return None;
    }

    let resp = client
        .head(url)
        .timeout(HEAD_TIMEOUT)
        .send()
        .await
        .map_err(|e| debug!(url, "size probe failed: {e}"))
        .ok()?;

    if !resp.status().is_success() {
        debug!(url, status = %resp.status(), "size probe returned non-success");
        return None;
    }

    resp.headers()
        .get(reqwest::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
