//! Download and transcode collaborator.
//!
//! Fixed-container variants stream straight through. Manifest sources and
//! container conversions go through ffmpeg, writing into a
//! [`TempDir`]-scoped workspace that is removed on every exit path,
//! including failure.

pub mod tools;

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::media::MediaEntry;
use crate::output::VideoFormat;

/// ffmpeg gets at most this long per job.
const TRANSCODE_TIMEOUT: Duration = Duration::from_secs(600);

/// A finished transcode. The output file lives inside the workspace;
/// dropping this removes the temporary directory and everything in it.
/// Readers that opened the file before the drop keep a valid handle.
#[derive(Debug)]
pub struct TranscodedFile {
    pub path: PathBuf,
    _workspace: TempDir,
}

/// Runs ffmpeg jobs and direct downloads.
pub struct Downloader {
    ffmpeg: Option<PathBuf>,
}

impl Downloader {
    pub fn new(ffmpeg: Option<PathBuf>) -> Self {
        Self { ffmpeg }
    }

    pub fn ffmpeg_available(&self) -> bool {
        self.ffmpeg.is_some()
    }

    /// Fetch `source_url`, a direct file or an HLS manifest, through
    /// ffmpeg, encoding into `format`.
    pub async fn transcode(&self, source_url: &str, format: VideoFormat) -> Result<TranscodedFile> {
        let ffmpeg = self.ffmpeg.as_ref().ok_or_else(|| {
            Error::tool(
                "ffmpeg",
                "not found; install ffmpeg to download streams or convert formats",
            )
        })?;

        let workspace = TempDir::new()?;
        let output = workspace
            .path()
            .join(format!("output.{}", format.extension()));

        let mut cmd = Command::new(ffmpeg);
        cmd.arg("-i")
            .arg(source_url)
            .args([
                "-c:v",
                "libx264",
                "-c:a",
                "aac",
                "-preset",
                "medium",
                "-crf",
                "23",
                "-movflags",
                "+faststart",
                "-pix_fmt",
                "yuv420p",
                "-y",
            ])
            .arg(&output)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::piped());

        debug!(url = source_url, output = %output.display(), "running ffmpeg");

        let child = cmd
            .spawn()
            .map_err(|e| Error::tool("ffmpeg", format!("failed to spawn: {e}")))?;

        match tokio::time::timeout(TRANSCODE_TIMEOUT, child.wait_with_output()).await {
            Ok(Ok(out)) if out.status.success() => Ok(TranscodedFile {
                path: output,
                _workspace: workspace,
            }),
            Ok(Ok(out)) => Err(Error::tool(
                "ffmpeg",
                format!(
                    "exited with {}: {}",
                    out.status,
                    String::from_utf8_lossy(&out.stderr).trim()
                ),
            )),
            Ok(Err(e)) => Err(Error::tool(
                "ffmpeg",
                format!("I/O error waiting for process: {e}"),
            )),
            Err(_elapsed) => Err(Error::tool(
                "ffmpeg",
                format!("timed out after {TRANSCODE_TIMEOUT:?}"),
            )),
        }
    }

    /// Stream a fixed-container variant to `dest` without re-encoding.
    pub async fn save_direct(
        &self,
        client: &reqwest::Client,
        url: &str,
        dest: &Path,
    ) -> Result<()> {
        let resp = client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::UpstreamRequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Error::UpstreamRequestFailed(format!(
                "video fetch returned {}",
                resp.status()
            )));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::UpstreamRequestFailed(e.to_string()))?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(())
    }

    /// Download `entry` to `dest` in the requested format.
    ///
    /// Plain mp4 variants are saved directly; manifest entries and format
    /// conversions run through [`Self::transcode`] and the result is moved
    /// into place.
    pub async fn download_to(
        &self,
        client: &reqwest::Client,
        entry: &MediaEntry,
        format: VideoFormat,
        dest: &Path,
    ) -> Result<()> {
        if !entry.video_url.starts_with("https://") {
            return Err(Error::UpstreamRequestFailed(
                "refusing to fetch non-HTTPS video URL".to_string(),
            ));
        }

        if entry.is_manifest() || format != VideoFormat::Mp4 {
            let transcoded = self.transcode(&entry.video_url, format).await?;
            // Rename works within a filesystem; the temp dir may be on
            // another one, so fall back to copy.
            if std::fs::rename(&transcoded.path, dest).is_err() {
                std::fs::copy(&transcoded.path, dest)?;
            }
            return Ok(());
        }

        self.save_direct(client, &entry.video_url, dest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn entry(url: &str, quality: &str) -> MediaEntry {
        MediaEntry {
            video_url: url.to_string(),
            quality: quality.to_string(),
            thumbnail_url: None,
            width: None,
            height: None,
            aspect_ratio: None,
            duration_ms: None,
            video_codec: None,
            audio_codec: None,
            file_size_bytes: None,
        }
    }

    #[tokio::test]
    async fn transcode_without_ffmpeg_fails_with_tool_error() {
        let downloader = Downloader::new(None);
        let result = downloader
            .transcode("https://video.twimg.com/pl/m.m3u8", VideoFormat::Mp4)
            .await;
        assert_matches!(result, Err(Error::Tool { .. }));
    }

    #[tokio::test]
    async fn download_rejects_insecure_urls() {
        let downloader = Downloader::new(None);
        let client = reqwest::Client::new();
        let dest = std::env::temp_dir().join("talon-test-never-written.mp4");
        let result = downloader
            .download_to(
                &client,
                &entry("http://video.twimg.com/v.mp4", "832000"),
                VideoFormat::Mp4,
                &dest,
            )
            .await;
        assert_matches!(result, Err(Error::UpstreamRequestFailed(_)));
        assert!(!dest.exists());
    }

    #[test]
    fn ffmpeg_availability_reflects_construction() {
        assert!(!Downloader::new(None).ffmpeg_available());
        assert!(Downloader::new(Some(PathBuf::from("/usr/bin/ffmpeg"))).ffmpeg_available());
    }
}
