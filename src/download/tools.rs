//! External tool discovery.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::DownloadConfig;

/// Tools the download pipeline can make use of.
const KNOWN_TOOLS: &[&str] = &["ffmpeg"];

/// Availability of a single external tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub name: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Locate ffmpeg, honoring an explicit config path over a PATH lookup.
pub fn find_ffmpeg(config: &DownloadConfig) -> Option<PathBuf> {
    if let Some(path) = &config.ffmpeg_path {
        if path.exists() {
            return Some(path.clone());
        }
        tracing::warn!("Configured ffmpeg path does not exist: {:?}", path);
    }
    which::which("ffmpeg").ok()
}

/// Report availability of every known tool.
pub fn check_tools() -> Vec<ToolStatus> {
    KNOWN_TOOLS
        .iter()
        .map(|name| {
            let path = which::which(name).ok();
            ToolStatus {
                name: (*name).to_string(),
                available: path.is_some(),
                path,
            }
        })
        .collect()
}
