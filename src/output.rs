//! Output format validation and filename sanitization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::twitter::PostId;

/// Containers the download pipeline can produce. `mov` output goes through
/// the ffmpeg conversion path; narrowing support back to mp4-only is a
/// matter of editing this list.
pub const SUPPORTED_FORMATS: &[VideoFormat] = &[VideoFormat::Mp4, VideoFormat::Mov];

/// Prefix of the fallback output filename.
pub const DEFAULT_FILENAME_PREFIX: &str = "twitter_video";

/// A supported output container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    #[default]
    Mp4,
    Mov,
}

impl VideoFormat {
    /// Validate a requested container tag.
    ///
    /// The match is a case-sensitive exact comparison against
    /// [`SUPPORTED_FORMATS`]; `"MP4"` is rejected just like `"avi"`.
    pub fn parse(input: &str) -> Result<Self> {
        SUPPORTED_FORMATS
            .iter()
            .copied()
            .find(|f| f.extension() == input)
            .ok_or_else(|| Error::UnsupportedFormat(input.to_string()))
    }

    /// Canonical file extension (no leading dot).
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mov => "mov",
        }
    }

    /// MIME type of the container.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Mov => "video/quicktime",
        }
    }

    /// Comma-separated list of supported extensions, for error messages.
    pub fn supported_list() -> String {
        SUPPORTED_FORMATS
            .iter()
            .map(|f| f.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Derive a safe output filename from an optional user-supplied path.
///
/// Directory components are discarded outright, which is the traversal
/// defense, then any existing extension is replaced with the format's
/// canonical one. An absent path, or one that reduces to an empty basename
/// (`"/"`, `"dir/"`), yields `twitter_video_<id>.<format>`.
pub fn output_filename(user_path: Option<&str>, id: &PostId, format: VideoFormat) -> String {
    let fallback = || format!("{DEFAULT_FILENAME_PREFIX}_{id}.{}", format.extension());

    let Some(path) = user_path else {
        return fallback();
    };

    // Both separator styles are stripped regardless of platform: a filename
    // must never carry either.
    let basename = path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let stem = match basename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => basename,
    };

    if stem.is_empty() {
        return fallback();
    }

    format!("{stem}.{}", format.extension())
}
