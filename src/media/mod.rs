//! Normalized media model.
//!
//! The upstream response, whatever its shape, is flattened into an ordered
//! list of [`MediaEntry`] values: per media item, the adaptive-streaming
//! manifest (if any) first, then fixed-container variants by descending
//! bitrate.

pub mod enrich;
mod normalize;
mod url_meta;

pub use normalize::extract_media;
pub use url_meta::{parse_variant_url, UrlMeta};

use serde::Serialize;

use crate::twitter::PostId;

/// Quality tag carried by adaptive-streaming manifest entries.
pub const QUALITY_HLS: &str = "HLS";

/// Quality tag for fixed-container variants whose bitrate is unknown.
pub const QUALITY_UNKNOWN: &str = "unknown";

/// One downloadable rendition of a post's media.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    pub video_url: String,
    /// `"HLS"` for a manifest, the decimal bitrate for a fixed-container
    /// variant, or `"unknown"` when the upstream omitted the bitrate.
    pub quality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// `[numerator, denominator]` as reported by the upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<(u32, u32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
}

impl MediaEntry {
    /// True for adaptive-streaming manifest entries.
    pub fn is_manifest(&self) -> bool {
        self.quality == QUALITY_HLS
    }
}

/// The resolved catalog for one post: an immutable, request-scoped snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCatalog {
    pub tweet_id: PostId,
    pub media_list: Vec<MediaEntry>,
}

impl MediaCatalog {
    /// Entries referencing a single fixed-bitrate file, in catalog order
    /// (best first within each media item).
    pub fn fixed_entries(&self) -> impl Iterator<Item = &MediaEntry> {
        self.media_list.iter().filter(|e| !e.is_manifest())
    }

    /// Entry matching an exact quality tag.
    pub fn find_quality(&self, quality: &str) -> Option<&MediaEntry> {
        self.media_list.iter().find(|e| e.quality == quality)
    }
}
