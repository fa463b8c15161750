//! Resolution and codec metadata mined from variant URL paths.
//!
//! Fixed-container variant URLs encode their resolution (and on newer
//! paths the codec) only as path segments, e.g.
//! `/vid/avc1/1280x720/xyz.mp4` or the legacy `/vid/720x1280/xyz.mp4`.
//! An unmatched URL simply yields no metadata, never an error.

use std::sync::LazyLock;

use regex::Regex;

/// `/vid/<codec>/<width>x<height>/`
static CODEC_RESOLUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/vid/([A-Za-z0-9]+)/(\d+)x(\d+)/").expect("codec-resolution pattern is valid")
});

/// Legacy `/vid/<width>x<height>/` with no codec segment.
static RESOLUTION_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/vid/(\d+)x(\d+)/").expect("resolution pattern is valid")
});

/// Upstream codec tokens mapped to display names. Unrecognized tokens pass
/// through unchanged.
const CODEC_NAMES: &[(&str, &str)] = &[("avc1", "H.264"), ("av01", "AV1")];

/// Metadata recovered from a variant URL path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMeta {
    pub width: u32,
    pub height: u32,
    pub codec: Option<String>,
}

/// Try the codec-bearing pattern first, then the legacy one.
pub fn parse_variant_url(url: &str) -> Option<UrlMeta> {
    if let Some(caps) = CODEC_RESOLUTION.captures(url) {
        return Some(UrlMeta {
            width: caps[2].parse().ok()?,
            height: caps[3].parse().ok()?,
            codec: Some(codec_name(&caps[1])),
        });
    }

    if let Some(caps) = RESOLUTION_ONLY.captures(url) {
        return Some(UrlMeta {
            width: caps[1].parse().ok()?,
            height: caps[2].parse().ok()?,
            codec: None,
        });
    }

    None
}

fn codec_name(token: &str) -> String {
    CODEC_NAMES
        .iter()
        .find(|(t, _)| *t == token)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| token.to_string())
}
