//! Normalization of raw tweet lookup responses.
//!
//! The upstream schema varies with the post's visibility state and has
//! shifted across API revisions, so only the fields the normalizer reads
//! are modeled, all of them optional. The result shape is resolved through
//! the `__typename` discriminator plus an explicit ordered list of lookup
//! paths for the media array, with no structural guessing beyond that
//! order.

use serde::Deserialize;

use super::{url_meta, MediaEntry, QUALITY_HLS, QUALITY_UNKNOWN};
use crate::error::{Error, Result};

const MIME_HLS: &str = "application/x-mpegURL";
const MIME_MP4: &str = "video/mp4";

/// The upstream never reports the audio codec separately; fixed-container
/// variants ship AAC audio.
const AUDIO_CODEC: &str = "aac";

/// Discriminator tags marking a post as gone or withheld.
const UNAVAILABLE_TYPES: &[&str] = &["TweetTombstone", "TweetUnavailable"];

#[derive(Debug, Deserialize)]
struct TweetLookupResponse {
    data: Option<LookupData>,
}

#[derive(Debug, Deserialize)]
struct LookupData {
    #[serde(rename = "tweetResult")]
    tweet_result: Option<TweetResult>,
}

#[derive(Debug, Deserialize)]
struct TweetResult {
    result: Option<ResultNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResultNode {
    #[serde(rename = "__typename")]
    typename: Option<String>,
    legacy: Option<LegacyTweet>,
    /// Present on visibility-wrapped results.
    tweet: Option<WrappedTweet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WrappedTweet {
    legacy: Option<LegacyTweet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyTweet {
    entities: Option<Entities>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Entities {
    media: Option<Vec<MediaItem>>,
}

#[derive(Debug, Deserialize)]
struct MediaItem {
    #[serde(rename = "type")]
    media_type: String,
    #[serde(default)]
    media_url_https: Option<String>,
    #[serde(default)]
    video_info: Option<VideoInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VideoInfo {
    aspect_ratio: Option<Vec<u32>>,
    duration_millis: Option<u64>,
    variants: Vec<RawVariant>,
}

#[derive(Debug, Deserialize)]
struct RawVariant {
    #[serde(default)]
    bitrate: Option<u64>,
    content_type: String,
    url: String,
}

/// Turn a raw lookup response into an ordered list of media entries.
///
/// Per media item of type `video` or `animated_gif`: the HLS manifest
/// variant (if any) is emitted first with quality `"HLS"`, followed by the
/// mp4 variants sorted by descending bitrate (stable; a missing bitrate
/// counts as 0 and renders as `"unknown"`). Items of any other type
/// contribute nothing. Multiple media items keep their upstream order.
pub fn extract_media(response: serde_json::Value) -> Result<Vec<MediaEntry>> {
    let parsed: TweetLookupResponse =
        serde_json::from_value(response).map_err(|_| Error::UpstreamDataMissing)?;

    let result = parsed
        .data
        .and_then(|d| d.tweet_result)
        .and_then(|r| r.result)
        .ok_or(Error::UpstreamDataMissing)?;

    if let Some(tag) = result.typename.as_deref() {
        if UNAVAILABLE_TYPES.contains(&tag) {
            return Err(Error::PostUnavailable);
        }
    }

    // The media array moves depending on the result shape: standard posts
    // carry it at legacy.entities.media, visibility-wrapped posts one level
    // down at tweet.legacy.entities.media. Tried in that order.
    let media = result
        .legacy
        .and_then(|l| l.entities)
        .and_then(|e| e.media)
        .or_else(|| {
            result
                .tweet
                .and_then(|t| t.legacy)
                .and_then(|l| l.entities)
                .and_then(|e| e.media)
        })
        .ok_or(Error::NoMediaFound)?;

    let mut entries = Vec::new();

    for item in media {
        if item.media_type != "video" && item.media_type != "animated_gif" {
            continue;
        }
        let Some(info) = item.video_info else {
            continue;
        };

        // Thumbnails are only carried over a secure scheme; anything else
        // is dropped rather than passed along.
        let thumbnail = item
            .media_url_https
            .filter(|url| url.starts_with("https://"));

        let aspect_ratio = info.aspect_ratio.as_deref().and_then(|r| match r {
            &[num, den] => Some((num, den)),
            _ => None,
        });
        let duration_ms = info.duration_millis;

        let manifest = info.variants.iter().find(|v| v.content_type == MIME_HLS);
        let mut fixed: Vec<&RawVariant> = info
            .variants
            .iter()
            .filter(|v| v.content_type == MIME_MP4)
            .collect();
        fixed.sort_by_key(|v| std::cmp::Reverse(v.bitrate.unwrap_or(0)));

        if let Some(variant) = manifest {
            entries.push(MediaEntry {
                video_url: variant.url.clone(),
                quality: QUALITY_HLS.to_string(),
                thumbnail_url: thumbnail.clone(),
                width: None,
                height: None,
                aspect_ratio,
                duration_ms,
                video_codec: None,
                audio_codec: None,
                file_size_bytes: None,
            });
        }

        for variant in fixed {
            let meta = url_meta::parse_variant_url(&variant.url);
            entries.push(MediaEntry {
                video_url: variant.url.clone(),
                quality: variant
                    .bitrate
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| QUALITY_UNKNOWN.to_string()),
                thumbnail_url: thumbnail.clone(),
                width: meta.as_ref().map(|m| m.width),
                height: meta.as_ref().map(|m| m.height),
                aspect_ratio,
                duration_ms,
                video_codec: meta.and_then(|m| m.codec),
                audio_codec: Some(AUDIO_CODEC.to_string()),
                file_size_bytes: None,
            });
        }
    }

    Ok(entries)
}
