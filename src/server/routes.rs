//! Request handlers.
//!
//! Every error surfaces as `{"data": null, "error": {"error", "code"}}`
//! with the status class split the resolver dictates: caller mistakes are
//! 4xx, upstream failures 502.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::Error;
use crate::media::{enrich, MediaCatalog, MediaEntry};
use crate::output::{output_filename, VideoFormat};
use crate::server::AppContext;

/// Wrapper turning crate errors into the structured error body.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if !self.0.is_client_error() {
            tracing::warn!("request failed: {}", self.0);
        }
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({
            "data": null,
            "error": { "error": self.0.to_string(), "code": self.0.code() },
        }));
        (status, body).into_response()
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Resolve a post and list its downloadable variants.
///
/// The manifest entry is omitted (API clients download fixed-container
/// files) and the remaining entries are enriched with file sizes on a
/// best-effort basis.
pub async fn tweet_info(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let catalog = ctx.twitter.resolve(&id).await?;

    let mut media_list: Vec<MediaEntry> = catalog.fixed_entries().cloned().collect();
    enrich::enrich_file_sizes(ctx.twitter.http(), &mut media_list, enrich::ALLOWED_VIDEO_HOSTS)
        .await;

    Ok(Json(json!({
        "data": { "tweetId": catalog.tweet_id, "mediaList": media_list },
        "error": null,
    })))
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    quality: Option<String>,
    format: Option<String>,
}

/// Stream a post's video to the client.
///
/// Plain mp4 variants are proxied straight through; manifest sources and
/// non-mp4 output formats run through the ffmpeg collaborator first.
pub async fn tweet_download(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, ApiError> {
    // Format validation is a caller-mistake check: it happens before any
    // upstream traffic.
    let format = match params.format.as_deref() {
        Some(f) => VideoFormat::parse(f)?,
        None => VideoFormat::default(),
    };

    let catalog = ctx.twitter.resolve(&id).await?;
    let entry = select_entry(&catalog, params.quality.as_deref())?;
    let filename = output_filename(None, &catalog.tweet_id, format);

    if entry.is_manifest() || format != VideoFormat::Mp4 {
        let transcoded = ctx.downloader.transcode(&entry.video_url, format).await?;
        let file = tokio::fs::File::open(&transcoded.path)
            .await
            .map_err(Error::from)?;
        // The open handle keeps the bytes readable after `transcoded` drops
        // and its workspace directory is removed.
        let body = Body::from_stream(tokio_util::io::ReaderStream::new(file));
        attachment_response(body, format, &filename)
    } else {
        let upstream = ctx
            .twitter
            .http()
            .get(&entry.video_url)
            .send()
            .await
            .map_err(|e| Error::UpstreamRequestFailed(e.to_string()))?;

        if !upstream.status().is_success() {
            return Err(Error::UpstreamRequestFailed(format!(
                "video fetch returned {}",
                upstream.status()
            ))
            .into());
        }

        let body = Body::from_stream(upstream.bytes_stream());
        attachment_response(body, format, &filename)
    }
}

/// Pick the variant to serve: an exact quality match when requested,
/// otherwise the best fixed-container entry (falling back to the manifest
/// when that is all the post has).
fn select_entry<'a>(
    catalog: &'a MediaCatalog,
    quality: Option<&str>,
) -> Result<&'a MediaEntry, Error> {
    match quality {
        Some(q) => catalog
            .find_quality(q)
            .ok_or_else(|| Error::QualityNotFound(q.to_string())),
        None => catalog
            .fixed_entries()
            .next()
            .or_else(|| catalog.media_list.first())
            .ok_or(Error::NoMediaFound),
    }
}

fn attachment_response(
    body: Body,
    format: VideoFormat,
    filename: &str,
) -> Result<Response, ApiError> {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| Error::Internal(format!("invalid disposition header: {e}")))?;

    let mut response = Response::new(body);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(format.content_type()),
    );
    response
        .headers_mut()
        .insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}
