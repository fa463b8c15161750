//! HTTP API integration tests.
//!
//! Each test runs the Axum server on a random port with a wiremock server
//! standing in for the upstream API. Variant URLs in these fixtures point
//! at hosts outside the enrichment allow-list (or at the mock itself for
//! proxy tests) so no test ever touches the real network.

mod common;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{hls_variant, mp4_variant, tombstone_body, tweet_body, video_item, TestHarness};

const TWEET_ID: &str = "1234567890123456789";

#[tokio::test]
async fn health_check_reports_ok() {
    let (_harness, addr) = TestHarness::with_server().await;
    let url = format!("http://{addr}/api/health");

    let resp = reqwest::get(&url).await.expect("request failed");
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn tweet_info_lists_fixed_variants_without_manifest() {
    let (harness, addr) = TestHarness::with_server().await;
    harness.mock_activation().await;
    harness
        .mock_tweet(
            TWEET_ID,
            tweet_body(json!([video_item(vec![
                hls_variant("https://cdn.example.test/pl/m.m3u8"),
                mp4_variant("https://cdn.example.test/vid/480x270/lo.mp4", 256000),
                mp4_variant("https://cdn.example.test/vid/1280x720/hi.mp4", 2176000),
            ])])),
        )
        .await;

    let url = format!("http://{addr}/api/tweet/{TWEET_ID}");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], serde_json::Value::Null);
    assert_eq!(body["data"]["tweetId"], TWEET_ID);

    let media_list = body["data"]["mediaList"].as_array().unwrap();
    let qualities: Vec<_> = media_list
        .iter()
        .map(|m| m["quality"].as_str().unwrap())
        .collect();
    assert_eq!(qualities, ["2176000", "256000"]);

    // Enrichment is best-effort: these hosts are off the allow-list, so
    // the entries come back without sizes rather than failing.
    assert!(media_list.iter().all(|m| m.get("fileSizeBytes").is_none()));
}

#[tokio::test]
async fn tweet_info_accepts_full_status_url_as_reference() {
    let (harness, addr) = TestHarness::with_server().await;
    harness.mock_activation().await;
    harness
        .mock_tweet(
            TWEET_ID,
            tweet_body(json!([video_item(vec![mp4_variant(
                "https://cdn.example.test/v.mp4",
                832000
            )])])),
        )
        .await;

    let reference =
        urlencoding_lite(&format!("https://twitter.com/someuser/status/{TWEET_ID}"));
    let url = format!("http://{addr}/api/tweet/{reference}");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["tweetId"], TWEET_ID);
}

#[tokio::test]
async fn tweet_info_rejects_invalid_reference() {
    let (harness, addr) = TestHarness::with_server().await;

    let url = format!("http://{addr}/api/tweet/not-a-tweet");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"], serde_json::Value::Null);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");

    let requests = harness.upstream.received_requests().await.unwrap();
    assert!(requests.is_empty(), "validation must not hit the upstream");
}

#[tokio::test]
async fn tweet_info_maps_tombstone_to_not_found() {
    let (harness, addr) = TestHarness::with_server().await;
    harness.mock_activation().await;
    harness.mock_tweet(TWEET_ID, tombstone_body()).await;

    let url = format!("http://{addr}/api/tweet/{TWEET_ID}");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 404);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn tweet_info_maps_upstream_failure_to_bad_gateway() {
    let (harness, addr) = TestHarness::with_server().await;
    harness.mock_activation().await;
    harness.mock_tweet_failure(TWEET_ID, 500).await;

    let url = format!("http://{addr}/api/tweet/{TWEET_ID}");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 502);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn download_rejects_unsupported_format_before_upstream_call() {
    let (harness, addr) = TestHarness::with_server().await;

    let url = format!("http://{addr}/api/tweet/{TWEET_ID}/download?format=avi");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");

    let requests = harness.upstream.received_requests().await.unwrap();
    assert!(requests.is_empty(), "format validation must not hit the upstream");
}

#[tokio::test]
async fn download_rejects_uppercase_format() {
    let (_harness, addr) = TestHarness::with_server().await;

    let url = format!("http://{addr}/api/tweet/{TWEET_ID}/download?format=MP4");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn download_unknown_quality_is_not_found() {
    let (harness, addr) = TestHarness::with_server().await;
    harness.mock_activation().await;
    harness
        .mock_tweet(
            TWEET_ID,
            tweet_body(json!([video_item(vec![mp4_variant(
                "https://cdn.example.test/v.mp4",
                832000
            )])])),
        )
        .await;

    let url = format!("http://{addr}/api/tweet/{TWEET_ID}/download?quality=999999");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 404);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn download_proxies_requested_quality() {
    let (harness, addr) = TestHarness::with_server().await;
    harness.mock_activation().await;

    // The "video file" lives on the same mock server.
    Mock::given(method("GET"))
        .and(path("/video/mid.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"MID-QUALITY-BYTES".to_vec()))
        .mount(&harness.upstream)
        .await;

    let video_url = format!("{}/video/mid.mp4", harness.upstream.uri());
    harness
        .mock_tweet(
            TWEET_ID,
            tweet_body(json!([video_item(vec![
                mp4_variant("https://cdn.example.test/hi.mp4", 2176000),
                mp4_variant(&video_url, 832000),
            ])])),
        )
        .await;

    let url = format!("http://{addr}/api/tweet/{TWEET_ID}/download?quality=832000");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "video/mp4"
    );
    let disposition = resp.headers()["content-disposition"].to_str().unwrap();
    assert_eq!(
        disposition,
        format!("attachment; filename=\"twitter_video_{TWEET_ID}.mp4\"")
    );

    let body = resp.bytes().await.unwrap();
    assert_eq!(&body[..], b"MID-QUALITY-BYTES");
}

#[tokio::test]
async fn download_defaults_to_best_fixed_variant() {
    let (harness, addr) = TestHarness::with_server().await;
    harness.mock_activation().await;

    Mock::given(method("GET"))
        .and(path("/video/hi.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"HI-QUALITY-BYTES".to_vec()))
        .mount(&harness.upstream)
        .await;

    let hi_url = format!("{}/video/hi.mp4", harness.upstream.uri());
    harness
        .mock_tweet(
            TWEET_ID,
            tweet_body(json!([video_item(vec![
                hls_variant("https://cdn.example.test/pl/m.m3u8"),
                mp4_variant("https://cdn.example.test/lo.mp4", 256000),
                mp4_variant(&hi_url, 2176000),
            ])])),
        )
        .await;

    let url = format!("http://{addr}/api/tweet/{TWEET_ID}/download");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body = resp.bytes().await.unwrap();
    assert_eq!(&body[..], b"HI-QUALITY-BYTES");
}

#[tokio::test]
async fn download_of_broken_manifest_source_is_bad_gateway() {
    let (harness, addr) = TestHarness::with_server().await;
    harness.mock_activation().await;

    // The manifest URL 404s on the mock; whether ffmpeg is present in the
    // environment or not, the transcode path must fail as a tool error.
    let manifest_url = format!("{}/pl/missing.m3u8", harness.upstream.uri());
    harness
        .mock_tweet(
            TWEET_ID,
            tweet_body(json!([video_item(vec![hls_variant(&manifest_url)])])),
        )
        .await;

    let url = format!("http://{addr}/api/tweet/{TWEET_ID}/download?quality=HLS");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 502);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "TOOL_ERROR");
}

/// Percent-encode just enough of a URL to ride inside a path segment.
fn urlencoding_lite(s: &str) -> String {
    s.replace('%', "%25").replace('/', "%2F").replace(':', "%3A").replace('?', "%3F")
}
