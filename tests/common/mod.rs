//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`]: a wiremock server standing in for the upstream
//! API plus a fully-constructed [`AppContext`] pointed at it. The
//! [`with_server`] constructor additionally starts Axum on a random port
//! for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use serde_json::json;
use wiremock::matchers::{method, path, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

use talon::config::Config;
use talon::server::{create_router, AppContext};
use talon::twitter::TWEET_QUERY_ID;

pub const TEST_BEARER: &str = "test-bearer-secret";
pub const TEST_GUEST_TOKEN: &str = "guest-token-1";

/// Test harness wrapping an [`AppContext`] whose upstream is a mock server.
pub struct TestHarness {
    pub upstream: MockServer,
    pub ctx: AppContext,
}

impl TestHarness {
    /// Create a new harness with default configuration pointed at a fresh
    /// mock upstream.
    pub async fn new() -> Self {
        let upstream = MockServer::start().await;

        let mut config = Config::default();
        config.twitter.api_base_url = upstream.uri();
        config.twitter.bearer_token = Some(TEST_BEARER.to_string());

        let ctx = AppContext::new(config);
        Self { upstream, ctx }
    }

    /// Like [`Self::new`] but without a bearer secret configured.
    pub async fn without_bearer() -> Self {
        let upstream = MockServer::start().await;

        let mut config = Config::default();
        config.twitter.api_base_url = upstream.uri();
        config.twitter.bearer_token = None;

        let ctx = AppContext::new(config);
        Self { upstream, ctx }
    }

    /// Start an Axum server on a random port and return the harness
    /// together with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new().await;
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (harness, addr)
    }

    /// Mount a successful guest activation mock.
    pub async fn mock_activation(&self) {
        Mock::given(method("POST"))
            .and(path("/1.1/guest/activate.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "guest_token": TEST_GUEST_TOKEN })),
            )
            .mount(&self.upstream)
            .await;
    }

    /// Mount a guest activation mock that fails with the given status.
    pub async fn mock_activation_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/1.1/guest/activate.json"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.upstream)
            .await;
    }

    /// Mount a tweet lookup mock returning `body` for the given post ID.
    pub async fn mock_tweet(&self, id: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/graphql/{TWEET_QUERY_ID}/TweetResultByRestId")))
            .and(query_param_contains("variables", id))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.upstream)
            .await;
    }

    /// Mount a tweet lookup mock failing with the given status.
    pub async fn mock_tweet_failure(&self, id: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/graphql/{TWEET_QUERY_ID}/TweetResultByRestId")))
            .and(query_param_contains("variables", id))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.upstream)
            .await;
    }
}

/// A lookup response with the given media array under the standard path.
pub fn tweet_body(media: serde_json::Value) -> serde_json::Value {
    json!({
        "data": { "tweetResult": { "result": {
            "__typename": "Tweet",
            "legacy": { "entities": { "media": media } }
        } } }
    })
}

/// A tombstoned lookup response.
pub fn tombstone_body() -> serde_json::Value {
    json!({
        "data": { "tweetResult": { "result": {
            "__typename": "TweetTombstone",
            "tombstone": { "text": "This Tweet was deleted by the Tweet author" }
        } } }
    })
}

/// A single video item with the given variants.
pub fn video_item(variants: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "type": "video",
        "media_url_https": "https://pbs.twimg.com/media/thumb.jpg",
        "video_info": {
            "aspect_ratio": [16, 9],
            "duration_millis": 30500,
            "variants": variants
        }
    })
}

/// An mp4 variant.
pub fn mp4_variant(url: &str, bitrate: u64) -> serde_json::Value {
    json!({ "content_type": "video/mp4", "url": url, "bitrate": bitrate })
}

/// An HLS manifest variant.
pub fn hls_variant(url: &str) -> serde_json::Value {
    json!({ "content_type": "application/x-mpegURL", "url": url })
}
