//! Client for the upstream X/Twitter GraphQL API.
//!
//! [`TwitterClient::resolve`] is the one entry point: reference in, ordered
//! media catalog out. Everything request-scoped lives on the stack; the
//! only shared state is the guest token cache.

mod guest_token;
mod post_id;
mod query;

pub use guest_token::{GuestTokenCache, GUEST_TOKEN_TTL};
pub use post_id::PostId;
pub use query::{build_tweet_query_url, TWEET_QUERY_ID, TWEET_QUERY_OPERATION};

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::TwitterConfig;
use crate::error::{Error, Result};
use crate::media::{self, MediaCatalog};

/// Production API origin.
pub const DEFAULT_API_BASE_URL: &str = "https://api.twitter.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const GUEST_TOKEN_HEADER: &str = "x-guest-token";

/// Anonymous client for tweet media resolution.
pub struct TwitterClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
    guest_tokens: GuestTokenCache,
}

impl TwitterClient {
    pub fn new(config: &TwitterConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("failed to build HTTP client with timeout: {e}");
                reqwest::Client::new()
            });

        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token.clone(),
            guest_tokens: GuestTokenCache::new(),
        }
    }

    /// The underlying HTTP client, shared with enrichment probes and the
    /// download proxy.
    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    fn bearer_header(&self) -> Result<String> {
        self.bearer_token
            .as_deref()
            .map(|secret| format!("Bearer {secret}"))
            .ok_or(Error::CredentialUnavailable)
    }

    /// Resolve a post reference into its media catalog.
    ///
    /// Validation failures surface before any network traffic; upstream
    /// failures keep their specific kind and are never retried here.
    pub async fn resolve(&self, reference: &str) -> Result<MediaCatalog> {
        let tweet_id = PostId::parse(reference)?;

        let bearer = self.bearer_header()?;
        let guest_token = self
            .guest_tokens
            .get(&self.client, &self.base_url, &bearer)
            .await?;

        let url = build_tweet_query_url(&self.base_url, tweet_id.as_str());
        debug!(%tweet_id, "fetching tweet data");

        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, &bearer)
            .header(GUEST_TOKEN_HEADER, &guest_token)
            .send()
            .await
            .map_err(|e| Error::UpstreamRequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Error::UpstreamRequestFailed(format!(
                "tweet lookup returned {}",
                resp.status()
            )));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::UpstreamRequestFailed(format!("malformed lookup response: {e}")))?;

        let media_list = media::extract_media(body)?;

        Ok(MediaCatalog {
            tweet_id,
            media_list,
        })
    }

    /// Force the guest token to be considered expired (test hook).
    #[doc(hidden)]
    pub async fn expire_guest_token(&self) {
        self.guest_tokens.expire_now().await;
    }
}
