//! Guest session credential acquisition and caching.
//!
//! One guest token is live per client at any time. It is fetched on first
//! use, considered expired 30 minutes after issuance, and replaced
//! wholesale on the next request after that.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};

/// Local lifetime of an issued guest token. Upstream tokens live longer;
/// the margin keeps a mid-request expiry from ever being in play.
pub const GUEST_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

const ACTIVATE_PATH: &str = "/1.1/guest/activate.json";

#[derive(Debug, Clone)]
struct GuestToken {
    value: String,
    expires_at: Instant,
}

impl GuestToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct ActivateResponse {
    guest_token: String,
}

/// Cache of the anonymous session credential.
///
/// Refreshes are serialized behind the mutex: concurrent callers that all
/// observe an expired token await the single in-flight activation call and
/// then read the freshly stored value. A caller never sees a partially
/// constructed credential.
#[derive(Debug, Default)]
pub struct GuestTokenCache {
    cached: Mutex<Option<GuestToken>>,
}

impl GuestTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a valid guest token value, refreshing through `activate` if
    /// the cached one is absent or expired.
    pub async fn get(
        &self,
        client: &reqwest::Client,
        base_url: &str,
        bearer_header: &str,
    ) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.value.clone());
        }

        let token = activate(client, base_url, bearer_header).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Force the cached token to be considered expired (test hook).
    #[doc(hidden)]
    pub async fn expire_now(&self) {
        if let Some(token) = self.cached.lock().await.as_mut() {
            token.expires_at = Instant::now();
        }
    }
}

async fn activate(
    client: &reqwest::Client,
    base_url: &str,
    bearer_header: &str,
) -> Result<GuestToken> {
    let url = format!("{}{ACTIVATE_PATH}", base_url.trim_end_matches('/'));
    debug!(%url, "activating guest session");

    let resp = client
        .post(&url)
        .header(reqwest::header::AUTHORIZATION, bearer_header)
        .send()
        .await
        .map_err(|e| Error::UpstreamAuthFailure(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(Error::UpstreamAuthFailure(format!(
            "activation returned {}",
            resp.status()
        )));
    }

    let body: ActivateResponse = resp
        .json()
        .await
        .map_err(|e| Error::UpstreamAuthFailure(format!("malformed activation response: {e}")))?;

    Ok(GuestToken {
        value: body.guest_token,
        expires_at: Instant::now() + GUEST_TOKEN_TTL,
    })
}
