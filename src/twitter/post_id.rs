//! Post reference normalization.
//!
//! A reference is either a bare numeric post ID or a status URL on one of
//! the known hosts. Anything else is rejected, including `t.co` short
//! links, whose path carries an opaque slug rather than the post ID.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

/// Status URL shapes that embed the post ID as digits after `status/`.
/// Host matching is case-insensitive; the `status/` path segment is not.
static STATUS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:(?:mobile\.)?(?:twitter|x)\.com)/\w+/status/(\d+)")
        .expect("status URL pattern is valid")
});

/// Canonical decimal-digit identifier of a post.
///
/// Immutable once parsed; serializes as a plain string so it survives
/// JavaScript number precision limits on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Normalize a free-form reference into a canonical post ID.
    ///
    /// Accepts an all-digit string as-is, or extracts the digits following
    /// `status/` from a recognized post URL (query strings after the ID are
    /// ignored). Fails with [`Error::InvalidReference`] otherwise.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();

        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Self(trimmed.to_string()));
        }

        if let Some(caps) = STATUS_URL.captures(trimmed) {
            return Ok(Self(caps[1].to_string()));
        }

        Err(Error::InvalidReference(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
