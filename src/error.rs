//! Unified error type for the talon crate.
//!
//! Every failure mode carries a machine-readable kind so API handlers can
//! derive an HTTP status code via [`Error::http_status`] and a response code
//! via [`Error::code`]. Caller mistakes (bad reference, bad format) map to
//! the 4xx class; upstream/dependency failures map to 502 and are never
//! silently swallowed.

use crate::output::VideoFormat;

/// Unified error type covering all failure modes in talon.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input was neither a numeric post ID nor a recognizable post URL.
    #[error("invalid post reference: {0:?}")]
    InvalidReference(String),

    /// The requested output container is not in the supported set.
    #[error("unsupported format {0:?}; supported formats: {list}", list = VideoFormat::supported_list())]
    UnsupportedFormat(String),

    /// No bearer secret is configured for guest session activation.
    #[error("no bearer token configured; set twitter.bearer_token or TWITTER_BEARER_TOKEN")]
    CredentialUnavailable,

    /// Guest session activation failed.
    #[error("guest session activation failed: {0}")]
    UpstreamAuthFailure(String),

    /// The tweet lookup call failed at the transport level or returned a
    /// non-success status.
    #[error("upstream request failed: {0}")]
    UpstreamRequestFailed(String),

    /// The lookup response lacked the expected top-level result object.
    #[error("tweet data not available")]
    UpstreamDataMissing,

    /// The post is deleted, protected, or otherwise withheld.
    #[error("tweet is not available (deleted, protected, or restricted)")]
    PostUnavailable,

    /// The post carries no media array in any known location.
    #[error("no media found in tweet")]
    NoMediaFound,

    /// No variant matched the requested quality tag.
    #[error("no video found with quality: {0}")]
    QualityNotFound(String),

    /// An external tool (ffmpeg) failed or is missing.
    #[error("tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidReference(_) => 400,
            Error::UnsupportedFormat(_) => 400,
            Error::CredentialUnavailable => 502,
            Error::UpstreamAuthFailure(_) => 502,
            Error::UpstreamRequestFailed(_) => 502,
            Error::UpstreamDataMissing => 502,
            Error::PostUnavailable => 404,
            Error::NoMediaFound => 404,
            Error::QualityNotFound(_) => 404,
            Error::Tool { .. } => 502,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Machine-readable code exposed in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidReference(_) | Error::UnsupportedFormat(_) => "INVALID_REQUEST",
            Error::PostUnavailable | Error::NoMediaFound | Error::QualityNotFound(_) => {
                "NOT_FOUND"
            }
            Error::CredentialUnavailable
            | Error::UpstreamAuthFailure(_)
            | Error::UpstreamRequestFailed(_)
            | Error::UpstreamDataMissing => "UPSTREAM_ERROR",
            Error::Tool { .. } => "TOOL_ERROR",
            Error::Io { .. } | Error::Internal(_) => "INTERNAL",
        }
    }

    /// True for errors caused by caller input rather than the environment.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status())
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
