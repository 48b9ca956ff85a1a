//! Error types for acquisition and transformation.
//!
//! Nothing in here is fatal for a whole run except [`UnknownProvider`], which is
//! raised while resolving the requested providers at startup. Every
//! [`TransformError`] is contained by the dispatch layer and turned into an
//! empty, `error`-status record.

use thiserror::Error;

/// Why a single HTTP request produced no usable body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("connection failed: {0}")]
    Connect(String),
}

/// Failure raised inside a format extractor.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("request to {url} failed: {failure}")]
    Fetch { url: String, failure: FetchFailure },

    #[error("invalid JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected document shape from {url}: {reason}")]
    Shape { url: String, reason: &'static str },

    #[error("invalid archive from {url}: {source}")]
    Archive {
        url: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("unreadable archive member {member}: {source}")]
    ArchiveMember {
        member: String,
        #[source]
        source: std::io::Error,
    },

    #[error("archive has no {0} member")]
    MissingMember(&'static str),

    #[error("expected response #{0} was not supplied")]
    MissingResponse(usize),

    #[error("no download link found in {url}")]
    MissingLink { url: String },
}

/// A provider identifier that is not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider `{0}`")]
pub struct UnknownProvider(pub String);
