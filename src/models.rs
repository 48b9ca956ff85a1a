//! Data models shared by acquisition, transformation and export.
//!
//! - [`RawResponse`]: one HTTP response as handed to the format extractors
//! - [`Extraction`]: the partial record an extractor produces
//! - [`NormalizedRecord`]: the uniform per-provider output unit
//! - [`RecordStatus`]: whether a record is complete, partial or empty due to failure

use crate::error::{FetchFailure, TransformError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Address family of a discovered range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    V4,
    V6,
}

/// A raw HTTP response as delivered by the acquisition layer.
///
/// The body is kept as bytes so the same value can be read as text, decoded as
/// JSON, or opened as an archive. When `failure` is set the body is empty and
/// extractors must not look at it.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The URL that was requested.
    pub url: String,
    /// HTTP status code, when a response line was received at all.
    pub status: Option<u16>,
    /// Raw response content.
    pub body: Vec<u8>,
    /// Set when the request timed out, failed to connect, or returned non-2xx.
    pub failure: Option<FetchFailure>,
}

impl RawResponse {
    /// A successful 200 response with the given body.
    #[cfg(test)]
    pub fn ok(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status: Some(200),
            body: body.into(),
            failure: None,
        }
    }

    /// A response that carries only a failure indicator.
    pub fn failed(url: impl Into<String>, failure: FetchFailure) -> Self {
        let status = match failure {
            FetchFailure::Status(code) => Some(code),
            _ => None,
        };
        Self {
            url: url.into(),
            status,
            body: Vec::new(),
            failure: Some(failure),
        }
    }

    /// Fail with [`TransformError::Fetch`] if the acquisition layer flagged this response.
    pub fn error_for_status(&self) -> Result<&Self, TransformError> {
        match &self.failure {
            Some(failure) => Err(TransformError::Fetch {
                url: self.url.clone(),
                failure: failure.clone(),
            }),
            None => Ok(self),
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Body decoded as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransformError> {
        serde_json::from_slice(&self.body).map_err(|source| TransformError::Json {
            url: self.url.clone(),
            source,
        })
    }

    /// Raw body bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }
}

/// Outcome of a transform, exposed on every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Every response was usable.
    #[default]
    Success,
    /// Some responses failed; the lists hold what the others yielded.
    Degraded,
    /// Nothing could be extracted; the lists are empty.
    Error,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Success => "success",
            RecordStatus::Degraded => "degraded",
            RecordStatus::Error => "error",
        }
    }
}

/// Partial record fields produced by one extractor.
#[derive(Debug, Default)]
pub struct Extraction {
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
    /// Provider-supplied freshness value, passed through verbatim.
    pub last_updated: Option<String>,
    /// Failures of individual responses that still left something to extract.
    pub problems: Vec<TransformError>,
}

impl Extraction {
    /// Append one address to the list of its family.
    pub fn push(&mut self, family: Family, value: impl Into<String>) {
        match family {
            Family::V4 => self.ipv4.push(value.into()),
            Family::V6 => self.ipv6.push(value.into()),
        }
    }
}

/// The uniform per-provider record handed to export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Human-readable provider label, e.g. `"Google Cloud"`.
    pub provider: String,
    /// Source URL(s) the data comes from.
    pub source: String,
    /// Provider freshness value, or the time the record was built.
    pub last_updated: String,
    /// IPv4 ranges in discovery order.
    pub ipv4: Vec<String>,
    /// IPv6 ranges in discovery order.
    pub ipv6: Vec<String>,
    pub status: RecordStatus,
}
