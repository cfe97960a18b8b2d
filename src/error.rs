//! Error taxonomy for a relay run.
//!
//! Each phase of a run owns one error type:
//!
//! | Phase | Type | Effect |
//! |-------|------|--------|
//! | Startup | [`ConfigError`] | fatal before any network activity |
//! | Acquisition | [`AcquisitionError`] | fatal, nothing is sent |
//! | Photo tier | [`TransportError::Rejected`] | recoverable, next tier runs |
//! | Text tier | [`DeliveryError`] | fatal, no tier left |
//!
//! [`RelayError`] is what the orchestrator hands back to `main`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Missing or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingCredential(&'static str),
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// The source could not produce a [`NormalizedItem`](crate::models::NormalizedItem).
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("'{url}' answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::de::DeError),
    #[error("RSS channel not found")]
    MissingChannel,
    #[error("RSS item not found")]
    MissingItem,
    #[error("no article link found on '{url}'")]
    NoArticleLink { url: String },
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to read archive '{path}': {source}")]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("archive '{0}' has no entries")]
    EmptyArchive(PathBuf),
}

/// A single transport call failed.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The messaging API answered, but refused the request.
    #[error("{method} rejected with HTTP {status}: {description}")]
    Rejected {
        method: &'static str,
        status: u16,
        description: String,
    },
    /// The request never produced an answer (connect failure, timeout).
    #[error("{method} request failed: {source}")]
    Network {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    /// Whether the delivery pipeline may move on to its next tier.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TransportError::Rejected { .. })
    }
}

/// Delivery ended without any message reaching the chat.
#[derive(Debug, Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(#[from] pub TransportError);

/// Run-fatal failure reported by the orchestrator.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
