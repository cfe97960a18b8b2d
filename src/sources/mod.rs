//! Sources that produce the daily [`NormalizedItem`].
//!
//! Every source implements [`Source`]; which one runs is picked by
//! [`SourceKind`] on the command line.
//!
//! # Supported Sources
//!
//! | Kind | Module | Method | Notes |
//! |------|--------|--------|-------|
//! | `apod` | [`apod`] | JSON API | NASA APOD, HD and standard image |
//! | `rss` | [`rss`] | RSS/XML | Enclosure, else `<img>` in the description |
//! | `scrape` | [`scrape`] | HTML heuristics | Tiered link discovery, Open Graph metadata |
//! | `archive` | [`archive`] | Local JSON file | Deterministic per-slot or random pick |
//!
//! # Failure
//!
//! Any failure is an [`AcquisitionError`]. Sources never retry and never
//! return partial items.

pub mod apod;
pub mod archive;
pub mod rss;
pub mod scrape;

use clap::ValueEnum;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument, warn};

use crate::config::RelayConfig;
use crate::error::AcquisitionError;
use crate::models::NormalizedItem;
use crate::utils::truncate_for_log;

use apod::ApodSource;
use archive::ArchiveSource;
use rss::RssSource;
use scrape::ScrapeSource;

/// Something that can produce today's item.
pub trait Source {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch and extract one item.
    async fn acquire(&self) -> Result<NormalizedItem, AcquisitionError>;
}

/// Upstream selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// NASA APOD JSON API
    Apod,
    /// APOD RSS feed
    Rss,
    /// Scraped "image of the day" article
    Scrape,
    /// Offline JSON archive
    Archive,
}

/// The source chosen for this run.
#[derive(Debug)]
pub enum SelectedSource {
    Apod(ApodSource),
    Rss(RssSource),
    Scrape(ScrapeSource),
    Archive(ArchiveSource),
}

impl SelectedSource {
    pub fn new(
        kind: SourceKind,
        client: Client,
        config: &RelayConfig,
        api_key: &str,
        slot: Option<u32>,
    ) -> Self {
        match kind {
            SourceKind::Apod => Self::Apod(ApodSource::new(client, config.apod.clone(), api_key)),
            SourceKind::Rss => Self::Rss(RssSource::new(client, config.rss.feed_url.clone())),
            SourceKind::Scrape => Self::Scrape(ScrapeSource::new(client, config.scrape.clone())),
            SourceKind::Archive => Self::Archive(ArchiveSource::new(config.archive.clone(), slot)),
        }
    }
}

impl Source for SelectedSource {
    fn name(&self) -> &'static str {
        match self {
            Self::Apod(s) => s.name(),
            Self::Rss(s) => s.name(),
            Self::Scrape(s) => s.name(),
            Self::Archive(s) => s.name(),
        }
    }

    async fn acquire(&self) -> Result<NormalizedItem, AcquisitionError> {
        match self {
            Self::Apod(s) => s.acquire().await,
            Self::Rss(s) => s.acquire().await,
            Self::Scrape(s) => s.acquire().await,
            Self::Archive(s) => s.acquire().await,
        }
    }
}

/// Send `request` and return the body of a 2xx response.
///
/// `url` is only used for logs and errors, so callers can keep secrets such
/// as API keys out of both. The request's own URL is stripped from any
/// transport error for the same reason.
#[instrument(level = "info", skip(request))]
pub(crate) async fn fetch_text(request: RequestBuilder, url: &str) -> Result<String, AcquisitionError> {
    let request_error = |source: reqwest::Error| AcquisitionError::Request {
        url: url.to_string(),
        source: source.without_url(),
    };

    let response = request.send().await.map_err(request_error)?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(
            status = status.as_u16(),
            body = %truncate_for_log(&body, 300),
            "Upstream returned an error status"
        );
        return Err(AcquisitionError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(request_error)?;
    debug!(bytes = body.len(), "Fetched upstream document");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_text_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_body("<html>ok</html>")
            .create_async()
            .await;

        let url = format!("{}/page", server.url());
        let body = fetch_text(Client::new().get(&url), &url).await.unwrap();

        assert_eq!(body, "<html>ok</html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_text_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("not here")
            .create_async()
            .await;

        let url = format!("{}/missing", server.url());
        let err = fetch_text(Client::new().get(&url), &url).await.unwrap_err();

        assert!(matches!(err, AcquisitionError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_text_unreachable() {
        let url = "http://127.0.0.1:9/unreachable";
        let err = fetch_text(Client::new().get(url), url).await.unwrap_err();

        assert!(matches!(err, AcquisitionError::Request { .. }));
    }

    #[tokio::test]
    async fn test_fetch_text_error_hides_query_secrets() {
        use std::error::Error;

        let url = "http://127.0.0.1:9/planetary/apod";
        let request = Client::new().get(url).query(&[("api_key", "SECRETKEY")]);
        let err = fetch_text(request, url).await.unwrap_err();

        assert!(!err.to_string().contains("SECRETKEY"));
        assert!(!format!("{err:?}").contains("SECRETKEY"));
        assert!(!err.source().unwrap().to_string().contains("SECRETKEY"));
    }

    #[test]
    fn test_selected_source_names() {
        let config = RelayConfig::default();
        let names: Vec<&str> = [
            SourceKind::Apod,
            SourceKind::Rss,
            SourceKind::Scrape,
            SourceKind::Archive,
        ]
        .into_iter()
        .map(|kind| SelectedSource::new(kind, Client::new(), &config, "DEMO_KEY", None).name())
        .collect();

        assert_eq!(names, vec!["apod", "rss", "scrape", "archive"]);
    }
}
