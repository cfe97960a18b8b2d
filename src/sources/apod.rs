//! NASA Astronomy Picture of the Day, via the JSON API.
//!
//! One `GET {endpoint}?api_key=...` returns an object like:
//!
//! ```json
//! {
//!   "date": "2025-11-26",
//!   "title": "Comet Lemmon's Tail",
//!   "media_type": "image",
//!   "url": "https://apod.nasa.gov/apod/image/2511/lemmon_1024.jpg",
//!   "hdurl": "https://apod.nasa.gov/apod/image/2511/lemmon.jpg",
//!   "explanation": "..."
//! }
//! ```
//!
//! # Link
//!
//! In [`LinkMode::Dated`] the item links to the entry's own archive page,
//! `https://apod.nasa.gov/apod/apYYMMDD.html`. A missing or malformed date
//! falls back to the "today" page, as does [`LinkMode::Today`].

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{Source, fetch_text};
use crate::config::{ApodConfig, LinkMode};
use crate::error::AcquisitionError;
use crate::models::{MediaKind, NormalizedItem};
use crate::utils::resolve_url;

#[derive(Debug, Deserialize)]
struct ApodEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    hdurl: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug)]
pub struct ApodSource {
    client: Client,
    config: ApodConfig,
    api_key: String,
}

impl ApodSource {
    pub fn new(client: Client, config: ApodConfig, api_key: &str) -> Self {
        Self {
            client,
            config,
            api_key: api_key.to_string(),
        }
    }
}

impl Source for ApodSource {
    fn name(&self) -> &'static str {
        "apod"
    }

    #[instrument(level = "info", skip_all, fields(endpoint = %self.config.endpoint))]
    async fn acquire(&self) -> Result<NormalizedItem, AcquisitionError> {
        let request = self
            .client
            .get(&self.config.endpoint)
            .query(&[("api_key", self.api_key.as_str())]);
        let body = fetch_text(request, &self.config.endpoint).await?;
        let item = parse_entry(&body, &self.config)?;
        info!(title = %item.title, link = %item.link, media_kind = ?item.media_kind, "Parsed APOD entry");
        Ok(item)
    }
}

/// Turn an API response body into an item.
pub fn parse_entry(body: &str, config: &ApodConfig) -> Result<NormalizedItem, AcquisitionError> {
    let entry: ApodEntry = serde_json::from_str(body)?;

    let link = match config.link_mode {
        LinkMode::Today => config.today_page.clone(),
        LinkMode::Dated => page_url_for_date(entry.date.as_deref(), config),
    };

    let mut item = NormalizedItem::new(entry.title.unwrap_or_default(), link);
    item.description = entry
        .explanation
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    let url = entry.url.filter(|u| !u.trim().is_empty());
    if entry.media_type.as_deref() == Some("image") {
        item.hd_image_url = entry.hdurl.filter(|u| !u.trim().is_empty());
        item.image_url = url;
    } else {
        item.media_kind = MediaKind::Other;
        item.media_url = url;
    }

    Ok(item)
}

/// Archive page for an entry dated `date` (`YYYY-MM-DD`).
///
/// `"2025-11-26"` becomes `.../ap251126.html`; anything unparsable yields the
/// "today" page.
pub fn page_url_for_date(date: Option<&str>, config: &ApodConfig) -> String {
    date.and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .and_then(|d| {
            let page = format!("ap{}.html", d.format("%y%m%d"));
            resolve_url(&config.archive_base, &page).ok()
        })
        .unwrap_or_else(|| config.today_page.clone())
}
