//! RSS 2.0 feed source.
//!
//! Only the channel's first `<item>` is used. Its image is taken from the
//! `<enclosure url="...">` attribute, or else from the first `<img src>` in
//! the item's description markup.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{Source, fetch_text};
use crate::error::AcquisitionError;
use crate::markup::{first_img_src, to_plain_text};
use crate::models::NormalizedItem;
use crate::utils::resolve_url;

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default)]
    channel: Option<Channel>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    enclosure: Option<Enclosure>,
}

#[derive(Debug, Deserialize)]
struct Enclosure {
    #[serde(rename = "@url", default)]
    url: Option<String>,
}

#[derive(Debug)]
pub struct RssSource {
    client: Client,
    feed_url: String,
}

impl RssSource {
    pub fn new(client: Client, feed_url: String) -> Self {
        Self { client, feed_url }
    }
}

impl Source for RssSource {
    fn name(&self) -> &'static str {
        "rss"
    }

    #[instrument(level = "info", skip_all, fields(feed_url = %self.feed_url))]
    async fn acquire(&self) -> Result<NormalizedItem, AcquisitionError> {
        let body = fetch_text(self.client.get(&self.feed_url), &self.feed_url).await?;
        let item = parse_feed(&body, &self.feed_url)?;
        info!(
            title = %item.title,
            link = %item.link,
            has_image = item.image_url.is_some(),
            "Parsed first RSS item"
        );
        Ok(item)
    }
}

/// Extract the first item of an RSS document fetched from `feed_url`.
pub fn parse_feed(xml: &str, feed_url: &str) -> Result<NormalizedItem, AcquisitionError> {
    let feed: Feed = quick_xml::de::from_str(xml)?;
    let channel = feed.channel.ok_or(AcquisitionError::MissingChannel)?;
    let first = channel
        .items
        .into_iter()
        .next()
        .ok_or(AcquisitionError::MissingItem)?;

    let link = resolve_url(feed_url, first.link.as_deref().unwrap_or_default())?;
    let raw_description = first.description.unwrap_or_default();

    let enclosure_url = first
        .enclosure
        .and_then(|e| e.url)
        .filter(|u| !u.trim().is_empty());
    let image_href = enclosure_url.or_else(|| {
        let found = first_img_src(&raw_description);
        debug!(found = found.is_some(), "No enclosure; searched description for <img>");
        found
    });

    let mut item = NormalizedItem::new(first.title.unwrap_or_default(), link);
    item.image_url = image_href.and_then(|href| {
        resolve_url(&item.link, &href)
            .inspect_err(|e| warn!(error = %e, "Ignoring unusable item image"))
            .ok()
    });
    item.description = Some(to_plain_text(&raw_description)).filter(|d| !d.is_empty());

    Ok(item)
}
