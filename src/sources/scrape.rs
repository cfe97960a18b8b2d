//! "Image of the day" article scraped from a site without a feed.
//!
//! Two pages are fetched. The index (listing) page is searched for a link to
//! the latest article, then the article page is mined for its title and
//! image.
//!
//! # Link Discovery
//!
//! The markup is not under our control and drifts, so the article link is
//! found by trying progressively looser heuristics. The first tier that
//! finds something wins:
//!
//! | Tier | Looks for |
//! |------|-----------|
//! | [`LinkTier::Slug`] | an `href` containing the article slug |
//! | [`LinkTier::Keyword`] | an `href` containing the keyword, outside the listing prefix |
//! | [`LinkTier::Phrase`] | the phrase as text, then the nearest `<a>` opened before it |
//!
//! Only when all three come up empty does acquisition fail.
//!
//! # Article Extraction
//!
//! - Title: `og:title`, else the first `<h1>`, else the profile's fallback.
//!   Everything from the first title separator on is dropped.
//! - Image: `og:image`, else the first `<img src>`, else none.

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use super::{Source, fetch_text};
use crate::config::ScrapeProfile;
use crate::error::AcquisitionError;
use crate::markup::{
    anchor_hrefs, decode_entities, find_all_ignore_case, first_h1_text, first_img_src,
    last_anchor_before, meta_content,
};
use crate::models::{NormalizedItem, title_or_fallback};
use crate::utils::resolve_url;

/// Which discovery heuristic produced the article link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTier {
    Slug,
    Keyword,
    Phrase,
}

#[derive(Debug)]
pub struct ScrapeSource {
    client: Client,
    profile: ScrapeProfile,
}

impl ScrapeSource {
    pub fn new(client: Client, profile: ScrapeProfile) -> Self {
        Self { client, profile }
    }
}

impl Source for ScrapeSource {
    fn name(&self) -> &'static str {
        "scrape"
    }

    #[instrument(level = "info", skip_all, fields(index_url = %self.profile.index_url))]
    async fn acquire(&self) -> Result<NormalizedItem, AcquisitionError> {
        let index = fetch_text(self.client.get(&self.profile.index_url), &self.profile.index_url).await?;

        let (tier, article_url) = discover_article_link(&index, &self.profile).ok_or_else(|| {
            AcquisitionError::NoArticleLink {
                url: self.profile.index_url.clone(),
            }
        })?;
        info!(?tier, %article_url, "Found article link");

        let article = fetch_text(self.client.get(&article_url), &article_url).await?;
        let item = parse_article(&article, &article_url, &self.profile);
        info!(
            title = %item.title,
            has_image = item.image_url.is_some(),
            "Parsed article"
        );
        Ok(item)
    }
}

/// Find the article link on the index page, trying each tier in order.
pub fn discover_article_link(html: &str, profile: &ScrapeProfile) -> Option<(LinkTier, String)> {
    let tiers: [(LinkTier, fn(&str, &ScrapeProfile) -> Option<String>); 3] = [
        (LinkTier::Slug, by_slug),
        (LinkTier::Keyword, by_keyword),
        (LinkTier::Phrase, by_phrase),
    ];

    tiers.into_iter().find_map(|(tier, find)| {
        let found = find(html, profile);
        debug!(?tier, found = found.is_some(), "Tried link discovery tier");
        found.map(|url| (tier, url))
    })
}

fn by_slug(html: &str, profile: &ScrapeProfile) -> Option<String> {
    anchor_hrefs(html)
        .filter(|href| contains_ignore_case(href, &profile.slug))
        .find_map(|href| resolve(profile, &href))
}

fn by_keyword(html: &str, profile: &ScrapeProfile) -> Option<String> {
    anchor_hrefs(html)
        .filter(|href| contains_ignore_case(href, &profile.keyword))
        .filter_map(|href| resolve(profile, &href))
        .find(|url| !is_listing(url, &profile.listing_prefix))
}

fn by_phrase(html: &str, profile: &ScrapeProfile) -> Option<String> {
    if profile.phrase.is_empty() {
        return None;
    }
    find_all_ignore_case(html, &profile.phrase)
        .into_iter()
        .find_map(|offset| last_anchor_before(html, offset))
        .and_then(|href| resolve(profile, &href))
}

fn resolve(profile: &ScrapeProfile, href: &str) -> Option<String> {
    resolve_url(&profile.base_url, &decode_entities(href)).ok()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn is_listing(url: &str, listing_prefix: &str) -> bool {
    if listing_prefix.is_empty() {
        return false;
    }
    Url::parse(url)
        .map(|u| {
            u.path()
                .to_lowercase()
                .starts_with(&listing_prefix.to_lowercase())
        })
        .unwrap_or(false)
}

/// Extract title and image from an article page fetched from `article_url`.
///
/// Never fails: missing metadata degrades to the fallback title and no image.
pub fn parse_article(html: &str, article_url: &str, profile: &ScrapeProfile) -> NormalizedItem {
    let raw_title = meta_content(html, "og:title")
        .map(|t| decode_entities(&t))
        .or_else(|| first_h1_text(html))
        .unwrap_or_default();
    let title = if profile.title_separator.is_empty() {
        raw_title.as_str()
    } else {
        raw_title
            .split(profile.title_separator.as_str())
            .next()
            .unwrap_or_default()
    };

    let mut item = NormalizedItem::new(
        title_or_fallback(title.to_string(), &profile.fallback_title),
        article_url,
    );
    item.image_url = meta_content(html, "og:image")
        .or_else(|| first_img_src(html))
        .and_then(|src| resolve_url(article_url, &decode_entities(&src)).ok());
    item
}
