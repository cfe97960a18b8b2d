//! Run configuration.
//!
//! Credentials come from the CLI (or their environment variables). Everything
//! else has a working default and can be overridden with an optional YAML
//! file passed via `--config`:
//!
//! ```yaml
//! http:
//!   timeout_secs: 20
//! apod:
//!   link_mode: today
//! caption:
//!   template: title_description
//!   truncation: ellipsis
//! scrape:
//!   index_url: https://www.space.com/tag/image-of-the-day
//! ```
//!
//! The configuration is built once in `main` and passed down explicitly.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tokio::fs;
use tracing::{info, instrument};

use crate::cli::Cli;
use crate::error::ConfigError;

/// Credentials needed before any network activity may start.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub telegram_token: String,
    pub chat_id: String,
}

impl Credentials {
    /// Validate the token and chat id. Blank values count as missing.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let telegram_token = non_blank(cli.telegram_token.as_deref())
            .ok_or(ConfigError::MissingCredential("TELEGRAM_BOT_TOKEN"))?;
        let chat_id = non_blank(cli.chat_id.as_deref())
            .ok_or(ConfigError::MissingCredential("TELEGRAM_CHAT_ID"))?;
        Ok(Self {
            telegram_token,
            chat_id,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Everything that is not a credential.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub http: HttpConfig,
    pub telegram: TelegramConfig,
    pub apod: ApodConfig,
    pub rss: RssConfig,
    pub scrape: ScrapeProfile,
    pub archive: ArchiveConfig,
    pub caption: CaptionConfig,
}

impl RelayConfig {
    /// Load from `path`, or use defaults when no file was given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::from_yaml(&raw)?;
        info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!(
                "Mozilla/5.0 (compatible; daily_image_relay/",
                env!("CARGO_PKG_VERSION"),
                ")"
            )
            .to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// One client shared by the source and the transport of a run.
    pub fn client(&self) -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .timeout(self.timeout())
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(ConfigError::Client)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

/// Which page an APOD item links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// The fixed "today" page.
    Today,
    /// The per-entry archive page derived from the entry date.
    Dated,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApodConfig {
    pub endpoint: String,
    pub link_mode: LinkMode,
    /// Canonical "today" page, also the fallback for undated entries.
    pub today_page: String,
    /// Directory the dated `apYYMMDD.html` pages live in.
    pub archive_base: String,
}

impl Default for ApodConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.nasa.gov/planetary/apod".to_string(),
            link_mode: LinkMode::Dated,
            today_page: "https://apod.nasa.gov/apod/astropix.html".to_string(),
            archive_base: "https://apod.nasa.gov/apod/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RssConfig {
    pub feed_url: String,
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://apod.nasa.gov/apod.rss".to_string(),
        }
    }
}

/// Site-specific knobs for the HTML scraper.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeProfile {
    /// Origin relative hrefs are resolved against.
    pub base_url: String,
    /// Listing page that links to the daily article.
    pub index_url: String,
    /// Tier 1: href fragment that only the daily article carries.
    pub slug: String,
    /// Tier 2: looser href fragment.
    pub keyword: String,
    /// Tier 2 ignores hrefs whose path starts with this prefix.
    pub listing_prefix: String,
    /// Tier 3: visible text announcing the article.
    pub phrase: String,
    /// Breadcrumb separator; only the text before it is kept in titles.
    pub title_separator: String,
    pub fallback_title: String,
}

impl Default for ScrapeProfile {
    fn default() -> Self {
        Self {
            base_url: "https://www.space.com".to_string(),
            index_url: "https://www.space.com/tag/image-of-the-day".to_string(),
            slug: "space-photo-of-the-day".to_string(),
            keyword: "image-of-the-day".to_string(),
            listing_prefix: "/tag/".to_string(),
            phrase: "Space photo of the day".to_string(),
            title_separator: " | ".to_string(),
            fallback_title: "Space Image of the Day".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub path: PathBuf,
    /// How many runs the external schedule performs per day.
    pub slots_per_day: u32,
    /// Base for relative `page_url` values.
    pub page_base: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("apod_archive.json"),
            slots_per_day: 3,
            page_base: "https://apod.nasa.gov/apod/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionTemplate {
    /// `{prefix}{title}\n\n{link}`
    TitleLink,
    /// `{prefix}{title}\n\n{description}`, link when there is no description.
    TitleDescription,
}

/// What happens to captions longer than the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Truncation {
    /// Keep the first `max_chars` characters.
    Cut,
    /// Keep `max_chars - 3` characters and append `...`.
    Ellipsis,
}

/// Hard upper bound on caption length, whatever the configuration says.
pub const MAX_CAPTION_CHARS: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    pub template: CaptionTemplate,
    pub prefix: String,
    pub truncation: Truncation,
    pub max_chars: usize,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            template: CaptionTemplate::TitleLink,
            prefix: String::new(),
            truncation: Truncation::Cut,
            max_chars: MAX_CAPTION_CHARS,
        }
    }
}

impl CaptionConfig {
    /// Configured cap, never above [`MAX_CAPTION_CHARS`].
    pub fn limit(&self) -> usize {
        self.max_chars.min(MAX_CAPTION_CHARS)
    }
}
