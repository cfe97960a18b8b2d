//! Command-line interface definitions.
//!
//! Credentials can be provided via command-line flags or environment
//! variables. Everything else lives in the optional YAML config file.

use std::path::PathBuf;

use clap::Parser;

use crate::sources::SourceKind;

/// Relay today's space image to a Telegram chat.
///
/// # Examples
///
/// ```sh
/// # NASA APOD API, credentials from the environment
/// TELEGRAM_BOT_TOKEN=... TELEGRAM_CHAT_ID=... daily_image_relay
///
/// # Space.com image of the day with a custom config file
/// daily_image_relay --source scrape -c relay.yaml
///
/// # Offline archive, second run of the day
/// daily_image_relay --source archive --slot 1
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Where to take the daily image from
    #[arg(short, long, value_enum, default_value_t = SourceKind::Apod)]
    pub source: SourceKind,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Destination chat id
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub chat_id: Option<String>,

    /// NASA API key
    #[arg(long, env = "NASA_API_KEY", default_value = "DEMO_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Index of this run within the day, for the archive source
    #[arg(long)]
    pub slot: Option<u32>,
}
