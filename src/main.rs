//! # Daily Image Relay
//!
//! Fetches a "daily image" from one upstream and relays it to a Telegram
//! chat as a photo with a caption, falling back to a text message when no
//! usable image exists or the photo is refused.
//!
//! ## Usage
//!
//! ```sh
//! TELEGRAM_BOT_TOKEN=... TELEGRAM_CHAT_ID=... daily_image_relay --source apod
//! ```
//!
//! ## Architecture
//!
//! One run is a straight pipeline:
//! 1. **Acquire**: a [`sources::Source`] fetches and extracts one item
//! 2. **Caption**: [`caption::build_caption`] renders a bounded caption
//! 3. **Deliver**: [`delivery::deliver`] walks HD photo → photo → text
//!
//! Scheduling is left to cron or a CI timer; each invocation is one run.

use std::error::Error;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod caption;
mod cli;
mod config;
mod delivery;
mod error;
mod markup;
mod models;
mod relay;
mod sources;
mod transport;
mod utils;

use cli::Cli;
use config::{Credentials, RelayConfig};
use error::RelayError;
use sources::SelectedSource;
use transport::TelegramTransport;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "daily_image_relay starting up");

    let args = Cli::parse();
    debug!(source = ?args.source, config = ?args.config, slot = ?args.slot, "Parsed CLI arguments");

    if let Err(e) = relay_once(&args).await {
        error!(error = %e, "Relay run failed");
        return Err(e.into());
    }
    Ok(())
}

/// Build the run's collaborators from `args` and perform one relay.
async fn relay_once(args: &Cli) -> Result<(), RelayError> {
    let credentials = Credentials::from_cli(args)?;
    let config = RelayConfig::load(args.config.as_deref()).await?;
    let client = config.http.client()?;

    let source = SelectedSource::new(args.source, client.clone(), &config, &args.api_key, args.slot);
    let transport = TelegramTransport::new(client, &config.telegram.api_base, &credentials.telegram_token);

    relay::run(&source, &transport, &credentials.chat_id, &config.caption).await?;
    Ok(())
}
