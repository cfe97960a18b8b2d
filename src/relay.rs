//! One relay run: acquire, caption, deliver.
//!
//! Acquisition failures end the run before the transport is touched, so a
//! run either delivers exactly one message or none.

use std::time::Instant;

use tracing::{error, info, instrument};

use crate::caption::build_caption;
use crate::config::CaptionConfig;
use crate::delivery::{Delivered, deliver};
use crate::error::RelayError;
use crate::sources::Source;
use crate::transport::MessagingTransport;

/// Run `source` once and deliver its item to `chat_id`.
#[instrument(level = "info", skip_all, fields(source = source.name()))]
pub async fn run<S, T>(
    source: &S,
    transport: &T,
    chat_id: &str,
    caption_config: &CaptionConfig,
) -> Result<Delivered, RelayError>
where
    S: Source,
    T: MessagingTransport,
{
    let t0 = Instant::now();

    let item = source.acquire().await.inspect_err(|e| {
        error!(error = %e, "Acquisition failed; nothing will be sent");
    })?;
    info!(
        title = %item.title,
        link = %item.link,
        media_kind = ?item.media_kind,
        has_image = item.has_image(),
        "Acquired item"
    );

    let caption = build_caption(&item, caption_config);
    info!(chars = caption.chars().count(), "Built caption");

    let delivered = deliver(transport, chat_id, &item, &caption).await?;
    info!(
        ?delivered,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Relay run complete"
    );
    Ok(delivered)
}
