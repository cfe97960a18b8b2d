//! Tiered delivery of one item.
//!
//! Tiers are tried strictly in order and the first success ends delivery:
//!
//! 1. photo with the HD image URL, if there is one
//! 2. photo with the standard image URL, if there is one and it differs
//! 3. text message with the caption
//!
//! A photo the messaging API rejects (bad URL, unsupported content, caption
//! refused) moves delivery to the next tier. Anything else, including a
//! failed text message, ends the run with a [`DeliveryError`]. No tier is
//! ever retried: a duplicate post is worse than a missed one.

use tracing::{info, instrument, warn};

use crate::error::DeliveryError;
use crate::models::{MediaKind, NormalizedItem};
use crate::transport::MessagingTransport;

/// Which photo tier an attempt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoTier {
    Hd,
    Standard,
}

/// One step of the delivery plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Photo { tier: PhotoTier, url: String },
    Text,
}

/// What reached the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    Photo { tier: PhotoTier, url: String },
    Text,
}

/// Ordered attempts for `item`. Always ends with [`Attempt::Text`].
pub fn plan(item: &NormalizedItem) -> Vec<Attempt> {
    let mut attempts = Vec::with_capacity(3);
    if item.media_kind == MediaKind::Image {
        if let Some(hd) = &item.hd_image_url {
            attempts.push(Attempt::Photo {
                tier: PhotoTier::Hd,
                url: hd.clone(),
            });
        }
        if let Some(standard) = &item.image_url {
            if item.hd_image_url.as_ref() != Some(standard) {
                attempts.push(Attempt::Photo {
                    tier: PhotoTier::Standard,
                    url: standard.clone(),
                });
            }
        }
    }
    attempts.push(Attempt::Text);
    attempts
}

/// Text sent when no photo went through.
///
/// Items that are not images get their media URL (or page link) appended,
/// unless the caption already contains it, so readers can still click
/// through to the video or page.
pub fn text_message(item: &NormalizedItem, caption: &str) -> String {
    if item.media_kind != MediaKind::Other {
        return caption.to_string();
    }
    let target = item.media_url.as_deref().unwrap_or(&item.link);
    if caption.contains(target) {
        caption.to_string()
    } else {
        format!("{caption}\n\n{target}")
    }
}

/// Run the delivery plan for `item` against `transport`.
#[instrument(level = "info", skip_all, fields(title = %item.title))]
pub async fn deliver<T: MessagingTransport>(
    transport: &T,
    chat_id: &str,
    item: &NormalizedItem,
    caption: &str,
) -> Result<Delivered, DeliveryError> {
    for attempt in plan(item) {
        let Attempt::Photo { tier, url } = attempt else {
            break;
        };
        match transport.send_photo(chat_id, &url, caption).await {
            Ok(()) => {
                info!(?tier, %url, "Delivered photo");
                return Ok(Delivered::Photo { tier, url });
            }
            Err(e) if e.is_recoverable() => {
                warn!(?tier, %url, error = %e, "Photo rejected; falling back");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let text = text_message(item, caption);
    transport.send_message(chat_id, &text).await?;
    info!(chars = text.chars().count(), "Delivered text message");
    Ok(Delivered::Text)
}
