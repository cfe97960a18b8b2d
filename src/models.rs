//! Data model shared by every source and by the delivery pipeline.
//!
//! - [`NormalizedItem`]: the one record a run produces and consumes
//! - [`MediaKind`]: whether the upstream entry is a displayable image
//! - [`ArchiveEntry`]: one row of an offline archive file

use serde::Deserialize;

/// Title used when an upstream entry has none.
pub const FALLBACK_TITLE: &str = "Untitled";

/// Classification of the upstream media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    /// Video, interactive page or anything we cannot post as a photo.
    Other,
}

/// A daily item as extracted by a source.
///
/// Created once per run by a [`Source`](crate::sources::Source) and handed to
/// the caption builder and the delivery pipeline. It is never mutated after
/// the source returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedItem {
    /// Display title, never empty.
    pub title: String,
    /// Absolute URL of the page the item came from.
    pub link: String,
    /// Standard quality image.
    pub image_url: Option<String>,
    /// Higher quality image, when the source offers one.
    pub hd_image_url: Option<String>,
    pub media_kind: MediaKind,
    /// Plain-text description, tags already stripped.
    pub description: Option<String>,
    /// Raw upstream media URL for [`MediaKind::Other`] entries.
    pub media_url: Option<String>,
}

impl NormalizedItem {
    /// Build an image item. A blank `title` is replaced with [`FALLBACK_TITLE`].
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title_or_fallback(title.into(), FALLBACK_TITLE),
            link: link.into(),
            image_url: None,
            hd_image_url: None,
            media_kind: MediaKind::Image,
            description: None,
            media_url: None,
        }
    }

    /// Whether any photo tier can be attempted.
    pub fn has_image(&self) -> bool {
        self.media_kind == MediaKind::Image
            && (self.image_url.is_some() || self.hd_image_url.is_some())
    }
}

/// Trim `title`, falling back to `fallback` when nothing is left.
pub fn title_or_fallback(title: String, fallback: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else if trimmed.len() == title.len() {
        title
    } else {
        trimmed.to_string()
    }
}

/// One entry of an offline archive file.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveEntry {
    #[serde(default)]
    pub title: String,
    pub page_url: String,
    #[serde(default)]
    pub image_url: Option<String>,
}
