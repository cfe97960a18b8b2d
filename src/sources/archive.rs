//! Offline archive of past entries, stored as a local JSON array.
//!
//! ```json
//! [
//!   {"title": "...", "page_url": "https://apod.nasa.gov/apod/ap220101.html", "image_url": "..."},
//!   {"title": "...", "page_url": "ap220102.html"}
//! ]
//! ```
//!
//! With a slot (`--slot`), the entry is a pure function of today's date and
//! the slot, see [`archive_slot_index`]. Without one, a random entry is used.

use std::path::Path;

use chrono::{Local, NaiveDate};
use rand::Rng;
use tokio::fs;
use tracing::{info, instrument, warn};

use super::Source;
use crate::config::ArchiveConfig;
use crate::error::AcquisitionError;
use crate::models::{ArchiveEntry, NormalizedItem};
use crate::utils::{archive_slot_index, resolve_url};

#[derive(Debug)]
pub struct ArchiveSource {
    config: ArchiveConfig,
    slot: Option<u32>,
}

impl ArchiveSource {
    pub fn new(config: ArchiveConfig, slot: Option<u32>) -> Self {
        Self { config, slot }
    }
}

impl Source for ArchiveSource {
    fn name(&self) -> &'static str {
        "archive"
    }

    #[instrument(level = "info", skip_all, fields(path = %self.config.path.display(), slot = ?self.slot))]
    async fn acquire(&self) -> Result<NormalizedItem, AcquisitionError> {
        let entries = load_archive(&self.config.path).await?;
        let today = Local::now().date_naive();
        let index = pick_index(entries.len(), self.slot, today, self.config.slots_per_day);
        info!(index, total = entries.len(), "Picked archive entry");

        let entry = entries
            .into_iter()
            .nth(index)
            .ok_or_else(|| AcquisitionError::EmptyArchive(self.config.path.clone()))?;
        entry_to_item(entry, &self.config.page_base)
    }
}

/// Read and parse the archive file. An empty array is an error.
pub async fn load_archive(path: &Path) -> Result<Vec<ArchiveEntry>, AcquisitionError> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|source| AcquisitionError::ArchiveRead {
            path: path.to_path_buf(),
            source,
        })?;
    let entries: Vec<ArchiveEntry> = serde_json::from_str(&raw)?;
    if entries.is_empty() {
        return Err(AcquisitionError::EmptyArchive(path.to_path_buf()));
    }
    Ok(entries)
}

/// Deterministic index when `slot` is given, random otherwise.
pub fn pick_index(len: usize, slot: Option<u32>, today: NaiveDate, slots_per_day: u32) -> usize {
    match slot {
        Some(slot) => archive_slot_index(today, slots_per_day, slot, len),
        None => rand::rng().random_range(0..len.max(1)),
    }
}

fn entry_to_item(entry: ArchiveEntry, page_base: &str) -> Result<NormalizedItem, AcquisitionError> {
    let link = resolve_url(page_base, &entry.page_url)?;
    let mut item = NormalizedItem::new(entry.title, link);
    item.image_url = entry
        .image_url
        .filter(|u| !u.trim().is_empty())
        .and_then(|href| {
            resolve_url(&item.link, &href)
                .inspect_err(|e| warn!(error = %e, "Ignoring unusable archive image"))
                .ok()
        });
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const ARCHIVE: &str = r#"[
        {"title": "First light", "page_url": "https://apod.nasa.gov/apod/ap220101.html",
         "image_url": "https://apod.nasa.gov/apod/image/2201/first.jpg"},
        {"title": "", "page_url": "ap220102.html"},
        {"title": "Third", "page_url": "ap220103.html", "image_url": "image/2201/third.jpg"}
    ]"#;

    fn write_archive(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_pick_index_with_slot_is_deterministic() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(pick_index(3, Some(0), day, 3), 0);
        assert_eq!(pick_index(3, Some(2), day, 3), 2);
        assert_eq!(pick_index(3, Some(2), day, 3), pick_index(3, Some(2), day, 3));
    }

    #[test]
    fn test_pick_index_random_in_range() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        for _ in 0..50 {
            assert!(pick_index(3, None, day, 3) < 3);
        }
    }

    #[test]
    fn test_entry_to_item_resolves_relative_urls() {
        let entries: Vec<ArchiveEntry> = serde_json::from_str(ARCHIVE).unwrap();
        let mut entries = entries.into_iter();
        let base = "https://apod.nasa.gov/apod/";

        let first = entry_to_item(entries.next().unwrap(), base).unwrap();
        assert_eq!(first.title, "First light");

        let second = entry_to_item(entries.next().unwrap(), base).unwrap();
        assert_eq!(second.title, "Untitled");
        assert_eq!(second.link, "https://apod.nasa.gov/apod/ap220102.html");
        assert_eq!(second.image_url, None);

        let third = entry_to_item(entries.next().unwrap(), base).unwrap();
        assert_eq!(
            third.image_url.as_deref(),
            Some("https://apod.nasa.gov/apod/image/2201/third.jpg")
        );
    }

    #[test]
    fn test_unresolvable_image_is_dropped() {
        let entry = ArchiveEntry {
            title: "Broken image".to_string(),
            page_url: "ap220104.html".to_string(),
            image_url: Some("http://[bad".to_string()),
        };
        let item = entry_to_item(entry, "https://apod.nasa.gov/apod/").unwrap();

        assert_eq!(item.link, "https://apod.nasa.gov/apod/ap220104.html");
        assert_eq!(item.image_url, None);
    }

    #[tokio::test]
    async fn test_acquire_with_slot() {
        let (_dir, path) = write_archive(ARCHIVE);
        let config = ArchiveConfig {
            path,
            ..ArchiveConfig::default()
        };
        let item = ArchiveSource::new(config, Some(1)).acquire().await.unwrap();

        assert!(item.link.starts_with("https://apod.nasa.gov/apod/ap2201"));
    }

    #[tokio::test]
    async fn test_empty_archive() {
        let (_dir, path) = write_archive("[]");
        let err = load_archive(&path).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::EmptyArchive(_)));
    }

    #[tokio::test]
    async fn test_missing_archive() {
        let err = load_archive(Path::new("/nonexistent/archive.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::ArchiveRead { .. }));
    }

    #[tokio::test]
    async fn test_malformed_archive() {
        let (_dir, path) = write_archive("{\"title\": 1}");
        let err = load_archive(&path).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::Json(_)));
    }
}
