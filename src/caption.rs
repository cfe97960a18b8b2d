//! Caption text for the outgoing message.
//!
//! The caption is built from a template, then capped at
//! [`CaptionConfig::limit`] characters because the messaging API refuses
//! longer photo captions. With [`Truncation::Ellipsis`] the cut is made three
//! characters earlier and `...` is appended, so both policies stay within
//! the cap. A cap too small to hold the marker falls back to a plain cut.

use crate::config::{CaptionConfig, CaptionTemplate, Truncation};
use crate::models::NormalizedItem;
use crate::utils::truncate_chars;

const ELLIPSIS: &str = "...";

/// Render `item` with the configured template and cap its length.
pub fn build_caption(item: &NormalizedItem, config: &CaptionConfig) -> String {
    let body = match (config.template, item.description.as_deref()) {
        (CaptionTemplate::TitleDescription, Some(description)) => description,
        _ => item.link.as_str(),
    };
    let caption = format!("{}{}\n\n{}", config.prefix, item.title, body);
    truncate_caption(&caption, config.limit(), config.truncation)
}

/// Cap `caption` at `max_chars` characters.
///
/// Text that already fits is returned unchanged, which makes the function
/// idempotent for a fixed bound.
pub fn truncate_caption(caption: &str, max_chars: usize, policy: Truncation) -> String {
    if caption.chars().count() <= max_chars {
        return caption.to_string();
    }
    match policy {
        Truncation::Cut => truncate_chars(caption, max_chars).to_string(),
        Truncation::Ellipsis if max_chars > ELLIPSIS.len() => {
            let keep = max_chars - ELLIPSIS.len();
            format!("{}{}", truncate_chars(caption, keep), ELLIPSIS)
        }
        Truncation::Ellipsis => truncate_chars(caption, max_chars).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str) -> NormalizedItem {
        NormalizedItem::new(title, "https://apod.nasa.gov/apod/ap251126.html")
    }

    #[test]
    fn test_title_link_template() {
        let caption = build_caption(&item("Comet Lemmon"), &CaptionConfig::default());
        assert_eq!(
            caption,
            "Comet Lemmon\n\nhttps://apod.nasa.gov/apod/ap251126.html"
        );
    }

    #[test]
    fn test_prefix() {
        let config = CaptionConfig {
            prefix: "NASA APOD (2022): ".to_string(),
            ..CaptionConfig::default()
        };
        let caption = build_caption(&item("Moon"), &config);
        assert!(caption.starts_with("NASA APOD (2022): Moon\n\n"));
    }

    #[test]
    fn test_description_template() {
        let config = CaptionConfig {
            template: CaptionTemplate::TitleDescription,
            ..CaptionConfig::default()
        };
        let mut with_description = item("Moon");
        with_description.description = Some("A full moon rises.".to_string());
        assert_eq!(
            build_caption(&with_description, &config),
            "Moon\n\nA full moon rises."
        );

        let caption = build_caption(&item("Moon"), &config);
        assert!(caption.ends_with("ap251126.html"));
    }

    #[test]
    fn test_long_title_is_cut_to_bound() {
        for policy in [Truncation::Cut, Truncation::Ellipsis] {
            let config = CaptionConfig {
                truncation: policy,
                ..CaptionConfig::default()
            };
            for len in [990, 1000, 1500, 20_000] {
                let caption = build_caption(&item(&"x".repeat(len)), &config);
                assert!(caption.chars().count() <= 1000, "{policy:?} {len}");
            }
        }
    }

    #[test]
    fn test_multibyte_title_counts_characters() {
        let caption = build_caption(&item(&"Ж".repeat(1200)), &CaptionConfig::default());
        assert_eq!(caption.chars().count(), 1000);
        assert!(caption.len() > 1000);
    }

    #[test]
    fn test_ellipsis_marker() {
        let caption = truncate_caption(&"a".repeat(1200), 1000, Truncation::Ellipsis);
        assert_eq!(caption.chars().count(), 1000);
        assert!(caption.ends_with("a..."));
    }

    #[test]
    fn test_cut_has_no_marker() {
        let caption = truncate_caption(&"a".repeat(1200), 1000, Truncation::Cut);
        assert_eq!(caption, "a".repeat(1000));
    }

    #[test]
    fn test_truncation_is_idempotent() {
        for policy in [Truncation::Cut, Truncation::Ellipsis] {
            let once = truncate_caption(&"abc ".repeat(400), 1000, policy);
            let twice = truncate_caption(&once, 1000, policy);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_configured_cap_above_bound_is_clamped() {
        let config = CaptionConfig {
            max_chars: 5000,
            ..CaptionConfig::default()
        };
        let caption = build_caption(&item(&"x".repeat(3000)), &config);
        assert_eq!(caption.chars().count(), 1000);
    }

    #[test]
    fn test_tiny_cap_with_ellipsis_stays_within_cap() {
        for max in 0..=3 {
            let caption = truncate_caption("abcdef", max, Truncation::Ellipsis);
            assert_eq!(caption, "abcdef"[..max]);
        }
        assert_eq!(truncate_caption("abcdef", 4, Truncation::Ellipsis), "a...");
    }

    #[test]
    fn test_short_caption_untouched() {
        assert_eq!(truncate_caption("hi", 1000, Truncation::Ellipsis), "hi");
        assert_eq!(truncate_caption("", 0, Truncation::Cut), "");
    }
}
