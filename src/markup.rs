//! Tolerant, regex-based helpers for pulling values out of raw HTML.
//!
//! None of these parse a document. They look at individual tags, accept
//! either quote style and any attribute order, ignore case, and return `None`
//! instead of failing when nothing matches.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<.*?>").unwrap());
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});
static META_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<meta\b[^>]*>").unwrap());
static IMG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<img\b[^>]*>").unwrap());
static ANCHOR_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<a\b[^>]*>").unwrap());
static NUMERIC_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(?:[xX]([0-9A-Fa-f]{1,6})|([0-9]{1,7}));").unwrap());
static H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1\s*>").unwrap());

/// Remove everything that looks like `<...>`.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

/// Decode numeric character references and the named entities that show up
/// in titles and descriptions.
///
/// `&amp;` goes last so `&amp;lt;` stays `&lt;`. References to invalid code
/// points are left as they are.
pub fn decode_entities(text: &str) -> String {
    let named = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&rsquo;", "\u{2019}")
        .replace("&lsquo;", "\u{2018}")
        .replace("&ldquo;", "\u{201c}")
        .replace("&rdquo;", "\u{201d}")
        .replace("&mdash;", "\u{2014}")
        .replace("&ndash;", "\u{2013}")
        .replace("&hellip;", "\u{2026}");
    NUMERIC_ENTITY
        .replace_all(&named, |caps: &regex::Captures| {
            let code = match (caps.get(1), caps.get(2)) {
                (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
                (None, Some(dec)) => dec.as_str().parse::<u32>().ok(),
                (None, None) => None,
            };
            match code.and_then(char::from_u32).filter(|c| *c != '\0') {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .replace("&amp;", "&")
}

/// Strip tags, decode entities and collapse runs of whitespace.
pub fn to_plain_text(html: &str) -> String {
    decode_entities(&strip_tags(html))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Value of attribute `name` inside a single tag.
pub fn attribute(tag: &str, name: &str) -> Option<String> {
    ATTRIBUTE.captures_iter(tag).find_map(|caps| {
        let key = caps.get(1)?.as_str();
        if !key.eq_ignore_ascii_case(name) {
            return None;
        }
        caps.get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// `content` of the first `<meta>` whose `property` or `name` equals `property`.
pub fn meta_content(html: &str, property: &str) -> Option<String> {
    META_TAG.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let matches = ["property", "name"].iter().any(|key| {
            attribute(tag, key).is_some_and(|value| value.eq_ignore_ascii_case(property))
        });
        if !matches {
            return None;
        }
        attribute(tag, "content").filter(|content| !content.is_empty())
    })
}

/// `src` of the first `<img>` that has one.
pub fn first_img_src(html: &str) -> Option<String> {
    IMG_TAG
        .find_iter(html)
        .find_map(|m| attribute(m.as_str(), "src").filter(|src| !src.is_empty()))
}

/// Inner text of the first `<h1>`, inner tags stripped.
pub fn first_h1_text(html: &str) -> Option<String> {
    H1.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| to_plain_text(m.as_str()))
        .filter(|text| !text.is_empty())
}

/// Every anchor `href` in document order.
pub fn anchor_hrefs(html: &str) -> impl Iterator<Item = String> + '_ {
    ANCHOR_TAG
        .find_iter(html)
        .filter_map(|m| attribute(m.as_str(), "href"))
        .filter(|href| !href.is_empty())
}

/// `href` of the last anchor opening tag that starts before `offset`.
///
/// The tag itself may extend past `offset`, so text inside its attributes
/// counts as belonging to it.
pub fn last_anchor_before(html: &str, offset: usize) -> Option<String> {
    ANCHOR_TAG
        .find_iter(html)
        .take_while(|m| m.start() < offset)
        .last()
        .and_then(|m| attribute(m.as_str(), "href"))
}

/// Byte offsets of every case-insensitive occurrence of `needle`.
pub fn find_all_ignore_case(haystack: &str, needle: &str) -> Vec<usize> {
    let pattern = format!("(?i){}", regex::escape(needle));
    match Regex::new(&pattern) {
        Ok(re) => re.find_iter(haystack).map(|m| m.start()).collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_tags("a <br\n/> b"), "a  b");
    }

    #[test]
    fn test_decode_entities_amp_last() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&amp;#39;"), "&#39;");
    }

    #[test]
    fn test_decode_numeric_entities() {
        assert_eq!(
            decode_entities("Hubble&#8217;s view &#x2014; M87"),
            "Hubble\u{2019}s view \u{2014} M87"
        );
        assert_eq!(decode_entities("Saturn&#039;s &#X27;rings&#x27;"), "Saturn's 'rings'");
        assert_eq!(decode_entities("bad &#xD800; &#0; ref"), "bad &#xD800; &#0; ref");
    }

    #[test]
    fn test_attribute_quotes_and_case() {
        let tag = r#"<IMG alt='x' SRC='/a.jpg' data-x="1">"#;
        assert_eq!(attribute(tag, "src"), Some("/a.jpg".to_string()));
        assert_eq!(attribute(tag, "data-x"), Some("1".to_string()));
        assert_eq!(attribute(tag, "href"), None);
    }

    #[test]
    fn test_attribute_does_not_match_suffix() {
        let tag = r#"<img data-src="lazy.jpg" src="real.jpg">"#;
        assert_eq!(attribute(tag, "src"), Some("real.jpg".to_string()));
    }

    #[test]
    fn test_meta_content_any_attribute_order() {
        let html = r#"
            <meta name="description" content="ignored">
            <meta content="Second first" property="og:title" />
            <meta property='og:image' content='https://cdn.example.com/a.jpg'>
        "#;
        assert_eq!(meta_content(html, "og:title"), Some("Second first".to_string()));
        assert_eq!(
            meta_content(html, "OG:IMAGE"),
            Some("https://cdn.example.com/a.jpg".to_string())
        );
        assert_eq!(meta_content(html, "og:description"), None);
    }

    #[test]
    fn test_first_h1_text() {
        let html = "<h1 class=\"t\">Galaxy <span>NGC&nbsp;1300</span></h1><h1>Other</h1>";
        assert_eq!(first_h1_text(html), Some("Galaxy NGC 1300".to_string()));
        assert_eq!(first_h1_text("<h2>No</h2>"), None);
    }

    #[test]
    fn test_first_img_src_skips_images_without_src() {
        let html = r#"<img alt="spacer"><img class="hero" src="/hero.jpg">"#;
        assert_eq!(first_img_src(html), Some("/hero.jpg".to_string()));
    }

    #[test]
    fn test_anchor_hrefs() {
        let html = r#"<a href="/one">1</a><abbr title="x">y</abbr><A class='c' HREF='/two'>2</A>"#;
        let hrefs: Vec<String> = anchor_hrefs(html).collect();
        assert_eq!(hrefs, vec!["/one", "/two"]);
    }

    #[test]
    fn test_last_anchor_before() {
        let html = r#"<a href="/first">x</a> <a href="/second"><span>Target</span></a>"#;
        let offset = find_all_ignore_case(html, "target")[0];
        assert_eq!(last_anchor_before(html, offset), Some("/second".to_string()));
        assert_eq!(last_anchor_before(html, 0), None);
    }

    #[test]
    fn test_last_anchor_before_includes_enclosing_tag() {
        let html = r#"<a href="/earlier">x</a> <a title="Target" href="/own">y</a>"#;
        let offset = find_all_ignore_case(html, "target")[0];
        assert_eq!(last_anchor_before(html, offset), Some("/own".to_string()));
    }

    #[test]
    fn test_find_all_ignore_case() {
        assert_eq!(find_all_ignore_case("Photo, photo, PHOTO", "photo"), vec![0, 7, 14]);
        assert!(find_all_ignore_case("nothing", "photo").is_empty());
    }
}
