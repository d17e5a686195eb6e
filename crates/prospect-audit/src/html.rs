//! Tolerant, regex-based HTML scanning helpers.
//!
//! Nothing here builds a DOM; every helper degrades to a partial answer on
//! malformed markup instead of failing.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

static ANCHOR_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b([^>]*)>").expect("valid anchor regex"));
static ANCHOR_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)</a\s*>|<a\b").expect("valid anchor end regex"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});
static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b([^>]*)>").expect("valid meta regex"));
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("valid title regex"));
static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h1\b").expect("valid h1 regex"));
static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b([^>]*)>").expect("valid img regex"));
static FORM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<form\b([^>]*)>(.*?)(?:</form\s*>|$)").expect("valid form regex")
});
static SCRIPT_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b([^>]*)>").expect("valid script regex"));
static NON_VISIBLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>",
        r"|<noscript\b.*?</noscript\s*>|<!--.*?-->",
    ))
    .expect("valid non-visible regex")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static NAV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<nav\b|\b(?:class|id)\s*=\s*["']?[^"'>]*(?:nav|menu)"#)
        .expect("valid navigation regex")
});
static MODERN_MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)<(?:section|article|header|footer|main)\b",
        r"|bootstrap|tailwind|material|foundation",
    ))
    .expect("valid modern markup regex")
});
static TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<table\b").expect("valid table regex"));
static DIV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<div\b").expect("valid div regex"));

/// An `<a>` element: its raw `href` and its visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub action: Option<String>,
    pub body: String,
}

/// Parses `name="value"` pairs from the inside of a tag. Names are lowercased,
/// values entity-decoded and trimmed.
#[must_use]
pub fn parse_attrs(tag_inner: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(tag_inner)
        .filter_map(|c| {
            let name = c.get(1)?.as_str().to_ascii_lowercase();
            let value = c.get(2).or_else(|| c.get(3)).or_else(|| c.get(4))?;
            Some((name, decode_entities(value.as_str()).trim().to_string()))
        })
        .collect()
}

#[must_use]
pub fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// All anchors with an `href`, in document order.
#[must_use]
pub fn anchors(html: &str) -> Vec<Anchor> {
    ANCHOR_OPEN_RE
        .captures_iter(html)
        .filter_map(|c| {
            let open = c.get(0)?;
            let attrs = parse_attrs(c.get(1)?.as_str());
            let href = attr(&attrs, "href")?.to_string();
            let rest = &html[open.end()..];
            let inner_end = ANCHOR_END_RE.find(rest).map_or(rest.len(), |m| m.start());
            let text = strip_tags(&rest[..inner_end]);
            Some(Anchor { href, text })
        })
        .collect()
}

/// `content` of the first `<meta>` whose `key_attr` equals `key` (case-insensitive).
#[must_use]
pub fn meta_content(html: &str, key_attr: &str, key: &str) -> Option<String> {
    META_TAG_RE.captures_iter(html).find_map(|c| {
        let attrs = parse_attrs(c.get(1)?.as_str());
        if attr(&attrs, key_attr)?.eq_ignore_ascii_case(key) {
            Some(attr(&attrs, "content").unwrap_or_default().to_string())
        } else {
            None
        }
    })
}

/// Trimmed, non-empty `<title>` text.
#[must_use]
pub fn title(html: &str) -> Option<String> {
    let raw = TITLE_RE.captures(html)?.get(1)?.as_str();
    let text = strip_tags(raw);
    (!text.is_empty()).then_some(text)
}

#[must_use]
pub fn count_h1(html: &str) -> usize {
    H1_RE.find_iter(html).count()
}

/// `(total images, images without a non-empty alt attribute)`.
#[must_use]
pub fn image_alt_counts(html: &str) -> (usize, usize) {
    let mut total = 0;
    let mut missing = 0;
    for c in IMG_TAG_RE.captures_iter(html) {
        total += 1;
        let attrs = c
            .get(1)
            .map(|m| parse_attrs(m.as_str()))
            .unwrap_or_default();
        if attr(&attrs, "alt").is_none_or(str::is_empty) {
            missing += 1;
        }
    }
    (total, missing)
}

#[must_use]
pub fn forms(html: &str) -> Vec<Form> {
    FORM_RE
        .captures_iter(html)
        .map(|c| {
            let attrs = c
                .get(1)
                .map(|m| parse_attrs(m.as_str()))
                .unwrap_or_default();
            Form {
                action: attr(&attrs, "action")
                    .filter(|a| !a.is_empty())
                    .map(str::to_string),
                body: c.get(2).map_or_else(String::new, |m| m.as_str().to_string()),
            }
        })
        .collect()
}

/// `src` values of all `<script>` tags.
#[must_use]
pub fn script_sources(html: &str) -> Vec<String> {
    SCRIPT_SRC_RE
        .captures_iter(html)
        .filter_map(|c| {
            let attrs = parse_attrs(c.get(1)?.as_str());
            attr(&attrs, "src").map(str::to_string)
        })
        .collect()
}

/// Text a visitor would read: scripts, styles, comments, and tags removed,
/// entities decoded, whitespace collapsed.
#[must_use]
pub fn visible_text(html: &str) -> String {
    let without_code = NON_VISIBLE_RE.replace_all(html, " ");
    strip_tags(&without_code)
}

fn strip_tags(fragment: &str) -> String {
    let text = TAG_RE.replace_all(fragment, " ");
    let decoded = decode_entities(&text);
    WS_RE.replace_all(&decoded, " ").trim().to_string()
}

#[must_use]
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&#64;", "@")
        .replace("&#x40;", "@")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Resolves `href` against `base`, keeping only `http`/`https` results.
#[must_use]
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Host without a leading `www.`, lowercased.
#[must_use]
pub fn site_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Cheap sanity check that a body is markup at all.
#[must_use]
pub fn looks_like_html(body: &str) -> bool {
    let head = body.chars().take(4096).collect::<String>().to_ascii_lowercase();
    ["<html", "<!doctype", "<body", "<head", "<div", "<a "]
        .iter()
        .any(|marker| head.contains(marker))
}

/// A `<nav>` element, or any element whose class or id mentions a nav/menu.
#[must_use]
pub fn has_navigation(html: &str) -> bool {
    NAV_RE.is_match(html)
}

/// Layout built from tables alone: a `<table>`, no `<div>`, and neither
/// HTML5 sectioning elements nor a CSS framework.
#[must_use]
pub fn uses_table_layout(html: &str) -> bool {
    TABLE_RE.is_match(html) && !DIV_RE.is_match(html) && !MODERN_MARKUP_RE.is_match(html)
}
