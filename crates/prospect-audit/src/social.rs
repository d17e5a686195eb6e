//! Social profile discovery from anchor hrefs.
//!
//! Each platform has a host set and a path rule that separates profile pages
//! from share intents, embeds, and single posts. The first accepted link per
//! platform in document order wins.

use reqwest::Url;

use prospect_core::{Platform, SocialProfiles};

use crate::html;

enum PathRule {
    /// Any first segment except these.
    Exclude(&'static [&'static str]),
    /// First segment must be one of these (and be followed by a handle), or
    /// start with `@` when `allow_handle` is set.
    Require {
        prefixes: &'static [&'static str],
        allow_handle: bool,
    },
}

struct PlatformRule {
    platform: Platform,
    hosts: &'static [&'static str],
    path: PathRule,
}

const RULES: &[PlatformRule] = &[
    PlatformRule {
        platform: Platform::Facebook,
        hosts: &["facebook.com", "fb.com"],
        path: PathRule::Exclude(&[
            "sharer",
            "sharer.php",
            "share",
            "share.php",
            "dialog",
            "plugins",
            "tr",
            "login",
            "home.php",
            "policies",
            "privacy",
        ]),
    },
    PlatformRule {
        platform: Platform::Twitter,
        hosts: &["twitter.com", "x.com"],
        path: PathRule::Exclude(&["intent", "share", "home", "search", "hashtag", "i"]),
    },
    PlatformRule {
        platform: Platform::Linkedin,
        hosts: &["linkedin.com"],
        path: PathRule::Require {
            prefixes: &["company", "in", "school", "showcase"],
            allow_handle: false,
        },
    },
    PlatformRule {
        platform: Platform::Instagram,
        hosts: &["instagram.com", "instagr.am"],
        path: PathRule::Exclude(&["p", "explore", "accounts", "reel", "stories"]),
    },
    PlatformRule {
        platform: Platform::Youtube,
        hosts: &["youtube.com"],
        path: PathRule::Require {
            prefixes: &["channel", "c", "user"],
            allow_handle: true,
        },
    },
];

const MOBILE_PREFIXES: &[&str] = &["www.", "m.", "mobile.", "web."];

/// Scans every anchor for known social profile URLs.
#[must_use]
pub fn discover(html_body: &str) -> SocialProfiles {
    let mut profiles = SocialProfiles::default();
    for anchor in html::anchors(html_body) {
        if let Some((platform, url)) = classify(&anchor.href) {
            if profiles.insert_first(platform, url) {
                tracing::trace!(platform = platform.as_str(), "social profile found");
            }
        }
    }
    profiles
}

/// Maps one href to a platform and its canonical profile URL.
fn classify(href: &str) -> Option<(Platform, String)> {
    let url = parse_absolute(href)?;
    let host = url.host_str()?.to_ascii_lowercase();
    let bare = MOBILE_PREFIXES
        .iter()
        .find_map(|p| host.strip_prefix(p))
        .unwrap_or(&host);

    let rule = RULES.iter().find(|r| r.hosts.contains(&bare))?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    let first = segments.first()?.to_ascii_lowercase();

    let accepted = match &rule.path {
        PathRule::Exclude(blocked) => !blocked.contains(&first.as_str()),
        PathRule::Require {
            prefixes,
            allow_handle,
        } => {
            (prefixes.contains(&first.as_str()) && segments.len() >= 2)
                || (*allow_handle && first.len() > 1 && first.starts_with('@'))
        }
    };
    if !accepted {
        return None;
    }

    Some((rule.platform, format!("https://{host}/{}", segments.join("/"))))
}

/// Accepts absolute, protocol-relative, and scheme-less (`facebook.com/acme`) hrefs.
fn parse_absolute(href: &str) -> Option<Url> {
    let href = href.trim();
    let candidate = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.contains("://") {
        href.to_string()
    } else if !href.starts_with('/') && href.split('/').next().is_some_and(|h| h.contains('.')) {
        format!("https://{href}")
    } else {
        return None;
    };
    let url = Url::parse(&candidate).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}
