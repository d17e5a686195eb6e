//! Contact channel extraction: phone, email, and contact-form URL.
//!
//! Explicit `tel:`/`mailto:` links win over numbers and addresses found in
//! visible text. Phones are normalized to E.164 (`+14155551234`).

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use reqwest::Url;

use prospect_core::ContactInfo;

use crate::html::{self, Anchor};

static INTL_PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+\d{1,3}[\s.\-]?(?:\(\d{1,4}\)[\s.\-]?)?\d[\d\s.\-]{5,16}\d")
        .expect("valid intl phone regex")
});
static US_PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\b1[\s.\-])?(?:\([2-9]\d{2}\)\s*|[2-9]\d{2}[\s.\-])\d{3}[\s.\-]\d{4}\b")
        .expect("valid US phone regex")
});
static LABELED_PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:phone|tel|call|ph|mobile)\b[^\d+]{0,12}(\+?\d{10,13})\b")
        .expect("valid labeled phone regex")
});
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}\b").expect("valid email regex")
});
static EMAIL_EXACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}$").expect("valid email regex")
});

const CONTACT_KEYWORDS: &[&str] = &[
    "contact",
    "get-in-touch",
    "get in touch",
    "inquire",
    "inquiry",
    "enquire",
    "enquiry",
    "reach-out",
    "reach out",
    "message-us",
];

/// Addresses that appear in vendor boilerplate rather than belonging to the business.
const IGNORED_EMAIL_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "domain.com",
    "sentry.io",
    "wixpress.com",
];
const IMAGE_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

/// Extracts every contact channel the entry page exposes.
#[must_use]
pub fn extract(html_body: &str, page_url: &Url) -> ContactInfo {
    let anchors = html::anchors(html_body);
    let text = html::visible_text(html_body);

    ContactInfo {
        phone: phone_from_links(&anchors).or_else(|| phone_from_text(&text)),
        email: email_from_links(&anchors).or_else(|| email_from_text(&text)),
        contact_form: contact_form(html_body, &anchors, page_url),
    }
}

/// The one sub-page worth checking when the entry page has no contact form.
#[must_use]
pub fn guess_contact_page(page_url: &Url) -> Option<Url> {
    page_url.join("/contact").ok()
}

/// `true` when the page carries a form that looks like it accepts a message.
#[must_use]
pub fn page_has_contact_form(html_body: &str) -> bool {
    html::forms(html_body).iter().any(|f| is_message_form(&f.body))
}

/// Normalizes a raw phone string to E.164, or `None` when it cannot be a
/// dialable number. Bare 10-digit numbers are read as North American.
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    if trimmed.starts_with('+') {
        return (8..=15).contains(&digits.len()).then(|| format!("+{digits}"));
    }
    if let Some(rest) = digits.strip_prefix("00") {
        return (8..=15).contains(&rest.len()).then(|| format!("+{rest}"));
    }
    match digits.len() {
        10 if digits.starts_with(|c: char| ('2'..='9').contains(&c)) => Some(format!("+1{digits}")),
        11 if digits.starts_with('1')
            && digits[1..].starts_with(|c: char| ('2'..='9').contains(&c)) =>
        {
            Some(format!("+{digits}"))
        }
        _ => None,
    }
}

fn phone_from_links(anchors: &[Anchor]) -> Option<String> {
    anchors.iter().find_map(|a| {
        let target = strip_scheme(&a.href, "tel:")?;
        normalize_phone(&percent_decode_str(target).decode_utf8_lossy())
    })
}

fn phone_from_text(text: &str) -> Option<String> {
    INTL_PHONE_RE
        .find_iter(text)
        .filter(|m| !preceded_by_digit(text, m.start()))
        .find_map(|m| normalize_phone(m.as_str()))
        .or_else(|| {
            US_PHONE_RE
                .find_iter(text)
                .filter(|m| !preceded_by_digit(text, m.start()))
                .find_map(|m| normalize_phone(m.as_str()))
        })
        .or_else(|| {
            LABELED_PHONE_RE
                .captures_iter(text)
                .find_map(|c| normalize_phone(c.get(1)?.as_str()))
        })
}

fn preceded_by_digit(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit())
}

fn email_from_links(anchors: &[Anchor]) -> Option<String> {
    anchors.iter().find_map(|a| {
        let target = strip_scheme(&a.href, "mailto:")?;
        let address = target.split('?').next().unwrap_or_default();
        let decoded = percent_decode_str(address).decode_utf8_lossy();
        let first = decoded.split(',').next().unwrap_or_default().trim();
        (EMAIL_EXACT_RE.is_match(first) && !is_ignored_email(first)).then(|| first.to_string())
    })
}

fn email_from_text(text: &str) -> Option<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|e| !is_ignored_email(e))
        .map(str::to_string)
}

fn is_ignored_email(email: &str) -> bool {
    let lower = email.to_ascii_lowercase();
    let domain = lower.rsplit('@').next().unwrap_or_default();
    IMAGE_SUFFIXES.iter().any(|s| lower.ends_with(s))
        || IGNORED_EMAIL_DOMAINS
            .iter()
            .any(|d| domain == *d || domain.ends_with(&format!(".{d}")))
}

fn contact_form(html_body: &str, anchors: &[Anchor], page_url: &Url) -> Option<String> {
    let site = html::site_host(page_url);

    let linked = anchors.iter().find_map(|a| {
        let href = a.href.trim();
        let lower_href = href.to_ascii_lowercase();
        if ["mailto:", "tel:", "javascript:", "#"]
            .iter()
            .any(|p| lower_href.starts_with(p))
        {
            return None;
        }
        let mut url = html::resolve(page_url, href)?;
        if html::site_host(&url) != site {
            return None;
        }
        let path = url.path().to_ascii_lowercase();
        let text = a.text.to_ascii_lowercase();
        if !CONTACT_KEYWORDS
            .iter()
            .any(|k| path.contains(k) || text.contains(k))
        {
            return None;
        }
        url.set_fragment(None);
        Some(url.to_string())
    });
    if linked.is_some() {
        return linked;
    }

    html::forms(html_body).into_iter().find_map(|form| {
        let action_is_contact = form
            .action
            .as_deref()
            .is_some_and(|a| a.to_ascii_lowercase().contains("contact"));
        if !action_is_contact && !is_message_form(&form.body) {
            return None;
        }
        // Forms usually post elsewhere; the page hosting the form is what a visitor opens.
        let mut url = page_url.clone();
        url.set_fragment(None);
        Some(url.to_string())
    })
}

fn is_message_form(form_body: &str) -> bool {
    let lower = form_body.to_ascii_lowercase();
    ["<textarea", "type=\"email\"", "type='email'", "type=email"]
        .iter()
        .any(|needle| lower.contains(needle))
}

fn strip_scheme<'a>(href: &'a str, scheme: &str) -> Option<&'a str> {
    let href = href.trim();
    href.get(..scheme.len())
        .filter(|p| p.eq_ignore_ascii_case(scheme))
        .map(|_| &href[scheme.len()..])
}

#[cfg(test)]
#[path = "contact_test.rs"]
mod tests;
