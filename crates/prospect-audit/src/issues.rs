//! Technical and usability issue audit of a fetched entry page.
//!
//! Checks run in a fixed order and each contributes at most one [`Issue`].
//! A failed entry fetch short-circuits to exactly [`Issue::Unreachable`].

use std::collections::HashSet;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Url;

use prospect_core::{AuditConfig, Issue, IssueList};

use crate::error::{StepError, StepOutcome};
use crate::fetch::{FetchResult, Fetcher};
use crate::html;

pub const SLOW_RESPONSE_THRESHOLD: Duration = Duration::from_secs(3);
pub const LARGE_PAGE_BYTES: u64 = 5 * 1024 * 1024;
/// Share of `<img>` tags without alt text above which the page is flagged.
pub const MISSING_ALT_RATIO: f64 = 0.3;

const CTA_PHRASES: &[&str] = &[
    "contact us",
    "get started",
    "sign up",
    "book now",
    "call now",
    "learn more",
    "free trial",
    "buy now",
    "order online",
    "get a quote",
];

/// `(href needle, report label)` for pages every business site should link to.
const KEY_PAGES: &[(&str, &str)] = &[
    ("about", "About"),
    ("contact", "Contact"),
    ("privacy", "Privacy"),
];

/// How the entry page's transport security turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslStatus {
    Secure,
    /// Served over plain HTTP.
    Plaintext,
    /// HTTPS failed validation; the page was only reachable over HTTP.
    CertificateInvalid,
}

impl SslStatus {
    #[must_use]
    pub fn from_final_url(url: &Url) -> Self {
        if url.scheme() == "https" {
            SslStatus::Secure
        } else {
            SslStatus::Plaintext
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkCheckReport {
    pub checked: usize,
    pub broken: usize,
    pub errors: Vec<StepError>,
}

/// Audits the entry page. Page-dependent checks only run on a successful fetch.
pub async fn audit(
    fetcher: &Fetcher,
    fetched: &FetchResult,
    ssl: SslStatus,
    config: &AuditConfig,
) -> StepOutcome<IssueList> {
    let Some(page) = fetched.page() else {
        return StepOutcome::ok(IssueList::from(vec![Issue::Unreachable]));
    };

    let mut issues = IssueList::new();
    let body = page.html.as_str();

    if ssl != SslStatus::Secure {
        issues.push(Issue::MissingSsl);
    }

    if html::title(body).is_none() {
        issues.push(Issue::MissingTitle);
    }
    if html::meta_content(body, "name", "description").is_none_or(|d| d.trim().is_empty()) {
        issues.push(Issue::MissingMetaDescription);
    }
    match html::count_h1(body) {
        0 => {
            issues.push(Issue::MissingH1);
        }
        1 => {}
        _ => {
            issues.push(Issue::MultipleH1);
        }
    }

    let links = sample_internal_links(body, &page.final_url, config.link_sample_size);
    let report = check_links(
        fetcher,
        &links,
        config.link_check_timeout,
        config.max_concurrent_subrequests,
    )
    .await;
    if report.broken > 0 {
        issues.push(Issue::BrokenLinks {
            broken: report.broken,
            checked: report.checked,
        });
    }

    if html::meta_content(body, "name", "viewport").is_none() {
        issues.push(Issue::MissingViewport);
    }

    if page.response_time > SLOW_RESPONSE_THRESHOLD {
        issues.push(Issue::SlowResponse {
            millis: u64::try_from(page.response_time.as_millis()).unwrap_or(u64::MAX),
        });
    }

    let bytes = page.html.len() as u64;
    if bytes > LARGE_PAGE_BYTES {
        issues.push(Issue::LargePage { bytes });
    }

    let (total, missing) = html::image_alt_counts(body);
    #[allow(clippy::cast_precision_loss)] // image counts are tiny
    let missing_share = if total == 0 {
        0.0
    } else {
        missing as f64 / total as f64
    };
    if missing_share > MISSING_ALT_RATIO {
        issues.push(Issue::ImagesMissingAlt { missing, total });
    }

    if !html::has_navigation(body) {
        issues.push(Issue::MissingNavigation);
    }
    if !has_call_to_action(body) {
        issues.push(Issue::MissingCallToAction);
    }
    if html::uses_table_layout(body) {
        issues.push(Issue::OutdatedLayout);
    }
    let pages = missing_key_pages(body);
    if !pages.is_empty() {
        issues.push(Issue::MissingKeyPages { pages });
    }

    StepOutcome {
        value: issues,
        errors: report.errors,
    }
}

fn has_call_to_action(body: &str) -> bool {
    let text = html::visible_text(body).to_lowercase();
    CTA_PHRASES.iter().any(|phrase| text.contains(phrase))
}

/// Labels of the [`KEY_PAGES`] no anchor on the page points at.
#[must_use]
pub fn missing_key_pages(body: &str) -> Vec<String> {
    let hrefs: Vec<String> = html::anchors(body)
        .into_iter()
        .map(|a| a.href.to_ascii_lowercase())
        .collect();
    KEY_PAGES
        .iter()
        .filter(|(needle, _)| !hrefs.iter().any(|href| href.contains(needle)))
        .map(|(_, label)| (*label).to_string())
        .collect()
}

/// Up to `limit` distinct same-site links from the page, in document order,
/// fragments removed. The page itself is skipped.
#[must_use]
pub fn sample_internal_links(body: &str, page_url: &Url, limit: usize) -> Vec<Url> {
    let site = html::site_host(page_url);
    let mut seen = HashSet::new();
    let mut own = page_url.clone();
    own.set_fragment(None);
    seen.insert(own.to_string());

    let mut links = Vec::new();
    for anchor in html::anchors(body) {
        if links.len() >= limit {
            break;
        }
        let Some(mut url) = html::resolve(page_url, &anchor.href) else {
            continue;
        };
        if html::site_host(&url) != site {
            continue;
        }
        url.set_fragment(None);
        if seen.insert(url.to_string()) {
            links.push(url);
        }
    }
    links
}

/// Probes each link with its own timeout, at most `concurrency` at a time.
/// A status of 400 or above, or any transport failure, counts as broken.
pub async fn check_links(
    fetcher: &Fetcher,
    links: &[Url],
    timeout: Duration,
    concurrency: usize,
) -> LinkCheckReport {
    let results: Vec<(&Url, Result<u16, crate::FetchFailure>)> = stream::iter(links)
        .map(|url| async move { (url, fetcher.check_link(url, timeout).await) })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut report = LinkCheckReport {
        checked: results.len(),
        ..LinkCheckReport::default()
    };
    for (url, result) in results {
        match result {
            Ok(status) if status < 400 => {}
            Ok(status) => {
                report.broken += 1;
                if status == 404 || status == 410 {
                    report
                        .errors
                        .push(StepError::NotFound(format!("{url} ({status})")));
                }
                tracing::debug!(url = %url, status, "broken link");
            }
            Err(failure) => {
                report.broken += 1;
                tracing::debug!(url = %url, error = %failure, "link check failed");
                report.errors.push(StepError::Network(failure));
            }
        }
    }
    report
}

#[cfg(test)]
#[path = "issues_test.rs"]
mod tests;
