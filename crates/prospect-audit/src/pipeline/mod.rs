//! Per-business orchestration: one entry-page fetch, four independent
//! extraction steps joined before scoring, then assembly.
//!
//! [`Auditor::run`] (in `run.rs`) drives many businesses through a bounded
//! worker pool.

mod run;
mod state;

pub use run::{CancelSignal, ProgressEvent, RunOutcome};
pub use state::BusinessState;

use prospect_core::{
    AuditConfig, AuditedBusiness, BusinessCandidate, ContactInfo, SocialProfiles, TechStack,
};

use crate::contact;
use crate::error::{AuditError, FetchFailure, StepError, StepOutcome};
use crate::fetch::{FetchResult, FetchedPage, Fetcher};
use crate::html;
use crate::issues::{self, SslStatus};
use crate::rate_limit::retry_with_backoff;
use crate::score;
use crate::social;
use crate::tech;
use state::StateTracker;

/// Retries granted to each business website before accepting failure.
const WEBSITE_RETRIES: u32 = 1;

/// An audited business plus every non-fatal error swallowed on the way.
#[derive(Debug, Clone)]
pub struct BusinessAudit {
    pub business: AuditedBusiness,
    pub errors: Vec<StepError>,
}

struct EntryPage {
    result: FetchResult,
    /// Only meaningful when `result` is a success.
    ssl: SslStatus,
}

/// Runs the audit pipeline. One instance (and its shared [`Fetcher`]) serves a
/// whole run.
#[derive(Debug)]
pub struct Auditor {
    fetcher: Fetcher,
    config: AuditConfig,
}

impl Auditor {
    /// # Errors
    ///
    /// Returns [`AuditError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self { fetcher, config })
    }

    #[must_use]
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Drives one candidate to a scored [`AuditedBusiness`]. Never fails:
    /// every step error degrades to that step's empty value.
    pub async fn audit_business(&self, candidate: BusinessCandidate) -> BusinessAudit {
        let name = candidate.name.clone();
        let mut tracker = StateTracker::new(&name);
        let mut errors = Vec::new();

        tracker.advance(BusinessState::Fetching);
        let entry = match candidate.website.as_deref().and_then(normalize_website) {
            Some(url) => self.fetch_entry_page(&url).await,
            None => EntryPage {
                result: FetchResult::Failure(FetchFailure::Connection(
                    "no website listed".to_string(),
                )),
                ssl: SslStatus::Plaintext,
            },
        };

        let (mut contact, socials, tech_stack, issues) = if let Some(page) = entry.result.page() {
            tracker.advance(BusinessState::Extracting);

            let (contact, socials, tech_stack, issues) = tokio::join!(
                self.contact_step(page),
                async { markup_step(page, social::discover(&page.html)) },
                async { markup_step(page, tech::detect(&page.html, &page.headers)) },
                issues::audit(&self.fetcher, &entry.result, entry.ssl, &self.config),
            );
            errors.extend(contact.errors);
            errors.extend(socials.errors);
            errors.extend(tech_stack.errors);
            errors.extend(issues.errors);
            (contact.value, socials.value, tech_stack.value, issues.value)
        } else {
            tracker.advance(BusinessState::FetchFailed);
            if let Some(failure) = entry.result.failure() {
                tracing::warn!(business = %name, error = %failure, "website fetch failed");
                errors.push(StepError::Network(failure.clone()));
            }
            let issues = issues::audit(&self.fetcher, &entry.result, entry.ssl, &self.config).await;
            (
                ContactInfo::default(),
                SocialProfiles::default(),
                TechStack::default(),
                issues.value,
            )
        };

        if entry.result.is_success() && contact.phone.is_none() {
            contact.phone = candidate.phone.as_deref().and_then(contact::normalize_phone);
        }

        let result = score::score(&contact, &socials, &tech_stack, &issues, &entry.result);
        tracker.advance(BusinessState::Scored);
        debug_assert!(tracker.state().is_terminal());

        for error in &errors {
            tracing::debug!(business = %name, error = %error, "step error swallowed");
        }
        tracing::info!(
            business = %name,
            score = result.score,
            level = %result.level,
            issues = issues.len(),
            "business audited"
        );

        BusinessAudit {
            business: AuditedBusiness::assemble(
                candidate,
                contact,
                socials,
                tech_stack,
                issues,
                result,
            ),
            errors,
        }
    }

    /// Fetches the entry page with one retry, then falls back to plain HTTP
    /// when HTTPS fails certificate validation.
    async fn fetch_entry_page(&self, url: &str) -> EntryPage {
        let timeout = self.config.request_timeout;
        let result = retry_with_backoff(WEBSITE_RETRIES, self.config.retry_backoff, || {
            self.fetcher.fetch(url, timeout)
        })
        .await;

        if let Some(page) = result.page() {
            let ssl = SslStatus::from_final_url(&page.final_url);
            return EntryPage { result, ssl };
        }

        let Some(plain) = plain_http_fallback(url, &result) else {
            return EntryPage {
                result,
                ssl: SslStatus::Plaintext,
            };
        };

        tracing::warn!(url, "TLS failed, retrying over plain HTTP");
        let fallback = self.fetcher.fetch(&plain, timeout).await;
        entry_after_fallback(result, fallback)
    }

    /// Contact extraction on the entry page, plus at most one guessed
    /// `/contact` sub-page fetch when the entry page has no contact form.
    async fn contact_step(&self, page: &FetchedPage) -> StepOutcome<ContactInfo> {
        let mut outcome = markup_step(page, contact::extract(&page.html, &page.final_url));
        if outcome.value.contact_form.is_some() {
            return outcome;
        }
        let Some(guess) = contact::guess_contact_page(&page.final_url) else {
            return outcome;
        };
        if guess.path() == page.final_url.path() {
            return outcome;
        }

        match self
            .fetcher
            .fetch(guess.as_str(), self.config.request_timeout)
            .await
        {
            FetchResult::Success(sub) => {
                let found = contact::extract(&sub.html, &sub.final_url);
                if contact::page_has_contact_form(&sub.html) || found.contact_form.is_some() {
                    outcome.value.contact_form = Some(sub.final_url.to_string());
                }
                let value = &mut outcome.value;
                if value.phone.is_none() {
                    value.phone = found.phone;
                }
                if value.email.is_none() {
                    value.email = found.email;
                }
                outcome
            }
            FetchResult::Failure(FetchFailure::Status(status @ (404 | 410))) => {
                outcome.with_error(StepError::NotFound(format!("{guess} ({status})")))
            }
            FetchResult::Failure(failure) => outcome.with_error(StepError::Network(failure)),
        }
    }
}

/// Wraps a markup-derived value, noting when the body did not look like HTML
/// (the value is still whatever partial extraction produced).
fn markup_step<T>(page: &FetchedPage, value: T) -> StepOutcome<T> {
    let outcome = StepOutcome::ok(value);
    if html::looks_like_html(&page.html) {
        outcome
    } else {
        outcome.with_error(StepError::Parse(format!(
            "{} did not return HTML",
            page.final_url
        )))
    }
}

/// The `http://` twin of `url`, when its HTTPS fetch failed certificate or
/// handshake validation. Other failures are not worth a plaintext retry.
fn plain_http_fallback(url: &str, result: &FetchResult) -> Option<String> {
    if !matches!(result.failure(), Some(FetchFailure::Tls(_))) {
        return None;
    }
    let scheme = url.get(..8)?;
    if !scheme.eq_ignore_ascii_case("https://") {
        return None;
    }
    Some(format!("http://{}", &url[8..]))
}

/// A plaintext page that answered after HTTPS failed validation is analysed
/// but flagged; otherwise the original HTTPS failure stands.
fn entry_after_fallback(original: FetchResult, fallback: FetchResult) -> EntryPage {
    match fallback {
        FetchResult::Success(_) => EntryPage {
            result: fallback,
            ssl: SslStatus::CertificateInvalid,
        },
        FetchResult::Failure(_) => EntryPage {
            result: original,
            ssl: SslStatus::Plaintext,
        },
    }
}

/// Trims the discovery-supplied URL and assumes HTTPS when no scheme is given.
fn normalize_website(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains("://") {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{}", trimmed.trim_start_matches('/')))
    }
}
