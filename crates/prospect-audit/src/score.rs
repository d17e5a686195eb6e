//! Deterministic weighted scoring of an audited business.
//!
//! Starts at [`BASELINE`], subtracts fixed deductions per negative signal, adds
//! a capped bonus for a modern stack, then clamps and rounds through
//! [`ScoreResult::from_raw`].

use prospect_core::{ContactInfo, Issue, IssueList, ScoreResult, SocialProfiles, TechStack};

use crate::fetch::FetchResult;
use crate::tech;

pub const BASELINE: f64 = 10.0;
/// Applied when the entry page could not be fetched at all. Larger than
/// [`MAX_ISSUE_DEDUCTION`] so no combination of page issues scores as low.
pub const UNREACHABLE_DEDUCTION: f64 = 7.0;
pub const MAX_ISSUE_DEDUCTION: f64 = 6.0;
pub const NO_CONTACT_DEDUCTION: f64 = 1.5;
pub const NO_SOCIALS_DEDUCTION: f64 = 0.5;
pub const MODERN_STACK_BONUS: f64 = 0.25;
pub const MAX_MODERN_STACK_BONUS: f64 = 0.5;
/// Per key page (About, Contact, Privacy) nothing links to.
pub const MISSING_PAGE_DEDUCTION: f64 = 0.3;

fn issue_deduction(issue: &Issue) -> f64 {
    match issue {
        // Covered by the unreachable deduction.
        Issue::Unreachable => 0.0,
        Issue::MissingSsl => 2.0,
        Issue::MissingViewport => 1.5,
        Issue::BrokenLinks { .. }
        | Issue::SlowResponse { .. }
        | Issue::MissingNavigation
        | Issue::OutdatedLayout => 1.0,
        Issue::MissingTitle
        | Issue::MissingMetaDescription
        | Issue::MissingH1
        | Issue::LargePage { .. }
        | Issue::ImagesMissingAlt { .. }
        | Issue::MissingCallToAction => 0.5,
        Issue::MultipleH1 => 0.25,
        #[allow(clippy::cast_precision_loss)] // at most three pages
        Issue::MissingKeyPages { pages } => pages.len() as f64 * MISSING_PAGE_DEDUCTION,
    }
}

/// Pure function of its inputs: the same signals always give the same result.
#[must_use]
pub fn score(
    contact: &ContactInfo,
    socials: &SocialProfiles,
    tech_stack: &TechStack,
    issues: &IssueList,
    fetched: &FetchResult,
) -> ScoreResult {
    let mut raw = BASELINE;

    if !fetched.is_success() || issues.contains_unreachable() {
        raw -= UNREACHABLE_DEDUCTION;
    }

    let issue_total: f64 = issues.iter().map(issue_deduction).sum();
    raw -= issue_total.min(MAX_ISSUE_DEDUCTION);

    if contact.is_empty() {
        raw -= NO_CONTACT_DEDUCTION;
    }
    if socials.is_empty() {
        raw -= NO_SOCIALS_DEDUCTION;
    }

    let bonus: f64 = [tech_stack.cms.as_deref(), tech_stack.frontend.as_deref()]
        .into_iter()
        .flatten()
        .filter(|label| tech::is_modern(label))
        .map(|_| MODERN_STACK_BONUS)
        .sum();
    raw += bonus.min(MAX_MODERN_STACK_BONUS);

    ScoreResult::from_raw(raw)
}
