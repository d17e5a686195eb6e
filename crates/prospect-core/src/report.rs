//! Run-level aggregation: the summary block and the persisted report envelope.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::business::{AuditedBusiness, OpportunityLevel, NEEDS_REDESIGN_THRESHOLD};

/// Number of lowest-scoring businesses surfaced in the summary.
pub const TOP_OPPORTUNITY_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopOpportunity {
    pub name: String,
    pub website: Option<String>,
    pub score: f64,
    pub opportunity_level: OpportunityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub industry: String,
    pub location: String,
    pub total_businesses: usize,
    pub poor_websites_percentage: f64,
    pub top_opportunities: Vec<TopOpportunity>,
}

/// Derives the summary from the full set of audited businesses.
///
/// Recomputed from scratch on every call; ordering of `businesses` only
/// matters for breaking score ties in `top_opportunities`.
#[must_use]
pub fn build_run_summary(
    industry: &str,
    location: &str,
    businesses: &[AuditedBusiness],
) -> RunSummary {
    let total_businesses = businesses.len();
    let poor = businesses
        .iter()
        .filter(|b| b.score().score < NEEDS_REDESIGN_THRESHOLD)
        .count();

    let poor_websites_percentage = if total_businesses == 0 {
        0.0
    } else {
        // Counts are bounded by the candidate list length, well within f64 precision.
        #[allow(clippy::cast_precision_loss)]
        let pct = poor as f64 / total_businesses as f64 * 100.0;
        (pct * 100.0).round() / 100.0
    };

    let mut ranked: Vec<&AuditedBusiness> = businesses.iter().collect();
    // Stable sort keeps discovery order among equal scores.
    ranked.sort_by(|a, b| a.score().score.total_cmp(&b.score().score));

    let top_opportunities = ranked
        .into_iter()
        .take(TOP_OPPORTUNITY_COUNT)
        .map(|b| TopOpportunity {
            name: b.name().to_string(),
            website: b.website().map(str::to_string),
            score: b.score().score,
            opportunity_level: b.score().level,
        })
        .collect();

    RunSummary {
        industry: industry.to_string(),
        location: location.to_string(),
        total_businesses,
        poor_websites_percentage,
        top_opportunities,
    }
}

/// The persisted shape of a finished (or cancelled) run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub summary: RunSummary,
    pub businesses: Vec<AuditedBusiness>,
}

impl Report {
    #[must_use]
    pub fn new(summary: RunSummary, businesses: Vec<AuditedBusiness>) -> Self {
        Self {
            generated_at: Utc::now(),
            summary,
            businesses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::{
        BusinessCandidate, ContactInfo, IssueList, ScoreResult, SocialProfiles, TechStack,
    };

    fn scored(name: &str, raw: f64) -> AuditedBusiness {
        AuditedBusiness::assemble(
            BusinessCandidate::new(name, "somewhere"),
            ContactInfo::default(),
            SocialProfiles::default(),
            TechStack::default(),
            IssueList::new(),
            ScoreResult::from_raw(raw),
        )
    }

    #[test]
    fn empty_run_has_zero_percentage() {
        let summary = build_run_summary("dentists", "Austin, TX", &[]);
        assert_eq!(summary.total_businesses, 0);
        assert!(summary.poor_websites_percentage.abs() < f64::EPSILON);
        assert!(summary.top_opportunities.is_empty());
    }

    #[test]
    fn percentage_counts_scores_below_redesign_threshold() {
        let businesses = vec![
            scored("a", 1.0),
            scored("b", 3.9),
            scored("c", 4.0),
            scored("d", 9.0),
            scored("e", 2.0),
            scored("f", 8.0),
        ];
        let summary = build_run_summary("cafes", "Denver", &businesses);
        assert_eq!(summary.total_businesses, 6);
        assert!((summary.poor_websites_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_is_rounded_to_two_decimals() {
        let businesses = vec![scored("a", 1.0), scored("b", 8.0), scored("c", 8.0)];
        let summary = build_run_summary("cafes", "Denver", &businesses);
        assert!((summary.poor_websites_percentage - 33.33).abs() < 1e-9);
    }

    #[test]
    fn top_opportunities_are_lowest_scores_with_stable_ties() {
        let businesses = vec![
            scored("a", 9.0),
            scored("b", 2.0),
            scored("c", 5.0),
            scored("d", 2.0),
            scored("e", 7.5),
            scored("f", 1.0),
            scored("g", 6.0),
        ];
        let summary = build_run_summary("gyms", "Reno", &businesses);
        let names: Vec<&str> = summary
            .top_opportunities
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["f", "b", "d", "c", "g"]);
        assert_eq!(
            summary.top_opportunities[0].opportunity_level,
            OpportunityLevel::NeedsRedesign
        );
    }

    #[test]
    fn summary_serializes_expected_field_names() {
        let summary = build_run_summary("gyms", "Reno", &[scored("a", 3.0)]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["industry"], "gyms");
        assert_eq!(json["location"], "Reno");
        assert_eq!(json["total_businesses"], 1);
        assert_eq!(json["poor_websites_percentage"], 100.0);
        assert_eq!(json["top_opportunities"][0]["name"], "a");
        assert_eq!(json["top_opportunities"][0]["score"], 3.0);
        assert_eq!(
            json["top_opportunities"][0]["opportunity_level"],
            "Needs Redesign"
        );
    }
}
