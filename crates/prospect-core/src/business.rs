//! Domain records shared by discovery, the audit pipeline, and reporting.

use std::collections::BTreeSet;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// A business as produced by discovery, before any enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCandidate {
    pub name: String,
    #[serde(alias = "location")]
    pub address: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

impl BusinessCandidate {
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            website: None,
            phone: None,
            place_id: None,
        }
    }

    #[must_use]
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub contact_form: Option<String>,
}

impl ContactInfo {
    /// `true` when no channel at all was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.email.is_none() && self.contact_form.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Instagram,
    Facebook,
    Linkedin,
    Twitter,
    Youtube,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::Linkedin,
        Platform::Twitter,
        Platform::Youtube,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Linkedin => "linkedin",
            Platform::Twitter => "twitter",
            Platform::Youtube => "youtube",
        }
    }
}

/// At most one profile URL per platform. Undetected platforms stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialProfiles {
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub youtube: Option<String>,
}

impl SocialProfiles {
    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Instagram => self.instagram.as_deref(),
            Platform::Facebook => self.facebook.as_deref(),
            Platform::Linkedin => self.linkedin.as_deref(),
            Platform::Twitter => self.twitter.as_deref(),
            Platform::Youtube => self.youtube.as_deref(),
        }
    }

    /// Records `url` for `platform` unless one is already set. Returns whether
    /// the value was stored.
    pub fn insert_first(&mut self, platform: Platform, url: String) -> bool {
        let slot = match platform {
            Platform::Instagram => &mut self.instagram,
            Platform::Facebook => &mut self.facebook,
            Platform::Linkedin => &mut self.linkedin,
            Platform::Twitter => &mut self.twitter,
            Platform::Youtube => &mut self.youtube,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(url);
        true
    }

    #[must_use]
    pub fn count(&self) -> usize {
        Platform::ALL
            .iter()
            .filter(|p| self.get(**p).is_some())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechStack {
    pub cms: Option<String>,
    pub frontend: Option<String>,
    /// Sorted and de-duplicated by construction.
    pub analytics: BTreeSet<String>,
}

/// One finding from the technical audit. `Display` gives the report text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    Unreachable,
    MissingSsl,
    MissingTitle,
    MissingMetaDescription,
    MissingH1,
    MultipleH1,
    BrokenLinks { broken: usize, checked: usize },
    MissingViewport,
    SlowResponse { millis: u64 },
    LargePage { bytes: u64 },
    ImagesMissingAlt { missing: usize, total: usize },
    MissingNavigation,
    MissingCallToAction,
    OutdatedLayout,
    /// Labels of the expected pages nothing links to, e.g. `["About", "Privacy"]`.
    MissingKeyPages { pages: Vec<String> },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::Unreachable => write!(f, "Website unreachable"),
            Issue::MissingSsl => write!(f, "Missing SSL certificate"),
            Issue::MissingTitle => write!(f, "Missing page title"),
            Issue::MissingMetaDescription => write!(f, "Missing meta description"),
            Issue::MissingH1 => write!(f, "Missing H1 heading"),
            Issue::MultipleH1 => write!(f, "Multiple H1 headings"),
            Issue::BrokenLinks { broken, checked } => {
                write!(f, "{broken} broken links detected ({broken}/{checked} checked)")
            }
            Issue::MissingViewport => write!(f, "Missing responsive viewport meta tag"),
            Issue::SlowResponse { millis } => {
                #[allow(clippy::cast_precision_loss)] // millisecond counts stay far below 2^52
                let secs = *millis as f64 / 1000.0;
                write!(f, "Slow page response ({secs:.1}s)")
            }
            Issue::LargePage { bytes } => {
                #[allow(clippy::cast_precision_loss)]
                let mb = *bytes as f64 / (1024.0 * 1024.0);
                write!(f, "Large page size ({mb:.1}MB)")
            }
            Issue::ImagesMissingAlt { missing, total } => {
                write!(f, "Images missing alt text ({missing}/{total})")
            }
            Issue::MissingNavigation => write!(f, "No clear navigation menu"),
            Issue::MissingCallToAction => write!(f, "No clear call-to-action"),
            Issue::OutdatedLayout => write!(f, "Outdated table-based layout"),
            Issue::MissingKeyPages { pages } => {
                write!(f, "Missing key pages: {}", pages.join(", "))
            }
        }
    }
}

impl Serialize for Issue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Issues in check-execution order, at most one per issue kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IssueList(Vec<Issue>);

impl IssueList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `issue` unless an issue of the same kind is already present.
    pub fn push(&mut self, issue: Issue) -> bool {
        let kind = std::mem::discriminant(&issue);
        if self.0.iter().any(|i| std::mem::discriminant(i) == kind) {
            return false;
        }
        self.0.push(issue);
        true
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Issue] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains_unreachable(&self) -> bool {
        self.0.contains(&Issue::Unreachable)
    }
}

impl From<Vec<Issue>> for IssueList {
    fn from(issues: Vec<Issue>) -> Self {
        let mut list = IssueList::new();
        for issue in issues {
            list.push(issue);
        }
        list
    }
}

impl<'a> IntoIterator for &'a IssueList {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub const HIGH_POTENTIAL_THRESHOLD: f64 = 7.0;
pub const NEEDS_REDESIGN_THRESHOLD: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityLevel {
    #[serde(rename = "High Potential")]
    HighPotential,
    #[serde(rename = "Digitally Mature")]
    DigitallyMature,
    #[serde(rename = "Needs Redesign")]
    NeedsRedesign,
}

impl OpportunityLevel {
    /// Total mapping: `>= 7.0` high potential, `[4.0, 7.0)` digitally mature,
    /// everything below (including NaN) needs a redesign.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_POTENTIAL_THRESHOLD {
            OpportunityLevel::HighPotential
        } else if score >= NEEDS_REDESIGN_THRESHOLD {
            OpportunityLevel::DigitallyMature
        } else {
            OpportunityLevel::NeedsRedesign
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OpportunityLevel::HighPotential => "High Potential",
            OpportunityLevel::DigitallyMature => "Digitally Mature",
            OpportunityLevel::NeedsRedesign => "Needs Redesign",
        }
    }
}

impl fmt::Display for OpportunityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: f64,
    pub level: OpportunityLevel,
}

impl ScoreResult {
    /// Clamps `raw` to `[0, 10]`, rounds to one decimal, and derives the label
    /// from the rounded value.
    #[must_use]
    pub fn from_raw(raw: f64) -> Self {
        let clamped = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 10.0) };
        let score = (clamped * 10.0).round() / 10.0;
        Self {
            score,
            level: OpportunityLevel::from_score(score),
        }
    }
}

/// A candidate after full enrichment. Assembled once, read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditedBusiness {
    candidate: BusinessCandidate,
    contact: ContactInfo,
    socials: SocialProfiles,
    tech_stack: TechStack,
    issues: IssueList,
    score: ScoreResult,
}

impl AuditedBusiness {
    #[must_use]
    pub fn assemble(
        candidate: BusinessCandidate,
        contact: ContactInfo,
        socials: SocialProfiles,
        tech_stack: TechStack,
        issues: IssueList,
        score: ScoreResult,
    ) -> Self {
        Self {
            candidate,
            contact,
            socials,
            tech_stack,
            issues,
            score,
        }
    }

    #[must_use]
    pub fn candidate(&self) -> &BusinessCandidate {
        &self.candidate
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.candidate.name
    }

    #[must_use]
    pub fn website(&self) -> Option<&str> {
        self.candidate.website.as_deref()
    }

    #[must_use]
    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    #[must_use]
    pub fn socials(&self) -> &SocialProfiles {
        &self.socials
    }

    #[must_use]
    pub fn tech_stack(&self) -> &TechStack {
        &self.tech_stack
    }

    #[must_use]
    pub fn issues(&self) -> &IssueList {
        &self.issues
    }

    #[must_use]
    pub fn score(&self) -> ScoreResult {
        self.score
    }
}

impl Serialize for AuditedBusiness {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("AuditedBusiness", 9)?;
        s.serialize_field("name", &self.candidate.name)?;
        s.serialize_field("website", &self.candidate.website)?;
        s.serialize_field("location", &self.candidate.address)?;
        s.serialize_field("contact", &self.contact)?;
        s.serialize_field("socials", &self.socials)?;
        s.serialize_field("tech_stack", &self.tech_stack)?;
        s.serialize_field("issues", &self.issues)?;
        s.serialize_field("website_score", &self.score.score)?;
        s.serialize_field("opportunity_level", &self.score.level)?;
        s.end()
    }
}
