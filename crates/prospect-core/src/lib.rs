pub mod app_config;
pub mod business;
pub mod config;
pub mod report;

pub use app_config::{AppConfig, AuditConfig};
pub use business::{
    AuditedBusiness, BusinessCandidate, ContactInfo, Issue, IssueList, OpportunityLevel,
    Platform, ScoreResult, SocialProfiles, TechStack,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use report::{build_run_summary, Report, RunSummary, TopOpportunity};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
