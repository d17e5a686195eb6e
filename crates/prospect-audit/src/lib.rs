//! Website audit pipeline: fetch a business's site once, extract contact
//! channels, social profiles, and tech stack, audit technical issues, and
//! reduce everything into a score and opportunity level.

pub mod contact;
pub mod error;
pub mod fetch;
pub mod html;
pub mod issues;
pub mod pipeline;
pub mod rate_limit;
pub mod score;
pub mod social;
pub mod tech;

pub use error::{AuditError, FetchFailure, StepError, StepOutcome};
pub use fetch::{FetchResult, FetchedPage, Fetcher};
pub use pipeline::{Auditor, BusinessAudit, BusinessState, CancelSignal, ProgressEvent, RunOutcome};
pub use score::score;
