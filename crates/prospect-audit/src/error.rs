use thiserror::Error;

/// Why a URL could not be retrieved. Every transport error is mapped onto one
/// of these variants before it leaves the fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("response exceeded {limit} bytes")]
    TooLarge { limit: u64 },
}

impl FetchFailure {
    /// Transient conditions worth a second attempt: timeouts, connection
    /// failures, 429 and 5xx. TLS, size, and 4xx failures repeat identically.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            FetchFailure::Timeout | FetchFailure::Connection(_) => true,
            FetchFailure::Status(status) => *status == 429 || *status >= 500,
            FetchFailure::Tls(_) | FetchFailure::TooLarge { .. } => false,
        }
    }
}

/// Non-fatal failure captured at an extraction step boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("network failure: {0}")]
    Network(#[from] FetchFailure),

    #[error("parse failure: {0}")]
    Parse(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// The result of one extraction step: always a usable value (the empty default
/// when the step failed) plus whatever non-fatal errors were swallowed.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome<T> {
    pub value: T,
    pub errors: Vec<StepError>,
}

impl<T> StepOutcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: StepError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<T: Default> StepOutcome<T> {
    pub fn failed(error: StepError) -> Self {
        Self {
            value: T::default(),
            errors: vec![error],
        }
    }
}

/// Errors that prevent the pipeline from being constructed at all.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}
