use std::fmt;

/// Per-business progress through the pipeline.
///
/// `Pending → Fetching → Extracting → Scored`, or the degraded path
/// `Pending → Fetching → FetchFailed → Scored`. States never move backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessState {
    Pending,
    Fetching,
    Extracting,
    FetchFailed,
    Scored,
}

impl BusinessState {
    #[must_use]
    pub fn can_advance_to(self, next: BusinessState) -> bool {
        matches!(
            (self, next),
            (BusinessState::Pending, BusinessState::Fetching)
                | (
                    BusinessState::Fetching,
                    BusinessState::Extracting | BusinessState::FetchFailed
                )
                | (
                    BusinessState::Extracting | BusinessState::FetchFailed,
                    BusinessState::Scored
                )
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == BusinessState::Scored
    }
}

impl fmt::Display for BusinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BusinessState::Pending => "pending",
            BusinessState::Fetching => "fetching",
            BusinessState::Extracting => "extracting",
            BusinessState::FetchFailed => "fetch_failed",
            BusinessState::Scored => "scored",
        };
        f.write_str(label)
    }
}

/// Tracks one business's state and logs each transition.
#[derive(Debug)]
pub(crate) struct StateTracker<'a> {
    business: &'a str,
    state: BusinessState,
}

impl<'a> StateTracker<'a> {
    pub(crate) fn new(business: &'a str) -> Self {
        Self {
            business,
            state: BusinessState::Pending,
        }
    }

    pub(crate) fn advance(&mut self, next: BusinessState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        tracing::debug!(
            business = self.business,
            from = %self.state,
            to = %next,
            "business state transition"
        );
        self.state = next;
    }

    pub(crate) fn state(&self) -> BusinessState {
        self.state
    }
}
