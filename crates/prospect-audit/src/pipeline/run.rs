//! Run-level worker pool, progress notifications, and cancellation.

use std::future;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;

use prospect_core::{build_run_summary, AuditedBusiness, BusinessCandidate, Report, RunSummary};

use super::Auditor;

/// Run-level cancellation flag. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops new businesses from starting. In-flight audits still finish.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// One business finished. `index` is its position in the candidate list;
    /// `completed` counts businesses finished so far, in completion order.
    BusinessAudited {
        index: usize,
        completed: usize,
        total: usize,
        business: AuditedBusiness,
    },
    /// Sent once, after the last business.
    Finished(RunSummary),
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: Report,
    /// `true` when cancellation left some candidates unprocessed.
    pub cancelled: bool,
}

impl Auditor {
    /// Audits every candidate through a worker pool of
    /// `max_concurrent_businesses`, then builds the summary and report.
    ///
    /// Results are owned by this single aggregator loop; businesses appear in
    /// the report in candidate order regardless of completion order. After
    /// `cancel` fires no new business starts, and the report covers only the
    /// businesses that completed.
    pub async fn run(
        &self,
        industry: &str,
        location: &str,
        candidates: Vec<BusinessCandidate>,
        cancel: &CancelSignal,
        progress: Option<&mpsc::UnboundedSender<ProgressEvent>>,
    ) -> RunOutcome {
        let total = candidates.len();
        let workers = self.config.max_concurrent_businesses.max(1);
        tracing::info!(industry, location, total, workers, "audit run started");

        let mut completed: Vec<(usize, AuditedBusiness)> = Vec::with_capacity(total);
        let mut results = pin!(stream::iter(candidates.into_iter().enumerate())
            .take_while(|_| future::ready(!cancel.is_cancelled()))
            .map(|(index, candidate)| async move {
                (index, self.audit_business(candidate).await.business)
            })
            .buffer_unordered(workers));

        while let Some((index, business)) = results.next().await {
            if let Some(tx) = progress {
                // A dropped receiver only means nobody is watching.
                let _ = tx.send(ProgressEvent::BusinessAudited {
                    index,
                    completed: completed.len() + 1,
                    total,
                    business: business.clone(),
                });
            }
            completed.push((index, business));
        }

        let cancelled = completed.len() < total;
        if cancelled {
            tracing::warn!(
                completed = completed.len(),
                total,
                "audit run cancelled, reporting partial results"
            );
        }

        completed.sort_by_key(|(index, _)| *index);
        let businesses: Vec<AuditedBusiness> = completed.into_iter().map(|(_, b)| b).collect();
        let summary = build_run_summary(industry, location, &businesses);
        tracing::info!(
            total_businesses = summary.total_businesses,
            poor_websites_percentage = summary.poor_websites_percentage,
            "audit run finished"
        );

        if let Some(tx) = progress {
            let _ = tx.send(ProgressEvent::Finished(summary.clone()));
        }

        RunOutcome {
            report: Report::new(summary, businesses),
            cancelled,
        }
    }
}
