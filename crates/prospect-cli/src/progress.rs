use prospect_audit::ProgressEvent;
use tokio::sync::mpsc;

/// Prints one stderr line per audited business, then the run totals.
pub(crate) async fn print_events(mut rx: mpsc::UnboundedReceiver<ProgressEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            ProgressEvent::BusinessAudited {
                completed,
                total,
                business,
                ..
            } => {
                let score = business.score();
                eprintln!(
                    "[{completed}/{total}] {} {:.1} ({})",
                    business.name(),
                    score.score,
                    score.level.as_str()
                );
            }
            ProgressEvent::Finished(summary) => {
                eprintln!(
                    "audited {} businesses; {:.2}% need a redesign",
                    summary.total_businesses, summary.poor_websites_percentage
                );
            }
        }
    }
}
