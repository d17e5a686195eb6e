//! End-to-end pipeline tests against wiremock-served sites.

use std::time::Duration;

use prospect_audit::{Auditor, CancelSignal, ProgressEvent};
use prospect_core::{AuditConfig, BusinessCandidate, OpportunityLevel};
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BAKERY_HTML: &str = r#"<!doctype html><html><head>
<title>Acme Bakery</title>
<meta name="description" content="Fresh bread daily">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="generator" content="WordPress 6.5">
</head><body>
<nav><a href="/a/menu">Menu</a> <a href="/a/about">About</a> <a href="/contact">Contact us</a></nav>
<h1>Acme Bakery</h1>
<a href="tel:+14155551234">Call us</a>
<a href="mailto:info@x.com">Email us</a>
<a href="https://www.facebook.com/sharer/sharer.php?u=https://acme.test">Share</a>
<a href="https://facebook.com/acme">Facebook</a>
<a href="/a/old-specials">Specials</a>
<a href="/a/privacy">Privacy</a>
</body></html>"#;

const CAFE_HTML: &str = r#"<!doctype html><html><head><title>Bean Cafe</title></head>
<body><nav>Bean Cafe</nav><h1>Bean Cafe</h1>
<p>Call (415) 555-0100. Learn more about our beans.</p></body></html>"#;

const QUIET_HTML: &str = r#"<!doctype html><html><head><title>Corner Deli</title></head>
<body><nav>Corner Deli</nav><h1>Corner Deli</h1><p>Sandwiches made to order.</p></body></html>"#;

const CONTACT_HTML: &str = r#"<!doctype html><html><body>
<p>Write to hello@bean.test</p>
<form action="/send"><textarea name="message"></textarea></form>
</body></html>"#;

fn config(workers: usize) -> AuditConfig {
    AuditConfig {
        request_timeout: Duration::from_secs(5),
        link_check_timeout: Duration::from_secs(2),
        courtesy_delay: Duration::ZERO,
        retry_backoff: Duration::ZERO,
        max_concurrent_businesses: workers,
        ..AuditConfig::default()
    }
}

async fn mock_sites() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BAKERY_HTML))
        .mount(&server)
        .await;
    for page in ["/a/menu", "/a/about", "/a/privacy"] {
        Mock::given(method("HEAD"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
    }
    // /a/old-specials is unmocked and answers 404.
    Mock::given(method("GET"))
        .and(path("/b/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CAFE_HTML))
        .mount(&server)
        .await;
    Mock::given(path("/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CONTACT_HTML))
        .mount(&server)
        .await;
    server
}

fn candidates(server: &MockServer) -> Vec<BusinessCandidate> {
    vec![
        BusinessCandidate::new("Acme Bakery", "1 Main St")
            .with_website(format!("{}/a/", server.uri())),
        BusinessCandidate::new("Bean Cafe", "2 Main St")
            .with_website(format!("{}/b/", server.uri())),
        BusinessCandidate::new("No Site Deli", "3 Main St").with_phone("(415) 555-0199"),
        BusinessCandidate::new("Dead Site Diner", "4 Main St").with_website("http://127.0.0.1:1/"),
    ]
}

#[tokio::test]
async fn happy_path_enriches_and_scores() {
    let server = mock_sites().await;
    let auditor = Auditor::new(config(2)).unwrap();
    let candidate = candidates(&server).remove(0);

    let audit = auditor.audit_business(candidate).await;
    let json = serde_json::to_value(&audit.business).unwrap();

    assert_eq!(json["name"], "Acme Bakery");
    assert_eq!(json["location"], "1 Main St");
    assert_eq!(json["contact"]["phone"], "+14155551234");
    assert_eq!(json["contact"]["email"], "info@x.com");
    assert_eq!(
        json["contact"]["contact_form"],
        format!("{}/contact", server.uri())
    );
    assert_eq!(json["socials"]["facebook"], "https://facebook.com/acme");
    assert!(json["socials"]["instagram"].is_null());
    assert_eq!(json["tech_stack"]["cms"], "WordPress");
    assert_eq!(
        json["issues"],
        serde_json::json!([
            "Missing SSL certificate",
            "1 broken links detected (1/5 checked)"
        ])
    );
    // 10 - 2.0 (ssl) - 1.0 (links) + 0.25 (modern cms)
    assert!((audit.business.score().score - 7.3).abs() < 1e-9);
    assert_eq!(json["opportunity_level"], "High Potential");
}

#[tokio::test]
async fn missing_contact_form_falls_back_to_contact_page() {
    let server = mock_sites().await;
    let auditor = Auditor::new(config(2)).unwrap();
    let candidate = candidates(&server).remove(1);

    let audit = auditor.audit_business(candidate).await;
    let contact = audit.business.contact();

    assert_eq!(contact.phone.as_deref(), Some("+14155550100"));
    assert_eq!(contact.email.as_deref(), Some("hello@bean.test"));
    assert_eq!(
        contact.contact_form.as_deref(),
        Some(format!("{}/contact", server.uri()).as_str())
    );
}

#[tokio::test]
async fn failed_contact_page_is_a_captured_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CAFE_HTML))
        .mount(&server)
        .await;

    let auditor = Auditor::new(config(1)).unwrap();
    let audit = auditor
        .audit_business(BusinessCandidate::new("Bean Cafe", "2 Main St").with_website(server.uri()))
        .await;

    assert!(audit.business.contact().contact_form.is_none());
    assert!(audit
        .errors
        .iter()
        .any(|e| matches!(e, prospect_audit::StepError::NotFound(_))));
}

#[tokio::test]
async fn reachable_site_without_phone_uses_discovery_phone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(QUIET_HTML))
        .mount(&server)
        .await;

    let auditor = Auditor::new(config(1)).unwrap();
    let candidate = BusinessCandidate::new("Corner Deli", "3 Main St")
        .with_website(server.uri())
        .with_phone("(415) 555-0199");
    let audit = auditor.audit_business(candidate).await;

    assert_eq!(audit.business.contact().phone.as_deref(), Some("+14155550199"));
    assert!(audit.business.contact().email.is_none());
}

#[tokio::test]
async fn unreachable_site_is_scored_with_only_unreachable_issue() {
    let auditor = Auditor::new(config(1)).unwrap();
    let candidate = BusinessCandidate::new("Dead Site Diner", "4 Main St")
        .with_website("http://127.0.0.1:1/")
        .with_phone("(415) 555-0199");

    let audit = auditor.audit_business(candidate).await;
    let json = serde_json::to_value(&audit.business).unwrap();

    assert_eq!(json["issues"], serde_json::json!(["Website unreachable"]));
    assert!(json["contact"]["phone"].is_null());
    assert!((audit.business.score().score - 1.0).abs() < 1e-9);
    assert_eq!(audit.business.score().level, OpportunityLevel::NeedsRedesign);
    assert!(!audit.errors.is_empty());
}

#[tokio::test]
async fn businesses_without_websites_still_count() {
    let server = mock_sites().await;
    let auditor = Auditor::new(config(4)).unwrap();

    let outcome = auditor
        .run("bakery", "Springfield", candidates(&server), &CancelSignal::new(), None)
        .await;
    let summary = &outcome.report.summary;

    assert!(!outcome.cancelled);
    assert_eq!(summary.total_businesses, 4);
    assert_eq!(outcome.report.businesses.len(), 4);
    let no_site = &outcome.report.businesses[2];
    assert_eq!(no_site.name(), "No Site Deli");
    assert_eq!(
        no_site.issues().as_slice(),
        &[prospect_core::Issue::Unreachable]
    );
    // No Site Deli and Dead Site Diner score 1.0; Bean Cafe (4.6) lands in the middle band.
    assert!((summary.poor_websites_percentage - 50.0).abs() < 1e-9);
    assert_eq!(summary.top_opportunities[0].name, "No Site Deli");
    assert_eq!(summary.top_opportunities[1].name, "Dead Site Diner");
}

#[tokio::test]
async fn sequential_and_concurrent_runs_agree() {
    let server = mock_sites().await;

    let sequential = Auditor::new(config(1))
        .unwrap()
        .run("bakery", "Springfield", candidates(&server), &CancelSignal::new(), None)
        .await;
    let concurrent = Auditor::new(config(4))
        .unwrap()
        .run("bakery", "Springfield", candidates(&server), &CancelSignal::new(), None)
        .await;

    assert_eq!(
        serde_json::to_value(&sequential.report.businesses).unwrap(),
        serde_json::to_value(&concurrent.report.businesses).unwrap()
    );
    assert_eq!(sequential.report.summary, concurrent.report.summary);
}

#[tokio::test]
async fn progress_reports_each_business_then_summary() {
    let server = mock_sites().await;
    let auditor = Auditor::new(config(3)).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let outcome = auditor
        .run("bakery", "Springfield", candidates(&server), &CancelSignal::new(), Some(&tx))
        .await;
    drop(tx);

    let mut indices = Vec::new();
    let mut completed_counts = Vec::new();
    let mut finished = None;
    while let Some(event) = rx.recv().await {
        match event {
            ProgressEvent::BusinessAudited {
                index,
                completed,
                total,
                ..
            } => {
                assert_eq!(total, 4);
                assert!(finished.is_none(), "business event after summary");
                indices.push(index);
                completed_counts.push(completed);
            }
            ProgressEvent::Finished(summary) => finished = Some(summary),
        }
    }

    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert_eq!(completed_counts, vec![1, 2, 3, 4]);
    assert_eq!(finished, Some(outcome.report.summary));
}

#[tokio::test]
async fn cancelled_before_start_reports_nothing() {
    let server = mock_sites().await;
    let auditor = Auditor::new(config(2)).unwrap();
    let cancel = CancelSignal::new();
    cancel.cancel();

    let outcome = auditor
        .run("bakery", "Springfield", candidates(&server), &cancel, None)
        .await;

    assert!(outcome.cancelled);
    assert!(outcome.report.businesses.is_empty());
    assert_eq!(outcome.report.summary.total_businesses, 0);
    assert!(outcome.report.summary.poor_websites_percentage.abs() < f64::EPSILON);
}

#[tokio::test]
async fn cancellation_mid_run_keeps_partial_results() {
    let auditor = Auditor::new(config(1)).unwrap();
    let candidates: Vec<BusinessCandidate> = (0..6)
        .map(|i| {
            BusinessCandidate::new(format!("Dead {i}"), "Nowhere")
                .with_website("http://127.0.0.1:1/")
        })
        .collect();
    let cancel = CancelSignal::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let (outcome, ()) = tokio::join!(
        auditor.run("diner", "Nowhere", candidates, &cancel, Some(&tx)),
        async {
            if let Some(ProgressEvent::BusinessAudited { .. }) = rx.recv().await {
                cancel.cancel();
            }
        }
    );

    assert!(outcome.cancelled);
    let done = outcome.report.businesses.len();
    assert!((1..6).contains(&done), "completed {done}");
    assert_eq!(outcome.report.summary.total_businesses, done);
    assert!(outcome
        .report
        .businesses
        .iter()
        .all(|b| b.score().level == OpportunityLevel::NeedsRedesign));
}
