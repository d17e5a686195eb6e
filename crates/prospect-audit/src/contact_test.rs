use super::*;

fn page() -> Url {
    Url::parse("https://acme.test/").unwrap()
}

#[test]
fn tel_and_mailto_links_win() {
    let html = r#"<footer>
        <a href="tel:+14155551234">Call us</a>
        <a href="mailto:info@x.com">Email</a>
        <p>Other office: (212) 555-9876, sales@acme.test</p>
    </footer>"#;
    let contact = extract(html, &page());
    assert_eq!(contact.phone.as_deref(), Some("+14155551234"));
    assert_eq!(contact.email.as_deref(), Some("info@x.com"));
}

#[test]
fn mailto_query_and_case_are_handled() {
    let html = r#"<a href="MAILTO:Hello@Acme.test?subject=Quote%20request">Write</a>"#;
    let contact = extract(html, &page());
    assert_eq!(contact.email.as_deref(), Some("Hello@Acme.test"));
}

#[test]
fn percent_encoded_tel_link() {
    let html = r#"<a href="tel:%2B1%20415%20555%201234">Call</a>"#;
    assert_eq!(
        extract(html, &page()).phone.as_deref(),
        Some("+14155551234")
    );
}

#[test]
fn malformed_escape_in_tel_link_is_left_alone() {
    // "%+4" is not a valid escape and must not decode to a control byte.
    let html = r#"<a href="tel:%+14155551234">Call</a>"#;
    assert_eq!(
        extract(html, &page()).phone.as_deref(),
        Some("+14155551234")
    );
}

#[test]
fn percent_encoded_mailto_link() {
    let html = r#"<a href="mailto:hello%40acme.test">Write</a>"#;
    assert_eq!(
        extract(html, &page()).email.as_deref(),
        Some("hello@acme.test")
    );
}

#[test]
fn us_formats_in_visible_text() {
    for text in [
        "Call (415) 555-1234 today",
        "Phone: 415-555-1234",
        "415.555.1234",
        "1-415-555-1234",
    ] {
        let html = format!("<p>{text}</p>");
        assert_eq!(
            extract(&html, &page()).phone.as_deref(),
            Some("+14155551234"),
            "failed for {text}"
        );
    }
}

#[test]
fn international_format_in_visible_text() {
    let html = "<p>London office: +44 20 7946 0958</p>";
    assert_eq!(
        extract(html, &page()).phone.as_deref(),
        Some("+442079460958")
    );
}

#[test]
fn bare_digit_runs_need_a_phone_label() {
    let unlabeled = "<p>Order #4155551234 shipped</p>";
    assert!(extract(unlabeled, &page()).phone.is_none());

    let labeled = "<p>Tel: 4155551234</p>";
    assert_eq!(
        extract(labeled, &page()).phone.as_deref(),
        Some("+14155551234")
    );
}

#[test]
fn numbers_inside_longer_digit_runs_are_rejected() {
    let html = "<p>SKU 98415-555-1234</p>";
    assert!(extract(html, &page()).phone.is_none());
}

#[test]
fn phone_like_text_in_scripts_is_ignored() {
    let html = "<script>var id = '415-555-1234';</script><p>Welcome</p>";
    assert!(extract(html, &page()).phone.is_none());
}

#[test]
fn normalize_phone_rules() {
    assert_eq!(normalize_phone("+1 (415) 555-1234").as_deref(), Some("+14155551234"));
    assert_eq!(normalize_phone("0044 20 7946 0958").as_deref(), Some("+442079460958"));
    assert_eq!(normalize_phone("415 555 1234").as_deref(), Some("+14155551234"));
    assert_eq!(normalize_phone("14155551234").as_deref(), Some("+14155551234"));
    assert!(normalize_phone("123 456 7890").is_none());
    assert!(normalize_phone("555-1234").is_none());
    assert!(normalize_phone("+12").is_none());
}

#[test]
fn vendor_and_image_addresses_are_skipped() {
    let html = "<p>logo@2x.png errors@sentry.io user@example.com real@acme.test</p>";
    assert_eq!(extract(html, &page()).email.as_deref(), Some("real@acme.test"));
}

#[test]
fn contact_link_by_path_or_text() {
    let by_path = r#"<nav><a href="/about">About</a><a href="/contact-us#form">Reach us</a></nav>"#;
    assert_eq!(
        extract(by_path, &page()).contact_form.as_deref(),
        Some("https://acme.test/contact-us")
    );

    let by_text = r#"<a href="/hello">Get in touch</a>"#;
    assert_eq!(
        extract(by_text, &page()).contact_form.as_deref(),
        Some("https://acme.test/hello")
    );
}

#[test]
fn offsite_and_mailto_contact_links_are_not_forms() {
    let html = r#"<a href="mailto:contact@acme.test">Contact</a>
        <a href="https://other.test/contact">Contact partner</a>"#;
    assert!(extract(html, &page()).contact_form.is_none());
}

#[test]
fn message_form_on_page_counts_as_contact_form() {
    let html =
        r#"<form action="/submit"><input type="email" name="e"><textarea></textarea></form>"#;
    let url = Url::parse("https://acme.test/visit").unwrap();
    assert_eq!(
        extract(html, &url).contact_form.as_deref(),
        Some("https://acme.test/visit")
    );
    assert!(page_has_contact_form(html));
}

#[test]
fn search_form_is_not_a_contact_form() {
    let html = r#"<form action="/search"><input type="text" name="q"></form>"#;
    assert!(extract(html, &page()).contact_form.is_none());
    assert!(!page_has_contact_form(html));
}

#[test]
fn nothing_found_is_empty_not_error() {
    let contact = extract("<html><body><p>Welcome</p></body></html>", &page());
    assert!(contact.is_empty());
}

#[test]
fn guessed_contact_page_is_site_root_relative() {
    let url = Url::parse("https://acme.test/shop/items?x=1").unwrap();
    assert_eq!(
        guess_contact_page(&url).unwrap().as_str(),
        "https://acme.test/contact"
    );
}
