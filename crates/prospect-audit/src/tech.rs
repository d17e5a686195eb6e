//! Tech stack fingerprinting against ordered signature tables.
//!
//! CMS and frontend use first-match-wins over their table order; analytics is
//! additive. Detection reads only the body and headers, so it is deterministic
//! for a given page.

use reqwest::header::HeaderMap;

use prospect_core::TechStack;

use crate::html;

/// One piece of evidence for a technology.
#[derive(Debug, Clone, Copy)]
enum Signal {
    /// Substring of `<meta name="generator">` content.
    Generator(&'static str),
    /// Substring of the lower-cased document.
    Html(&'static str),
    /// Header present, with a value containing the substring (empty = any value).
    Header(&'static str, &'static str),
}

#[derive(Debug)]
struct TechRule {
    label: &'static str,
    /// Counts toward the scorer's modern-stack bonus.
    modern: bool,
    signals: &'static [Signal],
}

const CMS_RULES: &[TechRule] = &[
    TechRule {
        label: "WordPress",
        modern: true,
        signals: &[
            Signal::Generator("wordpress"),
            Signal::Html("/wp-content/"),
            Signal::Html("/wp-includes/"),
            Signal::Header("link", "wp-json"),
        ],
    },
    TechRule {
        label: "Shopify",
        modern: true,
        signals: &[
            Signal::Html("cdn.shopify.com"),
            Signal::Html("shopify.theme"),
            Signal::Header("x-shopid", ""),
            Signal::Header("x-shopify-stage", ""),
        ],
    },
    TechRule {
        label: "Wix",
        modern: true,
        signals: &[
            Signal::Generator("wix.com"),
            Signal::Html("static.wixstatic.com"),
            Signal::Header("x-wix-request-id", ""),
        ],
    },
    TechRule {
        label: "Squarespace",
        modern: true,
        signals: &[
            Signal::Generator("squarespace"),
            Signal::Html("static1.squarespace.com"),
            Signal::Html("squarespace-cdn.com"),
        ],
    },
    TechRule {
        label: "Webflow",
        modern: true,
        signals: &[
            Signal::Generator("webflow"),
            Signal::Html("data-wf-page"),
            Signal::Html("assets.website-files.com"),
        ],
    },
    TechRule {
        label: "Drupal",
        modern: true,
        signals: &[
            Signal::Generator("drupal"),
            Signal::Html("drupal-settings-json"),
            Signal::Html("/sites/default/files/"),
            Signal::Header("x-generator", "drupal"),
            Signal::Header("x-drupal-cache", ""),
        ],
    },
    TechRule {
        label: "Joomla",
        modern: false,
        signals: &[
            Signal::Generator("joomla"),
            Signal::Html("/media/jui/"),
            Signal::Html("/components/com_"),
        ],
    },
    TechRule {
        label: "Ghost",
        modern: true,
        signals: &[Signal::Generator("ghost"), Signal::Html("/ghost/api/")],
    },
    TechRule {
        label: "GoDaddy Website Builder",
        modern: false,
        signals: &[
            Signal::Generator("go daddy"),
            Signal::Generator("godaddy"),
            Signal::Html("img1.wsimg.com"),
        ],
    },
    TechRule {
        label: "Weebly",
        modern: false,
        signals: &[Signal::Html("editmysite.com"), Signal::Html("weebly.com")],
    },
];

const FRONTEND_RULES: &[TechRule] = &[
    TechRule {
        label: "Next.js",
        modern: true,
        signals: &[
            Signal::Html("/_next/static/"),
            Signal::Html("__next_data__"),
            Signal::Header("x-powered-by", "next.js"),
        ],
    },
    TechRule {
        label: "Nuxt",
        modern: true,
        signals: &[
            Signal::Html("/_nuxt/"),
            Signal::Html("window.__nuxt__"),
        ],
    },
    TechRule {
        label: "Gatsby",
        modern: true,
        signals: &[
            Signal::Generator("gatsby"),
            Signal::Html("id=\"___gatsby\""),
        ],
    },
    TechRule {
        label: "Angular",
        modern: true,
        signals: &[Signal::Html("ng-version="), Signal::Html("ng-app")],
    },
    TechRule {
        label: "React",
        modern: true,
        signals: &[
            Signal::Html("data-reactroot"),
            Signal::Html("react-dom"),
            Signal::Html("react.production.min.js"),
        ],
    },
    TechRule {
        label: "Vue",
        modern: true,
        signals: &[
            Signal::Html("data-v-app"),
            Signal::Html("vue.global"),
            Signal::Html("vue.min.js"),
            Signal::Html("vue.runtime"),
        ],
    },
    TechRule {
        label: "Svelte",
        modern: true,
        signals: &[Signal::Html("svelte-"), Signal::Html("__sveltekit")],
    },
    TechRule {
        label: "jQuery",
        modern: false,
        signals: &[
            Signal::Html("jquery.min.js"),
            Signal::Html("jquery.js"),
            Signal::Html("/jquery-"),
        ],
    },
    TechRule {
        label: "Bootstrap",
        modern: false,
        signals: &[Signal::Html("bootstrap.min.css"), Signal::Html("bootstrap.min.js")],
    },
    TechRule {
        label: "Tailwind CSS",
        modern: true,
        signals: &[Signal::Html("tailwindcss"), Signal::Html("cdn.tailwindcss.com")],
    },
];

const ANALYTICS_RULES: &[TechRule] = &[
    TechRule {
        label: "Google Analytics",
        modern: false,
        signals: &[
            Signal::Html("google-analytics.com/analytics.js"),
            Signal::Html("googletagmanager.com/gtag/js"),
            Signal::Html("gtag('config'"),
            Signal::Html("ga('create'"),
        ],
    },
    TechRule {
        label: "Google Tag Manager",
        modern: false,
        signals: &[
            Signal::Html("googletagmanager.com/gtm.js"),
            Signal::Html("googletagmanager.com/ns.html"),
        ],
    },
    TechRule {
        label: "Facebook Pixel",
        modern: false,
        signals: &[
            Signal::Html("connect.facebook.net/en_us/fbevents.js"),
            Signal::Html("fbq('init'"),
        ],
    },
    TechRule {
        label: "Hotjar",
        modern: false,
        signals: &[Signal::Html("static.hotjar.com"), Signal::Html("hjsettings")],
    },
    TechRule {
        label: "Mixpanel",
        modern: false,
        signals: &[Signal::Html("cdn.mxpnl.com"), Signal::Html("mixpanel.init")],
    },
    TechRule {
        label: "Microsoft Clarity",
        modern: false,
        signals: &[Signal::Html("clarity.ms/tag")],
    },
    TechRule {
        label: "Plausible",
        modern: false,
        signals: &[Signal::Html("plausible.io/js")],
    },
    TechRule {
        label: "Segment",
        modern: false,
        signals: &[Signal::Html("cdn.segment.com/analytics.js")],
    },
    TechRule {
        label: "HubSpot",
        modern: false,
        signals: &[Signal::Html("js.hs-scripts.com"), Signal::Html("js.hs-analytics.net")],
    },
];

/// Page facts every rule is matched against, computed once.
struct Evidence<'a> {
    html: String,
    generator: Option<String>,
    headers: &'a HeaderMap,
}

impl Evidence<'_> {
    fn matches(&self, signal: Signal) -> bool {
        match signal {
            Signal::Generator(needle) => self
                .generator
                .as_deref()
                .is_some_and(|g| g.contains(needle)),
            Signal::Html(needle) => self.html.contains(needle),
            Signal::Header(name, needle) => self
                .headers
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .any(|v| v.to_ascii_lowercase().contains(needle)),
        }
    }

    fn first_match(&self, rules: &[TechRule]) -> Option<&'static str> {
        rules
            .iter()
            .find(|r| r.signals.iter().any(|s| self.matches(*s)))
            .map(|r| r.label)
    }
}

/// Fingerprints the CMS, frontend framework, and analytics providers.
#[must_use]
pub fn detect(html_body: &str, headers: &HeaderMap) -> TechStack {
    let evidence = Evidence {
        html: html_body.to_ascii_lowercase(),
        generator: html::meta_content(html_body, "name", "generator")
            .map(|g| g.to_ascii_lowercase()),
        headers,
    };

    TechStack {
        cms: evidence.first_match(CMS_RULES).map(str::to_string),
        frontend: evidence.first_match(FRONTEND_RULES).map(str::to_string),
        analytics: ANALYTICS_RULES
            .iter()
            .filter(|r| r.signals.iter().any(|s| evidence.matches(*s)))
            .map(|r| r.label.to_string())
            .collect(),
    }
}

/// Whether a detected CMS or frontend label counts as a modern stack.
#[must_use]
pub fn is_modern(label: &str) -> bool {
    CMS_RULES
        .iter()
        .chain(FRONTEND_RULES)
        .any(|r| r.label == label && r.modern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn wordpress_with_jquery_and_two_analytics() {
        let html = r#"<html><head>
            <meta name="generator" content="WordPress 6.4.2">
            <script src="/wp-includes/js/jquery/jquery.min.js"></script>
            <script async src="https://www.googletagmanager.com/gtag/js?id=G-1"></script>
            <script src="https://static.hotjar.com/c/hotjar-1.js"></script>
            </head></html>"#;
        let stack = detect(html, &HeaderMap::new());
        assert_eq!(stack.cms.as_deref(), Some("WordPress"));
        assert_eq!(stack.frontend.as_deref(), Some("jQuery"));
        assert_eq!(
            stack.analytics.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Google Analytics", "Hotjar"]
        );
    }

    #[test]
    fn header_fingerprints() {
        let mut headers = HeaderMap::new();
        headers.insert("x-shopid", HeaderValue::from_static("12345"));
        headers.insert("x-powered-by", HeaderValue::from_static("Next.js"));
        let stack = detect("<html><body>shop</body></html>", &headers);
        assert_eq!(stack.cms.as_deref(), Some("Shopify"));
        assert_eq!(stack.frontend.as_deref(), Some("Next.js"));
        assert!(stack.analytics.is_empty());
    }

    #[test]
    fn first_rule_in_table_order_wins() {
        // Next.js pages also ship react-dom; the more specific rule is listed first.
        let html = r#"<script src="/_next/static/chunks/react-dom.js"></script>"#;
        assert_eq!(detect(html, &HeaderMap::new()).frontend.as_deref(), Some("Next.js"));
    }

    #[test]
    fn no_match_leaves_fields_empty() {
        let stack = detect("<html><body><p>Hand-written page</p></body></html>", &HeaderMap::new());
        assert_eq!(stack, TechStack::default());
    }

    #[test]
    fn detection_is_deterministic() {
        let html = r#"<meta name="generator" content="Wix.com Website Builder">
            <script src="https://cdn.segment.com/analytics.js/v1/x/analytics.min.js"></script>
            <script>fbq('init', '123');</script>"#;
        let first = detect(html, &HeaderMap::new());
        let second = detect(html, &HeaderMap::new());
        assert_eq!(first, second);
        assert_eq!(first.cms.as_deref(), Some("Wix"));
        assert_eq!(first.analytics.len(), 2);
    }

    #[test]
    fn modern_flags() {
        assert!(is_modern("Next.js"));
        assert!(is_modern("Shopify"));
        assert!(!is_modern("jQuery"));
        assert!(!is_modern("Bootstrap"));
        assert!(!is_modern("Unknown CMS"));
    }
}
