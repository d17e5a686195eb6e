//! Paged, de-duplicated business discovery on top of [`PlacesClient`].

use std::collections::HashSet;
use std::time::Duration;

use prospect_core::BusinessCandidate;

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::types::PlaceSummary;

/// Text search returns at most this many results per page.
const RESULTS_PER_PAGE: usize = 20;

#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    pub industry: String,
    pub location: String,
    pub max_results: usize,
    /// Drop places without a website after the details lookup.
    pub website_required: bool,
    /// Wait before each follow-up page; the API rejects tokens used too early.
    pub page_delay: Duration,
}

impl DiscoveryRequest {
    #[must_use]
    pub fn query(&self) -> String {
        format!("{} in {}", self.industry, self.location)
    }
}

/// How many result pages to walk for `max_results`, with headroom for
/// duplicates and places dropped for lacking a website.
#[must_use]
pub fn page_cap(max_results: usize) -> usize {
    max_results.div_ceil(RESULTS_PER_PAGE) * 3 / 2 + 3
}

impl PlacesClient {
    /// Discovers up to `request.max_results` unique businesses.
    ///
    /// # Errors
    ///
    /// Returns the first page's [`PlacesError`]. Failures on follow-up pages
    /// stop paging and keep what was collected; a failed details lookup only
    /// leaves that candidate without a website.
    pub async fn discover(
        &self,
        request: &DiscoveryRequest,
    ) -> Result<Vec<BusinessCandidate>, PlacesError> {
        let query = request.query();
        let max_pages = page_cap(request.max_results);
        let mut seen: HashSet<String> = HashSet::new();
        let mut businesses: Vec<BusinessCandidate> = Vec::new();

        tracing::info!(query = %query, max_results = request.max_results, "starting discovery");
        let mut page = self.text_search(&query, None).await?;
        let mut pages_fetched = 1usize;

        loop {
            for place in page.results {
                if businesses.len() >= request.max_results {
                    break;
                }
                if !seen.insert(dedupe_key(&place)) {
                    tracing::debug!(name = ?place.name, "skipping duplicate place");
                    continue;
                }
                let candidate = self.enrich(place).await;
                if request.website_required && candidate.website.is_none() {
                    tracing::debug!(name = %candidate.name, "skipping place without website");
                    continue;
                }
                businesses.push(candidate);
            }

            let Some(token) = page.next_page_token else {
                break;
            };
            if businesses.len() >= request.max_results || pages_fetched >= max_pages {
                break;
            }

            tokio::time::sleep(request.page_delay).await;
            page = match self.text_search(&query, Some(&token)).await {
                Ok(next) => next,
                Err(e) => {
                    tracing::warn!(error = %e, page = pages_fetched + 1, "stopping pagination");
                    break;
                }
            };
            pages_fetched += 1;
        }

        tracing::info!(
            found = businesses.len(),
            pages = pages_fetched,
            "discovery complete"
        );
        Ok(businesses)
    }

    /// Builds a candidate from a search hit plus its details lookup.
    async fn enrich(&self, place: PlaceSummary) -> BusinessCandidate {
        let name = place.name.unwrap_or_else(|| "Unknown".to_string());
        let address = place
            .formatted_address
            .unwrap_or_else(|| "Unknown".to_string());
        let mut candidate = BusinessCandidate::new(name, address);

        let Some(place_id) = place.place_id else {
            return candidate;
        };
        match self.place_details(&place_id).await {
            Ok(details) => {
                candidate.website = details.website.filter(|w| !w.trim().is_empty());
                candidate.phone = details.international_phone_number;
            }
            Err(e) => {
                tracing::warn!(
                    business = %candidate.name,
                    error = %e,
                    "place details lookup failed"
                );
            }
        }
        candidate.place_id = Some(place_id);
        candidate
    }
}

/// `place_id` when present, otherwise lower-cased `name|address`.
fn dedupe_key(place: &PlaceSummary) -> String {
    match &place.place_id {
        Some(id) => format!("id:{id}"),
        None => format!(
            "{}|{}",
            place.name.as_deref().unwrap_or_default().trim().to_lowercase(),
            place
                .formatted_address
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_lowercase()
        ),
    }
}
