//! HTTP client for the Google Places web service.
//!
//! Wraps `reqwest` with API key management and typed response
//! deserialization. Every endpoint checks the `status` field of the JSON
//! envelope; anything but `OK`/`ZERO_RESULTS` surfaces as [`PlacesError::Api`].

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::PlacesError;
use crate::types::{ApiResponse, DetailsResponse, PlaceDetails, TextSearchPage};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";
const DETAILS_FIELDS: &str = "website,name,formatted_address,international_phone_number";

/// Client for the Places text-search and details endpoints.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl std::fmt::Debug for PlacesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesClient")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PlacesClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`PlacesError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("prospect/0.1 (business-discovery)")
            .build()?;

        // Exactly one trailing slash so relative endpoint paths join under it.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|_| PlacesError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Runs a text search, or fetches the follow-up page for `page_token`.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Api`] if the API returns an error status.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn text_search(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<TextSearchPage, PlacesError> {
        let url = match page_token {
            Some(token) => self.build_url("place/textsearch/json", &[("pagetoken", token)])?,
            None => self.build_url("place/textsearch/json", &[("query", query)])?,
        };
        self.request(&url, &format!("textsearch(query={query})"))
            .await
    }

    /// Fetches website, phone, name, and address for one place.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::text_search`].
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = self.build_url(
            "place/details/json",
            &[("place_id", place_id), ("fields", DETAILS_FIELDS)],
        )?;
        let details: DetailsResponse = self
            .request(&url, &format!("details(place_id={place_id})"))
            .await?;
        Ok(details.result.unwrap_or_default())
    }

    /// Builds the request URL with percent-encoded query parameters.
    fn build_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|_| PlacesError::InvalidBaseUrl(self.base_url.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET, asserts a 2xx status, checks the API status envelope, and
    /// deserializes the payload.
    async fn request<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, PlacesError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;

        let envelope: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                context: context.to_owned(),
                source: e,
            })?;

        match envelope.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(envelope.data),
            _ => Err(PlacesError::Api {
                status: envelope.status,
                message: envelope
                    .error_message
                    .unwrap_or_else(|| "no error message".to_string()),
            }),
        }
    }
}
