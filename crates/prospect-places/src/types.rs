//! Places API response types.
//!
//! Every response carries a `status` string and, on failure, an
//! `error_message`; [`ApiResponse`] captures that envelope generically.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

/// One page of `place/textsearch/json` results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextSearchPage {
    #[serde(default)]
    pub results: Vec<PlaceSummary>,
    /// Present when another page exists. Google only honours it after a
    /// short delay.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceSummary {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    #[serde(default)]
    pub result: Option<PlaceDetails>,
}

/// Fields requested from `place/details/json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub international_phone_number: Option<String>,
}
