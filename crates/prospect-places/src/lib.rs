//! Google Places discovery: turns an industry and location into a
//! de-duplicated list of [`prospect_core::BusinessCandidate`]s.

pub mod client;
pub mod discover;
pub mod error;
pub mod types;

pub use client::PlacesClient;
pub use discover::{page_cap, DiscoveryRequest};
pub use error::PlacesError;
pub use types::{PlaceDetails, PlaceSummary, TextSearchPage};
