//! Location search for the report form.
//!
//! Typing into the location box goes through [`LocationSearch`]: each
//! keystroke waits out a debounce, short input is ignored, and only the
//! newest query may publish results. Every call to [`LocationSearch::input`]
//! takes a ticket from a counter; a query whose ticket is no longer the
//! latest when it returns is dropped, so a slow early answer never replaces
//! a faster later one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CivicError, Result};

pub const MAPBOX_GEOCODING_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places/";

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_MIN_CHARS: usize = 3;
const RESULT_LIMIT: u8 = 5;

/// A geocoded place, ranked as the provider returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub label: String,
    pub lat: f64,
    pub lng: f64,
}

/// Free-text place lookup.
pub trait Geocoder: Send + Sync {
    fn search(&self, text: &str) -> impl Future<Output = Result<Vec<Place>>> + Send;
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    place_name: String,
    /// `[lng, lat]`
    center: [f64; 2],
}

impl From<Feature> for Place {
    fn from(feature: Feature) -> Self {
        Place {
            label: feature.place_name,
            lat: feature.center[1],
            lng: feature.center[0],
        }
    }
}

/// Mapbox forward geocoding, limited to places and addresses.
pub struct MapboxGeocoder {
    client: Client,
    base_url: Url,
    token: SecretString,
}

impl MapboxGeocoder {
    pub fn new(token: SecretString, timeout: Duration) -> Result<Self> {
        Self::with_base_url(MAPBOX_GEOCODING_URL, token, timeout)
    }

    pub fn with_base_url(base_url: &str, token: SecretString, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: Url::parse(base_url)?,
            token,
        })
    }

    fn search_url(&self, text: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CivicError::Config(format!("cannot query from {}", self.base_url)))?
            .pop_if_empty()
            .push(&format!("{text}.json"));
        url.query_pairs_mut()
            .append_pair("access_token", self.token.expose_secret())
            .append_pair("types", "place,address")
            .append_pair("limit", &RESULT_LIMIT.to_string());
        Ok(url)
    }
}

impl Geocoder for MapboxGeocoder {
    async fn search(&self, text: &str) -> Result<Vec<Place>> {
        let url = self.search_url(text)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CivicError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        let collection: FeatureCollection = response.json().await?;
        Ok(collection.features.into_iter().map(Place::from).collect())
    }
}

/// What happened to one keystroke's query.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Newest query; these are now the current suggestions.
    Results(Vec<Place>),
    /// Input below the minimum length. Suggestions were cleared.
    TooShort,
    /// A newer keystroke arrived first; nothing was published.
    Superseded,
}

/// Debounced, last-query-wins front for a [`Geocoder`].
pub struct LocationSearch<G> {
    geocoder: G,
    debounce: Duration,
    min_chars: usize,
    latest: AtomicU64,
    results: Mutex<Vec<Place>>,
}

impl<G: Geocoder> LocationSearch<G> {
    pub fn new(geocoder: G) -> Self {
        Self::with_settings(geocoder, DEFAULT_DEBOUNCE, DEFAULT_MIN_CHARS)
    }

    pub fn with_settings(geocoder: G, debounce: Duration, min_chars: usize) -> Self {
        Self {
            geocoder,
            debounce,
            min_chars,
            latest: AtomicU64::new(0),
            results: Mutex::new(Vec::new()),
        }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Current suggestions.
    pub fn results(&self) -> Vec<Place> {
        self.results.lock().clone()
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }

    /// Handle the box's new text.
    pub async fn input(&self, text: &str) -> Result<SearchOutcome> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;
        if !self.is_latest(ticket) {
            return Ok(SearchOutcome::Superseded);
        }

        let text = text.trim();
        if text.chars().count() < self.min_chars {
            self.results.lock().clear();
            return Ok(SearchOutcome::TooShort);
        }

        let places = self.geocoder.search(text).await?;
        if !self.is_latest(ticket) {
            tracing::debug!(ticket, query = text, "discarding stale geocode response");
            return Ok(SearchOutcome::Superseded);
        }

        *self.results.lock() = places.clone();
        Ok(SearchOutcome::Results(places))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_text() {
        let geocoder = MapboxGeocoder::new(
            SecretString::from("pk.test".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        let url = geocoder.search_url("5th Ave & Main").unwrap();
        assert_eq!(url.host_str(), Some("api.mapbox.com"));
        assert!(
            url.path()
                .ends_with("/mapbox.places/5th%20Ave%20&%20Main.json"),
            "{}",
            url.path()
        );
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("access_token".to_string(), "pk.test".to_string())));
        assert!(query.contains(&("types".to_string(), "place,address".to_string())));
        assert!(query.contains(&("limit".to_string(), "5".to_string())));
    }

    #[test]
    fn test_feature_center_is_lng_lat() {
        let body = r#"{"features":[{"place_name":"Paris, France","center":[2.35,48.85]}]}"#;
        let collection: FeatureCollection = serde_json::from_str(body).unwrap();
        let places: Vec<Place> = collection.features.into_iter().map(Place::from).collect();
        assert_eq!(
            places,
            [Place {
                label: "Paris, France".to_string(),
                lat: 48.85,
                lng: 2.35,
            }]
        );
    }
}
