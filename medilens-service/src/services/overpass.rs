//! Overpass facility index client.
//!
//! Queries an Overpass-style interpreter for medical facilities (hospitals,
//! clinics, doctors) around a point. The handler layer turns the raw elements
//! into distance-sorted facilities.

use crate::services::providers::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const USER_AGENT: &str = concat!("medilens-backend/", env!("CARGO_PKG_VERSION"));

/// OSM amenity values treated as medical facilities.
const AMENITY_FILTER: &str = "hospital|clinic|doctors";

/// Spatial index answering "what facilities are near this point" queries.
#[async_trait]
pub trait FacilityIndex: Send + Sync {
    async fn search_around(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<Vec<FacilityElement>, ProviderError>;
}

/// Raw Overpass response envelope.
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    pub elements: Vec<FacilityElement>,
}

/// A single Overpass element (node, way or relation).
#[derive(Debug, Clone, Deserialize)]
pub struct FacilityElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

/// Centroid reported by `out center` for ways and relations.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

impl FacilityElement {
    /// Coordinates of the element, falling back to the `center` member.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => self.center.map(|c| (c.lat, c.lon)),
        }
    }
}

/// HTTP client for the Overpass interpreter endpoint.
pub struct OverpassClient {
    url: String,
    client: Client,
}

impl OverpassClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    fn build_query(latitude: f64, longitude: f64, radius_m: f64) -> String {
        format!(
            r#"[out:json][timeout:25];
(
  node["amenity"~"{amenity}"](around:{radius},{lat},{lon});
  way["amenity"~"{amenity}"](around:{radius},{lat},{lon});
  relation["amenity"~"{amenity}"](around:{radius},{lat},{lon});
);
out center;"#,
            amenity = AMENITY_FILTER,
            radius = radius_m,
            lat = latitude,
            lon = longitude
        )
    }
}

#[async_trait]
impl FacilityIndex for OverpassClient {
    async fn search_around(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<Vec<FacilityElement>, ProviderError> {
        let query = Self::build_query(latitude, longitude, radius_m);

        tracing::debug!(
            lat = latitude,
            lon = longitude,
            radius_m = radius_m,
            "Querying facility index"
        );

        // Overpass expects form-encoded POST data, not a raw body.
        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Overpass API error {}",
                status
            )));
        }

        let body: OverpassResponse = response.json().await.map_err(|e| {
            ProviderError::ApiError(format!("Failed to parse Overpass response: {}", e))
        })?;

        Ok(body.elements)
    }
}

/// Mock facility index for tests.
pub struct MockFacilityIndex {
    elements: Vec<FacilityElement>,
    fail: bool,
}

impl MockFacilityIndex {
    pub fn new(elements: Vec<FacilityElement>) -> Self {
        Self {
            elements,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            elements: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl FacilityIndex for MockFacilityIndex {
    async fn search_around(
        &self,
        _latitude: f64,
        _longitude: f64,
        _radius_m: f64,
    ) -> Result<Vec<FacilityElement>, ProviderError> {
        if self.fail {
            return Err(ProviderError::ApiError(
                "mock facility index outage".to_string(),
            ));
        }
        Ok(self.elements.clone())
    }
}
