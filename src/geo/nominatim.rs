//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API for geocoding.
//! Rate limit: 1 request per second (enforced by User-Agent requirement)

use crate::constants::api::USER_AGENT;
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::geo::GeoBackend;
use serde::Deserialize;
use std::time::Duration;

/// Zoom level for reverse lookups: 10 resolves to city granularity
const REVERSE_ZOOM: u8 = 10;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

/// Nominatim reverse response
///
/// A miss comes back as `200 OK` with only an `error` field.
#[derive(Debug, Default, Deserialize)]
struct ReverseResult {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<Address>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    state_district: Option<String>,
}

impl ReverseResult {
    /// Pick the locality name out of a reverse result
    ///
    /// Prefers the most specific settlement in the address breakdown and
    /// falls back to the first component of the display name.
    fn place_name(self) -> Option<String> {
        if self.error.is_some() {
            return None;
        }

        let from_address = self.address.and_then(|a| {
            a.city
                .or(a.town)
                .or(a.village)
                .or(a.county)
                .or(a.state_district)
        });

        from_address
            .or_else(|| {
                self.display_name
                    .and_then(|d| d.split(',').next().map(|s| s.to_string()))
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl NominatimBackend {
    /// Create a new Nominatim backend
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Geo(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Parse lat/lng strings to a coordinate
    fn parse_coords(lat: &str, lng: &str) -> Result<Coordinate> {
        let lat: f64 = lat
            .parse()
            .map_err(|_| Error::Geo(format!("Invalid latitude: {}", lat)))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| Error::Geo(format!("Invalid longitude: {}", lng)))?;
        Coordinate::try_new(lat, lng).map_err(|e| Error::Geo(e.to_string()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Geo(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geo(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Geo(format!("Failed to parse Nominatim response: {}", e)))
    }
}

impl GeoBackend for NominatimBackend {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn geocode(&self, place: &str) -> Result<Option<Coordinate>> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(place)
        );

        let results: Vec<SearchResult> = self.get_json(&url).await?;

        match results.into_iter().next() {
            Some(result) => Ok(Some(Self::parse_coords(&result.lat, &result.lon)?)),
            None => Ok(None),
        }
    }

    async fn reverse_geocode(&self, coord: Coordinate) -> Result<Option<String>> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&zoom={}&addressdetails=1",
            self.base_url, coord.lat, coord.lng, REVERSE_ZOOM
        );

        let result: ReverseResult = self.get_json(&url).await?;
        Ok(result.place_name())
    }
}
