use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::Coordinates;

/// Errors that can occur when calling the geocoding provider
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Resolved address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    pub coordinates: Coordinates,
    pub formatted_address: String,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    address: Option<PlaceAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct PlaceAddress {
    road: Option<String>,
    house_number: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    state: Option<String>,
}

/// Client for a Nominatim-compatible search endpoint
///
/// Used to fill in coordinates for jobs posted with address text only.
pub struct GeocoderClient {
    base_url: String,
    client: Client,
}

impl GeocoderClient {
    pub fn new(base_url: String, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { base_url, client })
    }

    /// Look up an address, `None` when the provider has no match
    pub async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }

        let url = format!(
            "{}/search?q={}&format=json&limit=1&addressdetails=1",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(address)
        );

        tracing::debug!("Geocoding address: {}", address);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GeocodeError::ApiError(format!(
                "Geocoding failed: {}",
                response.status()
            )));
        }

        let places: Vec<Place> = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let Some(place) = places.into_iter().next() else {
            tracing::info!("No geocoding results for: {}", address);
            return Ok(None);
        };

        let latitude: f64 = place
            .lat
            .parse()
            .map_err(|_| GeocodeError::InvalidResponse(format!("bad latitude: {}", place.lat)))?;
        let longitude: f64 = place
            .lon
            .parse()
            .map_err(|_| GeocodeError::InvalidResponse(format!("bad longitude: {}", place.lon)))?;

        let formatted_address = place
            .address
            .as_ref()
            .and_then(format_address)
            .unwrap_or(place.display_name);

        Ok(Some(GeocodedAddress {
            coordinates: Coordinates::new(latitude, longitude),
            formatted_address,
        }))
    }
}

/// Short "street, neighborhood, city, state" form of a place
fn format_address(address: &PlaceAddress) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(road) = &address.road {
        match &address.house_number {
            Some(number) => parts.push(format!("{} {}", number, road)),
            None => parts.push(road.clone()),
        }
    }

    let city = address
        .city
        .as_ref()
        .or(address.town.as_ref())
        .or(address.village.as_ref())
        .or(address.hamlet.as_ref());

    let neighborhood = [&address.suburb, &address.neighbourhood]
        .into_iter()
        .flatten()
        .find(|n| address.city.as_ref() != Some(*n));
    if let Some(neighborhood) = neighborhood {
        parts.push(neighborhood.clone());
    }

    if let Some(city) = city {
        parts.push(city.clone());
    }
    if let Some(state) = &address.state {
        parts.push(state.clone());
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
