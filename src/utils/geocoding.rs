// Geocoding gateways: turning free-text addresses into coordinates

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::GeocodeError;
use crate::models::Coordinate;

/// Resolves a free-text address into a coordinate
///
/// `Ok(None)` means the gateway answered but found no match.
#[async_trait]
pub trait GeocodingGateway: Send + Sync {
    async fn resolve(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

pub const NOMINATIM_SEARCH_PATH: &str = "/search";

#[derive(Deserialize)]
struct NominatimPlace {
    // Nominatim sends coordinates as strings
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

pub struct NominatimGatewayParams {
    pub base_url: String,
    pub user_agent: String,
}

/// Gateway backed by a Nominatim search endpoint
pub struct NominatimGateway {
    params: NominatimGatewayParams,
    client: reqwest::Client,
}

impl NominatimGateway {
    pub fn new(params: NominatimGatewayParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    fn search_url(&self) -> String {
        let mut url = self.params.base_url.trim_end_matches('/').to_string();
        url.push_str(NOMINATIM_SEARCH_PATH);
        url
    }
}

#[async_trait]
impl GeocodingGateway for NominatimGateway {
    async fn resolve(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let response = self
            .client
            .get(self.search_url())
            .header(reqwest::header::USER_AGENT, &self.params.user_agent)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api { status, message });
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        let Some(place) = places.into_iter().next() else {
            debug!("Nominatim: no match for {:?}", address);
            return Ok(None);
        };

        debug!("Nominatim: {:?} resolved to {}", address, place.display_name);
        parse_place(&place).map(Some)
    }
}

fn parse_place(place: &NominatimPlace) -> Result<Coordinate, GeocodeError> {
    let latitude = place
        .lat
        .parse::<f64>()
        .map_err(|_| GeocodeError::InvalidResponse(format!("latitude `{}`", place.lat)))?;
    let longitude = place
        .lon
        .parse::<f64>()
        .map_err(|_| GeocodeError::InvalidResponse(format!("longitude `{}`", place.lon)))?;

    let coordinate = Coordinate::new(latitude, longitude);
    if !coordinate.is_valid() {
        return Err(GeocodeError::InvalidResponse(format!(
            "coordinate out of range ({}, {})",
            latitude, longitude
        )));
    }
    Ok(coordinate)
}

/// In-memory gateway with a fixed address book
///
/// Used offline (known origin coordinate) and in tests.
#[derive(Debug, Clone, Default)]
pub struct FixedGateway {
    addresses: HashMap<String, Coordinate>,
    fallback: Option<Coordinate>,
}

impl FixedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every address to the same coordinate
    pub fn always(coordinate: Coordinate) -> Self {
        Self {
            addresses: HashMap::new(),
            fallback: Some(coordinate),
        }
    }

    pub fn with_address<A: Into<String>>(mut self, address: A, coordinate: Coordinate) -> Self {
        self.addresses.insert(address.into(), coordinate);
        self
    }
}

#[async_trait]
impl GeocodingGateway for FixedGateway {
    async fn resolve(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        Ok(self.addresses.get(address).copied().or(self.fallback))
    }
}
