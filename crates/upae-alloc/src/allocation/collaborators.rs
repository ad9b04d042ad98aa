use serde::{Deserialize, Serialize};

use super::domain::Coordinates;
use super::text::fold;

/// Route facts reported by a public-transit routing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteObservation {
    pub distance_km: f64,
    pub transfers: u32,
    pub travel_time: String,
}

/// Address resolution boundary (e.g., a maps provider adapter).
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError>;
}

/// Transit routing boundary; failures fall back to the distance heuristic.
pub trait TransitRouter: Send + Sync {
    fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteObservation, RoutingError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    #[error("address not found: {0}")]
    NotFound(String),
    #[error("geocoding provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("no transit route between origin and destination")]
    NoRoute,
    #[error("routing provider unavailable: {0}")]
    Unavailable(String),
}

struct MunicipalityCentroid {
    pattern: &'static str,
    coordinates: Coordinates,
}

/// Offline geocoder resolving an address to the centroid of the municipality it names.
pub struct MunicipalityGeocoder {
    centroids: Vec<MunicipalityCentroid>,
}

impl MunicipalityGeocoder {
    pub fn pernambuco() -> Self {
        let centroid = |pattern, lat, lng| MunicipalityCentroid {
            pattern,
            coordinates: Coordinates::new(lat, lng),
        };

        Self {
            centroids: vec![
                centroid("abreu e lima", -7.9007, -34.8984),
                centroid("jaboatao", -8.1128, -35.0148),
                centroid("olinda", -8.0089, -34.8553),
                centroid("cabo de santo agostinho", -8.2814, -35.0349),
                centroid("paulista", -7.9406, -34.8728),
                centroid("igarassu", -7.8342, -34.9062),
                centroid("camaragibe", -8.0235, -34.9782),
                centroid("caruaru", -8.2837, -35.9761),
                centroid("petrolina", -9.3891, -40.5030),
                centroid("garanhuns", -8.8902, -36.4927),
                centroid("vitoria de santo antao", -8.1194, -35.2919),
                centroid("recife", -8.0476, -34.8770),
            ],
        }
    }
}

impl Default for MunicipalityGeocoder {
    fn default() -> Self {
        Self::pernambuco()
    }
}

impl Geocoder for MunicipalityGeocoder {
    fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let folded = fold(address);
        self.centroids
            .iter()
            .find(|centroid| folded.contains(centroid.pattern))
            .map(|centroid| centroid.coordinates)
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))
    }
}
