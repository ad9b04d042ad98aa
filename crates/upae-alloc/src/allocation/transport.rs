use super::collaborators::RouteObservation;
use super::domain::{TransportEstimate, TransportSource};
use super::geo::GeoError;
use super::text::fold;

pub const DEFAULT_FARE: f64 = 4.10;
/// Straight-line kilometres covered by one boarding when no route is known.
pub const KM_PER_BOARDING: f64 = 15.0;
const HEURISTIC_SPEED_KMH: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("route unavailable: {0}")]
    RouteUnavailable(String),
    #[error(transparent)]
    Geo(#[from] GeoError),
}

#[derive(Debug, Clone)]
struct FareZone {
    pattern: &'static str,
    fare: f64,
}

/// Per-boarding fares keyed by municipality name.
#[derive(Debug, Clone)]
pub struct FareTable {
    zones: Vec<FareZone>,
    default_fare: f64,
}

impl FareTable {
    /// 2025 bus fares for the Recife metro area and the main interior hubs.
    pub fn pernambuco() -> Self {
        let zone = |pattern, fare| FareZone { pattern, fare };
        Self {
            zones: vec![
                zone("recife", 4.30),
                zone("jaboatao", 4.30),
                zone("olinda", 4.30),
                zone("paulista", 4.30),
                zone("cabo", 4.30),
                zone("igarassu", 4.30),
                zone("abreu", 4.30),
                zone("camaragibe", 4.30),
                zone("caruaru", 4.00),
                zone("petrolina", 4.00),
                zone("garanhuns", 3.80),
                zone("vitoria", 3.80),
            ],
            default_fare: DEFAULT_FARE,
        }
    }

    pub fn fare_for(&self, municipality: &str) -> f64 {
        let folded = fold(municipality);
        if folded.is_empty() {
            return self.default_fare;
        }
        self.zones
            .iter()
            .find(|zone| folded.contains(zone.pattern))
            .map(|zone| zone.fare)
            .unwrap_or(self.default_fare)
    }

    /// The costlier of the two zones is charged per boarding.
    pub fn effective_fare(&self, origin: &str, destination: &str) -> f64 {
        self.fare_for(origin).max(self.fare_for(destination))
    }
}

impl Default for FareTable {
    fn default() -> Self {
        Self::pernambuco()
    }
}

/// Distance information available for one trip.
#[derive(Debug, Clone, Copy)]
pub enum TripDistance<'a> {
    /// Transit route reported by the routing collaborator.
    Routed(&'a RouteObservation),
    /// Straight-line distance only; transfers are estimated.
    StraightLine(f64),
    Unknown,
}

/// Converts trip distance and boardings into a fare estimate.
#[derive(Debug, Clone, Default)]
pub struct TransportCostEstimator {
    fares: FareTable,
}

impl TransportCostEstimator {
    pub fn new(fares: FareTable) -> Self {
        Self { fares }
    }

    pub fn estimate(
        &self,
        trip: TripDistance<'_>,
        origin_municipality: &str,
        destination_municipality: &str,
    ) -> Result<TransportEstimate, TransportError> {
        let fare = self
            .fares
            .effective_fare(origin_municipality, destination_municipality);

        match trip {
            TripDistance::Routed(route) => {
                let distance_km = checked_distance(route.distance_km)?;
                let transfers = route.transfers.max(1);
                Ok(TransportEstimate {
                    distance_km,
                    cost: fare_cost(fare, transfers),
                    transfers,
                    travel_time: route.travel_time.clone(),
                    source: TransportSource::Measured,
                })
            }
            TripDistance::StraightLine(distance_km) => {
                let distance_km = checked_distance(distance_km)?;
                let transfers = heuristic_boardings(distance_km);
                Ok(TransportEstimate {
                    distance_km,
                    cost: fare_cost(fare, transfers),
                    transfers,
                    travel_time: heuristic_travel_time(distance_km),
                    source: TransportSource::Heuristic,
                })
            }
            TripDistance::Unknown => Err(TransportError::RouteUnavailable(
                "no coordinates or route data for this trip".to_string(),
            )),
        }
    }
}

fn checked_distance(distance_km: f64) -> Result<f64, TransportError> {
    if distance_km.is_finite() && distance_km >= 0.0 {
        Ok(distance_km)
    } else {
        Err(TransportError::RouteUnavailable(format!(
            "distance {distance_km} km is not usable"
        )))
    }
}

/// One boarding per 15 km, rounded up, never below one.
pub fn heuristic_boardings(distance_km: f64) -> u32 {
    (distance_km / KM_PER_BOARDING).ceil().max(1.0) as u32
}

fn fare_cost(fare: f64, boardings: u32) -> f64 {
    round_currency(fare * f64::from(boardings.max(1)))
}

pub(crate) fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn heuristic_travel_time(distance_km: f64) -> String {
    let minutes = (distance_km / HEURISTIC_SPEED_KMH * 60.0).round().max(1.0) as u64;
    if minutes < 60 {
        format!("{minutes} min (estimated)")
    } else {
        format!("{} h {} min (estimated)", minutes / 60, minutes % 60)
    }
}
