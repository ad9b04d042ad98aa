use super::super::domain::TransportEstimate;
use super::super::priority::Priority;
use super::config::ScoringConfig;

/// Trip cost that saturates the cost criterion.
pub const COST_CEILING: f64 = 50.0;

pub(crate) struct NormalizedMetrics {
    pub distance: f64,
    pub wait: f64,
    pub cost: f64,
    pub transport_quality: f64,
}

pub(crate) fn normalize(
    transport: &TransportEstimate,
    wait_days: u32,
    config: &ScoringConfig,
) -> NormalizedMetrics {
    NormalizedMetrics {
        distance: (transport.distance_km / config.max_distance_km).min(1.0),
        wait: (f64::from(wait_days) / config.max_wait_days).min(1.0),
        cost: (transport.cost / COST_CEILING).min(1.0),
        transport_quality: transport_quality(transport.transfers),
    }
}

/// Fewer boardings mean a more reliable trip.
pub fn transport_quality(transfers: u32) -> f64 {
    match transfers {
        0 | 1 => 1.0,
        2 => 0.7,
        _ => 0.4,
    }
}

pub(crate) fn raw_score(metrics: &NormalizedMetrics, config: &ScoringConfig) -> f64 {
    let weights = &config.weights;
    weights.distance * metrics.distance
        + weights.wait * metrics.wait
        + weights.cost * metrics.cost
        + weights.transport * (1.0 - metrics.transport_quality)
}

pub(crate) fn apply_priority(raw: f64, priority: &Priority) -> f64 {
    raw / f64::from(priority.weight.max(1))
}

pub(crate) fn is_feasible(distance_km: f64, wait_days: u32, config: &ScoringConfig) -> bool {
    distance_km <= config.max_distance_km
        && f64::from(wait_days) <= config.max_wait_days
}
