use super::common::*;
use crate::allocation::domain::{Coordinates, SeverityLevel, TransportSource};
use crate::allocation::scoring::{
    OfferAssessment, OfferScorer, ScoringConfig, ScoringConfigError, ScoringWeights,
    SENTINEL_SCORE,
};

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

#[test]
fn measured_routes_drive_the_composite_score() {
    let scorer = scorer();
    let patient = patient("Cardiologia");

    let near = scorer.score_with_route(&patient, offer("near", 5.0, 3), Some(&route(5.0, 1)));
    let far = scorer.score_with_route(&patient, offer("far", 40.0, 2), Some(&route(40.0, 3)));

    let near_breakdown = near.breakdown().expect("near offer scored");
    assert_eq!(near_breakdown.cost, 4.3);
    assert_eq!(near_breakdown.transport_source, TransportSource::Measured);
    assert!(close(near.score(), 0.0672), "near score {}", near.score());

    let far_breakdown = far.breakdown().expect("far offer scored");
    assert_eq!(far_breakdown.cost, 12.9);
    assert_eq!(far_breakdown.transport_quality, 0.4);
    assert!(close(far.score(), 0.2916), "far score {}", far.score());

    assert!(near.is_feasible() && far.is_feasible());
}

#[test]
fn straight_line_scoring_uses_boarding_heuristic() {
    let scored = scorer().score(&patient("Cardiologia"), offer("heuristic", 31.0, 10));
    let breakdown = scored.breakdown().expect("scored");

    assert_eq!(breakdown.transport_source, TransportSource::Heuristic);
    assert_eq!(breakdown.transfers, 3);
    assert_eq!(breakdown.cost, 12.9);
    assert!((breakdown.distance_km - 31.0).abs() < 0.1);
}

#[test]
fn caps_mark_offers_infeasible_without_dropping_them() {
    let scorer = scorer();
    let patient = patient("Cardiologia");

    let too_far = scorer.score(&patient, offer("far", 130.0, 5));
    assert!(!too_far.is_feasible());
    assert!(too_far.breakdown().is_some());
    assert_eq!(too_far.breakdown().map(|b| b.distance_norm), Some(1.0));

    let too_slow = scorer.score(&patient, offer("slow", 5.0, 31));
    assert!(!too_slow.is_feasible());

    let at_limit = scorer.score(&patient, offer("limit", 5.0, 30));
    assert!(at_limit.is_feasible());
}

#[test]
fn offers_without_location_get_sentinel_score() {
    let mut unlocated = offer("unlocated", 5.0, 3);
    unlocated.coordinates = None;

    let scored = scorer().score(&patient("Cardiologia"), unlocated);

    assert_eq!(scored.score(), SENTINEL_SCORE);
    assert!(!scored.is_feasible());
    assert!(matches!(
        scored.assessment(),
        OfferAssessment::Unroutable { .. }
    ));
    assert!(scored
        .failure_reason()
        .is_some_and(|reason| reason.contains("route unavailable")));
}

#[test]
fn malformed_offer_coordinates_are_isolated() {
    let mut broken = offer("broken", 5.0, 3);
    broken.coordinates = Some(Coordinates::new(f64::NAN, -34.9));

    let scored = scorer().score(&patient("Cardiologia"), broken);

    assert_eq!(scored.score(), SENTINEL_SCORE);
    assert!(scored
        .failure_reason()
        .is_some_and(|reason| reason.contains("invalid coordinate")));
}

#[test]
fn priority_weight_divides_the_raw_score() {
    let scorer = scorer();
    let standard = scorer.score(&patient("Cardiologia"), offer("a", 12.0, 9));
    let urgent = scorer.score(
        &patient_with("Cardiologia", |raw| raw.urgent = true),
        offer("a", 12.0, 9),
    );

    let raw = standard.breakdown().expect("scored").raw_score;
    assert!(close(standard.score(), raw));
    assert!(close(urgent.score(), raw / 5.0));
    assert_eq!(urgent.breakdown().map(|b| b.priority.weight), Some(5));
}

#[test]
fn score_is_monotonic_in_distance_and_wait() {
    let scorer = scorer();
    let patient = patient("Cardiologia");

    let mut previous = 0.0;
    for km in [0.5, 4.0, 14.0, 16.0, 29.0, 46.0, 61.0, 99.0, 140.0] {
        let score = scorer.score(&patient, offer("d", km, 10)).score();
        assert!(score >= previous, "score dropped at {km} km");
        previous = score;
    }

    let mut previous = 0.0;
    for wait in [0, 1, 7, 15, 29, 30, 45] {
        let score = scorer.score(&patient, offer("w", 10.0, wait)).score();
        assert!(score >= previous, "score dropped at {wait} days");
        previous = score;
    }
}

#[test]
fn score_is_monotonic_in_cost() {
    let scorer = scorer();
    let patient = patient_with("Cardiologia", |raw| raw.municipality = "Garanhuns".to_string());
    let observed = route(20.0, 2);

    let mut cheap = offer("cheap", 20.0, 5);
    cheap.municipality = "Garanhuns".to_string();
    let expensive = offer("expensive", 20.0, 5);

    let cheap = scorer.score_with_route(&patient, cheap, Some(&observed));
    let expensive = scorer.score_with_route(&patient, expensive, Some(&observed));

    assert_eq!(cheap.breakdown().map(|b| b.cost), Some(7.6));
    assert_eq!(expensive.breakdown().map(|b| b.cost), Some(8.6));
    assert!(cheap.score() < expensive.score());
}

#[test]
fn no_show_risk_is_reported_but_not_scored() {
    let scorer = scorer();
    let moderate = scorer.score(&patient("Endocrinologia"), offer("e", 10.0, 5));
    let routine = scorer.score(
        &patient_with("Endocrinologia", |raw| raw.severity = SeverityLevel::Routine),
        offer("e", 10.0, 5),
    );

    assert_eq!(moderate.score(), routine.score());
    let moderate_risk = moderate.breakdown().map(|b| b.no_show_risk).unwrap_or_default();
    let routine_risk = routine.breakdown().map(|b| b.no_show_risk).unwrap_or_default();
    assert!(routine_risk > moderate_risk);
}

#[test]
fn configuration_is_validated() {
    let mut config = ScoringConfig::default();
    assert!(config.validate().is_ok());

    config.weights = ScoringWeights {
        distance: 0.5,
        wait: 0.5,
        cost: 0.5,
        transport: 0.0,
    };
    assert!(matches!(
        OfferScorer::new(config),
        Err(ScoringConfigError::WeightSum { .. })
    ));

    config.weights.distance = -0.5;
    assert!(matches!(
        config.validate(),
        Err(ScoringConfigError::InvalidWeight { name: "distance", .. })
    ));

    let mut config = ScoringConfig::default();
    config.max_distance_km = 0.0;
    assert!(matches!(
        config.validate(),
        Err(ScoringConfigError::InvalidLimit {
            name: "max_distance_km",
            ..
        })
    ));
}
