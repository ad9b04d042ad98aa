use super::common::*;
use crate::allocation::ranking::{AllocationFailure, Candidate, MAX_ALTERNATIVES};
use crate::allocation::scoring::SENTINEL_SCORE;

#[test]
fn lower_composite_score_wins() {
    let ranker = ranker();
    let patient = patient("Cardiologia");
    let candidates = vec![
        Candidate {
            offer: offer("far", 40.0, 2),
            route: Some(route(40.0, 3)),
        },
        Candidate {
            offer: offer("near", 5.0, 3),
            route: Some(route(5.0, 1)),
        },
    ];

    let result = ranker.rank_candidates(&patient, candidates, None);

    assert!(result.is_success());
    let best = result.best().expect("best offer");
    assert_eq!(best.offer().facility_id.0, "near");
    assert_eq!(result.alternatives().len(), 1);
    assert_eq!(result.alternatives()[0].offer().facility_id.0, "far");
    assert!(result.explanation().is_some());
    assert!(result.failure().is_none());
}

#[test]
fn no_feasible_offer_is_a_structured_failure() {
    let ranker = ranker();
    let offers = vec![offer("a", 120.0, 3), offer("b", 150.0, 1), offer("c", 101.0, 0)];

    let result = ranker.rank(&patient("Cardiologia"), offers);

    assert!(!result.is_success());
    assert_eq!(result.failure(), Some(AllocationFailure::NoViableAllocation));
    assert!(result.best().is_none());
    assert!(result.alternatives().is_empty());
    assert!(result.explanation().is_none());
    assert_eq!(result.evaluated().len(), 3);
    assert_eq!(
        AllocationFailure::NoViableAllocation.to_string(),
        "no viable allocation"
    );
}

#[test]
fn empty_offer_list_has_no_viable_allocation() {
    let result = ranker().rank(&patient("Cardiologia"), Vec::new());
    assert_eq!(result.failure(), Some(AllocationFailure::NoViableAllocation));
    assert!(result.evaluated().is_empty());
}

#[test]
fn alternatives_are_bounded_and_ordered() {
    let offers = (0..7)
        .map(|index| offer(&format!("o{index}"), 3.0 + index as f64 * 6.0, 4))
        .rev()
        .collect();

    let result = ranker().rank(&patient("Cardiologia"), offers);

    assert_eq!(result.best().map(|b| b.offer().facility_id.0.as_str()), Some("o0"));
    assert_eq!(result.alternatives().len(), MAX_ALTERNATIVES);
    let ids: Vec<&str> = result
        .alternatives()
        .iter()
        .map(|alt| alt.offer().facility_id.0.as_str())
        .collect();
    assert_eq!(ids, vec!["o1", "o2", "o3"]);
    assert_eq!(result.evaluated().len(), 7);
    assert!(result
        .evaluated()
        .windows(2)
        .all(|pair| pair[0].score() <= pair[1].score()));
}

#[test]
fn single_feasible_offer_has_no_alternatives() {
    let offers = vec![offer("ok", 8.0, 5), offer("too-far", 180.0, 5)];
    let result = ranker().rank(&patient("Cardiologia"), offers);

    assert!(result.is_success());
    assert_eq!(result.best().map(|b| b.offer().facility_id.0.as_str()), Some("ok"));
    assert!(result.alternatives().is_empty());
    assert_eq!(result.evaluated().len(), 1);
}

#[test]
fn equal_scores_keep_input_order() {
    let first = offer("first", 10.0, 6);
    let mut second = first.clone();
    second.facility_id.0 = "second".to_string();

    let result = ranker().rank(&patient("Cardiologia"), vec![first, second]);

    assert_eq!(result.best().map(|b| b.offer().facility_id.0.as_str()), Some("first"));
    assert_eq!(result.alternatives()[0].offer().facility_id.0, "second");
}

#[test]
fn best_offer_is_never_infeasible() {
    let ranker = ranker();
    let patient = patient("Cardiologia");
    let mut unlocated = offer("unlocated", 1.0, 1);
    unlocated.coordinates = None;
    let offers = vec![
        offer("slow", 0.5, 45),
        unlocated,
        offer("fine", 35.0, 20),
        offer("far", 220.0, 0),
    ];

    let result = ranker.rank(&patient, offers);

    let best = result.best().expect("one feasible offer");
    assert!(best.is_feasible());
    assert_eq!(best.offer().facility_id.0, "fine");
    assert!(result.alternatives().iter().all(|alt| alt.is_feasible()));
}

#[test]
fn unroutable_offers_are_reported_on_failure() {
    let mut unlocated = offer("unlocated", 1.0, 1);
    unlocated.coordinates = None;

    let result = ranker().rank(&patient("Cardiologia"), vec![unlocated]);

    assert!(!result.is_success());
    let evaluated = &result.evaluated()[0];
    assert_eq!(evaluated.score(), SENTINEL_SCORE);
    assert!(evaluated.failure_reason().is_some());
}

#[test]
fn offers_for_other_specialties_are_dropped() {
    let offers = vec![
        offer_for("derm", "Dermatologia", 2.0, 1),
        offer_for("cardio", "cardiologia", 20.0, 10),
    ];

    let result = ranker().rank(&patient("Cardiologia"), offers);

    assert_eq!(result.evaluated().len(), 1);
    assert_eq!(result.best().map(|b| b.offer().facility_id.0.as_str()), Some("cardio"));
}

#[test]
fn ranking_is_idempotent() {
    let ranker = ranker();
    let patient = patient("Cardiologia");
    let offers = vec![offer("a", 12.0, 9), offer("b", 7.0, 20), offer("c", 60.0, 2)];

    let first = ranker.rank(&patient, offers.clone());
    let second = ranker.rank(&patient, offers);

    assert_eq!(first, second);
}

#[test]
fn specialty_match_ignores_accents_and_case() {
    let offers = vec![
        offer_for("plain", "Nutricao", 4.0, 6),
        offer_for("upper", "NUTRIÇÃO", 8.0, 6),
    ];

    let result = ranker().rank(&patient("Nutrição"), offers);

    assert!(result.is_success());
    assert_eq!(result.evaluated().len(), 2);
}
