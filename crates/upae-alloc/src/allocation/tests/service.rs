use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::allocation::collaborators::MunicipalityGeocoder;
use crate::allocation::directory::FacilityDirectory;
use crate::allocation::domain::{GenderIdentity, TransportSource};
use crate::allocation::eligibility::EligibilityViolation;
use crate::allocation::ranking::AllocationFailure;
use crate::allocation::scoring::{ScoringConfig, SENTINEL_SCORE};
use crate::allocation::service::{AllocationRequest, AllocationService, AllocationServiceError};

use super::common::*;

fn request(specialty: &str) -> AllocationRequest {
    AllocationRequest {
        patient: intake(specialty),
        offers: None,
        reference_date: None,
    }
}

fn shortest_directory_wait(specialty: &str) -> u32 {
    FacilityDirectory::standard()
        .offers_for(specialty)
        .iter()
        .map(|offer| offer.wait_days)
        .min()
        .expect("directory lists the specialty")
}

#[tokio::test]
async fn allocates_from_the_directory_with_measured_routes() {
    let service = build_service(StaticRouter::new(route(12.0, 1)));

    let result = service
        .allocate(request("Cardiologia"))
        .await
        .expect("allocation runs");

    assert!(result.is_success());
    let best = result.best().expect("best offer");
    assert_eq!(best.offer().wait_days, shortest_directory_wait("Cardiologia"));
    let breakdown = best.breakdown().expect("scored");
    assert_eq!(breakdown.transport_source, TransportSource::Measured);
    assert_eq!(breakdown.distance_km, 12.0);
    assert_eq!(result.evaluated().len(), 4);
}

#[tokio::test]
async fn router_is_called_once_per_located_offer() {
    let router = Arc::new(StaticRouter::new(route(8.0, 1)));
    let service = AllocationService::new(
        Arc::new(MunicipalityGeocoder::pernambuco()),
        Arc::clone(&router),
        Arc::new(FacilityDirectory::standard()),
        ScoringConfig::default(),
    )
    .expect("default config is valid");

    let mut unlocated = offer("unlocated", 3.0, 2);
    unlocated.coordinates = None;
    unlocated.address = "Endereco desconhecido".to_string();
    unlocated.municipality = "Atlantida".to_string();
    let mut allocation = request("Cardiologia");
    allocation.offers = Some(vec![offer("a", 4.0, 5), offer("b", 9.0, 5), unlocated]);

    let result = service.allocate(allocation).await.expect("allocation runs");

    assert_eq!(router.calls(), 2);
    assert_eq!(result.best().map(|b| b.offer().facility_id.0.as_str()), Some("a"));
}

#[tokio::test]
async fn unavailable_router_falls_back_to_heuristic() {
    let service = build_service(UnavailableRouter);
    let mut allocation = request("Cardiologia");
    allocation.offers = Some(vec![offer("near", 5.0, 3), offer("far", 40.0, 2)]);

    let result = service.allocate(allocation).await.expect("allocation runs");

    let best = result.best().expect("best offer");
    assert_eq!(best.offer().facility_id.0, "near");
    let breakdown = best.breakdown().expect("scored");
    assert_eq!(breakdown.transport_source, TransportSource::Heuristic);
    assert!((breakdown.distance_km - 5.0).abs() < 0.05);
}

#[tokio::test]
async fn slow_router_is_abandoned_after_the_timeout() {
    let service = build_service(SlowRouter {
        delay: Duration::from_millis(600),
    });
    let mut allocation = request("Cardiologia");
    allocation.offers = Some(vec![offer("near", 5.0, 3)]);

    let result = service.allocate(allocation).await.expect("allocation runs");

    let breakdown = result
        .best()
        .and_then(|best| best.breakdown())
        .expect("scored with the heuristic");
    assert_eq!(breakdown.transport_source, TransportSource::Heuristic);
}

#[tokio::test]
async fn missing_patient_coordinates_are_geocoded() {
    let service = build_service(UnavailableRouter);
    let mut allocation = request("Cardiologia");
    allocation.patient.coordinates = None;
    allocation.offers = Some(vec![offer("near", 5.0, 3)]);

    let result = service.allocate(allocation).await.expect("allocation runs");

    assert!(result.is_success());
}

#[tokio::test]
async fn unresolvable_patient_location_leaves_offers_unroutable() {
    let service = AllocationService::new(
        Arc::new(UnknownGeocoder),
        Arc::new(StaticRouter::new(route(5.0, 1))),
        Arc::new(FacilityDirectory::standard()),
        ScoringConfig::default(),
    )
    .expect("default config is valid")
    .with_route_timeout(Duration::from_millis(200));
    let mut allocation = request("Cardiologia");
    allocation.patient.coordinates = None;

    let result = service.allocate(allocation).await.expect("allocation runs");

    assert!(!result.is_success());
    assert_eq!(result.failure(), Some(AllocationFailure::NoViableAllocation));
    assert!(!result.evaluated().is_empty());
    assert!(result
        .evaluated()
        .iter()
        .all(|scored| scored.score() == SENTINEL_SCORE && !scored.is_feasible()));
}

#[tokio::test]
async fn ineligible_patients_are_rejected_before_scoring() {
    let router = Arc::new(StaticRouter::new(route(5.0, 1)));
    let service = AllocationService::new(
        Arc::new(MunicipalityGeocoder::pernambuco()),
        Arc::clone(&router),
        Arc::new(FacilityDirectory::standard()),
        ScoringConfig::default(),
    )
    .expect("default config is valid");
    let mut allocation = request("Pediatria");
    allocation.patient.age = 70;

    let error = service
        .allocate(allocation)
        .await
        .expect_err("pediatrics rejects a 70 year old");

    assert!(matches!(
        error,
        AllocationServiceError::Ineligible(EligibilityViolation::AboveMaximumAge { .. })
    ));
    assert_eq!(router.calls(), 0);
}

#[tokio::test]
async fn invalid_intake_is_rejected() {
    let service = build_service(UnavailableRouter);
    let mut allocation = request("Cardiologia");
    allocation.patient.national_id = "111.111.111-11".to_string();

    let error = service
        .allocate(allocation)
        .await
        .expect_err("cpf check fails");

    assert!(matches!(error, AllocationServiceError::Intake(_)));
}

#[tokio::test]
async fn reference_date_projects_the_appointment() {
    let service = build_service(StaticRouter::new(route(5.0, 1)));
    let mut allocation = request("Cardiologia");
    allocation.offers = Some(vec![offer("near", 5.0, 10)]);
    allocation.reference_date = NaiveDate::from_ymd_opt(2024, 1, 25);

    let result = service.allocate(allocation).await.expect("allocation runs");

    let comparison = result
        .explanation()
        .and_then(|block| block.comparison.as_ref())
        .expect("comparison");
    assert_eq!(comparison.expected_date, NaiveDate::from_ymd_opt(2024, 2, 4));
}

#[test]
fn eligible_specialties_come_from_the_directory() {
    let service = build_service(UnavailableRouter);

    let child = service.eligible_specialties(GenderIdentity::HomemCis, 8);
    assert!(child.contains("Pediatria"));
    assert!(!child.contains("Geriatria"));

    let elder = service.eligible_specialties(GenderIdentity::MulherCis, 72);
    assert!(elder.contains("Geriatria"));
    assert!(!elder.contains("Pediatria"));
    assert!(elder
        .medical
        .iter()
        .chain(&elder.multidisciplinary)
        .all(|name| !service.directory().offers_for(name).is_empty()));
}

#[tokio::test]
async fn accented_specialty_matches_directory_offers() {
    let service = build_service(StaticRouter::new(route(9.0, 1)));
    let listed = service.directory().offers_for("Nutrição").len();
    assert!(listed > 0);

    let result = service
        .allocate(request("Nutrição"))
        .await
        .expect("allocation runs");

    assert!(result.is_success());
    assert_eq!(result.evaluated().len(), listed);
    assert_eq!(
        result.best().map(|best| best.offer().specialty.as_str()),
        Some("Nutricao")
    );
}

#[tokio::test]
async fn uncatalogued_condition_is_still_allocated() {
    let service = build_service(UnavailableRouter);
    assert!(service
        .conditions_for("Cardiologia")
        .contains(&"Arritmia cardiaca".to_string()));

    let mut allocation = request("Cardiologia");
    allocation.patient.condition = "Palpitacoes apos esforco".to_string();
    allocation.offers = Some(vec![offer("near", 5.0, 3)]);

    let result = service.allocate(allocation).await.expect("allocation runs");

    assert!(result.is_success());
}
