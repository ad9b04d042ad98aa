use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::allocation::collaborators::{
    GeocodeError, Geocoder, MunicipalityGeocoder, RouteObservation, RoutingError, TransitRouter,
};
use crate::allocation::directory::FacilityDirectory;
use crate::allocation::domain::{
    Coordinates, FacilityId, FacilityOffer, GenderIdentity, Patient, PatientIntake,
    SeverityLevel, VulnerabilityLevel,
};
use crate::allocation::ranking::AllocationRanker;
use crate::allocation::scoring::{OfferScorer, ScoringConfig};
use crate::allocation::service::AllocationService;

pub(super) fn recife() -> Coordinates {
    Coordinates::new(-8.0476, -34.8770)
}

pub(super) fn intake(specialty: &str) -> PatientIntake {
    PatientIntake {
        id: Some("pac-test".to_string()),
        name: "Ana Beatriz Lima".to_string(),
        national_id: "529.982.247-25".to_string(),
        gender: GenderIdentity::MulherCis,
        age: 40,
        specialty: specialty.to_string(),
        address: "Rua do Hospicio, 200 - Boa Vista, Recife - PE".to_string(),
        municipality: "Recife".to_string(),
        coordinates: Some(recife()),
        pregnant: false,
        has_disability: false,
        long_distance_eligible: false,
        urgent: false,
        severity: SeverityLevel::Moderate,
        vulnerability: VulnerabilityLevel::Medium,
        condition: "Dor toracica recorrente".to_string(),
    }
}

pub(super) fn patient(specialty: &str) -> Patient {
    intake(specialty).into_patient().expect("valid intake")
}

pub(super) fn patient_with(specialty: &str, adjust: impl FnOnce(&mut PatientIntake)) -> Patient {
    let mut raw = intake(specialty);
    adjust(&mut raw);
    raw.into_patient().expect("valid intake")
}

/// Offer located `km_north` kilometres due north of the Recife centroid.
pub(super) fn offer(id: &str, km_north: f64, wait_days: u32) -> FacilityOffer {
    offer_for(id, "Cardiologia", km_north, wait_days)
}

pub(super) fn offer_for(id: &str, specialty: &str, km_north: f64, wait_days: u32) -> FacilityOffer {
    let origin = recife();
    let lat = origin.lat + km_north / 111.195;
    FacilityOffer {
        facility_id: FacilityId(id.to_string()),
        facility_name: format!("UPAE {id}"),
        unit_name: format!("Unidade {id}"),
        municipality: "Recife".to_string(),
        address: format!("Rua {id}, 10 - Recife - PE"),
        coordinates: Some(Coordinates::new(lat, origin.lng)),
        specialty: specialty.to_string(),
        wait_days,
        available_slots: 5,
    }
}

pub(super) fn route(distance_km: f64, transfers: u32) -> RouteObservation {
    RouteObservation {
        distance_km,
        transfers,
        travel_time: format!("{} min", (distance_km * 3.0).round()),
    }
}

pub(super) fn ranker() -> AllocationRanker {
    AllocationRanker::new(ScoringConfig::default()).expect("default config is valid")
}

pub(super) fn scorer() -> OfferScorer {
    OfferScorer::new(ScoringConfig::default()).expect("default config is valid")
}

pub(super) fn build_service<R>(router: R) -> AllocationService<MunicipalityGeocoder, R>
where
    R: TransitRouter + 'static,
{
    AllocationService::new(
        Arc::new(MunicipalityGeocoder::pernambuco()),
        Arc::new(router),
        Arc::new(FacilityDirectory::standard()),
        ScoringConfig::default(),
    )
    .expect("default config is valid")
    .with_route_timeout(Duration::from_millis(200))
}

/// Router returning the same observation for every trip.
pub(super) struct StaticRouter {
    pub(super) route: RouteObservation,
    pub(super) calls: AtomicUsize,
}

impl StaticRouter {
    pub(super) fn new(route: RouteObservation) -> Self {
        Self {
            route,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TransitRouter for StaticRouter {
    fn route(
        &self,
        _origin: Coordinates,
        _destination: Coordinates,
    ) -> Result<RouteObservation, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.route.clone())
    }
}

pub(super) struct UnavailableRouter;

impl TransitRouter for UnavailableRouter {
    fn route(
        &self,
        _origin: Coordinates,
        _destination: Coordinates,
    ) -> Result<RouteObservation, RoutingError> {
        Err(RoutingError::Unavailable("maps quota exhausted".to_string()))
    }
}

pub(super) struct SlowRouter {
    pub(super) delay: Duration,
}

impl TransitRouter for SlowRouter {
    fn route(
        &self,
        _origin: Coordinates,
        _destination: Coordinates,
    ) -> Result<RouteObservation, RoutingError> {
        std::thread::sleep(self.delay);
        Ok(route(1.0, 1))
    }
}

pub(super) struct UnknownGeocoder;

impl Geocoder for UnknownGeocoder {
    fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        Err(GeocodeError::NotFound(address.to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
