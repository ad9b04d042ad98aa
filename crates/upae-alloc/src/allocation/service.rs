use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::collaborators::{Geocoder, RouteObservation, RoutingError, TransitRouter};
use super::conditions::{ConditionCatalog, ConditionMatch};
use super::directory::FacilityDirectory;
use super::domain::{
    Coordinates, FacilityOffer, GenderIdentity, PatientIntake, PatientValidationError,
};
use super::eligibility::{EligibilityViolation, EligibleSpecialties, SpecialtyEligibilityFilter};
use super::geo::GeoError;
use super::ranking::{AllocationRanker, AllocationResult, Candidate};
use super::scoring::{ScoringConfig, ScoringConfigError};

pub const DEFAULT_ROUTE_TIMEOUT: Duration = Duration::from_secs(3);

/// Allocation request as accepted over HTTP and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub patient: PatientIntake,
    /// Explicit candidate offers; the directory is consulted when absent.
    #[serde(default)]
    pub offers: Option<Vec<FacilityOffer>>,
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityQuery {
    pub gender: GenderIdentity,
    pub age: u16,
}

/// Service composing eligibility, geocoding, transit routing and the ranker.
pub struct AllocationService<G, R> {
    geocoder: Arc<G>,
    router: Arc<R>,
    directory: Arc<FacilityDirectory>,
    eligibility: Arc<SpecialtyEligibilityFilter>,
    conditions: Arc<ConditionCatalog>,
    ranker: Arc<AllocationRanker>,
    route_timeout: Duration,
}

impl<G, R> AllocationService<G, R>
where
    G: Geocoder + 'static,
    R: TransitRouter + 'static,
{
    pub fn new(
        geocoder: Arc<G>,
        router: Arc<R>,
        directory: Arc<FacilityDirectory>,
        config: ScoringConfig,
    ) -> Result<Self, ScoringConfigError> {
        let ranker = AllocationRanker::new(config)?;
        Ok(Self {
            geocoder,
            router,
            directory,
            eligibility: Arc::new(SpecialtyEligibilityFilter::default()),
            conditions: Arc::new(ConditionCatalog::standard()),
            ranker: Arc::new(ranker),
            route_timeout: DEFAULT_ROUTE_TIMEOUT,
        })
    }

    pub fn with_route_timeout(mut self, route_timeout: Duration) -> Self {
        self.route_timeout = route_timeout;
        self
    }

    pub fn with_eligibility(mut self, eligibility: SpecialtyEligibilityFilter) -> Self {
        self.eligibility = Arc::new(eligibility);
        self
    }

    pub fn directory(&self) -> &FacilityDirectory {
        &self.directory
    }

    pub fn scoring_config(&self) -> &ScoringConfig {
        self.ranker.scorer().config()
    }

    pub fn route_timeout(&self) -> Duration {
        self.route_timeout
    }

    /// Allocate one patient to the best offer for the requested specialty.
    pub async fn allocate(
        &self,
        request: AllocationRequest,
    ) -> Result<AllocationResult, AllocationServiceError> {
        let AllocationRequest {
            patient,
            offers,
            reference_date,
        } = request;

        let patient = patient.into_patient()?;
        self.eligibility
            .check(patient.gender(), patient.age(), patient.specialty())?;
        if self
            .conditions
            .classify(patient.specialty(), patient.condition())
            == ConditionMatch::FreeText
        {
            debug!(
                patient = %patient.id().0,
                condition = %patient.condition(),
                "condition is not catalogued for the specialty"
            );
        }

        let patient = match patient.coordinates() {
            Some(coordinates) => {
                coordinates.validate()?;
                patient
            }
            None => {
                let deadline = Instant::now() + self.route_timeout;
                let resolved = self.geocode(deadline, patient.location_query()).await;
                match resolved {
                    Some(coordinates) => patient.locate(coordinates)?,
                    None => {
                        warn!(
                            patient = %patient.id().0,
                            "patient location could not be resolved; offers will be unroutable"
                        );
                        patient
                    }
                }
            }
        };

        let offers = match offers {
            Some(offers) => offers,
            None => self.directory.offers_for(patient.specialty()),
        };
        info!(
            patient = %patient.id().0,
            specialty = %patient.specialty(),
            offers = offers.len(),
            "allocation requested"
        );

        let offers = self.locate_offers(offers).await;
        let candidates = self.route_offers(patient.coordinates(), offers).await;

        Ok(self
            .ranker
            .rank_candidates(&patient, candidates, reference_date))
    }

    pub fn eligible_specialties(&self, gender: GenderIdentity, age: u16) -> EligibleSpecialties {
        self.eligibility
            .filter(gender, age, self.directory.specialties())
    }

    pub fn conditions_for(&self, specialty: &str) -> Vec<String> {
        self.conditions.conditions_for(specialty)
    }

    async fn geocode(&self, deadline: Instant, query: &str) -> Option<Coordinates> {
        if query.trim().is_empty() {
            return None;
        }
        let geocoder = Arc::clone(&self.geocoder);
        let owned = query.to_string();
        let handle = tokio::task::spawn_blocking(move || geocoder.geocode(&owned));
        match await_collaborator(deadline, handle, "geocoder").await {
            Some(Ok(coordinates)) if coordinates.validate().is_ok() => Some(coordinates),
            Some(Ok(coordinates)) => {
                warn!(query, ?coordinates, "geocoder returned invalid coordinates");
                None
            }
            Some(Err(error)) => {
                debug!(query, %error, "geocoding failed");
                None
            }
            None => None,
        }
    }

    async fn locate_offers(&self, offers: Vec<FacilityOffer>) -> Vec<FacilityOffer> {
        let deadline = Instant::now() + self.route_timeout;
        let handles: Vec<Option<JoinHandle<_>>> = offers
            .iter()
            .map(|offer| {
                if offer.coordinates.is_some() {
                    return None;
                }
                let geocoder = Arc::clone(&self.geocoder);
                let query = format!("{}, {}", offer.address, offer.municipality);
                Some(tokio::task::spawn_blocking(move || geocoder.geocode(&query)))
            })
            .collect();

        let mut located = Vec::with_capacity(offers.len());
        for (offer, handle) in offers.into_iter().zip(handles) {
            let Some(handle) = handle else {
                located.push(offer);
                continue;
            };
            match await_collaborator(deadline, handle, "geocoder").await {
                Some(Ok(coordinates)) if coordinates.validate().is_ok() => {
                    located.push(offer.with_coordinates(coordinates));
                }
                _ => {
                    warn!(
                        facility = %offer.facility_id.0,
                        "facility location could not be resolved"
                    );
                    located.push(offer);
                }
            }
        }
        located
    }

    // Every route call shares one deadline; failures fall back to the distance heuristic.
    async fn route_offers(
        &self,
        origin: Option<Coordinates>,
        offers: Vec<FacilityOffer>,
    ) -> Vec<Candidate> {
        let deadline = Instant::now() + self.route_timeout;
        let handles: Vec<Option<JoinHandle<Result<RouteObservation, RoutingError>>>> = offers
            .iter()
            .map(|offer| match (origin, offer.coordinates) {
                (Some(origin), Some(destination)) => {
                    let router = Arc::clone(&self.router);
                    Some(tokio::task::spawn_blocking(move || {
                        router.route(origin, destination)
                    }))
                }
                _ => None,
            })
            .collect();

        let mut candidates = Vec::with_capacity(offers.len());
        for (offer, handle) in offers.into_iter().zip(handles) {
            let route = match handle {
                Some(handle) => match await_collaborator(deadline, handle, "transit router").await
                {
                    Some(Ok(route)) => Some(route),
                    Some(Err(error)) => {
                        debug!(
                            facility = %offer.facility_id.0,
                            %error,
                            "routing failed; using distance heuristic"
                        );
                        None
                    }
                    None => None,
                },
                None => None,
            };
            candidates.push(Candidate { offer, route });
        }
        candidates
    }
}

async fn await_collaborator<T>(
    deadline: Instant,
    handle: JoinHandle<T>,
    collaborator: &'static str,
) -> Option<T> {
    match tokio::time::timeout_at(deadline, handle).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(error)) => {
            warn!(collaborator, %error, "collaborator task failed");
            None
        }
        Err(_) => {
            warn!(collaborator, "collaborator call timed out");
            None
        }
    }
}

/// Error raised by the allocation service.
#[derive(Debug, thiserror::Error)]
pub enum AllocationServiceError {
    #[error(transparent)]
    Intake(#[from] PatientValidationError),
    #[error(transparent)]
    Ineligible(#[from] EligibilityViolation),
    #[error(transparent)]
    Coordinates(#[from] GeoError),
}
