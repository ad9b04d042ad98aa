mod config;
mod rules;

pub use config::{ScoringConfig, ScoringConfigError, ScoringWeights};
pub use rules::{transport_quality, COST_CEILING};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::collaborators::RouteObservation;
use super::domain::{FacilityOffer, Patient, TransportSource};
use super::geo::DistanceEstimator;
use super::no_show::NoShowRiskEstimator;
use super::priority::{Priority, PriorityClassifier};
use super::transport::{TransportCostEstimator, TransportError, TripDistance};

/// Score given to offers that could not be evaluated.
pub const SENTINEL_SCORE: f64 = 999.0;

/// Stateless scorer applying the rubric to one patient/offer pair.
#[derive(Debug, Clone)]
pub struct OfferScorer {
    config: ScoringConfig,
    transport: TransportCostEstimator,
    no_show: NoShowRiskEstimator,
}

impl OfferScorer {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringConfigError> {
        Self::with_estimators(
            config,
            TransportCostEstimator::default(),
            NoShowRiskEstimator::default(),
        )
    }

    pub fn with_estimators(
        config: ScoringConfig,
        transport: TransportCostEstimator,
        no_show: NoShowRiskEstimator,
    ) -> Result<Self, ScoringConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            no_show,
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score using straight-line distance between the stored coordinates.
    pub fn score(&self, patient: &Patient, offer: FacilityOffer) -> ScoredOffer {
        self.score_with_route(patient, offer, None)
    }

    /// Score an offer, preferring a measured transit route when one is supplied.
    ///
    /// Failures never propagate: the offer comes back infeasible with
    /// [`SENTINEL_SCORE`] and the failure reason.
    pub fn score_with_route(
        &self,
        patient: &Patient,
        offer: FacilityOffer,
        route: Option<&RouteObservation>,
    ) -> ScoredOffer {
        let priority = PriorityClassifier::classify(patient);
        match self.breakdown(patient, &offer, route, priority) {
            Ok(breakdown) => {
                let score = rules::apply_priority(breakdown.raw_score, &priority);
                let feasible =
                    rules::is_feasible(breakdown.distance_km, breakdown.wait_days, &self.config);
                debug!(
                    facility = %offer.facility_id.0,
                    score,
                    feasible,
                    "offer scored"
                );
                ScoredOffer {
                    offer,
                    score,
                    feasible,
                    assessment: OfferAssessment::Scored(breakdown),
                }
            }
            Err(error) => {
                debug!(facility = %offer.facility_id.0, %error, "offer could not be scored");
                ScoredOffer::unroutable(offer, error.to_string())
            }
        }
    }

    fn breakdown(
        &self,
        patient: &Patient,
        offer: &FacilityOffer,
        route: Option<&RouteObservation>,
        priority: Priority,
    ) -> Result<ScoreBreakdown, TransportError> {
        let trip = match (route, patient.coordinates(), offer.coordinates) {
            (Some(route), _, _) => TripDistance::Routed(route),
            (None, Some(from), Some(to)) => {
                TripDistance::StraightLine(DistanceEstimator::km(from, to)?)
            }
            _ => TripDistance::Unknown,
        };

        let transport = self
            .transport
            .estimate(trip, patient.municipality(), &offer.municipality)?;

        let metrics = rules::normalize(&transport, offer.wait_days, &self.config);
        let raw_score = rules::raw_score(&metrics, &self.config);
        let no_show_risk =
            self.no_show
                .estimate(patient, transport.distance_km, metrics.transport_quality);

        Ok(ScoreBreakdown {
            distance_km: transport.distance_km,
            wait_days: offer.wait_days,
            cost: transport.cost,
            transfers: transport.transfers,
            travel_time: transport.travel_time,
            transport_source: transport.source,
            distance_norm: metrics.distance,
            wait_norm: metrics.wait,
            cost_norm: metrics.cost,
            transport_quality: metrics.transport_quality,
            raw_score,
            priority,
            no_show_risk,
        })
    }
}

/// Per-criterion audit trail behind a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub distance_km: f64,
    pub wait_days: u32,
    pub cost: f64,
    pub transfers: u32,
    pub travel_time: String,
    pub transport_source: TransportSource,
    pub distance_norm: f64,
    pub wait_norm: f64,
    pub cost_norm: f64,
    pub transport_quality: f64,
    pub raw_score: f64,
    pub priority: Priority,
    pub no_show_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OfferAssessment {
    Scored(ScoreBreakdown),
    Unroutable { reason: String },
}

/// Offer paired with its final score. Lower scores are better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredOffer {
    offer: FacilityOffer,
    score: f64,
    feasible: bool,
    assessment: OfferAssessment,
}

impl ScoredOffer {
    pub(crate) fn unroutable(offer: FacilityOffer, reason: String) -> Self {
        Self {
            offer,
            score: SENTINEL_SCORE,
            feasible: false,
            assessment: OfferAssessment::Unroutable { reason },
        }
    }

    pub fn offer(&self) -> &FacilityOffer {
        &self.offer
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    pub fn assessment(&self) -> &OfferAssessment {
        &self.assessment
    }

    pub fn breakdown(&self) -> Option<&ScoreBreakdown> {
        match &self.assessment {
            OfferAssessment::Scored(breakdown) => Some(breakdown),
            OfferAssessment::Unroutable { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.assessment {
            OfferAssessment::Scored(_) => None,
            OfferAssessment::Unroutable { reason } => Some(reason),
        }
    }
}
