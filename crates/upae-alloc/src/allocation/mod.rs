//! Patient-to-UPAE allocation: scoring, ranking, eligibility and explanation.
//!
//! A request flows through the eligibility filter, optional geocoding and
//! transit routing, then the ranker, which scores every offer, keeps the
//! feasible ones and explains the winner.

pub mod collaborators;
pub mod conditions;
pub mod directory;
pub mod domain;
pub mod eligibility;
pub mod explanation;
pub mod geo;
pub mod no_show;
pub mod priority;
pub mod ranking;
pub mod router;
pub mod scoring;
pub mod service;
pub mod transport;
mod text;

#[cfg(test)]
mod tests;

pub use collaborators::{
    GeocodeError, Geocoder, MunicipalityGeocoder, RouteObservation, RoutingError, TransitRouter,
};
pub use conditions::{ConditionCatalog, ConditionMatch, OTHER_CONDITION};
pub use directory::{DirectoryImportError, FacilityDirectory};
pub use domain::{
    Coordinates, FacilityId, FacilityOffer, GenderIdentity, Patient, PatientId, PatientIntake,
    PatientValidationError, SeverityLevel, SexCategory, TransportEstimate, TransportSource,
    VulnerabilityLevel,
};
pub use eligibility::{
    EligibilityRule, EligibilityRuleTable, EligibilityViolation, EligibleSpecialties,
    SpecialtyEligibilityFilter,
};
pub use explanation::{
    ExplanationBlock, ExplanationFactor, ExplanationGenerator, FactorKind, FactorTone,
    OfferComparison, Transparency,
};
pub use geo::{DistanceEstimator, GeoError};
pub use no_show::NoShowRiskEstimator;
pub use priority::{Priority, PriorityCategory, PriorityClassifier};
pub use ranking::{AllocationFailure, AllocationRanker, AllocationResult, Candidate};
pub use router::allocation_router;
pub use scoring::{
    OfferAssessment, OfferScorer, ScoreBreakdown, ScoredOffer, ScoringConfig, ScoringConfigError,
    ScoringWeights, SENTINEL_SCORE,
};
pub use service::{
    AllocationRequest, AllocationService, AllocationServiceError, EligibilityQuery,
    DEFAULT_ROUTE_TIMEOUT,
};
pub use transport::{FareTable, TransportCostEstimator, TransportError};
