use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::collaborators::RouteObservation;
use super::domain::{FacilityOffer, Patient};
use super::explanation::{ExplanationBlock, ExplanationGenerator};
use super::scoring::{OfferScorer, ScoredOffer, ScoringConfig, ScoringConfigError};

pub const MAX_ALTERNATIVES: usize = 3;

/// Offer to rank, with the transit route measured for it when available.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub offer: FacilityOffer,
    pub route: Option<RouteObservation>,
}

impl From<FacilityOffer> for Candidate {
    fn from(offer: FacilityOffer) -> Self {
        Self { offer, route: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum AllocationFailure {
    #[error("no viable allocation")]
    NoViableAllocation,
}

/// Outcome of one allocation request.
///
/// On success `evaluated` holds the ranked feasible offers; on failure it holds
/// every scored offer so callers can see why nothing qualified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    success: bool,
    best: Option<ScoredOffer>,
    alternatives: Vec<ScoredOffer>,
    explanation: Option<ExplanationBlock>,
    failure: Option<AllocationFailure>,
    failure_reason: Option<String>,
    evaluated: Vec<ScoredOffer>,
}

impl AllocationResult {
    fn failed(failure: AllocationFailure, evaluated: Vec<ScoredOffer>) -> Self {
        Self {
            success: false,
            best: None,
            alternatives: Vec::new(),
            explanation: None,
            failure: Some(failure),
            failure_reason: Some(failure.to_string()),
            evaluated,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn best(&self) -> Option<&ScoredOffer> {
        self.best.as_ref()
    }

    pub fn alternatives(&self) -> &[ScoredOffer] {
        &self.alternatives
    }

    pub fn explanation(&self) -> Option<&ExplanationBlock> {
        self.explanation.as_ref()
    }

    pub fn failure(&self) -> Option<AllocationFailure> {
        self.failure
    }

    pub fn evaluated(&self) -> &[ScoredOffer] {
        &self.evaluated
    }
}

/// Scores, filters and orders offers for a single patient.
#[derive(Debug, Clone)]
pub struct AllocationRanker {
    scorer: OfferScorer,
    explainer: ExplanationGenerator,
}

impl AllocationRanker {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringConfigError> {
        Ok(Self::with_scorer(OfferScorer::new(config)?))
    }

    pub fn with_scorer(scorer: OfferScorer) -> Self {
        let explainer = ExplanationGenerator::new(scorer.config().weights);
        Self { scorer, explainer }
    }

    pub fn scorer(&self) -> &OfferScorer {
        &self.scorer
    }

    /// Rank offers using straight-line distances only.
    pub fn rank(&self, patient: &Patient, offers: Vec<FacilityOffer>) -> AllocationResult {
        let candidates = offers.into_iter().map(Candidate::from).collect();
        self.rank_candidates(patient, candidates, None)
    }

    pub fn rank_candidates(
        &self,
        patient: &Patient,
        candidates: Vec<Candidate>,
        reference_date: Option<NaiveDate>,
    ) -> AllocationResult {
        let scored: Vec<ScoredOffer> = candidates
            .into_iter()
            .filter(|candidate| {
                let matches = candidate.offer.offers_specialty(patient.specialty());
                if !matches {
                    warn!(
                        facility = %candidate.offer.facility_id.0,
                        offered = %candidate.offer.specialty,
                        requested = %patient.specialty(),
                        "dropping offer for a different specialty"
                    );
                }
                matches
            })
            .map(|candidate| {
                self.scorer
                    .score_with_route(patient, candidate.offer, candidate.route.as_ref())
            })
            .collect();

        let total = scored.len();
        let mut feasible: Vec<ScoredOffer> = scored
            .iter()
            .filter(|offer| offer.is_feasible())
            .cloned()
            .collect();

        if feasible.is_empty() {
            info!(
                patient = %patient.id().0,
                evaluated = total,
                "no viable allocation"
            );
            return AllocationResult::failed(AllocationFailure::NoViableAllocation, scored);
        }

        // `sort_by` is stable, so equal scores keep input order.
        feasible.sort_by(|a, b| a.score().total_cmp(&b.score()));

        let best = feasible[0].clone();
        let alternatives: Vec<ScoredOffer> = feasible
            .iter()
            .skip(1)
            .take(MAX_ALTERNATIVES)
            .cloned()
            .collect();
        let explanation = self.explainer.explain(patient, &best, reference_date);

        info!(
            patient = %patient.id().0,
            facility = %best.offer().facility_id.0,
            score = best.score(),
            evaluated = total,
            feasible = feasible.len(),
            "allocation ranked"
        );

        AllocationResult {
            success: true,
            best: Some(best),
            alternatives,
            explanation: Some(explanation),
            failure: None,
            failure_reason: None,
            evaluated: feasible,
        }
    }
}
