use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::Patient;
use super::scoring::{ScoreBreakdown, ScoredOffer, ScoringWeights};

const EXPLANATION_TITLE: &str = "Why was this allocation chosen?";
const EXPLANATION_SUMMARY: &str =
    "This is the best option considering distance, cost, waiting time and public transport.";
const ALGORITHM_NOTE: &str = "Multi-criteria optimisation with configurable weights";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    Distance,
    Wait,
    Cost,
    Transport,
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorTone {
    Positive,
    Neutral,
    Negative,
    Info,
}

/// One human-readable statement about the chosen offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationFactor {
    pub kind: FactorKind,
    pub tone: FactorTone,
    pub text: String,
}

/// Configured weights rendered as percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transparency {
    pub algorithm: String,
    pub distance: String,
    pub wait: String,
    pub cost: String,
    pub transport: String,
}

/// Display-ready summary of the chosen offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferComparison {
    pub location: String,
    pub facility_name: String,
    pub distance: String,
    pub travel_time: String,
    pub wait: String,
    pub cost: String,
    pub total_score: String,
    pub no_show_risk: String,
    pub expected_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationBlock {
    pub title: String,
    pub summary: String,
    pub factors: Vec<ExplanationFactor>,
    pub transparency: Transparency,
    pub comparison: Option<OfferComparison>,
}

/// Builds the explanation shown next to the chosen offer.
#[derive(Debug, Clone)]
pub struct ExplanationGenerator {
    weights: ScoringWeights,
}

impl ExplanationGenerator {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn explain(
        &self,
        patient: &Patient,
        chosen: &ScoredOffer,
        reference_date: Option<NaiveDate>,
    ) -> ExplanationBlock {
        tracing::debug!(
            patient = %patient.id().0,
            facility = %chosen.offer().facility_id.0,
            "building allocation explanation"
        );

        let (factors, comparison) = match chosen.breakdown() {
            Some(breakdown) => (
                factors(breakdown),
                Some(comparison(chosen, breakdown, reference_date)),
            ),
            None => (Vec::new(), None),
        };

        ExplanationBlock {
            title: EXPLANATION_TITLE.to_string(),
            summary: EXPLANATION_SUMMARY.to_string(),
            factors,
            transparency: self.transparency(),
            comparison,
        }
    }

    pub fn transparency(&self) -> Transparency {
        Transparency {
            algorithm: ALGORITHM_NOTE.to_string(),
            distance: percent(self.weights.distance),
            wait: percent(self.weights.wait),
            cost: percent(self.weights.cost),
            transport: percent(self.weights.transport),
        }
    }
}

fn factors(breakdown: &ScoreBreakdown) -> Vec<ExplanationFactor> {
    let factor = |kind, tone, text: String| ExplanationFactor { kind, tone, text };
    let mut factors = Vec::with_capacity(5);

    let distance = breakdown.distance_km;
    factors.push(if distance < 20.0 {
        factor(
            FactorKind::Distance,
            FactorTone::Positive,
            format!("Very favourable distance: only {distance:.1} km"),
        )
    } else if distance < 50.0 {
        factor(
            FactorKind::Distance,
            FactorTone::Neutral,
            format!("Moderate distance: {distance:.1} km"),
        )
    } else {
        factor(
            FactorKind::Distance,
            FactorTone::Negative,
            format!("Considerable distance: {distance:.1} km"),
        )
    });

    let wait = breakdown.wait_days;
    factors.push(match wait {
        0..=7 => factor(
            FactorKind::Wait,
            FactorTone::Positive,
            format!("Appointment within {wait} days"),
        ),
        8..=15 => factor(
            FactorKind::Wait,
            FactorTone::Neutral,
            format!("Waiting time: {wait} days"),
        ),
        _ => factor(
            FactorKind::Wait,
            FactorTone::Negative,
            format!("Waiting time: {wait} days"),
        ),
    });

    let cost = breakdown.cost;
    factors.push(if cost <= 10.0 {
        factor(
            FactorKind::Cost,
            FactorTone::Positive,
            format!("Affordable transport cost: R$ {cost:.2}"),
        )
    } else {
        factor(
            FactorKind::Cost,
            FactorTone::Neutral,
            format!("Estimated transport cost: R$ {cost:.2}"),
        )
    });

    factors.push(if breakdown.transfers <= 1 {
        factor(
            FactorKind::Transport,
            FactorTone::Positive,
            "Direct transport or at most 1 transfer".to_string(),
        )
    } else {
        factor(
            FactorKind::Transport,
            FactorTone::Neutral,
            format!("{} transfers required", breakdown.transfers),
        )
    });

    if breakdown.priority.is_elevated() {
        factors.push(factor(
            FactorKind::Priority,
            FactorTone::Info,
            format!("Priority patient: {}", breakdown.priority.label()),
        ));
    }

    factors
}

fn comparison(
    chosen: &ScoredOffer,
    breakdown: &ScoreBreakdown,
    reference_date: Option<NaiveDate>,
) -> OfferComparison {
    let offer = chosen.offer();
    OfferComparison {
        location: offer.location_label(),
        facility_name: offer.facility_name.clone(),
        distance: format!("{:.1} km", breakdown.distance_km),
        travel_time: breakdown.travel_time.clone(),
        wait: format!("{} days", breakdown.wait_days),
        cost: format!("R$ {:.2}", breakdown.cost),
        total_score: format!("{:.3}", chosen.score()),
        no_show_risk: percent(breakdown.no_show_risk),
        expected_date: reference_date.and_then(|date| {
            date.checked_add_days(Days::new(u64::from(breakdown.wait_days)))
        }),
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}
