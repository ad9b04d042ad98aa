use super::domain::{Patient, SeverityLevel, VulnerabilityLevel};
use super::text::fold;

pub const DEFAULT_BASE_RATE: f64 = 0.30;
pub const MAX_NO_SHOW_PROBABILITY: f64 = 0.95;

const REFERENCE_DISTANCE_KM: f64 = 30.0;
const DISTANCE_SENSITIVITY: f64 = 0.02;
const TRANSPORT_SENSITIVITY: f64 = 0.5;
/// Share of the distance penalty and transport barrier removed for TFD patients.
const TFD_RELIEF: f64 = 0.7;

/// Estimates the probability that a patient misses an appointment at an offer.
///
/// The estimate is informational: it is reported next to each score and in the
/// explanation, but never changes ranking.
#[derive(Debug, Clone)]
pub struct NoShowRiskEstimator {
    base_rates: Vec<(&'static str, f64)>,
    default_rate: f64,
}

impl NoShowRiskEstimator {
    /// Observed base rates for specialties offered in the Recife network.
    pub fn standard() -> Self {
        Self {
            base_rates: vec![
                ("cardiologia", 0.05),
                ("endocrinologia", 0.40),
                ("ortopedia", 0.25),
                ("dermatologia", 0.20),
                ("alergologia", 0.15),
                ("angiologia", 0.10),
                ("gastroenterologia", 0.15),
                ("geriatria", 0.10),
                ("infectologia", 0.08),
                ("nefrologia", 0.12),
                ("neurologia", 0.18),
                ("oftalmologia", 0.22),
                ("otorrinolaringologia", 0.20),
                ("pneumologia", 0.12),
                ("psiquiatria", 0.35),
                ("reumatologia", 0.15),
                ("urologia", 0.18),
                ("colposcopia", 0.20),
                ("pediatria", 0.15),
                ("endocrinologia infantil", 0.20),
                ("neuropediatria", 0.18),
                ("psiquiatria infantil", 0.25),
                ("cirurgia geral", 0.10),
                ("mastologia", 0.12),
                ("radiologia", 0.05),
                ("anestesiologia", 0.05),
                ("nutricao", 0.15),
                ("psicologia", 0.10),
                ("fisioterapia", 0.12),
                ("fonoaudiologia", 0.15),
                ("terapia ocupacional", 0.12),
                ("enfermagem", 0.05),
                ("servico social", 0.05),
                ("farmacia", 0.05),
                ("estomaterapia", 0.08),
                ("educacao fisica", 0.10),
                ("odontologia", 0.15),
                ("psicopedagogia", 0.12),
            ],
            default_rate: DEFAULT_BASE_RATE,
        }
    }

    pub fn base_rate(&self, specialty: &str) -> f64 {
        let key = fold(specialty.trim());
        self.base_rates
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, rate)| *rate)
            .unwrap_or(self.default_rate)
    }

    /// `transport_quality` is the offer's transit quality in [0, 1].
    pub fn estimate(&self, patient: &Patient, distance_km: f64, transport_quality: f64) -> f64 {
        let (transport_score, distance_sensitivity) = if patient.is_long_distance_eligible() {
            (
                (transport_quality + TFD_RELIEF).min(1.0),
                DISTANCE_SENSITIVITY * (1.0 - TFD_RELIEF),
            )
        } else {
            (transport_quality, DISTANCE_SENSITIVITY)
        };

        let severity = patient.severity();
        let adjusted_base = self.base_rate(patient.specialty()) * severity_multiplier(severity);
        let probability = adjusted_base
            * (1.0 + distance_sensitivity * (distance_km.max(0.0) / REFERENCE_DISTANCE_KM))
            * (1.0 - TRANSPORT_SENSITIVITY * transport_score)
            * vulnerability_multiplier(patient.vulnerability(), severity);

        if probability.is_finite() {
            probability.clamp(0.0, MAX_NO_SHOW_PROBABILITY)
        } else {
            MAX_NO_SHOW_PROBABILITY
        }
    }
}

impl Default for NoShowRiskEstimator {
    fn default() -> Self {
        Self::standard()
    }
}

fn severity_multiplier(severity: SeverityLevel) -> f64 {
    match severity {
        SeverityLevel::Routine => 1.4,
        SeverityLevel::Moderate => 1.0,
        SeverityLevel::Urgent => 0.5,
    }
}

// Vulnerable patients with non-urgent cases miss the most appointments.
fn vulnerability_multiplier(vulnerability: VulnerabilityLevel, severity: SeverityLevel) -> f64 {
    use SeverityLevel::*;
    use VulnerabilityLevel::*;

    match (vulnerability, severity) {
        (Low, Routine) => 0.9,
        (Low, Moderate) => 0.85,
        (Low, Urgent) => 0.8,
        (Medium, Routine) => 1.1,
        (Medium, Moderate) => 1.0,
        (Medium, Urgent) => 0.9,
        (High, Routine) => 1.5,
        (High, Moderate) => 1.2,
        (High, Urgent) => 1.0,
    }
}
