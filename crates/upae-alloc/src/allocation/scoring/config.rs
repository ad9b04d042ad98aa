use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Relative importance of each criterion in the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub distance: f64,
    pub wait: f64,
    pub cost: f64,
    pub transport: f64,
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.distance + self.wait + self.cost + self.transport
    }

    fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("distance", self.distance),
            ("wait", self.wait),
            ("cost", self.cost),
            ("transport", self.transport),
        ]
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            distance: 0.4,
            wait: 0.3,
            cost: 0.2,
            transport: 0.1,
        }
    }
}

/// Rubric configuration for offer scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub max_distance_km: f64,
    pub max_wait_days: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            max_distance_km: 100.0,
            max_wait_days: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("weight '{name}' must be a finite non-negative number, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },
    #[error("scoring weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f64 },
    #[error("limit '{name}' must be positive, got {value}")]
    InvalidLimit { name: &'static str, value: f64 },
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        for (name, value) in self.weights.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringConfigError::InvalidWeight { name, value });
            }
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringConfigError::WeightSum { sum });
        }

        for (name, value) in [
            ("max_distance_km", self.max_distance_km),
            ("max_wait_days", self.max_wait_days),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScoringConfigError::InvalidLimit { name, value });
            }
        }

        Ok(())
    }
}
