use serde::{Deserialize, Serialize};

use super::domain::Patient;

const ELDERLY_MIN_AGE: u16 = 65;
const CHILD_MAX_AGE: u16 = 12;

/// Care priority groups recognised by the allocation rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityCategory {
    Urgent,
    Elderly,
    Pregnant,
    Child,
    Disability,
    Normal,
}

impl PriorityCategory {
    pub fn weight(self) -> u8 {
        match self {
            PriorityCategory::Urgent => 5,
            PriorityCategory::Elderly | PriorityCategory::Pregnant => 4,
            PriorityCategory::Child | PriorityCategory::Disability => 3,
            PriorityCategory::Normal => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriorityCategory::Urgent => "Urgent case",
            PriorityCategory::Elderly => "Elderly patient (65+)",
            PriorityCategory::Pregnant => "Pregnant patient",
            PriorityCategory::Child => "Child (0-12)",
            PriorityCategory::Disability => "Person with disability",
            PriorityCategory::Normal => "Standard care",
        }
    }
}

/// Priority applied to a patient's scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    pub category: PriorityCategory,
    pub weight: u8,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        self.category.label()
    }

    pub fn is_elevated(&self) -> bool {
        self.weight > 1
    }
}

impl From<PriorityCategory> for Priority {
    fn from(category: PriorityCategory) -> Self {
        Self {
            category,
            weight: category.weight(),
        }
    }
}

pub struct PriorityClassifier;

impl PriorityClassifier {
    /// First matching rule wins: urgency, then age 65+, pregnancy, age 12 or
    /// younger, disability.
    pub fn classify(patient: &Patient) -> Priority {
        let category = if patient.is_urgent() {
            PriorityCategory::Urgent
        } else if patient.age() >= ELDERLY_MIN_AGE {
            PriorityCategory::Elderly
        } else if patient.is_pregnant() {
            PriorityCategory::Pregnant
        } else if patient.age() <= CHILD_MAX_AGE {
            PriorityCategory::Child
        } else if patient.has_disability() {
            PriorityCategory::Disability
        } else {
            PriorityCategory::Normal
        };

        Priority::from(category)
    }
}
