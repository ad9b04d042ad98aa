use serde::{Deserialize, Serialize};

use super::domain::{GenderIdentity, SexCategory, MAX_PATIENT_AGE};
use super::text::fold;

/// Sex and age bounds for a specialty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityRule {
    pub sex: SexCategory,
    pub min_age: Option<u16>,
    pub max_age: Option<u16>,
}

impl EligibilityRule {
    pub const UNRESTRICTED: EligibilityRule = EligibilityRule {
        sex: SexCategory::Both,
        min_age: Some(0),
        max_age: Some(MAX_PATIENT_AGE),
    };

    pub fn new(sex: SexCategory, min_age: Option<u16>, max_age: Option<u16>) -> Self {
        Self {
            sex,
            min_age,
            max_age,
        }
    }

    fn permits(
        &self,
        specialty: &str,
        sex: SexCategory,
        age: u16,
    ) -> Result<(), EligibilityViolation> {
        // `Both` on the patient side means the identity is not sex-restricted.
        if self.sex != SexCategory::Both && sex != SexCategory::Both && self.sex != sex {
            return Err(EligibilityViolation::SexRestricted {
                specialty: specialty.to_string(),
                required: self.sex,
            });
        }

        if let Some(min_age) = self.min_age {
            if age < min_age {
                return Err(EligibilityViolation::BelowMinimumAge {
                    specialty: specialty.to_string(),
                    min_age,
                    age,
                });
            }
        }

        if let Some(max_age) = self.max_age {
            if age > max_age {
                return Err(EligibilityViolation::AboveMaximumAge {
                    specialty: specialty.to_string(),
                    max_age,
                    age,
                });
            }
        }

        Ok(())
    }
}

impl Default for EligibilityRule {
    fn default() -> Self {
        Self::UNRESTRICTED
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EligibilityViolation {
    #[error("{specialty} is restricted to {} patients", .required.label())]
    SexRestricted {
        specialty: String,
        required: SexCategory,
    },
    #[error("{specialty} requires a minimum age of {min_age} (patient is {age})")]
    BelowMinimumAge {
        specialty: String,
        min_age: u16,
        age: u16,
    },
    #[error("{specialty} accepts patients up to {max_age} years old (patient is {age})")]
    AboveMaximumAge {
        specialty: String,
        max_age: u16,
        age: u16,
    },
}

/// Specialty name to rule lookup with an unrestricted fallback.
#[derive(Debug, Clone, Default)]
pub struct EligibilityRuleTable {
    rules: Vec<(String, EligibilityRule)>,
}

impl EligibilityRuleTable {
    pub fn standard() -> Self {
        let feminine = |min| EligibilityRule::new(SexCategory::Feminine, Some(min), None);
        let adults_from = |min| EligibilityRule::new(SexCategory::Both, Some(min), None);
        let children_to = |max| EligibilityRule::new(SexCategory::Both, None, Some(max));

        Self::default()
            .with_rule("Colposcopia", feminine(12))
            .with_rule("Ginecologia", feminine(10))
            .with_rule("Mastologia", adults_from(10))
            .with_rule("Pediatria", children_to(13))
            .with_rule("Endocrinologia Infantil", children_to(13))
            .with_rule("Neuropediatria", children_to(13))
            .with_rule("Psiquiatria Infantil", children_to(13))
            .with_rule("Psicopedagogia", children_to(13))
            .with_rule("Geriatria", adults_from(60))
            .with_rule("Endocrinologia", adults_from(14))
            .with_rule("Gastroenterologia", adults_from(14))
            .with_rule("Neurologia", adults_from(14))
            .with_rule("Neurologia Clinica", adults_from(14))
            .with_rule("Psiquiatria", adults_from(14))
    }

    pub fn with_rule(mut self, specialty: &str, rule: EligibilityRule) -> Self {
        let key = fold(specialty);
        self.rules.retain(|(name, _)| *name != key);
        self.rules.push((key, rule));
        self
    }

    pub fn rule_for(&self, specialty: &str) -> EligibilityRule {
        let key = fold(specialty);
        self.rules
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, rule)| *rule)
            .unwrap_or_default()
    }
}

const MULTIDISCIPLINARY: [&str; 12] = [
    "nutricao",
    "psicologia",
    "fisioterapia",
    "fonoaudiologia",
    "terapia ocupacional",
    "enfermagem",
    "servico social",
    "farmacia",
    "estomaterapia",
    "educacao fisica",
    "odontologia",
    "psicopedagogia",
];

pub fn is_multidisciplinary(specialty: &str) -> bool {
    MULTIDISCIPLINARY.contains(&fold(specialty).as_str())
}

/// Specialties a patient may request, split by care team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleSpecialties {
    pub medical: Vec<String>,
    pub multidisciplinary: Vec<String>,
}

impl EligibleSpecialties {
    pub fn contains(&self, specialty: &str) -> bool {
        let key = fold(specialty);
        self.medical
            .iter()
            .chain(&self.multidisciplinary)
            .any(|name| fold(name) == key)
    }

    pub fn len(&self) -> usize {
        self.medical.len() + self.multidisciplinary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct SpecialtyEligibilityFilter {
    table: EligibilityRuleTable,
}

impl SpecialtyEligibilityFilter {
    pub fn new(table: EligibilityRuleTable) -> Self {
        Self { table }
    }

    pub fn rules(&self) -> &EligibilityRuleTable {
        &self.table
    }

    pub fn check(
        &self,
        gender: GenderIdentity,
        age: u16,
        specialty: &str,
    ) -> Result<(), EligibilityViolation> {
        self.table
            .rule_for(specialty)
            .permits(specialty.trim(), gender.sex_category(), age)
    }

    /// Keep the specialties the patient may request, sorted alphabetically
    /// within each team.
    pub fn filter<I, S>(&self, gender: GenderIdentity, age: u16, specialties: I) -> EligibleSpecialties
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut eligible = EligibleSpecialties::default();
        for specialty in specialties {
            let name = specialty.as_ref().trim();
            if name.is_empty() || self.check(gender, age, name).is_err() {
                continue;
            }
            if is_multidisciplinary(name) {
                eligible.multidisciplinary.push(name.to_string());
            } else {
                eligible.medical.push(name.to_string());
            }
        }

        for group in [&mut eligible.medical, &mut eligible.multidisciplinary] {
            group.sort_by_key(|name| fold(name));
            group.dedup_by(|a, b| fold(a) == fold(b));
        }

        eligible
    }
}

impl Default for SpecialtyEligibilityFilter {
    fn default() -> Self {
        Self::new(EligibilityRuleTable::standard())
    }
}
