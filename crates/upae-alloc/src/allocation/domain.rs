use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::text::fold;

/// Identifier wrapper for patients entering the allocation flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(pub String);

/// Identifier wrapper for facilities listed in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacilityId(pub String);

static PATIENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_patient_id() -> PatientId {
    let id = PATIENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PatientId(format!("pac-{id:06}"))
}

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Gender identities offered by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenderIdentity {
    HomemCis,
    MulherCis,
    HomemTrans,
    MulherTrans,
    Outro,
}

impl GenderIdentity {
    pub fn ordered() -> [GenderIdentity; 5] {
        [
            GenderIdentity::HomemCis,
            GenderIdentity::MulherCis,
            GenderIdentity::HomemTrans,
            GenderIdentity::MulherTrans,
            GenderIdentity::Outro,
        ]
    }

    pub fn value(self) -> &'static str {
        match self {
            GenderIdentity::HomemCis => "homem-cis",
            GenderIdentity::MulherCis => "mulher-cis",
            GenderIdentity::HomemTrans => "homem-trans",
            GenderIdentity::MulherTrans => "mulher-trans",
            GenderIdentity::Outro => "outro",
        }
    }

    /// Collapse the identity into the category used by specialty rules.
    ///
    /// `Outro` maps to [`SexCategory::Both`], which leaves every sex-restricted
    /// specialty open to the patient.
    pub fn sex_category(self) -> SexCategory {
        match self {
            GenderIdentity::HomemCis | GenderIdentity::HomemTrans => SexCategory::Masculine,
            GenderIdentity::MulherCis | GenderIdentity::MulherTrans => SexCategory::Feminine,
            GenderIdentity::Outro => SexCategory::Both,
        }
    }
}

impl fmt::Display for GenderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gender identity '{0}' (expected homem-cis, mulher-cis, homem-trans, mulher-trans or outro)")]
pub struct UnknownGenderIdentity(pub String);

impl FromStr for GenderIdentity {
    type Err = UnknownGenderIdentity;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        GenderIdentity::ordered()
            .into_iter()
            .find(|identity| identity.value() == normalized)
            .ok_or_else(|| UnknownGenderIdentity(raw.to_string()))
    }
}

/// Sex category evaluated by eligibility rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SexCategory {
    Masculine,
    Feminine,
    Both,
}

impl SexCategory {
    pub fn label(self) -> &'static str {
        match self {
            SexCategory::Masculine => "masculine",
            SexCategory::Feminine => "feminine",
            SexCategory::Both => "both",
        }
    }
}

/// Triage colour reported by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    #[serde(alias = "verde")]
    Routine,
    #[default]
    #[serde(alias = "amarelo")]
    Moderate,
    #[serde(alias = "vermelho")]
    Urgent,
}

impl SeverityLevel {
    pub fn label(self) -> &'static str {
        match self {
            SeverityLevel::Routine => "Routine",
            SeverityLevel::Moderate => "Moderate",
            SeverityLevel::Urgent => "Urgent",
        }
    }
}

impl FromStr for SeverityLevel {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "routine" | "verde" => Ok(SeverityLevel::Routine),
            "moderate" | "amarelo" => Ok(SeverityLevel::Moderate),
            "urgent" | "vermelho" => Ok(SeverityLevel::Urgent),
            other => Err(format!(
                "unknown severity '{other}' (expected routine, moderate or urgent)"
            )),
        }
    }
}

/// Social vulnerability bucket used by the no-show estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VulnerabilityLevel {
    #[serde(alias = "baixa")]
    Low,
    #[default]
    #[serde(alias = "media")]
    Medium,
    #[serde(alias = "alta")]
    High,
}

impl FromStr for VulnerabilityLevel {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" | "baixa" => Ok(VulnerabilityLevel::Low),
            "medium" | "media" => Ok(VulnerabilityLevel::Medium),
            "high" | "alta" => Ok(VulnerabilityLevel::High),
            other => Err(format!(
                "unknown vulnerability '{other}' (expected low, medium or high)"
            )),
        }
    }
}

/// Raw patient data as submitted by the intake form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientIntake {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub national_id: String,
    pub gender: GenderIdentity,
    pub age: u16,
    pub specialty: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub municipality: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub pregnant: bool,
    #[serde(default)]
    pub has_disability: bool,
    #[serde(default)]
    pub long_distance_eligible: bool,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub severity: SeverityLevel,
    #[serde(default)]
    pub vulnerability: VulnerabilityLevel,
    #[serde(default)]
    pub condition: String,
}

pub const MAX_PATIENT_AGE: u16 = 150;
const MIN_NAME_LENGTH: usize = 3;

/// Validation errors raised while turning an intake into a [`Patient`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatientValidationError {
    #[error("age {0} is outside the accepted range 0-150")]
    AgeOutOfRange(u16),
    #[error("patient name must have at least 3 characters")]
    NameTooShort,
    #[error("national id '{0}' is not a valid CPF")]
    InvalidNationalId(String),
    #[error("requested specialty must not be empty")]
    MissingSpecialty,
    #[error("patient coordinates were already resolved for this request")]
    CoordinatesAlreadySet,
}

impl PatientIntake {
    /// Validate the intake and produce an immutable patient record.
    pub fn into_patient(self) -> Result<Patient, PatientValidationError> {
        if self.age > MAX_PATIENT_AGE {
            return Err(PatientValidationError::AgeOutOfRange(self.age));
        }

        let name = self.name.trim().to_string();
        if name.chars().count() < MIN_NAME_LENGTH {
            return Err(PatientValidationError::NameTooShort);
        }

        let national_id = self.national_id.trim().to_string();
        if !national_id.is_empty() && !is_valid_cpf(&national_id) {
            return Err(PatientValidationError::InvalidNationalId(national_id));
        }

        let specialty = self.specialty.trim().to_string();
        if specialty.is_empty() {
            return Err(PatientValidationError::MissingSpecialty);
        }

        let id = match self.id {
            Some(id) if !id.trim().is_empty() => PatientId(id.trim().to_string()),
            _ => next_patient_id(),
        };

        Ok(Patient {
            id,
            name,
            national_id,
            gender: self.gender,
            age: self.age,
            specialty,
            address: self.address.trim().to_string(),
            municipality: self.municipality.trim().to_string(),
            coordinates: self.coordinates,
            pregnant: self.pregnant,
            has_disability: self.has_disability,
            long_distance_eligible: self.long_distance_eligible,
            urgent: self.urgent,
            severity: self.severity,
            vulnerability: self.vulnerability,
            condition: self.condition.trim().to_string(),
        })
    }
}

/// Check the two CPF verification digits.
pub fn is_valid_cpf(raw: &str) -> bool {
    let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 || raw.chars().any(|c| c.is_alphabetic()) {
        return false;
    }
    if digits.iter().all(|digit| *digit == digits[0]) {
        return false;
    }

    let check = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(idx, digit)| digit * (len as u32 + 1 - idx as u32))
            .sum();
        let rest = (sum * 10) % 11;
        if rest == 10 {
            0
        } else {
            rest
        }
    };

    check(9) == digits[9] && check(10) == digits[10]
}

/// Validated patient taking part in one allocation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patient {
    id: PatientId,
    name: String,
    national_id: String,
    gender: GenderIdentity,
    age: u16,
    specialty: String,
    address: String,
    municipality: String,
    coordinates: Option<Coordinates>,
    pregnant: bool,
    has_disability: bool,
    long_distance_eligible: bool,
    urgent: bool,
    severity: SeverityLevel,
    vulnerability: VulnerabilityLevel,
    condition: String,
}

impl Patient {
    pub fn id(&self) -> &PatientId {
        &self.id
    }

    pub fn gender(&self) -> GenderIdentity {
        self.gender
    }

    pub fn sex_category(&self) -> SexCategory {
        self.gender.sex_category()
    }

    pub fn age(&self) -> u16 {
        self.age
    }

    pub fn specialty(&self) -> &str {
        &self.specialty
    }

    pub fn municipality(&self) -> &str {
        &self.municipality
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    pub fn is_pregnant(&self) -> bool {
        self.pregnant
    }

    pub fn has_disability(&self) -> bool {
        self.has_disability
    }

    pub fn is_long_distance_eligible(&self) -> bool {
        self.long_distance_eligible
    }

    pub fn is_urgent(&self) -> bool {
        self.urgent
    }

    pub fn severity(&self) -> SeverityLevel {
        self.severity
    }

    pub fn vulnerability(&self) -> VulnerabilityLevel {
        self.vulnerability
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Best free-text location available for geocoding.
    pub fn location_query(&self) -> &str {
        if self.address.is_empty() {
            &self.municipality
        } else {
            &self.address
        }
    }

    /// Attach geocoded coordinates; they cannot change once set.
    pub fn locate(mut self, coordinates: Coordinates) -> Result<Self, PatientValidationError> {
        if self.coordinates.is_some() {
            return Err(PatientValidationError::CoordinatesAlreadySet);
        }
        self.coordinates = Some(coordinates);
        Ok(self)
    }
}

/// One allocation candidate: a facility offering the requested specialty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityOffer {
    pub facility_id: FacilityId,
    pub facility_name: String,
    pub unit_name: String,
    pub municipality: String,
    pub address: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    pub specialty: String,
    pub wait_days: u32,
    #[serde(default)]
    pub available_slots: u32,
}

impl FacilityOffer {
    pub fn offers_specialty(&self, specialty: &str) -> bool {
        fold(&self.specialty) == fold(specialty)
    }

    pub fn location_label(&self) -> String {
        format!("{} - {}", self.municipality, self.unit_name)
    }

    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }
}

/// Whether transfer counts came from a routing provider or the distance heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportSource {
    Measured,
    Heuristic,
}

/// Travel metrics derived for one patient/offer pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportEstimate {
    pub distance_km: f64,
    pub cost: f64,
    pub transfers: u32,
    pub travel_time: String,
    pub source: TransportSource,
}
