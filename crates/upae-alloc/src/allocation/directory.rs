use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::{Coordinates, FacilityId, FacilityOffer};
use super::geo::GeoError;
use super::text::fold;

#[derive(Debug)]
pub enum DirectoryImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidCoordinates { line: usize, source: GeoError },
    IncompleteCoordinates { line: usize },
    MissingSpecialty { line: usize },
}

impl std::fmt::Display for DirectoryImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectoryImportError::Io(err) => write!(f, "failed to read facility directory: {}", err),
            DirectoryImportError::Csv(err) => write!(f, "invalid facility CSV data: {}", err),
            DirectoryImportError::InvalidCoordinates { line, source } => {
                write!(f, "row {}: {}", line, source)
            }
            DirectoryImportError::IncompleteCoordinates { line } => write!(
                f,
                "row {}: latitude and longitude must both be present or both empty",
                line
            ),
            DirectoryImportError::MissingSpecialty { line } => {
                write!(f, "row {}: specialty must not be empty", line)
            }
        }
    }
}

impl std::error::Error for DirectoryImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DirectoryImportError::Io(err) => Some(err),
            DirectoryImportError::Csv(err) => Some(err),
            DirectoryImportError::InvalidCoordinates { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DirectoryImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for DirectoryImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

struct UnitListing {
    id: &'static str,
    name: &'static str,
    unit: &'static str,
    municipality: &'static str,
    address: &'static str,
    coordinates: Coordinates,
    base_wait_days: u32,
    specialties: &'static [&'static str],
}

const STANDARD_UNITS: [UnitListing; 5] = [
    UnitListing {
        id: "upae-grande-recife",
        name: "UPAE Grande Recife (Abreu e Lima)",
        unit: "UPAE Grande Recife",
        municipality: "Abreu e Lima",
        address: "BR-101, 285 - Desterro, Abreu e Lima - PE, 53600-000",
        coordinates: Coordinates {
            lat: -7.9086,
            lng: -35.0054,
        },
        base_wait_days: 9,
        specialties: &[
            "Alergologia",
            "Anestesiologia",
            "Cardiologia",
            "Cirurgia Geral",
            "Colposcopia",
            "Dermatologia",
            "Endocrinologia",
            "Endoscopia",
            "Gastroenterologia",
            "Infectologia",
            "Nefrologia",
            "Neurologia Clinica",
            "Otorrinolaringologia",
            "Pneumologia",
            "Radiologia",
            "Reumatologia",
            "Urologia",
            "Nutricao",
            "Psicologia",
            "Fisioterapia",
            "Fonoaudiologia",
            "Terapia Ocupacional",
            "Enfermagem",
            "Servico Social",
            "Farmacia",
        ],
    },
    UnitListing {
        id: "upae-arruda",
        name: "UPAE Arruda (Recife)",
        unit: "UPAE Arruda",
        municipality: "Recife",
        address: "Av. Prof. Jose dos Anjos, s/n - Arruda, Recife - PE, 52171-011",
        coordinates: Coordinates {
            lat: -8.0290,
            lng: -34.8890,
        },
        base_wait_days: 14,
        specialties: &[
            "Reumatologia",
            "Endocrinologia",
            "Cardiologia",
            "Neurologia",
            "Nefrologia",
            "Psiquiatria",
            "Urologia",
            "Pneumologia",
            "Ortopedia",
            "Fisioterapia",
            "Terapia Ocupacional",
            "Nutricao",
            "Psicologia",
            "Enfermagem",
            "Farmacia",
            "Servico Social",
            "Estomaterapia",
        ],
    },
    UnitListing {
        id: "upae-mustardinha",
        name: "UPAE Mustardinha (Recife)",
        unit: "UPAE Mustardinha",
        municipality: "Recife",
        address: "R. Maj. Mario Portela, 279 - Mustardinha, Recife - PE, 50760-090",
        coordinates: Coordinates {
            lat: -8.0780,
            lng: -34.9330,
        },
        base_wait_days: 11,
        specialties: &[
            "Cardiologia",
            "Pediatria",
            "Gastroenterologia Clinica",
            "Endocrinologia Infantil",
            "Pneumologia",
            "Infectologia",
            "Neurologia",
            "Ortopedia",
            "Reumatologia",
            "Otorrinolaringologia",
            "Psiquiatria",
            "Odontologia",
            "Fonoaudiologia",
            "Fisioterapia",
            "Terapia Ocupacional",
            "Nutricao",
            "Psicologia",
            "Enfermagem",
            "Estomaterapia",
            "Servico Social",
        ],
    },
    UnitListing {
        id: "upae-ibura",
        name: "UPAE Ibura (Recife)",
        unit: "UPAE Ibura",
        municipality: "Recife",
        address: "Av. Dois Rios, 170 - Ibura, Recife - PE, 51230-000",
        coordinates: Coordinates {
            lat: -8.1210,
            lng: -34.9390,
        },
        base_wait_days: 7,
        specialties: &[
            "Cardiologia",
            "Pediatria",
            "Gastroenterologia Clinica",
            "Endocrinologia",
            "Pneumologia",
            "Infectologia",
            "Neurologia",
            "Ortopedia",
            "Reumatologia",
            "Otorrinolaringologia",
            "Dermatologia",
            "Oftalmologia",
            "Psiquiatria",
            "Neuropediatria",
            "Psiquiatria Infantil",
            "Fonoaudiologia",
            "Fisioterapia",
            "Terapia Ocupacional",
            "Nutricao",
            "Psicopedagogia",
            "Psicologia",
            "Enfermagem",
            "Estomaterapia",
            "Servico Social",
        ],
    },
    UnitListing {
        id: "upae-r",
        name: "UPAE-R (Recife)",
        unit: "UPAE-R Ipsep",
        municipality: "Recife",
        address: "R. Interna, 801 - Ipsep, Recife - PE, 51350-351",
        coordinates: Coordinates {
            lat: -8.1040,
            lng: -34.9230,
        },
        base_wait_days: 5,
        specialties: &[
            "Geriatria",
            "Reumatologia",
            "Angiologia",
            "Fisioterapia",
            "Terapia Ocupacional",
            "Fonoaudiologia",
            "Nutricao",
            "Psicologia",
            "Educacao Fisica",
        ],
    },
];

/// Wait days derived from the specialty's position in the unit list.
fn listed_wait_days(base: u32, position: usize) -> u32 {
    base + (position as u32 * 3) % 17
}

fn listed_slots(position: usize) -> u32 {
    4 + (position as u32 * 7) % 12
}

/// Facility offers available for allocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityDirectory {
    offers: Vec<FacilityOffer>,
}

impl FacilityDirectory {
    pub fn new(offers: Vec<FacilityOffer>) -> Self {
        Self { offers }
    }

    /// The five UPAEs of the Recife metropolitan region.
    pub fn standard() -> Self {
        let offers = STANDARD_UNITS
            .iter()
            .flat_map(|unit| {
                unit.specialties
                    .iter()
                    .enumerate()
                    .map(move |(position, specialty)| FacilityOffer {
                        facility_id: FacilityId(unit.id.to_string()),
                        facility_name: unit.name.to_string(),
                        unit_name: unit.unit.to_string(),
                        municipality: unit.municipality.to_string(),
                        address: unit.address.to_string(),
                        coordinates: Some(unit.coordinates),
                        specialty: specialty.to_string(),
                        wait_days: listed_wait_days(unit.base_wait_days, position),
                        available_slots: listed_slots(position),
                    })
            })
            .collect();

        Self { offers }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DirectoryImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut offers = Vec::new();

        for (index, record) in csv_reader.deserialize::<DirectoryRow>().enumerate() {
            // Header is line 1.
            let line = index + 2;
            offers.push(record?.into_offer(line)?);
        }

        tracing::info!(offers = offers.len(), "facility directory imported");
        Ok(Self { offers })
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn offers(&self) -> &[FacilityOffer] {
        &self.offers
    }

    /// Fresh copies of the offers for one specialty, matched by folded name.
    pub fn offers_for(&self, specialty: &str) -> Vec<FacilityOffer> {
        let key = fold(specialty);
        self.offers
            .iter()
            .filter(|offer| fold(&offer.specialty) == key)
            .cloned()
            .collect()
    }

    /// Distinct specialties across the directory, keyed by folded name.
    pub fn specialties(&self) -> Vec<String> {
        let mut distinct = BTreeMap::new();
        for offer in &self.offers {
            distinct
                .entry(fold(&offer.specialty))
                .or_insert_with(|| offer.specialty.clone());
        }
        distinct.into_values().collect()
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryRow {
    facility_id: String,
    facility_name: String,
    unit_name: String,
    municipality: String,
    address: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    specialty: String,
    wait_days: u32,
    #[serde(default)]
    available_slots: Option<u32>,
}

impl DirectoryRow {
    fn into_offer(self, line: usize) -> Result<FacilityOffer, DirectoryImportError> {
        if self.specialty.is_empty() {
            return Err(DirectoryImportError::MissingSpecialty { line });
        }

        let coordinates = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => {
                let coordinates = Coordinates::new(lat, lng);
                coordinates
                    .validate()
                    .map_err(|source| DirectoryImportError::InvalidCoordinates { line, source })?;
                Some(coordinates)
            }
            (None, None) => None,
            _ => return Err(DirectoryImportError::IncompleteCoordinates { line }),
        };

        Ok(FacilityOffer {
            facility_id: FacilityId(self.facility_id),
            facility_name: self.facility_name,
            unit_name: self.unit_name,
            municipality: self.municipality,
            address: self.address,
            coordinates,
            specialty: self.specialty,
            wait_days: self.wait_days,
            available_slots: self.available_slots.unwrap_or_default(),
        })
    }
}
