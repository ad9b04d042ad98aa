use serde::Serialize;

use super::text::fold;

/// Catch-all entry offered for every specialty; the intake then carries free text.
pub const OTHER_CONDITION: &str = "Outro (especifique)";

const STANDARD_CONDITIONS: &[(&str, &[&str])] = &[
    (
        "Alergologia",
        &[
            "Rinite alergica",
            "Asma alergica",
            "Dermatite atopica",
            "Urticaria",
            "Alergia alimentar",
        ],
    ),
    (
        "Angiologia",
        &[
            "Varizes",
            "Trombose venosa",
            "Insuficiencia venosa",
            "Doenca arterial periferica",
            "Aneurisma",
        ],
    ),
    (
        "Cardiologia",
        &[
            "Hipertensao arterial",
            "Insuficiencia cardiaca",
            "Arritmia cardiaca",
            "Doenca coronariana",
            "Valvulopatia",
            "Cardiomiopatia",
            "Avaliacao pre-operatoria",
        ],
    ),
    (
        "Cirurgia Geral",
        &[
            "Hernia",
            "Calculo biliar (vesicula)",
            "Apendicite",
            "Avaliacao de nodulo/tumor",
            "Hemorroida",
            "Fissura anal",
        ],
    ),
    (
        "Colposcopia",
        &[
            "Papanicolau alterado",
            "Lesao no colo do utero",
            "HPV",
            "Biopsia de colo uterino",
        ],
    ),
    (
        "Dermatologia",
        &[
            "Acne",
            "Psoriase",
            "Dermatite",
            "Micose",
            "Vitiligo",
            "Queda de cabelo",
            "Lesao de pele (avaliacao)",
        ],
    ),
    (
        "Endocrinologia",
        &[
            "Diabetes mellitus",
            "Obesidade/Controle de peso",
            "Disfuncao tireoidiana",
            "Hipertensao secundaria",
            "Osteoporose",
            "Colesterol alto",
        ],
    ),
    (
        "Endocrinologia Infantil",
        &[
            "Diabetes infantil",
            "Obesidade infantil",
            "Baixa estatura",
            "Puberdade precoce",
            "Problemas de tireoide",
        ],
    ),
    (
        "Gastroenterologia",
        &[
            "Refluxo gastroesofagico",
            "Gastrite/ulcera",
            "Doenca inflamatoria intestinal",
            "Sindrome do intestino irritavel",
            "Cirrose hepatica",
            "Hepatite",
        ],
    ),
    (
        "Geriatria",
        &[
            "Avaliacao geriatrica ampla",
            "Quedas frequentes",
            "Demencia/Alzheimer",
            "Polifarmacia",
            "Fragilidade",
        ],
    ),
    (
        "Ginecologia",
        &[
            "Mioma uterino",
            "Endometriose",
            "Sindrome dos ovarios policisticos",
            "Sangramento uterino anormal",
            "Menopausa",
            "Cisto de ovario",
        ],
    ),
    (
        "Neurologia",
        &[
            "Epilepsia",
            "Cefaleia/Enxaqueca",
            "AVC/Sequela de AVC",
            "Doenca de Parkinson",
            "Esclerose multipla",
            "Neuropatia periferica",
        ],
    ),
    (
        "Oftalmologia",
        &[
            "Catarata",
            "Glaucoma",
            "Erro de refracao (oculos)",
            "Degeneracao macular",
            "Retinopatia diabetica",
        ],
    ),
    (
        "Ortopedia",
        &[
            "Artrose",
            "Hernia de disco",
            "Tendinite",
            "Fratura (acompanhamento)",
            "Dor lombar cronica",
            "Lesao de menisco/ligamento",
        ],
    ),
    (
        "Pediatria",
        &[
            "Acompanhamento de puericultura",
            "Asma infantil",
            "Alergia",
            "Infeccao recorrente",
        ],
    ),
    (
        "Pneumologia",
        &[
            "Asma",
            "DPOC (Doenca Pulmonar Obstrutiva Cronica)",
            "Fibrose pulmonar",
            "Apneia do sono",
            "Tuberculose",
        ],
    ),
    (
        "Psiquiatria",
        &[
            "Depressao",
            "Ansiedade/Transtorno de ansiedade",
            "Transtorno bipolar",
            "Esquizofrenia",
            "TOC (Transtorno Obsessivo-Compulsivo)",
            "TDAH (adulto)",
        ],
    ),
    (
        "Reumatologia",
        &[
            "Artrite reumatoide",
            "Lupus eritematoso sistemico",
            "Fibromialgia",
            "Osteoartrite",
            "Gota",
            "Espondilite anquilosante",
        ],
    ),
    (
        "Urologia",
        &[
            "Hiperplasia prostatica benigna",
            "Calculo urinario (pedra)",
            "Incontinencia urinaria",
            "Infeccao urinaria recorrente",
            "Disfuncao eretil",
        ],
    ),
    (
        "Nutricao",
        &[
            "Obesidade/Emagrecimento",
            "Diabetes (orientacao nutricional)",
            "Hipertensao (orientacao nutricional)",
            "Disturbio alimentar",
            "Desnutricao",
            "Dislipidemia (colesterol/triglicerides)",
        ],
    ),
    (
        "Psicologia",
        &[
            "Depressao",
            "Ansiedade",
            "Trauma/TEPT",
            "Luto",
            "Relacionamento familiar/conjugal",
            "Autoestima",
        ],
    ),
    (
        "Fisioterapia",
        &[
            "Reabilitacao pos-cirurgica",
            "Dor lombar",
            "AVC (reabilitacao)",
            "Lesao esportiva",
            "Artrose",
        ],
    ),
];

/// How an intake condition relates to the catalogue for its specialty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionMatch {
    Listed,
    /// Not in the catalogue; kept as free text under [`OTHER_CONDITION`].
    FreeText,
    Missing,
}

/// Enumerated intake conditions per specialty.
#[derive(Debug, Clone)]
pub struct ConditionCatalog {
    entries: Vec<(String, Vec<String>)>,
}

impl ConditionCatalog {
    pub fn standard() -> Self {
        let entries = STANDARD_CONDITIONS
            .iter()
            .map(|(specialty, conditions)| {
                (
                    fold(specialty),
                    conditions.iter().map(|name| name.to_string()).collect(),
                )
            })
            .collect();
        Self { entries }
    }

    /// Options shown for a specialty, always ending with [`OTHER_CONDITION`].
    pub fn conditions_for(&self, specialty: &str) -> Vec<String> {
        let key = fold(specialty);
        let mut options = self
            .entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, conditions)| conditions.clone())
            .unwrap_or_default();
        options.push(OTHER_CONDITION.to_string());
        options
    }

    pub fn classify(&self, specialty: &str, condition: &str) -> ConditionMatch {
        let condition = fold(condition);
        if condition.is_empty() {
            return ConditionMatch::Missing;
        }
        let key = fold(specialty);
        let listed = self
            .entries
            .iter()
            .filter(|(name, _)| *name == key)
            .flat_map(|(_, conditions)| conditions)
            .any(|name| fold(name) == condition);
        if listed {
            ConditionMatch::Listed
        } else {
            ConditionMatch::FreeText
        }
    }
}

impl Default for ConditionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
