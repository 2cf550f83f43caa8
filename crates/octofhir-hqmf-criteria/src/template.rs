//! Data criteria templates
//!
//! The template identifier of an entry decides its type, its presentation
//! section and the queries used to read its id, code list and value. All
//! three come out of the same match arm in [`Template::classify`].

use octofhir_hqmf_diagnostics::{HqmfError, Result, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of the template identifier inside an entry
pub const TEMPLATE_ID: &str = "./*/cda:definition/*/cda:id/@extension";

const OBSERVATION_ID: &str = "./cda:observationCriteria/cda:id/@extension";
const OBSERVATION_CODE: &str = "./cda:observationCriteria/cda:code";
const OBSERVATION_VALUE: &str = "./cda:observationCriteria/cda:value";
const ENCOUNTER_ID: &str = "./cda:encounterCriteria/cda:id/@extension";
const ENCOUNTER_CODE: &str = "./cda:encounterCriteria/cda:code";
const PROCEDURE_ID: &str = "./cda:procedureCriteria/cda:id/@extension";
const PROCEDURE_CODE: &str = "./cda:procedureCriteria/cda:code";
const SUBSTANCE_ADMIN_ID: &str = "./cda:substanceAdministrationCriteria/cda:id/@extension";
const SUBSTANCE_ADMIN_CODE: &str =
    "./cda:substanceAdministrationCriteria/cda:participant/cda:roleParticipant/cda:code";
const SUPPLY_ID: &str = "./cda:supplyCriteria/cda:id/@extension";
const SUPPLY_CODE: &str = "./cda:supplyCriteria/cda:participant/cda:roleParticipant/cda:code";

/// Kind of clinical data a criteria selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Diagnosis,
    Encounter,
    Result,
    Procedure,
    Medication,
    Characteristic,
    Variable,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diagnosis => "diagnosis",
            Self::Encounter => "encounter",
            Self::Result => "result",
            Self::Procedure => "procedure",
            Self::Medication => "medication",
            Self::Characteristic => "characteristic",
            Self::Variable => "variable",
        }
    }

    /// Whether the value fragment is decoded when the criteria is built
    pub fn decodes_value(&self) -> bool {
        matches!(self, Self::Result | Self::Characteristic | Self::Variable)
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation group of a criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Conditions,
    Encounters,
    Results,
    Procedures,
    Medications,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conditions => "conditions",
            Self::Encounters => "encounters",
            Self::Results => "results",
            Self::Procedures => "procedures",
            Self::Medications => "medications",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Queries reading the template-specific fields of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QuerySet {
    pub(crate) id: &'static str,
    pub(crate) code_list: &'static str,
    pub(crate) value: &'static str,
}

impl QuerySet {
    const fn new(id: &'static str, code_list: &'static str) -> Self {
        Self {
            id,
            code_list,
            value: OBSERVATION_VALUE,
        }
    }
}

/// Result of classifying an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub template_type: TemplateType,
    pub section: Option<Section>,
    pub(crate) queries: QuerySet,
}

impl Template {
    /// Classify a template identifier. Matching ignores ASCII case; no
    /// identifier at all means a variable.
    pub fn classify(identifier: Option<&str>, location: Option<&SourceLocation>) -> Result<Self> {
        let Some(identifier) = identifier else {
            return Ok(Self::new(
                TemplateType::Variable,
                None,
                QuerySet::new(OBSERVATION_ID, OBSERVATION_VALUE),
            ));
        };

        let template = match identifier.to_ascii_lowercase().as_str() {
            "problem" | "problems" => Self::new(
                TemplateType::Diagnosis,
                Some(Section::Conditions),
                QuerySet::new(OBSERVATION_ID, OBSERVATION_VALUE),
            ),
            "encounter" | "encounters" => Self::new(
                TemplateType::Encounter,
                Some(Section::Encounters),
                QuerySet::new(ENCOUNTER_ID, ENCOUNTER_CODE),
            ),
            "labresults" | "results" => Self::new(
                TemplateType::Result,
                Some(Section::Results),
                QuerySet::new(OBSERVATION_ID, OBSERVATION_CODE),
            ),
            "procedure" | "procedures" => Self::new(
                TemplateType::Procedure,
                Some(Section::Procedures),
                QuerySet::new(PROCEDURE_ID, PROCEDURE_CODE),
            ),
            "medication" | "medications" => Self::new(
                TemplateType::Medication,
                Some(Section::Medications),
                QuerySet::new(SUBSTANCE_ADMIN_ID, SUBSTANCE_ADMIN_CODE),
            ),
            "rx" => Self::new(
                TemplateType::Medication,
                Some(Section::Medications),
                QuerySet::new(SUPPLY_ID, SUPPLY_CODE),
            ),
            "demographics" => Self::new(
                TemplateType::Characteristic,
                None,
                QuerySet::new(OBSERVATION_ID, OBSERVATION_CODE),
            ),
            _ => {
                return Err(HqmfError::UnrecognizedTemplate {
                    identifier: identifier.to_string(),
                    location: location.cloned(),
                });
            }
        };
        Ok(template)
    }

    const fn new(template_type: TemplateType, section: Option<Section>, queries: QuerySet) -> Self {
        Self {
            template_type,
            section,
            queries,
        }
    }

    /// Query for the criteria id
    pub fn id_query(&self) -> &'static str {
        self.queries.id
    }

    /// Query for the code list element
    pub fn code_list_query(&self) -> &'static str {
        self.queries.code_list
    }

    /// Query for the value fragment
    pub fn value_query(&self) -> &'static str {
        self.queries.value
    }
}
