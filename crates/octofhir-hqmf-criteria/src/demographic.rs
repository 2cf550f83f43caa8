//! Demographic properties of characteristic criteria

use octofhir_hqmf_diagnostics::{HqmfError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The patient property a characteristic criteria constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DemographicProperty {
    Age,
    Gender,
    Languages,
    MaritalStatus,
    Race,
}

impl DemographicProperty {
    /// Map a SNOMED CT concept code to its property
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "424144002" => Ok(Self::Age),
            "263495000" => Ok(Self::Gender),
            "102902016" => Ok(Self::Languages),
            "125680007" => Ok(Self::MaritalStatus),
            "103579009" => Ok(Self::Race),
            other => Err(HqmfError::UnrecognizedDemographicCode {
                code: Some(other.to_string()),
                location: None,
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Gender => "gender",
            Self::Languages => "languages",
            Self::MaritalStatus => "maritalStatus",
            Self::Race => "race",
        }
    }
}

impl fmt::Display for DemographicProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_hqmf_diagnostics::HQMF0102;
    use rstest::rstest;

    #[rstest]
    #[case("424144002", DemographicProperty::Age)]
    #[case("263495000", DemographicProperty::Gender)]
    #[case("102902016", DemographicProperty::Languages)]
    #[case("125680007", DemographicProperty::MaritalStatus)]
    #[case("103579009", DemographicProperty::Race)]
    fn test_known_codes(#[case] code: &str, #[case] expected: DemographicProperty) {
        assert_eq!(DemographicProperty::from_code(code).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("21840007")]
    #[case(" 263495000")]
    fn test_unknown_codes_fail(#[case] code: &str) {
        let err = DemographicProperty::from_code(code).unwrap_err();
        assert_eq!(err.code(), HQMF0102);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&DemographicProperty::MaritalStatus).unwrap(),
            r#""maritalStatus""#
        );
        assert_eq!(DemographicProperty::Race.to_string(), "race");
    }
}
