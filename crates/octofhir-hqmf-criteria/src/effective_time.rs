//! Effective time bound of a data criteria

use crate::accessor::Accessor;
use crate::emission::EmissionValue;
use crate::value::Range;
use octofhir_hqmf_diagnostics::Result;
use octofhir_hqmf_document::Element;

const EFFECTIVE_TIME: &str = "./*/cda:effectiveTime";

/// The timestamp interval during which a criteria applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveTime(pub Range);

impl EffectiveTime {
    /// Decode the effective time under `entry`, if it has one
    pub fn extract(entry: &Element, accessor: &Accessor) -> Result<Option<Self>> {
        accessor
            .at(entry, EFFECTIVE_TIME)?
            .map(|time| Range::decode(time, Some("IVL_TS"), accessor).map(Self))
            .transpose()
    }

    pub fn range(&self) -> &Range {
        &self.0
    }

    pub fn to_emission(&self) -> EmissionValue {
        self.0.to_emission()
    }
}
