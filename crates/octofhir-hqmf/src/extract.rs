//! Document-level extraction of data criteria

use octofhir_hqmf_criteria::{Accessor, DataCriteria, EmissionValue, Mapping};
use octofhir_hqmf_diagnostics::{Diagnostic, HQMF0006, HqmfError, Result, Severity};
use octofhir_hqmf_document::{Document, HL7_V3_NAMESPACE, Namespaces, PathQuery};

const ROOT_ELEMENT: &str = "QualityMeasureDocument";
const ENTRIES: &str = "./cda:component/cda:dataCriteriaSection/cda:entry";

/// Options for [`extract_data_criteria`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Skip entries with an unknown template, value type or demographic code
    /// instead of failing the whole document
    pub skip_unrecognized: bool,
    /// Remove empty fields from the emitted records
    pub sanitize: bool,
    /// Prefix bindings used by path queries
    pub namespaces: Namespaces,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            skip_unrecognized: false,
            sanitize: true,
            namespaces: Namespaces::hqmf(),
        }
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_unrecognized(mut self, skip: bool) -> Self {
        self.skip_unrecognized = skip;
        self
    }

    pub fn sanitize(mut self, sanitize: bool) -> Self {
        self.sanitize = sanitize;
        self
    }

    pub fn namespaces(mut self, namespaces: Namespaces) -> Self {
        self.namespaces = namespaces;
        self
    }
}

/// Data criteria read from one document
#[derive(Debug, Clone)]
pub struct Extraction<'d> {
    criteria: Vec<DataCriteria<'d>>,
    diagnostics: Vec<Diagnostic>,
    sanitize: bool,
}

impl<'d> Extraction<'d> {
    /// Criteria in document order
    pub fn criteria(&self) -> &[DataCriteria<'d>] {
        &self.criteria
    }

    /// Warnings for skipped entries
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// All records merged into one mapping keyed by criteria id.
    ///
    /// A later entry reusing an id replaces the earlier record in place.
    pub fn records(&self) -> Mapping {
        let mut records = Mapping::new();
        for criteria in &self.criteria {
            let emission = if self.sanitize {
                criteria.to_emission()
            } else {
                criteria.raw_emission()
            };
            let EmissionValue::Mapping(record) = emission else {
                continue;
            };
            for (id, fields) in record {
                if records.contains_key(&id) {
                    log::warn!("data criteria id '{}' is defined more than once", id);
                }
                records.insert(id, fields);
            }
        }
        records
    }

    pub fn to_emission(&self) -> EmissionValue {
        EmissionValue::Mapping(self.records())
    }
}

/// Build a [`DataCriteria`] for every entry of the document's data criteria
/// section
pub fn extract_data_criteria<'d>(document: &'d Document, options: &ExtractOptions) -> Result<Extraction<'d>> {
    let root = document.root();
    if !root.name.is(Some(HL7_V3_NAMESPACE), ROOT_ELEMENT) {
        return Err(HqmfError::document_at(
            HQMF0006,
            format!("Expected {} document element, found <{}>", ROOT_ELEMENT, root.name.local),
            root.location.clone(),
        ));
    }

    let accessor = Accessor::new(options.namespaces.clone());
    let entries = PathQuery::compile(ENTRIES, &options.namespaces)?;

    let mut criteria = Vec::new();
    let mut diagnostics = Vec::new();
    for entry in entries.select(root).into_iter().filter_map(|s| s.element()) {
        match DataCriteria::with_accessor(entry, &accessor) {
            Ok(record) => criteria.push(record),
            Err(err) if options.skip_unrecognized && err.is_classification_error() => {
                log::warn!("skipping data criteria entry at {}: {}", entry.location, err);
                diagnostics.push(err.to_diagnostic_with(Severity::Warning));
            }
            Err(err) => return Err(err),
        }
    }

    log::debug!(
        "extracted {} data criteria ({} skipped)",
        criteria.len(),
        diagnostics.len()
    );

    Ok(Extraction {
        criteria,
        diagnostics,
        sanitize: options.sanitize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_hqmf_diagnostics::{HQMF0100, HQMF0201};
    use pretty_assertions::assert_eq;

    fn measure(entries: &str) -> Document {
        Document::parse(&format!(
            r#"<QualityMeasureDocument xmlns="urn:hl7-org:v3">
  <component>
    <dataCriteriaSection>{entries}</dataCriteriaSection>
  </component>
</QualityMeasureDocument>"#
        ))
        .unwrap()
    }

    const PROBLEM: &str = r#"<entry><observationCriteria>
  <id extension="dx"/>
  <definition><observationReference><id extension="Problem"/></observationReference></definition>
</observationCriteria></entry>"#;

    const ALLERGY: &str = r#"<entry><observationCriteria>
  <id extension="allergy"/>
  <definition><observationReference><id extension="Allergy"/></observationReference></definition>
</observationCriteria></entry>"#;

    #[test]
    fn test_rejects_other_document_elements() {
        let doc = Document::parse("<ClinicalDocument/>").unwrap();
        let err = extract_data_criteria(&doc, &ExtractOptions::default()).unwrap_err();
        assert_eq!(err.code(), HQMF0006);
    }

    #[test]
    fn test_unrecognized_entry_fails_by_default() {
        let doc = measure(&format!("{PROBLEM}{ALLERGY}"));
        let err = extract_data_criteria(&doc, &ExtractOptions::default()).unwrap_err();
        assert_eq!(err.code(), HQMF0100);
    }

    #[test]
    fn test_unrecognized_entry_is_skipped_with_warning() {
        let doc = measure(&format!("{ALLERGY}{PROBLEM}"));
        let options = ExtractOptions::new().skip_unrecognized(true);
        let extraction = extract_data_criteria(&doc, &options).unwrap();

        assert_eq!(extraction.len(), 1);
        assert_eq!(extraction.criteria()[0].id().as_deref(), Some("dx"));
        assert_eq!(extraction.diagnostics().len(), 1);
        assert_eq!(extraction.diagnostics()[0].severity, Severity::Warning);
        assert_eq!(extraction.diagnostics()[0].code, HQMF0100);
    }

    #[test]
    fn test_unsanitized_records_keep_nulls() {
        let doc = measure(PROBLEM);
        let options = ExtractOptions::new().sanitize(false);
        let records = extract_data_criteria(&doc, &options).unwrap().records();

        assert!(records["dx"].get("title").is_some_and(EmissionValue::is_null));
    }

    #[test]
    fn test_namespace_table_without_cda_prefix() {
        let doc = measure(PROBLEM);
        let options = ExtractOptions::new().namespaces(Namespaces::new());
        let err = extract_data_criteria(&doc, &options).unwrap_err();
        assert_eq!(err.code(), HQMF0201);
    }

    #[test]
    fn test_empty_section() {
        let doc = measure("");
        let extraction = extract_data_criteria(&doc, &ExtractOptions::default()).unwrap();
        assert!(extraction.is_empty());
        assert_eq!(extraction.to_emission(), EmissionValue::mapping());
    }
}
