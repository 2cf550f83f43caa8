//! Extraction over a complete measure document

use octofhir_hqmf::criteria::ValueVariant;
use octofhir_hqmf::diagnostics::{HQMF0100, Severity};
use octofhir_hqmf::{Document, ExtractOptions, Section, TemplateType, extract_data_criteria};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use std::path::PathBuf;

fn fixture() -> Document {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("measure.xml");
    Document::from_path(&path).expect("Failed to load measure fixture")
}

fn lenient() -> ExtractOptions {
    ExtractOptions::new().skip_unrecognized(true)
}

#[test]
fn test_unknown_template_aborts_strict_extraction() {
    let doc = fixture();
    let err = extract_data_criteria(&doc, &ExtractOptions::default()).unwrap_err();

    assert_eq!(err.code(), HQMF0100);
    assert!(err.to_string().contains("[Allergy]"));
}

#[test]
fn test_entries_are_classified_in_document_order() {
    let doc = fixture();
    let extraction = extract_data_criteria(&doc, &lenient()).unwrap();

    let classified: Vec<_> = extraction
        .criteria()
        .iter()
        .map(|c| (c.id().unwrap_or_default(), c.template_type(), c.section()))
        .collect();

    assert_eq!(
        classified,
        vec![
            ("ActiveDiabetes".to_string(), TemplateType::Diagnosis, Some(Section::Conditions)),
            ("OfficeVisit".to_string(), TemplateType::Encounter, Some(Section::Encounters)),
            ("LdlTest".to_string(), TemplateType::Result, Some(Section::Results)),
            ("Female".to_string(), TemplateType::Characteristic, None),
            ("Statin".to_string(), TemplateType::Medication, Some(Section::Medications)),
            ("RetinalExam".to_string(), TemplateType::Procedure, Some(Section::Procedures)),
            ("MeasurePeriodStart".to_string(), TemplateType::Variable, None),
        ]
    );

    let skipped = extraction.diagnostics();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].severity, Severity::Warning);
    assert_eq!(skipped[0].location.as_ref().map(|l| l.line), Some(107));
}

#[rstest]
#[case("ActiveDiabetes", json!({
    "title": "Diagnosis, Active: Diabetes",
    "section": "conditions",
    "code_list_id": "2.16.840.1.113883.3.464.0001.37",
    "type": "diagnosis",
    "status": "active"
}))]
#[case("OfficeVisit", json!({
    "title": "Encounter: Office Visit",
    "section": "encounters",
    "code_list_id": "2.16.840.1.113883.3.464.0001.231",
    "type": "encounter",
    "effective_time": {
        "type": "IVL_TS",
        "low": {"type": "TS", "value": "20100101", "inclusive": false, "derived": false},
        "high": {"type": "TS", "value": "20101231", "inclusive": false, "derived": false}
    }
}))]
#[case("Female", json!({
    "title": "Patient Characteristic: Gender",
    "property": "gender",
    "type": "characteristic",
    "value": {
        "type": "CD",
        "system": "2.16.840.1.113883.5.1",
        "code": "F",
        "title": "Female"
    }
}))]
#[case("Statin", json!({
    "title": "Medication, Active: Statin",
    "section": "medications",
    "code_list_id": "2.16.840.1.113883.3.117.1.7.1.225",
    "type": "medication",
    "status": "active"
}))]
#[case("RetinalExam", json!({
    "title": "Procedure, Performed: Retinal Exam",
    "section": "procedures",
    "subset_code": "FIRST",
    "type": "procedure",
    "status": "completed",
    "inline_code_list": {"CPT": ["92250"]}
}))]
fn test_emitted_records(#[case] id: &str, #[case] expected: serde_json::Value) {
    let doc = fixture();
    let emission = extract_data_criteria(&doc, &lenient()).unwrap().to_emission().to_json();

    assert_eq!(emission[id], expected);
}

#[test]
fn test_values_decoded_for_value_bearing_templates() {
    let doc = fixture();
    let extraction = extract_data_criteria(&doc, &lenient()).unwrap();

    let shapes: Vec<_> = extraction
        .criteria()
        .iter()
        .filter_map(|c| c.value().map(|v| (c.template_type(), v.shape().tag())))
        .collect();

    assert_eq!(
        shapes,
        vec![
            (TemplateType::Result, "IVL_PQ"),
            (TemplateType::Characteristic, "CD"),
            (TemplateType::Variable, "TS"),
        ]
    );

    let ldl = &extraction.criteria()[2];
    let Some(ValueVariant::Range(range)) = ldl.value() else {
        panic!("Expected a range value, got: {:?}", ldl.value());
    };
    assert_eq!(range.low, None);
    assert_eq!(range.high.as_ref().and_then(|h| h.unit.as_deref()), Some("mg/dL"));
}

#[test]
fn test_raw_records_keep_every_field() {
    let doc = fixture();
    let options = lenient().sanitize(false);
    let emission = extract_data_criteria(&doc, &options).unwrap().to_emission().to_json();

    let record = emission["MeasurePeriodStart"].as_object().unwrap();
    assert_eq!(record.len(), 10);
    assert_eq!(record["section"], serde_json::Value::Null);
    assert_eq!(record["type"], json!("variable"));
}
