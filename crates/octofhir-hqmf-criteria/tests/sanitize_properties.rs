//! Property tests for emission sanitizing

use octofhir_hqmf_criteria::{EmissionValue, Mapping, sanitize};
use proptest::prelude::*;

fn emission_value() -> impl Strategy<Value = EmissionValue> {
    let leaf = prop_oneof![
        Just(EmissionValue::Null),
        any::<bool>().prop_map(EmissionValue::Bool),
        any::<i64>().prop_map(|n| EmissionValue::Number(n.into())),
        "[a-z]{0,4}".prop_map(EmissionValue::String),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(EmissionValue::Sequence),
            prop::collection::vec(("[a-z]{1,3}", inner), 0..5)
                .prop_map(|entries| EmissionValue::Mapping(entries.into_iter().collect::<Mapping>())),
        ]
    })
}

/// No mapping anywhere below `value` (outside sequences) holds a blank value
fn has_no_blank_fields(value: &EmissionValue) -> bool {
    match value {
        EmissionValue::Mapping(map) => map.values().all(|v| !v.is_blank() && has_no_blank_fields(v)),
        EmissionValue::Sequence(items) => items
            .iter()
            .filter(|item| item.as_mapping().is_some())
            .all(has_no_blank_fields),
        _ => true,
    }
}

proptest! {
    #[test]
    fn sanitize_is_idempotent(value in emission_value()) {
        let once = sanitize(value);
        let twice = sanitize(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sanitized_mappings_have_no_blank_fields(value in emission_value()) {
        prop_assert!(has_no_blank_fields(&sanitize(value)));
    }

    #[test]
    fn non_blank_scalars_survive(key in "[a-z]{1,3}", text in "[a-z]{1,4}", flag in any::<bool>()) {
        let mut mapping = Mapping::new();
        mapping.insert(key.clone(), EmissionValue::String(text.clone()));
        mapping.insert(format!("{key}_flag"), EmissionValue::Bool(flag));

        let cleaned = sanitize(EmissionValue::Mapping(mapping));

        prop_assert_eq!(cleaned.get(&key).and_then(|v| v.as_str()), Some(text.as_str()));
        prop_assert_eq!(cleaned.get(&format!("{key}_flag")), Some(&EmissionValue::Bool(flag)));
    }
}
