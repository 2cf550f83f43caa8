//! Pruning of empty fields from emission records

use crate::emission::{EmissionValue, Mapping};

/// Drop keys whose value is null or blank, one level deep
pub fn prune(mapping: &mut Mapping) {
    mapping.retain(|_, value| !value.is_blank());
}

/// Remove null and empty fields at every nesting level.
///
/// Mappings are sanitized bottom-up and then pruned, so a mapping that only
/// held empty fields disappears from its parent. Mappings inside sequences
/// are sanitized in place; a sequence itself is only removed when it is empty
/// at its parent's pruning pass.
pub fn sanitize(value: EmissionValue) -> EmissionValue {
    match value {
        EmissionValue::Mapping(mapping) => EmissionValue::Mapping(sanitize_mapping(mapping)),
        EmissionValue::Sequence(items) => EmissionValue::Sequence(
            items
                .into_iter()
                .map(|item| match item {
                    EmissionValue::Mapping(mapping) => EmissionValue::Mapping(sanitize_mapping(mapping)),
                    other => other,
                })
                .collect(),
        ),
        scalar => scalar,
    }
}

fn sanitize_mapping(mapping: Mapping) -> Mapping {
    let mut cleaned: Mapping = mapping
        .into_iter()
        .map(|(key, value)| (key, sanitize(value)))
        .collect();
    prune(&mut cleaned);
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn clean(value: serde_json::Value) -> serde_json::Value {
        sanitize(EmissionValue::from(value)).to_json()
    }

    #[test]
    fn test_removes_null_and_empty_fields() {
        assert_eq!(
            clean(json!({"title": "X", "status": null, "value": {}})),
            json!({"title": "X"})
        );
    }

    #[test]
    fn test_nested_mapping_emptied_by_pruning_is_removed() {
        assert_eq!(
            clean(json!({
                "123": {
                    "section": "conditions",
                    "value": {"low": {"unit": null}, "high": null},
                    "inline_code_list": {}
                }
            })),
            json!({"123": {"section": "conditions"}})
        );
    }

    #[test]
    fn test_sequences_keep_their_position() {
        assert_eq!(
            clean(json!({
                "restrictions": [{"field": null, "type": "SBS"}, {"field": null}, "raw"],
                "empty": []
            })),
            json!({"restrictions": [{"type": "SBS"}, {}, "raw"]})
        );
    }

    #[test]
    fn test_non_empty_scalars_survive() {
        let input = json!({"negation": false, "count": 0, "title": "t", "codes": ["a"]});
        assert_eq!(clean(input.clone()), input);
    }

    #[test]
    fn test_prune_is_shallow() {
        let mut mapping = Mapping::new();
        mapping.insert("a".to_string(), EmissionValue::Null);
        mapping.insert("b".to_string(), EmissionValue::from(json!({"c": null})));
        prune(&mut mapping);

        assert_eq!(mapping.len(), 1);
        assert!(mapping.contains_key("b"));
    }
}
