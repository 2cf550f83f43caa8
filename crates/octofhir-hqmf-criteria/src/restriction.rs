//! Restrictions on data criteria and their inheritance by child criteria

use crate::emission::{EmissionValue, Mapping};
use crate::sanitize::prune;
use serde::{Deserialize, Serialize};

/// A constraint attached to a criteria.
///
/// A restriction without a `field` applies to the whole criteria rather than
/// to one of its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    /// Temporal or subset relationship code (e.g. `SBS`, `EAS`)
    pub restriction_type: String,
    /// Id of the criteria the restriction points at
    pub target_id: Option<String>,
    pub field: Option<String>,
    pub value: Option<String>,
    pub negation: bool,
    /// Set on copies taken over from a parent criteria
    pub from_parent: bool,
}

impl Restriction {
    pub fn new(restriction_type: impl Into<String>) -> Self {
        Self {
            restriction_type: restriction_type.into(),
            target_id: None,
            field: None,
            value: None,
            negation: false,
            from_parent: false,
        }
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn negated(mut self) -> Self {
        self.negation = true;
        self
    }

    /// Whether the restriction applies to the whole criteria
    pub fn is_unscoped(&self) -> bool {
        self.field.is_none()
    }

    /// An independent copy flagged as taken over from a parent
    pub fn inherited(&self) -> Self {
        Self {
            from_parent: true,
            ..self.clone()
        }
    }

    pub fn to_emission(&self) -> EmissionValue {
        let mut json = Mapping::new();
        json.insert("type".to_string(), self.restriction_type.as_str().into());
        json.insert("target_id".to_string(), self.target_id.clone().into());
        json.insert("field".to_string(), self.field.clone().into());
        json.insert("value".to_string(), self.value.clone().into());
        json.insert("negation".to_string(), self.negation.into());
        json.insert("from_parent".to_string(), self.from_parent.into());
        prune(&mut json);
        EmissionValue::Mapping(json)
    }
}

/// Anything that carries restrictions
pub trait Restricted {
    fn restrictions(&self) -> &[Restriction];
}

impl Restricted for [Restriction] {
    fn restrictions(&self) -> &[Restriction] {
        self
    }
}

impl Restricted for Vec<Restriction> {
    fn restrictions(&self) -> &[Restriction] {
        self
    }
}

/// Copies of the parent's whole-criteria restrictions, flagged as inherited.
///
/// Field-scoped restrictions stay with the parent. Order is preserved and the
/// parent is left untouched.
pub fn inherited_restrictions<P: Restricted + ?Sized>(parent: &P) -> Vec<Restriction> {
    parent
        .restrictions()
        .iter()
        .filter(|r| r.is_unscoped())
        .map(Restriction::inherited)
        .collect()
}
