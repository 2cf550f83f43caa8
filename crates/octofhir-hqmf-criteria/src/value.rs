//! Typed values attached to data criteria
//!
//! A value fragment declares its shape through `xsi:type`:
//! - `TS` decodes to a point [`Value`]
//! - `IVL_PQ` decodes to a [`Range`]
//! - `CD` decodes to a [`Coded`] concept

use crate::accessor::Accessor;
use crate::emission::{EmissionValue, Mapping};
use octofhir_hqmf_diagnostics::{HqmfError, Result};
use octofhir_hqmf_document::Element;

/// A single typed scalar, such as a timestamp or a physical quantity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub value_type: String,
    pub value: Option<String>,
    pub unit: Option<String>,
    pub inclusive: bool,
    /// Set when the value is derived (`nullFlavor="DER"`) from `expression`
    pub derived: bool,
    pub expression: Option<String>,
}

impl Value {
    /// Decode a value fragment, using `default_type` when it declares none
    pub fn decode(entry: &Element, default_type: &str, accessor: &Accessor) -> Result<Self> {
        let value_type = accessor
            .attr_val(entry, "@xsi:type")?
            .unwrap_or_else(|| default_type.to_string());
        let derived = accessor.attr_val(entry, "@nullFlavor")?.as_deref() == Some("DER");
        let expression = if derived {
            accessor.attr_val(entry, "./cda:expression/@value")?
        } else {
            None
        };

        Ok(Self {
            value_type,
            value: accessor.attr_val(entry, "@value")?,
            unit: accessor.attr_val(entry, "@unit")?,
            inclusive: accessor.attr_val(entry, "@inclusive")?.as_deref() == Some("true"),
            derived,
            expression,
        })
    }

    pub fn to_emission(&self) -> EmissionValue {
        let mut json = Mapping::new();
        json.insert("type".to_string(), self.value_type.as_str().into());
        json.insert("unit".to_string(), self.unit.clone().into());
        json.insert("value".to_string(), self.value.clone().into());
        json.insert("inclusive".to_string(), self.inclusive.into());
        json.insert("derived".to_string(), self.derived.into());
        json.insert("expression".to_string(), self.expression.clone().into());
        EmissionValue::Mapping(json)
    }
}

/// A bounded interval; each bound is optional
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    pub range_type: Option<String>,
    pub low: Option<Value>,
    pub high: Option<Value>,
    pub width: Option<Value>,
}

impl Range {
    /// Decode a range fragment. `range_type` overrides the declared `xsi:type`.
    pub fn decode(entry: &Element, range_type: Option<&str>, accessor: &Accessor) -> Result<Self> {
        let range_type = match range_type {
            Some(t) => Some(t.to_string()),
            None => accessor.attr_val(entry, "@xsi:type")?,
        };
        let bounds_type = match range_type.as_deref() {
            Some("IVL_TS") => "TS",
            _ => "PQ",
        };

        Ok(Self {
            low: optional_value(entry, "./cda:low", bounds_type, accessor)?,
            high: optional_value(entry, "./cda:high", bounds_type, accessor)?,
            width: optional_value(entry, "./cda:width", "PQ", accessor)?,
            range_type,
        })
    }

    pub fn to_emission(&self) -> EmissionValue {
        let mut json = Mapping::new();
        json.insert("type".to_string(), self.range_type.clone().into());
        json.insert("low".to_string(), self.low.as_ref().map(Value::to_emission).into());
        json.insert("high".to_string(), self.high.as_ref().map(Value::to_emission).into());
        json.insert("width".to_string(), self.width.as_ref().map(Value::to_emission).into());
        EmissionValue::Mapping(json)
    }
}

fn optional_value(
    entry: &Element,
    query: &str,
    default_type: &str,
    accessor: &Accessor,
) -> Result<Option<Value>> {
    accessor
        .at(entry, query)?
        .map(|bound| Value::decode(bound, default_type, accessor))
        .transpose()
}

/// A coded concept from a code system or value set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coded {
    pub code_type: String,
    pub code: Option<String>,
    /// Code system OID
    pub system: Option<String>,
    /// Value set OID
    pub code_list_id: Option<String>,
    /// Display name
    pub title: Option<String>,
}

impl Coded {
    pub fn decode(entry: &Element, accessor: &Accessor) -> Result<Self> {
        Ok(Self {
            code_type: accessor
                .attr_val(entry, "@xsi:type")?
                .unwrap_or_else(|| "CD".to_string()),
            code: accessor.attr_val(entry, "@code")?,
            system: accessor.attr_val(entry, "@codeSystem")?,
            code_list_id: accessor.attr_val(entry, "@valueSet")?,
            title: accessor.attr_val(entry, "@displayName")?,
        })
    }

    pub fn to_emission(&self) -> EmissionValue {
        let mut json = Mapping::new();
        json.insert("type".to_string(), self.code_type.as_str().into());
        json.insert("system".to_string(), self.system.clone().into());
        json.insert("code".to_string(), self.code.clone().into());
        json.insert("code_list_id".to_string(), self.code_list_id.clone().into());
        json.insert("title".to_string(), self.title.clone().into());
        EmissionValue::Mapping(json)
    }
}

/// Shape tags with a decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Timestamp,
    QuantityRange,
    CodedConcept,
}

impl ValueShape {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "TS" => Some(Self::Timestamp),
            "IVL_PQ" => Some(Self::QuantityRange),
            "CD" => Some(Self::CodedConcept),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Timestamp => "TS",
            Self::QuantityRange => "IVL_PQ",
            Self::CodedConcept => "CD",
        }
    }
}

/// The decoded value of a criteria
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueVariant {
    Point(Value),
    Range(Range),
    Coded(Coded),
}

impl ValueVariant {
    pub fn shape(&self) -> ValueShape {
        match self {
            Self::Point(_) => ValueShape::Timestamp,
            Self::Range(_) => ValueShape::QuantityRange,
            Self::Coded(_) => ValueShape::CodedConcept,
        }
    }

    pub fn to_emission(&self) -> EmissionValue {
        match self {
            Self::Point(value) => value.to_emission(),
            Self::Range(range) => range.to_emission(),
            Self::Coded(coded) => coded.to_emission(),
        }
    }
}

/// Decode the value fragment selected by `query` under `entry`.
///
/// A missing fragment, or one without `xsi:type`, yields `None`. A declared
/// type without a decoder fails with `UnrecognizedValueShape`.
pub fn decode_value(entry: &Element, query: &str, accessor: &Accessor) -> Result<Option<ValueVariant>> {
    let Some(value_def) = accessor.at(entry, query)? else {
        return Ok(None);
    };
    let Some(tag) = accessor.attr_val(value_def, "@xsi:type")? else {
        return Ok(None);
    };

    let shape = ValueShape::from_tag(&tag).ok_or_else(|| HqmfError::UnrecognizedValueShape {
        shape: tag.clone(),
        location: Some(value_def.location.clone()),
    })?;

    let variant = match shape {
        ValueShape::Timestamp => ValueVariant::Point(Value::decode(value_def, "TS", accessor)?),
        ValueShape::QuantityRange => ValueVariant::Range(Range::decode(value_def, None, accessor)?),
        ValueShape::CodedConcept => ValueVariant::Coded(Coded::decode(value_def, accessor)?),
    };
    Ok(Some(variant))
}
