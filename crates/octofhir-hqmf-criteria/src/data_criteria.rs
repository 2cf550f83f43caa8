//! The data criteria record built from one `dataCriteriaSection` entry

use crate::accessor::{Accessor, resolve};
use crate::demographic::DemographicProperty;
use crate::effective_time::EffectiveTime;
use crate::emission::{EmissionValue, Mapping};
use crate::sanitize::sanitize;
use crate::template::{Section, TEMPLATE_ID, Template, TemplateType};
use crate::value::{ValueVariant, decode_value};
use indexmap::IndexMap;
use octofhir_hqmf_diagnostics::{HqmfError, Result};
use octofhir_hqmf_document::{Element, PathQuery};
use std::fmt;

const STATUS: &str = "./*/cda:statusCode/@code";
const TITLE: &str = "./cda:localVariableName";
const SUBSET_CODE: &str = "./cda:subsetCode/@code";
const DEMOGRAPHIC_CODE: &str = "./cda:observationCriteria/cda:code/@code";

/// Code system name mapped to the codes listed inline on a criteria
pub type InlineCodeList = IndexMap<String, Vec<String>>;

/// Queries for the lazily read fields, compiled for the entry's template
#[derive(Debug, Clone)]
struct FieldQueries {
    id: PathQuery,
    code_list_id: PathQuery,
    code_system_name: PathQuery,
    code: PathQuery,
    title: PathQuery,
    subset_code: PathQuery,
}

impl FieldQueries {
    fn compile(template: &Template, accessor: &Accessor) -> Result<Self> {
        let code_list = accessor.compile(template.code_list_query())?;
        let namespaces = accessor.namespaces();
        Ok(Self {
            id: accessor.compile(template.id_query())?,
            code_list_id: code_list.join("@valueSet", namespaces)?,
            code_system_name: code_list.join("@codeSystemName", namespaces)?,
            code: code_list.join("@code", namespaces)?,
            title: accessor.compile(TITLE)?,
            subset_code: accessor.compile(SUBSET_CODE)?,
        })
    }
}

/// A data criteria entry, classified and decoded
#[derive(Debug, Clone)]
pub struct DataCriteria<'a> {
    entry: &'a Element,
    template: Template,
    status: Option<String>,
    property: Option<DemographicProperty>,
    value: Option<ValueVariant>,
    effective_time: Option<EffectiveTime>,
    queries: FieldQueries,
}

impl<'a> DataCriteria<'a> {
    /// Build a record from an entry using the default HQMF namespaces
    pub fn new(entry: &'a Element) -> Result<Self> {
        Self::with_accessor(entry, &Accessor::default())
    }

    /// Build a record from an entry.
    ///
    /// Fails when the template identifier, value type or demographic code is
    /// unknown; nothing is returned for such an entry.
    pub fn with_accessor(entry: &'a Element, accessor: &Accessor) -> Result<Self> {
        let status = accessor.attr_val(entry, STATUS)?;
        let effective_time = EffectiveTime::extract(entry, accessor)?;

        let identifier = accessor.attr_val(entry, TEMPLATE_ID)?;
        let template = Template::classify(identifier.as_deref(), Some(&entry.location))?;

        let property = match template.template_type {
            TemplateType::Characteristic => Some(demographic_property(entry, accessor)?),
            _ => None,
        };

        let value = if template.template_type.decodes_value() {
            decode_value(entry, template.value_query(), accessor)?
        } else {
            None
        };

        let queries = FieldQueries::compile(&template, accessor)?;

        log::debug!(
            "classified entry at {} as {} (template id {:?})",
            entry.location,
            template.template_type,
            identifier
        );

        Ok(Self {
            entry,
            template,
            status,
            property,
            value,
            effective_time,
            queries,
        })
    }

    /// The entry this record was built from
    pub fn entry(&self) -> &'a Element {
        self.entry
    }

    pub fn template_type(&self) -> TemplateType {
        self.template.template_type
    }

    pub fn section(&self) -> Option<Section> {
        self.template.section
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn property(&self) -> Option<DemographicProperty> {
        self.property
    }

    pub fn value(&self) -> Option<&ValueVariant> {
        self.value.as_ref()
    }

    pub fn effective_time(&self) -> Option<&EffectiveTime> {
        self.effective_time.as_ref()
    }

    /// Identifier other parts of the document use to reference this criteria
    pub fn id(&self) -> Option<String> {
        resolve(self.entry, &self.queries.id)
    }

    /// Human readable description
    pub fn title(&self) -> Option<String> {
        resolve(self.entry, &self.queries.title)
    }

    /// Subset code, e.g. `FIRST`
    pub fn subset_code(&self) -> Option<String> {
        resolve(self.entry, &self.queries.subset_code)
    }

    /// Value set OID of the criteria's code list
    pub fn code_list_id(&self) -> Option<String> {
        resolve(self.entry, &self.queries.code_list_id)
    }

    /// A single code given inline, keyed by its code system name
    pub fn inline_code_list(&self) -> Option<InlineCodeList> {
        let system = resolve(self.entry, &self.queries.code_system_name)?;
        let code = resolve(self.entry, &self.queries.code)?;
        let mut codes = InlineCodeList::new();
        codes.insert(system, vec![code]);
        Some(codes)
    }

    /// The record keyed by its id, with absent fields left as nulls
    pub fn raw_emission(&self) -> EmissionValue {
        let mut json = Mapping::new();
        json.insert("title".to_string(), self.title().into());
        json.insert("section".to_string(), self.section().map(|s| s.as_str()).into());
        json.insert("subset_code".to_string(), self.subset_code().into());
        json.insert("code_list_id".to_string(), self.code_list_id().into());
        json.insert("property".to_string(), self.property.map(|p| p.as_str()).into());
        json.insert("type".to_string(), self.template_type().as_str().into());
        json.insert("status".to_string(), self.status.clone().into());
        json.insert(
            "value".to_string(),
            self.value.as_ref().map(ValueVariant::to_emission).into(),
        );
        json.insert(
            "effective_time".to_string(),
            self.effective_time.as_ref().map(EffectiveTime::to_emission).into(),
        );
        json.insert(
            "inline_code_list".to_string(),
            self.inline_code_list().map(inline_emission).into(),
        );

        let mut record = Mapping::new();
        record.insert(self.id().unwrap_or_default(), EmissionValue::Mapping(json));
        EmissionValue::Mapping(record)
    }

    /// The record keyed by its id, with empty fields removed at every level
    pub fn to_emission(&self) -> EmissionValue {
        sanitize(self.raw_emission())
    }
}

impl fmt::Display for DataCriteria<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DataCriteria{{property: {}, type: {}, status: {}, section: {}}}",
            self.property.map(|p| p.as_str()).unwrap_or("none"),
            self.template_type(),
            self.status().unwrap_or("none"),
            self.section().map(|s| s.as_str()).unwrap_or("none"),
        )
    }
}

fn demographic_property(entry: &Element, accessor: &Accessor) -> Result<DemographicProperty> {
    match accessor.attr_val(entry, DEMOGRAPHIC_CODE)? {
        Some(code) => DemographicProperty::from_code(&code)
            .map_err(|err| err.with_location(entry.location.clone())),
        None => Err(HqmfError::UnrecognizedDemographicCode {
            code: None,
            location: Some(entry.location.clone()),
        }),
    }
}

fn inline_emission(codes: InlineCodeList) -> EmissionValue {
    EmissionValue::Mapping(
        codes
            .into_iter()
            .map(|(system, codes)| {
                let codes = codes.into_iter().map(EmissionValue::from).collect::<Vec<_>>();
                (system, EmissionValue::from(codes))
            })
            .collect(),
    )
}
