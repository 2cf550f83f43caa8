//! Attribute access over document fragments
//!
//! A missing node is `None`, never an error. Errors only arise from queries
//! that fail to compile.

use octofhir_hqmf_diagnostics::Result;
use octofhir_hqmf_document::{Element, Namespaces, PathQuery};

/// Textual content of the first match of `query` under `context`
pub fn resolve(context: &Element, query: &PathQuery) -> Option<String> {
    query.first(context).map(|selection| selection.text())
}

/// The first element matched by `query` under `context`
pub fn locate<'e>(context: &'e Element, query: &PathQuery) -> Option<&'e Element> {
    query.first(context).and_then(|selection| selection.element())
}

/// Compiles query text against a namespace table and resolves it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accessor {
    namespaces: Namespaces,
}

impl Accessor {
    pub fn new(namespaces: Namespaces) -> Self {
        Self { namespaces }
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    pub fn compile(&self, query: &str) -> Result<PathQuery> {
        PathQuery::compile(query, &self.namespaces)
    }

    /// Value of an optional attribute (or element text)
    pub fn attr_val(&self, context: &Element, query: &str) -> Result<Option<String>> {
        Ok(resolve(context, &self.compile(query)?))
    }

    /// First element matching `query`
    pub fn at<'e>(&self, context: &'e Element, query: &str) -> Result<Option<&'e Element>> {
        Ok(locate(context, &self.compile(query)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_hqmf_document::Document;

    const ENTRY: &str = r#"<entry xmlns="urn:hl7-org:v3">
  <observationCriteria>
    <statusCode code="completed"/>
    <code valueSet="2.16.840.1"/>
  </observationCriteria>
</entry>"#;

    #[test]
    fn test_missing_attribute_is_absent() {
        let doc = Document::parse(ENTRY).unwrap();
        let accessor = Accessor::default();

        assert_eq!(
            accessor.attr_val(doc.root(), "./*/cda:statusCode/@code").unwrap(),
            Some("completed".to_string())
        );
        assert_eq!(accessor.attr_val(doc.root(), "./*/cda:statusCode/@nullFlavor").unwrap(), None);
        assert_eq!(accessor.attr_val(doc.root(), "./cda:encounterCriteria/cda:id/@extension").unwrap(), None);
    }

    #[test]
    fn test_locate_returns_elements_only() {
        let doc = Document::parse(ENTRY).unwrap();
        let accessor = Accessor::default();

        let code = accessor.at(doc.root(), "./cda:observationCriteria/cda:code").unwrap();
        assert_eq!(code.and_then(|e| e.attribute(None, "valueSet")), Some("2.16.840.1"));

        let attr = accessor.at(doc.root(), "./cda:observationCriteria/cda:code/@valueSet").unwrap();
        assert!(attr.is_none());
    }

    #[test]
    fn test_bad_query_is_an_error_not_absence() {
        let doc = Document::parse(ENTRY).unwrap();
        assert!(Accessor::default().attr_val(doc.root(), "./hl7:code").is_err());
    }
}
