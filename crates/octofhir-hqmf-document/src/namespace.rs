//! Namespace prefix table used to compile path queries

use indexmap::IndexMap;

/// HL7 version 3 namespace, the default namespace of HQMF documents
pub const HL7_V3_NAMESPACE: &str = "urn:hl7-org:v3";

/// XML Schema instance namespace, home of `xsi:type`
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// The namespace permanently bound to the `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefix to namespace URI bindings for path queries.
///
/// Query prefixes are independent of the prefixes a document happens to use:
/// `cda:id` matches `<id xmlns="urn:hl7-org:v3">` as well as `<v3:id>` when
/// `v3` is bound to the same URI in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    bindings: IndexMap<String, String>,
}

impl Namespaces {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            bindings: IndexMap::new(),
        }
    }

    /// The bindings HQMF queries are written against: `cda` and `xsi`
    pub fn hqmf() -> Self {
        Self::new()
            .with("cda", HL7_V3_NAMESPACE)
            .with("xsi", XSI_NAMESPACE)
    }

    /// Add or replace a binding
    pub fn with(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.bindings.insert(prefix.into(), uri.into());
        self
    }

    /// Look up the namespace bound to `prefix`
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.bindings.get(prefix).map(String::as_str)
    }

    /// Iterate over the bindings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::hqmf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hqmf_bindings() {
        let ns = Namespaces::hqmf();
        assert_eq!(ns.resolve("cda"), Some(HL7_V3_NAMESPACE));
        assert_eq!(ns.resolve("xsi"), Some(XSI_NAMESPACE));
        assert_eq!(ns.resolve("xml"), Some(XML_NAMESPACE));
        assert_eq!(ns.resolve("fhir"), None);
    }

    #[test]
    fn test_rebinding_replaces() {
        let ns = Namespaces::hqmf().with("cda", "urn:example");
        assert_eq!(ns.resolve("cda"), Some("urn:example"));
        assert_eq!(ns.iter().count(), 2);
    }
}
