//! Element tree for parsed HQMF documents

use octofhir_hqmf_diagnostics::SourceLocation;

/// An expanded XML name: namespace URI plus local part
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI, `None` for names in no namespace
    pub namespace: Option<String>,
    /// Local part of the name
    pub local: String,
}

impl QName {
    /// Create a name in the given namespace
    pub fn new(namespace: Option<&str>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(String::from),
            local: local.into(),
        }
    }

    /// Check against a namespace URI and local name
    pub fn is(&self, namespace: Option<&str>, local: &str) -> bool {
        self.local == local && self.namespace.as_deref() == namespace
    }
}

/// An attribute on an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// A child node of an element
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its attributes and children, as read from the document
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Location of the start tag
    pub location: SourceLocation,
}

impl Element {
    /// Create an empty element
    pub fn new(name: QName, location: SourceLocation) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            location,
        }
    }

    /// Get the value of an attribute
    pub fn attribute(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.is(namespace, local))
            .map(|a| a.value.as_str())
    }

    /// Iterate over child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of this element and all its descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }
}
