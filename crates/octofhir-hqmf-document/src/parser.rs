//! Builds an [`Element`] tree from HQMF XML text
//!
//! Namespace prefixes are resolved while reading, so the tree only carries
//! expanded names and never depends on the prefixes a document chose.

use crate::element::{Attribute, Element, Node, QName};
use crate::namespace::XML_NAMESPACE;
use octofhir_hqmf_diagnostics::{
    HQMF0001, HQMF0002, HQMF0003, HQMF0004, HQMF0005, HqmfError, LineIndex, Result, Span,
};
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use std::fs;
use std::path::Path;

/// A parsed HQMF document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse a document from XML text
    pub fn parse(source: &str) -> Result<Self> {
        let root = TreeBuilder::new(source).build()?;
        log::debug!(
            "parsed document with root <{}> ({} bytes)",
            root.name.local,
            source.len()
        );
        Ok(Self { root })
    }

    /// Read and parse a document from a file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// The document element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Take ownership of the document element
    pub fn into_root(self) -> Element {
        self.root
    }
}

struct TreeBuilder<'s> {
    source: &'s str,
    index: LineIndex,
    open: Vec<Element>,
    /// In-scope namespace declarations, innermost last; `None` prefix is the default namespace
    bindings: Vec<(Option<String>, Option<String>)>,
    /// Number of bindings each open element declared
    declared: Vec<usize>,
    root: Option<Element>,
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            index: LineIndex::new(source),
            open: Vec::new(),
            bindings: Vec::new(),
            declared: Vec::new(),
            root: None,
        }
    }

    fn build(mut self) -> Result<Element> {
        let mut reader = Reader::from_str(self.source);

        let mut buf = Vec::new();
        loop {
            let before = reader.buffer_position() as usize;
            let event = match reader.read_event_into(&mut buf) {
                Ok(event) => event,
                Err(e) => {
                    let at = reader.error_position() as usize;
                    return Err(self.error_at(HQMF0001, e.to_string(), Span::new(at, at)));
                }
            };
            let after = reader.buffer_position() as usize;

            match event {
                Event::Start(ref e) => {
                    let span = self.tag_span(before, after);
                    self.open_element(e, span)?;
                }
                Event::Empty(ref e) => {
                    let span = self.tag_span(before, after);
                    self.open_element(e, span)?;
                    self.close_element();
                }
                Event::End(_) => self.close_element(),
                Event::Text(e) => {
                    let text = e
                        .decode()
                        .map_err(|err| self.error_at(HQMF0002, err.to_string(), Span::new(before, after)))?;
                    self.push_text(&text);
                }
                Event::GeneralRef(e) => {
                    let text = self.resolve_reference(&e, Span::new(before, after))?;
                    self.push_text(&text);
                }
                Event::CData(e) => {
                    let text = String::from_utf8(e.into_inner().to_vec())
                        .map_err(|err| self.error_at(HQMF0002, err.to_string(), Span::new(before, after)))?;
                    self.push_text(&text);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(unclosed) = self.open.last() {
            return Err(HqmfError::document_at(
                HQMF0004,
                format!("Unclosed element <{}>", unclosed.name.local),
                unclosed.location.clone(),
            ));
        }

        self.root
            .ok_or_else(|| HqmfError::document(HQMF0003, "Document has no root element"))
    }

    /// Point tag locations at the opening `<`
    fn tag_span(&self, before: usize, after: usize) -> Span {
        let start = self
            .source
            .get(before..after)
            .and_then(|s| s.find('<'))
            .map(|i| before + i)
            .unwrap_or(before);
        Span::new(start, after)
    }

    fn error_at(&self, code: octofhir_hqmf_diagnostics::ErrorCode, message: String, span: Span) -> HqmfError {
        HqmfError::document_at(code, message, self.index.locate(self.source, span))
    }

    fn open_element(&mut self, start: &BytesStart, span: Span) -> Result<()> {
        let location = self.index.locate(self.source, span);
        let raw_name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| HqmfError::document_at(HQMF0002, e.to_string(), location.clone()))?
            .to_string();

        // Declarations apply to the element that carries them, so collect them first
        let mut declared = 0;
        let mut plain = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| HqmfError::document_at(HQMF0001, e.to_string(), location.clone()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| HqmfError::document_at(HQMF0002, e.to_string(), location.clone()))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| HqmfError::document_at(HQMF0001, e.to_string(), location.clone()))?
                .into_owned();

            if key == "xmlns" {
                self.bindings.push((None, (!value.is_empty()).then_some(value)));
                declared += 1;
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                self.bindings.push((Some(prefix.to_string()), Some(value)));
                declared += 1;
            } else {
                plain.push((key, value));
            }
        }
        self.declared.push(declared);

        let (prefix, local) = split_qname(&raw_name);
        let namespace = self.resolve(prefix, true).map_err(|unbound| {
            HqmfError::document_at(
                HQMF0005,
                format!("Undeclared namespace prefix '{}' on <{}>", unbound, raw_name),
                location.clone(),
            )
        })?;

        let mut element = Element::new(QName::new(namespace.as_deref(), local), location.clone());
        for (key, value) in plain {
            let (prefix, local) = split_qname(&key);
            let namespace = self.resolve(prefix, false).map_err(|unbound| {
                HqmfError::document_at(
                    HQMF0005,
                    format!("Undeclared namespace prefix '{}' on attribute {}", unbound, key),
                    location.clone(),
                )
            })?;
            element.attributes.push(Attribute {
                name: QName::new(namespace.as_deref(), local),
                value,
            });
        }

        self.open.push(element);
        Ok(())
    }

    fn close_element(&mut self) {
        let Some(mut element) = self.open.pop() else {
            return;
        };
        // Indentation between child elements is not content
        element
            .children
            .retain(|node| !matches!(node, Node::Text(t) if t.trim().is_empty()));
        let declared = self.declared.pop().unwrap_or(0);
        self.bindings.truncate(self.bindings.len().saturating_sub(declared));

        match self.open.last_mut() {
            Some(parent) => parent.children.push(Node::Element(element)),
            None if self.root.is_none() => self.root = Some(element),
            None => log::warn!("ignoring extra top-level element <{}>", element.name.local),
        }
    }

    /// Append text, merging with a preceding text node so entity references
    /// split across events read back as one string
    fn push_text(&mut self, text: &str) {
        let Some(current) = self.open.last_mut() else {
            return;
        };
        match current.children.last_mut() {
            Some(Node::Text(previous)) => previous.push_str(text),
            _ => current.children.push(Node::Text(text.to_string())),
        }
    }

    fn resolve_reference(&self, reference: &BytesRef, span: Span) -> Result<String> {
        if let Some(ch) = reference
            .resolve_char_ref()
            .map_err(|e| self.error_at(HQMF0001, e.to_string(), span))?
        {
            return Ok(ch.to_string());
        }
        let name = reference
            .decode()
            .map_err(|e| self.error_at(HQMF0002, e.to_string(), span))?;
        resolve_predefined_entity(&name)
            .map(String::from)
            .ok_or_else(|| self.error_at(HQMF0001, format!("Unknown entity reference &{};", name), span))
    }

    /// Resolve a prefix against the in-scope declarations.
    ///
    /// Unprefixed attributes are in no namespace; unprefixed elements take the
    /// default namespace. An undeclared prefix is returned as the error.
    fn resolve(&self, prefix: Option<&str>, is_element: bool) -> std::result::Result<Option<String>, String> {
        match prefix {
            None if !is_element => Ok(None),
            None => Ok(self
                .bindings
                .iter()
                .rev()
                .find(|(p, _)| p.is_none())
                .and_then(|(_, uri)| uri.clone())),
            Some("xml") => Ok(Some(XML_NAMESPACE.to_string())),
            Some(prefix) => self
                .bindings
                .iter()
                .rev()
                .find(|(p, _)| p.as_deref() == Some(prefix))
                .and_then(|(_, uri)| uri.clone())
                .map(Some)
                .ok_or_else(|| prefix.to_string()),
        }
    }
}

fn split_qname(raw: &str) -> (Option<&str>, &str) {
    match raw.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{HL7_V3_NAMESPACE, XSI_NAMESPACE};

    #[test]
    fn test_default_namespace_applies_to_descendants() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<QualityMeasureDocument xmlns="urn:hl7-org:v3">
    <id extension="abc"/>
</QualityMeasureDocument>"#;

        let doc = Document::parse(xml).unwrap();
        let root = doc.root();
        assert!(root.name.is(Some(HL7_V3_NAMESPACE), "QualityMeasureDocument"));

        let id = root.child_elements().next().unwrap();
        assert!(id.name.is(Some(HL7_V3_NAMESPACE), "id"));
        assert_eq!(id.attribute(None, "extension"), Some("abc"));
        assert_eq!(id.location.line, 3);
        assert_eq!(id.location.column, 5);
    }

    #[test]
    fn test_prefixed_attributes_resolve() {
        let xml = r#"<entry xmlns="urn:hl7-org:v3" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<value xsi:type="CD" code="1"/></entry>"#;

        let doc = Document::parse(xml).unwrap();
        let value = doc.root().child_elements().next().unwrap();
        assert_eq!(value.attribute(Some(XSI_NAMESPACE), "type"), Some("CD"));
        assert_eq!(value.attribute(None, "code"), Some("1"));
        assert_eq!(value.attributes.len(), 2);
    }

    #[test]
    fn test_text_is_unescaped() {
        let doc = Document::parse("<t>Tom &amp; Jerry &#65;</t>").unwrap();
        assert_eq!(doc.root().text(), "Tom & Jerry A");
        assert_eq!(doc.root().children.len(), 1);
    }

    #[test]
    fn test_indentation_is_dropped() {
        let doc = Document::parse("<a>\n  <b/>\n  <c/>\n</a>").unwrap();
        assert_eq!(doc.root().children.len(), 2);
        assert_eq!(doc.root().text(), "");
    }

    #[test]
    fn test_undeclared_prefix_is_an_error() {
        let err = Document::parse("<cda:entry/>").unwrap_err();
        assert_eq!(err.code(), HQMF0005);
    }

    #[test]
    fn test_mismatched_tags_are_reported() {
        let err = Document::parse("<a>\n<b></a>").unwrap_err();
        assert_eq!(err.code(), HQMF0001);
        assert!(err.location().is_some());
    }

    #[test]
    fn test_empty_input_has_no_root() {
        let err = Document::parse("  ").unwrap_err();
        assert_eq!(err.code(), HQMF0003);
    }

    #[test]
    fn test_namespace_scope_ends_with_element() {
        let xml = r#"<root><inner xmlns="urn:hl7-org:v3"/><outer/></root>"#;
        let doc = Document::parse(xml).unwrap();
        let children: Vec<_> = doc.root().child_elements().collect();
        assert_eq!(children[0].name.namespace.as_deref(), Some(HL7_V3_NAMESPACE));
        assert_eq!(children[1].name.namespace, None);
    }
}
