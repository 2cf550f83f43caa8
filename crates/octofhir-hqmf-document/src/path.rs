//! Declarative path queries over element trees
//!
//! Supports the XPath subset HQMF extraction needs: relative child steps
//! (`./cda:observationCriteria/cda:id`), wildcard steps (`*`), and a trailing
//! attribute step (`@extension`, `@xsi:type`). Results follow document order,
//! and the first-match operations stop at the earliest hit.

use crate::element::{Element, QName};
use crate::namespace::Namespaces;
use octofhir_hqmf_diagnostics::{HQMF0200, HQMF0201, HqmfError, Result};
use smallvec::SmallVec;
use std::fmt;

/// A name test in a query step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTest {
    pub namespace: Option<String>,
    pub local: String,
}

impl NameTest {
    fn matches(&self, name: &QName) -> bool {
        name.is(self.namespace.as_deref(), &self.local)
    }
}

/// One child step of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `*`: any child element
    AnyElement,
    /// A named child element
    Element(NameTest),
}

impl Step {
    fn matches(&self, element: &Element) -> bool {
        match self {
            Step::AnyElement => true,
            Step::Element(test) => test.matches(&element.name),
        }
    }
}

/// What a query matched
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'e> {
    Element(&'e Element),
    Attribute(&'e str),
}

impl<'e> Selection<'e> {
    /// Textual content: the attribute value, or the element's text
    pub fn text(&self) -> String {
        match self {
            Selection::Element(e) => e.text(),
            Selection::Attribute(value) => value.to_string(),
        }
    }

    /// The matched element, if the query selected one
    pub fn element(&self) -> Option<&'e Element> {
        match self {
            Selection::Element(e) => Some(e),
            Selection::Attribute(_) => None,
        }
    }
}

/// A compiled path query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    source: String,
    steps: SmallVec<[Step; 4]>,
    attribute: Option<NameTest>,
}

impl PathQuery {
    /// Compile a query, resolving prefixes against `namespaces`
    pub fn compile(query: &str, namespaces: &Namespaces) -> Result<Self> {
        let body = query.trim();
        if body.starts_with('/') {
            return Err(HqmfError::query(HQMF0200, "Absolute paths are not supported", query));
        }
        let body = body.strip_prefix("./").unwrap_or(body);

        let mut steps = SmallVec::new();
        let mut attribute = None;
        let segments: Vec<&str> = body.split('/').collect();
        let last = segments.len() - 1;

        for (i, segment) in segments.iter().enumerate() {
            match *segment {
                "" => {
                    return Err(HqmfError::query(HQMF0200, "Empty path step", query));
                }
                "." => {}
                "*" => steps.push(Step::AnyElement),
                s if s.starts_with('@') => {
                    if i != last {
                        return Err(HqmfError::query(
                            HQMF0200,
                            "Attribute step must be the last step",
                            query,
                        ));
                    }
                    attribute = Some(name_test(&s[1..], namespaces, query)?);
                }
                s => steps.push(Step::Element(name_test(s, namespaces, query)?)),
            }
        }

        Ok(Self {
            source: query.to_string(),
            steps,
            attribute,
        })
    }

    /// Compile a query against the HQMF `cda`/`xsi` bindings
    pub fn hqmf(query: &str) -> Result<Self> {
        Self::compile(query, &Namespaces::hqmf())
    }

    /// The query text this was compiled from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the query ends in an attribute step
    pub fn selects_attribute(&self) -> bool {
        self.attribute.is_some()
    }

    /// Append a trailing path to this query, as `"{self}/{suffix}"`
    pub fn join(&self, suffix: &str, namespaces: &Namespaces) -> Result<Self> {
        if self.attribute.is_some() {
            return Err(HqmfError::query(
                HQMF0200,
                "Cannot extend a query that selects an attribute",
                self.source.as_str(),
            ));
        }
        let extended = Self::compile(suffix, namespaces)?;
        let mut steps = self.steps.clone();
        steps.extend(extended.steps);
        Ok(Self {
            source: format!("{}/{}", self.source.trim_end_matches('/'), suffix.trim_start_matches("./")),
            steps,
            attribute: extended.attribute,
        })
    }

    /// First match in document order
    pub fn first<'e>(&self, context: &'e Element) -> Option<Selection<'e>> {
        self.first_from(context, 0)
    }

    fn first_from<'e>(&self, element: &'e Element, depth: usize) -> Option<Selection<'e>> {
        let Some(step) = self.steps.get(depth) else {
            return match &self.attribute {
                Some(test) => element
                    .attributes
                    .iter()
                    .find(|a| test.matches(&a.name))
                    .map(|a| Selection::Attribute(a.value.as_str())),
                None => Some(Selection::Element(element)),
            };
        };

        element
            .child_elements()
            .filter(|child| step.matches(child))
            .find_map(|child| self.first_from(child, depth + 1))
    }

    /// All matches in document order
    pub fn select<'e>(&self, context: &'e Element) -> Vec<Selection<'e>> {
        let mut out = Vec::new();
        self.select_from(context, 0, &mut out);
        out
    }

    fn select_from<'e>(&self, element: &'e Element, depth: usize, out: &mut Vec<Selection<'e>>) {
        let Some(step) = self.steps.get(depth) else {
            match &self.attribute {
                Some(test) => out.extend(
                    element
                        .attributes
                        .iter()
                        .filter(|a| test.matches(&a.name))
                        .map(|a| Selection::Attribute(a.value.as_str())),
                ),
                None => out.push(Selection::Element(element)),
            }
            return;
        };

        for child in element.child_elements().filter(|c| step.matches(c)) {
            self.select_from(child, depth + 1, out);
        }
    }
}

impl fmt::Display for PathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn name_test(raw: &str, namespaces: &Namespaces, query: &str) -> Result<NameTest> {
    let (prefix, local) = match raw.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, raw),
    };
    if local.is_empty() || local.contains(['*', '@', '[', '(']) {
        return Err(HqmfError::query(
            HQMF0200,
            format!("Unsupported name test '{}'", raw),
            query,
        ));
    }

    let namespace = match prefix {
        None => None,
        Some(prefix) => Some(
            namespaces
                .resolve(prefix)
                .ok_or_else(|| {
                    HqmfError::query(HQMF0201, format!("Unknown namespace prefix '{}'", prefix), query)
                })?
                .to_string(),
        ),
    };

    Ok(NameTest {
        namespace,
        local: local.to_string(),
    })
}
