//! HQMF document layer
//!
//! This crate provides:
//! - A namespace-aware element tree built from HQMF XML with quick-xml
//! - Source locations on every element for diagnostics
//! - Declarative path queries (an XPath subset) resolved against fragments

pub mod element;
pub mod namespace;
pub mod parser;
pub mod path;

pub use element::*;
pub use namespace::*;
pub use parser::*;
pub use path::*;
