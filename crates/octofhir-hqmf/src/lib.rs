//! HQMF data criteria extraction for Rust
//!
//! This crate reads HQMF release 2 quality measure documents and provides:
//! - Classification of each data criteria entry by template
//! - Decoding of criteria values and effective times
//! - Emission records ready for JSON serialization
//!
//! # Example
//!
//! ```ignore
//! use octofhir_hqmf::{Document, ExtractOptions, extract_data_criteria};
//!
//! let document = Document::from_path("measure.xml".as_ref())?;
//! let extraction = extract_data_criteria(&document, &ExtractOptions::default())?;
//! println!("{}", extraction.to_emission().to_json());
//! ```

pub use octofhir_hqmf_criteria as criteria;
pub use octofhir_hqmf_diagnostics as diagnostics;
pub use octofhir_hqmf_document as document;

pub use octofhir_hqmf_criteria::{DataCriteria, EmissionValue, Section, TemplateType};
pub use octofhir_hqmf_diagnostics::{Diagnostic, HqmfError, Result};
pub use octofhir_hqmf_document::{Document, Namespaces};

mod extract;

pub use extract::{ExtractOptions, Extraction, extract_data_criteria};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
