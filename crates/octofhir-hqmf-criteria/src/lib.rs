//! HQMF data criteria extraction
//!
//! This crate provides:
//! - Template classification of data criteria entries
//! - Value and effective-time decoding
//! - Demographic property mapping
//! - Emission records and their recursive sanitizing
//! - Restriction inheritance between parent and child criteria

pub mod accessor;
pub mod data_criteria;
pub mod demographic;
pub mod effective_time;
pub mod emission;
pub mod restriction;
pub mod sanitize;
pub mod template;
pub mod value;

pub use accessor::*;
pub use data_criteria::*;
pub use demographic::*;
pub use effective_time::*;
pub use emission::*;
pub use restriction::*;
pub use sanitize::*;
pub use template::*;
pub use value::*;
