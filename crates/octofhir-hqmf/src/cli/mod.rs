//! CLI functionality for the HQMF tool
//!
//! This module contains:
//! - Data criteria extraction to JSON
//! - Entry classification listings
//! - Output formatting

pub mod classify;
pub mod extract;
pub mod output;
