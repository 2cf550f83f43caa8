//! Classify command implementation

use super::output;
use crate::{DataCriteria, Document, ExtractOptions, extract_data_criteria};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Configuration for classify command
pub struct ClassifyConfig {
    pub file: PathBuf,
    pub skip_unrecognized: bool,
    pub verbose: bool,
}

/// Print the id, template type and section of every entry
pub fn classify(config: ClassifyConfig) -> Result<()> {
    let document = Document::from_path(&config.file)
        .with_context(|| format!("Failed to read HQMF file: {}", config.file.display()))?;

    let options = ExtractOptions::new().skip_unrecognized(config.skip_unrecognized);
    let extraction = extract_data_criteria(&document, &options)
        .with_context(|| format!("Failed to classify data criteria: {}", config.file.display()))?;

    for criteria in extraction.criteria() {
        println!("{}", format_row(criteria));
        if config.verbose {
            println!("  {}", criteria.to_string().dimmed());
        }
    }
    for diagnostic in extraction.diagnostics() {
        eprintln!("{}", output::format_diagnostic(&config.file, diagnostic));
    }
    Ok(())
}

/// One listing line: `id  type  section`
pub fn format_row(criteria: &DataCriteria<'_>) -> String {
    format!(
        "{:<24}  {:<14}  {}",
        criteria.id().unwrap_or_default(),
        criteria.template_type().as_str(),
        criteria.section().map(|s| s.as_str()).unwrap_or("-"),
    )
}
