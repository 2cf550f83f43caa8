//! Extract command implementation

use super::output;
use crate::{Document, ExtractOptions, extract_data_criteria};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Configuration for extract command
pub struct ExtractConfig {
    pub file: PathBuf,
    pub pretty: bool,
    pub skip_unrecognized: bool,
    /// Keep null and empty fields in the output
    pub raw: bool,
    pub output_file: Option<PathBuf>,
}

/// Extract the data criteria of a measure document as JSON
pub fn extract(config: ExtractConfig) -> Result<()> {
    let json = render(&config)?;
    output::write_output(&json, config.output_file.as_deref())
}

/// The JSON text `extract` writes for `config`
pub fn render(config: &ExtractConfig) -> Result<String> {
    let document = Document::from_path(&config.file)
        .with_context(|| format!("Failed to read HQMF file: {}", config.file.display()))?;

    let options = ExtractOptions::new()
        .skip_unrecognized(config.skip_unrecognized)
        .sanitize(!config.raw);
    let extraction = extract_data_criteria(&document, &options)
        .with_context(|| format!("Failed to extract data criteria: {}", config.file.display()))?;

    for diagnostic in extraction.diagnostics() {
        eprintln!("{}", output::format_diagnostic(&config.file, diagnostic));
    }

    output::format_json(&extraction.to_emission(), config.pretty)
}
