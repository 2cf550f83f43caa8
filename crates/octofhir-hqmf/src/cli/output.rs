//! Output formatting utilities

use anyhow::{Context, Result};
use colored::Colorize;
use octofhir_hqmf_criteria::EmissionValue;
use octofhir_hqmf_diagnostics::Diagnostic;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::unset_override(),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Format a diagnostic, prefixed with the file it came from
pub fn format_diagnostic(file: &Path, diagnostic: &Diagnostic) -> String {
    format!("{}: {}", file.display().to_string().cyan(), diagnostic.to_colored_string())
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Format an emission record as JSON, keeping record and field order
pub fn format_json(value: &EmissionValue, pretty: bool) -> Result<String> {
    value.to_json_string(pretty).context("Failed to serialize JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_json_compact_and_pretty() {
        let value = EmissionValue::from(json!({"dx": {"type": "diagnosis"}}));
        assert_eq!(format_json(&value, false).unwrap(), r#"{"dx":{"type":"diagnosis"}}"#);
        assert!(format_json(&value, true).unwrap().contains("\n  \"dx\""));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_output("{}", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
