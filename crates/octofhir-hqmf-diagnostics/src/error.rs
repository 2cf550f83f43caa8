//! HQMF error types

use crate::{ErrorCode, HQMF0100, HQMF0101, HQMF0102, HQMF0401, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - extraction of the record cannot proceed
    Error,
    /// Warning - the record was skipped but extraction continued
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with location and context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Source location
    pub location: Option<SourceLocation>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render with terminal colors
    #[cfg(feature = "colored")]
    pub fn to_colored_string(&self) -> String {
        use colored::Colorize;

        let severity = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
        };
        let mut out = format!("{}[{}]: {}", severity, self.code, self.message);
        if let Some(loc) = &self.location {
            out.push_str(&format!(" {} {}", "at".dimmed(), loc.to_string().cyan()));
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  {} {}", "help:".green(), help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        }
        Ok(())
    }
}

/// Main HQMF error type
#[derive(Debug, Clone, Error)]
pub enum HqmfError {
    /// The source document could not be read as XML
    #[error("{code}: {message}")]
    Document {
        code: ErrorCode,
        message: String,
        location: Option<SourceLocation>,
    },

    /// A path query could not be compiled
    #[error("{code}: {message} in query '{query}'")]
    Query {
        code: ErrorCode,
        message: String,
        query: String,
    },

    /// The template identifier matches no known data criteria template
    #[error("{}: Unknown data criteria template identifier [{identifier}]", HQMF0100)]
    UnrecognizedTemplate {
        identifier: String,
        location: Option<SourceLocation>,
    },

    /// A value fragment declares a shape tag with no decoder
    #[error("{}: Unknown value type [{shape}]", HQMF0101)]
    UnrecognizedValueShape {
        shape: String,
        location: Option<SourceLocation>,
    },

    /// A characteristic criteria carries a code outside the demographic table
    #[error("{}: Unknown demographic identifier [{}]", HQMF0102, .code.as_deref().unwrap_or(""))]
    UnrecognizedDemographicCode {
        code: Option<String>,
        location: Option<SourceLocation>,
    },

    /// I/O or serialization failure
    #[error("{code}: {message}")]
    System { code: ErrorCode, message: String },
}

impl HqmfError {
    /// Create a document error
    pub fn document(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Document {
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Create a document error with location
    pub fn document_at(code: ErrorCode, message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Document {
            code,
            message: message.into(),
            location: Some(location),
        }
    }

    /// Create a query error
    pub fn query(code: ErrorCode, message: impl Into<String>, query: impl Into<String>) -> Self {
        Self::Query {
            code,
            message: message.into(),
            query: query.into(),
        }
    }

    /// Create a system error
    pub fn system(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::System {
            code,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Document { code, .. } => *code,
            Self::Query { code, .. } => *code,
            Self::UnrecognizedTemplate { .. } => HQMF0100,
            Self::UnrecognizedValueShape { .. } => HQMF0101,
            Self::UnrecognizedDemographicCode { .. } => HQMF0102,
            Self::System { code, .. } => *code,
        }
    }

    /// Get the location if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Document { location, .. } => location.as_ref(),
            Self::UnrecognizedTemplate { location, .. } => location.as_ref(),
            Self::UnrecognizedValueShape { location, .. } => location.as_ref(),
            Self::UnrecognizedDemographicCode { location, .. } => location.as_ref(),
            _ => None,
        }
    }

    /// Attach a location to a classification or document error that has none
    pub fn with_location(mut self, at: SourceLocation) -> Self {
        match &mut self {
            Self::Document { location, .. }
            | Self::UnrecognizedTemplate { location, .. }
            | Self::UnrecognizedValueShape { location, .. }
            | Self::UnrecognizedDemographicCode { location, .. } => {
                location.get_or_insert(at);
            }
            _ => {}
        }
        self
    }

    /// Whether this error stems from a foreign template, value shape or code
    /// rather than from a broken document or query
    pub fn is_classification_error(&self) -> bool {
        self.code().is_classification_error()
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        self.to_diagnostic_with(Severity::Error)
    }

    /// Convert to a diagnostic with the given severity
    pub fn to_diagnostic_with(&self, severity: Severity) -> Diagnostic {
        let mut diag = match severity {
            Severity::Error => Diagnostic::error(self.code(), self.to_string()),
            Severity::Warning => Diagnostic::warning(self.code(), self.to_string()),
        };
        if let Some(loc) = self.location() {
            diag = diag.with_location(loc.clone());
        }
        if let Some(help) = self.code().info().help {
            diag = diag.with_help(help);
        }
        diag
    }
}

impl From<std::io::Error> for HqmfError {
    fn from(err: std::io::Error) -> Self {
        Self::system(HQMF0401, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HQMF0001;

    #[test]
    fn test_unrecognized_template_display() {
        let err = HqmfError::UnrecognizedTemplate {
            identifier: "Allergy".to_string(),
            location: Some(SourceLocation::new(4, 7, 120, 5)),
        };

        assert_eq!(err.code(), HQMF0100);
        assert_eq!(
            err.to_string(),
            "HQMF0100: Unknown data criteria template identifier [Allergy]"
        );
        assert_eq!(err.location().map(|l| l.line), Some(4));
        assert!(err.is_classification_error());
    }

    #[test]
    fn test_demographic_code_display_when_absent() {
        let err = HqmfError::UnrecognizedDemographicCode {
            code: None,
            location: None,
        };
        assert_eq!(err.to_string(), "HQMF0102: Unknown demographic identifier []");
    }

    #[test]
    fn test_diagnostic_carries_help_and_location() {
        let err = HqmfError::UnrecognizedValueShape {
            shape: "ST".to_string(),
            location: Some(SourceLocation::new(2, 5, 40, 5)),
        };
        let diag = err.to_diagnostic_with(Severity::Warning);

        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.code, HQMF0101);
        assert!(diag.help.is_some());
        assert!(diag.to_string().contains("2:5"));
    }

    #[test]
    fn test_document_error_is_not_classification() {
        let err = HqmfError::document(HQMF0001, "unexpected end of file");
        assert!(!err.is_classification_error());
        assert!(err.to_diagnostic().to_string().starts_with("error: HQMF0001"));
    }

    #[test]
    fn test_with_location_keeps_existing() {
        let inner = SourceLocation::new(9, 1, 300, 4);
        let err = HqmfError::UnrecognizedValueShape {
            shape: "ST".to_string(),
            location: Some(inner.clone()),
        }
        .with_location(SourceLocation::new(1, 1, 0, 4));
        assert_eq!(err.location(), Some(&inner));

        let err = HqmfError::UnrecognizedDemographicCode { code: None, location: None }
            .with_location(SourceLocation::new(3, 2, 50, 4));
        assert_eq!(err.location().map(|l| l.line), Some(3));
    }

    #[test]
    fn test_io_error_conversion() {
        let err: HqmfError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert_eq!(err.code(), HQMF0401);
    }
}
