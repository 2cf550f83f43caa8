//! HQMF error codes following a structured numbering system
//!
//! Error code ranges:
//! - HQMF0001-HQMF0099: Document errors (XML syntax, encoding, structure)
//! - HQMF0100-HQMF0199: Classification errors (templates, value shapes, codes)
//! - HQMF0200-HQMF0299: Query errors (path query syntax, namespaces)
//! - HQMF0400-HQMF0499: System errors (I/O, serialization)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a document error (0001-0099)
    pub const fn is_document_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a classification error (0100-0199)
    pub const fn is_classification_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a query error (0200-0299)
    pub const fn is_query_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HQMF{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Document errors (0001-0099)
    map.insert(1, ErrorInfo::new("Malformed XML"));
    map.insert(2, ErrorInfo::new("Invalid UTF-8 in document"));
    map.insert(3, ErrorInfo::new("Missing root element"));
    map.insert(4, ErrorInfo::new("Mismatched closing tag"));
    map.insert(5, ErrorInfo::new("Undeclared namespace prefix"));
    map.insert(6, ErrorInfo::new("Not a quality measure document")
        .with_help("The document element must be QualityMeasureDocument in the urn:hl7-org:v3 namespace"));

    // Classification errors (0100-0199)
    map.insert(100, ErrorInfo::new("Unrecognized data criteria template")
        .with_help("Supported templates: Problem(s), Encounter(s), LabResults/Results, Procedure(s), Medication(s), RX, Demographics"));
    map.insert(101, ErrorInfo::new("Unrecognized value shape")
        .with_help("Supported value types: TS, IVL_PQ, CD"));
    map.insert(102, ErrorInfo::new("Unrecognized demographic code")
        .with_help("Supported codes: 424144002, 263495000, 102902016, 125680007, 103579009"));

    // Query errors (0200-0299)
    map.insert(200, ErrorInfo::new("Invalid path query"));
    map.insert(201, ErrorInfo::new("Unknown namespace prefix in path query"));

    // System errors (0400-0499)
    map.insert(401, ErrorInfo::new("I/O error"));
    map.insert(402, ErrorInfo::new("Serialization error"));

    map
});

// Document errors
pub const HQMF0001: ErrorCode = ErrorCode::new(1);
pub const HQMF0002: ErrorCode = ErrorCode::new(2);
pub const HQMF0003: ErrorCode = ErrorCode::new(3);
pub const HQMF0004: ErrorCode = ErrorCode::new(4);
pub const HQMF0005: ErrorCode = ErrorCode::new(5);
pub const HQMF0006: ErrorCode = ErrorCode::new(6);

// Classification errors
pub const HQMF0100: ErrorCode = ErrorCode::new(100);
pub const HQMF0101: ErrorCode = ErrorCode::new(101);
pub const HQMF0102: ErrorCode = ErrorCode::new(102);

// Query errors
pub const HQMF0200: ErrorCode = ErrorCode::new(200);
pub const HQMF0201: ErrorCode = ErrorCode::new(201);

// System errors
pub const HQMF0401: ErrorCode = ErrorCode::new(401);
pub const HQMF0402: ErrorCode = ErrorCode::new(402);
