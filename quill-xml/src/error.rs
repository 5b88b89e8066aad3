//! Error types for the XML subsystem

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the schema registry and document parsing.
///
/// Schema errors are fatal at startup: a registry that cannot compile all
/// of its schemas must never fall back to treating documents as valid.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("unknown schema kind '{name}'")]
    UnknownSchema { name: String },

    #[error("schema file for '{kind}' not found in {dir}")]
    SchemaMissing { kind: String, dir: String },

    #[error("failed to read schema file {path}: {source}")]
    SchemaRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("schema '{kind}' failed to compile: {message}")]
    SchemaCompile { kind: String, message: String },

    #[error("malformed document: {message}")]
    Malformed { message: String },
}

/// A single schema violation, positioned in the offending document.
///
/// Line and column are 1-based and point at the start of the construct
/// that triggered the violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ValidationIssue {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Outcome of validating one document against one schema.
///
/// A malformed document produces an invalid report with a single
/// descriptive issue; validation never panics or returns an opaque error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn invalid(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}
