//! Error types for the Remesas report pipeline.
//!
//! Errors come in two tiers:
//!
//! - [`FieldError`] - a single date/time value could not be reformatted. The
//!   field is left empty and the run goes on.
//! - Everything else ([`ParseError`], [`TransformError`], [`PipelineError`])
//!   aborts the whole run and no report is produced.
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Input Parsing Errors
// =============================================================================

/// Errors while reading the uploaded spreadsheet or delimited file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook could not be opened or a sheet could not be read.
    #[error("Invalid spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// The requested worksheet does not exist.
    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),

    /// Invalid delimited-text content.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file.
    #[error("Input file is empty")]
    EmptyFile,

    /// No header row found.
    #[error("No header row found")]
    NoHeaders,
}

// =============================================================================
// Field Errors (reported, never fatal)
// =============================================================================

/// A date or time value that does not match its expected shape.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FieldError {
    /// `cutoff` is not `YYYY-MM-DD HH:MM`.
    #[error("Formato de fecha de corte no válido: {source}")]
    Cutoff {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// `status_time` is not `YYYY-MM-DD HH:MM:SS` once cleaned.
    #[error("Formato de hora de estado no válido: {source}")]
    StatusTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl FieldError {
    /// Input column the offending value came from.
    pub fn column(&self) -> &'static str {
        match self {
            FieldError::Cutoff { .. } => "cutoff",
            FieldError::StatusTime { .. } => "status_time",
        }
    }

    /// The raw value that failed to parse.
    pub fn value(&self) -> &str {
        match self {
            FieldError::Cutoff { value, .. } | FieldError::StatusTime { value, .. } => value,
        }
    }
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors while mapping input rows to report rows.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Required input columns are absent.
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error returned by [`crate::transform::pipeline::transform_bytes`].
/// Any of these means no report was produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input parsing error.
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// Transformation error.
    #[error("{0}")]
    Transform(#[from] TransformError),

    /// Rendering the CSV report failed.
    #[error("Failed to write report: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds a value of the wrong type.
    #[error("Invalid value for {key}: '{value}' ({message})")]
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Could not bind or serve.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking transformation task panicked or was cancelled.
    #[error("Transformation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for single-field formatting.
pub type FieldResult<T> = Result<T, FieldError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ParseError -> PipelineError
        let parse_err = ParseError::EmptyFile;
        let pipeline_err: PipelineError = parse_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // TransformError -> PipelineError
        let transform_err = TransformError::MissingColumns(vec!["status".into(), "cutoff".into()]);
        let pipeline_err: PipelineError = transform_err.into();
        assert_eq!(
            pipeline_err.to_string(),
            "Missing required column(s): status, cutoff"
        );
    }

    #[test]
    fn test_field_error_accessors() {
        let source = chrono::NaiveDateTime::parse_from_str("x", "%Y").unwrap_err();
        let err = FieldError::Cutoff {
            value: "not-a-date".into(),
            source,
        };

        assert_eq!(err.column(), "cutoff");
        assert_eq!(err.value(), "not-a-date");
        assert!(err.to_string().starts_with("Formato de fecha de corte no válido: "));
    }

    #[test]
    fn test_config_error_format() {
        let err = ConfigError::InvalidValue {
            key: "REMESAS_PORT",
            value: "abc".into(),
            message: "invalid digit found in string".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("REMESAS_PORT"));
        assert!(msg.contains("'abc'"));
    }
}
