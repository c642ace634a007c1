//! # Remesas - shipment-status export to Crystal report
//!
//! Remesas reads a shipment-status export (xlsx/xls/ods spreadsheet or
//! delimited text) and renders the `;`-separated CSV report Crystal imports:
//! columns are renamed, dates reformatted and fine-grained statuses collapsed
//! into six coarse states.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Export    │────▶│   Parser    │────▶│  Transform  │────▶│ Crystal CSV │
//! │ (xlsx/csv)  │     │ (auto-fmt)  │     │ (rows+dates)│     │    (;)      │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use remesas::{transform_file, TransformOptions};
//! use std::path::Path;
//!
//! let result = transform_file(Path::new("envios.xlsx"), &TransformOptions::default())?;
//! std::fs::write(&result.file_name, &result.csv)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`config`] - Environment configuration
//! - [`models`] - Input and report rows
//! - [`parser`] - Spreadsheet and delimited-text parsing
//! - [`transform`] - Taxonomy, dates, row mapping and pipeline
//! - [`api`] - HTTP API server and log stream

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::Config;

pub use error::{
    ConfigError, FieldError, ParseError, PipelineError, ServerError, TransformError,
};

pub use models::{ReportRow, ShipmentRow, REPORT_COLUMNS, REQUIRED_COLUMNS};

pub use parser::{
    detect_delimiter, detect_encoding, decode_content, parse_bytes_auto, parse_file_auto,
    ParseOptions, ParsedTable, SourceFormat,
};

pub use transform::{
    classify, format_cutoff_date, format_status_time, status_label, taxonomy_description,
    transform_shipment, transform_table, Category, FieldIssue, Report, UNMAPPED_STATUS,
};

pub use transform::pipeline::{
    output_file_name, transform_bytes, transform_file, PipelineResult, SourceInfo,
    TransformOptions,
};

pub use api::types::{error_response, UploadResponse};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
