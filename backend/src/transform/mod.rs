//! Transformation module.
//!
//! This module turns shipment exports into Crystal reports:
//! - Taxonomy: fine-grained status to coarse category
//! - Dates: cutoff and status_time reformatting
//! - Report: row mapping and CSV rendering
//! - Pipeline: parse, transform, render

pub mod dates;
pub mod pipeline;
pub mod report;
pub mod taxonomy;

pub use dates::{format_cutoff_date, format_status_time};
pub use pipeline::*;
pub use report::{check_columns, transform_shipment, transform_table, write_csv, FieldIssue, Report};
pub use taxonomy::{classify, status_label, taxonomy_description, Category, UNMAPPED_STATUS};
