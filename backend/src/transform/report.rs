//! Shipment rows to Crystal report rows.
//!
//! One report row per shipment row. Date failures blank their own field and
//! are collected as [`FieldIssue`]s; missing columns abort the whole table.

use serde::Serialize;
use std::fmt;
use std::io::Write;

use super::dates::{format_cutoff_date, format_status_time};
use super::taxonomy::{classify, status_label, Category};
use crate::error::{FieldError, TransformError, TransformResult};
use crate::models::{
    ReportRow, ShipmentRow, BUSINESS_UNIT, DELIVERY_NOTE, DOCUMENT_NUMBER, REPORT_COLUMNS,
    REQUIRED_COLUMNS, SENDER,
};
use crate::parser::ParsedTable;

/// Field delimiter of the report.
pub const REPORT_DELIMITER: u8 = b';';

/// A date/time value that could not be reformatted, with its location.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldIssue {
    /// Input line (header is line 1)
    pub line: usize,
    pub column: String,
    pub value: String,
    /// User-facing notice
    pub message: String,
}

impl FieldIssue {
    pub fn new(line: usize, error: &FieldError) -> Self {
        Self {
            line,
            column: error.column().to_string(),
            value: error.value().to_string(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line {}, column '{}' (value '{}'): {}",
            self.line, self.column, self.value, self.message
        )
    }
}

/// Report rows plus the field issues met while building them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub issues: Vec<FieldIssue>,
}

impl Report {
    /// True when every date/time field was reformatted.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Render the report as `;`-separated CSV, header included.
    pub fn to_csv(&self) -> csv::Result<Vec<u8>> {
        let mut buf = Vec::new();
        write_csv(&self.rows, &mut buf)?;
        Ok(buf)
    }
}

/// Write the header and every row. The header is written even with no rows.
pub fn write_csv<W: Write>(rows: &[ReportRow], writer: W) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(REPORT_DELIMITER)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    writer.write_record(REPORT_COLUMNS)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;
    Ok(())
}

/// Map one shipment to its report row.
///
/// `status_time` is only read for delivered shipments, so a bad value on any
/// other row is neither parsed nor reported.
pub fn transform_shipment(shipment: &ShipmentRow) -> (ReportRow, Vec<FieldError>) {
    let mut errors = Vec::new();
    let delivered = classify(&shipment.status) == Some(Category::Delivered);

    let fecha_remesa = format_cutoff_date(&shipment.cutoff)
        .map_err(|e| errors.push(e))
        .ok();

    let fecha_entrega = if delivered {
        format_status_time(&shipment.status_time)
            .map_err(|e| errors.push(e))
            .ok()
    } else {
        None
    };

    let row = ReportRow {
        numero_remesa: shipment.client_id.clone(),
        fecha_remesa,
        estado_remesa: status_label(&shipment.status),
        tiene_novedad: delivered.then_some(1),
        descripcion_novedad: delivered.then_some(DELIVERY_NOTE),
        unidad_negocio: BUSINESS_UNIT,
        fecha_entrega,
        numero_documento: DOCUMENT_NUMBER,
        remitente: SENDER,
        origen: shipment.pickup_address.clone(),
        destino: shipment.receiver_address.clone(),
    };

    (row, errors)
}

/// Fail with every required column the headers lack.
pub fn check_columns(headers: &[String]) -> TransformResult<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .map(|s| s.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(TransformError::MissingColumns(missing))
    }
}

/// Transform a whole parsed table.
///
/// Either every row is transformed or nothing is: a missing column fails the
/// table.
pub fn transform_table(table: &ParsedTable) -> TransformResult<Report> {
    check_columns(&table.headers)?;

    let mut report = Report::default();
    for (idx, record) in table.records.iter().enumerate() {
        let line = idx + 2;
        let (row, errors) = transform_shipment(&ShipmentRow::from_record(record));

        report
            .issues
            .extend(errors.iter().map(|e| FieldIssue::new(line, e)));
        report.rows.push(row);
    }

    Ok(report)
}
