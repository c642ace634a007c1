//! High-level pipeline API: export in, Crystal report out.
//!
//! Combines every step: parsing, column checks, row transformation and CSV
//! rendering. File content is passed in explicitly and everything produced
//! comes back in a [`PipelineResult`].
//!
//! # Example
//!
//! ```rust,ignore
//! use remesas::transform::pipeline::{transform_file, TransformOptions};
//! use std::path::Path;
//!
//! let result = transform_file(Path::new("envios.xlsx"), &TransformOptions::default())?;
//! std::fs::write(&result.file_name, &result.csv)?;
//! ```

use serde::Serialize;
use std::path::Path;

use super::report::{transform_table, Report};
use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult as Result};
use crate::parser::{parse_bytes_auto, ParseOptions, ParsedTable, SourceFormat};

// =============================================================================
// User-facing notices
// =============================================================================

/// Shown once the report is ready.
pub const SUCCESS_NOTICE: &str =
    "El reporte ha sido transformado y se encuentra listo para descargar.";

/// Shown when processing is requested without a file.
pub const NO_FILE_WARNING: &str = "Por favor, selecciona un archivo primero.";

/// Shown when a file has been picked.
pub fn selected_file_notice(file_name: &str) -> String {
    format!("Se ha seleccionado el archivo: {}", file_name)
}

/// Shown when the whole run fails.
pub fn failure_notice(error: &dyn std::error::Error) -> String {
    format!("Ocurrió un error al procesar el archivo: {}", error)
}

/// Download name for a given upload name (`envios.xlsx` -> `envios.xlsx_transformed.csv`).
pub fn output_file_name(original: &str) -> String {
    format!("{}_transformed.csv", original)
}

// =============================================================================
// Options & Results
// =============================================================================

/// Options for the transformation pipeline
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Worksheet to read instead of the first one
    pub sheet: Option<String>,

    /// Delimiter of text input (auto-detect if not specified)
    pub delimiter: Option<char>,
}

impl From<&TransformOptions> for ParseOptions {
    fn from(options: &TransformOptions) -> Self {
        ParseOptions {
            sheet: options.sheet.clone(),
            delimiter: options.delimiter,
        }
    }
}

/// Input file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub format: SourceFormat,
    pub encoding: Option<String>,
    pub delimiter: Option<char>,
    pub sheet: Option<String>,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl From<&ParsedTable> for SourceInfo {
    fn from(table: &ParsedTable) -> Self {
        SourceInfo {
            format: table.format,
            encoding: table.encoding.clone(),
            delimiter: table.delimiter,
            sheet: table.sheet.clone(),
            headers: table.headers.clone(),
            row_count: table.records.len(),
        }
    }
}

/// Result of a complete transformation
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Name to offer the report under
    pub file_name: String,

    /// Report rows and field issues
    pub report: Report,

    /// Rendered CSV report
    pub csv: Vec<u8>,

    /// Input metadata
    pub source: SourceInfo,
}

// =============================================================================
// Entry points
// =============================================================================

/// Transform an export file into a Crystal report.
///
/// The report is named after the file's name, see [`output_file_name`].
pub fn transform_file(path: &Path, options: &TransformOptions) -> Result<PipelineResult> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("reporte");
    transform_bytes(&bytes, file_name, options)
}

/// Transform uploaded bytes into a Crystal report.
///
/// 1. Parses the input (spreadsheet or delimited text)
/// 2. Checks the required columns
/// 3. Maps every row, collecting date/time issues
/// 4. Renders the `;`-separated CSV
///
/// Any failure in these steps aborts the run; date/time issues do not.
pub fn transform_bytes(
    bytes: &[u8],
    file_name: &str,
    options: &TransformOptions,
) -> Result<PipelineResult> {
    log_info(format!("📖 Reading {} ({} bytes)...", file_name, bytes.len()));
    let table = parse_bytes_auto(bytes, &ParseOptions::from(options))?;
    let source = SourceInfo::from(&table);
    print_source_info(&source);

    log_info("⚙️  Transforming rows...");
    let report = transform_table(&table)?;
    log_success(format!("{} report rows", report.rows.len()));
    print_issues(&report);

    let csv = report.to_csv()?;
    let file_name = output_file_name(file_name);
    log_success(SUCCESS_NOTICE);

    Ok(PipelineResult {
        file_name,
        report,
        csv,
        source,
    })
}

/// Log a failed run the way users see it, then hand the error back.
pub fn report_failure(error: PipelineError) -> PipelineError {
    log_error(failure_notice(&error));
    error
}

fn print_source_info(source: &SourceInfo) {
    match source.format {
        SourceFormat::Spreadsheet => {
            log_success(format!(
                "Spreadsheet, sheet '{}'",
                source.sheet.as_deref().unwrap_or("?")
            ));
        }
        SourceFormat::Delimited => {
            log_success(format!(
                "Delimited text, encoding {}, separator '{}'",
                source.encoding.as_deref().unwrap_or("?"),
                format_delimiter(source.delimiter)
            ));
        }
    }
    log_success(format!(
        "Read {} rows, {} columns",
        source.row_count,
        source.headers.len()
    ));
}

fn print_issues(report: &Report) {
    if report.is_clean() {
        return;
    }
    log_warning(format!("{} date/time values could not be read", report.issues.len()));
    for issue in &report.issues {
        log_error(issue.to_string());
    }
}

/// Format delimiter for display
fn format_delimiter(d: Option<char>) -> &'static str {
    match d {
        Some(';') => ";",
        Some(',') => ",",
        Some('\t') => "TAB",
        Some('|') => "|",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, TransformError};
    use crate::models::REPORT_COLUMNS;
    use rust_xlsxwriter::Workbook;
    use std::io::Write;

    const HEADER: &str = "client_id;cutoff;status;status_time;pickup_address;receiver_address";

    fn run(content: &str) -> Result<PipelineResult> {
        transform_bytes(content.as_bytes(), "envios.csv", &TransformOptions::default())
    }

    #[test]
    fn test_output_file_name_keeps_extension() {
        assert_eq!(output_file_name("envios.xlsx"), "envios.xlsx_transformed.csv");
    }

    #[test]
    fn test_end_to_end_single_row() {
        let input = format!("{HEADER}\n42;2024-01-01 08:00;pickuped;;A;B\n");
        let result = run(&input).unwrap();

        assert_eq!(result.file_name, "envios.csv_transformed.csv");
        assert!(result.report.is_clean());

        let csv = String::from_utf8(result.csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], REPORT_COLUMNS.join(";"));
        assert_eq!(
            lines[1],
            format!("42;2024/01/01;En Transporte;;;Mercancia;;1;Crystal;A;B{}", ";".repeat(11))
        );
    }

    #[test]
    fn test_field_issues_do_not_abort() {
        let input = format!(
            "{HEADER}\n1;bad;delivered;2024-03-05T14:30:00.5Z;A;B\n2;2024-03-05 14:30;delivered;nope;C;D\n"
        );
        let result = run(&input).unwrap();

        assert_eq!(result.report.rows.len(), 2);
        assert_eq!(result.report.issues.len(), 2);
        assert_eq!(result.report.rows[0].fecha_remesa, None);
        assert_eq!(
            result.report.rows[0].fecha_entrega.as_deref(),
            Some("2024/03/05 14:30:00")
        );
        assert_eq!(result.report.issues[1].column, "status_time");
    }

    #[test]
    fn test_missing_columns_fail_whole_run() {
        let err = run("client_id;status\n1;new\n").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Transform(TransformError::MissingColumns(_))
        ));
        assert!(failure_notice(&err).starts_with("Ocurrió un error al procesar el archivo: "));
    }

    #[test]
    fn test_empty_input_fails() {
        let err = transform_bytes(b"", "x.csv", &TransformOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(ParseError::EmptyFile)));
    }

    #[test]
    fn test_header_only_input() {
        let result = run(&format!("{HEADER}\n")).unwrap();
        assert_eq!(result.source.row_count, 0);
        assert_eq!(
            String::from_utf8(result.csv).unwrap(),
            format!("{}\n", REPORT_COLUMNS.join(";"))
        );
    }

    #[test]
    fn test_xlsx_end_to_end() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in HEADER.split(';').enumerate() {
            sheet.write_string(0, col as u16, name).unwrap();
        }
        sheet.write_number(1, 0, 42.0).unwrap();
        sheet.write_string(1, 1, "2024-01-01 08:00").unwrap();
        sheet.write_string(1, 2, "delivered").unwrap();
        sheet.write_string(1, 3, "2024-01-02T09:15:30.000+00:00").unwrap();
        sheet.write_string(1, 4, "Bodega Norte").unwrap();
        sheet.write_string(1, 5, "Cra 7 #12").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let result = transform_bytes(&bytes, "envios.xlsx", &TransformOptions::default()).unwrap();

        assert_eq!(result.source.format, SourceFormat::Spreadsheet);
        assert_eq!(result.file_name, "envios.xlsx_transformed.csv");
        let row = &result.report.rows[0];
        assert_eq!(row.numero_remesa, "42");
        assert_eq!(row.estado_remesa, "Entregada");
        assert_eq!(row.fecha_entrega.as_deref(), Some("2024/01/02 09:15:30"));
        assert_eq!(row.origen, "Bodega Norte");
    }

    #[test]
    fn test_transform_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", HEADER.replace(';', ",")).unwrap();
        writeln!(file, "7,2024-02-29 23:59,cancelled,,X,Y").unwrap();
        drop(file);

        let result = transform_file(&path, &TransformOptions::default()).unwrap();
        assert_eq!(result.file_name, "export.csv_transformed.csv");
        assert_eq!(result.source.delimiter, Some(','));
        assert_eq!(result.report.rows[0].estado_remesa, "Cerrado Por Incidencia");
        assert_eq!(result.report.rows[0].fecha_remesa.as_deref(), Some("2024/02/29"));
    }

    #[test]
    fn test_transform_file_missing() {
        let err = transform_file(Path::new("/definitely/not/here.xlsx"), &TransformOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
