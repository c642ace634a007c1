//! REST API types for frontend integration.
//!
//! The upload response carries everything a client needs to show the
//! result: the notices, the per-field issues, a preview of the rows and the
//! CSV itself, ready to be saved under `fileName`.

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{ReportRow, REPORT_COLUMNS};
use crate::transform::pipeline::{PipelineResult, SourceInfo, SUCCESS_NOTICE};
use crate::transform::report::FieldIssue;

/// Response sent after an upload has been transformed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready" (no issues) or "warning"
    pub status: String,

    /// Name to save the report under
    pub file_name: String,

    /// Success notice
    pub message: String,

    /// One notice per date/time value that could not be read
    pub notices: Vec<String>,

    /// Same issues, with their location
    pub issues: Vec<FieldIssue>,

    /// Report rows, keyed by report column
    pub rows: Vec<ReportRow>,

    /// `;`-separated report
    pub csv: String,

    /// Metadata about the transformation
    pub metadata: ResponseMetadata,
}

/// Metadata about the transformation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Number of report rows
    pub row_count: usize,

    /// Report header, in output order
    pub columns: Vec<String>,

    /// What was read from the upload
    pub source: SourceInfo,
}

impl From<PipelineResult> for UploadResponse {
    fn from(result: PipelineResult) -> Self {
        let status = if result.report.is_clean() { "ready" } else { "warning" };
        let notices = result
            .report
            .issues
            .iter()
            .map(|issue| issue.message.clone())
            .collect();

        UploadResponse {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            file_name: result.file_name,
            message: SUCCESS_NOTICE.to_string(),
            notices,
            issues: result.report.issues,
            csv: String::from_utf8_lossy(&result.csv).into_owned(),
            metadata: ResponseMetadata {
                row_count: result.report.rows.len(),
                columns: REPORT_COLUMNS.iter().map(|c| c.to_string()).collect(),
                source: result.source,
            },
            rows: result.report.rows,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "rows": [],
        "metadata": {
            "rowCount": 0,
            "columns": REPORT_COLUMNS,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::pipeline::{transform_bytes, TransformOptions};

    fn transform(content: &str) -> PipelineResult {
        transform_bytes(content.as_bytes(), "envios.csv", &TransformOptions::default()).unwrap()
    }

    #[test]
    fn test_ready_response() {
        let result = transform(
            "client_id;cutoff;status;status_time;pickup_address;receiver_address\n\
             42;2024-01-01 08:00;delivered;2024-01-02T10:00:00;A;B\n",
        );
        let response = UploadResponse::from(result);

        assert_eq!(response.status, "ready");
        assert_eq!(response.file_name, "envios.csv_transformed.csv");
        assert_eq!(response.message, SUCCESS_NOTICE);
        assert!(response.notices.is_empty());
        assert_eq!(response.metadata.row_count, 1);
        assert_eq!(response.metadata.columns.len(), REPORT_COLUMNS.len());
        assert!(response.csv.starts_with("NumeroRemesa;FechaRemesa;"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["rows"][0]["EstadoRemesa"], "Entregada");
        assert_eq!(json["metadata"]["source"]["format"], "delimited");
    }

    #[test]
    fn test_warning_response_lists_notices() {
        let result = transform(
            "client_id;cutoff;status;status_time;pickup_address;receiver_address\n\
             42;ayer;new;;A;B\n",
        );
        let response = UploadResponse::from(result);

        assert_eq!(response.status, "warning");
        assert_eq!(response.notices.len(), 1);
        assert!(response.notices[0].starts_with("Formato de fecha de corte no válido"));
        assert_eq!(response.issues[0].line, 2);
    }

    #[test]
    fn test_error_response_shape() {
        let body = error_response("Por favor, selecciona un archivo primero.");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Por favor, selecciona un archivo primero.");
        assert_eq!(body["metadata"]["columns"][0], "NumeroRemesa");
    }
}
