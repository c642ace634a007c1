//! Domain models for the Remesas report pipeline.
//!
//! - [`ShipmentRow`] - One row of the shipment-status export
//! - [`ReportRow`] - One row of the Crystal report
//! - [`REQUIRED_COLUMNS`] / [`REPORT_COLUMNS`] - Input and output schemas

use serde::Serialize;
use serde_json::Value;

// =============================================================================
// Input Schema
// =============================================================================

/// Columns the export must contain. Other columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "client_id",
    "cutoff",
    "status",
    "status_time",
    "pickup_address",
    "receiver_address",
];

/// A single shipment from the status export.
///
/// Every value is kept as text; dates are parsed later so a bad value only
/// blanks its own field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShipmentRow {
    pub client_id: String,
    pub cutoff: String,
    pub status: String,
    pub status_time: String,
    pub pickup_address: String,
    pub receiver_address: String,
}

impl ShipmentRow {
    /// Pick the required columns out of a parsed record.
    ///
    /// Absent or non-text values read as empty.
    pub fn from_record(record: &Value) -> Self {
        let text = |key: &str| {
            record
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            client_id: text("client_id"),
            cutoff: text("cutoff"),
            status: text("status"),
            status_time: text("status_time"),
            pickup_address: text("pickup_address"),
            receiver_address: text("receiver_address"),
        }
    }
}

// =============================================================================
// Output Schema
// =============================================================================

/// Report header, in output order.
pub const REPORT_COLUMNS: [&str; 22] = [
    "NumeroRemesa",
    "FechaRemesa",
    "EstadoRemesa",
    "TieneNovedad",
    "DescripcionNovedad",
    "UnidadNegocio",
    "FechaEntrega",
    "NumeroDocumento",
    "Remitente",
    "Origen",
    "Destino",
    "Destinatario",
    "TelefonoDestinatario",
    "CuentaRemitente",
    "TotalUnidades",
    "KilosReales",
    "ObservacionesRemesa",
    "EstadoNovedad",
    "TipoVinculo",
    "GuiaNueva",
    "FechaPrimeraVisita",
    "HoraPrimeraVisita",
];

/// `UnidadNegocio` for every row.
pub const BUSINESS_UNIT: &str = "Mercancia";

/// `Remitente` for every row.
pub const SENDER: &str = "Crystal";

/// `NumeroDocumento` for every row.
pub const DOCUMENT_NUMBER: u8 = 1;

/// `DescripcionNovedad` for delivered shipments.
pub const DELIVERY_NOTE: &str = "Entrega se realiza cita destinatario";

/// One row of the Crystal report.
///
/// Only the derived columns are stored. The trailing columns of
/// [`REPORT_COLUMNS`] are always blank and are filled in by [`ReportRow::to_record`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportRow {
    pub numero_remesa: String,
    pub fecha_remesa: Option<String>,
    pub estado_remesa: &'static str,
    pub tiene_novedad: Option<u8>,
    pub descripcion_novedad: Option<&'static str>,
    pub unidad_negocio: &'static str,
    pub fecha_entrega: Option<String>,
    pub numero_documento: u8,
    pub remitente: &'static str,
    pub origen: String,
    pub destino: String,
}

impl ReportRow {
    /// Render as a CSV record aligned with [`REPORT_COLUMNS`].
    pub fn to_record(&self) -> Vec<String> {
        let mut record = vec![
            self.numero_remesa.clone(),
            self.fecha_remesa.clone().unwrap_or_default(),
            self.estado_remesa.to_string(),
            self.tiene_novedad.map(|n| n.to_string()).unwrap_or_default(),
            self.descripcion_novedad.unwrap_or_default().to_string(),
            self.unidad_negocio.to_string(),
            self.fecha_entrega.clone().unwrap_or_default(),
            self.numero_documento.to_string(),
            self.remitente.to_string(),
            self.origen.clone(),
            self.destino.clone(),
        ];
        record.resize(REPORT_COLUMNS.len(), String::new());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> ReportRow {
        ReportRow {
            numero_remesa: "42".into(),
            fecha_remesa: Some("2024/01/01".into()),
            estado_remesa: "En Transporte",
            tiene_novedad: None,
            descripcion_novedad: None,
            unidad_negocio: BUSINESS_UNIT,
            fecha_entrega: None,
            numero_documento: DOCUMENT_NUMBER,
            remitente: SENDER,
            origen: "A".into(),
            destino: "B".into(),
        }
    }

    #[test]
    fn test_record_matches_header_width() {
        let record = sample_row().to_record();
        assert_eq!(record.len(), REPORT_COLUMNS.len());
        assert!(record[11..].iter().all(String::is_empty));
    }

    #[test]
    fn test_record_order() {
        let record = sample_row().to_record();
        assert_eq!(
            &record[..11],
            &["42", "2024/01/01", "En Transporte", "", "", "Mercancia", "", "1", "Crystal", "A", "B"]
        );
    }

    #[test]
    fn test_json_uses_report_column_names() {
        let json = serde_json::to_value(sample_row()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();

        for key in keys {
            assert!(REPORT_COLUMNS.contains(&key), "unexpected key {key}");
        }
        assert_eq!(json["NumeroRemesa"], "42");
        assert_eq!(json["TieneNovedad"], serde_json::Value::Null);
    }

    #[test]
    fn test_shipment_from_record() {
        let record = serde_json::json!({
            "client_id": "42",
            "cutoff": "2024-01-01 08:00",
            "status": "pickuped",
            "pickup_address": " Calle 1 ",
            "receiver_address": "B",
            "extra": "ignored"
        });
        let shipment = ShipmentRow::from_record(&record);

        assert_eq!(shipment.client_id, "42");
        assert_eq!(shipment.status, "pickuped");
        assert_eq!(shipment.status_time, "");
        assert_eq!(shipment.pickup_address, " Calle 1 ");
    }

    #[test]
    fn test_report_columns_unique() {
        let mut columns = REPORT_COLUMNS.to_vec();
        columns.sort_unstable();
        columns.dedup();
        assert_eq!(columns.len(), REPORT_COLUMNS.len());
    }
}
