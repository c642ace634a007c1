//! Date and time reformatting for report fields.

use chrono::NaiveDateTime;

use crate::error::{FieldError, FieldResult};

/// Input shape of `cutoff`.
const CUTOFF_INPUT: &str = "%Y-%m-%d %H:%M";
/// Output shape of `FechaRemesa`.
const CUTOFF_OUTPUT: &str = "%Y/%m/%d";

/// Input shape of `status_time` once the `T` and fractional part are gone.
const STATUS_TIME_INPUT: &str = "%Y-%m-%d %H:%M:%S";
/// Output shape of `FechaEntrega`.
const STATUS_TIME_OUTPUT: &str = "%Y/%m/%d %H:%M:%S";

/// Reformat a `cutoff` value (`2024-03-05 14:30`) as `2024/03/05`.
pub fn format_cutoff_date(text: &str) -> FieldResult<String> {
    NaiveDateTime::parse_from_str(text, CUTOFF_INPUT)
        .map(|dt| dt.format(CUTOFF_OUTPUT).to_string())
        .map_err(|source| FieldError::Cutoff {
            value: text.to_string(),
            source,
        })
}

/// Reformat a `status_time` value as `YYYY/MM/DD HH:MM:SS`.
///
/// Every `T` becomes a space and everything from the first `.` on is
/// dropped, which removes fractional seconds along with any timezone that
/// follows them. A timezone with no fractional part is left in place and
/// fails to parse.
pub fn format_status_time(text: &str) -> FieldResult<String> {
    let cleaned = text.replace('T', " ");
    let cleaned = cleaned.split('.').next().unwrap_or_default();

    NaiveDateTime::parse_from_str(cleaned, STATUS_TIME_INPUT)
        .map(|dt| dt.format(STATUS_TIME_OUTPUT).to_string())
        .map_err(|source| FieldError::StatusTime {
            value: text.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_date() {
        assert_eq!(format_cutoff_date("2024-03-05 14:30").unwrap(), "2024/03/05");
        assert_eq!(format_cutoff_date("2024-01-01 08:00").unwrap(), "2024/01/01");
    }

    #[test]
    fn test_cutoff_date_rejects_other_shapes() {
        let err = format_cutoff_date("not-a-date").unwrap_err();
        assert_eq!(err.column(), "cutoff");
        assert_eq!(err.value(), "not-a-date");

        // Seconds are not part of the cutoff shape
        assert!(format_cutoff_date("2024-03-05 14:30:00").is_err());
        assert!(format_cutoff_date("2024-03-05").is_err());
        assert!(format_cutoff_date("").is_err());
    }

    #[test]
    fn test_status_time_with_fraction_and_zone() {
        assert_eq!(
            format_status_time("2024-03-05T14:30:00.123456+00:00").unwrap(),
            "2024/03/05 14:30:00"
        );
    }

    #[test]
    fn test_status_time_plain() {
        assert_eq!(format_status_time("2024-03-05T14:30:00").unwrap(), "2024/03/05 14:30:00");
        assert_eq!(format_status_time("2024-03-05 14:30:00").unwrap(), "2024/03/05 14:30:00");
    }

    #[test]
    fn test_status_time_failures() {
        let err = format_status_time("2024-03-05T14:30").unwrap_err();
        assert_eq!(err.column(), "status_time");
        assert_eq!(err.value(), "2024-03-05T14:30");
        assert!(err.to_string().starts_with("Formato de hora de estado no válido: "));

        assert!(format_status_time("2024-03-05T14:30:00+00:00").is_err());
        assert!(format_status_time("").is_err());
    }
}
