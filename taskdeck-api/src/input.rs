/// Lenient parsing of form-style request values
///
/// The web client sends dates from `<input type="date">` and hours from text
/// inputs, so dates may be full RFC 3339 timestamps, local date-times without
/// an offset (read as UTC) or bare `YYYY-MM-DD` strings, and numbers may arrive as JSON numbers or numeric strings. An
/// empty string means "no value".

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::ApiError;

/// A JSON number or a string holding one
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// `None` for an empty string; 400 for text that is not a number
    pub fn value(&self, field: &str) -> Result<Option<f64>, ApiError> {
        match self {
            Numeric::Number(n) => Ok(Some(*n)),
            Numeric::Text(text) if text.trim().is_empty() => Ok(None),
            Numeric::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ApiError::BadRequest(format!("{} must be a number", field))),
        }
    }
}

/// Parses an ISO-8601 timestamp or calendar date (midnight UTC)
///
/// Returns `None` for an empty string.
pub fn parse_datetime(field: &str, value: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(local) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Some(local.and_utc()));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Some(midnight.and_utc()))
        .ok_or_else(|| ApiError::BadRequest(format!("{} must be an ISO-8601 date", field)))
}

/// Tri-state date field: absent, cleared (`null` or `""`), or set
pub fn nullable_datetime(
    field: &str,
    value: Option<Option<String>>,
) -> Result<Option<Option<DateTime<Utc>>>, ApiError> {
    match value {
        None => Ok(None),
        Some(None) => Ok(Some(None)),
        Some(Some(text)) => parse_datetime(field, &text).map(Some),
    }
}

/// Optional date on create; empty strings count as absent
pub fn optional_datetime(field: &str, value: Option<String>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match value {
        None => Ok(None),
        Some(text) => parse_datetime(field, &text),
    }
}

fn non_negative(field: &str, hours: f64) -> Result<f64, ApiError> {
    if hours.is_finite() && hours >= 0.0 {
        Ok(hours)
    } else {
        Err(ApiError::BadRequest(format!(
            "{} must be a non-negative number",
            field
        )))
    }
}

/// `estimatedHours`: absent, cleared (`null` or `""`), or a non-negative number
pub fn estimated_hours(
    value: Option<Option<Numeric>>,
) -> Result<Option<Option<f64>>, ApiError> {
    const FIELD: &str = "estimatedHours";

    match value {
        None => Ok(None),
        Some(None) => Ok(Some(None)),
        Some(Some(numeric)) => match numeric.value(FIELD)? {
            None => Ok(Some(None)),
            Some(hours) => non_negative(FIELD, hours).map(|hours| Some(Some(hours))),
        },
    }
}

/// `actualHours`: absent or a non-negative number; the column is not nullable
pub fn actual_hours(value: Option<Option<Numeric>>) -> Result<Option<f64>, ApiError> {
    const FIELD: &str = "actualHours";

    match value {
        None => Ok(None),
        Some(numeric) => numeric
            .map(|numeric| numeric.value(FIELD))
            .transpose()?
            .flatten()
            .ok_or_else(|| {
                ApiError::BadRequest(format!("{} must be a non-negative number", FIELD))
            })
            .and_then(|hours| non_negative(FIELD, hours))
            .map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap();

        assert_eq!(parse_datetime("dueDate", "2025-03-04").unwrap(), Some(expected));
        assert_eq!(parse_datetime("dueDate", "2025-03-04T00:00:00Z").unwrap(), Some(expected));
        assert_eq!(
            parse_datetime("dueDate", "2025-03-04T09:00:00+09:00").unwrap(),
            Some(expected)
        );
        assert_eq!(parse_datetime("dueDate", "  ").unwrap(), None);
        assert!(parse_datetime("dueDate", "next tuesday").is_err());

        // No offset means UTC
        let nine = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();
        assert_eq!(parse_datetime("dueDate", "2025-03-04T09:00:00").unwrap(), Some(nine));
        assert_eq!(parse_datetime("dueDate", "2025-03-04T09:00").unwrap(), Some(nine));
        assert_eq!(
            parse_datetime("dueDate", "2025-03-04T09:00:00.250").unwrap(),
            Some(nine + chrono::Duration::milliseconds(250))
        );
        assert!(parse_datetime("dueDate", "2025-03-04T25:00").is_err());
    }

    #[test]
    fn test_nullable_datetime_tri_state() {
        assert_eq!(nullable_datetime("startDate", None).unwrap(), None);
        assert_eq!(nullable_datetime("startDate", Some(None)).unwrap(), Some(None));
        assert_eq!(
            nullable_datetime("startDate", Some(Some(String::new()))).unwrap(),
            Some(None)
        );
        assert!(nullable_datetime("startDate", Some(Some("2025-03-04".into())))
            .unwrap()
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_numeric_accepts_numbers_and_strings() {
        let from_json: Numeric = serde_json::from_str("4").unwrap();
        assert_eq!(from_json.value("x").unwrap(), Some(4.0));

        let from_text: Numeric = serde_json::from_str("\"2.5\"").unwrap();
        assert_eq!(from_text.value("x").unwrap(), Some(2.5));

        assert!(Numeric::Text("lots".into()).value("x").is_err());
    }

    #[test]
    fn test_estimated_hours() {
        assert_eq!(estimated_hours(None).unwrap(), None);
        assert_eq!(estimated_hours(Some(None)).unwrap(), Some(None));
        assert_eq!(estimated_hours(Some(Some(Numeric::Text(String::new())))).unwrap(), Some(None));
        assert_eq!(estimated_hours(Some(Some(Numeric::Number(3.0)))).unwrap(), Some(Some(3.0)));
        assert!(estimated_hours(Some(Some(Numeric::Number(-1.0)))).is_err());
    }

    #[test]
    fn test_actual_hours_rejects_null_empty_and_negative() {
        assert_eq!(actual_hours(None).unwrap(), None);
        assert_eq!(actual_hours(Some(Some(Numeric::Text("1.5".into())))).unwrap(), Some(1.5));
        assert_eq!(actual_hours(Some(Some(Numeric::Number(0.0)))).unwrap(), Some(0.0));

        assert!(actual_hours(Some(None)).is_err());
        assert!(actual_hours(Some(Some(Numeric::Text(String::new())))).is_err());
        assert!(actual_hours(Some(Some(Numeric::Number(-2.0)))).is_err());
        assert!(actual_hours(Some(Some(Numeric::Text("NaN".into())))).is_err());
        assert!(actual_hours(Some(Some(Numeric::Text("inf".into())))).is_err());
    }
}
