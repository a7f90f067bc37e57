//! Shared validation helpers for inbound HTTP adapters.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, GeoPoint, GeoValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidCoordinate,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidCoordinate => "invalid_coordinate",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_uuid(value: String, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(&value).map_err(|_| invalid_uuid_error(field, &value))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<Uuid>, Error> {
    value.map(|raw| parse_uuid(raw, field)).transpose()
}

pub(crate) fn invalid_timestamp_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be an RFC 3339 timestamp"))
        .with_value(ErrorCode::InvalidTimestamp, value)
}

pub(crate) fn parse_rfc3339_timestamp(
    value: String,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| invalid_timestamp_error(field, &value))
}

fn invalid_coordinate_error(field: FieldName, value: f64) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} is out of range"))
        .with_value(ErrorCode::InvalidCoordinate, value.to_string())
}

fn half_position_error(present: FieldName, missing: FieldName) -> Error {
    Error::invalid_request(format!(
        "{} must be provided together with {}",
        present.as_str(),
        missing.as_str()
    ))
    .with_details(json!({
        "field": missing.as_str(),
        "code": ErrorCode::MissingField.as_str(),
    }))
}

/// Parse an optional position from separate latitude and longitude fields.
///
/// The coordinates come paired: one without the other is rejected rather
/// than silently treated as no position.
pub(crate) fn parse_optional_position(
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<Option<GeoPoint>, Error> {
    let lat_field = FieldName::new("lat");
    let lng_field = FieldName::new("lng");
    match (lat, lng) {
        (Some(lat), Some(lng)) => {
            let point = GeoPoint::new(lat, lng).map_err(|err| match err {
                GeoValidationError::LatitudeOutOfRange { value } => {
                    invalid_coordinate_error(lat_field, value)
                }
                GeoValidationError::LongitudeOutOfRange { value } => {
                    invalid_coordinate_error(lng_field, value)
                }
            })?;
            Ok(Some(point))
        }
        (Some(_), None) => Err(half_position_error(lat_field, lng_field)),
        (None, Some(_)) => Err(half_position_error(lng_field, lat_field)),
        (None, None) => Ok(None),
    }
}
