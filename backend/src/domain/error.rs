//! Domain error taxonomy shared by services and transport adapters.
//!
//! Errors carry a machine-readable [`ErrorCode`], a human-readable message,
//! the request identifier active when the error was raised, and optional
//! structured details. Adapters translate the code into their own status
//! space; the HTTP layer maps it onto response statuses in
//! `inbound::http::error`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::request_id::RequestId;

/// Stable machine-readable category for a domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    /// The request payload failed validation.
    InvalidRequest,
    /// The addressed entity does not exist.
    NotFound,
    /// The entity exists but its lifecycle state forbids the operation.
    InvalidState,
    /// A concurrent actor won a compare-and-set race.
    Conflict,
    /// A backing dependency is temporarily unreachable.
    ServiceUnavailable,
    /// An unexpected internal failure; details are never exposed to clients.
    InternalError,
}

/// Validation failure raised while constructing an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorValidationError {
    /// The message was empty or whitespace-only.
    EmptyMessage,
    /// The request identifier was empty or whitespace-only.
    EmptyRequestId,
}

impl fmt::Display for ErrorValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be blank"),
            Self::EmptyRequestId => write!(f, "request identifier must not be blank"),
        }
    }
}

impl std::error::Error for ErrorValidationError {}

/// Domain error returned by driving ports.
///
/// Construction captures the ambient [`RequestId`] when one is in scope, so
/// errors surfaced deep inside a service still correlate with the request
/// that triggered them.
///
/// # Examples
/// ```
/// use backend::domain::{Error, ErrorCode};
///
/// let error = Error::not_found("round execution missing");
/// assert_eq!(error.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    request_id: Option<String>,
    details: Option<Value>,
}

impl Error {
    /// Create an error, validating that the message is not blank.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            request_id: RequestId::current().map(|id| id.to_string()),
            details: None,
        })
    }

    /// Create an error from a known-good message.
    ///
    /// # Panics
    ///
    /// Panics if `message` is blank; callers constructing messages at runtime
    /// should use [`Error::try_new`].
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(error) => error,
            Err(invalid) => panic!("invalid error construction: {invalid}"),
        }
    }

    /// Attach structured details for the client.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Replace the captured request identifier, validating it is not blank.
    pub fn try_with_request_id(
        mut self,
        request_id: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let request_id = request_id.into();
        if request_id.trim().is_empty() {
            return Err(ErrorValidationError::EmptyRequestId);
        }
        self.request_id = Some(request_id);
        Ok(self)
    }

    /// Replace the captured request identifier from a known-good value.
    ///
    /// # Panics
    ///
    /// Panics if `request_id` is blank.
    #[must_use]
    pub fn with_request_id(self, request_id: impl Into<String>) -> Self {
        match self.try_with_request_id(request_id) {
            Ok(error) => error,
            Err(invalid) => panic!("invalid error construction: {invalid}"),
        }
    }

    /// Machine-readable category.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Identifier of the request during which the error was raised.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Structured details, if any were attached.
    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Build an [`ErrorCode::InvalidRequest`] error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Build an [`ErrorCode::NotFound`] error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Build an [`ErrorCode::InvalidState`] error.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidState, message)
    }

    /// Build an [`ErrorCode::Conflict`] error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Build an [`ErrorCode::ServiceUnavailable`] error.
    #[must_use]
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Build an [`ErrorCode::InternalError`] error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

/// Wire shape for [`Error`]; keeps serde derives away from the validated type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(dto: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            request_id,
            details,
        } = dto;
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        if request_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(ErrorValidationError::EmptyRequestId);
        }
        // The DTO is authoritative; deserialization never captures the
        // ambient request identifier.
        Ok(Self {
            code,
            message,
            request_id,
            details,
        })
    }
}

impl From<Error> for ErrorDto {
    fn from(error: Error) -> Self {
        Self {
            code: error.code,
            message: error.message,
            request_id: error.request_id,
            details: error.details,
        }
    }
}

#[cfg(test)]
mod tests;
