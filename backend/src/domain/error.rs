//! Domain-level failure payloads.
//!
//! These types are transport agnostic. The HTTP adapter decides which status
//! code an [`ErrorCode`] maps to; the domain only names the failure.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;
use uuid::Uuid;

/// Default message used by [`ErrorResponse::not_found`].
pub const NOT_FOUND_MESSAGE: &str = "Resource not found";

/// Machine-readable failure category.
///
/// Serialises by variant name (for example `"EntityDoesNotExist"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Failure with no more specific category.
    Unknown,
    /// The request body failed validation.
    ValidationFailed,
    /// The caller lacks permission for the operation.
    InvalidPermission,
    /// The presented token is missing, expired or malformed.
    InvalidToken,
    /// The request carried data the operation cannot use.
    InvalidData,
    /// The account email has not been confirmed yet.
    EmailUnconfirmed,
    /// The addressed entity does not exist.
    EntityDoesNotExist,
    /// The confirmation token is not valid.
    ConfirmationTokenInvalid,
    /// The email address is already registered.
    EmailAlreadyTaken,
    /// The identity provider rejected the operation.
    FailedIdentity,
    /// The email address was already confirmed.
    EmailAlreadyConfirmed,
    /// The supplied password is wrong.
    IncorrectPassword,
    /// A required downstream service is not available.
    ServiceNotProvided,
    /// The backing store failed.
    DatabaseError,
}

impl ErrorCode {
    /// Every member of the taxonomy, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Unknown,
        Self::ValidationFailed,
        Self::InvalidPermission,
        Self::InvalidToken,
        Self::InvalidData,
        Self::EmailUnconfirmed,
        Self::EntityDoesNotExist,
        Self::ConfirmationTokenInvalid,
        Self::EmailAlreadyTaken,
        Self::FailedIdentity,
        Self::EmailAlreadyConfirmed,
        Self::IncorrectPassword,
        Self::ServiceNotProvided,
        Self::DatabaseError,
    ];
}

/// Diagnostic block attached only by the unhandled-failure path.
///
/// It exposes internals, so the interceptor decides whether to include it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    message: String,
    details: Option<String>,
    stack_trace: String,
}

impl ExceptionDetails {
    /// Build a diagnostic block from a fault message, its inner cause and a
    /// rendered stack trace.
    pub fn new(
        message: impl Into<String>,
        details: Option<String>,
        stack_trace: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            details,
            stack_trace: stack_trace.into(),
        }
    }

    /// Message of the fault itself.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Message of the inner cause, if any.
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Rendered stack trace captured with the fault.
    pub fn stack_trace(&self) -> &str {
        self.stack_trace.as_str()
    }
}

/// Structured failure payload carried by a failed envelope.
///
/// All fields are fixed at construction; the builder methods consume `self`.
///
/// # Examples
/// ```
/// use appointment_api::domain::{ErrorCode, ErrorResponse};
///
/// let error = ErrorResponse::new(ErrorCode::DatabaseError, "store unavailable");
/// assert_eq!(error.error_code(), ErrorCode::DatabaseError);
/// assert!(error.exception().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    id: Uuid,
    #[schema(example = "Appointment not found.")]
    message: String,
    error_code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    errors: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exception: Option<ExceptionDetails>,
}

impl ErrorResponse {
    /// Create a failure with a freshly generated identifier.
    pub fn new(error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            error_code,
            errors: None,
            exception: None,
        }
    }

    /// Failure for a missing entity, echoing the identifier under `errors.id`.
    ///
    /// # Examples
    /// ```
    /// use appointment_api::domain::{ErrorCode, ErrorResponse};
    /// use serde_json::json;
    ///
    /// let error = ErrorResponse::not_found(9999, None);
    /// assert_eq!(error.error_code(), ErrorCode::EntityDoesNotExist);
    /// assert_eq!(error.message(), "Resource not found");
    /// assert_eq!(error.errors(), Some(&json!({ "id": 9999 })));
    /// ```
    pub fn not_found<I: Serialize>(id: I, message: Option<&str>) -> Self {
        let echo = serde_json::to_value(id)
            .map(|id| json!({ "id": id }))
            .ok();
        Self {
            errors: echo,
            ..Self::new(
                ErrorCode::EntityDoesNotExist,
                message.unwrap_or(NOT_FOUND_MESSAGE),
            )
        }
    }

    /// Attach a structured `errors` payload.
    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Attach the diagnostic block.
    pub fn with_exception(mut self, exception: ExceptionDetails) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Opaque per-instance identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Machine-readable failure category.
    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    /// Structured error payload, if any.
    pub fn errors(&self) -> Option<&Value> {
        self.errors.as_ref()
    }

    /// Diagnostic block, present only for intercepted faults.
    pub fn exception(&self) -> Option<&ExceptionDetails> {
        self.exception.as_ref()
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.error_code, self.message)
    }
}

impl std::error::Error for ErrorResponse {}
