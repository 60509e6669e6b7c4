//! Field-level validation failures and their conversion into an
//! [`ErrorResponse`].
//!
//! Validators collect messages into [`FieldErrors`]; the HTTP boundary turns a
//! non-empty collection into a `ValidationFailed` envelope before any handler
//! runs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ErrorCode, ErrorResponse};

/// Summary message carried by every validation failure.
pub const VALIDATION_FAILED_MESSAGE: &str = "One or more validation errors occurred.";

/// One `(field, message)` pair in a validation failure.
///
/// `field` is `None` when the failure cannot be attributed to a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    message: String,
}

impl ValidationError {
    /// Build a pair; an empty field name is treated as unattributable.
    pub fn new(field: Option<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.filter(|name| !name.is_empty()),
            message: message.into(),
        }
    }

    /// Offending field, if known.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Insertion-ordered mapping from field name to its messages.
///
/// # Examples
/// ```
/// use appointment_api::domain::FieldErrors;
///
/// let mut errors = FieldErrors::new();
/// errors.add("customerName", "Customer name is required.");
/// errors.add("date", "Appointment date must be in the future.");
/// errors.add("customerName", "Customer name is too long.");
///
/// let flat = errors.flatten();
/// assert_eq!(flat.len(), 3);
/// assert_eq!(flat[1].field(), Some("customerName"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(Option<String>, Vec<String>)>,
}

impl FieldErrors {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against `field`, keeping the field's first position.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let key = (!field.is_empty()).then_some(field);
        self.push(key, message.into());
    }

    /// Record a message that no single field can own.
    pub fn add_unattributed(&mut self, message: impl Into<String>) {
        self.push(None, message.into());
    }

    fn push(&mut self, key: Option<String>, message: String) {
        match self.entries.iter_mut().find(|(field, _)| *field == key) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((key, vec![message])),
        }
    }

    /// One entry per `(field, message)`, ordered by field then message.
    pub fn flatten(&self) -> Vec<ValidationError> {
        self.entries
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |message| ValidationError::new(field.clone(), message.clone()))
            })
            .collect()
    }
}

impl<F, M> FromIterator<(F, Vec<M>)> for FieldErrors
where
    F: Into<String>,
    M: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (F, Vec<M>)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, messages) in iter {
            let field = field.into();
            for message in messages {
                errors.add(field.clone(), message);
            }
        }
        errors
    }
}

impl ErrorResponse {
    /// Convert collected field failures into a `ValidationFailed` payload.
    ///
    /// # Examples
    /// ```
    /// use appointment_api::domain::{ErrorCode, ErrorResponse, FieldErrors};
    /// use serde_json::json;
    ///
    /// let errors: FieldErrors = [("customerName", vec!["Customer name is required."])]
    ///     .into_iter()
    ///     .collect();
    /// let error = ErrorResponse::from_validation(&errors);
    /// assert_eq!(error.error_code(), ErrorCode::ValidationFailed);
    /// assert_eq!(
    ///     error.errors(),
    ///     Some(&json!([{ "field": "customerName", "message": "Customer name is required." }]))
    /// );
    /// ```
    pub fn from_validation(errors: &FieldErrors) -> Self {
        Self::from_field_errors(ErrorCode::ValidationFailed, errors)
    }

    /// Like [`ErrorResponse::from_validation`] but with a caller-chosen code,
    /// used for malformed path values (`InvalidData`).
    pub fn from_field_errors(code: ErrorCode, errors: &FieldErrors) -> Self {
        let error = Self::new(code, VALIDATION_FAILED_MESSAGE);
        match serde_json::to_value(errors.flatten()) {
            Ok(items) => error.with_errors(items),
            Err(_) => error,
        }
    }
}
