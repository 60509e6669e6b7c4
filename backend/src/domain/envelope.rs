//! The uniform success/failure wrapper returned by every endpoint.
//!
//! ## Invariants
//! - `is_success` is true exactly when `error` is absent.
//! - A successful envelope always carries `data`; a unit payload is `null`.
//! - A failed envelope never carries `data`.
//! - `meta` is always present and built fresh for each envelope.

use chrono::{DateTime, Utc};
use pagination::PageMeta;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::{ErrorResponse, TraceContext};

/// Metadata stamped on every envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetaInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "4bf92f3577b34da6a3ce929d0e0e4736")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "00f067aa0ba902b7")]
    span_id: Option<String>,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    page: Option<PageMeta>,
}

impl MetaInfo {
    /// Build metadata from an explicit tracing context, stamped with the
    /// current UTC instant. A missing context leaves the ids absent.
    #[must_use]
    pub fn fresh(trace: Option<&TraceContext>) -> Self {
        Self::fresh_at(trace, Utc::now())
    }

    /// Like [`MetaInfo::fresh`] with a caller-supplied timestamp.
    #[must_use]
    pub fn fresh_at(trace: Option<&TraceContext>, timestamp: DateTime<Utc>) -> Self {
        Self {
            trace_id: trace.map(|context| context.trace_id().to_string()),
            span_id: trace.map(|context| context.span_id().to_string()),
            timestamp,
            page: None,
        }
    }

    /// Build metadata from the tracing context in scope for this request.
    ///
    /// # Examples
    /// ```
    /// use appointment_api::domain::MetaInfo;
    ///
    /// let meta = MetaInfo::now();
    /// assert!(meta.trace_id().is_none());
    /// ```
    #[must_use]
    pub fn now() -> Self {
        Self::fresh(TraceContext::current().as_ref())
    }

    /// Attach pagination details.
    #[must_use]
    pub fn with_page(mut self, page: PageMeta) -> Self {
        self.page = Some(page);
        self
    }

    /// Override the trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Trace identifier, if a tracing context was active.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Span identifier, if a tracing context was active.
    pub fn span_id(&self) -> Option<&str> {
        self.span_id.as_deref()
    }

    /// Construction instant (UTC).
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Pagination details for list responses.
    pub fn page(&self) -> Option<&PageMeta> {
        self.page.as_ref()
    }
}

impl Default for MetaInfo {
    fn default() -> Self {
        Self::now()
    }
}

/// Envelope returned by every endpoint.
///
/// # Examples
/// ```
/// use appointment_api::domain::{ErrorCode, ErrorResponse, ResponseEnvelope};
///
/// let ok = ResponseEnvelope::success(42);
/// assert!(ok.is_success());
/// assert_eq!(ok.data(), Some(&42));
///
/// let failed: ResponseEnvelope<i32> =
///     ResponseEnvelope::failure(ErrorResponse::new(ErrorCode::DatabaseError, "down"));
/// assert!(!failed.is_success());
/// assert!(failed.data().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "EnvelopeDto<T>")]
pub struct ResponseEnvelope<T> {
    is_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorResponse>,
    meta: MetaInfo,
}

/// Reasons a decoded envelope is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnvelopeShapeError {
    /// `isSuccess` is true but an `error` is present.
    #[error("successful envelope must not carry an error")]
    SuccessWithError,
    /// `isSuccess` is true but the `data` key is missing.
    #[error("successful envelope must carry data")]
    SuccessWithoutData,
    /// `isSuccess` is false but no `error` is present.
    #[error("failed envelope must carry an error")]
    FailureWithoutError,
    /// `isSuccess` is false but `data` is present.
    #[error("failed envelope must not carry data")]
    FailureWithData,
}

impl<T> ResponseEnvelope<T> {
    /// Successful envelope with fresh metadata.
    pub fn success(data: T) -> Self {
        Self::success_with_meta(data, MetaInfo::now())
    }

    /// Successful envelope with caller-built metadata.
    pub fn success_with_meta(data: T, meta: MetaInfo) -> Self {
        Self {
            is_success: true,
            data: Some(data),
            error: None,
            meta,
        }
    }

    /// Failed envelope with fresh metadata.
    pub fn failure(error: ErrorResponse) -> Self {
        Self::failure_with_meta(error, MetaInfo::now())
    }

    /// Failed envelope with caller-built metadata.
    pub fn failure_with_meta(error: ErrorResponse, meta: MetaInfo) -> Self {
        Self {
            is_success: false,
            data: None,
            error: Some(error),
            meta,
        }
    }

    /// Failed envelope for a missing entity.
    ///
    /// `message` defaults to "Resource not found"; `errors` echoes `id`.
    pub fn not_found<I: Serialize>(id: I, message: Option<&str>) -> Self {
        Self::failure(ErrorResponse::not_found(id, message))
    }

    /// Wrap a domain outcome.
    pub fn from_result(result: Result<T, ErrorResponse>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(error) => Self::failure(error),
        }
    }

    /// Whether the envelope reports success.
    pub fn is_success(&self) -> bool {
        self.is_success
    }

    /// Payload of a successful envelope.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Failure of an unsuccessful envelope.
    pub fn error(&self) -> Option<&ErrorResponse> {
        self.error.as_ref()
    }

    /// Envelope metadata.
    pub fn meta(&self) -> &MetaInfo {
        &self.meta
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct EnvelopeDto<T> {
    is_success: bool,
    #[serde(default, deserialize_with = "present")]
    data: Option<T>,
    error: Option<ErrorResponse>,
    meta: MetaInfo,
}

/// A `data` key that is present yields `Some`, even when it holds `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl<T> TryFrom<EnvelopeDto<T>> for ResponseEnvelope<T> {
    type Error = EnvelopeShapeError;

    fn try_from(value: EnvelopeDto<T>) -> Result<Self, Self::Error> {
        let EnvelopeDto {
            is_success,
            data,
            error,
            meta,
        } = value;

        match (is_success, data.is_some(), error.is_some()) {
            (true, _, true) => Err(EnvelopeShapeError::SuccessWithError),
            (true, false, false) => Err(EnvelopeShapeError::SuccessWithoutData),
            (false, _, false) => Err(EnvelopeShapeError::FailureWithoutError),
            (false, true, true) => Err(EnvelopeShapeError::FailureWithData),
            _ => Ok(Self {
                is_success,
                data,
                error,
                meta,
            }),
        }
    }
}
