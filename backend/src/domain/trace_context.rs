//! Request-scoped tracing context (trace id + span id).
//!
//! The `Trace` middleware creates a [`TraceContext`] per request and keeps it
//! in task-local storage for the lifetime of that request. Code that builds
//! envelope metadata reads it with [`TraceContext::current`] or receives it
//! explicitly.
//!
//! Tokio task-local variables are not inherited across spawned tasks. Use
//! [`TraceContext::scope`] when moving work onto another task.

use std::future::Future;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static TRACE_CONTEXT: TraceContext;
}

/// 128-bit trace identifier rendered as 32 lower-case hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Generate a new random trace identifier.
    #[must_use]
    #[rustfmt::skip]
    pub fn generate() -> Self { Self(Uuid::new_v4()) }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl std::str::FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// 64-bit span identifier rendered as 16 lower-case hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(u64);

impl SpanId {
    /// Generate a new random, non-zero span identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(rand::random::<u64>().max(1))
    }
}

impl std::fmt::Display for SpanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Identifiers correlating one request with a distributed trace.
///
/// # Examples
/// ```
/// use appointment_api::domain::TraceContext;
///
/// let header = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";
/// let context = TraceContext::from_traceparent(header).expect("valid header");
/// assert_eq!(context.trace_id().to_string(), "4bf92f3577b34da6a3ce929d0e0e4736");
/// assert_ne!(context.span_id().to_string(), "00f067aa0ba902b7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: TraceId,
    span_id: SpanId,
    parent_span_id: Option<SpanId>,
}

impl TraceContext {
    /// Start a new root trace.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            trace_id: TraceId::generate(),
            span_id: SpanId::generate(),
            parent_span_id: None,
        }
    }

    /// Continue the trace named by a W3C `traceparent` header value.
    ///
    /// Returns `None` for malformed values, unsupported versions and all-zero
    /// identifiers. The returned context gets a fresh span id whose parent is
    /// the caller's span.
    #[must_use]
    pub fn from_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let (version, trace, parent, flags) =
            (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || version != "00" || flags.len() != 2 {
            return None;
        }
        if !is_lower_hex(trace, 32) || !is_lower_hex(parent, 16) || !is_lower_hex(flags, 2) {
            return None;
        }
        let trace = u128::from_str_radix(trace, 16).ok().filter(|id| *id != 0)?;
        let parent = u64::from_str_radix(parent, 16).ok().filter(|id| *id != 0)?;
        Some(Self {
            trace_id: TraceId(Uuid::from_u128(trace)),
            span_id: SpanId::generate(),
            parent_span_id: Some(SpanId(parent)),
        })
    }

    /// Trace shared by every span of the distributed operation.
    #[must_use]
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Span created for this request.
    #[must_use]
    pub fn span_id(&self) -> SpanId {
        self.span_id
    }

    /// Caller's span when the trace was continued from a header.
    #[must_use]
    pub fn parent_span_id(&self) -> Option<SpanId> {
        self.parent_span_id
    }

    /// Returns the context in scope for the current request, if any.
    #[must_use]
    #[rustfmt::skip]
    pub fn current() -> Option<Self> { TRACE_CONTEXT.try_with(|context| *context).ok() }

    /// Execute the provided future with `context` in scope.
    ///
    /// # Examples
    /// ```
    /// use appointment_api::domain::TraceContext;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let context = TraceContext::generate();
    /// let observed = TraceContext::scope(context, async { TraceContext::current() }).await;
    /// assert_eq!(observed, Some(context));
    /// # });
    /// ```
    pub async fn scope<Fut>(context: TraceContext, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_CONTEXT.scope(context, fut).await
    }
}

fn is_lower_hex(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
