//! Unexpected failures that escape endpoint logic.
//!
//! Expected failures are [`ErrorResponse`](crate::domain::ErrorResponse)
//! values. A [`Fault`] is the only failure that travels by propagation; the
//! unhandled-failure middleware catches it once at the outermost boundary.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic;
use std::sync::Once;

use thiserror::Error;

use crate::domain::ExceptionDetails;

thread_local! {
    static PANIC_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Record the backtrace of every panic at the panic site.
///
/// Installs, once per process, a hook that stores the panicking thread's
/// backtrace for [`Fault::from_panic`] and then defers to the previous hook.
pub fn capture_panic_backtraces() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let trace = Backtrace::force_capture().to_string();
            PANIC_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

/// An unexpected failure or a client-initiated cancellation.
#[derive(Debug, Clone, Error)]
pub enum Fault {
    /// Something went wrong that no handler anticipated.
    #[error("{message}")]
    Unhandled {
        /// Message of the fault itself.
        message: String,
        /// Message of the inner cause, if any.
        details: Option<String>,
        /// Stack captured when the fault was created.
        stack_trace: String,
    },
    /// The client abandoned the request; not an error.
    #[error("request cancelled by the client")]
    Cancelled,
}

impl Fault {
    /// Unhandled fault with a message and no inner cause.
    ///
    /// # Examples
    /// ```
    /// use appointment_api::domain::Fault;
    ///
    /// let fault = Fault::unhandled("disk on fire");
    /// assert_eq!(fault.to_string(), "disk on fire");
    /// ```
    pub fn unhandled(message: impl Into<String>) -> Self {
        Self::Unhandled {
            message: message.into(),
            details: None,
            stack_trace: Backtrace::force_capture().to_string(),
        }
    }

    /// Unhandled fault describing `err`; its `source()` becomes the details.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        Self::Unhandled {
            message: err.to_string(),
            details: err.source().map(ToString::to_string),
            stack_trace: Backtrace::force_capture().to_string(),
        }
    }

    /// Unhandled fault built from a caught panic payload.
    ///
    /// Uses the backtrace recorded at the panic site when
    /// [`capture_panic_backtraces`] is active on this thread, otherwise the
    /// current one.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|text| (*text).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "handler panicked with a non-string payload".to_owned());
        let stack_trace = PANIC_BACKTRACE
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(|| Backtrace::force_capture().to_string());
        Self::Unhandled {
            message,
            details: None,
            stack_trace,
        }
    }

    /// Whether this is a client cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Diagnostic block for the failure envelope; `None` for cancellation.
    pub fn diagnostics(&self) -> Option<ExceptionDetails> {
        match self {
            Self::Unhandled {
                message,
                details,
                stack_trace,
            } => Some(ExceptionDetails::new(
                message.clone(),
                details.clone(),
                stack_trace.clone(),
            )),
            Self::Cancelled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Diagnostics extracted from the different fault sources.

    use super::*;
    use rstest::rstest;

    #[derive(Debug, Error)]
    #[error("outer failure")]
    struct Outer {
        #[source]
        inner: std::io::Error,
    }

    #[rstest]
    fn from_error_uses_source_as_details() {
        let err = Outer {
            inner: std::io::Error::other("socket closed"),
        };
        let diagnostics = Fault::from_error(&err).diagnostics().expect("diagnostics");

        assert_eq!(diagnostics.message(), "outer failure");
        assert_eq!(diagnostics.details(), Some("socket closed"));
        assert!(!diagnostics.stack_trace().is_empty());
    }

    #[rstest]
    #[case(Box::new("static message") as Box<dyn Any + Send>, "static message")]
    #[case(Box::new(String::from("owned message")) as Box<dyn Any + Send>, "owned message")]
    #[case(Box::new(7_u8) as Box<dyn Any + Send>, "handler panicked with a non-string payload")]
    fn panic_payloads_become_messages(#[case] payload: Box<dyn Any + Send>, #[case] expected: &str) {
        let fault = Fault::from_panic(payload.as_ref());
        assert_eq!(fault.to_string(), expected);
    }

    #[inline(never)]
    fn explode() {
        panic!("kaboom");
    }

    #[rstest]
    fn panic_backtrace_is_taken_at_the_panic_site() {
        capture_panic_backtraces();
        let payload = std::panic::catch_unwind(explode).expect_err("explode panics");
        let diagnostics = Fault::from_panic(payload.as_ref())
            .diagnostics()
            .expect("diagnostics");

        assert_eq!(diagnostics.message(), "kaboom");
        assert!(
            diagnostics.stack_trace().contains("tests::explode"),
            "expected the panicking function in {}",
            diagnostics.stack_trace()
        );
    }

    #[rstest]
    fn cancellation_has_no_diagnostics() {
        assert!(Fault::Cancelled.is_cancelled());
        assert!(Fault::Cancelled.diagnostics().is_none());
    }
}
