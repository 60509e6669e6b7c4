//! Request middleware.
//!
//! Purpose: request lifecycle concerns that wrap every endpoint, namely the
//! trace context and the unhandled-failure boundary.

pub mod trace;
pub mod unhandled;

pub use trace::Trace;
pub use unhandled::UnhandledFailure;
