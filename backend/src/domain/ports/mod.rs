//! Domain ports for collaborators the demo service depends on.
//!
//! The demo endpoints simulate flaky storage and assign random identifiers;
//! both are injected so tests can force either branch.

mod appointment_ids;
mod outcome_strategy;

pub use appointment_ids::{AppointmentIds, RandomAppointmentIds, SequentialAppointmentIds};
pub use outcome_strategy::{FixedOutcome, Operation, Outcome, OutcomeStrategy, RandomOutcomes};
