//! Driven port deciding whether a demo operation fails.

use rand::Rng;

/// Operations whose outcome can be forced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `GET /appointment`.
    ListAppointments,
    /// `POST /appointment`.
    CreateAppointment,
}

/// Decision returned by an [`OutcomeStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Carry on and produce a success payload.
    Proceed,
    /// Return a simulated database failure.
    Fail,
}

/// Chooses between success and a simulated domain failure.
pub trait OutcomeStrategy: Send + Sync {
    /// Decide the outcome for `operation`.
    fn outcome(&self, operation: Operation) -> Outcome;
}

/// Thread-local randomness with the demo failure rates.
///
/// Listing draws `0..10` and fails on `<= 5`; creation fails on `< 2`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOutcomes;

impl RandomOutcomes {
    fn decide(operation: Operation, draw: u8) -> Outcome {
        let fails = match operation {
            Operation::ListAppointments => draw <= 5,
            Operation::CreateAppointment => draw < 2,
        };
        if fails { Outcome::Fail } else { Outcome::Proceed }
    }
}

impl OutcomeStrategy for RandomOutcomes {
    fn outcome(&self, operation: Operation) -> Outcome {
        let draw = rand::thread_rng().gen_range(0..10);
        Self::decide(operation, draw)
    }
}

/// Always returns the same outcome.
#[derive(Debug, Clone, Copy)]
pub struct FixedOutcome(pub Outcome);

impl OutcomeStrategy for FixedOutcome {
    fn outcome(&self, _operation: Operation) -> Outcome {
        self.0
    }
}
