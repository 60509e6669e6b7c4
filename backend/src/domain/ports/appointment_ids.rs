//! Driven port assigning identifiers to new appointments.

use std::ops::Range;
use std::sync::atomic::{AtomicI32, Ordering};

use rand::Rng;

use crate::domain::AppointmentId;

/// Source of identifiers for newly created appointments.
pub trait AppointmentIds: Send + Sync {
    /// Next identifier to assign.
    fn next_id(&self) -> AppointmentId;
}

/// Random identifiers outside the generated dataset.
#[derive(Debug, Clone)]
pub struct RandomAppointmentIds {
    range: Range<AppointmentId>,
}

impl Default for RandomAppointmentIds {
    fn default() -> Self {
        Self { range: 101..10_000 }
    }
}

impl AppointmentIds for RandomAppointmentIds {
    fn next_id(&self) -> AppointmentId {
        rand::thread_rng().gen_range(self.range.clone())
    }
}

/// Monotonic identifiers, starting at a fixed value.
#[derive(Debug)]
pub struct SequentialAppointmentIds {
    next: AtomicI32,
}

impl SequentialAppointmentIds {
    /// Start counting at `first`.
    pub fn starting_at(first: AppointmentId) -> Self {
        Self {
            next: AtomicI32::new(first),
        }
    }
}

impl AppointmentIds for SequentialAppointmentIds {
    fn next_id(&self) -> AppointmentId {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn random_ids_stay_in_range() {
        let ids = RandomAppointmentIds::default();
        for _ in 0..200 {
            let id = ids.next_id();
            assert!((101..10_000).contains(&id), "id {id} out of range");
        }
    }

    #[rstest]
    fn sequential_ids_increment() {
        let ids = SequentialAppointmentIds::starting_at(500);
        assert_eq!(ids.next_id(), 500);
        assert_eq!(ids.next_id(), 501);
    }
}
