//! Demo appointment use-cases.
//!
//! Each operation returns either a payload or an [`ErrorResponse`]; nothing
//! here raises. Simulated storage failures come from the injected
//! [`OutcomeStrategy`].

use std::sync::Arc;

use mockable::Clock;
use pagination::{PageMeta, PageRequest};

use crate::domain::ports::{AppointmentIds, Operation, Outcome, OutcomeStrategy};
use crate::domain::{
    Appointment, AppointmentId, ErrorCode, ErrorResponse, NewAppointment, generate_appointments,
};

/// Size of the dataset served by the list endpoint.
pub const LIST_DATASET_SIZE: usize = 25;
/// Size of the dataset searched by the lookup endpoint.
pub const LOOKUP_DATASET_SIZE: usize = 100;

const LIST_FAILURE_MESSAGE: &str = "Failed to fetch one of the appointments from the database.";
const CREATE_FAILURE_MESSAGE: &str = "Failed to create appointment in the database.";
const NOT_FOUND_MESSAGE: &str = "Appointment not found.";

/// One page of appointments together with its pagination block.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentPage {
    /// Appointments on the requested page.
    pub items: Vec<Appointment>,
    /// Page position and collection totals.
    pub meta: PageMeta,
}

/// Appointment use-cases backed by an in-memory dataset.
#[derive(Clone)]
pub struct AppointmentService {
    outcomes: Arc<dyn OutcomeStrategy>,
    ids: Arc<dyn AppointmentIds>,
    clock: Arc<dyn Clock>,
}

impl AppointmentService {
    /// Create the service.
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// use appointment_api::domain::AppointmentService;
    /// use appointment_api::domain::ports::{FixedOutcome, Outcome, RandomAppointmentIds};
    ///
    /// let service = AppointmentService::new(
    ///     Arc::new(FixedOutcome(Outcome::Proceed)),
    ///     Arc::new(RandomAppointmentIds::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// assert!(service.get(1).is_ok());
    /// ```
    pub fn new(
        outcomes: Arc<dyn OutcomeStrategy>,
        ids: Arc<dyn AppointmentIds>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            outcomes,
            ids,
            clock,
        }
    }

    /// Clock used for "now".
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// List one page of the demo dataset.
    pub fn list(&self, request: PageRequest) -> Result<AppointmentPage, ErrorResponse> {
        if self.outcomes.outcome(Operation::ListAppointments) == Outcome::Fail {
            return Err(ErrorResponse::new(
                ErrorCode::DatabaseError,
                LIST_FAILURE_MESSAGE,
            ));
        }

        let all = generate_appointments(LIST_DATASET_SIZE, self.clock.utc());
        let total_items = u64::try_from(all.len()).unwrap_or(u64::MAX);
        Ok(AppointmentPage {
            items: request.slice(&all).to_vec(),
            meta: PageMeta::with_totals(request, total_items),
        })
    }

    /// Look up an appointment; a missing id yields `EntityDoesNotExist`.
    pub fn get(&self, id: AppointmentId) -> Result<Appointment, ErrorResponse> {
        generate_appointments(LOOKUP_DATASET_SIZE, self.clock.utc())
            .into_iter()
            .find(|appointment| appointment.id() == id)
            .ok_or_else(|| ErrorResponse::not_found(id, Some(NOT_FOUND_MESSAGE)))
    }

    /// Book a validated appointment.
    pub fn create(&self, appointment: NewAppointment) -> Result<Appointment, ErrorResponse> {
        if self.outcomes.outcome(Operation::CreateAppointment) == Outcome::Fail {
            return Err(ErrorResponse::new(
                ErrorCode::DatabaseError,
                CREATE_FAILURE_MESSAGE,
            ));
        }
        Ok(appointment.into_appointment(self.ids.next_id()))
    }
}
