//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on the domain service and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::AppointmentService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    appointments: AppointmentService,
    clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Bundle the appointment service; request validation shares its clock.
    pub fn new(appointments: AppointmentService) -> Self {
        let clock = Arc::clone(appointments.clock());
        Self {
            appointments,
            clock,
        }
    }

    /// Appointment use-cases.
    pub fn appointments(&self) -> &AppointmentService {
        &self.appointments
    }

    /// Clock used for request validation.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
