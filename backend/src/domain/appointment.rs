//! Appointment model used by the demo endpoints.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::FieldErrors;

/// Field name reported for customer name failures.
pub const CUSTOMER_NAME_FIELD: &str = "customerName";
/// Field name reported for date failures.
pub const DATE_FIELD: &str = "date";
/// Message for a blank or missing customer name.
pub const CUSTOMER_NAME_REQUIRED: &str = "Customer name is required.";
/// Message for a date that is missing or not in the future.
pub const DATE_MUST_BE_FUTURE: &str = "Appointment date must be in the future.";

/// Identifier of an appointment.
pub type AppointmentId = i32;

/// A booked appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[schema(example = 1)]
    id: AppointmentId,
    date: DateTime<Utc>,
    #[schema(example = "Customer 1")]
    customer_name: String,
}

impl Appointment {
    /// Assemble an appointment from its parts.
    pub fn new(id: AppointmentId, date: DateTime<Utc>, customer_name: impl Into<String>) -> Self {
        Self {
            id,
            date,
            customer_name: customer_name.into(),
        }
    }

    /// Appointment identifier.
    pub fn id(&self) -> AppointmentId {
        self.id
    }

    /// Scheduled instant.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Customer the appointment is booked for.
    pub fn customer_name(&self) -> &str {
        self.customer_name.as_str()
    }
}

/// Validated input for booking an appointment.
///
/// ## Invariants
/// - `customer_name` is non-blank.
/// - `date` was strictly after "now" when validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    date: DateTime<Utc>,
    customer_name: String,
}

impl NewAppointment {
    /// Validate raw input against `now`, reporting every failing field.
    ///
    /// # Examples
    /// ```
    /// use appointment_api::domain::NewAppointment;
    /// use chrono::{Duration, Utc};
    ///
    /// let now = Utc::now();
    /// let errors = NewAppointment::try_new(None, Some(now - Duration::days(1)), now)
    ///     .expect_err("both fields invalid");
    /// assert_eq!(errors.flatten().len(), 2);
    /// ```
    pub fn try_new(
        customer_name: Option<String>,
        date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let customer_name = customer_name.filter(|name| !name.trim().is_empty());
        if customer_name.is_none() {
            errors.add(CUSTOMER_NAME_FIELD, CUSTOMER_NAME_REQUIRED);
        }
        let date = date.filter(|date| *date > now);
        if date.is_none() {
            errors.add(DATE_FIELD, DATE_MUST_BE_FUTURE);
        }

        match (customer_name, date) {
            (Some(customer_name), Some(date)) => Ok(Self {
                date,
                customer_name,
            }),
            _ => Err(errors),
        }
    }

    /// Scheduled instant.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Customer name.
    pub fn customer_name(&self) -> &str {
        self.customer_name.as_str()
    }

    /// Attach the identifier assigned on creation.
    pub fn into_appointment(self, id: AppointmentId) -> Appointment {
        Appointment::new(id, self.date, self.customer_name)
    }
}

/// In-memory demo dataset: ids `1..=count`, one per day after `now`.
pub fn generate_appointments(count: usize, now: DateTime<Utc>) -> Vec<Appointment> {
    (1..=count)
        .filter_map(|index| AppointmentId::try_from(index).ok())
        .map(|id| {
            Appointment::new(
                id,
                now + Duration::days(i64::from(id)),
                format!("Customer {id}"),
            )
        })
        .collect()
}
