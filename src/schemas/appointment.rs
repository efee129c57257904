// src/schemas/appointment.rs
//! Citas del taller

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{EnumString, VariantNames};

use super::{EntitySchema, FilterBase};
use crate::primitives::{self, Text};
use crate::validator::{Fields, ValidationFailure};

const SORTABLE: &[&str] = &["createdAt", "scheduledDate", "status"];

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

fn notes() -> Text {
    Text::new().max(500, "Las notas no pueden exceder 500 caracteres")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointment {
    pub client_id: i64,
    pub vehicle_id: i64,
    pub opportunity_id: Option<i64>,
    pub scheduled_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub is_from_opportunity: bool,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointment {
    pub id: i64,
    pub client_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub opportunity_id: Option<i64>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_from_opportunity: Option<bool>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilter {
    #[serde(flatten)]
    pub base: FilterBase,
    pub client_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub status: Option<AppointmentStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

pub struct Appointment;

impl EntitySchema for Appointment {
    const NAME: &'static str = "appointments";

    type Create = CreateAppointment;
    type Update = UpdateAppointment;
    type Filter = AppointmentFilter;

    fn validate_create(raw: &Value) -> Result<CreateAppointment, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = CreateAppointment {
            client_id: f.required("clientId", primitives::id),
            vehicle_id: f.required("vehicleId", primitives::id),
            opportunity_id: f.optional("opportunityId", primitives::id),
            scheduled_date: f.required("scheduledDate", primitives::date),
            notes: f.optional("notes", notes()),
            is_from_opportunity: f.or_default("isFromOpportunity", false, primitives::flag),
            status: f.or_default(
                "status",
                AppointmentStatus::Scheduled,
                primitives::one_of::<AppointmentStatus>,
            ),
        };
        f.finish(input)
    }

    fn validate_update(raw: &Value) -> Result<UpdateAppointment, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = UpdateAppointment {
            id: f.required("id", primitives::id),
            client_id: f.optional("clientId", primitives::id),
            vehicle_id: f.optional("vehicleId", primitives::id),
            opportunity_id: f.optional("opportunityId", primitives::id),
            scheduled_date: f.optional("scheduledDate", primitives::date),
            notes: f.optional("notes", notes()),
            is_from_opportunity: f.optional("isFromOpportunity", primitives::flag),
            status: f.optional("status", primitives::one_of::<AppointmentStatus>),
        };
        f.finish(input)
    }

    fn validate_filter(raw: &Value) -> Result<AppointmentFilter, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = AppointmentFilter {
            base: FilterBase::read(&mut f, SORTABLE),
            client_id: f.optional("clientId", primitives::id),
            vehicle_id: f.optional("vehicleId", primitives::id),
            status: f.optional("status", primitives::one_of::<AppointmentStatus>),
            date_from: f.optional("dateFrom", primitives::date),
            date_to: f.optional("dateTo", primitives::date),
        };
        f.finish(input)
    }
}
