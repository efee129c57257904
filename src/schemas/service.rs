// src/schemas/service.rs
//! Órdenes de servicio: el trabajo realizado sobre un vehículo

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{EntitySchema, FilterBase};
use crate::primitives::{self, Text};
use crate::validator::{Fields, ValidationFailure};

const SORTABLE: &[&str] = &["createdAt", "totalAmount", "statusId", "startedAt", "completedAt"];

pub const DEFAULT_STATUS_ID: i64 = 1;

fn long_text() -> Text {
    Text::new().max(2000, "El texto no puede exceder 2000 caracteres")
}

fn amount() -> impl Fn(&Value) -> Result<f64, String> {
    primitives::number(0.0, None, "El monto no puede ser negativo")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateService {
    pub appointment_id: Option<i64>,
    pub client_id: i64,
    pub vehicle_id: i64,
    pub mechanic_id: Option<i64>,
    pub status_id: i64,
    pub problem_description: Option<String>,
    pub diagnosis: Option<String>,
    pub quotation_details: Option<String>,
    pub total_amount: f64,
    pub mechanic_commission: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateService {
    pub id: i64,
    pub appointment_id: Option<i64>,
    pub client_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub mechanic_id: Option<i64>,
    pub status_id: Option<i64>,
    pub problem_description: Option<String>,
    pub diagnosis: Option<String>,
    pub quotation_details: Option<String>,
    pub total_amount: Option<f64>,
    pub mechanic_commission: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFilter {
    #[serde(flatten)]
    pub base: FilterBase,
    pub client_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub mechanic_id: Option<i64>,
    pub status_id: Option<i64>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

pub struct Service;

impl EntitySchema for Service {
    const NAME: &'static str = "services";

    type Create = CreateService;
    type Update = UpdateService;
    type Filter = ServiceFilter;

    fn validate_create(raw: &Value) -> Result<CreateService, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = CreateService {
            appointment_id: f.optional("appointmentId", primitives::id),
            client_id: f.required("clientId", primitives::id),
            vehicle_id: f.required("vehicleId", primitives::id),
            mechanic_id: f.optional("mechanicId", primitives::id),
            status_id: f.or_default("statusId", DEFAULT_STATUS_ID, primitives::id),
            problem_description: f.optional("problemDescription", long_text()),
            diagnosis: f.optional("diagnosis", long_text()),
            quotation_details: f.optional("quotationDetails", long_text()),
            total_amount: f.or_default("totalAmount", 0.0, amount()),
            mechanic_commission: f.or_default("mechanicCommission", 0.0, amount()),
        };
        f.finish(input)
    }

    fn validate_update(raw: &Value) -> Result<UpdateService, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = UpdateService {
            id: f.required("id", primitives::id),
            appointment_id: f.optional("appointmentId", primitives::id),
            client_id: f.optional("clientId", primitives::id),
            vehicle_id: f.optional("vehicleId", primitives::id),
            mechanic_id: f.optional("mechanicId", primitives::id),
            status_id: f.optional("statusId", primitives::id),
            problem_description: f.optional("problemDescription", long_text()),
            diagnosis: f.optional("diagnosis", long_text()),
            quotation_details: f.optional("quotationDetails", long_text()),
            total_amount: f.optional("totalAmount", amount()),
            mechanic_commission: f.optional("mechanicCommission", amount()),
            started_at: f.optional("startedAt", primitives::date),
            completed_at: f.optional("completedAt", primitives::date),
        };
        f.finish(input)
    }

    fn validate_filter(raw: &Value) -> Result<ServiceFilter, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = ServiceFilter {
            base: FilterBase::read(&mut f, SORTABLE),
            client_id: f.optional("clientId", primitives::id),
            vehicle_id: f.optional("vehicleId", primitives::id),
            mechanic_id: f.optional("mechanicId", primitives::id),
            status_id: f.optional("statusId", primitives::id),
            date_from: f.optional("dateFrom", primitives::date),
            date_to: f.optional("dateTo", primitives::date),
        };
        f.finish(input)
    }
}
