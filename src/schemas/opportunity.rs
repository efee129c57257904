// src/schemas/opportunity.rs
//! Oportunidades de venta: seguimiento a clientes para servicios futuros

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{EnumString, VariantNames};

use super::{EntitySchema, FilterBase};
use crate::primitives::{self, Text};
use crate::validator::{Fields, ValidationFailure};

const SORTABLE: &[&str] = &["createdAt", "followUpDate", "status"];

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OpportunityStatus {
    #[default]
    Pending,
    Contacted,
    Interested,
    Declined,
    Converted,
}

fn kind() -> Text {
    Text::new()
        .min(1, "El tipo es requerido")
        .max(50, "El tipo no puede exceder 50 caracteres")
}

fn description() -> Text {
    Text::new()
        .min(1, "La descripción es requerida")
        .max(1000, "La descripción no puede exceder 1000 caracteres")
}

fn notes() -> Text {
    Text::new().max(500, "Las notas no pueden exceder 500 caracteres")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpportunity {
    pub client_id: i64,
    pub vehicle_id: i64,
    pub service_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub follow_up_date: DateTime<Utc>,
    pub status: OpportunityStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOpportunity {
    pub id: i64,
    pub client_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub service_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub status: Option<OpportunityStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityFilter {
    #[serde(flatten)]
    pub base: FilterBase,
    pub client_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub status: Option<OpportunityStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

pub struct Opportunity;

impl EntitySchema for Opportunity {
    const NAME: &'static str = "opportunities";

    type Create = CreateOpportunity;
    type Update = UpdateOpportunity;
    type Filter = OpportunityFilter;

    fn validate_create(raw: &Value) -> Result<CreateOpportunity, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = CreateOpportunity {
            client_id: f.required("clientId", primitives::id),
            vehicle_id: f.required("vehicleId", primitives::id),
            service_id: f.optional("serviceId", primitives::id),
            kind: f.required("type", kind()),
            description: f.required("description", description()),
            follow_up_date: f.required("followUpDate", primitives::date),
            status: f.or_default(
                "status",
                OpportunityStatus::Pending,
                primitives::one_of::<OpportunityStatus>,
            ),
            notes: f.optional("notes", notes()),
        };
        f.finish(input)
    }

    fn validate_update(raw: &Value) -> Result<UpdateOpportunity, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = UpdateOpportunity {
            id: f.required("id", primitives::id),
            client_id: f.optional("clientId", primitives::id),
            vehicle_id: f.optional("vehicleId", primitives::id),
            service_id: f.optional("serviceId", primitives::id),
            kind: f.optional("type", kind()),
            description: f.optional("description", description()),
            follow_up_date: f.optional("followUpDate", primitives::date),
            status: f.optional("status", primitives::one_of::<OpportunityStatus>),
            notes: f.optional("notes", notes()),
        };
        f.finish(input)
    }

    fn validate_filter(raw: &Value) -> Result<OpportunityFilter, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = OpportunityFilter {
            base: FilterBase::read(&mut f, SORTABLE),
            client_id: f.optional("clientId", primitives::id),
            vehicle_id: f.optional("vehicleId", primitives::id),
            status: f.optional("status", primitives::one_of::<OpportunityStatus>),
            date_from: f.optional("dateFrom", primitives::date),
            date_to: f.optional("dateTo", primitives::date),
        };
        f.finish(input)
    }
}
