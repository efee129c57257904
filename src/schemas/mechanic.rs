// src/schemas/mechanic.rs

use serde::Serialize;
use serde_json::Value;

use super::{EntitySchema, FilterBase};
use crate::primitives::{self, Text};
use crate::validator::{Fields, ValidationFailure};

const SORTABLE: &[&str] = &["createdAt", "name", "commissionPercentage"];

pub const DEFAULT_COMMISSION_PERCENTAGE: f64 = 0.0;

fn name() -> Text {
    Text::new()
        .min(2, "El nombre debe tener al menos 2 caracteres")
        .max(100, "El nombre no puede exceder 100 caracteres")
}

fn commission() -> impl Fn(&Value) -> Result<f64, String> {
    primitives::number(0.0, Some(100.0), "La comisión debe estar entre 0 y 100")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMechanic {
    pub name: String,
    pub phone: Option<String>,
    pub commission_percentage: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMechanic {
    pub id: i64,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub commission_percentage: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MechanicFilter {
    #[serde(flatten)]
    pub base: FilterBase,
    pub is_active: Option<bool>,
}

pub struct Mechanic;

impl EntitySchema for Mechanic {
    const NAME: &'static str = "mechanics";

    type Create = CreateMechanic;
    type Update = UpdateMechanic;
    type Filter = MechanicFilter;

    fn validate_create(raw: &Value) -> Result<CreateMechanic, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = CreateMechanic {
            name: f.required("name", name()),
            phone: f.optional("phone", primitives::phone),
            commission_percentage: f.or_default(
                "commissionPercentage",
                DEFAULT_COMMISSION_PERCENTAGE,
                commission(),
            ),
            is_active: f.or_default("isActive", true, primitives::flag),
        };
        f.finish(input)
    }

    fn validate_update(raw: &Value) -> Result<UpdateMechanic, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = UpdateMechanic {
            id: f.required("id", primitives::id),
            name: f.optional("name", name()),
            phone: f.optional("phone", primitives::phone),
            commission_percentage: f.optional("commissionPercentage", commission()),
            is_active: f.optional("isActive", primitives::flag),
        };
        f.finish(input)
    }

    fn validate_filter(raw: &Value) -> Result<MechanicFilter, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = MechanicFilter {
            base: FilterBase::read(&mut f, SORTABLE),
            is_active: f.lenient("isActive", primitives::flag_param),
        };
        f.finish(input)
    }
}
