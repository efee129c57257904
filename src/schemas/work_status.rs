// src/schemas/work_status.rs
//! Etapas del flujo de trabajo (recepción, diagnóstico, reparación, entrega...)

use serde::Serialize;
use serde_json::Value;

use super::{EntitySchema, FilterBase};
use crate::primitives::{self, Text};
use crate::validator::{Fields, ValidationFailure};

const SORTABLE: &[&str] = &["createdAt", "orderIndex", "name"];

pub const DEFAULT_COLOR: &str = "#6B7280";

fn name() -> Text {
    Text::new()
        .min(1, "El nombre es requerido")
        .max(50, "El nombre no puede exceder 50 caracteres")
}

fn color() -> Text {
    Text::new().max(20, "El color no puede exceder 20 caracteres")
}

fn order_index() -> impl Fn(&Value) -> Result<i64, String> {
    primitives::integer(0, "El orden no puede ser negativo")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkStatus {
    pub name: String,
    pub order_index: i64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkStatus {
    pub id: i64,
    pub name: Option<String>,
    pub order_index: Option<i64>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkStatusFilter {
    #[serde(flatten)]
    pub base: FilterBase,
}

pub struct WorkStatus;

impl EntitySchema for WorkStatus {
    const NAME: &'static str = "work-statuses";

    type Create = CreateWorkStatus;
    type Update = UpdateWorkStatus;
    type Filter = WorkStatusFilter;

    fn validate_create(raw: &Value) -> Result<CreateWorkStatus, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = CreateWorkStatus {
            name: f.required("name", name()),
            order_index: f.required("orderIndex", order_index()),
            color: f.or_default("color", DEFAULT_COLOR.to_string(), color()),
        };
        f.finish(input)
    }

    fn validate_update(raw: &Value) -> Result<UpdateWorkStatus, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = UpdateWorkStatus {
            id: f.required("id", primitives::id),
            name: f.optional("name", name()),
            order_index: f.optional("orderIndex", order_index()),
            color: f.optional("color", color()),
        };
        f.finish(input)
    }

    fn validate_filter(raw: &Value) -> Result<WorkStatusFilter, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = WorkStatusFilter {
            base: FilterBase::read(&mut f, SORTABLE),
        };
        f.finish(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_color() {
        let input = WorkStatus::validate_create(&json!({ "name": "Diagnóstico", "orderIndex": 2 }))
            .unwrap();
        assert_eq!(input.color, DEFAULT_COLOR);
        assert_eq!(input.order_index, 2);
    }

    #[test]
    fn test_order_index_zero_allowed() {
        let raw = json!({ "name": "Recepción", "orderIndex": 0 });
        assert!(WorkStatus::validate_create(&raw).is_ok());
    }

    #[test]
    fn test_missing_order_index() {
        let failure = WorkStatus::validate_create(&json!({ "name": "Entrega" })).unwrap_err();
        assert_eq!(failure.fields(), vec!["orderIndex"]);
    }

    #[test]
    fn test_update_with_only_id() {
        let input = WorkStatus::validate_update(&json!({ "id": 4 })).unwrap();
        assert_eq!(input.color, None);
    }

    #[test]
    fn test_filter_sort_by_order_index() {
        let raw = json!({ "sortBy": "orderIndex", "sortOrder": "asc" });
        let filter = WorkStatus::validate_filter(&raw).unwrap();
        assert_eq!(filter.base.sort_by, "orderIndex");
    }
}
