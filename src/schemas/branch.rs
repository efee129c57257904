// src/schemas/branch.rs
//! Sucursales de la cadena de talleres

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::{EntitySchema, FilterBase};
use crate::primitives::{self, Text};
use crate::validator::{Fields, ValidationFailure};

lazy_static! {
    static ref BRANCH_CODE_REGEX: Regex = Regex::new(r"^[A-Z0-9]+$").unwrap();
}

const SORTABLE: &[&str] = &["createdAt", "name", "code", "city"];

fn name() -> Text {
    Text::new()
        .min(2, "El nombre debe tener al menos 2 caracteres")
        .max(100, "El nombre no puede exceder 100 caracteres")
}

/// Type, then length, then pattern.
fn code() -> Text {
    Text::new()
        .min(3, "El código debe tener al menos 3 caracteres")
        .max(10, "El código no puede exceder 10 caracteres")
        .pattern(
            &BRANCH_CODE_REGEX,
            "El código solo puede contener letras mayúsculas y números",
        )
}

fn address() -> Text {
    Text::new()
        .min(5, "La dirección debe tener al menos 5 caracteres")
        .max(255, "La dirección no puede exceder 255 caracteres")
}

fn city() -> Text {
    Text::new()
        .min(2, "La ciudad debe tener al menos 2 caracteres")
        .max(100, "La ciudad no puede exceder 100 caracteres")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranch {
    pub name: String,
    pub code: String,
    pub address: String,
    pub phone: String,
    pub email: Option<String>,
    pub city: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBranch {
    pub id: i64,
    pub name: Option<String>,
    pub code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchFilter {
    #[serde(flatten)]
    pub base: FilterBase,
    pub city: Option<String>,
    pub is_active: Option<bool>,
}

pub struct Branch;

impl EntitySchema for Branch {
    const NAME: &'static str = "branches";

    type Create = CreateBranch;
    type Update = UpdateBranch;
    type Filter = BranchFilter;

    fn validate_create(raw: &Value) -> Result<CreateBranch, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = CreateBranch {
            name: f.required("name", name()),
            code: f.required("code", code()),
            address: f.required("address", address()),
            phone: f.required("phone", primitives::phone),
            email: f.optional("email", primitives::email),
            city: f.required("city", city()),
            is_active: f.or_default("isActive", true, primitives::flag),
        };
        f.finish(input)
    }

    fn validate_update(raw: &Value) -> Result<UpdateBranch, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = UpdateBranch {
            id: f.required("id", primitives::id),
            name: f.optional("name", name()),
            code: f.optional("code", code()),
            address: f.optional("address", address()),
            phone: f.optional("phone", primitives::phone),
            email: f.optional("email", primitives::email),
            city: f.optional("city", city()),
            is_active: f.optional("isActive", primitives::flag),
        };
        f.finish(input)
    }

    fn validate_filter(raw: &Value) -> Result<BranchFilter, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = BranchFilter {
            base: FilterBase::read(&mut f, SORTABLE),
            city: f.lenient("city", primitives::search),
            is_active: f.lenient("isActive", primitives::flag_param),
        };
        f.finish(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_code(code: Value) -> Value {
        json!({
            "name": "Sucursal Norte",
            "code": code,
            "address": "Av. Insurgentes 1234",
            "phone": "5598765432",
            "city": "CDMX",
        })
    }

    #[test]
    fn test_code_pattern() {
        assert!(Branch::validate_create(&with_code(json!("AB1"))).is_ok());

        let lower = Branch::validate_create(&with_code(json!("ab1"))).unwrap_err();
        assert_eq!(lower.fields(), vec!["code"]);

        let symbol = Branch::validate_create(&with_code(json!("AB!"))).unwrap_err();
        assert_eq!(
            symbol.message_for("code"),
            Some("El código solo puede contener letras mayúsculas y números")
        );
    }

    #[test]
    fn test_code_length_checked_before_pattern() {
        let failure = Branch::validate_create(&with_code(json!("a"))).unwrap_err();
        assert_eq!(
            failure.message_for("code"),
            Some("El código debe tener al menos 3 caracteres")
        );

        let failure = Branch::validate_create(&with_code(json!("ABCDEFGHIJK"))).unwrap_err();
        assert_eq!(
            failure.message_for("code"),
            Some("El código no puede exceder 10 caracteres")
        );
    }

    #[test]
    fn test_code_type_failure_first() {
        let failure = Branch::validate_create(&with_code(json!(123))).unwrap_err();
        assert_eq!(failure.message_for("code"), Some("Se esperaba un texto"));
    }

    #[test]
    fn test_missing_city_is_the_only_failure() {
        let mut raw = with_code(json!("NTE01"));
        raw.as_object_mut().unwrap().remove("city");

        let failure = Branch::validate_create(&raw).unwrap_err();
        assert_eq!(failure.fields(), vec!["city"]);
        assert_eq!(failure.message_for("city"), Some("Campo requerido"));
    }

    #[test]
    fn test_independent_failures_collected() {
        let raw = json!({ "name": "N", "code": "ab", "address": "x", "phone": "1", "city": "C" });
        let failure = Branch::validate_create(&raw).unwrap_err();
        assert_eq!(failure.fields(), vec!["name", "code", "address", "phone", "city"]);
    }

    #[test]
    fn test_is_active_default_and_explicit() {
        let input = Branch::validate_create(&with_code(json!("NTE01"))).unwrap();
        assert!(input.is_active);

        let mut raw = with_code(json!("NTE01"));
        raw["isActive"] = json!(false);
        assert!(!Branch::validate_create(&raw).unwrap().is_active);
    }

    #[test]
    fn test_update_with_only_id() {
        let input = Branch::validate_update(&json!({ "id": "12" })).unwrap();
        assert_eq!(input.id, 12);
        assert_eq!(input.is_active, None);
    }

    #[test]
    fn test_filter_city() {
        let filter = Branch::validate_filter(&json!({ "city": " Monterrey ", "isActive": "true" }))
            .unwrap();
        assert_eq!(filter.city.as_deref(), Some("Monterrey"));
        assert_eq!(filter.is_active, Some(true));
    }
}
