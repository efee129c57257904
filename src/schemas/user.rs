// src/schemas/user.rs

use serde::Serialize;
use serde_json::Value;

use super::{EntitySchema, FilterBase};
use crate::primitives::{self, Text};
use crate::validator::{Fields, ValidationFailure};

const SORTABLE: &[&str] = &["createdAt", "name", "roleId"];

fn name() -> Text {
    Text::new()
        .min(2, "El nombre debe tener al menos 2 caracteres")
        .max(100, "El nombre no puede exceder 100 caracteres")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub role_id: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role_id: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    #[serde(flatten)]
    pub base: FilterBase,
    pub role_id: Option<i64>,
    pub is_active: Option<bool>,
}

pub struct User;

impl EntitySchema for User {
    const NAME: &'static str = "users";

    type Create = CreateUser;
    type Update = UpdateUser;
    type Filter = UserFilter;

    fn validate_create(raw: &Value) -> Result<CreateUser, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = CreateUser {
            name: f.required("name", name()),
            email: f.optional("email", primitives::email),
            phone: f.required("phone", primitives::phone),
            role_id: f.required("roleId", primitives::id),
            is_active: f.or_default("isActive", true, primitives::flag),
        };
        f.finish(input)
    }

    fn validate_update(raw: &Value) -> Result<UpdateUser, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = UpdateUser {
            id: f.required("id", primitives::id),
            name: f.optional("name", name()),
            email: f.optional("email", primitives::email),
            phone: f.optional("phone", primitives::phone),
            role_id: f.optional("roleId", primitives::id),
            is_active: f.optional("isActive", primitives::flag),
        };
        f.finish(input)
    }

    fn validate_filter(raw: &Value) -> Result<UserFilter, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = UserFilter {
            base: FilterBase::read(&mut f, SORTABLE),
            role_id: f.optional("roleId", primitives::id),
            is_active: f.lenient("isActive", primitives::flag_param),
        };
        f.finish(input)
    }
}
