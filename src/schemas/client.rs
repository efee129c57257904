// src/schemas/client.rs

use serde::Serialize;
use serde_json::Value;

use super::{EntitySchema, FilterBase};
use crate::primitives::{self, Text};
use crate::validator::{Fields, ValidationFailure};

const SORTABLE: &[&str] = &["createdAt", "name"];

fn name() -> Text {
    Text::new()
        .min(2, "El nombre debe tener al menos 2 caracteres")
        .max(100, "El nombre no puede exceder 100 caracteres")
}

fn address() -> Text {
    Text::new().max(255, "La dirección no puede exceder 255 caracteres")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClient {
    pub name: String,
    pub whatsapp: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClient {
    pub id: i64,
    pub name: Option<String>,
    pub whatsapp: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientFilter {
    #[serde(flatten)]
    pub base: FilterBase,
}

pub struct Client;

impl EntitySchema for Client {
    const NAME: &'static str = "clients";

    type Create = CreateClient;
    type Update = UpdateClient;
    type Filter = ClientFilter;

    fn validate_create(raw: &Value) -> Result<CreateClient, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = CreateClient {
            name: f.required("name", name()),
            whatsapp: f.required("whatsapp", primitives::phone),
            phone: f.optional("phone", primitives::phone),
            email: f.optional("email", primitives::email),
            address: f.optional("address", address()),
        };
        f.finish(input)
    }

    fn validate_update(raw: &Value) -> Result<UpdateClient, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = UpdateClient {
            id: f.required("id", primitives::id),
            name: f.optional("name", name()),
            whatsapp: f.optional("whatsapp", primitives::phone),
            phone: f.optional("phone", primitives::phone),
            email: f.optional("email", primitives::email),
            address: f.optional("address", address()),
        };
        f.finish(input)
    }

    fn validate_filter(raw: &Value) -> Result<ClientFilter, ValidationFailure> {
        let mut f = Fields::new(raw)?;
        let input = ClientFilter {
            base: FilterBase::read(&mut f, SORTABLE),
        };
        f.finish(input)
    }
}
