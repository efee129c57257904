// src/schemas/mod.rs
//! Entity schemas: create, update and filter contracts per entity.
//!
//! Every schema follows the same pattern:
//! - `validate_create` applies field rules and defaults for absent fields
//! - `validate_update` applies the same rules with every field optional,
//!   no defaults, and a mandatory positive `id`
//! - `validate_filter` coerces query-string input and never fails on
//!   pagination or sorting garbage

use serde::Serialize;
use serde_json::Value;

use crate::primitives::{self, SortOrder};
use crate::validator::{Fields, ValidationFailure};

pub mod appointment;
pub mod branch;
pub mod client;
pub mod mechanic;
pub mod opportunity;
pub mod service;
pub mod user;
pub mod work_status;

pub use appointment::Appointment;
pub use branch::Branch;
pub use client::Client;
pub use mechanic::Mechanic;
pub use opportunity::Opportunity;
pub use service::Service;
pub use user::User;
pub use work_status::WorkStatus;

pub const DEFAULT_SORT_FIELD: &str = "createdAt";

pub trait EntitySchema {
    /// Route segment, e.g. `appointments`.
    const NAME: &'static str;

    type Create: Serialize;
    type Update: Serialize;
    type Filter: Serialize;

    fn validate_create(raw: &Value) -> Result<Self::Create, ValidationFailure>;
    fn validate_update(raw: &Value) -> Result<Self::Update, ValidationFailure>;
    fn validate_filter(raw: &Value) -> Result<Self::Filter, ValidationFailure>;
}

// ==================== FILTER BASE ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterBase {
    pub page: u64,
    pub limit: u64,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub search: Option<String>,
}

impl FilterBase {
    pub fn read(f: &mut Fields<'_>, sortable: &'static [&'static str]) -> Self {
        Self {
            page: f.lenient("page", primitives::page),
            limit: f.lenient("limit", primitives::limit),
            sort_by: f.lenient("sortBy", primitives::sort_by(sortable, DEFAULT_SORT_FIELD)),
            sort_order: f.lenient("sortOrder", primitives::sort_order),
            search: f.lenient("search", primitives::search),
        }
    }
}
