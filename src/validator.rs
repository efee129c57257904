// src/validator.rs - Centralized validation module
//! Field-by-field validation of raw JSON records.
//!
//! A [`Fields`] cursor walks one incoming object, applies a [`Rule`] to each
//! declared field and keeps every failure. Inside one field the rule chain
//! stops at the first problem; across fields nothing short-circuits.

use serde::Serialize;
use serde_json::{Map, Value};

pub const ROOT_FIELD: &str = "_root";

pub const MSG_REQUIRED: &str = "Campo requerido";
pub const MSG_NOT_OBJECT: &str = "Se esperaba un objeto JSON";

// ==================== VALIDATION RESULT ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn merge(&mut self, other: ValidationFailure) {
        self.errors.extend(other.errors);
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", message)
    }
}

impl std::error::Error for ValidationFailure {}

// ==================== RULES ====================

/// A single field's derivation chain: type check, then constraints.
pub trait Rule {
    type Output;

    fn apply(&self, value: &Value) -> Result<Self::Output, String>;
}

impl<F, T> Rule for F
where
    F: Fn(&Value) -> Result<T, String>,
{
    type Output = T;

    fn apply(&self, value: &Value) -> Result<T, String> {
        self(value)
    }
}

// ==================== FIELD CURSOR ====================

pub struct Fields<'a> {
    raw: &'a Map<String, Value>,
    failure: ValidationFailure,
}

impl<'a> Fields<'a> {
    pub fn new(raw: &'a Value) -> Result<Self, ValidationFailure> {
        match raw.as_object() {
            Some(raw) => Ok(Self {
                raw,
                failure: ValidationFailure::new(),
            }),
            None => {
                let mut failure = ValidationFailure::new();
                failure.add_error(ROOT_FIELD, MSG_NOT_OBJECT);
                Err(failure)
            }
        }
    }

    /// `null` counts as absent.
    fn present(&self, name: &str) -> Option<&'a Value> {
        match self.raw.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn run<R: Rule>(&mut self, name: &str, rule: &R, value: &Value) -> Option<R::Output> {
        match rule.apply(value) {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                self.failure.add_error(name, message);
                None
            }
        }
    }

    /// Failed fields yield a placeholder; `finish` never lets it escape.
    pub fn required<R>(&mut self, name: &str, rule: R) -> R::Output
    where
        R: Rule,
        R::Output: Default,
    {
        match self.present(name) {
            Some(value) => self.run(name, &rule, value).unwrap_or_default(),
            None => {
                self.failure.add_error(name, MSG_REQUIRED);
                R::Output::default()
            }
        }
    }

    pub fn optional<R: Rule>(&mut self, name: &str, rule: R) -> Option<R::Output> {
        let value = self.present(name)?;
        self.run(name, &rule, value)
    }

    /// The default applies only when the field is missing, never when it
    /// holds an explicit falsy value.
    pub fn or_default<R>(&mut self, name: &str, default: R::Output, rule: R) -> R::Output
    where
        R: Rule,
        R::Output: Default,
    {
        match self.present(name) {
            Some(value) => self.run(name, &rule, value).unwrap_or_default(),
            None => default,
        }
    }

    /// Coercions that never fail, such as pagination.
    pub fn lenient<T>(&mut self, name: &str, parse: impl Fn(Option<&Value>) -> T) -> T {
        parse(self.present(name))
    }

    pub fn finish<T>(self, value: T) -> Result<T, ValidationFailure> {
        if self.failure.is_valid() {
            Ok(value)
        } else {
            Err(self.failure)
        }
    }
}

// ==================== ТЕСТЫ ====================
