// src/primitives.rs
//! Coercion primitives shared by every entity schema.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::VariantNames;
use validator::ValidateEmail;

use crate::validator::Rule;

lazy_static! {
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9\s\-()]+$").unwrap();
    static ref DIGITS_REGEX: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const LIMIT_WARN_THRESHOLD: u64 = 100;
pub const PHONE_MIN_LEN: usize = 10;

const MSG_ID: &str = "El ID debe ser un número entero positivo";
const MSG_DATE: &str = "Fecha inválida";
const MSG_PHONE_LEN: &str = "El teléfono debe tener al menos 10 caracteres";
const MSG_PHONE_FORMAT: &str = "Formato de teléfono inválido";
const MSG_EMAIL: &str = "Email inválido";
const MSG_TEXT: &str = "Se esperaba un texto";
const MSG_BOOL: &str = "Se esperaba un valor booleano";
const MSG_NUMBER: &str = "Se esperaba un número";
const MSG_INTEGER: &str = "Se esperaba un número entero";

// ==================== IDENTIFIER ====================

pub fn id(value: &Value) -> Result<i64, String> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) if DIGITS_REGEX.is_match(s) => s.parse::<i64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n > 0 => Ok(n),
        _ => Err(MSG_ID.to_string()),
    }
}

// ==================== PAGINATION ====================

fn positive_int(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .filter(|n| *n > 0)
}

pub fn page(value: Option<&Value>) -> u64 {
    positive_int(value).unwrap_or(DEFAULT_PAGE)
}

/// No upper bound is enforced; unusually large limits are only logged.
pub fn limit(value: Option<&Value>) -> u64 {
    let limit = positive_int(value).unwrap_or(DEFAULT_LIMIT);
    if limit > LIMIT_WARN_THRESHOLD {
        log::warn!("Pagination limit {} exceeds {}", limit, LIMIT_WARN_THRESHOLD);
    }
    limit
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

pub fn sort_order(value: Option<&Value>) -> SortOrder {
    match value.and_then(Value::as_str) {
        Some("asc") => SortOrder::Asc,
        _ => SortOrder::Desc,
    }
}

/// Unknown columns fall back to `default` instead of failing.
pub fn sort_by(
    allowed: &'static [&'static str],
    default: &'static str,
) -> impl Fn(Option<&Value>) -> String {
    move |value| {
        let requested = value.and_then(Value::as_str).map(str::trim);
        match requested {
            Some(field) if allowed.contains(&field) => field.to_string(),
            _ => default.to_string(),
        }
    }
}

pub fn search(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ==================== DATE ====================

pub fn date(value: &Value) -> Result<DateTime<Utc>, String> {
    let raw = value.as_str().ok_or_else(|| MSG_DATE.to_string())?;

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| MSG_DATE.to_string())
}

// ==================== PHONE / EMAIL ====================

pub fn phone(value: &Value) -> Result<String, String> {
    let raw = value.as_str().ok_or_else(|| MSG_TEXT.to_string())?;

    if raw.chars().count() < PHONE_MIN_LEN {
        return Err(MSG_PHONE_LEN.to_string());
    }
    if !PHONE_REGEX.is_match(raw) {
        return Err(MSG_PHONE_FORMAT.to_string());
    }

    Ok(raw.to_string())
}

/// `""` is accepted and kept as the "no email" sentinel.
pub fn email(value: &Value) -> Result<String, String> {
    let raw = value.as_str().ok_or_else(|| MSG_TEXT.to_string())?.to_string();

    if raw.is_empty() || raw.validate_email() {
        Ok(raw)
    } else {
        Err(MSG_EMAIL.to_string())
    }
}

// ==================== SCALARS ====================

pub fn flag(value: &Value) -> Result<bool, String> {
    value.as_bool().ok_or_else(|| MSG_BOOL.to_string())
}

/// Query-string booleans; anything unrecognised is treated as absent.
pub fn flag_param(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn number(
    min: f64,
    max: Option<f64>,
    range_message: &'static str,
) -> impl Fn(&Value) -> Result<f64, String> {
    move |value| {
        let n = value.as_f64().ok_or_else(|| MSG_NUMBER.to_string())?;
        if n < min || max.is_some_and(|max| n > max) {
            return Err(range_message.to_string());
        }
        Ok(n)
    }
}

pub fn integer(min: i64, range_message: &'static str) -> impl Fn(&Value) -> Result<i64, String> {
    move |value| {
        let n = value.as_i64().ok_or_else(|| MSG_INTEGER.to_string())?;
        if n < min {
            return Err(range_message.to_string());
        }
        Ok(n)
    }
}

pub fn one_of<E>(value: &Value) -> Result<E, String>
where
    E: FromStr + VariantNames,
{
    value
        .as_str()
        .and_then(|s| E::from_str(s).ok())
        .ok_or_else(|| format!("Valor inválido. Opciones: {}", E::VARIANTS.join(", ")))
}

// ==================== TEXT ====================

#[derive(Debug, Clone, Default)]
pub struct Text {
    min: Option<(usize, &'static str)>,
    max: Option<(usize, &'static str)>,
    pattern: Option<(&'static Regex, &'static str)>,
}

impl Text {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, len: usize, message: &'static str) -> Self {
        self.min = Some((len, message));
        self
    }

    pub fn max(mut self, len: usize, message: &'static str) -> Self {
        self.max = Some((len, message));
        self
    }

    pub fn pattern(mut self, regex: &'static Regex, message: &'static str) -> Self {
        self.pattern = Some((regex, message));
        self
    }
}

impl Rule for Text {
    type Output = String;

    fn apply(&self, value: &Value) -> Result<String, String> {
        let raw = value.as_str().ok_or_else(|| MSG_TEXT.to_string())?;
        let len = raw.chars().count();

        if let Some((min, message)) = self.min {
            if len < min {
                return Err(message.to_string());
            }
        }
        if let Some((max, message)) = self.max {
            if len > max {
                return Err(message.to_string());
            }
        }
        if let Some((regex, message)) = self.pattern {
            if !regex.is_match(raw) {
                return Err(message.to_string());
            }
        }

        Ok(raw.to_string())
    }
}

// ==================== ТЕСТЫ ====================
