// src/lib.rs
//! Input validation and error normalization for the repair shop API.

pub mod config;
pub mod error;
pub mod handlers;
pub mod monitoring;
pub mod primitives;
pub mod schemas;
pub mod validator;
