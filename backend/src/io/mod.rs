//! # IO Module
//!
//! REST adapter between clients and the domain layer. Translates HTTP
//! requests into domain operations, maps the domain error taxonomy onto
//! status codes, and converts domain models to the wire DTOs in `shared`.
//! It holds no state beyond the injected services.

pub mod rest;

pub use rest::{router, AppState};
