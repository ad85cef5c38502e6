//! Shared foundation for the Gatehouse workforce client.
//!
//! ## Module Organization
//!
//! - `config`: Settings loading from environment and `config.toml`
//! - `constants`: API route constants shared across crates
//! - `error`: The error taxonomy every other crate builds on
//! - `types`: Roles, organizational ids, and the user record

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use types::{DepartmentId, DivisionId, Role, User};
