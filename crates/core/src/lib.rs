//! `exhibits-core`: shared domain primitives.
//!
//! This crate contains **pure domain** types (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod record;

pub use error::DomainError;
pub use id::{PermissionId, RecordId, RoleId, UserId};
pub use record::RecordType;
