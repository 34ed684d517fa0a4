//! Infrastructure layer: configuration and storage adapters for the
//! authorization engine.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use store::{InMemoryAuthStore, PgAuthStore};
