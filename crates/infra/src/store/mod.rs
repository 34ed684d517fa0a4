//! Storage adapters implementing the engine's read-only store traits.

mod in_memory;
mod postgres;

pub use in_memory::InMemoryAuthStore;
pub use postgres::{PgAuthStore, connect};
