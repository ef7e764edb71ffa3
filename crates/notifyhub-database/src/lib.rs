//! # notifyhub-database
//!
//! Store abstractions for the presence registry and notification records,
//! with a PostgreSQL implementation (connection pool, migrations,
//! repositories) and an in-memory implementation sharing the same
//! semantics.

pub mod memory;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use memory::{MemoryNotificationStore, MemorySessionRegistry};
pub use postgres::DatabasePool;
pub use repositories::{NotificationRepository, PgSessionRegistry};
pub use store::{NotificationStore, SessionRegistry};
