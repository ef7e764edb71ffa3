//! In-memory store backends for single-process deployments and tests.

pub mod notifications;
pub mod registry;

pub use notifications::MemoryNotificationStore;
pub use registry::MemorySessionRegistry;
