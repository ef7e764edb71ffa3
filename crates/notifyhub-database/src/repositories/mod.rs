//! PostgreSQL repository implementations.

pub mod connection_session;
pub mod notification;

pub use connection_session::PgSessionRegistry;
pub use notification::NotificationRepository;
