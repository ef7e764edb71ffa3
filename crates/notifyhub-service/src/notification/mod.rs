//! Notification persistence, delivery and test messages.

pub mod payload;
pub mod service;
pub mod test_message;
