//! # notifyhub-service
//!
//! Business logic for NotifyHub. Services orchestrate the notification
//! store and the real-time engine; they are the callers of the delivery
//! gate.

pub mod notification;

pub use notification::payload::NotificationResponse;
pub use notification::service::NotificationService;
pub use notification::test_message::{TestMessageResult, TestMessageService, TestMessageStatus};
