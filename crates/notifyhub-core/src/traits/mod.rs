//! Core traits defined in `notifyhub-core` and implemented by other crates.

pub mod publisher;

pub use publisher::MessagePublisher;
