//! Topic subscriptions for the in-process broker.

pub mod registry;
pub mod subscription;

pub use registry::TopicRegistry;
pub use subscription::SubscriptionTracker;
