//! Transport integration: the topic broker and the event bridge.

pub mod event_bridge;
pub mod topic_broker;

pub use event_bridge::EventBridge;
pub use topic_broker::TopicBroker;
