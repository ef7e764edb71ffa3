//! # notifyhub-realtime
//!
//! Real-time engine for NotifyHub. Provides:
//!
//! - Presence tracking: binding ephemeral connections to user identities
//! - The delivery gate: publish to a user's topic only while they are reachable
//! - The event bridge: transport events in, supersession policy out
//! - An in-process topic broker acting as the transport's publish capability
//! - The JSON WebSocket frame protocol and application message routing

pub mod bridge;
pub mod channel;
pub mod connection;
pub mod delivery;
pub mod message;
pub mod presence;
pub mod server;

pub use bridge::event_bridge::EventBridge;
pub use bridge::topic_broker::TopicBroker;
pub use delivery::gate::DeliveryGate;
pub use presence::tracker::{BindOutcome, PresenceTracker};
pub use server::RealtimeEngine;
