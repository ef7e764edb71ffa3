//! Presence tracking: which user identity owns which connection.

pub mod tracker;

pub use tracker::{BindOutcome, PresenceTracker};
