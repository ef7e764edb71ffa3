//! Connection presence entities.

pub mod model;
pub mod state;

pub use model::{ConnectionRecord, PLACEHOLDER_PREFIX, is_placeholder, placeholder_identity};
pub use state::ConnectionState;
