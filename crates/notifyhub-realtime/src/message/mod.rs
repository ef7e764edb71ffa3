//! WebSocket frame protocol and application message handling.

pub mod router;
pub mod types;

pub use router::AppMessageRouter;
pub use types::{ClientFrame, ServerFrame};
