//! # notifyhub-core
//!
//! Core crate for NotifyHub. Contains configuration schemas, the
//! publish capability trait consumed by the delivery gate, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other NotifyHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
