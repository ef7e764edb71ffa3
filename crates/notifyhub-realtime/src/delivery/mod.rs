//! Targeted delivery to user identities.

pub mod gate;

#[cfg(test)]
pub(crate) mod testing;

pub use gate::DeliveryGate;
