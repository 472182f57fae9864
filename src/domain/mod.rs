//! Domain Layer
//!
//! Region state, wire payloads, value objects, the ports the resolver
//! depends on, and the pure retry policy.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
