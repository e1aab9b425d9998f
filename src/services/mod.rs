//! Business logic services.
//!
//! Services sit between the HTTP handlers and the banking backend.

pub mod gateway;
