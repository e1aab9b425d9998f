//! Data models for the customer services pages.
//!
//! This module contains the submitted forms, the backend's commarea envelopes
//! and the outcome shown back to the user.

/// Account forms and envelopes
pub mod account;
/// Envelope trait and commarea helpers
pub mod commarea;
/// Customer forms and envelopes
pub mod customer;
/// Gateway results
pub mod outcome;
/// Form field validation
pub mod validation;
