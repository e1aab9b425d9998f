//! HTTP request handlers (route handlers).
//!
//! Each operation has a pair of handlers:
//! 1. GET renders the empty form
//! 2. POST validates the submitted form, calls the backend through the gateway,
//!    and renders the same form with the outcome

/// Account pages
pub mod accounts;
/// Customer pages
pub mod customers;
/// Service health endpoint
pub mod health;
/// Services menu
pub mod services;
