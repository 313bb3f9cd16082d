//! Request handler module
//!
//! Routing dispatch plus the individual endpoint handlers.

mod contact;
mod diagnostic;
mod general;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
