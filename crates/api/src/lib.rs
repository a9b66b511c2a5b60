//! HTTP API layer for the Quorum backend.
//!
//! Axum 0.8 router over the core services: poll management, the answer
//! ledger, comment threads, the opposing-thread selector, comment votes,
//! and fingerprint-based identification.

pub mod endpoints;
pub mod middleware;
pub mod response;

pub use endpoints::router;
