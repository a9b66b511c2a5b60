//! Core business logic for the Quorum backend.

pub mod services;

pub use services::*;
