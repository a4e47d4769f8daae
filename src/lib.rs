#![deny(missing_docs)]

//! Core library for the studentdb records service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// MongoDB connection lifecycle and student storage.
pub mod mongo;
/// Student schema, validation, and the in-memory store.
pub mod students;
