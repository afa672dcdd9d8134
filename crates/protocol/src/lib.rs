//! # mp-protocol
//!
//! Shared message and configuration models for msgproc.
//!
//! This crate defines the data structures that cross the boundary between a
//! process unit and its host:
//! - The structured message container carried by every request and reply
//! - Wire field names that make up the envelope contract
//! - Forward-request and reply envelopes
//! - Typed configuration for the built-in processes
//! - Test-suite files consumed by the suite runner
//!
//! ## Modules
//!
//! - [`message`]: `Message` and its read-only `SealedMessage` view
//! - [`fields`]: Wire field names, preserved verbatim
//! - [`envelope`]: Forward-request envelope builder and reply envelope reader
//! - [`config_models`]: Process definitions and per-process configuration
//! - [`suite_models`]: Suite files describing processes, inputs and expected replies
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde and serde_json
//! - Independent compilation: No dependencies on other msgproc crates

pub mod config_models;
pub mod envelope;
pub mod fields;
pub mod message;
pub mod suite_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use envelope::*;
pub use message::*;
pub use suite_models::*;
