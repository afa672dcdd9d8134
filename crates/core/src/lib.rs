//! # mp-core
//!
//! Process state machine and built-in processes for msgproc.
//!
//! This crate provides:
//! - The `Status` flag machine and the `ProcessUnit` contract
//! - The `RequestProcess` orchestrator and its handler hooks
//! - Built-in processes: echo, pass-through forwarding, expression-driven
//! - A process registry and factory
//! - A driver loop and a suite runner
//!
//! ## Modules
//!
//! - [`state`]: Status flags and their invariants
//! - [`processes`]: The unit contract, orchestrator, built-ins, registry and factory
//! - [`expression`]: Expressions used by configured processes
//! - [`engine`]: Driver loop and suite runner
//! - [`config`]: Suite file loading
//! - [`error`]: Process errors

pub mod config;
pub mod engine;
pub mod error;
pub mod expression;
pub mod processes;
pub mod state;

pub use error::{ProcessError, ProcessResult};
