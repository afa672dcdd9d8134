//! State management for process units.
//!
//! This module provides:
//! - The `Status` flag set and its invariants
//! - `StatusFlag`, naming each flag in state-violation errors

pub mod status;

pub use status::{Status, StatusFlag};
