//! Shared helpers for the integration tests.
//!
//! - Fixtures: configured units, request and reply envelopes, suite files
//! - Assertions: status invariants and envelope inspection

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
