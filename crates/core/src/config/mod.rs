//! Suite file loading.
//!
//! Suites describe process test cases; see
//! [`TestSuite`](mp_protocol::suite_models::TestSuite) for the format.

pub mod error;
pub mod loader;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_suite, parse_suite};
