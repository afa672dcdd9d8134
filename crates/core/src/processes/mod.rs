//! Process units and the machinery that builds them.
//!
//! [`ProcessUnit`] is the contract a driver loop sees. Most units are a
//! [`RequestProcess`] around a [`RequestHandler`]; the forwarding unit
//! implements the contract directly because it multiplexes many requests.

pub mod adapters;
pub mod base;
pub mod factory;
pub mod registry;
pub mod request;

pub use adapters::{ConfigProcess, Echo, PassThrough};
pub use base::{read_config, ProcessUnit};
pub use factory::ProcessFactory;
pub use registry::ProcessRegistry;
pub use request::{RequestContext, RequestHandler, RequestProcess};
