//! Built-in process implementations.

pub mod config_process;
pub mod echo;
pub mod pass_through;

pub use config_process::{ConfigDrivenProcess, ConfigProcess};
pub use echo::{Echo, EchoProcess};
pub use pass_through::PassThrough;
