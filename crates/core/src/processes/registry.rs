//! Registry of process implementations.

use crate::error::{ProcessError, ProcessResult};
use crate::processes::adapters::{ConfigProcess, Echo, PassThrough};
use crate::processes::base::ProcessUnit;
use std::collections::HashMap;

/// Builds an uninitialised unit.
pub type Constructor = fn() -> Box<dyn ProcessUnit>;

/// Identifier of the echo process.
pub const ECHO: &str = "internal:echo";

/// Identifier of the forwarding process.
pub const PASS_THROUGH: &str = "internal:passThrough";

/// Identifier of the expression-driven process.
pub const CONFIG: &str = "internal:config";

/// Maps process identifiers to constructors.
///
/// # Example
///
/// ```
/// use mp_core::processes::{registry, ProcessRegistry};
///
/// let registry = ProcessRegistry::default();
/// let unit = registry.resolve(registry::ECHO).unwrap()();
/// assert!(!unit.status().active());
/// ```
#[derive(Debug, Clone)]
pub struct ProcessRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ProcessRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in processes.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ECHO, || Box::new(Echo::process()));
        registry.register(PASS_THROUGH, || Box::new(PassThrough::new()));
        registry.register(CONFIG, || Box::new(ConfigProcess::process()));
        registry
    }

    /// Register a constructor, replacing any previous one under the same identifier.
    pub fn register(&mut self, class: impl Into<String>, constructor: Constructor) {
        self.constructors.insert(class.into(), constructor);
    }

    /// Look up the constructor for an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::UnknownClass`] if nothing is registered under `class`.
    pub fn resolve(&self, class: &str) -> ProcessResult<Constructor> {
        self.constructors
            .get(class)
            .copied()
            .ok_or_else(|| ProcessError::UnknownClass(class.to_string()))
    }

    /// Registered identifiers, sorted.
    pub fn classes(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        classes.sort_unstable();
        classes
    }
}

impl Default for ProcessRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
