//! Process factory: builds initialised units from a definition.

use crate::error::{ProcessError, ProcessResult};
use crate::processes::base::ProcessUnit;
use crate::processes::registry::{Constructor, ProcessRegistry};
use mp_protocol::config_models::ProcessDefinition;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{info, warn};

/// Ids handed out to units, shared by every factory in the process.
static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// Creates units for one process definition.
///
/// The implementation is resolved when the factory is created, so a bad
/// identifier is reported before any request is handled.
#[derive(Debug, Clone)]
pub struct ProcessFactory {
    definition: ProcessDefinition,
    constructor: Constructor,
    ids: &'static AtomicU32,
}

impl ProcessFactory {
    /// Resolve the definition's class against the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::UnknownClass`] if the class is not registered.
    pub fn new(registry: &ProcessRegistry, definition: ProcessDefinition) -> ProcessResult<Self> {
        let constructor = registry.resolve(&definition.class)?;
        Ok(Self {
            definition,
            constructor,
            ids: &NEXT_ID,
        })
    }

    pub fn definition(&self) -> &ProcessDefinition {
        &self.definition
    }

    /// Construct a unit, initialise it and assign it the next id.
    ///
    /// A unit that fails to initialise never takes an id.
    ///
    /// # Errors
    ///
    /// Returns whatever the unit's `initialise` reports, typically
    /// [`ProcessError::InvalidConfig`].
    pub fn instance(&self) -> ProcessResult<Box<dyn ProcessUnit>> {
        let mut unit = (self.constructor)();
        unit.initialise(self.definition.config.as_ref())
            .map_err(|e: ProcessError| {
                warn!(class = %self.definition.class, error = %e, "initialise failed");
                e
            })?;
        let id = self.ids.fetch_add(1, Ordering::Relaxed);
        unit.set_id(id);
        info!(unit = id, class = %self.definition.class, "process created");
        Ok(unit)
    }
}
