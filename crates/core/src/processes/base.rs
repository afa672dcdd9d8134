//! The process unit contract.

use crate::error::{ProcessError, ProcessResult};
use crate::state::Status;
use mp_protocol::message::Message;
use serde::de::DeserializeOwned;

/// A message-handling unit driven by an external loop.
///
/// The driver inspects [`ProcessUnit::status`] and calls exactly one
/// operation per iteration:
///
/// | flag             | call               |
/// |------------------|--------------------|
/// | `acceptRequests` | `handle_request`   |
/// | `requestPending` | `get_requests`     |
/// | `waitingReply`   | `handle_reply`     |
/// | `waitingProcess` | `process`          |
/// | `replyReady`     | `get_reply`        |
///
/// Calling an operation while its flag is false fails with
/// [`ProcessError::State`] and leaves the status untouched.
///
/// A unit is used by one driver at a time and never re-entered.
pub trait ProcessUnit: Send {
    /// The id assigned by the factory.
    fn id(&self) -> u32;

    /// Assign the unit's id; called once by the factory.
    fn set_id(&mut self, id: u32);

    fn status(&self) -> &Status;

    /// Apply configuration and become active, accepting requests.
    fn initialise(&mut self, config: Option<&Message>) -> ProcessResult<()>;

    /// Accept a new inbound request.
    fn handle_request(&mut self, request: Message) -> ProcessResult<()>;

    /// Collect forward requests as one envelope; `None` when nothing was ready.
    fn get_requests(&mut self) -> ProcessResult<Option<Message>>;

    /// Deliver the reply to one forward request.
    fn handle_reply(&mut self, reply: Message) -> ProcessResult<()>;

    /// Perform the pending processing step.
    fn process(&mut self) -> ProcessResult<()>;

    /// Take the reply that is ready for the caller.
    fn get_reply(&mut self) -> ProcessResult<Message>;

    /// Shut the unit down. Outstanding forward requests are abandoned.
    fn close(&mut self) -> ProcessResult<()>;

    /// Snapshot of the data the unit is working on, for diagnostics.
    fn message_data(&self) -> Message;
}

/// Read a configuration block into a typed configuration.
///
/// A missing block yields the type's default.
///
/// # Errors
///
/// Returns [`ProcessError::InvalidConfig`] if the block does not match `T`.
pub fn read_config<T>(config: Option<&Message>) -> ProcessResult<T>
where
    T: DeserializeOwned + Default,
{
    match config {
        None => Ok(T::default()),
        Some(block) => serde_json::from_value(block.clone().into_value())
            .map_err(|e| ProcessError::InvalidConfig(e.to_string())),
    }
}
