//! Request-driven process orchestration.
//!
//! [`RequestProcess`] implements the [`ProcessUnit`] contract once, sequencing
//! the status transitions, and delegates every decision to a
//! [`RequestHandler`]. Handlers only deal with data; they never touch the
//! status.
//!
//! Cycle of one request:
//!
//! ```text
//! handle_request ─┬─ forward? ─> get_requests ─> handle_reply* ─┐
//!                 └──────────────────────────────────────────────┴─> process ─┬─ forward? ─> get_requests ...
//!                                                                             └─> get_reply ─┬─ further work ─> process ...
//!                                                                                            └─> accepting (close=true)
//! ```

use crate::error::{ProcessError, ProcessResult};
use crate::processes::base::ProcessUnit;
use crate::state::{Status, StatusFlag};
use mp_protocol::envelope::ForwardEnvelope;
use mp_protocol::fields;
use mp_protocol::message::{Message, SealedMessage};
use tracing::{debug, info, warn};

/// What a handler may see while building forward requests.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Id of the unit issuing the requests; becomes the envelope's `sourceRef`.
    pub unit_id: u32,

    /// The inbound request being served.
    pub request: &'a SealedMessage,
}

/// Decision hooks for a [`RequestProcess`].
///
/// The hooks taking `&mut self` may change handler state and must leave it
/// untouched when they fail. The queries that follow them take `&self`, so a
/// call either commits completely or not at all and the driver can retry it.
pub trait RequestHandler: Send {
    /// Apply configuration. Called once, before the unit becomes active.
    fn on_initialise(&mut self, config: Option<&Message>) -> ProcessResult<()>;

    /// Validate and admit a new request.
    ///
    /// Returning an error rejects the request and leaves the unit accepting.
    fn on_new_request(&mut self, request: &SealedMessage) -> ProcessResult<()>;

    /// Whether forward requests must be issued next.
    ///
    /// Asked after `on_new_request` and after every `on_process`; reports the
    /// decision those hooks reached.
    fn has_forward_requests(&self) -> bool;

    /// Build the forward requests; `None` or an empty envelope means nothing
    /// is ready yet and the unit goes back to processing.
    fn build_requests(&mut self, context: RequestContext<'_>)
        -> ProcessResult<Option<ForwardEnvelope>>;

    /// Take in one forward reply; return true once every reply of the cycle
    /// has arrived.
    fn on_reply(&mut self, reply: &Message) -> ProcessResult<bool>;

    /// The main work step.
    fn on_process(&mut self) -> ProcessResult<()>;

    /// Whether work remains after the reply being built.
    fn has_further_work(&self) -> ProcessResult<bool>;

    /// Build the outbound reply.
    fn build_reply(&self) -> ProcessResult<Message>;

    fn on_close(&mut self) -> ProcessResult<()> {
        Ok(())
    }

    /// The handler's current message view.
    fn message_data(&self) -> Message;
}

/// A process unit whose behaviour is supplied by a [`RequestHandler`].
#[derive(Debug)]
pub struct RequestProcess<H> {
    id: u32,
    status: Status,
    request: SealedMessage,
    handler: H,
}

impl<H: RequestHandler> RequestProcess<H> {
    pub fn new(handler: H) -> Self {
        Self {
            id: 0,
            status: Status::new(),
            request: SealedMessage::default(),
            handler,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Check the status reached by `operation`, restoring `before` if more
    /// than one work flag ended up raised.
    fn transitioned(&mut self, before: Status, operation: &'static str) -> ProcessResult<()> {
        debug!(unit = self.id, status = %self.status, "{operation}");
        if let Err(e) = self.status.ensure_exclusive() {
            self.status = before;
            return Err(hook_failed(self.id, operation, e));
        }
        Ok(())
    }
}

fn hook_failed(unit: u32, operation: &'static str, error: ProcessError) -> ProcessError {
    warn!(unit, error = %error, "{operation} failed");
    error
}

impl<H: RequestHandler> ProcessUnit for RequestProcess<H> {
    fn id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn initialise(&mut self, config: Option<&Message>) -> ProcessResult<()> {
        if self.status.active() || self.status.closed() {
            return Err(ProcessError::Lifecycle {
                status: self.status,
            });
        }
        self.handler
            .on_initialise(config)
            .map_err(|e| hook_failed(self.id, "initialise", e))?;
        self.status.set_active()?;
        self.status.set_accept_requests(true);
        info!(unit = self.id, "process initialised");
        Ok(())
    }

    fn handle_request(&mut self, request: Message) -> ProcessResult<()> {
        self.status
            .require(StatusFlag::AcceptRequests, "handle request")?;
        let before = self.status;
        let request = request.seal();
        self.handler
            .on_new_request(&request)
            .map_err(|e| hook_failed(self.id, "handle request", e))?;
        let forward = self.handler.has_forward_requests();

        self.request = request;
        self.status.set_accept_requests(false);
        if forward {
            self.status.set_request_pending(true);
        } else {
            self.status.set_waiting_process(true);
        }
        self.transitioned(before, "handle request")
    }

    fn get_requests(&mut self) -> ProcessResult<Option<Message>> {
        self.status
            .require(StatusFlag::RequestPending, "get requests")?;
        let before = self.status;
        let context = RequestContext {
            unit_id: self.id,
            request: &self.request,
        };
        let envelope = self
            .handler
            .build_requests(context)
            .map_err(|e| hook_failed(self.id, "get requests", e))?;

        self.status.set_request_pending(false);
        let requests = match envelope.filter(|e| !e.is_empty()) {
            Some(envelope) => {
                self.status.set_reply_ready(false);
                self.status.set_waiting_reply(true);
                Some(envelope.into_message())
            }
            None => {
                self.status.set_waiting_process(true);
                None
            }
        };
        self.transitioned(before, "get requests")?;
        Ok(requests)
    }

    fn handle_reply(&mut self, reply: Message) -> ProcessResult<()> {
        self.status
            .require(StatusFlag::WaitingReply, "handle reply")?;
        let before = self.status;
        let complete = self
            .handler
            .on_reply(&reply)
            .map_err(|e| hook_failed(self.id, "handle reply", e))?;
        if complete {
            self.status.set_waiting_reply(false);
            self.status.set_waiting_process(true);
        }
        self.transitioned(before, "handle reply")
    }

    fn process(&mut self) -> ProcessResult<()> {
        self.status.require(StatusFlag::WaitingProcess, "process")?;
        let before = self.status;
        self.handler
            .on_process()
            .map_err(|e| hook_failed(self.id, "process", e))?;
        let forward = self.handler.has_forward_requests();

        self.status.set_waiting_process(false);
        if forward {
            self.status.set_request_pending(true);
        } else {
            self.status.set_reply_ready(true);
        }
        self.transitioned(before, "process")
    }

    fn get_reply(&mut self) -> ProcessResult<Message> {
        self.status.require(StatusFlag::ReplyReady, "get reply")?;
        let before = self.status;
        let mut reply = self
            .handler
            .build_reply()
            .map_err(|e| hook_failed(self.id, "get reply", e))?;
        let further = self
            .handler
            .has_further_work()
            .map_err(|e| hook_failed(self.id, "get reply", e))?;

        self.status.set_reply_ready(false);
        if further {
            self.status.set_waiting_process(true);
        } else {
            reply.put(fields::CLOSE, true);
            self.status.set_accept_requests(true);
        }
        self.transitioned(before, "get reply")?;
        Ok(reply)
    }

    fn close(&mut self) -> ProcessResult<()> {
        if self.status.closed() {
            return Ok(());
        }
        let result = self.handler.on_close();
        self.status.set_closed();
        info!(unit = self.id, "process closed");
        result
    }

    fn message_data(&self) -> Message {
        self.handler.message_data()
    }
}
