//! Transparent forwarding process.
//!
//! Each inbound request is relayed to the service its `message` maps to in
//! the configured `serviceList`, and each reply is handed back with the
//! original request context. Any number of requests may be in flight; the
//! [`ForwardTable`] tracks them by correlation id.
//!
//! The unit keeps accepting requests while active. Every call other than
//! `process` leaves it in `waitingProcess`, and `process` presents the single
//! most urgent work flag:
//!
//! 1. `replyReady` if any record has its reply,
//! 2. `requestPending` if any record has not been sent,
//! 3. `waitingReply` if any record is still out,
//! 4. nothing otherwise.

mod table;

pub use table::{ForwardRecord, ForwardState, ForwardTable};

use crate::error::{ProcessError, ProcessResult};
use crate::processes::base::{read_config, ProcessUnit};
use crate::state::{Status, StatusFlag};
use mp_protocol::config_models::PassThroughConfig;
use mp_protocol::envelope::ReplyEnvelope;
use mp_protocol::fields;
use mp_protocol::message::Message;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct PassThrough {
    id: u32,
    status: Status,
    config: PassThroughConfig,
    table: ForwardTable,
}

impl PassThrough {
    pub fn new() -> Self {
        Self::default()
    }

    /// The correlation table, for inspection.
    pub fn in_flight(&self) -> &ForwardTable {
        &self.table
    }

    /// Resolve the destination for an inbound request.
    ///
    /// `allowAnonymous` is read but not honoured: an unmapped message is
    /// always a routing failure.
    fn destination(&self, request: &Message) -> ProcessResult<String> {
        let message = request
            .get_str(fields::MESSAGE)
            .ok_or_else(|| ProcessError::malformed("request has no message field", request))?;
        self.config
            .service_list
            .get(message)
            .cloned()
            .ok_or_else(|| ProcessError::routing(message, request))
    }

    fn await_process(&mut self, operation: &'static str) -> ProcessResult<()> {
        self.status.clear_work();
        self.status.set_waiting_process(true);
        debug!(unit = self.id, status = %self.status, "{operation}");
        self.status.ensure_exclusive()
    }

    fn failed(&self, operation: &'static str, error: ProcessError) -> ProcessError {
        warn!(unit = self.id, error = %error, "{operation} failed");
        error
    }
}

impl ProcessUnit for PassThrough {
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
        self.config = read_config(config).map_err(|e| self.failed("initialise", e))?;
        self.status.set_active()?;
        self.status.set_accept_requests(true);
        info!(
            unit = self.id,
            services = self.config.service_list.len(),
            "pass-through initialised"
        );
        Ok(())
    }

    fn handle_request(&mut self, request: Message) -> ProcessResult<()> {
        self.status
            .require(StatusFlag::AcceptRequests, "handle request")?;
        let service = self
            .destination(&request)
            .map_err(|e| self.failed("handle request", e))?;
        let id = self.table.insert(request.seal(), service);
        debug!(unit = self.id, correlation_id = id, "request recorded");
        self.await_process("handle request")
    }

    fn get_requests(&mut self) -> ProcessResult<Option<Message>> {
        self.status
            .require(StatusFlag::RequestPending, "get requests")?;
        let envelope = self.table.sweep_pending(self.id);
        self.await_process("get requests")?;
        if envelope.is_empty() {
            return Ok(None);
        }
        debug!(unit = self.id, count = envelope.len(), "forwarding requests");
        Ok(Some(envelope.into_message()))
    }

    fn handle_reply(&mut self, reply: Message) -> ProcessResult<()> {
        self.status
            .require(StatusFlag::WaitingReply, "handle reply")?;
        let envelope = ReplyEnvelope::from_message(&reply)
            .ok_or_else(|| {
                ProcessError::malformed("reply has no usable source.sourceRef", &reply)
            })
            .map_err(|e| self.failed("handle reply", e))?;
        let id = envelope.correlation_id;
        self.table
            .record_reply(envelope)
            .map_err(|e| self.failed("handle reply", e))?;
        debug!(unit = self.id, correlation_id = id, "reply recorded");
        self.await_process("handle reply")
    }

    fn process(&mut self) -> ProcessResult<()> {
        self.status.require(StatusFlag::WaitingProcess, "process")?;
        self.status.clear_work();
        if self.table.any(ForwardState::ReplyReady) {
            self.status.set_reply_ready(true);
        } else if self.table.any(ForwardState::Pending) {
            self.status.set_request_pending(true);
        } else if self.table.any(ForwardState::WaitingReply) {
            self.status.set_waiting_reply(true);
        }
        debug!(unit = self.id, status = %self.status, "process");
        self.status.ensure_exclusive()
    }

    fn get_reply(&mut self) -> ProcessResult<Message> {
        self.status.require(StatusFlag::ReplyReady, "get reply")?;
        let Some((id, record)) = self.table.drain_ready() else {
            // replyReady is only presented while a record is ready
            return Err(self.failed(
                "get reply",
                ProcessError::AmbiguousStatus(self.status),
            ));
        };

        let mut reply = record.request.to_message();
        if let Some(answer) = &record.reply {
            answer.apply_to(&mut reply);
        }
        debug!(unit = self.id, correlation_id = id, "reply drained");

        // more ready records keep replyReady presented
        if !self.table.any(ForwardState::ReplyReady) {
            self.await_process("get reply")?;
        }
        Ok(reply)
    }

    fn close(&mut self) -> ProcessResult<()> {
        if self.status.closed() {
            return Ok(());
        }
        if !self.table.is_empty() {
            info!(
                unit = self.id,
                abandoned = self.table.len(),
                "closing with forwarded requests in flight"
            );
        }
        self.status.set_closed();
        info!(unit = self.id, "pass-through closed");
        Ok(())
    }

    fn message_data(&self) -> Message {
        Message::new().with("inFlight", self.table.summary())
    }
}
