//! Driver loop for process units.
//!
//! The [`Driver`] owns a unit for the duration of one inbound request. It
//! polls the unit's status and makes exactly one contract call per step,
//! handing forward requests to a [`ForwardResponder`] supplied by the host
//! and feeding the replies back in the order they were produced.

pub mod suite;

use crate::processes::ProcessUnit;
use anyhow::{bail, Context, Result};
use mp_protocol::envelope::ForwardEnvelope;
use mp_protocol::message::Message;
use std::collections::VecDeque;
use tracing::debug;

/// Upper bound on driver steps for one request.
pub const DEFAULT_MAX_STEPS: usize = 1_000;

/// Answers forward requests on behalf of the host.
pub trait ForwardResponder {
    /// Produce the reply envelope for one `messageList` entry.
    ///
    /// # Arguments
    ///
    /// * `correlation_id` - The entry's key in `messageList`
    /// * `entry` - The forward request itself
    fn respond(&mut self, correlation_id: &str, entry: &Message) -> Result<Message>;
}

/// What one driver step did.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// `get_reply` produced a reply.
    Replied(Message),
    /// `get_requests` produced this many forward requests.
    Forwarded(usize),
    /// A queued reply was delivered through `handle_reply`.
    ReplyHandled,
    /// `process` ran.
    Processed,
    /// No work flag was set.
    Idle,
}

/// Drives a unit through its lifecycle.
#[derive(Debug, Clone)]
pub struct Driver {
    max_steps: usize,
}

impl Driver {
    pub fn new() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Submit a request and drive the unit until it has no work left.
    ///
    /// # Returns
    ///
    /// Every reply the unit produced, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit rejects the request or fails a later
    /// call, if the responder fails, if the unit waits for a reply that was
    /// never produced, or if the step limit is reached.
    pub fn run(
        &self,
        unit: &mut dyn ProcessUnit,
        request: Message,
        responder: &mut dyn ForwardResponder,
    ) -> Result<Vec<Message>> {
        let id = unit.id();
        unit.handle_request(request)
            .with_context(|| format!("unit {id} refused the request"))?;
        self.drain(unit, responder)
    }

    /// Drive the unit until it has no work left, without submitting anything.
    pub fn drain(
        &self,
        unit: &mut dyn ProcessUnit,
        responder: &mut dyn ForwardResponder,
    ) -> Result<Vec<Message>> {
        let mut inbox = VecDeque::new();
        let mut replies = Vec::new();

        for _ in 0..self.max_steps {
            match Self::step(unit, &mut inbox, responder)? {
                Step::Replied(reply) => replies.push(reply),
                Step::Idle => {
                    debug!(unit = unit.id(), replies = replies.len(), "unit idle");
                    return Ok(replies);
                }
                _ => {}
            }
        }
        bail!(
            "unit {} still busy after {} steps: {}",
            unit.id(),
            self.max_steps,
            unit.status()
        )
    }

    /// Make the one contract call the unit's status asks for.
    ///
    /// Forward replies produced by `responder` are queued in `inbox` and
    /// delivered one per step while the unit waits for replies.
    pub fn step(
        unit: &mut dyn ProcessUnit,
        inbox: &mut VecDeque<Message>,
        responder: &mut dyn ForwardResponder,
    ) -> Result<Step> {
        let id = unit.id();
        let status = *unit.status();
        debug!(unit = id, %status, "step");

        if status.reply_ready() {
            let reply = unit
                .get_reply()
                .with_context(|| format!("get reply from unit {id}"))?;
            Ok(Step::Replied(reply))
        } else if status.request_pending() {
            let Some(envelope) = unit
                .get_requests()
                .with_context(|| format!("get requests from unit {id}"))?
            else {
                return Ok(Step::Forwarded(0));
            };
            let entries = ForwardEnvelope::entries(&envelope);
            for (correlation_id, entry) in &entries {
                let reply = responder
                    .respond(correlation_id, entry)
                    .with_context(|| format!("answer forward request {correlation_id}"))?;
                inbox.push_back(reply);
            }
            Ok(Step::Forwarded(entries.len()))
        } else if status.waiting_reply() {
            let Some(reply) = inbox.pop_front() else {
                bail!("unit {id} is waiting for a reply but none is queued");
            };
            unit.handle_reply(reply)
                .with_context(|| format!("deliver reply to unit {id}"))?;
            Ok(Step::ReplyHandled)
        } else if status.waiting_process() {
            unit.process()
                .with_context(|| format!("process on unit {id}"))?;
            Ok(Step::Processed)
        } else {
            Ok(Step::Idle)
        }
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}
