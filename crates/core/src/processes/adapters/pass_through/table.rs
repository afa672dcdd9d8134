//! Correlation table for forwarded requests.

use crate::error::{ProcessError, ProcessResult};
use mp_protocol::envelope::{ForwardEnvelope, ForwardRequest, ReplyEnvelope};
use mp_protocol::message::{Message, SealedMessage};
use std::collections::BTreeMap;

/// Sub-status of one forwarded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardState {
    Pending,
    WaitingReply,
    ReplyReady,
}

impl ForwardState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::WaitingReply => "waitingReply",
            Self::ReplyReady => "replyReady",
        }
    }
}

/// One inbound request and its forwarded counterpart.
#[derive(Debug, Clone)]
pub struct ForwardRecord {
    pub request: SealedMessage,
    pub service: String,
    pub state: ForwardState,
    pub reply: Option<ReplyEnvelope>,
}

/// Forwarded requests keyed by correlation id.
///
/// Ids start at 1, increase strictly and are never reused, even after the
/// record they named has been drained.
#[derive(Debug, Default)]
pub struct ForwardTable {
    last_id: u64,
    records: BTreeMap<u64, ForwardRecord>,
}

impl ForwardTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new pending request and return its correlation id.
    pub fn insert(&mut self, request: SealedMessage, service: String) -> u64 {
        self.last_id += 1;
        self.records.insert(
            self.last_id,
            ForwardRecord {
                request,
                service,
                state: ForwardState::Pending,
                reply: None,
            },
        );
        self.last_id
    }

    /// Move every pending record to waiting-reply, collecting them into one envelope.
    ///
    /// The envelope is empty when nothing was pending.
    pub fn sweep_pending(&mut self, unit_id: u32) -> ForwardEnvelope {
        let mut envelope = ForwardEnvelope::new(unit_id);
        for (id, record) in self
            .records
            .iter_mut()
            .filter(|(_, r)| r.state == ForwardState::Pending)
        {
            envelope.push(ForwardRequest::relay(*id, &record.service, &record.request));
            record.state = ForwardState::WaitingReply;
        }
        envelope
    }

    /// Attach a reply to the record it names.
    ///
    /// # Errors
    ///
    /// [`ProcessError::UnknownCorrelation`] if no record has the id, and
    /// [`ProcessError::UnexpectedReply`] if the record is not waiting for a reply.
    pub fn record_reply(&mut self, reply: ReplyEnvelope) -> ProcessResult<()> {
        let id = reply.correlation_id;
        let record = self
            .records
            .get_mut(&id)
            .ok_or(ProcessError::UnknownCorrelation(id))?;
        if record.state != ForwardState::WaitingReply {
            return Err(ProcessError::UnexpectedReply(id));
        }
        record.reply = Some(reply);
        record.state = ForwardState::ReplyReady;
        Ok(())
    }

    /// Remove the lowest-numbered reply-ready record.
    pub fn drain_ready(&mut self) -> Option<(u64, ForwardRecord)> {
        let id = self
            .records
            .iter()
            .find(|(_, r)| r.state == ForwardState::ReplyReady)
            .map(|(id, _)| *id)?;
        self.records.remove(&id).map(|record| (id, record))
    }

    pub fn any(&self, state: ForwardState) -> bool {
        self.records.values().any(|r| r.state == state)
    }

    pub fn state(&self, id: u64) -> Option<ForwardState> {
        self.records.get(&id).map(|r| r.state)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.records.keys().copied()
    }

    /// One entry per record: `{ <id>: { service, state } }`.
    pub fn summary(&self) -> Message {
        let mut summary = Message::new();
        for (id, record) in &self.records {
            summary.put(
                id.to_string(),
                Message::new()
                    .with("service", record.service.as_str())
                    .with("state", record.state.name()),
            );
        }
        summary
    }
}
