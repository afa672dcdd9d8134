//! Process status flags.
//!
//! A `Status` records the phase of one process unit as seven boolean flags.
//! The driver loop polls these flags to decide which contract operation to
//! call next.
//!
//! Invariants, re-applied after every write:
//! - `closed` forces `active` to false.
//! - While not `active`, every work flag is false.
//! - `active` and `closed` are only ever set, never cleared directly.

use crate::error::{ProcessError, ProcessResult};
use std::fmt;

/// Names one status flag; used to report which precondition failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusFlag {
    Active,
    Closed,
    AcceptRequests,
    ReplyReady,
    RequestPending,
    WaitingProcess,
    WaitingReply,
}

impl StatusFlag {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
            Self::AcceptRequests => "acceptRequests",
            Self::ReplyReady => "replyReady",
            Self::RequestPending => "requestPending",
            Self::WaitingProcess => "waitingProcess",
            Self::WaitingReply => "waitingReply",
        }
    }
}

impl fmt::Display for StatusFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The phase of a process unit.
///
/// All flags start false. Call [`Status::set_active`] once before any work
/// flag can be raised; until then every work-flag setter is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    active: bool,
    closed: bool,
    accept_requests: bool,
    reply_ready: bool,
    request_pending: bool,
    waiting_process: bool,
    waiting_reply: bool,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    /// New requests will be accepted.
    pub fn accept_requests(&self) -> bool {
        self.accept_requests
    }

    /// A reply is ready to be sent back to the caller.
    pub fn reply_ready(&self) -> bool {
        self.reply_ready
    }

    /// Forward requests are waiting to be collected.
    pub fn request_pending(&self) -> bool {
        self.request_pending
    }

    /// The unit is waiting to perform some processing.
    pub fn waiting_process(&self) -> bool {
        self.waiting_process
    }

    /// The unit is waiting for replies to forward requests.
    pub fn waiting_reply(&self) -> bool {
        self.waiting_reply
    }

    /// Read any flag by name.
    pub fn flag(&self, flag: StatusFlag) -> bool {
        match flag {
            StatusFlag::Active => self.active,
            StatusFlag::Closed => self.closed,
            StatusFlag::AcceptRequests => self.accept_requests,
            StatusFlag::ReplyReady => self.reply_ready,
            StatusFlag::RequestPending => self.request_pending,
            StatusFlag::WaitingProcess => self.waiting_process,
            StatusFlag::WaitingReply => self.waiting_reply,
        }
    }

    /// Fail with a state violation unless `flag` is set.
    pub fn require(&self, flag: StatusFlag, operation: &'static str) -> ProcessResult<()> {
        if self.flag(flag) {
            Ok(())
        } else {
            Err(ProcessError::State { operation, flag })
        }
    }

    /// Mark the unit active.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Lifecycle`] if the status is already closed.
    pub fn set_active(&mut self) -> ProcessResult<()> {
        if self.closed {
            return Err(ProcessError::Lifecycle { status: *self });
        }
        self.active = true;
        self.check_states();
        Ok(())
    }

    /// Mark the unit closed; every other flag drops to false.
    pub fn set_closed(&mut self) {
        self.closed = true;
        self.check_states();
    }

    pub fn set_accept_requests(&mut self, value: bool) {
        self.accept_requests = value;
        self.check_states();
    }

    pub fn set_reply_ready(&mut self, value: bool) {
        self.reply_ready = value;
        self.check_states();
    }

    pub fn set_request_pending(&mut self, value: bool) {
        self.request_pending = value;
        self.check_states();
    }

    pub fn set_waiting_process(&mut self, value: bool) {
        self.waiting_process = value;
        self.check_states();
    }

    pub fn set_waiting_reply(&mut self, value: bool) {
        self.waiting_reply = value;
        self.check_states();
    }

    /// Clear all four work flags, leaving `acceptRequests` alone.
    pub fn clear_work(&mut self) {
        self.reply_ready = false;
        self.request_pending = false;
        self.waiting_process = false;
        self.waiting_reply = false;
    }

    /// True if any of the four work flags is set.
    pub fn has_work(&self) -> bool {
        self.work_flag_count() > 0
    }

    /// Number of work flags (`replyReady`, `requestPending`,
    /// `waitingProcess`, `waitingReply`) currently set.
    pub fn work_flag_count(&self) -> usize {
        [
            self.reply_ready,
            self.request_pending,
            self.waiting_process,
            self.waiting_reply,
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Fail if more than one work flag is set.
    ///
    /// A single-threaded driver can only make unambiguous progress when at
    /// most one work flag is raised at a time.
    pub fn ensure_exclusive(&self) -> ProcessResult<()> {
        if self.work_flag_count() > 1 {
            Err(ProcessError::AmbiguousStatus(*self))
        } else {
            Ok(())
        }
    }

    fn check_states(&mut self) {
        if self.closed {
            self.active = false;
        }
        self.accept_requests &= self.active;
        self.reply_ready &= self.active;
        self.request_pending &= self.active;
        self.waiting_process &= self.active;
        self.waiting_reply &= self.active;
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Status{{active={}, closed={}, acceptRequests={}, replyReady={}, requestPending={}, waitingProcess={}, waitingReply={}}}",
            self.active,
            self.closed,
            self.accept_requests,
            self.reply_ready,
            self.request_pending,
            self.waiting_process,
            self.waiting_reply
        )
    }
}
