//! Error types for process units.
//!
//! Every failure inside a unit surfaces as a [`ProcessError`]. Variants that
//! arise from a particular message keep a sealed snapshot of it, available
//! through [`ProcessError::context`], so the host can log or reply with it.

use crate::expression::ExpressionError;
use crate::state::{Status, StatusFlag};
use mp_protocol::message::{Message, SealedMessage};
use thiserror::Error;

/// Errors raised by process units.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessError {
    /// A contract operation was called while its precondition flag was false.
    #[error("cannot {operation}: {flag} is not set")]
    State {
        operation: &'static str,
        flag: StatusFlag,
    },

    /// `initialise` on a unit that is already active or closed, or
    /// `set_active` on a closed status.
    #[error("process cannot be initialised in current state: {status}")]
    Lifecycle { status: Status },

    /// The request was refused; `reason` is meant for the caller.
    #[error("{reason}")]
    Rejected {
        reason: String,
        context: Option<SealedMessage>,
    },

    /// A configured expression failed.
    #[error("{source}")]
    Evaluation {
        source: ExpressionError,
        context: Option<SealedMessage>,
    },

    /// No destination is configured for the inbound message type.
    #[error("unknown service for message '{message}'")]
    Routing {
        message: String,
        context: Option<SealedMessage>,
    },

    /// A reply named a correlation id the unit never issued or already drained.
    #[error("no forward request with correlation id {0}")]
    UnknownCorrelation(u64),

    /// A reply arrived for a forward request that is not waiting for one.
    #[error("forward request {0} is not waiting for a reply")]
    UnexpectedReply(u64),

    /// A message lacked a field the unit needs.
    #[error("malformed message: {reason}")]
    Malformed {
        reason: String,
        context: Option<SealedMessage>,
    },

    /// The configuration block could not be read into the unit's typed configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// More than one work flag is set at once.
    #[error("ambiguous status, more than one work flag set: {0}")]
    AmbiguousStatus(Status),

    /// The registry has no process under this identifier.
    #[error("unknown process class '{0}'")]
    UnknownClass(String),
}

impl ProcessError {
    pub fn rejected(reason: impl Into<String>, context: &Message) -> Self {
        Self::Rejected {
            reason: reason.into(),
            context: Some(context.clone().seal()),
        }
    }

    pub fn evaluation(source: ExpressionError, context: &Message) -> Self {
        Self::Evaluation {
            source,
            context: Some(context.clone().seal()),
        }
    }

    pub fn routing(message: impl Into<String>, context: &Message) -> Self {
        Self::Routing {
            message: message.into(),
            context: Some(context.clone().seal()),
        }
    }

    pub fn malformed(reason: impl Into<String>, context: &Message) -> Self {
        Self::Malformed {
            reason: reason.into(),
            context: Some(context.clone().seal()),
        }
    }

    /// The message being handled when the error occurred, if known.
    pub fn context(&self) -> Option<&Message> {
        match self {
            Self::Rejected { context, .. }
            | Self::Evaluation { context, .. }
            | Self::Routing { context, .. }
            | Self::Malformed { context, .. } => context.as_deref(),
            _ => None,
        }
    }
}

/// Type alias for Result with ProcessError.
pub type ProcessResult<T> = Result<T, ProcessError>;
