//! Process definition and configuration models.
//!
//! A process definition names the implementation to load and carries a
//! free-form `config` block. Each built-in process reads that block into one
//! of the typed structures below when it is initialised.

use crate::message::Message;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifies a process implementation and its configuration.
///
/// # Example
///
/// ```yaml
/// name: router
/// class: internal:passThrough
/// config:
///   serviceList:
///     ping: pong-service
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDefinition {
    /// Human-readable description of the process.
    #[serde(default)]
    pub name: String,

    /// Registry identifier of the implementation, e.g. `internal:echo`.
    pub class: String,

    /// Configuration handed to the process when it is initialised.
    #[serde(default)]
    pub config: Option<Message>,
}

impl ProcessDefinition {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            class: class.into(),
            config: None,
        }
    }

    pub fn with_config(mut self, config: Message) -> Self {
        self.config = Some(config);
        self
    }
}

/// Configuration of the pass-through (forwarding) process.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PassThroughConfig {
    /// Forward messages with no `serviceList` entry to a service of the same name.
    ///
    /// Accepted for compatibility; unknown destinations are currently always
    /// rejected.
    #[serde(default)]
    pub allow_anonymous: bool,

    /// Maps an inbound message type to its destination service.
    #[serde(default)]
    pub service_list: BTreeMap<String, String>,
}

/// Configuration of the expression-driven process.
///
/// Every field holding a `String` other than the `requestList` keys is an
/// expression evaluated against the process's message view.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigProcessConfig {
    /// Admission check; must yield a boolean or a rejection reason.
    #[serde(default)]
    pub handle_request: Option<String>,

    /// Yields the name of the next forward request, or null when none is needed.
    #[serde(default)]
    pub next_request: Option<String>,

    /// Request builders keyed by request name; each yields `{service, message, request}`.
    #[serde(default)]
    pub request_list: BTreeMap<String, String>,

    /// Processing step; yields a mapping merged into the reply in progress.
    #[serde(default)]
    pub process: Option<String>,

    /// Whether more work remains after a reply has been sent.
    #[serde(default)]
    pub further_work: Option<String>,

    /// Shapes the reply; defaults to the reply in progress.
    #[serde(default)]
    pub build_reply: Option<String>,

    /// Static data exposed to every expression as `data`.
    #[serde(default)]
    pub data: Option<Message>,
}
