//! Forward-request and reply envelopes.
//!
//! A unit hands forward requests to its host in one envelope:
//!
//! ```text
//! sourceRef <unit id>
//! messageList {
//!   <correlation id> {
//!     service <service>
//!     message <message>
//!     source {
//!       sourceRef <correlation id>
//!       source { <source chain of the original request> }
//!     }
//!     request { <request data> }
//!   }
//!   [...]
//! }
//! ```
//!
//! The host answers each entry with a reply envelope:
//!
//! ```text
//! source { sourceRef <correlation id> }
//! reply { <reply data> }
//! return <string>      (optional)
//! close <bool>         (optional)
//! ```

use crate::fields;
use crate::message::Message;
use serde_json::Value;

/// Build the source block of a forward entry.
///
/// The inner `source` carries the routing fields of the original request, so
/// a reply can be traced back through nested forwarding hops. Fields absent
/// from the original are left out.
pub fn source_chain(original: &Message, correlation_id: u64) -> Message {
    let mut client = Message::new();
    client
        .copy_field(original, fields::SERVICE)
        .copy_field(original, fields::MESSAGE)
        .copy_field(original, fields::SOURCE_ID)
        .copy_field(original, fields::SOURCE_REF)
        .copy_field(original, fields::SOURCE);

    Message::new()
        .with(fields::SOURCE_REF, correlation_id)
        .with(fields::SOURCE, client)
}

/// One request a unit wants its host to send on to another service.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardRequest {
    /// Correlation id assigned by the unit; echoed back in the reply's source block.
    pub correlation_id: u64,

    /// Destination service.
    pub service: String,

    /// Message type, if any.
    pub message: Option<Value>,

    /// Request payload, if any.
    pub request: Option<Value>,

    /// Source block, see [`source_chain`].
    pub source: Message,
}

impl ForwardRequest {
    /// Create a forward request with an empty payload.
    ///
    /// `original` is the inbound request being served; it supplies the
    /// source chain.
    pub fn new(correlation_id: u64, service: impl Into<String>, original: &Message) -> Self {
        Self {
            correlation_id,
            service: service.into(),
            message: None,
            request: None,
            source: source_chain(original, correlation_id),
        }
    }

    /// Forward the original request unchanged apart from its destination.
    ///
    /// The message type and request payload are copied from `original`.
    pub fn relay(correlation_id: u64, service: impl Into<String>, original: &Message) -> Self {
        Self {
            message: original.get(fields::MESSAGE).cloned(),
            request: original.get(fields::REQUEST).cloned(),
            ..Self::new(correlation_id, service, original)
        }
    }

    pub fn with_message(mut self, message: Option<Value>) -> Self {
        self.message = message;
        self
    }

    pub fn with_request(mut self, request: Option<Value>) -> Self {
        self.request = request;
        self
    }

    /// Render the entry as it appears under `messageList`.
    pub fn to_message(&self) -> Message {
        let mut entry = Message::new().with(fields::SERVICE, self.service.as_str());
        if let Some(message) = &self.message {
            entry.put(fields::MESSAGE, message.clone());
        }
        entry.put(fields::SOURCE, self.source.clone());
        if let Some(request) = &self.request {
            entry.put(fields::REQUEST, request.clone());
        }
        entry
    }
}

/// A set of forward requests issued by one unit in one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardEnvelope {
    source_ref: u32,
    requests: Vec<ForwardRequest>,
}

impl ForwardEnvelope {
    /// Start an envelope for the unit with the given id.
    pub fn new(unit_id: u32) -> Self {
        Self {
            source_ref: unit_id,
            requests: Vec::new(),
        }
    }

    pub fn push(&mut self, request: ForwardRequest) {
        self.requests.push(request);
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn requests(&self) -> &[ForwardRequest] {
        &self.requests
    }

    /// Render the envelope in wire form.
    pub fn into_message(self) -> Message {
        let mut list = Message::new();
        for request in &self.requests {
            list.put(request.correlation_id.to_string(), request.to_message());
        }
        Message::new()
            .with(fields::SOURCE_REF, self.source_ref)
            .with(fields::MESSAGE_LIST, list)
    }

    /// Read the entries of a rendered envelope, keyed by correlation id.
    ///
    /// Entries that are not mappings are skipped.
    pub fn entries(envelope: &Message) -> Vec<(String, Message)> {
        envelope
            .message(fields::MESSAGE_LIST)
            .map(|list| {
                list.iter()
                    .filter_map(|(key, value)| {
                        Message::from_value(value.clone()).map(|entry| (key.clone(), entry))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A reply to one forward request, as received from the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyEnvelope {
    /// Correlation id taken from `source.sourceRef`.
    pub correlation_id: u64,
    pub reply: Option<Value>,
    pub return_text: Option<Value>,
    pub close: Option<Value>,
}

impl ReplyEnvelope {
    /// Read a reply envelope.
    ///
    /// Returns `None` when `source.sourceRef` is missing or is not a
    /// non-negative integer (numeric strings are accepted).
    pub fn from_message(message: &Message) -> Option<Self> {
        let source = message.message(fields::SOURCE)?;
        let correlation_id = match source.get(fields::SOURCE_REF)? {
            Value::Number(n) => n.as_u64()?,
            Value::String(s) => s.parse().ok()?,
            _ => return None,
        };
        Some(Self {
            correlation_id,
            reply: message.get(fields::REPLY).cloned(),
            return_text: message.get(fields::RETURN).cloned(),
            close: message.get(fields::CLOSE).cloned(),
        })
    }

    /// Write the captured reply, return and close fields onto `target`.
    pub fn apply_to(&self, target: &mut Message) {
        for (key, value) in [
            (fields::REPLY, &self.reply),
            (fields::RETURN, &self.return_text),
            (fields::CLOSE, &self.close),
        ] {
            if let Some(value) = value {
                target.put(key, value.clone());
            }
        }
    }
}
