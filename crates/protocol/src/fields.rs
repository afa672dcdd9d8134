//! Wire field names.
//!
//! These keys make up the envelope contract between a process unit and its
//! host. They are spelled exactly as they appear on the wire.

/// Inbound request payload, and the original request inside a forward entry.
pub const REQUEST: &str = "request";
/// Reply payload.
pub const REPLY: &str = "reply";
/// Source chain used to route a reply back to its caller.
pub const SOURCE: &str = "source";
/// Identifier of the unit (envelope level) or correlation id (entry level).
pub const SOURCE_REF: &str = "sourceRef";
/// Identifier assigned by the original caller.
pub const SOURCE_ID: &str = "sourceId";
/// Message type being sent.
pub const MESSAGE: &str = "message";
/// Service that handles a message.
pub const SERVICE: &str = "service";
/// Forward requests keyed by correlation id.
pub const MESSAGE_LIST: &str = "messageList";
/// Return text, also used as a user-facing rejection reason.
pub const RETURN: &str = "return";
/// Marks the last reply of a request.
pub const CLOSE: &str = "close";

/// Working data exposed to configured expressions.
pub const DATA: &str = "data";
/// Name of the next forward request chosen by a configured process.
pub const NEXT_REQUEST: &str = "nextRequest";
/// Replies received for forward requests, keyed by request name.
pub const REPLIES: &str = "replies";
