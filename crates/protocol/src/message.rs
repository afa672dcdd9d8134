//! Structured message container.
//!
//! Every request, reply and envelope exchanged with a process unit is a
//! `Message`: an insertion-ordered mapping from keys to JSON-like values.
//! Nested mappings are ordinary values and can be lifted back into a
//! `Message` with [`Message::message`].

use serde::{Deserialize, Serialize};
use serde_json::map::{Iter, Keys};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Deref;

/// An ordered, mutable mapping of keys to values.
///
/// Cloning a `Message` produces an independent copy; nothing is shared
/// between the clone and the original.
///
/// # Example
///
/// ```
/// use mp_protocol::message::Message;
///
/// let msg = Message::new()
///     .with("message", "ping")
///     .with("request", Message::new().with("value", 1));
///
/// assert_eq!(msg.get_str("message"), Some("ping"));
/// assert_eq!(msg.message("request").and_then(|r| r.get_i64("value")), Some(1));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Message(Map<String, Value>);

impl Message {
    /// Create an empty message.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a message from a value, if the value is a mapping.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Convert into a plain JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Borrow the underlying mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    /// Copy out a nested mapping stored under `key`.
    ///
    /// Returns `None` if the key is absent or does not hold a mapping.
    pub fn message(&self, key: &str) -> Option<Message> {
        match self.0.get(key) {
            Some(Value::Object(map)) => Some(Self(map.clone())),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert or replace a value, returning `self` for chaining.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`Message::put`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(key, value);
        self
    }

    /// Copy `key` from `from` into this message if `from` holds it.
    ///
    /// Absent fields are skipped rather than written as null.
    pub fn copy_field(&mut self, from: &Message, key: &str) -> &mut Self {
        if let Some(value) = from.get(key) {
            self.0.insert(key.to_string(), value.clone());
        }
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Overlay every field of `other` onto this message.
    pub fn merge(&mut self, other: Message) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        self.0.iter()
    }

    pub fn keys(&self) -> Keys<'_> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Freeze this message into a read-only view.
    pub fn seal(self) -> SealedMessage {
        SealedMessage(self)
    }
}

impl From<Map<String, Value>> for Message {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Message> for Value {
    fn from(message: Message) -> Self {
        message.into_value()
    }
}

impl<'a> IntoIterator for &'a Message {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

/// A message that can no longer be modified.
///
/// Only `&Message` is reachable through `Deref`, so the mutating methods of
/// [`Message`] cannot be called on a sealed message. Use
/// [`SealedMessage::to_message`] to obtain an independent, mutable copy.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct SealedMessage(Message);

impl SealedMessage {
    /// Produce an independent, mutable copy of the sealed message.
    pub fn to_message(&self) -> Message {
        self.0.clone()
    }
}

impl Deref for SealedMessage {
    type Target = Message;

    fn deref(&self) -> &Message {
        &self.0
    }
}

impl From<Message> for SealedMessage {
    fn from(message: Message) -> Self {
        Self(message)
    }
}

impl fmt::Display for SealedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_and_get() {
        let mut msg = Message::new();
        msg.put("name", "alpha").put("count", 3).put("flag", true);

        assert_eq!(msg.get_str("name"), Some("alpha"));
        assert_eq!(msg.get_i64("count"), Some(3));
        assert_eq!(msg.get_bool("flag"), Some(true));
        assert!(msg.contains("name"));
        assert!(!msg.contains("missing"));
        assert_eq!(msg.len(), 3);
    }

    #[test]
    fn test_iteration_preserves_insertion_order() {
        let msg = Message::new().with("zeta", 1).with("alpha", 2).with("mid", 3);
        let keys: Vec<&str> = msg.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_nested_message_is_a_copy() {
        let mut outer = Message::new().with("inner", Message::new().with("v", 1));
        let mut inner = outer.message("inner").unwrap();
        inner.put("v", 2);

        assert_eq!(outer.message("inner").unwrap().get_i64("v"), Some(1));
        outer.put("inner", inner);
        assert_eq!(outer.message("inner").unwrap().get_i64("v"), Some(2));
    }

    #[test]
    fn test_message_of_non_mapping_is_none() {
        let msg = Message::new().with("scalar", 5);
        assert!(msg.message("scalar").is_none());
        assert!(msg.message("absent").is_none());
    }

    #[test]
    fn test_copy_field_skips_absent() {
        let from = Message::new().with("present", "x");
        let mut to = Message::new();
        to.copy_field(&from, "present").copy_field(&from, "absent");

        assert_eq!(to.get_str("present"), Some("x"));
        assert!(!to.contains("absent"));
    }

    #[test]
    fn test_remove_keeps_order_of_remaining() {
        let mut msg = Message::new().with("a", 1).with("b", 2).with("c", 3);
        assert_eq!(msg.remove("b"), Some(json!(2)));
        let keys: Vec<&str> = msg.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_merge_overwrites() {
        let mut base = Message::new().with("a", 1).with("b", 2);
        base.merge(Message::new().with("b", 20).with("c", 30));

        assert_eq!(base.get_i64("a"), Some(1));
        assert_eq!(base.get_i64("b"), Some(20));
        assert_eq!(base.get_i64("c"), Some(30));
    }

    #[test]
    fn test_sealed_copy_is_independent() {
        let sealed = Message::new().with("v", 1).seal();
        let mut copy = sealed.to_message();
        copy.put("v", 2);

        assert_eq!(sealed.get_i64("v"), Some(1));
        assert_eq!(copy.get_i64("v"), Some(2));
    }

    #[test]
    fn test_from_value() {
        assert!(Message::from_value(json!({"a": 1})).is_some());
        assert!(Message::from_value(json!([1, 2])).is_none());
        assert!(Message::from_value(json!("text")).is_none());
    }

    #[test]
    fn test_display_is_compact_json() {
        let msg = Message::new().with("a", 1);
        assert_eq!(msg.to_string(), r#"{"a":1}"#);
    }
}
