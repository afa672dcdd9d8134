//! Suite file models.
//!
//! A suite describes processes to instantiate, the request each one receives,
//! canned replies for any forward requests it issues, and the reply expected
//! back.

use crate::config_models::ProcessDefinition;
use crate::message::Message;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A collection of process test cases.
///
/// # Example
///
/// ```yaml
/// test: echo
/// processes:
///   echo:
///     process:
///       class: internal:echo
///     message:
///       request:
///         value: 1
///     result:
///       value: 1
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    /// Space-separated names of the cases to run; all cases run when absent.
    #[serde(default)]
    pub test: Option<String>,

    /// Test cases keyed by name.
    #[serde(default)]
    pub processes: BTreeMap<String, TestCase>,
}

impl TestSuite {
    /// Names of the cases selected by the `test` field.
    pub fn selected_cases(&self) -> Vec<String> {
        match &self.test {
            Some(list) => list.split_whitespace().map(str::to_string).collect(),
            None => self.processes.keys().cloned().collect(),
        }
    }
}

/// One process under test.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// The process to instantiate.
    pub process: ProcessDefinition,

    /// Reply envelopes for forward requests, keyed by correlation id.
    #[serde(default)]
    pub replies: BTreeMap<u64, Message>,

    /// The inbound request.
    pub message: Message,

    /// Expected `reply` block of the final reply; any reply passes when absent.
    #[serde(default)]
    pub result: Option<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case() -> TestCase {
        TestCase {
            process: ProcessDefinition::new("internal:echo"),
            replies: BTreeMap::new(),
            message: Message::new(),
            result: None,
        }
    }

    #[test]
    fn test_selected_cases_defaults_to_all() {
        let mut suite = TestSuite::default();
        suite.processes.insert("b".to_string(), case());
        suite.processes.insert("a".to_string(), case());
        assert_eq!(suite.selected_cases(), vec!["a", "b"]);
    }

    #[test]
    fn test_selected_cases_from_list() {
        let suite = TestSuite {
            test: Some(" first  second ".to_string()),
            processes: BTreeMap::new(),
        };
        assert_eq!(suite.selected_cases(), vec!["first", "second"]);
    }
}
