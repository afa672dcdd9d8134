//! Suite runner: drives each test case of a suite through its process.

use super::{Driver, ForwardResponder};
use crate::processes::{ProcessFactory, ProcessRegistry};
use anyhow::{anyhow, Context, Result};
use mp_protocol::fields;
use mp_protocol::message::Message;
use mp_protocol::suite_models::{TestCase, TestSuite};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Answers forward requests from a case's `replies` block.
///
/// A canned reply without a `source` block is addressed to the forward
/// request it answers.
pub struct CannedReplies<'a> {
    replies: &'a BTreeMap<u64, Message>,
}

impl<'a> CannedReplies<'a> {
    pub fn new(replies: &'a BTreeMap<u64, Message>) -> Self {
        Self { replies }
    }
}

impl ForwardResponder for CannedReplies<'_> {
    fn respond(&mut self, correlation_id: &str, _entry: &Message) -> Result<Message> {
        let id: u64 = correlation_id
            .parse()
            .with_context(|| format!("forward request id '{correlation_id}' is not a number"))?;
        let mut reply = self
            .replies
            .get(&id)
            .cloned()
            .ok_or_else(|| anyhow!("no reply in replies block for message {id}"))?;
        if !reply.contains(fields::SOURCE) {
            reply.put(fields::SOURCE, json!({ "sourceRef": id }));
        }
        Ok(reply)
    }
}

/// Result of one case.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseStatus {
    Passed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseOutcome {
    pub name: String,
    pub status: CaseStatus,
    /// The last reply the process produced, if any.
    pub reply: Option<Message>,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }

    fn failed(name: &str, reason: impl Into<String>, reply: Option<Message>) -> Self {
        Self {
            name: name.to_string(),
            status: CaseStatus::Failed(reason.into()),
            reply,
        }
    }
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            CaseStatus::Passed => write!(f, "{}: passed", self.name),
            CaseStatus::Failed(reason) => write!(f, "{}: failed: {}", self.name, reason),
        }
    }
}

/// Run one case to completion and compare its last reply with `result`.
///
/// A case without `result` passes as long as the process produced a reply.
pub fn run_case(registry: &ProcessRegistry, name: &str, case: &TestCase) -> CaseOutcome {
    let replies = match drive(registry, case) {
        Ok(replies) => replies,
        Err(e) => {
            let reason = format!("{e:#}");
            warn!(case = name, error = %reason, "case errored");
            return CaseOutcome::failed(name, reason, None);
        }
    };

    let Some(last) = replies.last().cloned() else {
        return CaseOutcome::failed(name, "process produced no reply", None);
    };
    if let Some(expected) = &case.result {
        let actual = last.message(fields::REPLY);
        if actual.as_ref() != Some(expected) {
            let shown = actual.map_or_else(|| "nothing".to_string(), |m| m.to_string());
            return CaseOutcome::failed(
                name,
                format!("expected reply {expected}, got {shown}"),
                Some(last),
            );
        }
    }
    info!(case = name, "case passed");
    CaseOutcome {
        name: name.to_string(),
        status: CaseStatus::Passed,
        reply: Some(last),
    }
}

fn drive(registry: &ProcessRegistry, case: &TestCase) -> Result<Vec<Message>> {
    let factory = ProcessFactory::new(registry, case.process.clone())?;
    let mut unit = factory.instance()?;
    let mut responder = CannedReplies::new(&case.replies);
    let replies = Driver::new().run(unit.as_mut(), case.message.clone(), &mut responder);
    let closed = unit.close();
    match (replies, closed) {
        (Ok(replies), closed) => {
            closed.context("closing unit")?;
            Ok(replies)
        }
        (Err(e), Err(close)) => {
            warn!(unit = unit.id(), error = %close, "close failed after a failed run");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
    }
}

/// Run the selected cases of a suite, each on its own unit.
///
/// Cases run concurrently on blocking tasks; outcomes come back in
/// selection order. A selected name with no case is reported as failed.
pub async fn run_suite(registry: Arc<ProcessRegistry>, suite: &TestSuite) -> Result<Vec<CaseOutcome>> {
    let names = suite.selected_cases();
    let mut tasks = JoinSet::new();

    for (index, name) in names.iter().enumerate() {
        let Some(case) = suite.processes.get(name).cloned() else {
            continue;
        };
        let registry = Arc::clone(&registry);
        let name = name.clone();
        tasks.spawn_blocking(move || (index, run_case(&registry, &name, &case)));
    }

    let mut outcomes: Vec<Option<CaseOutcome>> = vec![None; names.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined.context("suite case task panicked")?;
        outcomes[index] = Some(outcome);
    }

    Ok(names
        .iter()
        .zip(outcomes)
        .map(|(name, outcome)| {
            outcome.unwrap_or_else(|| CaseOutcome::failed(name, "no such test case", None))
        })
        .collect())
}
