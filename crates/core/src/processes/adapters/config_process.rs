//! Expression-driven process.
//!
//! Every decision is an [`Expression`] from the process configuration,
//! evaluated against one message view:
//!
//! ```text
//! <fields of the inbound request>
//! nextRequest <name of the forward request being built, or null>
//! data { <static configuration data> }
//! replies { <request name> { <reply block> } ... }
//! reply { <reply in progress> }
//! ```
//!
//! Admission, the further-work check and reply building all see this same
//! shape, assembled fresh by [`ConfigProcess::view`] at each step.

use crate::error::{ProcessError, ProcessResult};
use crate::expression::{Expression, ExpressionError};
use crate::processes::base::read_config;
use crate::processes::request::{RequestContext, RequestHandler, RequestProcess};
use mp_protocol::config_models::ConfigProcessConfig;
use mp_protocol::envelope::{ForwardEnvelope, ForwardRequest, ReplyEnvelope};
use mp_protocol::fields;
use mp_protocol::message::{Message, SealedMessage};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// The config-driven process as a process unit.
pub type ConfigDrivenProcess = RequestProcess<ConfigProcess>;

const DEFAULT_REJECTION: &str = "request rejected by handleRequest";

#[derive(Debug, Default)]
pub struct ConfigProcess {
    handle_request: Option<Expression>,
    next_request: Option<Expression>,
    request_list: BTreeMap<String, Expression>,
    process: Option<Expression>,
    further_work: Option<Expression>,
    build_reply: Option<Expression>,
    data: Message,

    request: SealedMessage,
    next: Option<String>,
    replies: Message,
    reply: Message,
    last_id: u64,
    outstanding: BTreeMap<u64, String>,
}

fn compile(source: Option<&String>) -> ProcessResult<Option<Expression>> {
    source
        .map(|s| Expression::parse(s))
        .transpose()
        .map_err(|e| ProcessError::InvalidConfig(e.to_string()))
}

impl ConfigProcess {
    pub fn process() -> ConfigDrivenProcess {
        RequestProcess::new(Self::default())
    }

    /// The message view every expression is evaluated against.
    pub fn view(&self) -> Message {
        compose(
            &self.request,
            self.next.as_deref(),
            &self.data,
            &self.replies,
            &self.reply,
        )
    }

    fn evaluation_failed(&self, error: ExpressionError) -> ProcessError {
        ProcessError::evaluation(error, &self.view())
    }

    /// Name of the next forward request as seen from `view`, or `None` when
    /// no `nextRequest` is configured or it yields null.
    fn decide_next(&self, view: &Message) -> ProcessResult<Option<String>> {
        let Some(next) = &self.next_request else {
            return Ok(None);
        };
        let name = next
            .evaluate_name(view)
            .map_err(|e| ProcessError::evaluation(e, view))?;
        debug!(next = ?name, "next request");
        Ok(name)
    }
}

fn compose(
    request: &Message,
    next: Option<&str>,
    data: &Message,
    replies: &Message,
    reply: &Message,
) -> Message {
    let mut view = request.clone();
    view.put(fields::NEXT_REQUEST, next.map_or(Value::Null, Value::from))
        .put(fields::DATA, data.clone())
        .put(fields::REPLIES, replies.clone())
        .put(fields::REPLY, reply.clone());
    view
}

impl RequestHandler for ConfigProcess {
    fn on_initialise(&mut self, config: Option<&Message>) -> ProcessResult<()> {
        let config: ConfigProcessConfig = read_config(config)?;
        if config.request_list.is_empty() != config.next_request.is_none() {
            return Err(ProcessError::InvalidConfig(
                "requestList and nextRequest must be configured together".to_string(),
            ));
        }

        self.handle_request = compile(config.handle_request.as_ref())?;
        self.next_request = compile(config.next_request.as_ref())?;
        self.process = compile(config.process.as_ref())?;
        self.further_work = compile(config.further_work.as_ref())?;
        self.build_reply = compile(config.build_reply.as_ref())?;
        self.request_list = config
            .request_list
            .iter()
            .map(|(name, source)| {
                Expression::parse(source)
                    .map(|expr| (name.clone(), expr))
                    .map_err(|e| ProcessError::InvalidConfig(format!("requestList.{name}: {e}")))
            })
            .collect::<ProcessResult<_>>()?;
        self.data = config.data.unwrap_or_default();
        Ok(())
    }

    fn on_new_request(&mut self, request: &SealedMessage) -> ProcessResult<()> {
        let empty = Message::new();
        let view = compose(request, None, &self.data, &empty, &empty);
        if let Some(check) = &self.handle_request {
            match check.evaluate(&view) {
                Ok(Value::Bool(true)) => {}
                Ok(Value::Bool(false)) => {
                    let reason = request.get_str(fields::RETURN).unwrap_or(DEFAULT_REJECTION);
                    return Err(ProcessError::rejected(reason, request));
                }
                Ok(Value::String(reason)) => return Err(ProcessError::rejected(reason, request)),
                Ok(other) => {
                    let error = ExpressionError::TypeMismatch {
                        expression: check.source().to_string(),
                        expected: "boolean or string",
                        found: crate::expression::kind(&other),
                    };
                    return Err(ProcessError::evaluation(error, &view));
                }
                Err(e) => return Err(ProcessError::evaluation(e, &view)),
            }
        }
        let next = self.decide_next(&view)?;

        self.request = request.clone();
        self.next = next;
        self.replies = Message::new();
        self.reply = Message::new();
        self.outstanding.clear();
        Ok(())
    }

    fn has_forward_requests(&self) -> bool {
        self.next.is_some()
    }

    fn build_requests(
        &mut self,
        context: RequestContext<'_>,
    ) -> ProcessResult<Option<ForwardEnvelope>> {
        let Some(name) = self.next.clone() else {
            return Ok(None);
        };
        let view = self.view();
        let builder = self
            .request_list
            .get(&name)
            .ok_or_else(|| ProcessError::routing(name.as_str(), &view))?;
        let spec = builder
            .evaluate_message(&view)
            .map_err(|e| ProcessError::evaluation(e, &view))?;
        let service = spec.get_str(fields::SERVICE).ok_or_else(|| {
            ProcessError::malformed(format!("request '{name}' has no service"), &spec)
        })?;

        self.last_id += 1;
        let id = self.last_id;
        let forward = ForwardRequest::new(id, service, context.request)
            .with_message(spec.get(fields::MESSAGE).cloned())
            .with_request(spec.get(fields::REQUEST).cloned());
        self.outstanding.insert(id, name);

        let mut envelope = ForwardEnvelope::new(context.unit_id);
        envelope.push(forward);
        Ok(Some(envelope))
    }

    fn on_reply(&mut self, reply: &Message) -> ProcessResult<bool> {
        let envelope = ReplyEnvelope::from_message(reply).ok_or_else(|| {
            ProcessError::malformed("reply has no usable source.sourceRef", reply)
        })?;
        let name = self
            .outstanding
            .remove(&envelope.correlation_id)
            .ok_or(ProcessError::UnknownCorrelation(envelope.correlation_id))?;
        self.replies
            .put(name, envelope.reply.unwrap_or(Value::Null));
        Ok(self.outstanding.is_empty())
    }

    fn on_process(&mut self) -> ProcessResult<()> {
        let mut reply = self.reply.clone();
        if let Some(step) = &self.process {
            let update = step
                .evaluate_message(&self.view())
                .map_err(|e| self.evaluation_failed(e))?;
            reply.merge(update);
        }
        let view = compose(
            &self.request,
            self.next.as_deref(),
            &self.data,
            &self.replies,
            &reply,
        );
        let next = self.decide_next(&view)?;

        self.reply = reply;
        self.next = next;
        Ok(())
    }

    fn has_further_work(&self) -> ProcessResult<bool> {
        match &self.further_work {
            Some(check) => check
                .evaluate_bool(&self.view())
                .map_err(|e| self.evaluation_failed(e)),
            None => Ok(false),
        }
    }

    fn build_reply(&self) -> ProcessResult<Message> {
        let reply = match &self.build_reply {
            Some(shape) => shape
                .evaluate_message(&self.view())
                .map_err(|e| self.evaluation_failed(e))?,
            None => self.reply.clone(),
        };
        Ok(self.request.to_message().with(fields::REPLY, reply))
    }

    fn message_data(&self) -> Message {
        self.view()
    }
}
