//! Test fixtures: units, messages and suite files.

use mp_core::processes::adapters::{ConfigDrivenProcess, EchoProcess};
use mp_core::processes::{ConfigProcess, Echo, PassThrough, ProcessUnit};
use mp_protocol::fields;
use mp_protocol::message::Message;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

/// An initialised echo unit.
#[allow(dead_code)]
pub fn echo_unit() -> EchoProcess {
    let mut unit = Echo::process();
    unit.initialise(None).expect("echo initialises");
    unit
}

/// An initialised pass-through unit routing `ping` to `pong-service` and
/// `find` to `db-service`.
#[allow(dead_code)]
pub fn router() -> PassThrough {
    let mut unit = PassThrough::new();
    unit.set_id(77);
    let config = Message::new().with(
        "serviceList",
        json!({ "ping": "pong-service", "find": "db-service" }),
    );
    unit.initialise(Some(&config)).expect("router initialises");
    unit
}

/// An initialised config-driven unit.
#[allow(dead_code)]
pub fn config_unit(config: Value) -> ConfigDrivenProcess {
    let mut unit = ConfigProcess::process();
    let config = Message::from_value(config).expect("config is a mapping");
    unit.initialise(Some(&config)).expect("config unit initialises");
    unit
}

/// An inbound request with a message type and request block.
#[allow(dead_code)]
pub fn routed_request(message: &str, request: Value) -> Message {
    Message::new()
        .with(fields::MESSAGE, message)
        .with(fields::REQUEST, request)
}

/// A reply envelope addressed to `correlation_id`.
#[allow(dead_code)]
pub fn reply_envelope(correlation_id: u64, reply: Value) -> Message {
    Message::new()
        .with(fields::SOURCE, json!({ "sourceRef": correlation_id }))
        .with(fields::REPLY, reply)
}

/// A suite exercising every built-in process.
#[allow(dead_code)]
pub const SAMPLE_SUITE: &str = r#"
processes:
  echo:
    process:
      name: echo back
      class: internal:echo
    message:
      request:
        value: 1
    result:
      value: 1
  route:
    process:
      class: internal:passThrough
      config:
        serviceList:
          ping: pong-service
    replies:
      1:
        source:
          sourceRef: 1
        reply:
          ok: true
    message:
      message: ping
      request:
        value: 2
    result:
      ok: true
  lookup:
    process:
      class: internal:config
      config:
        handleRequest: "request.id != null ? true : 'id is required'"
        nextRequest: "replies.user == null ? 'user' : null"
        requestList:
          user: "{ service: 'users', message: 'get', request: { id: request.id } }"
        process: "{ greeting: 'hello ' + replies.user.name }"
    replies:
      1:
        reply:
          name: ada
    message:
      request:
        id: 9
    result:
      greeting: hello ada
"#;

/// Write `content` to a suite file in a fresh temporary directory.
///
/// Returns the directory, which must be kept alive for the test duration.
#[allow(dead_code)]
pub fn write_suite(file_name: &str, content: &str) -> std::io::Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(file_name);
    std::fs::write(&path, content)?;
    Ok((dir, path))
}
