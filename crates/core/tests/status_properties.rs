//! Property tests for status invariants under arbitrary call sequences.

mod common;

use common::*;
use mp_core::error::ProcessError;
use mp_core::processes::ProcessUnit;
use mp_core::state::Status;
use mp_protocol::message::Message;
use proptest::prelude::*;
use serde_json::json;

#[derive(Debug, Clone)]
enum Flip {
    Active,
    Closed,
    AcceptRequests(bool),
    ReplyReady(bool),
    RequestPending(bool),
    WaitingProcess(bool),
    WaitingReply(bool),
}

fn flip_strategy() -> impl Strategy<Value = Flip> {
    prop_oneof![
        3 => Just(Flip::Active),
        1 => Just(Flip::Closed),
        3 => any::<bool>().prop_map(Flip::AcceptRequests),
        3 => any::<bool>().prop_map(Flip::ReplyReady),
        3 => any::<bool>().prop_map(Flip::RequestPending),
        3 => any::<bool>().prop_map(Flip::WaitingProcess),
        3 => any::<bool>().prop_map(Flip::WaitingReply),
    ]
}

#[derive(Debug, Clone)]
enum Call {
    HandleRequest(&'static str),
    GetRequests,
    HandleReply(u64),
    Process,
    GetReply,
    Close,
}

fn call_strategy() -> impl Strategy<Value = Call> {
    prop_oneof![
        4 => prop::sample::select(vec!["ping", "find", "unknown"]).prop_map(Call::HandleRequest),
        4 => Just(Call::GetRequests),
        4 => (1u64..6).prop_map(Call::HandleReply),
        4 => Just(Call::Process),
        4 => Just(Call::GetReply),
        1 => Just(Call::Close),
    ]
}

fn apply(unit: &mut dyn ProcessUnit, call: &Call) -> Result<(), ProcessError> {
    match call {
        Call::HandleRequest(message) => {
            unit.handle_request(routed_request(message, json!({"value": 1})))
        }
        Call::GetRequests => unit.get_requests().map(|_| ()),
        Call::HandleReply(id) => unit.handle_reply(reply_envelope(*id, json!({"id": id}))),
        Call::Process => unit.process(),
        Call::GetReply => unit.get_reply().map(|_| ()),
        Call::Close => unit.close(),
    }
}

/// Apply every call, checking the invariants after each one and that a
/// failed call left the status exactly as it was.
fn check_sequence(unit: &mut dyn ProcessUnit, calls: &[Call]) -> Result<(), TestCaseError> {
    for call in calls {
        let before = *unit.status();
        let result = apply(unit, call);
        let after = *unit.status();

        assert_status_invariants(&after);
        prop_assert!(
            after.work_flag_count() <= 1,
            "{call:?} raised several work flags: {after}"
        );
        if let Err(e) = result {
            prop_assert_eq!(before, after, "{:?} failed with {} but changed the status", call, e);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_status_setters_keep_invariants(flips in prop::collection::vec(flip_strategy(), 0..60)) {
        let mut status = Status::new();
        for flip in &flips {
            match flip {
                Flip::Active => {
                    let was_closed = status.closed();
                    let result = status.set_active();
                    prop_assert_eq!(result.is_err(), was_closed);
                }
                Flip::Closed => status.set_closed(),
                Flip::AcceptRequests(v) => status.set_accept_requests(*v),
                Flip::ReplyReady(v) => status.set_reply_ready(*v),
                Flip::RequestPending(v) => status.set_request_pending(*v),
                Flip::WaitingProcess(v) => status.set_waiting_process(*v),
                Flip::WaitingReply(v) => status.set_waiting_reply(*v),
            }
            assert_status_invariants(&status);
            prop_assert_eq!(status.ensure_exclusive().is_ok(), status.work_flag_count() <= 1);
        }
    }

    #[test]
    fn prop_router_status_is_well_formed(calls in prop::collection::vec(call_strategy(), 0..80)) {
        let mut unit = router();
        check_sequence(&mut unit, &calls)?;
    }

    #[test]
    fn prop_echo_status_is_well_formed(calls in prop::collection::vec(call_strategy(), 0..60)) {
        let mut unit = echo_unit();
        check_sequence(&mut unit, &calls)?;
    }

    #[test]
    fn prop_config_process_status_is_well_formed(calls in prop::collection::vec(call_strategy(), 0..80)) {
        let mut unit = config_unit(json!({
            "handleRequest": "message != 'unknown'",
            "nextRequest": "replies.a == null ? 'a' : (replies.b == null ? 'b' : null)",
            "requestList": {
                "a": "{ service: 'svc-a', request: request }",
                "b": "{ service: 'svc-b', request: request }"
            },
            "furtherWork": "false"
        }));
        check_sequence(&mut unit, &calls)?;
    }

    #[test]
    fn prop_operations_fail_without_their_flag(calls in prop::collection::vec(call_strategy(), 0..40)) {
        let mut unit = router();
        for call in &calls {
            let status = *unit.status();
            let required = match call {
                Call::HandleRequest(_) => status.accept_requests(),
                Call::GetRequests => status.request_pending(),
                Call::HandleReply(_) => status.waiting_reply(),
                Call::Process => status.waiting_process(),
                Call::GetReply => status.reply_ready(),
                Call::Close => true,
            };
            let result = apply(&mut unit, call);
            if !required {
                prop_assert!(
                    matches!(result, Err(ProcessError::State { .. })),
                    "{:?} succeeded without its flag", call
                );
            }
        }
    }
}

#[test]
fn test_closed_unit_cannot_reactivate() {
    let mut unit = echo_unit();
    unit.close().unwrap();
    assert!(matches!(
        unit.initialise(Some(&Message::new())),
        Err(ProcessError::Lifecycle { .. })
    ));
    assert_status_invariants(unit.status());
}
