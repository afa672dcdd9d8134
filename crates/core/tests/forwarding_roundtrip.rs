//! Every forwarded request is answered and drained exactly once.

mod common;

use common::*;
use mp_core::processes::{PassThrough, ProcessUnit};
use mp_protocol::fields;
use proptest::prelude::*;
use serde_json::json;
use std::collections::VecDeque;

fn submit(unit: &mut PassThrough, n: u64) {
    unit.handle_request(routed_request("ping", json!({ "n": n })))
        .unwrap();
}

/// Routes `count` requests through a fresh router, delivering replies in
/// `order`, and returns the correlation ids in the order they were drained.
fn route_and_drain(count: u64, order: Vec<u64>, batch: bool) -> Vec<u64> {
    let mut unit = router();
    let mut issued = Vec::new();
    let mut pending: VecDeque<u64> = order.into();
    let mut drained = Vec::new();

    if batch {
        for n in 1..=count {
            submit(&mut unit, n);
        }
    }
    let mut next = 1;
    for _ in 0..1_000 {
        if !batch && next <= count && unit.status().accept_requests() {
            submit(&mut unit, next);
            next += 1;
        }
        let status = *unit.status();
        if status.reply_ready() {
            let reply = unit.get_reply().unwrap();
            let n = reply
                .get(fields::REPLY)
                .and_then(|r| r.get("id"))
                .and_then(|id| id.as_u64())
                .unwrap();
            drained.push(n);
        } else if status.request_pending() {
            if let Some(envelope) = unit.get_requests().unwrap() {
                issued.extend(forward_ids(&envelope));
            }
        } else if status.waiting_reply() {
            // deliver the earliest id in `order` that has been issued
            let position = pending
                .iter()
                .position(|id| issued.contains(id))
                .expect("an issued request is outstanding");
            let id = pending.remove(position).unwrap();
            unit.handle_reply(reply_envelope(id, json!({ "id": id }))).unwrap();
        } else if status.waiting_process() {
            unit.process().unwrap();
        } else if batch || next > count {
            break;
        }
    }

    assert_eq!(issued.len() as u64, count, "every request forwarded once");
    assert!(unit.in_flight().is_empty());
    drained
}

proptest! {
    #[test]
    fn prop_each_id_drained_once(
        order in (1u64..8).prop_flat_map(|n| Just((1..=n).collect::<Vec<u64>>()).prop_shuffle()),
        batch in any::<bool>(),
    ) {
        let count = order.len() as u64;
        let mut drained = route_and_drain(count, order, batch);
        prop_assert_eq!(drained.len() as u64, count);
        drained.sort_unstable();
        prop_assert_eq!(drained, (1..=count).collect::<Vec<u64>>());
    }
}

#[test]
fn test_drain_follows_reply_arrival() {
    let drained = route_and_drain(3, vec![3, 1, 2], true);
    assert_eq!(drained, vec![3, 1, 2]);
}
