//! Assertion helpers for status and envelopes.

use mp_core::state::Status;
use mp_protocol::envelope::ForwardEnvelope;
use mp_protocol::fields;
use mp_protocol::message::Message;

/// Assert the lifecycle invariants: closed implies inactive, and an
/// inactive unit has no flag other than `closed` set.
pub fn assert_status_invariants(status: &Status) {
    if status.closed() {
        assert!(!status.active(), "closed status is still active: {status}");
    }
    if !status.active() {
        assert!(
            !status.accept_requests() && !status.has_work(),
            "inactive status has flags set: {status}"
        );
    }
}

/// Assert that at most one work flag is set.
#[allow(dead_code)]
pub fn assert_exclusive(status: &Status) {
    assert!(
        status.work_flag_count() <= 1,
        "more than one work flag set: {status}"
    );
    assert!(status.ensure_exclusive().is_ok());
}

/// Correlation ids of a forward envelope, in envelope order.
#[allow(dead_code)]
pub fn forward_ids(envelope: &Message) -> Vec<u64> {
    ForwardEnvelope::entries(envelope)
        .into_iter()
        .map(|(id, _)| id.parse().expect("correlation ids are numeric"))
        .collect()
}

/// The service each forward entry is addressed to, in envelope order.
#[allow(dead_code)]
pub fn forward_services(envelope: &Message) -> Vec<String> {
    ForwardEnvelope::entries(envelope)
        .into_iter()
        .filter_map(|(_, entry)| entry.get_str(fields::SERVICE).map(str::to_string))
        .collect()
}
