//! Pending-request table (C4): correlates outgoing request ids with the
//! callers waiting on their responses, with timeout-driven cleanup.
//!
//! One lock guards the map only; signalling a completion always happens
//! after the lock is released (spec.md §4.4, §5).

use crate::error::{BizResult, ElinkErrorCode};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

struct PendingEntry {
    completion: oneshot::Sender<BizResult<serde_json::Value>>,
    #[allow(dead_code)] // kept for diagnostics / future staleness checks
    enqueued_at: Instant,
}

#[derive(Default)]
pub struct PendingRequestTable {
    entries: Mutex<HashMap<String, PendingEntry>>,
}

impl PendingRequestTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new pending request and returns the receiver half the
    /// caller awaits. Panics if `request_id` is already registered — the
    /// adapter guarantees freshness, so a collision means a caller bug.
    pub fn register(&self, request_id: &str) -> oneshot::Receiver<BizResult<serde_json::Value>> {
        let (tx, rx) = oneshot::channel();
        let mut entries = self.entries.lock().expect("pending requests lock poisoned");
        let prev = entries.insert(
            request_id.to_string(),
            PendingEntry {
                completion: tx,
                enqueued_at: Instant::now(),
            },
        );
        assert!(
            prev.is_none(),
            "request id {request_id} registered twice — adapter did not produce a fresh id"
        );
        rx
    }

    /// Removes its own entry without signalling anything. Used by a caller
    /// that is about to return an error before ever sending (pre-send
    /// failure paths) or after its own wait timed out.
    pub fn forget(&self, request_id: &str) {
        let mut entries = self.entries.lock().expect("pending requests lock poisoned");
        entries.remove(request_id);
    }

    /// Completes a pending request if it is still present. A no-op if
    /// absent — the response is late (arrived after a timeout) or
    /// duplicate, and is silently dropped per spec.md §4.4/§7.
    pub fn complete(&self, request_id: &str, result: BizResult<serde_json::Value>) {
        let entry = {
            let mut entries = self.entries.lock().expect("pending requests lock poisoned");
            entries.remove(request_id)
        };
        if let Some(entry) = entry {
            let _ = entry.completion.send(result);
        }
    }

    /// Cancels every pending request with the given reason code, signalling
    /// outside the lock. Used on disconnect and on connection loss.
    pub fn cancel_all(&self, code: ElinkErrorCode, reason: &str) {
        let drained: Vec<PendingEntry> = {
            let mut entries = self.entries.lock().expect("pending requests lock poisoned");
            entries.drain().map(|(_, v)| v).collect()
        };
        for entry in drained {
            let _ = entry.completion.send(BizResult::err(code, reason));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("pending requests lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Waits on `rx` up to `timeout`, removing the caller's own entry from
/// `table` on expiry. `request_id` must be the id `rx` was registered
/// under.
pub async fn wait_with_timeout(
    table: &PendingRequestTable,
    request_id: &str,
    rx: oneshot::Receiver<BizResult<serde_json::Value>>,
    timeout: Duration,
) -> BizResult<serde_json::Value> {
    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(result)) => result,
        Ok(Err(_canceled)) => {
            // Sender dropped without sending: only happens if the table
            // itself is torn down mid-wait without going through
            // cancel_all, which does not happen in this engine. Treat it
            // the same as a cancellation.
            BizResult::err(ElinkErrorCode::Disconnected, "request cancelled")
        }
        Err(_elapsed) => {
            table.forget(request_id);
            BizResult::err(ElinkErrorCode::Timeout, "request timed out")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn complete_delivers_the_result_to_the_waiting_caller() {
        let table = PendingRequestTable::new();
        let rx = table.register("req-1");
        table.complete("req-1", BizResult::ok(Some(serde_json::json!({"ok": true}))));

        let result = rx.await.expect("sender should not have been dropped");
        assert!(result.is_ok());
        assert!(table.is_empty());
    }

    #[test]
    fn completing_an_unknown_request_id_is_a_silent_no_op() {
        let table = PendingRequestTable::new();
        table.complete("never-registered", BizResult::ok(None));
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn cancel_all_signals_every_pending_caller_with_the_given_code() {
        let table = PendingRequestTable::new();
        let rx_a = table.register("req-a");
        let rx_b = table.register("req-b");
        assert_eq!(table.len(), 2);

        table.cancel_all(ElinkErrorCode::Disconnected, "connection lost");

        assert_eq!(rx_a.await.expect("not dropped").code, ElinkErrorCode::Disconnected);
        assert_eq!(rx_b.await.expect("not dropped").code, ElinkErrorCode::Disconnected);
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn wait_with_timeout_forgets_its_entry_on_expiry() {
        let table = PendingRequestTable::new();
        let rx = table.register("req-slow");

        let result = wait_with_timeout(&table, "req-slow", rx, Duration::from_millis(10)).await;

        assert_eq!(result.code, ElinkErrorCode::Timeout);
        assert!(table.is_empty());
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn registering_a_duplicate_request_id_panics() {
        let table = PendingRequestTable::new();
        let _rx1 = table.register("dup");
        let _rx2 = table.register("dup");
    }
}
