//! Message adapter port (C2): encodes business requests into wire frames
//! and decodes wire frames back into responses or events.

use crate::error::ElinkErrorCode;
use crate::types::BizEvent;
use crate::types::BizRequest;

/// Outcome of decoding one inbound wire frame.
#[derive(Debug, Clone)]
pub enum DecodeOutcome {
    /// A response to a previously-sent request.
    Response {
        request_id: String,
        code: ElinkErrorCode,
        message: String,
        data: Option<serde_json::Value>,
    },
    /// A printer-initiated notification, carrying no request id.
    Event(BizEvent),
    /// The frame is not meaningful to this adapter; drop it silently.
    Ignore,
}

/// Encodes business requests into wire frames and decodes wire frames back.
///
/// Stateful for variants that need it (the Elegoo CC2 adapter tracks a
/// monotonic status sequence); `&mut self` reflects that the adapter is
/// owned exclusively by its session, behind a lock.
pub trait MessageAdapter: Send + Sync {
    /// Encodes `request`, returning a fresh, unique request id and the wire
    /// frame to send. Must never reuse an id already in flight.
    fn encode_request(&mut self, request: &BizRequest) -> anyhow::Result<(String, String)>;

    /// Decodes one inbound wire frame.
    fn decode(&mut self, frame: &str) -> DecodeOutcome;

    /// Resets any adapter-local sequence state. Only meaningful for the
    /// Elegoo CC2 variant; other adapters accept the default no-op.
    fn reset_status_sequence(&mut self) {}
}
