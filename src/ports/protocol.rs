//! Protocol port (C1): outbound connect/disconnect/send, and the inbound
//! callback trait a session implements so the protocol can deliver frames
//! and connection-status changes without owning the session.

use crate::types::ConnectPrinterParams;
use async_trait::async_trait;
use std::sync::Weak;

/// Transport capability. Single-writer from the session's side — only
/// session code ever calls `send`. Inbound callbacks may arrive on any
/// thread the concrete protocol's background task runs on.
#[async_trait]
pub trait Protocol: Send + Sync {
    async fn connect(&self, params: &ConnectPrinterParams) -> anyhow::Result<()>;
    async fn disconnect(&self) -> anyhow::Result<()>;
    async fn send(&self, wire_frame: String) -> anyhow::Result<()>;

    /// Registers the inbound callback sink. Called exactly once, during
    /// `Session::initialize()`, before `connect` is ever called. The
    /// protocol stores only a `Weak` reference — it never keeps the
    /// session alive (spec.md §9, "callbacks and back-references").
    fn set_callbacks(&self, callbacks: Weak<dyn ProtocolCallbacks>);
}

/// Inbound callback sink implemented by [`crate::session::Session`].
pub trait ProtocolCallbacks: Send + Sync {
    /// A raw wire frame arrived. Decoding and dispatch happen inside.
    fn on_message(&self, frame: &str);
    /// The transport's connection state flipped.
    fn on_status_changed(&self, connected: bool);
}
