//! Ports (C1–C3): the boundary between the session engine and the
//! vendor-specific collaborators it wires together. See spec.md §4.1–4.3.

mod adapter;
mod file_transfer;
mod protocol;

pub use adapter::{DecodeOutcome, MessageAdapter};
pub use file_transfer::FileTransfer;
pub use protocol::{Protocol, ProtocolCallbacks};
