//! Business-level error codes and the result envelope every printer
//! operation returns.
//!
//! Unlike the fallible construction paths in this crate (which use
//! [`anyhow::Result`]), business operations never hand the caller a Rust
//! `Err` — they always return a [`BizResult`] carrying a closed error code,
//! so a host application can branch on `code` without downcasting.

use serde::{Deserialize, Serialize};

/// Closed set of business-level error codes.
///
/// Mirrors `ELINK_ERROR_CODE` from the original implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ElinkErrorCode {
    /// The operation completed successfully.
    Ok,
    /// `request` was called while the session was not `Connected`.
    NotConnected,
    /// The adapter failed to encode the business request into a wire frame.
    EncodeFailed,
    /// The protocol failed to send the encoded frame.
    SendFailed,
    /// No matching response arrived before the deadline.
    Timeout,
    /// A response arrived and decoded, but its data could not be converted
    /// into the typed result shape the caller expected.
    DecodeMismatch,
    /// The request was cancelled because the session disconnected (or the
    /// connection was lost) while it was in flight.
    Disconnected,
    /// Any other internal failure not covered by the above.
    Internal,
}

impl ElinkErrorCode {
    pub fn is_ok(self) -> bool {
        matches!(self, ElinkErrorCode::Ok)
    }
}

impl std::fmt::Display for ElinkErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ElinkErrorCode::Ok => "ok",
            ElinkErrorCode::NotConnected => "not_connected",
            ElinkErrorCode::EncodeFailed => "encode_failed",
            ElinkErrorCode::SendFailed => "send_failed",
            ElinkErrorCode::Timeout => "timeout",
            ElinkErrorCode::DecodeMismatch => "decode_mismatch",
            ElinkErrorCode::Disconnected => "disconnected",
            ElinkErrorCode::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// The uniform result envelope every business operation returns.
///
/// Success is `code == ElinkErrorCode::Ok`; `data` may still be absent on
/// success for operations that have nothing to return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BizResult<T> {
    pub code: ElinkErrorCode,
    pub message: String,
    pub data: Option<T>,
}

impl<T> BizResult<T> {
    pub fn ok(data: Option<T>) -> Self {
        Self {
            code: ElinkErrorCode::Ok,
            message: String::new(),
            data,
        }
    }

    pub fn err(code: ElinkErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }

    /// Maps the data payload, preserving code/message. Used by the typed
    /// wrappers (`executeRequest` in the original) to convert a decoded
    /// `serde_json::Value` into a typed result without losing the error
    /// metadata if the conversion fails.
    pub fn map_data<U>(self, f: impl FnOnce(T) -> U) -> BizResult<U> {
        BizResult {
            code: self.code,
            message: self.message,
            data: self.data.map(f),
        }
    }
}

/// A [`BizResult`] that carries no payload — the Rust stand-in for the
/// original's `VoidResult` (`BizResult<std::monostate>`).
pub type VoidResult = BizResult<()>;

impl VoidResult {
    pub fn success() -> Self {
        BizResult::ok(Some(()))
    }
}
