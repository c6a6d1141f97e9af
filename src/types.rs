//! The uniform business-level data model: printer descriptors, connection
//! state, requests/results/events, and the typed operation shapes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Printer family, selecting which [`crate::session::PrinterStrategy`] the
/// factory plugs in. Closed set — an unmapped tag is treated as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrinterType {
    ElegooFdmCc,
    ElegooFdmCc2,
    ElegooFdmKlipper,
    GenericFdmKlipper,
    Unknown,
}

/// Opaque descriptor identifying a printer and how to reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterInfo {
    /// Unique key within a single [`crate::registry::Registry`].
    pub printer_id: String,
    pub printer_type: PrinterType,
    /// User-assigned display name, if any.
    #[serde(default)]
    pub name: Option<String>,
    pub ip: String,
    pub port: u16,
    /// Vendor-specific fields the concrete adapters may need (serial
    /// number, access code, ...) that the core does not interpret.
    #[serde(default)]
    pub extra: serde_json::Value,
}

/// Parameters passed to [`crate::session::Session::connect`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectPrinterParams {
    #[serde(default)]
    pub extra: serde_json::Value,
}

/// Lifecycle state of a session's connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// Closed set of business operations a session can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodType {
    StartPrint,
    PausePrint,
    ResumePrint,
    StopPrint,
    SetAutoRefill,
    GetPrinterAttributes,
    GetPrinterStatus,
    GetCanvasStatus,
    UpdatePrinterName,
}

/// A business request awaiting encoding by the message adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BizRequest {
    pub method: MethodType,
    pub params: serde_json::Value,
}

impl BizRequest {
    pub fn new(method: MethodType, params: serde_json::Value) -> Self {
        Self { method, params }
    }
}

/// A printer-initiated notification. Carries no request id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BizEvent {
    pub kind: String,
    pub payload: serde_json::Value,
}

/// Default per-request timeout used when a caller passes `Duration::ZERO`
/// ("0 means use default", spec.md §4.5).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(3000);

// ===== Typed operation params/results =====
//
// Thin serde shapes over the generic BizRequest/BizResult surface. Adapters
// that don't populate a given field simply leave it absent — callers
// distinguish "no data" from "wrong shape" via `BizResult::data`.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartPrintParams {
    pub file_name: String,
    #[serde(default)]
    pub extra: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrinterBaseParams {
    #[serde(default)]
    pub extra: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetAutoRefillParams {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrinterAttributesParams {
    #[serde(default)]
    pub extra: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrinterAttributesResult {
    pub model: Option<String>,
    pub firmware_version: Option<String>,
    pub nozzle_diameter: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrinterStatusParams {
    #[serde(default)]
    pub extra: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrinterStatusResult {
    pub state: Option<String>,
    pub progress_percent: Option<u8>,
    pub remaining_time_secs: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetCanvasStatusParams {
    #[serde(default)]
    pub extra: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetCanvasStatusResult {
    pub recording: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePrinterNameParams {
    pub name: String,
}
