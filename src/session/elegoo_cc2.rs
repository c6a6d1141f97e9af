//! Elegoo FDM CC2 printer variant. Same MQTT transport as CC, but the
//! adapter carries a monotonic status sequence that must be reset on
//! every (re)connect — the one behavioral override this family needs.

use super::elegoo_mqtt::{access_code, serial, ElegooCc2Adapter, ElegooMqttProtocol};
use super::http_transfer::HttpFileTransfer;
use super::{PrinterStrategy, Session};
use crate::ports::{FileTransfer, MessageAdapter, Protocol};
use crate::types::{ConnectPrinterParams, PrinterInfo};
use std::sync::Arc;

pub struct ElegooCc2Strategy;

impl PrinterStrategy for ElegooCc2Strategy {
    fn create_protocol(&self, info: &PrinterInfo) -> anyhow::Result<Arc<dyn Protocol>> {
        Ok(Arc::new(ElegooMqttProtocol::new(info.ip.clone(), info.port, access_code(info)?, serial(info)?)))
    }

    fn create_adapter(&self, _info: &PrinterInfo) -> anyhow::Result<Box<dyn MessageAdapter>> {
        Ok(Box::new(ElegooCc2Adapter::default()))
    }

    fn create_file_transfer(&self, info: &PrinterInfo) -> anyhow::Result<Option<Arc<dyn FileTransfer>>> {
        Ok(Some(Arc::new(HttpFileTransfer::new(format!("http://{}/upload", info.ip)))))
    }

    fn on_connected(&self, session: &Session<Self>, _params: &ConnectPrinterParams) {
        session.reset_status_sequence();
    }
}
