//! Elegoo FDM CC printer variant. MQTT transport, no behavioral overrides:
//! it is the baseline `PrinterStrategy` every default method was written
//! against.

use super::elegoo_mqtt::{access_code, serial, ElegooCcAdapter, ElegooMqttProtocol};
use super::http_transfer::HttpFileTransfer;
use super::PrinterStrategy;
use crate::ports::{FileTransfer, MessageAdapter, Protocol};
use crate::types::PrinterInfo;
use std::sync::Arc;

pub struct ElegooCcStrategy;

impl PrinterStrategy for ElegooCcStrategy {
    fn create_protocol(&self, info: &PrinterInfo) -> anyhow::Result<Arc<dyn Protocol>> {
        Ok(Arc::new(ElegooMqttProtocol::new(info.ip.clone(), info.port, access_code(info)?, serial(info)?)))
    }

    fn create_adapter(&self, _info: &PrinterInfo) -> anyhow::Result<Box<dyn MessageAdapter>> {
        Ok(Box::new(ElegooCcAdapter::default()))
    }

    fn create_file_transfer(&self, info: &PrinterInfo) -> anyhow::Result<Option<Arc<dyn FileTransfer>>> {
        Ok(Some(Arc::new(HttpFileTransfer::new(format!("http://{}/upload", info.ip)))))
    }
}
