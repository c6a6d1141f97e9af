//! WebSocket transport and JSON-RPC 2.0 wire encoding for the generic
//! Moonraker/Klipper variant. No MQTT broker involved here, so the
//! transport shape necessarily departs from `mqtt.rs`; it keeps the same
//! event-loop-task-plus-callbacks structure.

use crate::error::ElinkErrorCode;
use crate::ports::{DecodeOutcome, MessageAdapter, Protocol, ProtocolCallbacks};
use crate::types::{BizEvent, BizRequest, ConnectPrinterParams, MethodType};
use anyhow::Context;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::sync::{Mutex, Weak};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

type WsSink = futures_util::stream::SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

pub(super) struct MoonrakerProtocol {
    url: String,
    sink: tokio::sync::Mutex<Option<WsSink>>,
    read_task: Mutex<Option<JoinHandle<()>>>,
    callbacks: Mutex<Option<Weak<dyn ProtocolCallbacks>>>,
}

impl MoonrakerProtocol {
    pub(super) fn new(url: String) -> Self {
        Self {
            url,
            sink: tokio::sync::Mutex::new(None),
            read_task: Mutex::new(None),
            callbacks: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Protocol for MoonrakerProtocol {
    async fn connect(&self, _params: &ConnectPrinterParams) -> anyhow::Result<()> {
        let (ws_stream, _response) = connect_async(&self.url).await.context("failed to connect to moonraker websocket")?;
        let (sink, mut stream) = ws_stream.split();
        *self.sink.lock().await = Some(sink);

        let callbacks = self.callbacks.lock().expect("callbacks lock poisoned").clone();
        if let Some(cb) = callbacks.as_ref().and_then(Weak::upgrade) {
            cb.on_status_changed(true);
        }

        let read_callbacks = callbacks;
        let read_task = tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        if let Some(cb) = read_callbacks.as_ref().and_then(Weak::upgrade) {
                            cb.on_message(&text);
                        }
                    }
                    Ok(Message::Close(_)) | Err(_) => {
                        if let Some(cb) = read_callbacks.as_ref().and_then(Weak::upgrade) {
                            cb.on_status_changed(false);
                        }
                        break;
                    }
                    _ => {}
                }
            }
        });
        *self.read_task.lock().expect("task lock poisoned") = Some(read_task);
        Ok(())
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        if let Some(mut sink) = self.sink.lock().await.take() {
            let _ = sink.close().await;
        }
        if let Some(handle) = self.read_task.lock().expect("task lock poisoned").take() {
            handle.abort();
        }
        Ok(())
    }

    async fn send(&self, wire_frame: String) -> anyhow::Result<()> {
        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().context("not connected")?;
        sink.send(Message::Text(wire_frame)).await.context("failed to send websocket frame")?;
        Ok(())
    }

    fn set_callbacks(&self, callbacks: Weak<dyn ProtocolCallbacks>) {
        *self.callbacks.lock().expect("callbacks lock poisoned") = Some(callbacks);
    }
}

impl Drop for MoonrakerProtocol {
    fn drop(&mut self) {
        // Mirrors `examples/rhoopr-bambutop/src/mqtt.rs`'s `Drop for
        // MqttClient`: abort the read task rather than leave it polling a
        // socket this protocol no longer owns.
        if let Some(handle) = self.read_task.lock().expect("task lock poisoned").take() {
            handle.abort();
        }
    }
}

/// Maps a business method onto a plausible Moonraker JSON-RPC method name.
/// Moonraker's real surface is broader than this; this crate only speaks
/// the subset the business operations need.
fn moonraker_method_name(method: MethodType) -> &'static str {
    match method {
        MethodType::StartPrint => "printer.print.start",
        MethodType::PausePrint => "printer.print.pause",
        MethodType::ResumePrint => "printer.print.resume",
        MethodType::StopPrint => "printer.print.cancel",
        MethodType::SetAutoRefill => "printer.gcode.script",
        MethodType::GetPrinterAttributes => "printer.info",
        MethodType::GetPrinterStatus => "printer.objects.query",
        MethodType::GetCanvasStatus => "server.webcams.list",
        MethodType::UpdatePrinterName => "server.database.post_item",
    }
}

#[derive(Default)]
pub(super) struct MoonrakerAdapter;

impl MessageAdapter for MoonrakerAdapter {
    fn encode_request(&mut self, request: &BizRequest) -> anyhow::Result<(String, String)> {
        let request_id = Uuid::new_v4().to_string();
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": moonraker_method_name(request.method),
            "params": request.params,
            "id": request_id,
        });
        Ok((request_id, payload.to_string()))
    }

    fn decode(&mut self, frame: &str) -> DecodeOutcome {
        let value: serde_json::Value = match serde_json::from_str(frame) {
            Ok(value) => value,
            Err(_) => return DecodeOutcome::Ignore,
        };
        let Some(obj) = value.as_object() else {
            return DecodeOutcome::Ignore;
        };

        let id = obj.get("id").and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_i64().map(|n| n.to_string())));
        if let Some(request_id) = id {
            if let Some(error) = obj.get("error") {
                let message = error.get("message").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                return DecodeOutcome::Response { request_id, code: ElinkErrorCode::Internal, message, data: None };
            }
            let data = obj.get("result").cloned();
            return DecodeOutcome::Response { request_id, code: ElinkErrorCode::Ok, message: String::new(), data };
        }

        if let Some(method) = obj.get("method").and_then(|v| v.as_str()) {
            let payload = obj.get("params").cloned().unwrap_or(serde_json::Value::Null);
            return DecodeOutcome::Event(BizEvent { kind: method.to_string(), payload });
        }

        DecodeOutcome::Ignore
    }
}
