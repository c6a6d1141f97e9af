//! Shared MQTT transport and wire encoding for the two Elegoo FDM
//! variants (CC, CC2). Grounded on `examples/rhoopr-bambutop/src/mqtt.rs`:
//! same broker-auth shape (`bblp` + access code), same TLS setup against a
//! self-signed cert, same pre-ConnAck subscribe-then-pushall handshake.

use crate::error::ElinkErrorCode;
use crate::ports::{DecodeOutcome, MessageAdapter, Protocol, ProtocolCallbacks};
use crate::types::{BizEvent, BizRequest, ConnectPrinterParams, MethodType, PrinterInfo};
use anyhow::Context;
use async_trait::async_trait;
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, MqttOptions, Packet, QoS, TlsConfiguration, Transport,
};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

const KEEPALIVE_SECS: u64 = 30;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const OPERATION_TIMEOUT: Duration = Duration::from_secs(30);
const MQTT_EVENT_QUEUE_CAPACITY: usize = 10;

/// Accepts any certificate. Elegoo printers, like Bambu ones, serve a
/// self-signed cert on their local MQTT broker.
#[derive(Debug)]
struct NoVerifier;

impl ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}

/// Reads the `access_code`/`serial` fields every Elegoo variant needs out of
/// [`PrinterInfo::extra`]. The core never interprets `extra` itself; these
/// two variant modules are the only readers.
pub(super) fn access_code(info: &PrinterInfo) -> anyhow::Result<String> {
    info.extra
        .get("access_code")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .context("printer info is missing an access_code")
}

pub(super) fn serial(info: &PrinterInfo) -> anyhow::Result<String> {
    info.extra
        .get("serial")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .context("printer info is missing a serial number")
}

/// MQTT [`Protocol`] shared by both Elegoo variants. They differ only in
/// their [`MessageAdapter`], not in transport behavior.
pub(super) struct ElegooMqttProtocol {
    ip: String,
    port: u16,
    access_code: String,
    serial: String,
    client: Mutex<Option<AsyncClient>>,
    report_topic: Mutex<Option<String>>,
    request_topic: Mutex<Option<String>>,
    event_loop_handle: Mutex<Option<JoinHandle<()>>>,
    callbacks: Mutex<Option<Weak<dyn ProtocolCallbacks>>>,
}

impl ElegooMqttProtocol {
    pub(super) fn new(ip: String, port: u16, access_code: String, serial: String) -> Self {
        Self {
            ip,
            port,
            access_code,
            serial,
            client: Mutex::new(None),
            report_topic: Mutex::new(None),
            request_topic: Mutex::new(None),
            event_loop_handle: Mutex::new(None),
            callbacks: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Protocol for ElegooMqttProtocol {
    async fn connect(&self, _params: &ConnectPrinterParams) -> anyhow::Result<()> {
        let client_id = format!("elink_{}_{}", std::process::id(), self.serial);
        let mut mqtt_opts = MqttOptions::new(client_id, self.ip.clone(), self.port);
        mqtt_opts.set_credentials("bblp", &self.access_code);
        mqtt_opts.set_keep_alive(Duration::from_secs(KEEPALIVE_SECS));

        let tls_config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerifier))
            .with_no_client_auth();
        mqtt_opts.set_transport(Transport::tls_with_config(TlsConfiguration::Rustls(Arc::new(tls_config))));

        let report_topic = format!("device/{}/report", self.serial);
        let request_topic = format!("device/{}/request", self.serial);

        let (client, mut eventloop) = AsyncClient::new(mqtt_opts, MQTT_EVENT_QUEUE_CAPACITY);

        let callbacks = self.callbacks.lock().expect("callbacks lock poisoned").clone();
        let loop_client = client.clone();
        let loop_report_topic = report_topic.clone();
        let loop_request_topic = request_topic.clone();

        let event_loop_handle = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                        if connack.code != ConnectReturnCode::Success {
                            continue;
                        }
                        // Clean sessions drop subscriptions, so every (re)connect
                        // re-subscribes and re-requests a full status push.
                        let _ = loop_client.subscribe(&loop_report_topic, QoS::AtMostOnce).await;
                        let _ = loop_client
                            .publish(&loop_request_topic, QoS::AtMostOnce, false, r#"{"pushing":{"sequence_id":"0","command":"pushall"}}"#)
                            .await;
                        if let Some(cb) = callbacks.as_ref().and_then(Weak::upgrade) {
                            cb.on_status_changed(true);
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        if let Ok(payload) = std::str::from_utf8(&publish.payload) {
                            if let Some(cb) = callbacks.as_ref().and_then(Weak::upgrade) {
                                cb.on_message(payload);
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(_err) => {
                        if let Some(cb) = callbacks.as_ref().and_then(Weak::upgrade) {
                            cb.on_status_changed(false);
                        }
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });

        // Subscribe before the ConnAck handler runs — rumqttc queues the
        // SUBSCRIBE packet and sends it once the CONNECT handshake completes.
        tokio::time::timeout(OPERATION_TIMEOUT, client.subscribe(&report_topic, QoS::AtMostOnce))
            .await
            .context("subscribe operation timed out")?
            .context("failed to subscribe to printer report topic")?;

        *self.client.lock().expect("client lock poisoned") = Some(client);
        *self.report_topic.lock().expect("topic lock poisoned") = Some(report_topic);
        *self.request_topic.lock().expect("topic lock poisoned") = Some(request_topic);
        *self.event_loop_handle.lock().expect("handle lock poisoned") = Some(event_loop_handle);
        Ok(())
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        let client = self.client.lock().expect("client lock poisoned").clone();
        if let Some(client) = client {
            let _ = tokio::time::timeout(Duration::from_secs(2), client.disconnect()).await;
        }
        if let Some(handle) = self.event_loop_handle.lock().expect("handle lock poisoned").take() {
            handle.abort();
        }
        Ok(())
    }

    async fn send(&self, wire_frame: String) -> anyhow::Result<()> {
        let client = self.client.lock().expect("client lock poisoned").clone();
        let topic = self.request_topic.lock().expect("topic lock poisoned").clone();
        let (client, topic) = match (client, topic) {
            (Some(client), Some(topic)) => (client, topic),
            _ => anyhow::bail!("not connected"),
        };
        tokio::time::timeout(OPERATION_TIMEOUT, client.publish(&topic, QoS::AtMostOnce, false, wire_frame))
            .await
            .context("publish operation timed out")?
            .context("failed to publish request")?;
        Ok(())
    }

    fn set_callbacks(&self, callbacks: Weak<dyn ProtocolCallbacks>) {
        *self.callbacks.lock().expect("callbacks lock poisoned") = Some(callbacks);
    }
}

impl Drop for ElegooMqttProtocol {
    fn drop(&mut self) {
        // Mirrors `examples/rhoopr-bambutop/src/mqtt.rs`'s `Drop for
        // MqttClient`: a destructor can't await the client's disconnect, so
        // it aborts the event loop task instead.
        if let Some(handle) = self.event_loop_handle.lock().expect("handle lock poisoned").take() {
            handle.abort();
        }
    }
}

fn method_group_command(method: MethodType) -> (&'static str, &'static str) {
    match method {
        MethodType::StartPrint => ("print", "start_print"),
        MethodType::PausePrint => ("print", "pause"),
        MethodType::ResumePrint => ("print", "resume"),
        MethodType::StopPrint => ("print", "stop"),
        MethodType::SetAutoRefill => ("print", "auto_refill"),
        MethodType::GetPrinterAttributes => ("info", "get_version"),
        MethodType::GetPrinterStatus => ("pushing", "pushall"),
        MethodType::GetCanvasStatus => ("camera", "get_canvas_status"),
        MethodType::UpdatePrinterName => ("system", "set_name"),
    }
}

fn encode_elegoo_request(request: &BizRequest) -> anyhow::Result<(String, String)> {
    let request_id = Uuid::new_v4().to_string();
    let (group, command) = method_group_command(request.method);
    let mut payload = serde_json::json!({
        group: {
            "sequence_id": request_id,
            "command": command,
        }
    });
    if let serde_json::Value::Object(params_obj) = &request.params {
        if let Some(serde_json::Value::Object(group_obj)) = payload.get_mut(group) {
            for (key, value) in params_obj {
                group_obj.insert(key.clone(), value.clone());
            }
        }
    }
    Ok((request_id, payload.to_string()))
}

/// A frame is a response if its group envelope carries back the
/// `sequence_id` it was sent with, plus a result/errcode field; anything
/// else is an unsolicited status or info push.
fn decode_elegoo_frame(frame: &str) -> DecodeOutcome {
    let value: serde_json::Value = match serde_json::from_str(frame) {
        Ok(value) => value,
        Err(_) => return DecodeOutcome::Ignore,
    };
    let Some(obj) = value.as_object() else {
        return DecodeOutcome::Ignore;
    };
    for inner in obj.values() {
        let Some(inner) = inner.as_object() else { continue };
        let Some(sequence_id) = inner.get("sequence_id").and_then(|v| v.as_str()) else { continue };
        if inner.contains_key("result") || inner.contains_key("errcode") {
            let errcode = inner.get("errcode").and_then(|v| v.as_i64()).unwrap_or(0);
            let code = if errcode == 0 { ElinkErrorCode::Ok } else { ElinkErrorCode::Internal };
            let message = inner.get("reason").and_then(|v| v.as_str()).unwrap_or_default().to_string();
            let data = inner.get("result").cloned();
            return DecodeOutcome::Response { request_id: sequence_id.to_string(), code, message, data };
        }
    }
    DecodeOutcome::Event(BizEvent { kind: "status".to_string(), payload: value })
}

/// [`MessageAdapter`] for the Elegoo FDM CC variant. Stateless: no
/// behavioral overrides apply to this family.
#[derive(Default)]
pub(super) struct ElegooCcAdapter;

impl MessageAdapter for ElegooCcAdapter {
    fn encode_request(&mut self, request: &BizRequest) -> anyhow::Result<(String, String)> {
        encode_elegoo_request(request)
    }

    fn decode(&mut self, frame: &str) -> DecodeOutcome {
        decode_elegoo_frame(frame)
    }
}

/// [`MessageAdapter`] for the Elegoo FDM CC2 variant. Tracks a monotonic
/// counter over inbound status pushes, reset on every (re)connect.
#[derive(Default)]
pub(super) struct ElegooCc2Adapter {
    status_sequence: u64,
}

impl MessageAdapter for ElegooCc2Adapter {
    fn encode_request(&mut self, request: &BizRequest) -> anyhow::Result<(String, String)> {
        encode_elegoo_request(request)
    }

    fn decode(&mut self, frame: &str) -> DecodeOutcome {
        let outcome = decode_elegoo_frame(frame);
        if matches!(outcome, DecodeOutcome::Event(_)) {
            self.status_sequence += 1;
        }
        outcome
    }

    fn reset_status_sequence(&mut self) {
        self.status_sequence = 0;
    }
}
