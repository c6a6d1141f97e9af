//! Session (C5): the per-printer engine. Owns a protocol, an adapter, an
//! optional file-transfer channel, and the pending-request table; issues
//! typed business requests; demultiplexes inbound frames into responses or
//! events; tracks connection state; drives status polling after connect.
//!
//! Polymorphism over printer type (spec.md §9) is composition, not
//! inheritance: [`Session`] is generic over a [`PrinterStrategy`] that
//! supplies the three port factory hooks plus the handful of overridable
//! business hooks the original base class exposed as virtuals.

mod elegoo_cc;
mod elegoo_cc2;
mod elegoo_mqtt;
mod http_transfer;
mod moonraker;
mod moonraker_ws;

pub use elegoo_cc::ElegooCcStrategy;
pub use elegoo_cc2::ElegooCc2Strategy;
pub use moonraker::MoonrakerStrategy;

use crate::error::{BizResult, ElinkErrorCode, VoidResult};
use crate::pending::{wait_with_timeout, PendingRequestTable};
use crate::ports::{DecodeOutcome, FileTransfer, MessageAdapter, Protocol, ProtocolCallbacks};
use crate::types::{
    BizEvent, BizRequest, ConnectPrinterParams, ConnectionStatus, GetCanvasStatusParams,
    GetCanvasStatusResult, MethodType, PrinterAttributesParams, PrinterAttributesResult,
    PrinterBaseParams, PrinterInfo, PrinterStatusParams, PrinterStatusResult, SetAutoRefillParams,
    StartPrintParams, UpdatePrinterNameParams, DEFAULT_REQUEST_TIMEOUT,
};
use crate::util::mask_id;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Cadence of the status-polling probe (spec.md §4.5, "design: 1-second
/// intervals").
const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Event callback slot type: a shared, thread-safe closure.
pub type EventCallback = Arc<dyn Fn(BizEvent) + Send + Sync>;

/// Per-printer-type behavior the base engine delegates to. Every method has
/// a sensible default; variants override only what actually differs
/// (spec.md §4.5, "the only behavioral overrides in the observed set").
#[async_trait]
pub trait PrinterStrategy: Send + Sync + Sized + 'static {
    fn create_protocol(&self, info: &PrinterInfo) -> anyhow::Result<Arc<dyn Protocol>>;
    fn create_adapter(&self, info: &PrinterInfo) -> anyhow::Result<Box<dyn MessageAdapter>>;
    fn create_file_transfer(&self, info: &PrinterInfo) -> anyhow::Result<Option<Arc<dyn FileTransfer>>>;

    /// Called once connected (either via an explicit `connect()` call's
    /// protocol handshake completing, or via an unsolicited
    /// `on_status_changed(true)`).
    fn on_connected(&self, _session: &Session<Self>, _params: &ConnectPrinterParams) {}

    /// Called before the protocol is asked to disconnect.
    fn on_disconnecting(&self, _session: &Session<Self>) {}

    fn default_timeout(&self) -> Duration {
        DEFAULT_REQUEST_TIMEOUT
    }

    /// Overridable because Moonraker's print jobs run for minutes and the
    /// generic session default (wait for a response) is wrong for it.
    async fn start_print(&self, session: &Session<Self>, params: StartPrintParams, timeout: Duration) -> VoidResult {
        session.default_start_print(params, timeout).await
    }
}

#[derive(Default)]
struct PollingState {
    running: AtomicBool,
    stop: Notify,
    handle: Mutex<Option<JoinHandle<()>>>,
}

/// The per-printer session engine. See the module docs and spec.md §4.5.
pub struct Session<S: PrinterStrategy> {
    info: PrinterInfo,
    strategy: S,
    protocol: Arc<dyn Protocol>,
    adapter: Mutex<Box<dyn MessageAdapter>>,
    file_transfer: Option<Arc<dyn FileTransfer>>,
    pending: PendingRequestTable,
    status: Mutex<ConnectionStatus>,
    is_connected: AtomicBool,
    event_callback: Mutex<Option<EventCallback>>,
    polling: PollingState,
    /// A weak handle to `self`, set once in [`Session::initialize`], so
    /// callback-driven code paths (which only ever see `&self`) can obtain
    /// an `Arc<Self>` to spawn the polling task on.
    self_weak: OnceLock<Weak<Session<S>>>,
    initialized: AtomicBool,
}

impl<S: PrinterStrategy> Session<S> {
    /// Constructs protocol/adapter/file-transfer via the strategy's factory
    /// hooks and wires up self-referential callbacks. Construction failure
    /// of any collaborator is fatal (spec.md §4.5): the caller (the session
    /// factory, C6) discards the session and reports `None`.
    pub(crate) fn new(info: PrinterInfo, strategy: S) -> anyhow::Result<Arc<Self>> {
        let protocol = strategy.create_protocol(&info)?;
        let adapter = strategy.create_adapter(&info)?;
        let file_transfer = strategy.create_file_transfer(&info)?;

        let session = Arc::new(Self {
            info,
            strategy,
            protocol,
            adapter: Mutex::new(adapter),
            file_transfer,
            pending: PendingRequestTable::new(),
            status: Mutex::new(ConnectionStatus::Disconnected),
            is_connected: AtomicBool::new(false),
            event_callback: Mutex::new(None),
            polling: PollingState::default(),
            self_weak: OnceLock::new(),
            initialized: AtomicBool::new(false),
        });
        session.initialize();
        Ok(session)
    }

    /// Registers inbound callbacks on the protocol. A precondition, not a
    /// guarded operation: callers (only the factory) must call this exactly
    /// once. A second call is a debug-time bug, not a recoverable error
    /// (spec.md §9, open question on `initialize()` re-entrancy).
    fn initialize(self: &Arc<Self>) {
        debug_assert!(
            !self.initialized.swap(true, Ordering::SeqCst),
            "Session::initialize called more than once"
        );
        let weak_self: Weak<Session<S>> = Arc::downgrade(self);
        let _ = self.self_weak.set(weak_self.clone());
        let weak_callbacks: Weak<dyn ProtocolCallbacks> = weak_self;
        self.protocol.set_callbacks(weak_callbacks);
    }

    pub fn printer_id(&self) -> &str {
        &self.info.printer_id
    }

    pub fn printer_info(&self) -> &PrinterInfo {
        &self.info
    }

    pub fn file_transfer(&self) -> Option<Arc<dyn FileTransfer>> {
        self.file_transfer.clone()
    }

    /// Lock-free read of the connected flag.
    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::SeqCst)
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        *self.status.lock().expect("status lock poisoned")
    }

    fn set_status(&self, status: ConnectionStatus) {
        *self.status.lock().expect("status lock poisoned") = status;
    }

    /// Connects to the printer. If already connected, returns success with
    /// a logged notice rather than reconnecting (spec.md §4.5).
    pub async fn connect(&self, params: ConnectPrinterParams) -> VoidResult {
        if self.connection_status() == ConnectionStatus::Connected {
            log::info!("[{}] connect: already connected", mask_id(&self.info.printer_id));
            return VoidResult::success();
        }

        self.set_status(ConnectionStatus::Connecting);
        match self.protocol.connect(&params).await {
            Ok(()) => {
                log::info!("[{}] connect: handshake completed", mask_id(&self.info.printer_id));
                VoidResult::success()
            }
            Err(err) => {
                log::error!("[{}] connect failed: {err}", mask_id(&self.info.printer_id));
                self.set_status(ConnectionStatus::Disconnected);
                VoidResult::err(ElinkErrorCode::Internal, err.to_string())
            }
        }
    }

    /// Disconnects. Never fails: always leaves the session disconnected,
    /// all pending requests cancelled, and the polling task joined.
    pub async fn disconnect(&self) -> VoidResult {
        self.strategy.on_disconnecting(self);
        self.pending.cancel_all(ElinkErrorCode::Disconnected, "disconnected");
        self.join_polling().await;

        self.set_status(ConnectionStatus::Disconnecting);
        if let Err(err) = self.protocol.disconnect().await {
            log::warn!("[{}] protocol disconnect reported an error: {err}", mask_id(&self.info.printer_id));
        }
        self.is_connected.store(false, Ordering::SeqCst);
        self.set_status(ConnectionStatus::Disconnected);
        log::info!("[{}] disconnected", mask_id(&self.info.printer_id));
        VoidResult::success()
    }

    pub fn set_event_callback(&self, callback: Option<EventCallback>) {
        *self.event_callback.lock().expect("callback lock poisoned") = callback;
    }

    /// Resets adapter-local sequence state via the dyn [`MessageAdapter`]
    /// hook. A no-op for every variant except Elegoo CC2, which overrides
    /// it from [`PrinterStrategy::on_connected`].
    pub fn reset_status_sequence(&self) {
        self.adapter.lock().expect("adapter lock poisoned").reset_status_sequence();
    }

    /// Issues a business request and waits for its response. `timeout ==
    /// Duration::ZERO` means "use the strategy's default timeout".
    pub async fn request(&self, request: BizRequest, timeout: Duration) -> BizResult<serde_json::Value> {
        if self.connection_status() != ConnectionStatus::Connected {
            return BizResult::err(ElinkErrorCode::NotConnected, "session is not connected");
        }
        let timeout = if timeout.is_zero() { self.strategy.default_timeout() } else { timeout };

        let (request_id, frame) = {
            let mut adapter = self.adapter.lock().expect("adapter lock poisoned");
            match adapter.encode_request(&request) {
                Ok(pair) => pair,
                Err(err) => {
                    log::warn!("[{}] encode failed: {err}", mask_id(&self.info.printer_id));
                    return BizResult::err(ElinkErrorCode::EncodeFailed, err.to_string());
                }
            }
        };

        let rx = self.pending.register(&request_id);
        if let Err(err) = self.protocol.send(frame).await {
            self.pending.forget(&request_id);
            log::warn!("[{}] send failed: {err}", mask_id(&self.info.printer_id));
            return BizResult::err(ElinkErrorCode::SendFailed, err.to_string());
        }

        wait_with_timeout(&self.pending, &request_id, rx, timeout).await
    }

    /// The typed-request pattern from the original `executeRequest`: encode
    /// params, issue the request, and try to convert the response payload
    /// into `R`. A conversion failure preserves the incoming code/message
    /// and leaves `data` absent (spec.md §7).
    async fn execute_request<P, R>(&self, method: MethodType, params: P, action: &str, timeout: Duration) -> BizResult<R>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        log::info!("[{}] {action}", mask_id(&self.info.printer_id));
        let params_json = match serde_json::to_value(params) {
            Ok(value) => value,
            Err(err) => return BizResult::err(ElinkErrorCode::EncodeFailed, err.to_string()),
        };
        let result = self.request(BizRequest::new(method, params_json), timeout).await;
        let code = result.code;
        let message = result.message;
        match result.data {
            None => BizResult { code, message, data: None },
            Some(value) => match serde_json::from_value::<R>(value) {
                Ok(typed) => BizResult { code, message, data: Some(typed) },
                Err(err) => {
                    log::warn!("[{}] failed to convert response data for {action}: {err}", mask_id(&self.info.printer_id));
                    BizResult { code, message, data: None }
                }
            },
        }
    }

    /// Variant of [`Self::execute_request`] for operations with no typed
    /// payload: any response data is discarded (spec.md §4.5).
    async fn execute_void_request<P>(&self, method: MethodType, params: P, action: &str, timeout: Duration) -> VoidResult
    where
        P: Serialize + Send,
    {
        log::info!("[{}] {action}", mask_id(&self.info.printer_id));
        let params_json = match serde_json::to_value(params) {
            Ok(value) => value,
            Err(err) => return VoidResult::err(ElinkErrorCode::EncodeFailed, err.to_string()),
        };
        let result = self.request(BizRequest::new(method, params_json), timeout).await;
        VoidResult {
            code: result.code,
            message: result.message,
            data: if result.is_ok() { Some(()) } else { None },
        }
    }

    pub(crate) async fn default_start_print(&self, params: StartPrintParams, timeout: Duration) -> VoidResult {
        self.execute_void_request(MethodType::StartPrint, params, "start print", timeout).await
    }

    pub async fn start_print(&self, params: StartPrintParams, timeout: Duration) -> VoidResult {
        self.strategy.start_print(self, params, timeout).await
    }

    pub async fn pause_print(&self, params: PrinterBaseParams, timeout: Duration) -> VoidResult {
        self.execute_void_request(MethodType::PausePrint, params, "pause print", timeout).await
    }

    pub async fn resume_print(&self, params: PrinterBaseParams, timeout: Duration) -> VoidResult {
        self.execute_void_request(MethodType::ResumePrint, params, "resume print", timeout).await
    }

    pub async fn stop_print(&self, params: PrinterBaseParams, timeout: Duration) -> VoidResult {
        self.execute_void_request(MethodType::StopPrint, params, "stop print", timeout).await
    }

    pub async fn set_auto_refill(&self, params: SetAutoRefillParams, timeout: Duration) -> VoidResult {
        self.execute_void_request(MethodType::SetAutoRefill, params, "set auto refill", timeout).await
    }

    pub async fn get_printer_attributes(&self, params: PrinterAttributesParams, timeout: Duration) -> BizResult<PrinterAttributesResult> {
        self.execute_request(MethodType::GetPrinterAttributes, params, "get printer attributes", timeout).await
    }

    pub async fn get_printer_status(&self, params: PrinterStatusParams, timeout: Duration) -> BizResult<PrinterStatusResult> {
        self.execute_request(MethodType::GetPrinterStatus, params, "get printer status", timeout).await
    }

    pub async fn get_canvas_status(&self, params: GetCanvasStatusParams, timeout: Duration) -> BizResult<GetCanvasStatusResult> {
        self.execute_request(MethodType::GetCanvasStatus, params, "get canvas status", timeout).await
    }

    pub async fn update_printer_name(&self, params: UpdatePrinterNameParams, timeout: Duration) -> VoidResult {
        self.execute_void_request(MethodType::UpdatePrinterName, params, "update printer name", timeout).await
    }

    /// Starts the status-polling task if one isn't already running.
    /// Idempotent: a second call while a task is already running is a
    /// no-op (spec.md §4.5, "the start/stop pair is idempotent").
    fn start_polling(&self) {
        if self.polling.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(weak) = self.self_weak.get().cloned() else {
            self.polling.running.store(false, Ordering::SeqCst);
            return;
        };

        let handle = tokio::spawn(async move {
            loop {
                let Some(session) = weak.upgrade() else { break };
                tokio::select! {
                    _ = tokio::time::sleep(STATUS_POLL_INTERVAL) => {}
                    _ = session.polling.stop.notified() => break,
                }
                if !session.polling.running.load(Ordering::SeqCst) {
                    break;
                }
                let result = session
                    .get_printer_status(PrinterStatusParams::default(), DEFAULT_REQUEST_TIMEOUT)
                    .await;
                if result.is_ok() {
                    break;
                }
            }
            if let Some(session) = weak.upgrade() {
                session.polling.running.store(false, Ordering::SeqCst);
            }
        });
        *self.polling.handle.lock().expect("polling lock poisoned") = Some(handle);
    }

    /// Signals the polling task to stop without waiting for it to exit.
    /// Used from the (synchronous) connection-status-changed callback.
    fn request_stop_polling(&self) {
        if self.polling.running.swap(false, Ordering::SeqCst) {
            self.polling.stop.notify_waiters();
        }
    }

    /// Stops and joins the polling task. Used by `disconnect`, which must
    /// return only once the task has actually exited.
    async fn join_polling(&self) {
        self.request_stop_polling();
        let handle = self.polling.handle.lock().expect("polling lock poisoned").take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    fn handle_message(&self, frame: &str) {
        let outcome = {
            let mut adapter = self.adapter.lock().expect("adapter lock poisoned");
            adapter.decode(frame)
        };
        match outcome {
            DecodeOutcome::Response { request_id, code, message, data } => {
                self.pending.complete(&request_id, BizResult { code, message, data });
            }
            DecodeOutcome::Event(event) => {
                let callback = self.event_callback.lock().expect("callback lock poisoned").clone();
                if let Some(callback) = callback {
                    if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(event))).is_err() {
                        log::error!("[{}] event callback panicked", mask_id(&self.info.printer_id));
                    }
                }
            }
            DecodeOutcome::Ignore => {}
        }
    }
}

impl<S: PrinterStrategy> ProtocolCallbacks for Session<S> {
    fn on_message(&self, frame: &str) {
        if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| self.handle_message(frame))).is_err() {
            log::error!("[{}] panic while handling inbound frame; frame dropped", mask_id(&self.info.printer_id));
        }
    }

    fn on_status_changed(&self, connected: bool) {
        let became_connected = {
            let mut status = self.status.lock().expect("status lock poisoned");
            let was_connected = *status == ConnectionStatus::Connected;
            *status = if connected { ConnectionStatus::Connected } else { ConnectionStatus::Disconnected };
            connected && !was_connected
        };
        self.is_connected.store(connected, Ordering::SeqCst);

        if became_connected {
            self.strategy.on_connected(self, &ConnectPrinterParams::default());
            self.start_polling();
        } else if !connected {
            self.pending.cancel_all(ElinkErrorCode::Disconnected, "connection lost");
            self.request_stop_polling();
        }
    }
}

impl<S: PrinterStrategy> Drop for Session<S> {
    fn drop(&mut self) {
        // Mirrors `examples/rhoopr-bambutop/src/mqtt.rs`'s `Drop for
        // MqttClient`: a destructor can't await a join, so it aborts the
        // background task instead. Callers that need a guaranteed joined
        // shutdown should call `disconnect()` explicitly.
        if let Some(handle) = self.polling.handle.lock().expect("polling lock poisoned").take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrinterType;

    #[derive(Default)]
    struct FakeAdapter {
        counter: u64,
    }

    impl MessageAdapter for FakeAdapter {
        fn encode_request(&mut self, _request: &BizRequest) -> anyhow::Result<(String, String)> {
            let id = format!("req-{}", self.counter);
            self.counter += 1;
            Ok((id.clone(), id))
        }

        fn decode(&mut self, frame: &str) -> DecodeOutcome {
            match frame.strip_prefix("ok:") {
                Some(request_id) => DecodeOutcome::Response {
                    request_id: request_id.to_string(),
                    code: ElinkErrorCode::Ok,
                    message: String::new(),
                    data: Some(serde_json::json!({"ok": true})),
                },
                None => DecodeOutcome::Ignore,
            }
        }
    }

    #[derive(Default)]
    struct FakeProtocol {
        callbacks: Mutex<Option<Weak<dyn ProtocolCallbacks>>>,
        auto_respond: AtomicBool,
        sent: Mutex<Vec<String>>,
    }

    impl FakeProtocol {
        fn deliver(&self, frame: &str) {
            if let Some(cb) = self.callbacks.lock().expect("poisoned").clone().and_then(|w| w.upgrade()) {
                cb.on_message(frame);
            }
        }

        fn last_sent(&self) -> String {
            self.sent.lock().expect("poisoned").last().cloned().expect("a request was sent")
        }
    }

    #[async_trait]
    impl Protocol for FakeProtocol {
        async fn connect(&self, _params: &ConnectPrinterParams) -> anyhow::Result<()> {
            if let Some(cb) = self.callbacks.lock().expect("poisoned").clone().and_then(|w| w.upgrade()) {
                cb.on_status_changed(true);
            }
            Ok(())
        }

        async fn disconnect(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn send(&self, wire_frame: String) -> anyhow::Result<()> {
            self.sent.lock().expect("poisoned").push(wire_frame.clone());
            if self.auto_respond.load(Ordering::SeqCst) {
                self.deliver(&format!("ok:{wire_frame}"));
            }
            Ok(())
        }

        fn set_callbacks(&self, callbacks: Weak<dyn ProtocolCallbacks>) {
            *self.callbacks.lock().expect("poisoned") = Some(callbacks);
        }
    }

    struct FakeStrategy {
        protocol: Arc<FakeProtocol>,
        timeout: Duration,
    }

    impl PrinterStrategy for FakeStrategy {
        fn create_protocol(&self, _info: &PrinterInfo) -> anyhow::Result<Arc<dyn Protocol>> {
            Ok(self.protocol.clone())
        }

        fn create_adapter(&self, _info: &PrinterInfo) -> anyhow::Result<Box<dyn MessageAdapter>> {
            Ok(Box::new(FakeAdapter::default()))
        }

        fn create_file_transfer(&self, _info: &PrinterInfo) -> anyhow::Result<Option<Arc<dyn FileTransfer>>> {
            Ok(None)
        }

        fn default_timeout(&self) -> Duration {
            self.timeout
        }
    }

    fn test_info() -> PrinterInfo {
        PrinterInfo {
            printer_id: "test-printer".to_string(),
            printer_type: PrinterType::GenericFdmKlipper,
            name: None,
            ip: "127.0.0.1".to_string(),
            port: 7125,
            extra: serde_json::Value::Null,
        }
    }

    fn make_session(auto_respond: bool, timeout: Duration) -> (Arc<Session<FakeStrategy>>, Arc<FakeProtocol>) {
        let protocol = Arc::new(FakeProtocol { auto_respond: AtomicBool::new(auto_respond), ..Default::default() });
        let strategy = FakeStrategy { protocol: protocol.clone(), timeout };
        let session = Session::new(test_info(), strategy).expect("session construction should not fail");
        (session, protocol)
    }

    fn status_request() -> BizRequest {
        BizRequest::new(MethodType::GetPrinterStatus, serde_json::Value::Null)
    }

    #[tokio::test]
    async fn connect_then_request_round_trips_a_response() {
        let (session, _protocol) = make_session(true, Duration::from_millis(200));
        assert!(session.connect(ConnectPrinterParams::default()).await.is_ok());
        assert_eq!(session.connection_status(), ConnectionStatus::Connected);

        let result = session.request(status_request(), Duration::ZERO).await;
        assert!(result.is_ok());
        assert_eq!(result.data, Some(serde_json::json!({"ok": true})));
    }

    #[tokio::test]
    async fn request_before_connect_is_rejected_without_touching_the_protocol() {
        let (session, _protocol) = make_session(true, Duration::from_millis(200));
        let result = session.request(status_request(), Duration::ZERO).await;
        assert_eq!(result.code, ElinkErrorCode::NotConnected);
    }

    #[tokio::test]
    async fn request_times_out_without_a_response() {
        let (session, _protocol) = make_session(false, Duration::from_millis(30));
        let _ = session.connect(ConnectPrinterParams::default()).await;

        let result = session.request(status_request(), Duration::ZERO).await;
        assert_eq!(result.code, ElinkErrorCode::Timeout);
    }

    #[tokio::test]
    async fn a_late_response_after_timeout_is_dropped_silently() {
        let (session, protocol) = make_session(false, Duration::from_millis(20));
        let _ = session.connect(ConnectPrinterParams::default()).await;

        let result = session.request(status_request(), Duration::ZERO).await;
        assert_eq!(result.code, ElinkErrorCode::Timeout);

        // The request id the timed-out call was registered under. Delivering
        // its response now must not panic and must not resurrect the call.
        let sent_id = protocol.last_sent();
        protocol.deliver(&format!("ok:{sent_id}"));
        assert!(session.pending.is_empty());
    }

    #[tokio::test]
    async fn disconnect_cancels_an_in_flight_request() {
        let (session, _protocol) = make_session(false, Duration::from_secs(5));
        let _ = session.connect(ConnectPrinterParams::default()).await;

        let request = session.request(status_request(), Duration::from_secs(5));
        let disconnect = session.disconnect();
        let (result, _) = tokio::join!(request, disconnect);
        assert_eq!(result.code, ElinkErrorCode::Disconnected);
        assert_eq!(session.connection_status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let (session, _protocol) = make_session(true, Duration::from_millis(200));
        let _ = session.connect(ConnectPrinterParams::default()).await;
        assert!(session.disconnect().await.is_ok());
        assert!(session.disconnect().await.is_ok());
        assert_eq!(session.connection_status(), ConnectionStatus::Disconnected);
    }
}
