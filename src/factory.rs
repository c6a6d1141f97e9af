//! Session factory (C6): dispatches a [`PrinterInfo`] to the right
//! [`PrinterStrategy`] and returns a type-erased handle. Grounded on
//! `original_source/printer_factory.cpp`'s `PrinterFactory::createPrinter`.

use crate::ports::FileTransfer;
use crate::session::{
    ElegooCc2Strategy, ElegooCcStrategy, MoonrakerStrategy, EventCallback, Session,
};
use crate::types::{
    ConnectPrinterParams, ConnectionStatus, GetCanvasStatusParams, GetCanvasStatusResult,
    PrinterAttributesParams, PrinterAttributesResult, PrinterBaseParams, PrinterInfo, PrinterStatusParams,
    PrinterStatusResult, PrinterType, SetAutoRefillParams, StartPrintParams, UpdatePrinterNameParams,
};
use crate::util::mask_id;
use crate::error::{BizResult, VoidResult};
use std::sync::Arc;
use std::time::Duration;

/// A type-erased, cheaply-cloneable handle to a running session. The
/// concrete `Session<S>` type is an implementation detail of the factory;
/// callers only see this enum (spec.md §4.6, "callers never name the
/// strategy type").
#[derive(Clone)]
pub enum SessionHandle {
    ElegooCc(Arc<Session<ElegooCcStrategy>>),
    ElegooCc2(Arc<Session<ElegooCc2Strategy>>),
    Moonraker(Arc<Session<MoonrakerStrategy>>),
}

/// Dispatches a synchronous accessor to whichever concrete session the
/// handle wraps.
macro_rules! forward {
    ($self:expr, $method:ident ($($arg:expr),*)) => {
        match $self {
            SessionHandle::ElegooCc(session) => session.$method($($arg),*),
            SessionHandle::ElegooCc2(session) => session.$method($($arg),*),
            SessionHandle::Moonraker(session) => session.$method($($arg),*),
        }
    };
}

/// Same dispatch for an `async fn`. Each arm's `.await` must happen
/// *inside* the match: the three concrete sessions produce distinct
/// opaque future types, which only unify once collapsed to their common
/// `Output`.
macro_rules! forward_async {
    ($self:expr, $method:ident ($($arg:expr),*)) => {
        match $self {
            SessionHandle::ElegooCc(session) => session.$method($($arg),*).await,
            SessionHandle::ElegooCc2(session) => session.$method($($arg),*).await,
            SessionHandle::Moonraker(session) => session.$method($($arg),*).await,
        }
    };
}

impl SessionHandle {
    pub fn printer_id(&self) -> &str {
        forward!(self, printer_id())
    }

    pub fn printer_info(&self) -> &PrinterInfo {
        forward!(self, printer_info())
    }

    pub fn is_connected(&self) -> bool {
        forward!(self, is_connected())
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        forward!(self, connection_status())
    }

    pub fn file_transfer(&self) -> Option<Arc<dyn FileTransfer>> {
        forward!(self, file_transfer())
    }

    pub fn set_event_callback(&self, callback: Option<EventCallback>) {
        forward!(self, set_event_callback(callback))
    }

    pub async fn connect(&self, params: ConnectPrinterParams) -> VoidResult {
        forward_async!(self, connect(params))
    }

    pub async fn disconnect(&self) -> VoidResult {
        forward_async!(self, disconnect())
    }

    pub async fn start_print(&self, params: StartPrintParams, timeout: Duration) -> VoidResult {
        forward_async!(self, start_print(params, timeout))
    }

    pub async fn pause_print(&self, params: PrinterBaseParams, timeout: Duration) -> VoidResult {
        forward_async!(self, pause_print(params, timeout))
    }

    pub async fn resume_print(&self, params: PrinterBaseParams, timeout: Duration) -> VoidResult {
        forward_async!(self, resume_print(params, timeout))
    }

    pub async fn stop_print(&self, params: PrinterBaseParams, timeout: Duration) -> VoidResult {
        forward_async!(self, stop_print(params, timeout))
    }

    pub async fn set_auto_refill(&self, params: SetAutoRefillParams, timeout: Duration) -> VoidResult {
        forward_async!(self, set_auto_refill(params, timeout))
    }

    pub async fn get_printer_attributes(&self, params: PrinterAttributesParams, timeout: Duration) -> BizResult<PrinterAttributesResult> {
        forward_async!(self, get_printer_attributes(params, timeout))
    }

    pub async fn get_printer_status(&self, params: PrinterStatusParams, timeout: Duration) -> BizResult<PrinterStatusResult> {
        forward_async!(self, get_printer_status(params, timeout))
    }

    pub async fn get_canvas_status(&self, params: GetCanvasStatusParams, timeout: Duration) -> BizResult<GetCanvasStatusResult> {
        forward_async!(self, get_canvas_status(params, timeout))
    }

    pub async fn update_printer_name(&self, params: UpdatePrinterNameParams, timeout: Duration) -> VoidResult {
        forward_async!(self, update_printer_name(params, timeout))
    }
}

/// Constructs the session matching `info.printer_type`, wiring its ports
/// via the strategy's factory hooks. Returns `None` on an unsupported
/// type or a collaborator construction failure — both are logged, neither
/// is a panic (spec.md §4.6).
pub fn create_session(info: PrinterInfo) -> Option<SessionHandle> {
    let printer_id = info.printer_id.clone();
    let handle = match info.printer_type {
        PrinterType::ElegooFdmCc2 => {
            log::debug!("[{}] creating Elegoo CC2 session", mask_id(&printer_id));
            Session::new(info, ElegooCc2Strategy).map(SessionHandle::ElegooCc2)
        }
        PrinterType::ElegooFdmCc => {
            log::debug!("[{}] creating Elegoo CC session", mask_id(&printer_id));
            Session::new(info, ElegooCcStrategy).map(SessionHandle::ElegooCc)
        }
        PrinterType::ElegooFdmKlipper | PrinterType::GenericFdmKlipper => {
            log::debug!("[{}] creating Moonraker session for Klipper printer", mask_id(&printer_id));
            Session::new(info, MoonrakerStrategy).map(SessionHandle::Moonraker)
        }
        PrinterType::Unknown => {
            log::error!("[{}] unsupported printer type", mask_id(&printer_id));
            return None;
        }
    };

    match handle {
        Ok(handle) => Some(handle),
        Err(err) => {
            log::error!("[{}] failed to create session: {err}", mask_id(&printer_id));
            None
        }
    }
}
