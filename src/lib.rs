//! `elink`: a LAN-side client library for discovering, connecting to, and
//! commanding 3D printers across several vendor protocols behind one
//! uniform session API.
//!
//! The three families a caller actually touches are [`types`] (the
//! business data model), [`registry::Registry`] (the top-level printer
//! collection), and [`factory::SessionHandle`] (a single printer's
//! session, however it was obtained). Everything under [`ports`] and
//! [`session`] is the engine powering them; most callers never name those
//! types directly.

pub mod error;
pub mod factory;
mod pending;
pub mod ports;
pub mod registry;
pub mod session;
pub mod types;
mod util;

pub use error::{BizResult, ElinkErrorCode, VoidResult};
pub use factory::{create_session, SessionHandle};
pub use registry::{ConnectionCallback, Registry};
pub use session::EventCallback;
pub use types::{
    BizEvent, BizRequest, ConnectPrinterParams, ConnectionStatus, GetCanvasStatusParams,
    GetCanvasStatusResult, MethodType, PrinterAttributesParams, PrinterAttributesResult,
    PrinterBaseParams, PrinterInfo, PrinterStatusParams, PrinterStatusResult, PrinterType,
    SetAutoRefillParams, StartPrintParams, UpdatePrinterNameParams, DEFAULT_REQUEST_TIMEOUT,
};
