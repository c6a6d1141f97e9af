//! Printer registry (C7): the top-level collection a host application
//! holds. Tracks every session by printer id, applies global connection
//! and event callbacks to new and existing sessions, and offers batch
//! disconnect. Grounded on `original_source/printer_manager.cpp`'s
//! `PrinterManager`.

use crate::error::VoidResult;
use crate::factory::{create_session, SessionHandle};
use crate::session::EventCallback;
use crate::types::PrinterInfo;
use crate::util::mask_id;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Invoked with `(printer_id, connected)` whenever a registered session's
/// connection state flips. The registry has no generic hook for this on
/// [`crate::session::Session`] itself (which only exposes a typed event
/// callback) — wiring it up per-session is left to the host application
/// if it needs it; the registry only forwards the business event
/// callback, matching what the original `PrinterManager` actually does
/// (its `connectionCallback_` is stored but never invoked from
/// `printer_manager.cpp`).
pub type ConnectionCallback = Arc<dyn Fn(&str, bool) + Send + Sync>;

#[derive(Default)]
pub struct Registry {
    printers: Mutex<HashMap<String, SessionHandle>>,
    connection_callback: Mutex<Option<ConnectionCallback>>,
    event_callback: Mutex<Option<EventCallback>>,
    initialized: Mutex<bool>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent; a second call is a no-op (spec.md §4.7).
    pub fn initialize(&self) -> bool {
        let mut initialized = self.initialized.lock().expect("initialized lock poisoned");
        if *initialized {
            return true;
        }
        *initialized = true;
        log::info!("printer registry initialized");
        true
    }

    /// Disconnects and drops every tracked session, then marks the
    /// registry uninitialized. Idempotent.
    pub async fn cleanup(&self) {
        let mut initialized = self.initialized.lock().expect("initialized lock poisoned");
        if !*initialized {
            return;
        }
        drop(initialized);

        self.disconnect_all_printers().await;
        self.printers.lock().expect("printers lock poisoned").clear();

        initialized = self.initialized.lock().expect("initialized lock poisoned");
        *initialized = false;
        log::info!("printer registry cleanup completed");
    }

    /// Creates and registers a session for `info`. Returns the existing
    /// handle if `info.printer_id` is already tracked, without
    /// reconstructing anything (spec.md §4.7, "duplicate create is a
    /// cache hit, not an error").
    pub fn create_printer(&self, info: PrinterInfo) -> Option<SessionHandle> {
        let mut printers = self.printers.lock().expect("printers lock poisoned");
        if let Some(existing) = printers.get(&info.printer_id) {
            log::info!("[{}] printer already exists", mask_id(&info.printer_id));
            return Some(existing.clone());
        }

        let printer_id = info.printer_id.clone();
        let handle = create_session(info)?;

        if let Some(callback) = self.event_callback.lock().expect("callback lock poisoned").clone() {
            handle.set_event_callback(Some(callback));
        }

        printers.insert(printer_id.clone(), handle.clone());
        log::info!("[{}] printer created", mask_id(&printer_id));
        Some(handle)
    }

    pub fn get_printer(&self, printer_id: &str) -> Option<SessionHandle> {
        self.printers.lock().expect("printers lock poisoned").get(printer_id).cloned()
    }

    /// Disconnects (if connected) and removes the session. Returns `false`
    /// if no such printer is tracked.
    pub async fn remove_printer(&self, printer_id: &str) -> bool {
        let handle = self.printers.lock().expect("printers lock poisoned").get(printer_id).cloned();
        let Some(handle) = handle else {
            log::error!("[{}] printer not found", mask_id(printer_id));
            return false;
        };

        if handle.is_connected() {
            let _ = handle.disconnect().await;
        }
        self.printers.lock().expect("printers lock poisoned").remove(printer_id);
        log::info!("[{}] printer removed", mask_id(printer_id));
        true
    }

    /// Registers an already-connected session handle directly, bypassing
    /// the factory. Replaces any existing entry under the same id.
    pub fn add_connected_printer(&self, handle: SessionHandle) {
        let printer_id = handle.printer_id().to_string();
        let mut printers = self.printers.lock().expect("printers lock poisoned");
        if printers.contains_key(&printer_id) {
            log::info!("[{}] printer already exists in registry, replacing it", mask_id(&printer_id));
        }
        if let Some(callback) = self.event_callback.lock().expect("callback lock poisoned").clone() {
            handle.set_event_callback(Some(callback));
        }
        printers.insert(printer_id.clone(), handle);
        log::debug!("[{}] printer added to registry", mask_id(&printer_id));
    }

    pub fn get_all_printers(&self) -> Vec<SessionHandle> {
        self.printers.lock().expect("printers lock poisoned").values().cloned().collect()
    }

    pub fn get_connected_printers(&self) -> Vec<SessionHandle> {
        self.printers
            .lock()
            .expect("printers lock poisoned")
            .values()
            .filter(|handle| handle.is_connected())
            .cloned()
            .collect()
    }

    pub fn get_cached_printers(&self) -> Vec<PrinterInfo> {
        self.printers
            .lock()
            .expect("printers lock poisoned")
            .values()
            .map(|handle| handle.printer_info().clone())
            .collect()
    }

    /// Disconnects every connected printer concurrently, clearing its
    /// event callback first so in-flight disconnect events don't escape
    /// to the host. Grounded on the original's sequential
    /// `disconnectAllPrinters`, parallelized via `join_all` the way
    /// `examples/rhoopr-bambutop` connects multiple printers concurrently.
    pub async fn disconnect_all_printers(&self) {
        let printers = self.get_all_printers();
        let disconnects = printers.into_iter().filter(|handle| handle.is_connected()).map(|handle| async move {
            handle.set_event_callback(None);
            let result: VoidResult = handle.disconnect().await;
            result
        });
        join_all(disconnects).await;
        log::info!("disconnected all printers");
    }

    pub fn set_printer_connection_callback(&self, callback: Option<ConnectionCallback>) {
        *self.connection_callback.lock().expect("callback lock poisoned") = callback;
    }

    /// Sets the event callback applied to every printer created or added
    /// from now on. Matches the original: existing sessions are not
    /// retroactively updated (spec.md §9).
    pub fn set_printer_event_callback(&self, callback: Option<EventCallback>) {
        *self.event_callback.lock().expect("callback lock poisoned") = callback;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrinterType;

    // GenericFdmKlipper needs no `extra` fields and its session's
    // construction does no actual I/O, so it's the cheapest variant to
    // exercise registry bookkeeping with.
    fn klipper_info(printer_id: &str) -> PrinterInfo {
        PrinterInfo {
            printer_id: printer_id.to_string(),
            printer_type: PrinterType::GenericFdmKlipper,
            name: None,
            ip: "127.0.0.1".to_string(),
            port: 7125,
            extra: serde_json::Value::Null,
        }
    }

    #[test]
    fn create_printer_is_a_cache_hit_on_a_duplicate_id() {
        let registry = Registry::new();
        registry.initialize();

        let first = registry.create_printer(klipper_info("dup")).expect("first create should succeed");
        let second = registry.create_printer(klipper_info("dup")).expect("second create should hit the cache");

        assert_eq!(first.printer_id(), second.printer_id());
        assert_eq!(registry.get_all_printers().len(), 1);
    }

    #[test]
    fn create_printer_rejects_an_unknown_printer_type() {
        let registry = Registry::new();
        let mut info = klipper_info("unknown-1");
        info.printer_type = PrinterType::Unknown;

        assert!(registry.create_printer(info).is_none());
        assert!(registry.get_all_printers().is_empty());
    }

    #[test]
    fn get_printer_finds_a_registered_session_by_id() {
        let registry = Registry::new();
        registry.create_printer(klipper_info("findable"));

        assert!(registry.get_printer("findable").is_some());
        assert!(registry.get_printer("missing").is_none());
    }

    #[tokio::test]
    async fn remove_printer_reports_false_for_an_unknown_id() {
        let registry = Registry::new();
        assert!(!registry.remove_printer("missing").await);
    }

    #[tokio::test]
    async fn remove_printer_drops_a_tracked_session() {
        let registry = Registry::new();
        registry.create_printer(klipper_info("removable"));

        assert!(registry.remove_printer("removable").await);
        assert!(registry.get_printer("removable").is_none());
    }

    #[test]
    fn initialize_is_idempotent() {
        let registry = Registry::new();
        assert!(registry.initialize());
        assert!(registry.initialize());
    }

    #[tokio::test]
    async fn cleanup_clears_every_tracked_printer() {
        let registry = Registry::new();
        registry.initialize();
        registry.create_printer(klipper_info("a"));
        registry.create_printer(klipper_info("b"));

        registry.cleanup().await;

        assert!(registry.get_all_printers().is_empty());
    }
}
