//! Lifecycle management for the dictation trigger endpoint
//!
//! The controller owns a dedicated listener thread that serves the
//! [`EndpointService`] on the session bus until told to stop. The hosting
//! application treats it as a managed subsystem: start, stop, swap the
//! handler, query status.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use super::endpoint::{EndpointService, SharedHandler, TriggerHandler, BUS_NAME, OBJECT_PATH};
use super::status::{ShortcutStatus, TRANSPORT_METHOD};

/// How often the bus loop checks for a stop request.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long `stop()` waits for the listener thread before giving up.
const STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// Errors internal to the shortcut subsystem.
///
/// These never reach the hosting application: bus faults are logged from
/// the listener thread, join faults are logged from `stop()`.
#[derive(Debug, thiserror::Error)]
pub enum ShortcutError {
    #[error("D-Bus connection error: {0}")]
    Bus(#[from] zbus::Error),

    #[error("failed to build listener runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("listener thread did not exit within {STOP_TIMEOUT:?}")]
    JoinTimeout,

    #[error("listener thread panicked")]
    ListenerPanicked,
}

/// Manages the publish/run/teardown lifecycle of the trigger endpoint.
///
/// One instance per process, constructed at startup and kept for the
/// process lifetime. `start()` and `stop()` are idempotent and expected
/// to be called from a single controlling thread; `set_callback` and
/// `status` may be called from anywhere.
pub struct ShortcutController {
    /// Informational label only; never affects bus routing
    primary_key: Mutex<String>,
    handler: SharedHandler,
    running: Arc<AtomicBool>,
    listener_thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl ShortcutController {
    /// Create a new controller.
    ///
    /// `device_path` is accepted for parity with evdev-based shortcut
    /// backends but has no effect on the D-Bus backend.
    pub fn new(
        primary_key: impl Into<String>,
        handler: Option<TriggerHandler>,
        device_path: Option<&Path>,
    ) -> Self {
        let primary_key = primary_key.into();

        info!(key = %primary_key, "global shortcuts initialized, using D-Bus");
        if let Some(path) = device_path {
            debug!(?path, "device path ignored by the D-Bus backend");
        }

        Self {
            primary_key: Mutex::new(primary_key),
            handler: Arc::new(Mutex::new(handler)),
            running: Arc::new(AtomicBool::new(false)),
            listener_thread: Mutex::new(None),
        }
    }

    /// Start serving the trigger endpoint. Idempotent.
    ///
    /// Returns immediately without waiting for the bus publish: `true`
    /// means the listener thread was spawned (or was already running),
    /// not that the endpoint is reachable yet. Connection and publish
    /// failures are logged from the listener thread and clear the running
    /// flag, so `is_active()` eventually reflects them.
    pub fn start(&self) -> bool {
        if self.running.load(Ordering::SeqCst) {
            return true;
        }

        let handler = Arc::clone(&self.handler);
        let running = Arc::clone(&self.running);

        self.running.store(true, Ordering::SeqCst);

        let spawned = thread::Builder::new()
            .name("dbus-listener".to_string())
            .spawn(move || {
                if let Err(e) = run_bus_loop(handler, Arc::clone(&running)) {
                    error!(?e, "D-Bus listener error");
                }
                running.store(false, Ordering::SeqCst);
                debug!("D-Bus listener thread exited");
            });

        match spawned {
            Ok(handle) => {
                *lock_unpoisoned(&self.listener_thread) = Some(handle);
                let key = lock_unpoisoned(&self.primary_key).clone();
                info!(key = %key, "global shortcuts started, listening via D-Bus");
                true
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                error!(?e, "failed to spawn D-Bus listener thread");
                false
            }
        }
    }

    /// Stop serving and join the listener thread. Idempotent.
    ///
    /// Blocks for at most [`STOP_TIMEOUT`]; a thread that fails to exit in
    /// time is abandoned and logged, never propagated.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        let handle = lock_unpoisoned(&self.listener_thread).take();
        if let Some(handle) = handle {
            if let Err(e) = join_with_timeout(handle, STOP_TIMEOUT) {
                warn!(?e, "error stopping D-Bus listener");
            }
        }

        info!("global shortcuts stopped");
    }

    /// Whether the endpoint is currently being served.
    ///
    /// Point-in-time check: the listener thread may exit right after it.
    pub fn is_active(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && lock_unpoisoned(&self.listener_thread)
                .as_ref()
                .map(|handle| !handle.is_finished())
                .unwrap_or(false)
    }

    /// Replace the trigger handler.
    ///
    /// Takes effect for every trigger dispatched after the swap, without
    /// restarting the service. A trigger already in flight keeps the
    /// handler it read.
    pub fn set_callback(&self, handler: TriggerHandler) {
        *self
            .handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handler);
        debug!("trigger handler updated");
    }

    /// Update the informational key label. Always succeeds.
    ///
    /// The bus endpoint identity never depends on this label; the actual
    /// key-to-trigger binding lives in the compositor configuration.
    pub fn update_shortcut(&self, new_key: impl Into<String>) -> bool {
        let new_key = new_key.into();
        info!(key = %new_key, "updated shortcut label, remember to update your compositor bindings");
        *lock_unpoisoned(&self.primary_key) = new_key;
        true
    }

    /// Snapshot the current state of the subsystem.
    pub fn status(&self) -> ShortcutStatus {
        ShortcutStatus {
            is_running: self.running.load(Ordering::SeqCst),
            is_active: self.is_active(),
            primary_key: lock_unpoisoned(&self.primary_key).clone(),
            method: TRANSPORT_METHOD.to_string(),
        }
    }
}

impl Drop for ShortcutController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Serve the endpoint on the session bus until `running` is cleared.
///
/// Runs on the dedicated listener thread with its own current-thread
/// runtime; zbus dispatches inbound calls while this loop sleeps.
fn run_bus_loop(handler: SharedHandler, running: Arc<AtomicBool>) -> Result<(), ShortcutError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let connection = zbus::connection::Builder::session()?
            .name(BUS_NAME)?
            .serve_at(OBJECT_PATH, EndpointService::new(handler))?
            .build()
            .await?;

        info!(name = BUS_NAME, path = OBJECT_PATH, "D-Bus service published");

        while running.load(Ordering::SeqCst) {
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        connection.graceful_shutdown().await;
        Ok(())
    })
}

/// Join a thread, bailing out after `timeout`.
fn join_with_timeout(handle: thread::JoinHandle<()>, timeout: Duration) -> Result<(), ShortcutError> {
    let deadline = Instant::now() + timeout;

    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return Err(ShortcutError::JoinTimeout);
        }
        thread::sleep(Duration::from_millis(10));
    }

    handle.join().map_err(|_| ShortcutError::ListenerPanicked)
}
