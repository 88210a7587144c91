//! D-Bus endpoint for the dictation trigger
//!
//! Exposes a single `Trigger` method on the session bus. Compositor
//! keybindings (e.g. Hyprland's `bindd = ..., exec, gdbus call ...`)
//! invoke it to start dictation in the running daemon.

use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, info, warn};

/// Well-known bus name the service is published under.
pub const BUS_NAME: &str = "com.hyprwhspr.Dictation";

/// Object path the service is served at.
pub const OBJECT_PATH: &str = "/com/hyprwhspr/Dictation";

/// The unit of work invoked on each trigger.
pub type TriggerHandler = Arc<dyn Fn() + Send + Sync + 'static>;

/// Handler cell shared between the controller and the published service.
/// The controller writes it from the main thread, the service reads it on
/// every inbound call.
pub(crate) type SharedHandler = Arc<Mutex<Option<TriggerHandler>>>;

/// The object served on the session bus.
///
/// Stateless apart from the handler cell; created and dropped with the
/// listener thread that serves it.
pub struct EndpointService {
    handler: SharedHandler,
}

impl EndpointService {
    pub(crate) fn new(handler: SharedHandler) -> Self {
        Self { handler }
    }

    /// Snapshot the current handler without holding the lock across the call.
    fn current_handler(&self) -> Option<TriggerHandler> {
        self.handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[zbus::interface(name = "com.hyprwhspr.Dictation")]
impl EndpointService {
    /// Inbound trigger from the compositor keybinding.
    ///
    /// Always succeeds from the caller's perspective. The handler runs on
    /// its own detached thread so the bus dispatch loop is never blocked;
    /// back-to-back calls each get their own thread, with no queuing and
    /// no deduplication.
    pub(crate) fn trigger(&self) {
        info!("D-Bus trigger received");

        let Some(handler) = self.current_handler() else {
            debug!("no trigger handler registered, ignoring");
            return;
        };

        let spawned = thread::Builder::new()
            .name("trigger-handler".to_string())
            .spawn(move || handler());

        if let Err(e) = spawned {
            warn!(?e, "failed to spawn trigger handler thread");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    fn shared(handler: Option<TriggerHandler>) -> SharedHandler {
        Arc::new(Mutex::new(handler))
    }

    fn counting_handler(counter: Arc<AtomicUsize>) -> TriggerHandler {
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// Poll until `condition` holds or a one-second deadline passes.
    fn wait_for(condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(1);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    #[test]
    fn trigger_without_handler_is_a_noop() {
        let service = EndpointService::new(shared(None));
        service.trigger();
    }

    #[test]
    fn trigger_invokes_registered_handler() {
        let counter = Arc::new(AtomicUsize::new(0));
        let service = EndpointService::new(shared(Some(counting_handler(counter.clone()))));

        service.trigger();

        assert!(wait_for(|| counter.load(Ordering::SeqCst) == 1));
    }

    #[test]
    fn rapid_triggers_each_dispatch_independently() {
        let counter = Arc::new(AtomicUsize::new(0));
        let service = EndpointService::new(shared(Some(counting_handler(counter.clone()))));

        for _ in 0..5 {
            service.trigger();
        }

        assert!(wait_for(|| counter.load(Ordering::SeqCst) == 5));
    }

    #[test]
    fn handler_swap_applies_to_later_triggers() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let cell = shared(Some(counting_handler(first.clone())));
        let service = EndpointService::new(Arc::clone(&cell));

        service.trigger();
        assert!(wait_for(|| first.load(Ordering::SeqCst) == 1));

        *cell.lock().unwrap() = Some(counting_handler(second.clone()));

        service.trigger();
        assert!(wait_for(|| second.load(Ordering::SeqCst) == 1));
        assert_eq!(first.load(Ordering::SeqCst), 1);
    }
}
