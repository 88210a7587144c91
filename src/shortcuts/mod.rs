//! Global shortcut handling via D-Bus
//!
//! Publishes a session-bus endpoint the compositor keybinding can call
//! instead of the daemon capturing keys itself. The controller owns the
//! listener thread; the endpoint dispatches each trigger to the registered
//! handler on its own detached thread.

mod controller;
mod endpoint;
mod status;

pub use controller::{ShortcutController, ShortcutError};
pub use endpoint::{EndpointService, TriggerHandler, BUS_NAME, OBJECT_PATH};
pub use status::{ShortcutStatus, TRANSPORT_METHOD};
