//! Status snapshot for the shortcut subsystem

use serde::{Deserialize, Serialize};

/// Transport identifier reported in status snapshots.
pub const TRANSPORT_METHOD: &str = "dbus";

/// Point-in-time view of the shortcut subsystem.
///
/// `is_active` is racy by contract: the listener thread may exit between
/// the snapshot and whatever decision a consumer makes from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortcutStatus {
    /// Whether `start()` has succeeded and `stop()` has not yet run
    pub is_running: bool,

    /// Whether the listener thread is alive right now
    pub is_active: bool,

    /// Informational key label; the actual binding lives in compositor config
    pub primary_key: String,

    /// Transport in use, always [`TRANSPORT_METHOD`]
    pub method: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_with_documented_keys() {
        let status = ShortcutStatus {
            is_running: true,
            is_active: false,
            primary_key: "<f12>".to_string(),
            method: TRANSPORT_METHOD.to_string(),
        };

        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("is_running"));
        assert!(json.contains("is_active"));
        assert!(json.contains("primary_key"));
        assert!(json.contains("\"dbus\""));
    }
}
