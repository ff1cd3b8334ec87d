//! Shared fixtures for integration tests.

use std::sync::Arc;

use hvprobe::transport::{MockTransport, PropertySet, PropertyValue};
use hvprobe::{Session, SessionManager};

/// Builds a property set from name/value pairs.
pub fn props(pairs: Vec<(&str, PropertyValue)>) -> PropertySet {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Session manager over the given mock transport.
pub fn manager(transport: &MockTransport) -> SessionManager {
    SessionManager::new(Arc::new(transport.clone()))
}

/// Opens a session with valid credentials against `hv01`.
pub async fn open_session(transport: &MockTransport) -> Session {
    manager(transport)
        .open("guest-01", Some("CORP\\svc_monitor"), Some("p@ss"), Some("hv01"))
        .await
        .expect("mock session should open")
}
