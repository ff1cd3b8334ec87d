//! Session lifecycle integration tests.

use std::time::Duration;

use hvprobe::transport::{MockTransport, TransportError, TransportErrorKind};
use hvprobe::ProbeError;

use super::common::{manager, open_session};

#[tokio::test]
async fn test_session_released_once_on_close() {
    let transport = MockTransport::new();
    let session = open_session(&transport).await;

    session.close();

    let stats = transport.stats();
    assert_eq!(stats.connects, 1);
    assert_eq!(stats.negotiations, 1);
    assert_eq!(stats.services_closed, 1);
    assert_eq!(stats.connections_closed, 1);
}

#[tokio::test]
async fn test_upn_identity_reaches_transport() {
    let transport = MockTransport::new();
    let session = manager(&transport)
        .open("guest-01", Some("svc_monitor@corp.local"), Some("p@ss"), Some("hv01"))
        .await
        .unwrap();

    let cred = transport.last_credential().unwrap();
    assert_eq!(cred.domain(), "corp.local");
    assert_eq!(cred.username(), "svc_monitor");
    assert_eq!(cred.password(), "p@ss");
    session.close();
}

/// Scenario: missing secret for an asset
/// Given an asset with a username but no password
/// When a session is opened
/// Then CredentialMissing is returned and the result is suppressed
/// And no connection is attempted
#[tokio::test]
async fn test_missing_secret_suppresses_result() {
    let transport = MockTransport::new();
    let err = manager(&transport)
        .open("guest-01", Some("CORP\\svc_monitor"), None, Some("hv01"))
        .await
        .unwrap_err();

    assert_eq!(err, ProbeError::CredentialMissing("guest-01".to_string()));
    assert!(err.is_suppressed());
    assert_eq!(transport.stats().connects, 0);
}

#[tokio::test]
async fn test_auth_failure_leaves_no_open_connection() {
    let transport = MockTransport::new()
        .with_auth_error(TransportError::new(TransportErrorKind::AccessDenied, ""));
    let err = manager(&transport)
        .open("guest-01", Some("CORP\\svc_monitor"), Some("bad"), Some("hv01"))
        .await
        .unwrap_err();

    assert_eq!(err, ProbeError::Auth("AccessDenied".to_string()));
    let stats = transport.stats();
    assert_eq!(stats.connects, stats.connections_closed);
}

#[tokio::test]
async fn test_abandoned_open_leaves_no_open_connection() {
    let transport = MockTransport::new().with_stalled_auth();

    let result = tokio::time::timeout(
        Duration::from_millis(20),
        manager(&transport).open("guest-01", Some("CORP\\svc_monitor"), Some("p@ss"), Some("hv01")),
    )
    .await;

    assert!(result.is_err());
    let stats = transport.stats();
    assert_eq!(stats.connects, 1);
    assert_eq!(stats.connects, stats.connections_closed);
}

#[tokio::test]
async fn test_concurrent_sessions_are_independent() {
    let transport = MockTransport::new();
    let mgr = manager(&transport);

    let (a, b) = tokio::join!(
        mgr.open("guest-01", Some("svc"), Some("secret"), Some("hv01")),
        mgr.open("guest-02", Some("svc"), Some("secret"), Some("hv01")),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.host(), "guest-01");
    assert_eq!(b.host(), "guest-02");

    a.close();
    assert_eq!(transport.stats().connections_closed, 1);
    b.close();
    assert_eq!(transport.stats().connections_closed, 2);
}
