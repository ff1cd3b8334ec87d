//! Guest check end-to-end tests.

use chrono::{TimeZone, Utc};
use hvprobe::check::check_hypervguest;
use hvprobe::config::{AssetConfig, CheckConfig};
use hvprobe::transport::{
    MockQuery, MockTransport, PropertyType, PropertyValue, RawValue, TransportError,
    TransportErrorKind,
};
use hvprobe::ProbeError;
use pretty_assertions::assert_eq;

use super::common::{manager, props};

const GUID: &str = "6C3E3E1A-0D8B-4C1F-9E55-7F0C0A1B2C3D";

fn asset_config() -> AssetConfig {
    AssetConfig {
        username: Some("CORP\\svc_monitor".to_string()),
        password: Some("p@ss".to_string()),
        guid: Some(GUID.to_string()),
    }
}

fn check_config() -> CheckConfig {
    CheckConfig {
        hypervisor: Some("hv01".to_string()),
        ..CheckConfig::default()
    }
}

/// Scenario: one running guest
/// Given identity CORP\svc_monitor, secret p@ss and hypervisor hv01
/// And the hypervisor returns {Name: vm-1, EnabledState: 2, HealthState: 5, InstallDate: null}
/// When the guest check runs
/// Then the row reads {name: vm-1, EnabledState: Enabled, HealthState: OK, InstallDate: null}
/// And the session is closed
#[tokio::test]
async fn test_guest_check_end_to_end() {
    let transport = MockTransport::new().with_query(MockQuery::rows(vec![props(vec![
        ("Name", PropertyValue::string("vm-1")),
        ("EnabledState", PropertyValue::int(2)),
        ("HealthState", PropertyValue::int(5)),
        ("InstallDate", PropertyValue::null(PropertyType::String)),
    ])]));

    let result = check_hypervguest(&manager(&transport), "guest-01", &asset_config(), &check_config())
        .await
        .unwrap();

    let json = result.to_value().unwrap();
    let guest = &json["guest"][0];
    assert_eq!(guest["name"], "vm-1");
    assert_eq!(guest["EnabledState"], "Enabled");
    assert_eq!(guest["HealthState"], "OK");
    assert!(guest["InstallDate"].is_null());

    let cred = transport.last_credential().unwrap();
    assert_eq!(cred.domain(), "CORP");
    assert_eq!(cred.username(), "svc_monitor");
    assert_eq!(transport.last_host().as_deref(), Some("hv01"));

    let query = transport.last_query().unwrap();
    assert_eq!(query.namespace(), r"root\virtualization\v2");
    assert!(query.text().contains(GUID));

    let stats = transport.stats();
    assert_eq!(stats.enumerators_released, 1);
    assert_eq!(stats.services_closed, 1);
    assert_eq!(stats.connections_closed, 1);
}

#[tokio::test]
async fn test_guest_check_full_row() {
    let changed = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let transport = MockTransport::new().with_query(MockQuery::rows(vec![props(vec![
        ("InstanceID", PropertyValue::string(format!("Microsoft:{GUID}"))),
        ("ElementName", PropertyValue::string("web-frontend")),
        ("InstallDate", PropertyValue::string("20240115")),
        ("Name", PropertyValue::string(GUID)),
        (
            "OperationalStatus",
            PropertyValue::array(vec![RawValue::Int(2), RawValue::Int(32768)]),
        ),
        ("Status", PropertyValue::string("OK")),
        ("HealthState", PropertyValue::int(25)),
        ("CommunicationStatus", PropertyValue::int(2)),
        ("DetailedStatus", PropertyValue::int(1)),
        ("OperatingStatus", PropertyValue::int(12)),
        ("PrimaryStatus", PropertyValue::int(1)),
        ("EnabledState", PropertyValue::int(32768)),
        ("OtherEnabledState", PropertyValue::null(PropertyType::String)),
        ("RequestedState", PropertyValue::int(12)),
        ("EnabledDefault", PropertyValue::int(2)),
        ("TimeOfLastStateChange", PropertyValue::datetime(changed)),
        ("OnTimeInMilliseconds", PropertyValue::int(86_400_000)),
        ("ProcessID", PropertyValue::int(4242)),
        ("TimeOfLastConfigurationChange", PropertyValue::datetime(changed)),
        ("NumberOfNumaNodes", PropertyValue::null(PropertyType::Integer)),
        ("ReplicationMode", PropertyValue::int(1)),
        ("LastSuccessfulBackupTime", PropertyValue::null(PropertyType::String)),
        ("EnhancedSessionModeState", PropertyValue::int(3)),
        ("HwThreadsPerCoreRealized", PropertyValue::int(2)),
    ])]));

    let result = check_hypervguest(&manager(&transport), "guest-01", &asset_config(), &check_config())
        .await
        .unwrap();

    let json = result.to_value().unwrap();
    let guest = &json["guest"][0];
    assert_eq!(guest["ElementName"], "web-frontend");
    assert_eq!(guest["InstallDate"], 1_705_276_800);
    assert_eq!(guest["OperationalStatus"], "OK");
    assert_eq!(guest["OperationalStatusMore"], "Creating Snapshot");
    assert_eq!(guest["HealthState"], "Critical failure");
    assert_eq!(guest["CommunicationStatus"], "Communication OK");
    assert_eq!(guest["DetailedStatus"], "No Additional Information");
    assert_eq!(guest["OperatingStatus"], "Snapshotting");
    assert_eq!(guest["PrimaryStatus"], "OK");
    // 32768 (Paused) is outside the documented table
    assert!(guest["EnabledState"].is_null());
    assert_eq!(guest["RequestedState"], "Not Applicable");
    assert_eq!(guest["EnabledDefault"], "Enabled");
    assert_eq!(guest["TimeOfLastStateChange"], 1_709_280_000);
    assert_eq!(guest["TimeOfLastConfigurationChange"], 1_709_280_000);
    assert_eq!(guest["NumberOfNumaNodes"], 0);
    assert_eq!(guest["ReplicationMode"], "Primary");
    assert!(guest["LastSuccessfulBackupTime"].is_null());
    assert_eq!(guest["EnhancedSessionModeState"], "Not allowed");
    assert_eq!(guest["HwThreadsPerCoreRealized"], 2);
}

#[tokio::test]
async fn test_guest_not_found() {
    let transport = MockTransport::new().with_query(MockQuery::rows(vec![]));

    let err = check_hypervguest(&manager(&transport), "guest-01", &asset_config(), &check_config())
        .await
        .unwrap_err();

    assert_eq!(err, ProbeError::NotFound("vm not found".to_string()));
    assert!(!err.is_suppressed());
    assert_eq!(transport.stats().connections_closed, 1);
}

#[tokio::test]
async fn test_missing_hypervisor_is_config_error() {
    let transport = MockTransport::new();

    let err = check_hypervguest(
        &manager(&transport),
        "guest-01",
        &asset_config(),
        &CheckConfig::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err,
        ProbeError::Config("missing hypervisor in collector configuration".to_string())
    );
    assert_eq!(err.category(), "Configuration Error");
}

#[tokio::test]
async fn test_missing_password_suppresses_result() {
    let transport = MockTransport::new();
    let config = AssetConfig {
        password: None,
        ..asset_config()
    };

    let err = check_hypervguest(&manager(&transport), "guest-01", &config, &check_config())
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::CredentialMissing(_)));
    assert!(err.is_suppressed());
}

#[tokio::test]
async fn test_missing_guid_closes_session() {
    let transport = MockTransport::new();
    let config = AssetConfig {
        guid: None,
        ..asset_config()
    };

    let err = check_hypervguest(&manager(&transport), "guest-01", &config, &check_config())
        .await
        .unwrap_err();

    assert_eq!(err, ProbeError::MissingGuid("guest-01".to_string()));
    assert!(err.is_suppressed());
    assert_eq!(transport.stats().queries, 0);
    assert_eq!(transport.stats().connections_closed, 1);
}

#[tokio::test]
async fn test_query_timeout_closes_session() {
    let transport = MockTransport::new().with_query(MockQuery::default().then_stall());
    let config = CheckConfig {
        hypervisor: Some("hv01".to_string()),
        query_timeout_secs: 0,
    };

    let err = check_hypervguest(&manager(&transport), "guest-01", &asset_config(), &config)
        .await
        .unwrap_err();

    assert_eq!(err, ProbeError::TimedOut);
    let stats = transport.stats();
    assert_eq!(stats.enumerators_released, 1);
    assert_eq!(stats.services_closed, 1);
    assert_eq!(stats.connections_closed, 1);
}

#[tokio::test]
async fn test_unsupported_hypervisor_is_ignored() {
    let transport = MockTransport::new().with_query(MockQuery::rejected(TransportError::new(
        TransportErrorKind::InvalidNamespace,
        r"root\virtualization\v2",
    )));

    let err = check_hypervguest(&manager(&transport), "guest-01", &asset_config(), &check_config())
        .await
        .unwrap_err();

    assert_eq!(err, ProbeError::Ignored);
    assert!(err.is_suppressed());
}

#[tokio::test]
async fn test_connect_failure_reported() {
    let transport = MockTransport::new().with_connect_error(TransportError::new(
        TransportErrorKind::Io,
        "No route to host",
    ));

    let err = check_hypervguest(&manager(&transport), "guest-01", &asset_config(), &check_config())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "unable to connect: No route to host");
}
