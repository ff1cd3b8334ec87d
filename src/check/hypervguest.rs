//! Hyper-V guest state check.
//!
//! Reads one `Msvm_ComputerSystem` instance by guest GUID and translates its
//! status codes into labels.

use serde::Serialize;
use tracing::{debug, error};

use super::dates::{parse_wmi_date, WMI_DATE_FORMAT};
use super::status::{
    CommunicationStatus, DetailedStatus, EnabledDefault, EnabledState, EnhancedSessionModeState,
    HealthState, OperatingStatus, OperationalStatus, OperationalStatusMore, PrimaryStatus,
    ReplicationMode, RequestedState,
};
use crate::config::{AssetConfig, CheckConfig};
use crate::error::{ProbeError, Result};
use crate::query::{Query, QueryExecutor, ResultRow, Value};
use crate::session::SessionManager;

/// Key of the result set in the check output.
pub const TYPE_NAME: &str = "guest";

/// Namespace of the Hyper-V v2 provider.
pub const VIRTUALIZATION_NAMESPACE: &str = r"root\virtualization\v2";

const GUEST_FIELDS: &str = "InstanceID, ElementName, InstallDate, Name, \
    OperationalStatus, Status, HealthState, \
    CommunicationStatus, DetailedStatus, OperatingStatus, \
    PrimaryStatus, EnabledState, OtherEnabledState, RequestedState, \
    EnabledDefault, TimeOfLastStateChange, \
    OnTimeInMilliseconds, ProcessID, TimeOfLastConfigurationChange, \
    NumberOfNumaNodes, ReplicationMode, \
    LastSuccessfulBackupTime, EnhancedSessionModeState, \
    HwThreadsPerCoreRealized";

/// Output of the guest check.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GuestCheckResult {
    pub guest: Vec<GuestRow>,
}

impl GuestCheckResult {
    /// Convert to JSON value for the check result
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// State of one guest.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GuestRow {
    #[serde(rename = "name")]
    pub name: Option<String>,
    #[serde(rename = "InstanceID")]
    pub instance_id: Option<String>,
    pub element_name: Option<String>,
    pub install_date: Option<i64>,
    pub operational_status: Option<OperationalStatus>,
    pub operational_status_more: Option<OperationalStatusMore>,
    pub status: Option<String>,
    pub health_state: HealthState,
    pub communication_status: CommunicationStatus,
    pub detailed_status: DetailedStatus,
    pub operating_status: OperatingStatus,
    pub primary_status: PrimaryStatus,
    /// Label of the enabled state, or the free-text `OtherEnabledState`
    /// when the state is `Other`.
    pub enabled_state: Option<String>,
    pub requested_state: RequestedState,
    pub enabled_default: EnabledDefault,
    pub time_of_last_state_change: Option<i64>,
    pub on_time_in_milliseconds: Option<i64>,
    #[serde(rename = "ProcessID")]
    pub process_id: Option<i64>,
    pub time_of_last_configuration_change: Option<i64>,
    pub number_of_numa_nodes: Option<i64>,
    pub replication_mode: ReplicationMode,
    pub last_successful_backup_time: Option<i64>,
    pub enhanced_session_mode_state: EnhancedSessionModeState,
    pub hw_threads_per_core_realized: Option<i64>,
}

impl GuestRow {
    /// Builds a guest row from a normalized `Msvm_ComputerSystem` row.
    pub fn from_row(row: &ResultRow) -> Self {
        let (operational_status, operational_status_more) =
            match row.get("OperationalStatus").and_then(Value::as_list) {
                Some(codes) => (
                    codes
                        .first()
                        .and_then(Value::as_i64)
                        .map(OperationalStatus::from_code),
                    codes
                        .get(1)
                        .and_then(Value::as_i64)
                        .map(OperationalStatusMore::from_code),
                ),
                None => (None, None),
            };

        Self {
            name: text(row, "Name"),
            instance_id: text(row, "InstanceID"),
            element_name: text(row, "ElementName"),
            install_date: date(row, "InstallDate"),
            operational_status,
            operational_status_more,
            status: text(row, "Status"),
            health_state: HealthState::from_code(code(row, "HealthState")),
            communication_status: CommunicationStatus::from_code(code(row, "CommunicationStatus")),
            detailed_status: DetailedStatus::from_code(code(row, "DetailedStatus")),
            operating_status: OperatingStatus::from_code(code(row, "OperatingStatus")),
            primary_status: PrimaryStatus::from_code(code(row, "PrimaryStatus")),
            enabled_state: enabled_state(row),
            requested_state: RequestedState::from_code(code(row, "RequestedState")),
            enabled_default: EnabledDefault::from_code(code(row, "EnabledDefault")),
            time_of_last_state_change: integer(row, "TimeOfLastStateChange"),
            on_time_in_milliseconds: integer(row, "OnTimeInMilliseconds"),
            process_id: integer(row, "ProcessID"),
            time_of_last_configuration_change: integer(row, "TimeOfLastConfigurationChange"),
            number_of_numa_nodes: integer(row, "NumberOfNumaNodes"),
            replication_mode: ReplicationMode::from_code(code(row, "ReplicationMode")),
            last_successful_backup_time: date(row, "LastSuccessfulBackupTime"),
            enhanced_session_mode_state: EnhancedSessionModeState::from_code(code(
                row,
                "EnhancedSessionModeState",
            )),
            hw_threads_per_core_realized: integer(row, "HwThreadsPerCoreRealized"),
        }
    }
}

fn text(row: &ResultRow, name: &str) -> Option<String> {
    row.get(name).and_then(Value::as_str).map(String::from)
}

fn integer(row: &ResultRow, name: &str) -> Option<i64> {
    row.get(name).and_then(Value::as_i64)
}

/// Integer status code; absent codes read as 0 like NULL integers do.
fn code(row: &ResultRow, name: &str) -> i64 {
    integer(row, name).unwrap_or(0)
}

/// Dates arrive either already converted or as `yyyymmdd` text.
fn date(row: &ResultRow, name: &str) -> Option<i64> {
    match row.get(name)? {
        Value::Timestamp(ts) => (*ts > 0).then_some(*ts),
        Value::String(s) => parse_wmi_date(s, WMI_DATE_FORMAT),
        _ => None,
    }
}

fn enabled_state(row: &ResultRow) -> Option<String> {
    let state = EnabledState::from_code(code(row, "EnabledState"));
    match (state, row.get("OtherEnabledState").and_then(Value::as_str)) {
        (EnabledState::Other, Some(other)) => Some(other.to_string()),
        _ => state.label().map(String::from),
    }
}

/// Quotes a value for use inside a single-quoted WQL string literal.
fn quote_wql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Builds the guest query for `guid`.
pub fn guest_query(guid: &str, check_config: &CheckConfig) -> Query {
    Query::new(format!(
        "SELECT {GUEST_FIELDS} FROM Msvm_ComputerSystem WHERE Name = '{}'",
        quote_wql(guid)
    ))
    .with_namespace(VIRTUALIZATION_NAMESPACE)
    .with_timeout(check_config.query_timeout())
}

/// Runs the guest check for one asset.
pub async fn check_hypervguest(
    manager: &SessionManager,
    asset: &str,
    asset_config: &AssetConfig,
    check_config: &CheckConfig,
) -> Result<GuestCheckResult> {
    let session = manager
        .open(
            asset,
            asset_config.username.as_deref(),
            asset_config.password.as_deref(),
            check_config.hypervisor.as_deref(),
        )
        .await?;

    let Some(guid) = asset_config.guid.as_deref() else {
        error!("missing guid for {}", asset);
        session.close();
        return Err(ProbeError::MissingGuid(asset.to_string()));
    };

    let query = guest_query(guid, check_config);
    let result = QueryExecutor::new(&session).execute(&query).await;
    session.close();

    let rows = result?;
    if rows.is_empty() {
        return Err(ProbeError::NotFound("vm not found".to_string()));
    }

    debug!("Guest check for {} returned {} rows", asset, rows.len());
    Ok(GuestCheckResult {
        guest: rows.iter().map(GuestRow::from_row).collect(),
    })
}
