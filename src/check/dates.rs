//! Date-string helpers for WMI properties delivered as text.

use chrono::{NaiveDate, NaiveDateTime};

/// Default format of date-only WMI strings.
pub const WMI_DATE_FORMAT: &str = "%Y%m%d";

/// Parses a WMI date string into epoch seconds (UTC).
///
/// Returns `None` for empty or unparseable input, and for instants at or
/// before the epoch, which WMI uses as "never".
pub fn parse_wmi_date(val: &str, fmt: &str) -> Option<i64> {
    if val.is_empty() {
        return None;
    }

    let parsed = NaiveDateTime::parse_from_str(val, fmt)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(val, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    let ts = parsed.and_utc().timestamp();
    (ts > 0).then_some(ts)
}
