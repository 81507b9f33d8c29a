//! 时间显示模块
//!
//! The backend reports times two ways: upload times as float seconds since the
//! epoch, and report/chat times as ISO-8601 strings that may lack an offset.
//! Both are rendered in UTC as `YYYY-MM-DD HH:MM`.

use chrono::{DateTime, NaiveDateTime, Utc};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Formats float epoch seconds. Returns `None` for values chrono cannot represent.
pub fn format_epoch_secs(secs: f64) -> Option<String> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1e9) as u32;
    DateTime::<Utc>::from_timestamp(whole, nanos).map(|dt| dt.format(DISPLAY_FORMAT).to_string())
}

/// Formats an ISO-8601 timestamp, falling back to the raw text when it does not parse.
pub fn format_iso(ts: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc).format(DISPLAY_FORMAT).to_string();
    }
    // Python's isoformat() without tzinfo
    if let Ok(dt) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    ts.to_string()
}
