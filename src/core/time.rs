//! Shared timestamp/envelope helpers.

use chrono::{SecondsFormat, Utc};
use serde_json::Value as JsonValue;

/// Current UTC time as ISO-8601 with millisecond precision
/// (e.g. `2026-03-14T09:26:53.589Z`).
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Standard command response envelope shape used by the JSON CLI output.
pub fn command_envelope(cmd: &str, status: &str, extra: JsonValue) -> JsonValue {
    let mut base = serde_json::json!({
        "envelope_version": "1.0.0",
        "ts": now_iso8601(),
        "cmd": cmd,
        "status": status
    });
    if let (Some(base_obj), Some(extra_obj)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in extra_obj {
            base_obj.insert(k.clone(), v.clone());
        }
    }
    base
}
