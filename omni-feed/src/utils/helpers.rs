use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

/// Bogotá has no DST, so a fixed offset is exact.
const BOGOTA_OFFSET_SECS: i32 = -5 * 3600;

/// Epoch values above this are treated as milliseconds
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Current time as an RFC 3339 string
pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

/// Identity for a reply appended locally before the store echoes it back
pub fn local_reply_id() -> String {
    format!("local-{}", Utc::now().timestamp_millis())
}

pub fn bogota() -> FixedOffset {
    FixedOffset::east_opt(BOGOTA_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Parse the timestamp shapes the store and socket emit: RFC 3339, naive
/// ISO (assumed UTC) and epoch seconds or milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }

    let epoch: i64 = raw.parse().ok()?;
    let utc = if epoch.abs() >= MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(epoch).single()?
    } else {
        Utc.timestamp_opt(epoch, 0).single()?
    };
    Some(utc.fixed_offset())
}

/// Render a timestamp in Bogotá time, or echo it verbatim when unparseable.
pub fn format_bogota(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.with_timezone(&bogota()).format("%Y-%m-%d %H:%M").to_string(),
        None => raw.to_string(),
    }
}
