use chrono::NaiveDateTime;

pub mod orders;
pub mod users;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a stored timestamp the way both services expose it on the wire.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
