use chrono::{DateTime, FixedOffset};

use crate::error::{FlowError, Result};

/// chrono pattern for the tracker's timestamps, e.g. `2024-01-02T09:30:00.000+0000`.
pub const TRACKER_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Parse a tracker timestamp into a timezone-aware instant.
///
/// Accepted shape: `YYYY-MM-DDTHH:MM:SS.f±HHMM` with 1 to 6 fraction digits and a
/// four-digit offset without colon. `Z`, colon offsets and missing fractions are
/// rejected; there is no fallback to looser ISO 8601 parsing.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
    if let Some(reason) = shape_violation(value) {
        return Err(invalid(value, reason));
    }

    DateTime::parse_from_str(value, TRACKER_TIMESTAMP_FORMAT)
        .map_err(|err| invalid(value, &err.to_string()))
}

fn invalid(value: &str, reason: &str) -> FlowError {
    FlowError::Parse {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

// chrono's `%.f` and `%z` are lenient; enforce the exact tail here.
fn shape_violation(value: &str) -> Option<&'static str> {
    let Some((_, tail)) = value.rsplit_once('.') else {
        return Some("missing fractional seconds");
    };

    let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
    if !(1..=6).contains(&digits) {
        return Some("fractional seconds must have 1 to 6 digits");
    }

    let offset = &tail[digits..];
    let well_formed = offset.len() == 5
        && offset.starts_with(['+', '-'])
        && offset[1..].bytes().all(|byte| byte.is_ascii_digit());
    if !well_formed {
        return Some("offset must be +HHMM or -HHMM");
    }

    None
}
