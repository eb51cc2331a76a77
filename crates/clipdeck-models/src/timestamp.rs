//! Time codec for clip boundaries.
//!
//! Converts between seconds and the strings shown in (and typed into) the
//! editor: `H:MM:SS` for anything an hour or longer, `M:SS` otherwise.
//! Parsing is forgiving: input that cannot be understood
//! collapses to `0` instead of erroring, and the clip validation rules are
//! what reject the resulting range.

/// Seconds in one hour; the threshold for switching to `H:MM:SS`.
const SECS_PER_HOUR: u64 = 3600;

/// Format seconds for display and for prefilling time inputs.
///
/// Fractional seconds are truncated, never rounded.
///
/// # Examples
/// ```
/// use clipdeck_models::timestamp::format_display;
/// assert_eq!(format_display(65.9), "1:05");
/// assert_eq!(format_display(3725.0), "1:02:05");
/// ```
pub fn format_display(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let hours = total / SECS_PER_HOUR;
    let mins = (total % SECS_PER_HOUR) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Format seconds as `M:SS` without folding minutes into hours.
///
/// Used by the viewer's progress readout (`125:00` rather than `2:05:00`).
pub fn format_minutes(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!("{}:{:02}", total / 60, total % 60)
}

/// Parse a user-typed time into seconds.
///
/// - empty or whitespace-only input is `0`
/// - colon-free numeric input is read as raw (fractional) seconds
/// - `M:SS` and `H:MM:SS` are read component-wise as integers
/// - anything else, any component without leading digits, or a total that
///   overflows is `0`
///
/// # Examples
/// ```
/// use clipdeck_models::timestamp::parse_time_input;
/// assert_eq!(parse_time_input("90.5"), 90.5);
/// assert_eq!(parse_time_input("5:30"), 330.0);
/// assert_eq!(parse_time_input("1:00:00"), 3600.0);
/// assert_eq!(parse_time_input("abc"), 0.0);
/// ```
pub fn parse_time_input(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    if !trimmed.contains(':') {
        return match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => 0.0,
        };
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let components: Option<Vec<i64>> = parts.iter().map(|p| parse_int_prefix(p)).collect();

    let total = match (parts.len(), components) {
        (2, Some(c)) => c[0].checked_mul(60).and_then(|m| m.checked_add(c[1])),
        (3, Some(c)) => c[0]
            .checked_mul(3600)
            .zip(c[1].checked_mul(60))
            .and_then(|(h, m)| h.checked_add(m))
            .and_then(|hm| hm.checked_add(c[2])),
        _ => None,
    };
    // Totals that overflow read as zero.
    total.map_or(0.0, |t| t as f64)
}

/// Floor to whole seconds, treating negative and non-finite input as zero.
fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}

/// Read a leading integer the way a lenient form field does.
///
/// Leading whitespace and a single sign are accepted, digits are consumed
/// until the first non-digit, and trailing text is ignored. Returns `None`
/// when no digit follows the optional sign.
fn parse_int_prefix(component: &str) -> Option<i64> {
    let s = component.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}
