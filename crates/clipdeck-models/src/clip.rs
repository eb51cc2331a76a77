//! Clip model and boundary validation.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timestamp::format_display;

/// Unique clip identifier. Assigned once at creation, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ClipId(pub u64);

impl ClipId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ClipId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A named time range over the source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Clip {
    /// Unique clip ID
    pub id: ClipId,

    /// Display label
    pub label: String,

    /// Start in seconds
    pub from: f64,

    /// End in seconds
    pub to: f64,
}

impl Clip {
    /// Create a new clip.
    pub fn new(id: impl Into<ClipId>, label: impl Into<String>, from: f64, to: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            from,
            to,
        }
    }

    /// Length in seconds.
    pub fn span(&self) -> f64 {
        (self.to - self.from).max(0.0)
    }

    /// The clip's bounds without identity or label.
    pub fn range(&self) -> TimeRange {
        TimeRange {
            from: self.from,
            to: self.to,
        }
    }

    /// `M:SS ~ M:SS` summary for list rows.
    pub fn display_range(&self) -> String {
        format!("{} ~ {}", format_display(self.from), format_display(self.to))
    }
}

/// A bare `{from, to}` pair in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimeRange {
    pub from: f64,
    pub to: f64,
}

impl TimeRange {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.from && time <= self.to
    }
}

/// Minimum-span rule, expressed in whole buckets.
///
/// A range passes when its start and end fall into buckets at least
/// `min_buckets` apart. With 30 second buckets and a one bucket minimum this
/// approximates "about a minute or longer" but is not a duration threshold:
/// `29..61` passes while `40..70` fails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpanPolicy {
    /// Bucket width in seconds
    pub bucket_secs: f64,
    /// Minimum bucket distance between start and end
    pub min_buckets: u32,
}

impl Default for SpanPolicy {
    fn default() -> Self {
        Self {
            bucket_secs: 30.0,
            min_buckets: 1,
        }
    }
}

impl SpanPolicy {
    /// Number of buckets separating `from` and `to`.
    pub fn span_buckets(&self, from: f64, to: f64) -> u64 {
        let a = (from / self.bucket_secs).floor() as i64;
        let b = (to / self.bucket_secs).floor() as i64;
        a.abs_diff(b)
    }

    pub fn allows(&self, from: f64, to: f64) -> bool {
        self.span_buckets(from, to) >= u64::from(self.min_buckets)
    }
}

/// User-correctable problem with a clip's label or bounds.
///
/// The `Display` text is what the editor shows next to the input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please enter a clip name.")]
    EmptyLabel,

    #[error("Start must be 0 or greater.")]
    NegativeStart,

    #[error("End must be greater than 0.")]
    NonPositiveEnd,

    #[error("Start must not exceed end.")]
    StartNotBeforeEnd,

    #[error("Clip is shorter than one minute. Please select a longer range.")]
    SpanTooShort,

    #[error("Clip end exceeds the video length ({}).", format_display(*.duration))]
    ExceedsDuration { to: f64, duration: f64 },
}

/// Check a label for rule (a): non-empty after trimming.
pub fn validate_label(label: &str) -> Result<String, ValidationError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyLabel);
    }
    Ok(trimmed.to_string())
}

/// Check bounds against rules (b) through (f), returning the first failure.
///
/// `duration` is `None` until media metadata has arrived, in which case the
/// upper bound is not enforced.
pub fn validate_bounds(
    from: f64,
    to: f64,
    duration: Option<f64>,
    policy: &SpanPolicy,
) -> Result<TimeRange, ValidationError> {
    if from < 0.0 {
        return Err(ValidationError::NegativeStart);
    }
    if to <= 0.0 {
        return Err(ValidationError::NonPositiveEnd);
    }
    if from >= to {
        return Err(ValidationError::StartNotBeforeEnd);
    }
    if !policy.allows(from, to) {
        return Err(ValidationError::SpanTooShort);
    }
    if let Some(duration) = duration {
        if to > duration {
            return Err(ValidationError::ExceedsDuration { to, duration });
        }
    }
    Ok(TimeRange { from, to })
}
