//! Shared data models for the clipdeck clip editor.
//!
//! This crate provides Serde-serializable types for:
//! - Clips and their boundary validation rules
//! - Display/input time formatting
//! - Highlights assembled from clips
//! - Share links carrying a clip's time range

pub mod clip;
pub mod highlight;
pub mod share;
pub mod timestamp;

// Re-export common types
pub use clip::{validate_bounds, validate_label, Clip, ClipId, SpanPolicy, TimeRange, ValidationError};
pub use highlight::{Highlight, HIGHLIGHT_NAME_PREFIX};
pub use share::{
    decode_share_query, encode_range, encode_share_url, ShareDraft, ShareError, SharePayload,
    DEFAULT_SHARE_LABEL,
};
pub use timestamp::{format_display, format_minutes, parse_time_input};
