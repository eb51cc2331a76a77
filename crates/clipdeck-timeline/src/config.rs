//! Timeline configuration.

use clipdeck_models::SpanPolicy;

use crate::media::StreamConfig;
use crate::sync::RegionLabelPolicy;

/// Default label written onto a clip when a region drag is committed.
pub const DEFAULT_REGION_LABEL: &str = "Updated Clip";

/// Editor timeline configuration.
#[derive(Debug, Clone)]
pub struct TimelineConfig {
    /// HLS manifest for the source video
    pub manifest_url: String,
    /// Audio resource the waveform is rendered from
    pub audio_url: String,
    /// Page URL share links are generated against
    pub page_url: String,
    /// Minimum-span rule applied to every clip edit
    pub span_policy: SpanPolicy,
    /// Media is only re-seeked when it drifts further than this (seconds)
    pub seek_tolerance_secs: f64,
    /// What a committed region drag does to the clip label
    pub region_label: RegionLabelPolicy,
    /// Streaming session settings
    pub stream: StreamConfig,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            manifest_url: "/master.m3u8".to_string(),
            audio_url: "/output.mp3".to_string(),
            page_url: "http://localhost:5173/".to_string(),
            span_policy: SpanPolicy::default(),
            seek_tolerance_secs: 0.1,
            region_label: RegionLabelPolicy::Generic(DEFAULT_REGION_LABEL.to_string()),
            stream: StreamConfig::default(),
        }
    }
}

impl TimelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            manifest_url: std::env::var("CLIPDECK_MANIFEST_URL").unwrap_or(defaults.manifest_url),
            audio_url: std::env::var("CLIPDECK_AUDIO_URL").unwrap_or(defaults.audio_url),
            page_url: std::env::var("CLIPDECK_PAGE_URL").unwrap_or(defaults.page_url),
            span_policy: SpanPolicy {
                bucket_secs: std::env::var("CLIPDECK_SPAN_BUCKET_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|v: &f64| *v > 0.0)
                    .unwrap_or(defaults.span_policy.bucket_secs),
                min_buckets: std::env::var("CLIPDECK_SPAN_MIN_BUCKETS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.span_policy.min_buckets),
            },
            seek_tolerance_secs: std::env::var("CLIPDECK_SEEK_TOLERANCE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.seek_tolerance_secs),
            region_label: match std::env::var("CLIPDECK_REGION_LABEL") {
                Ok(v) if v.eq_ignore_ascii_case("keep") => RegionLabelPolicy::KeepExisting,
                Ok(v) if !v.trim().is_empty() => RegionLabelPolicy::Generic(v),
                _ => defaults.region_label,
            },
            stream: StreamConfig {
                enable_worker: std::env::var("CLIPDECK_HLS_WORKER")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(defaults.stream.enable_worker),
                low_latency: std::env::var("CLIPDECK_HLS_LOW_LATENCY")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(defaults.stream.low_latency),
                back_buffer_secs: std::env::var("CLIPDECK_HLS_BACK_BUFFER_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.stream.back_buffer_secs),
                start_position: None,
            },
        }
    }
}
