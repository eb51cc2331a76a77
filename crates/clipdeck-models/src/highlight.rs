//! Highlight models.
//!
//! A highlight is a named, immutable snapshot of several clips' bounds and
//! labels taken at the moment it was created.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::clip::{Clip, TimeRange};
use crate::timestamp::format_display;

/// Name prefix for generated highlights (`하이라이트 1`, `하이라이트 2`, ...).
pub const HIGHLIGHT_NAME_PREFIX: &str = "하이라이트";

/// A highlight assembled from checked clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    /// Unique ID within the session (1-indexed)
    pub id: u64,

    /// Generated display name
    pub video_name: String,

    /// Copied clip bounds, in clip list order
    pub clips: Vec<TimeRange>,

    /// Clip labels, parallel to `clips`
    pub meta: Vec<String>,

    /// When the highlight was created
    pub created_at: DateTime<Utc>,
}

impl Highlight {
    /// Snapshot the given clips into the `n`th highlight of the session.
    pub fn from_clips<'a>(n: u64, clips: impl IntoIterator<Item = &'a Clip>) -> Self {
        let (ranges, labels): (Vec<TimeRange>, Vec<String>) = clips
            .into_iter()
            .map(|clip| (clip.range(), clip.label.clone()))
            .unzip();
        Self {
            id: n,
            video_name: format!("{} {}", HIGHLIGHT_NAME_PREFIX, n),
            clips: ranges,
            meta: labels,
            created_at: Utc::now(),
        }
    }

    /// Total length of all ranges in seconds.
    pub fn total_secs(&self) -> f64 {
        self.clips.iter().map(|r| (r.to - r.from).max(0.0)).sum()
    }

    /// Comma-joined `from~to` ranges for list rendering.
    pub fn ranges_summary(&self) -> String {
        self.clips
            .iter()
            .map(|r| format!("{}~{}", format_display(r.from), format_display(r.to)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Comma-joined labels.
    pub fn meta_summary(&self) -> String {
        self.meta.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_snapshot() {
        let clips = vec![
            Clip::new(1, "Intro", 10.0, 30.0),
            Clip::new(2, "Goal", 600.0, 650.0),
        ];
        let h = Highlight::from_clips(1, &clips);

        assert_eq!(h.video_name, "하이라이트 1");
        assert_eq!(h.clips, vec![TimeRange::new(10.0, 30.0), TimeRange::new(600.0, 650.0)]);
        assert_eq!(h.meta, vec!["Intro".to_string(), "Goal".to_string()]);
        assert_eq!(h.total_secs(), 70.0);
    }

    #[test]
    fn test_highlight_summaries() {
        let clips = vec![
            Clip::new(1, "Intro", 10.0, 30.0),
            Clip::new(2, "Late", 3600.0, 3700.0),
        ];
        let h = Highlight::from_clips(2, &clips);
        assert_eq!(h.ranges_summary(), "0:10~0:30, 1:00:00~1:01:40");
        assert_eq!(h.meta_summary(), "Intro, Late");
    }

    #[test]
    fn test_highlight_serializes_camel_case() {
        let h = Highlight::from_clips(3, &[Clip::new(7, "A", 0.0, 60.0)]);
        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["videoName"], "하이라이트 3");
        assert_eq!(json["clips"][0]["to"], 60.0);
        assert!(json.get("createdAt").is_some());
    }
}
