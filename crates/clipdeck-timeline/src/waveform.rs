//! Waveform collaborator seam and track geometry.
//!
//! The waveform widget itself (decoding audio, drawing peaks, hit-testing
//! regions) is external. This module defines what the synchronizer needs
//! from it and the pixel/time conversions used for the cursor, click-to-seek,
//! drag-to-scroll and scroll-to-region.

use std::fmt;

use clipdeck_models::ClipId;
use serde::{Deserialize, Serialize};

/// Identifier of a region drawn on the waveform.
///
/// Clip regions use the clip ID's decimal form. One reserved "scratch"
/// region may exist alongside them and is never removed by clip selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub String);

impl RegionId {
    /// Reserved ID of the scratch region.
    pub const SCRATCH: &'static str = "waveform-region";

    pub fn scratch() -> Self {
        Self(Self::SCRATCH.to_string())
    }

    pub fn clip(id: ClipId) -> Self {
        Self(id.to_string())
    }

    pub fn is_scratch(&self) -> bool {
        self.0 == Self::SCRATCH
    }

    /// The clip this region edits, if it is a clip region.
    pub fn as_clip(&self) -> Option<ClipId> {
        self.0.parse::<u64>().ok().map(ClipId)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A draggable, resizable region to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    pub id: RegionId,
    pub start: f64,
    pub end: f64,
    pub draggable: bool,
    pub resizable: bool,
}

impl RegionSpec {
    pub fn for_clip(id: ClipId, start: f64, end: f64) -> Self {
        Self {
            id: RegionId::clip(id),
            start,
            end,
            draggable: true,
            resizable: true,
        }
    }
}

/// Scroll container measurements, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackGeometry {
    /// Full width of the rendered track
    pub scroll_width: f64,
    /// Visible width
    pub client_width: f64,
    /// Current horizontal scroll offset
    pub scroll_left: f64,
}

impl TrackGeometry {
    pub fn new(scroll_width: f64, client_width: f64) -> Self {
        Self {
            scroll_width,
            client_width,
            scroll_left: 0.0,
        }
    }

    pub fn max_scroll(&self) -> f64 {
        (self.scroll_width - self.client_width).max(0.0)
    }

    pub fn clamp_scroll(&self, px: f64) -> f64 {
        px.clamp(0.0, self.max_scroll())
    }

    /// Pixel position of `time` on the full track.
    ///
    /// `None` while the duration is unknown.
    pub fn time_to_px(&self, time: f64, duration: f64) -> Option<f64> {
        if duration <= 0.0 {
            return None;
        }
        Some(time / duration * self.scroll_width)
    }

    /// Time under a click `offset_x` pixels into the visible viewport.
    pub fn click_time(&self, offset_x: f64, duration: f64) -> f64 {
        if self.scroll_width <= 0.0 {
            return 0.0;
        }
        let x = offset_x + self.scroll_left;
        (x / self.scroll_width * duration).clamp(0.0, duration.max(0.0))
    }

    /// Scroll offset after dragging `delta_x` pixels from `start_scroll`.
    pub fn drag_scroll(&self, start_scroll: f64, delta_x: f64) -> f64 {
        self.clamp_scroll(start_scroll - delta_x)
    }

    /// Time represented by a scroll offset: scroll progress times duration.
    pub fn scroll_time(&self, scroll: f64, duration: f64) -> f64 {
        let max = self.max_scroll();
        let progress = if max > 0.0 { scroll / max } else { 0.0 };
        progress * duration
    }

    /// Scroll offset that centres `time` in the viewport.
    pub fn centre_on(&self, time: f64, duration: f64) -> f64 {
        match self.time_to_px(time, duration) {
            Some(px) => self.clamp_scroll(px - self.client_width / 2.0),
            None => self.scroll_left,
        }
    }
}

/// What the synchronizer needs from the waveform widget.
pub trait WaveformSurface {
    /// Start loading the audio the waveform is drawn from.
    fn load(&mut self, audio_url: &str);

    /// Current scroll container measurements.
    fn geometry(&self) -> TrackGeometry;

    fn set_scroll_left(&mut self, px: f64);

    /// Move the playback cursor to `px` on the full track.
    fn set_cursor(&mut self, px: f64);

    fn region_ids(&self) -> Vec<RegionId>;

    fn add_region(&mut self, region: RegionSpec);

    fn remove_region(&mut self, id: &RegionId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_ids() {
        let id = RegionId::clip(ClipId(42));
        assert_eq!(id.as_str(), "42");
        assert_eq!(id.as_clip(), Some(ClipId(42)));
        assert!(!id.is_scratch());

        let scratch = RegionId::scratch();
        assert!(scratch.is_scratch());
        assert_eq!(scratch.as_clip(), None);
    }

    #[test]
    fn test_time_to_px() {
        let g = TrackGeometry::new(2000.0, 500.0);
        assert_eq!(g.time_to_px(50.0, 100.0), Some(1000.0));
        assert_eq!(g.time_to_px(50.0, 0.0), None);
    }

    #[test]
    fn test_click_time_includes_scroll_and_clamps() {
        let mut g = TrackGeometry::new(2000.0, 500.0);
        g.scroll_left = 1000.0;
        assert_eq!(g.click_time(250.0, 100.0), 62.5);
        assert_eq!(g.click_time(5000.0, 100.0), 100.0);
        assert_eq!(g.click_time(-2000.0, 100.0), 0.0);
    }

    #[test]
    fn test_drag_scroll_and_time() {
        let g = TrackGeometry::new(2000.0, 500.0);
        // Dragging left scrolls right.
        assert_eq!(g.drag_scroll(100.0, -200.0), 300.0);
        assert_eq!(g.drag_scroll(100.0, 500.0), 0.0);
        assert_eq!(g.drag_scroll(1400.0, -500.0), 1500.0);
        assert_eq!(g.scroll_time(750.0, 100.0), 50.0);
    }

    #[test]
    fn test_scroll_time_without_overflow() {
        let g = TrackGeometry::new(500.0, 500.0);
        assert_eq!(g.max_scroll(), 0.0);
        assert_eq!(g.scroll_time(0.0, 100.0), 0.0);
    }

    #[test]
    fn test_centre_on() {
        let g = TrackGeometry::new(2000.0, 500.0);
        assert_eq!(g.centre_on(50.0, 100.0), 750.0);
        assert_eq!(g.centre_on(1.0, 100.0), 0.0);
        assert_eq!(g.centre_on(99.0, 100.0), 1500.0);
    }
}
