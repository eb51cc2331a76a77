//! Playback synchronizer.
//!
//! Single owner of the shared playback time. Every source (media progress,
//! waveform gestures, clip selection, region drags, share links) asks the
//! synchronizer to move the time, and only the synchronizer forwards the new
//! value to the *other* surfaces. Media progress never seeks media, and a
//! seek is skipped when media is already within the tolerance of the target,
//! so updates cannot bounce between the surfaces.

use clipdeck_models::{Clip, ClipId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::events::{MediaEvent, RegionPhase, WaveformEvent};
use crate::media::{MediaSurface, Recovery};
use crate::share_policy::ShareAction;
use crate::throttle::FrameThrottle;
use crate::waveform::{RegionId, RegionSpec, WaveformSurface};

/// What committing a region drag does to the clip's label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "label", rename_all = "snake_case")]
pub enum RegionLabelPolicy {
    /// Overwrite the label with a fixed placeholder
    Generic(String),
    /// Leave the label untouched
    KeepExisting,
}

impl RegionLabelPolicy {
    /// The label the clip should carry after a committed drag.
    pub fn label_for(&self, existing: &str) -> String {
        match self {
            RegionLabelPolicy::Generic(label) => label.clone(),
            RegionLabelPolicy::KeepExisting => existing.to_string(),
        }
    }
}

/// Final bounds of a released region, to be committed to the clip store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionCommit {
    pub clip_id: ClipId,
    pub from: f64,
    pub to: f64,
}

#[derive(Debug, Clone, Copy)]
struct ScrollDrag {
    start_x: f64,
    start_scroll: f64,
}

/// Keeps media and waveform in step with one playback time.
pub struct PlaybackSynchronizer<M, W> {
    media: M,
    waveform: W,
    current_time: f64,
    duration: Option<f64>,
    seek_tolerance: f64,
    throttle: FrameThrottle,
    region_drag: bool,
    scroll_drag: Option<ScrollDrag>,
    waveform_ready: bool,
}

impl<M: MediaSurface, W: WaveformSurface> PlaybackSynchronizer<M, W> {
    pub fn new(media: M, waveform: W, seek_tolerance: f64) -> Self {
        Self {
            media,
            waveform,
            current_time: 0.0,
            duration: None,
            seek_tolerance,
            throttle: FrameThrottle::new(),
            region_drag: false,
            scroll_drag: None,
            waveform_ready: false,
        }
    }

    /// Point both surfaces at their sources.
    pub fn load(&mut self, manifest_url: &str, audio_url: &str) {
        self.current_time = 0.0;
        self.duration = None;
        self.waveform_ready = false;
        self.throttle.cancel();
        self.media.load(manifest_url);
        self.waveform.load(audio_url);
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Record the media duration. Zero, negative or non-finite means unknown.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = (duration.is_finite() && duration > 0.0).then_some(duration);
        debug!(duration = ?self.duration, "Duration updated");
    }

    pub fn is_dragging(&self) -> bool {
        self.region_drag || self.scroll_drag.is_some()
    }

    /// Whether a throttled seek is waiting for the next frame.
    pub fn frame_pending(&self) -> bool {
        self.throttle.is_pending()
    }

    pub fn waveform_ready(&self) -> bool {
        self.waveform_ready
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn waveform(&self) -> &W {
        &self.waveform
    }

    /// Handle an event from the media surface.
    pub fn on_media_event(&mut self, event: &MediaEvent) -> Option<Recovery> {
        match event {
            MediaEvent::Ready { duration } => {
                self.set_duration(*duration);
                self.media.on_ready();
                None
            }
            MediaEvent::Progress { time } => {
                self.current_time = *time;
                if !self.is_dragging() {
                    self.move_cursor();
                }
                None
            }
            MediaEvent::Error { kind, fatal, details } => {
                debug!(kind = kind.as_str(), fatal, details = ?details, "Media error");
                Some(self.media.report_error(*kind, *fatal))
            }
            _ => None,
        }
    }

    /// Handle an event from the waveform surface.
    ///
    /// Returns the bounds to commit when a clip region is released.
    pub fn on_waveform_event(&mut self, event: &WaveformEvent) -> Option<RegionCommit> {
        match event {
            WaveformEvent::Ready { duration } => {
                self.waveform_ready = true;
                self.set_duration(*duration);
                self.move_cursor();
                None
            }
            WaveformEvent::Click { offset_x, on_region } => {
                if *on_region || self.scroll_drag.is_some() {
                    return None;
                }
                let duration = self.duration?;
                let time = self.waveform.geometry().click_time(*offset_x, duration);
                self.seek_all(time);
                None
            }
            WaveformEvent::ScrollDragStart { client_x, on_region } => {
                if !*on_region {
                    self.scroll_drag = Some(ScrollDrag {
                        start_x: *client_x,
                        start_scroll: self.waveform.geometry().scroll_left,
                    });
                }
                None
            }
            WaveformEvent::ScrollDragMove { client_x } => {
                let drag = self.scroll_drag?;
                let geometry = self.waveform.geometry();
                let scroll = geometry.drag_scroll(drag.start_scroll, client_x - drag.start_x);
                self.waveform.set_scroll_left(scroll);

                // Without a duration the scroll position maps to no time.
                let duration = self.duration?;
                let time = geometry.scroll_time(scroll, duration);
                self.current_time = time;
                self.forward_to_media(time);
                self.move_cursor();
                None
            }
            WaveformEvent::ScrollDragEnd => {
                self.scroll_drag = None;
                None
            }
            WaveformEvent::Region {
                id,
                start,
                end,
                phase,
            } => self.on_region(id, *start, *end, *phase),
        }
    }

    fn on_region(&mut self, id: &RegionId, start: f64, end: f64, phase: RegionPhase) -> Option<RegionCommit> {
        match phase {
            RegionPhase::Start => {
                self.region_drag = true;
                self.throttle.cancel();
                None
            }
            RegionPhase::Drag => {
                if let Some(duration) = self.duration {
                    if end > duration {
                        debug!(region = %id, end, duration, "Region end past duration, dropping update");
                        return None;
                    }
                }
                if self.throttle.propose(start) {
                    trace!(region = %id, start, "Frame requested for region seek");
                }
                None
            }
            RegionPhase::End => {
                self.region_drag = false;
                self.throttle.cancel();
                self.seek_all(start);
                id.as_clip().map(|clip_id| RegionCommit {
                    clip_id,
                    from: start,
                    to: end,
                })
            }
        }
    }

    /// A frame was rendered: deliver the coalesced region seek, if any.
    pub fn on_frame(&mut self) {
        if let Some(time) = self.throttle.on_frame() {
            self.current_time = time;
            self.forward_to_media(time);
        }
    }

    /// React to a clip becoming selected.
    ///
    /// Replaces any clip region with one spanning the clip, moves playback
    /// to its start, and scrolls the waveform so the start is centred. The
    /// scratch region is left alone.
    pub fn on_clip_selected(&mut self, clip: &Clip) {
        for id in self.waveform.region_ids() {
            if !id.is_scratch() {
                self.waveform.remove_region(&id);
            }
        }
        self.waveform
            .add_region(RegionSpec::for_clip(clip.id, clip.from, clip.to));

        self.seek_all(clip.from);

        if let Some(duration) = self.duration {
            let scroll = self.waveform.geometry().centre_on(clip.from, duration);
            self.waveform.set_scroll_left(scroll);
        }
    }

    /// Redraw a clip region, replacing any region with the same ID.
    pub fn restore_region(&mut self, spec: RegionSpec) {
        self.waveform.add_region(spec);
    }

    /// Apply playback changes requested by a share policy.
    pub fn apply_share_actions(&mut self, actions: Vec<ShareAction>) {
        for action in actions {
            match action {
                ShareAction::Seek(time) => self.seek_all(time),
                ShareAction::Play => self.media.play(),
                ShareAction::Pause => self.media.pause(),
            }
        }
    }

    /// Move playback to `time` on every surface.
    pub fn seek_all(&mut self, time: f64) {
        self.current_time = time;
        self.forward_to_media(time);
        self.move_cursor();
    }

    fn forward_to_media(&mut self, time: f64) {
        if (self.media.current_time() - time).abs() > self.seek_tolerance {
            self.media.seek(time);
        }
    }

    fn move_cursor(&mut self) {
        let Some(duration) = self.duration else {
            return;
        };
        if let Some(px) = self.waveform.geometry().time_to_px(self.current_time, duration) {
            self.waveform.set_cursor(px);
        }
    }
}
