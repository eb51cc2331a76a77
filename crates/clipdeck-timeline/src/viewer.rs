//! Read-only viewer surface.
//!
//! Plays a fixed list of clips. Each clip gets a fresh streaming session
//! started at the clip's beginning; playback is confined to the clip and
//! the progress bar shows time relative to it.

use clipdeck_models::{format_minutes, SharePayload, TimeRange};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::events::{BufferState, MediaEvent};
use crate::logging::{SessionLogger, Surface};
use crate::media::{MediaFactory, MediaSession, MediaSurface, Recovery, StreamConfig};
use crate::share_policy::{AutoStopRange, ShareAction, ShareParamsPolicy, ShareRangeState};

/// Entry in the viewer's clip list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerClip {
    pub label: String,
    pub from: f64,
    pub to: f64,
}

impl ViewerClip {
    pub fn new(label: impl Into<String>, from: f64, to: f64) -> Self {
        Self {
            label: label.into(),
            from,
            to,
        }
    }

    pub fn length(&self) -> f64 {
        (self.to - self.from).max(0.0)
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.from, self.to)
    }
}

/// Clip list the viewer ships with.
pub fn default_viewer_clips() -> Vec<ViewerClip> {
    vec![
        ViewerClip::new("Clip 1: 3-6 min (opening highlight)", 180.0, 181.0),
        ViewerClip::new("Clip 2: 10-14 min (first goal)", 600.0, 840.0),
        ViewerClip::new("Clip 3: 20-25 min (substitution)", 1200.0, 1500.0),
        ViewerClip::new("Clip 4: 45-50 min (mid-game highlight)", 2700.0, 3000.0),
        ViewerClip::new("Clip 5: 55-60 min (team timeout)", 3300.0, 3600.0),
        ViewerClip::new("Clip 6: 70-75 min (tactical change)", 4200.0, 4500.0),
        ViewerClip::new("Clip 7: 80-85 min (decisive moment)", 4800.0, 5100.0),
        ViewerClip::new("Clip 8: 95-100 min (last goal)", 5700.0, 6000.0),
        ViewerClip::new("Clip 9: 105-110 min (final minutes)", 6300.0, 6600.0),
    ]
}

/// Observable viewer state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<ViewerClip>,
    pub playing: bool,
    pub loading: bool,
    pub ended: bool,
    /// Position shown on the progress bar; relative to the clip in clip mode
    pub display_time: f64,
    /// Length of the progress bar; the clip length in clip mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// `M:SS / M:SS` label next to the progress bar
    pub time_label: String,
    pub share: ShareRangeState,
}

/// Viewer playback controller.
pub struct ViewerSession<F: MediaFactory> {
    media: MediaSession<F>,
    manifest_url: String,
    clips: Vec<ViewerClip>,
    clip: Option<ViewerClip>,
    starting: bool,
    playing: bool,
    loading: bool,
    ended: bool,
    display_time: f64,
    duration: Option<f64>,
    share: Option<AutoStopRange>,
    logger: SessionLogger,
}

impl<F: MediaFactory> ViewerSession<F> {
    /// Open the full video.
    pub fn new(factory: F, manifest_url: impl Into<String>, stream: StreamConfig) -> Self {
        let logger = SessionLogger::new(Surface::Viewer);
        let manifest_url = manifest_url.into();

        let mut media = MediaSession::new(factory, stream);
        media.open(&manifest_url, None);
        logger.log_start(&manifest_url);

        Self {
            media,
            manifest_url,
            clips: default_viewer_clips(),
            clip: None,
            starting: false,
            playing: false,
            loading: false,
            ended: false,
            display_time: 0.0,
            duration: None,
            share: None,
            logger,
        }
    }

    pub fn with_clips(mut self, clips: Vec<ViewerClip>) -> Self {
        self.clips = clips;
        self
    }

    pub fn clips(&self) -> &[ViewerClip] {
        &self.clips
    }

    pub fn media(&self) -> &MediaSession<F> {
        &self.media
    }

    pub fn logger(&self) -> &SessionLogger {
        &self.logger
    }

    pub fn is_clip_mode(&self) -> bool {
        self.clip.is_some()
    }

    /// Seek to the shared range and stop once at its end.
    pub fn apply_share_params(&mut self, payload: &SharePayload) {
        let mut policy = AutoStopRange::new();
        let actions = policy.on_load(payload);
        self.share = Some(policy);
        self.apply_share_actions(actions);
    }

    /// Play the `index`th clip of the list. Out-of-range indexes are ignored.
    pub fn play_clip_at(&mut self, index: usize) -> bool {
        match self.clips.get(index).cloned() {
            Some(clip) => {
                self.play_clip(clip);
                true
            }
            None => false,
        }
    }

    /// Recreate the stream at the clip start and enter clip mode.
    pub fn play_clip(&mut self, clip: ViewerClip) {
        info!(
            session_id = %self.logger.session_id(),
            clip = %clip.label,
            from = clip.from,
            to = clip.to,
            "Playing clip"
        );

        self.drop_share_range();
        self.media.open(&self.manifest_url, Some(clip.from));
        self.clip = Some(clip);
        self.starting = true;
        self.loading = true;
        self.ended = false;
        self.playing = false;
        self.display_time = 0.0;
    }

    /// Play the current clip again from its start.
    pub fn replay(&mut self) {
        if let Some(clip) = self.clip.clone() {
            self.play_clip(clip);
        }
    }

    /// Leave clip mode and reload the full video.
    pub fn play_full_video(&mut self) {
        self.drop_share_range();
        self.media.open(&self.manifest_url, None);
        self.exit_clip_mode();
        self.playing = false;
        self.display_time = 0.0;
        self.duration = None;
    }

    /// Play button: replay when the clip has ended, otherwise toggle.
    pub fn toggle_play_pause(&mut self) {
        if self.ended {
            self.replay();
        } else if self.playing {
            self.media.pause();
        } else {
            self.media.play();
        }
    }

    /// Click on the progress bar at `fraction` (0..=1) of its width.
    ///
    /// In clip mode the target is relative to the clip and clicks landing
    /// outside it are ignored.
    pub fn progress_click(&mut self, fraction: f64) {
        let Some(duration) = self.duration else {
            return;
        };
        let offset = fraction * duration;

        match &self.clip {
            Some(clip) => {
                let target = clip.from + offset;
                if clip.range().contains(target) {
                    self.media.seek(target);
                    self.ended = false;
                }
            }
            None => self.media.seek(offset),
        }
    }

    pub fn on_media_event(&mut self, event: &MediaEvent) -> Option<Recovery> {
        let recovery = self.apply_media_event(event);
        if let Some(share) = self.share.as_mut() {
            let actions = share.on_media_event(event);
            self.apply_share_actions(actions);
        }
        recovery
    }

    fn apply_media_event(&mut self, event: &MediaEvent) -> Option<Recovery> {
        match event {
            MediaEvent::Ready { duration } => {
                self.media.reset_recovery();
                match &self.clip {
                    Some(clip) => {
                        self.duration = Some(clip.length());
                        if self.starting {
                            self.starting = false;
                            let from = clip.from;
                            self.media.seek(from);
                            self.media.play();
                        }
                    }
                    None => {
                        self.duration = (duration.is_finite() && *duration > 0.0).then_some(*duration);
                    }
                }
                None
            }
            MediaEvent::Progress { time } => {
                self.on_progress(*time);
                None
            }
            MediaEvent::Play => {
                self.playing = true;
                self.loading = false;
                None
            }
            MediaEvent::Pause => {
                self.playing = false;
                None
            }
            MediaEvent::CanPlay => {
                self.loading = false;
                None
            }
            MediaEvent::Buffering { state: BufferState::LoadStart } => {
                self.loading = true;
                None
            }
            MediaEvent::Buffering { .. } => None,
            MediaEvent::PlayRejected { reason } => {
                if self.is_clip_mode() {
                    self.logger
                        .log_warning(&format!("clip playback failed: {}", reason.as_deref().unwrap_or("unknown")));
                    self.exit_clip_mode();
                }
                self.playing = false;
                None
            }
            MediaEvent::Error { kind, fatal, .. } => {
                if *fatal && self.is_clip_mode() {
                    warn!(kind = kind.as_str(), "Clip stream failed, leaving clip mode");
                    self.exit_clip_mode();
                }
                Some(self.media.handle_error(*kind, *fatal))
            }
        }
    }

    fn on_progress(&mut self, time: f64) {
        let Some(clip) = &self.clip else {
            self.display_time = time;
            return;
        };

        if time >= clip.to {
            if !self.ended {
                let (to, length) = (clip.to, clip.length());
                self.media.seek(to);
                self.media.pause();
                self.playing = false;
                self.ended = true;
                self.display_time = length;
                debug!(to, "Clip reached its end");
            }
        } else if time < clip.from {
            let from = clip.from;
            self.media.seek(from);
            self.display_time = 0.0;
        } else {
            self.display_time = time - clip.from;
        }
    }

    fn apply_share_actions(&mut self, actions: Vec<ShareAction>) {
        for action in actions {
            match action {
                ShareAction::Seek(time) => {
                    self.media.seek(time);
                    if self.clip.is_none() {
                        self.display_time = time;
                    }
                }
                ShareAction::Play => self.media.play(),
                ShareAction::Pause => self.media.pause(),
            }
        }
    }

    fn drop_share_range(&mut self) {
        if self.share.take().is_some() {
            debug!("Shared range superseded by explicit playback");
        }
    }

    fn exit_clip_mode(&mut self) {
        self.clip = None;
        self.starting = false;
        self.loading = false;
        self.ended = false;
    }

    pub fn state(&self) -> ViewerState {
        ViewerState {
            clip: self.clip.clone(),
            playing: self.playing,
            loading: self.loading,
            ended: self.ended,
            display_time: self.display_time,
            duration: self.duration,
            time_label: format!(
                "{} / {}",
                format_minutes(self.display_time),
                format_minutes(self.duration.unwrap_or(0.0))
            ),
            share: self.share.as_ref().map(|s| s.state()).unwrap_or_default(),
        }
    }
}

impl<F: MediaFactory> Drop for ViewerSession<F> {
    fn drop(&mut self) {
        self.logger.log_end(&self.manifest_url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MediaErrorKind;
    use crate::headless::{HeadlessFactory, MediaCall, MediaLog};

    fn viewer() -> (ViewerSession<HeadlessFactory>, MediaLog) {
        let factory = HeadlessFactory::default();
        let log = factory.log();
        let mut viewer = ViewerSession::new(factory, "/hls/output.m3u8", StreamConfig::default());
        viewer.on_media_event(&MediaEvent::Ready { duration: 7200.0 });
        (viewer, log)
    }

    fn start_clip(viewer: &mut ViewerSession<HeadlessFactory>, index: usize) {
        assert!(viewer.play_clip_at(index));
        viewer.on_media_event(&MediaEvent::Ready { duration: 7200.0 });
        viewer.on_media_event(&MediaEvent::Play);
    }

    #[test]
    fn test_full_video_on_open() {
        let (viewer, log) = viewer();
        let state = viewer.state();
        assert!(state.clip.is_none());
        assert_eq!(state.duration, Some(7200.0));
        assert_eq!(state.time_label, "0:00 / 120:00");
        assert_eq!(log.live_sessions(), 1);
    }

    #[test]
    fn test_play_clip_recreates_session_at_start() {
        let (mut viewer, log) = viewer();
        assert!(viewer.play_clip_at(1));
        assert!(viewer.state().loading);
        assert!(log.calls().contains(&MediaCall::Create { generation: 2, start_position: Some(600.0) }));
        assert_eq!(log.live_sessions(), 1);

        viewer.on_media_event(&MediaEvent::Ready { duration: 7200.0 });
        assert_eq!(viewer.state().duration, Some(240.0));
        let calls = log.calls();
        assert!(calls.ends_with(&[MediaCall::Seek { time: 600.0 }, MediaCall::Play]));

        viewer.on_media_event(&MediaEvent::Play);
        let state = viewer.state();
        assert!(state.playing && !state.loading);
    }

    #[test]
    fn test_clip_progress_is_relative() {
        let (mut viewer, _log) = viewer();
        start_clip(&mut viewer, 1);
        viewer.on_media_event(&MediaEvent::Progress { time: 660.0 });
        let state = viewer.state();
        assert_eq!(state.display_time, 60.0);
        assert_eq!(state.time_label, "1:00 / 4:00");
    }

    #[test]
    fn test_clip_end_pins_and_pauses_once() {
        let (mut viewer, log) = viewer();
        start_clip(&mut viewer, 1);
        log.clear();

        viewer.on_media_event(&MediaEvent::Progress { time: 840.3 });
        let state = viewer.state();
        assert!(state.ended);
        assert!(!state.playing);
        assert_eq!(state.display_time, 240.0);
        assert_eq!(log.calls(), vec![MediaCall::Seek { time: 840.0 }, MediaCall::Pause]);

        viewer.on_media_event(&MediaEvent::Progress { time: 840.0 });
        assert_eq!(log.calls().len(), 2);
    }

    #[test]
    fn test_progress_before_clip_start_is_pinned() {
        let (mut viewer, log) = viewer();
        start_clip(&mut viewer, 1);
        log.clear();
        viewer.on_media_event(&MediaEvent::Progress { time: 590.0 });
        assert_eq!(log.seeks(), vec![600.0]);
        assert_eq!(viewer.state().display_time, 0.0);
    }

    #[test]
    fn test_toggle_after_end_replays() {
        let (mut viewer, log) = viewer();
        start_clip(&mut viewer, 2);
        viewer.on_media_event(&MediaEvent::Progress { time: 1500.0 });
        assert!(viewer.state().ended);

        viewer.toggle_play_pause();
        assert!(!viewer.state().ended);
        assert!(log.calls().contains(&MediaCall::Create { generation: 3, start_position: Some(1200.0) }));
    }

    #[test]
    fn test_toggle_play_pause() {
        let (mut viewer, log) = viewer();
        log.clear();
        viewer.toggle_play_pause();
        assert_eq!(log.calls(), vec![MediaCall::Play]);
        viewer.on_media_event(&MediaEvent::Play);
        viewer.toggle_play_pause();
        assert_eq!(log.calls(), vec![MediaCall::Play, MediaCall::Pause]);
    }

    #[test]
    fn test_progress_click_in_clip_mode() {
        let (mut viewer, log) = viewer();
        start_clip(&mut viewer, 1);
        viewer.on_media_event(&MediaEvent::Progress { time: 900.0 });
        assert!(viewer.state().ended);
        log.clear();

        viewer.progress_click(0.5);
        assert_eq!(log.seeks(), vec![720.0]);
        assert!(!viewer.state().ended);

        viewer.progress_click(1.5);
        assert_eq!(log.seeks(), vec![720.0]);
    }

    #[test]
    fn test_progress_click_full_video() {
        let (mut viewer, log) = viewer();
        log.clear();
        viewer.progress_click(0.25);
        assert_eq!(log.seeks(), vec![1800.0]);
    }

    #[test]
    fn test_play_full_video_leaves_clip_mode() {
        let (mut viewer, log) = viewer();
        start_clip(&mut viewer, 1);
        viewer.play_full_video();

        let state = viewer.state();
        assert!(state.clip.is_none());
        assert_eq!(state.duration, None);
        assert!(log.calls().contains(&MediaCall::Create { generation: 3, start_position: None }));
        assert_eq!(log.live_sessions(), 1);
    }

    #[test]
    fn test_play_rejected_leaves_clip_mode() {
        let (mut viewer, _log) = viewer();
        viewer.play_clip_at(0);
        viewer.on_media_event(&MediaEvent::PlayRejected { reason: Some("NotAllowedError".to_string()) });
        let state = viewer.state();
        assert!(state.clip.is_none());
        assert!(!state.loading);
    }

    #[test]
    fn test_fatal_error_in_clip_mode() {
        let (mut viewer, _log) = viewer();
        start_clip(&mut viewer, 3);
        let recovery = viewer.on_media_event(&MediaEvent::Error {
            kind: MediaErrorKind::Network,
            fatal: true,
            details: None,
        });
        assert_eq!(recovery, Some(Recovery::ReloadedSegments));
        assert!(!viewer.is_clip_mode());
    }

    #[test]
    fn test_unknown_clip_index() {
        let (mut viewer, _log) = viewer();
        assert!(!viewer.play_clip_at(99));
        assert!(!viewer.is_clip_mode());
    }

    #[test]
    fn test_playing_a_clip_drops_shared_range() {
        let (mut viewer, log) = viewer();
        viewer.apply_share_params(&SharePayload { from: 600.0, to: 650.0, clip_name: None });
        start_clip(&mut viewer, 1);
        log.clear();

        viewer.on_media_event(&MediaEvent::Progress { time: 700.0 });
        assert!(log.calls().is_empty());
        assert_eq!(viewer.state().share, ShareRangeState::default());
    }

    #[test]
    fn test_share_params_auto_stop() {
        let (mut viewer, log) = viewer();
        viewer.apply_share_params(&SharePayload { from: 600.0, to: 650.0, clip_name: None });
        assert_eq!(log.seeks(), vec![600.0]);

        viewer.on_media_event(&MediaEvent::CanPlay);
        viewer.on_media_event(&MediaEvent::Play);
        viewer.on_media_event(&MediaEvent::Progress { time: 650.5 });

        let state = viewer.state();
        assert!(state.share.stopped);
        assert_eq!(state.share.range, Some(TimeRange::new(600.0, 650.0)));
        assert!(log.calls().ends_with(&[MediaCall::Pause, MediaCall::Seek { time: 650.0 }]));
        assert_eq!(state.display_time, 650.0);
    }
}
