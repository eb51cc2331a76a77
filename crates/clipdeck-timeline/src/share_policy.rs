//! What a surface does with share parameters found on load.
//!
//! The editor only logs an incoming range. The viewer seeks to it, plays,
//! and stops once at its end.
//!
//! Policies never drive playback themselves. They return [`ShareAction`]s
//! and the owning surface applies them, so seeks go through the same path
//! as every other time change.

use clipdeck_models::{SharePayload, TimeRange};
use serde::Serialize;
use tracing::{debug, info};

use crate::events::MediaEvent;

/// Playback change requested by a share policy, applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "action", content = "time", rename_all = "snake_case")]
pub enum ShareAction {
    Seek(f64),
    Play,
    Pause,
}

/// Strategy applied when the page was opened from a share link.
pub trait ShareParamsPolicy: Send {
    /// Short name for logs and snapshots.
    fn name(&self) -> &'static str;

    /// Share parameters were present on load.
    fn on_load(&mut self, payload: &SharePayload) -> Vec<ShareAction>;

    /// Observe a media event after load.
    fn on_media_event(&mut self, _event: &MediaEvent) -> Vec<ShareAction> {
        Vec::new()
    }

    /// Current state for snapshots.
    fn state(&self) -> ShareRangeState {
        ShareRangeState::default()
    }
}

/// Observable share-range state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShareRangeState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_name: Option<String>,
    pub stopped: bool,
    pub user_resumed: bool,
}

/// Editor behaviour: record the incoming range, never touch playback.
#[derive(Debug, Default)]
pub struct LogOnly {
    received: Option<SharePayload>,
}

impl LogOnly {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShareParamsPolicy for LogOnly {
    fn name(&self) -> &'static str {
        "log_only"
    }

    fn on_load(&mut self, payload: &SharePayload) -> Vec<ShareAction> {
        info!(
            from = payload.from,
            to = payload.to,
            clip = payload.display_name(),
            "Shared range received"
        );
        self.received = Some(payload.clone());
        Vec::new()
    }

    fn state(&self) -> ShareRangeState {
        ShareRangeState {
            range: self.received.as_ref().map(|p| TimeRange::new(p.from, p.to)),
            clip_name: self.received.as_ref().and_then(|p| p.clip_name.clone()),
            stopped: false,
            user_resumed: false,
        }
    }
}

/// Viewer behaviour: seek to `from`, play, and pause at `to` once.
///
/// After the stop, a user-initiated play disables auto-pause for the rest of
/// the load. Until then, buffering events that could restart playback are
/// answered with another pause.
#[derive(Debug, Default)]
pub struct AutoStopRange {
    payload: Option<SharePayload>,
    awaiting_play: bool,
    stopped: bool,
    user_resumed: bool,
}

impl AutoStopRange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_stopped(&self) -> bool {
        self.stopped
    }

    pub fn user_resumed(&self) -> bool {
        self.user_resumed
    }
}

impl ShareParamsPolicy for AutoStopRange {
    fn name(&self) -> &'static str {
        "auto_stop_range"
    }

    fn on_load(&mut self, payload: &SharePayload) -> Vec<ShareAction> {
        info!(from = payload.from, to = payload.to, "Applying shared range");
        self.payload = Some(payload.clone());
        self.awaiting_play = true;
        self.stopped = false;
        self.user_resumed = false;
        vec![ShareAction::Seek(payload.from)]
    }

    fn on_media_event(&mut self, event: &MediaEvent) -> Vec<ShareAction> {
        let Some(to) = self.payload.as_ref().map(|p| p.to) else {
            return Vec::new();
        };

        match event {
            MediaEvent::CanPlay if self.awaiting_play && !self.stopped => {
                self.awaiting_play = false;
                vec![ShareAction::Play]
            }
            MediaEvent::Progress { time } if !self.stopped && !self.user_resumed && *time >= to => {
                self.stopped = true;
                info!(to, "Shared range reached, playback paused");
                vec![ShareAction::Pause, ShareAction::Seek(to)]
            }
            MediaEvent::Play if self.stopped && !self.user_resumed => {
                self.user_resumed = true;
                debug!("Playback resumed after shared range stop");
                Vec::new()
            }
            MediaEvent::Buffering { state } if self.stopped && !self.user_resumed => {
                debug!(state = ?state, "Holding pause after shared range stop");
                vec![ShareAction::Pause]
            }
            _ => Vec::new(),
        }
    }

    fn state(&self) -> ShareRangeState {
        ShareRangeState {
            range: self.payload.as_ref().map(|p| TimeRange::new(p.from, p.to)),
            clip_name: self.payload.as_ref().and_then(|p| p.clip_name.clone()),
            stopped: self.stopped,
            user_resumed: self.user_resumed,
        }
    }
}
