//! The clip timeline: one owned object per editing session.
//!
//! Holds the clip store, highlights, the playback synchronizer and the
//! share policy. Surfaces never mutate it directly; they send [`Command`]s
//! and read [`TimelineSnapshot`]s.

use clipdeck_models::{decode_share_query, Clip, ClipId, Highlight, ShareDraft, SharePayload};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clipboard::ShareOutcome;
use crate::config::TimelineConfig;
use crate::error::{TimelineError, TimelineResult};
use crate::events::{MediaEvent, WaveformEvent};
use crate::highlights::HighlightAggregator;
use crate::logging::{SessionLogger, Surface};
use crate::media::{MediaSurface, Recovery};
use crate::share_policy::{LogOnly, ShareParamsPolicy, ShareRangeState};
use crate::store::ClipStore;
use crate::sync::{PlaybackSynchronizer, RegionCommit, RegionLabelPolicy};
use crate::waveform::{RegionSpec, WaveformSurface};

/// Everything a surface can ask the timeline to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Point media and waveform at the configured sources
    Load,
    /// Query string (or full URL) the page was opened with
    ApplyShareQuery { query: String },
    Media { event: MediaEvent },
    Waveform { event: WaveformEvent },
    /// A frame was rendered
    FrameTick,
    CreateClip { label: String, from: String, to: String },
    UpdateClip { id: ClipId, from: String, to: String },
    SelectClip { id: ClipId },
    ClearSelection,
    ToggleChecked { id: ClipId },
    SetChecked { ids: Vec<ClipId> },
    CreateHighlight,
    /// Open the share form for a clip, or the selected clip
    OpenShare {
        #[serde(default)]
        id: Option<ClipId>,
    },
    EditShare {
        #[serde(default)]
        from: Option<String>,
        #[serde(default)]
        to: Option<String>,
    },
    /// Generate the share link and copy it
    Share,
    CloseShare,
    Play,
    Pause,
    Seek { time: f64 },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Load => "load",
            Command::ApplyShareQuery { .. } => "apply_share_query",
            Command::Media { .. } => "media",
            Command::Waveform { .. } => "waveform",
            Command::FrameTick => "frame_tick",
            Command::CreateClip { .. } => "create_clip",
            Command::UpdateClip { .. } => "update_clip",
            Command::SelectClip { .. } => "select_clip",
            Command::ClearSelection => "clear_selection",
            Command::ToggleChecked { .. } => "toggle_checked",
            Command::SetChecked { .. } => "set_checked",
            Command::CreateHighlight => "create_highlight",
            Command::OpenShare { .. } => "open_share",
            Command::EditShare { .. } => "edit_share",
            Command::Share => "share",
            Command::CloseShare => "close_share",
            Command::Play => "play",
            Command::Pause => "pause",
            Command::Seek { .. } => "seek",
        }
    }
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Done,
    Clip { clip: Clip },
    Checked { id: ClipId, checked: bool },
    Highlight { highlight: Highlight },
    SharePayload { payload: Option<SharePayload> },
    ShareDraft { draft: ShareDraft },
    Shared { share: ShareOutcome },
    Recovery { recovery: Recovery },
}

/// Read-only view of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSnapshot {
    pub session_id: String,
    pub clips: Vec<Clip>,
    pub selected: Option<ClipId>,
    pub checked: Vec<ClipId>,
    pub highlights: Vec<Highlight>,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub waveform_ready: bool,
    pub share_policy: String,
    pub share_range: ShareRangeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_draft: Option<ShareDraft>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_share: Option<ShareOutcome>,
    /// Message for the last command that failed, until the next success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Owned editing-session state.
pub struct ClipTimeline<M, W> {
    config: TimelineConfig,
    store: ClipStore,
    highlights: HighlightAggregator,
    sync: PlaybackSynchronizer<M, W>,
    share_policy: Box<dyn ShareParamsPolicy>,
    region_label: RegionLabelPolicy,
    share_draft: Option<ShareDraft>,
    last_share: Option<ShareOutcome>,
    last_error: Option<String>,
    logger: SessionLogger,
}

impl<M: MediaSurface, W: WaveformSurface> ClipTimeline<M, W> {
    pub fn new(config: TimelineConfig, clips: Vec<Clip>, media: M, waveform: W) -> Self {
        let store = ClipStore::with_clips(clips).with_policy(config.span_policy);
        let sync = PlaybackSynchronizer::new(media, waveform, config.seek_tolerance_secs);
        let logger = SessionLogger::new(Surface::Editor);
        logger.log_start(&config.manifest_url);

        Self {
            region_label: config.region_label.clone(),
            config,
            store,
            highlights: HighlightAggregator::new(),
            sync,
            share_policy: Box::new(LogOnly::new()),
            share_draft: None,
            last_share: None,
            last_error: None,
            logger,
        }
    }

    /// Replace the share-parameter strategy.
    pub fn with_share_policy(mut self, policy: Box<dyn ShareParamsPolicy>) -> Self {
        self.share_policy = policy;
        self
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn store(&self) -> &ClipStore {
        &self.store
    }

    pub fn highlights(&self) -> &HighlightAggregator {
        &self.highlights
    }

    pub fn sync(&self) -> &PlaybackSynchronizer<M, W> {
        &self.sync
    }

    pub fn logger(&self) -> &SessionLogger {
        &self.logger
    }

    /// Apply one command. Failures are also kept for the next snapshot.
    pub fn dispatch(&mut self, command: Command) -> TimelineResult<Outcome> {
        let name = command.name();
        match self.apply(command) {
            Ok(outcome) => {
                self.last_error = None;
                Ok(outcome)
            }
            Err(e) => {
                debug!(command = name, error = %e, "Command rejected");
                self.last_error = Some(e.user_message().unwrap_or_else(|| e.to_string()));
                Err(e)
            }
        }
    }

    fn apply(&mut self, command: Command) -> TimelineResult<Outcome> {
        match command {
            Command::Load => {
                self.sync.load(&self.config.manifest_url, &self.config.audio_url);
                self.store.set_duration(None);
                Ok(Outcome::Done)
            }
            Command::ApplyShareQuery { query } => {
                let payload = decode_share_query(&query);
                match &payload {
                    Some(p) => {
                        let actions = self.share_policy.on_load(p);
                        self.sync.apply_share_actions(actions);
                    }
                    None => debug!(query = %query, "No usable share parameters"),
                }
                Ok(Outcome::SharePayload { payload })
            }
            Command::Media { event } => {
                let recovery = self.sync.on_media_event(&event);
                let actions = self.share_policy.on_media_event(&event);
                self.sync.apply_share_actions(actions);
                self.store.set_duration(self.sync.duration());
                Ok(recovery.map_or(Outcome::Done, |recovery| Outcome::Recovery { recovery }))
            }
            Command::Waveform { event } => {
                let commit = self.sync.on_waveform_event(&event);
                self.store.set_duration(self.sync.duration());
                match commit {
                    Some(commit) => self.commit_region(commit),
                    None => Ok(Outcome::Done),
                }
            }
            Command::FrameTick => {
                self.sync.on_frame();
                Ok(Outcome::Done)
            }
            Command::CreateClip { label, from, to } => {
                let clip = self.store.create_clip(&label, &from, &to)?;
                Ok(Outcome::Clip { clip })
            }
            Command::UpdateClip { id, from, to } => {
                let clip = self.store.update_clip(id, &from, &to)?;
                if self.store.selected_id() == Some(id) {
                    self.sync.on_clip_selected(&clip);
                }
                Ok(Outcome::Clip { clip })
            }
            Command::SelectClip { id } => {
                let clip = self.store.select_clip(id)?.clone();
                self.sync.on_clip_selected(&clip);
                Ok(Outcome::Clip { clip })
            }
            Command::ClearSelection => {
                self.store.clear_selection();
                Ok(Outcome::Done)
            }
            Command::ToggleChecked { id } => {
                let checked = self.store.toggle_checked(id)?;
                Ok(Outcome::Checked { id, checked })
            }
            Command::SetChecked { ids } => {
                self.store.set_checked_clips(ids);
                Ok(Outcome::Done)
            }
            Command::CreateHighlight => {
                let highlight = self.highlights.create_highlight(&mut self.store)?;
                Ok(Outcome::Highlight { highlight })
            }
            Command::OpenShare { id } => {
                let clip = match id {
                    Some(id) => self.store.get(id).ok_or(TimelineError::ClipNotFound(id))?,
                    None => self.store.selected().ok_or(TimelineError::NoClipSelected)?,
                };
                let draft = ShareDraft::for_clip(clip);
                self.share_draft = Some(draft.clone());
                self.last_share = None;
                Ok(Outcome::ShareDraft { draft })
            }
            Command::EditShare { from, to } => {
                let mut draft = self.share_draft.clone().ok_or(TimelineError::NoClipSelected)?;
                if let Some(from) = from {
                    draft = draft.with_from(from);
                }
                if let Some(to) = to {
                    draft = draft.with_to(to);
                }
                self.share_draft = Some(draft.clone());
                Ok(Outcome::ShareDraft { draft })
            }
            Command::Share => {
                // Copying needs the clipboard; sessions complete this step.
                let draft = self.share_draft.clone().ok_or(TimelineError::NoClipSelected)?;
                Ok(Outcome::ShareDraft { draft })
            }
            Command::CloseShare => {
                self.share_draft = None;
                Ok(Outcome::Done)
            }
            Command::Play => {
                self.sync.media_mut().play();
                Ok(Outcome::Done)
            }
            Command::Pause => {
                self.sync.media_mut().pause();
                Ok(Outcome::Done)
            }
            Command::Seek { time } => {
                self.sync.seek_all(time);
                Ok(Outcome::Done)
            }
        }
    }

    /// Commit released region bounds through the store.
    ///
    /// Rejected bounds leave the clip untouched and the region is redrawn at
    /// the stored bounds.
    fn commit_region(&mut self, commit: RegionCommit) -> TimelineResult<Outcome> {
        match self.store.update_clip_bounds(commit.clip_id, commit.from, commit.to) {
            Ok(clip) => {
                let label = self.region_label.label_for(&clip.label);
                let clip = self.store.relabel(clip.id, label)?;
                info!(clip_id = %clip.id, from = clip.from, to = clip.to, "Region committed");
                Ok(Outcome::Clip { clip })
            }
            Err(e) => {
                warn!(clip_id = %commit.clip_id, error = %e, "Region commit rejected");
                if let Some(clip) = self.store.get(commit.clip_id) {
                    let spec = RegionSpec::for_clip(clip.id, clip.from, clip.to);
                    self.sync.restore_region(spec);
                }
                Err(e)
            }
        }
    }

    /// Record the result of a share the session completed.
    pub fn record_share(&mut self, outcome: ShareOutcome) {
        self.last_share = Some(outcome);
    }

    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            session_id: self.logger.session_id().to_string(),
            clips: self.store.clips().to_vec(),
            selected: self.store.selected_id(),
            checked: self.store.checked_ids().to_vec(),
            highlights: self.highlights.highlights().to_vec(),
            current_time: self.sync.current_time(),
            duration: self.sync.duration(),
            waveform_ready: self.sync.waveform_ready(),
            share_policy: self.share_policy.name().to_string(),
            share_range: self.share_policy.state(),
            share_draft: self.share_draft.clone(),
            last_share: self.last_share.clone(),
            error: self.last_error.clone(),
        }
    }
}

impl<M, W> Drop for ClipTimeline<M, W> {
    fn drop(&mut self) {
        self.logger.log_end("timeline dropped");
    }
}
