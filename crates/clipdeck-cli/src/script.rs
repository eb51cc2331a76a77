//! Session scripts.
//!
//! A script is a JSON document describing one editor or viewer session: the
//! starting clip list, an optional share query, and the steps to replay
//! against headless surfaces.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clipdeck_models::{decode_share_query, Clip};
use clipdeck_timeline::headless::{HeadlessFactory, HeadlessWaveform};
use clipdeck_timeline::viewer::{ViewerState, ViewerClip};
use clipdeck_timeline::{
    default_clips, AutoStopRange, ClipTimeline, Command, EditorSession, LogOnly, MediaEvent,
    MediaSession, MemoryClipboard, Outcome, ShareParamsPolicy, TimelineConfig, TimelineSnapshot,
    ViewerSession,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Track size of the headless waveform, in pixels.
const TRACK_WIDTH: f64 = 4000.0;
const VIEWPORT_WIDTH: f64 = 800.0;

/// Share policy selectable from a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyName {
    #[default]
    LogOnly,
    AutoStopRange,
}

impl PolicyName {
    fn build(self) -> Box<dyn ShareParamsPolicy> {
        match self {
            PolicyName::LogOnly => Box::new(LogOnly::new()),
            PolicyName::AutoStopRange => Box::new(AutoStopRange::new()),
        }
    }
}

/// One step of a viewer script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ViewerStep {
    PlayClip { index: usize },
    TogglePlayPause,
    Replay,
    PlayFullVideo,
    ProgressClick { fraction: f64 },
    Media { event: MediaEvent },
}

/// Session to replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "surface", rename_all = "snake_case")]
pub enum Script {
    Editor {
        /// Starting clips; the built-in list when absent
        #[serde(default)]
        clips: Option<Vec<Clip>>,
        #[serde(default)]
        share_query: Option<String>,
        #[serde(default)]
        policy: PolicyName,
        #[serde(default)]
        commands: Vec<Command>,
    },
    Viewer {
        #[serde(default)]
        clips: Option<Vec<ViewerClip>>,
        #[serde(default)]
        share_query: Option<String>,
        #[serde(default)]
        steps: Vec<ViewerStep>,
    },
}

/// Result of one replayed command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything a replay produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "surface", rename_all = "snake_case")]
pub enum Report {
    Editor {
        steps: Vec<StepResult>,
        snapshot: TimelineSnapshot,
        clipboard: Vec<String>,
    },
    Viewer {
        state: ViewerState,
    },
}

/// Read a script from `path`, or from stdin when `path` is `-`.
pub fn load_script(path: &Path) -> Result<Script> {
    let text = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("Failed to read script from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?
    };
    parse_script(&text)
}

pub fn parse_script(text: &str) -> Result<Script> {
    serde_json::from_str(text).context("Invalid session script")
}

/// Replay `script` against headless surfaces.
pub async fn run_script(script: Script, config: TimelineConfig) -> Result<Report> {
    match script {
        Script::Editor {
            clips,
            share_query,
            policy,
            commands,
        } => run_editor(config, clips, share_query, policy, commands).await,
        Script::Viewer {
            clips,
            share_query,
            steps,
        } => Ok(run_viewer(config, clips, share_query, steps)),
    }
}

async fn run_editor(
    config: TimelineConfig,
    clips: Option<Vec<Clip>>,
    share_query: Option<String>,
    policy: PolicyName,
    commands: Vec<Command>,
) -> Result<Report> {
    let clipboard = MemoryClipboard::new();
    let media = MediaSession::new(HeadlessFactory::default(), config.stream.clone());
    let timeline = ClipTimeline::new(
        config,
        clips.unwrap_or_else(default_clips),
        media,
        HeadlessWaveform::new(TRACK_WIDTH, VIEWPORT_WIDTH),
    )
    .with_share_policy(policy.build());

    let (editor, task) = EditorSession::spawn(timeline, Arc::new(clipboard.clone()));
    info!(session_id = %editor.snapshot().session_id, commands = commands.len(), "Replaying editor script");

    let mut prelude = vec![Command::Load];
    if let Some(query) = share_query {
        prelude.push(Command::ApplyShareQuery { query });
    }

    let mut steps = Vec::with_capacity(prelude.len() + commands.len());
    for command in prelude.into_iter().chain(commands) {
        let step = command.name().to_string();
        let result = match editor.send(command).await {
            Ok(outcome) => StepResult {
                step,
                outcome: Some(outcome),
                error: None,
            },
            Err(e) => {
                warn!(step = %step, error = %e, "Step rejected");
                StepResult {
                    step,
                    outcome: None,
                    error: Some(e.to_string()),
                }
            }
        };
        steps.push(result);
    }

    let snapshot = editor.snapshot();
    drop(editor);
    task.await.context("Editor session task failed")?;

    Ok(Report::Editor {
        steps,
        snapshot,
        clipboard: clipboard.entries(),
    })
}

fn run_viewer(
    config: TimelineConfig,
    clips: Option<Vec<ViewerClip>>,
    share_query: Option<String>,
    steps: Vec<ViewerStep>,
) -> Report {
    let mut viewer = ViewerSession::new(HeadlessFactory::default(), config.manifest_url, config.stream);
    if let Some(clips) = clips {
        viewer = viewer.with_clips(clips);
    }
    if let Some(payload) = share_query.as_deref().and_then(decode_share_query) {
        viewer.apply_share_params(&payload);
    }

    for step in steps {
        match step {
            ViewerStep::PlayClip { index } => {
                if !viewer.play_clip_at(index) {
                    warn!(index, "No clip at index");
                }
            }
            ViewerStep::TogglePlayPause => viewer.toggle_play_pause(),
            ViewerStep::Replay => viewer.replay(),
            ViewerStep::PlayFullVideo => viewer.play_full_video(),
            ViewerStep::ProgressClick { fraction } => viewer.progress_click(fraction),
            ViewerStep::Media { event } => {
                viewer.on_media_event(&event);
            }
        }
    }

    Report::Viewer {
        state: viewer.state(),
    }
}
