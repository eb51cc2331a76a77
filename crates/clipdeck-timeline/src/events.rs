//! Tagged events from the media and waveform collaborators.
//!
//! Adapters translate whatever the streaming and waveform libraries emit
//! into these closed sets before anything reaches the clip store or the
//! synchronizer.

use serde::{Deserialize, Serialize};

use crate::waveform::RegionId;

/// Failure class reported by the streaming collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaErrorKind {
    /// Manifest or segment fetch failed
    Network,
    /// Decoder pipeline failed
    Decode,
    /// Anything else
    #[serde(other)]
    Other,
}

impl MediaErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaErrorKind::Network => "network",
            MediaErrorKind::Decode => "decode",
            MediaErrorKind::Other => "other",
        }
    }
}

/// Buffering-state notifications that can silently resume playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferState {
    LoadStart,
    CanPlayThrough,
    Waiting,
    Stalled,
}

/// Event from the media surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaEvent {
    /// Manifest parsed / metadata loaded
    Ready { duration: f64 },

    /// Playback position changed (time update or completed seek)
    Progress { time: f64 },

    /// Enough data to start playing
    CanPlay,

    /// Playback started, by the user or programmatically
    Play,

    /// Playback paused
    Pause,

    /// Buffering state change
    Buffering { state: BufferState },

    /// Playback could not start
    PlayRejected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Streaming error
    Error {
        kind: MediaErrorKind,
        fatal: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

/// Phase of a region gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionPhase {
    Start,
    Drag,
    End,
}

/// Event from the waveform surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WaveformEvent {
    /// Audio decoded and drawn
    Ready { duration: f64 },

    /// Click on the track; `offset_x` is relative to the visible viewport
    Click {
        offset_x: f64,
        #[serde(default)]
        on_region: bool,
    },

    /// Pointer pressed on the track to drag-scroll it
    ScrollDragStart {
        client_x: f64,
        #[serde(default)]
        on_region: bool,
    },

    /// Pointer moved while drag-scrolling
    ScrollDragMove { client_x: f64 },

    /// Pointer released
    ScrollDragEnd,

    /// A region was moved or resized
    Region {
        id: RegionId,
        start: f64,
        end: f64,
        phase: RegionPhase,
    },
}
