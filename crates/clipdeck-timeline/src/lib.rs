//! Clip timeline model for the clipdeck editor and viewer.
//!
//! This crate provides:
//! - Clip store with ordered validation and a highlight checklist
//! - Playback synchronizer keeping media and waveform on one time
//! - Media session lifecycle and error recovery
//! - Share-parameter policies and the clipboard seam
//! - Viewer surface with clip-confined playback
//! - Editor sessions driven over a command channel
//! - Headless collaborators for scripting and tests

pub mod clipboard;
pub mod config;
pub mod error;
pub mod events;
pub mod headless;
pub mod highlights;
pub mod logging;
pub mod media;
pub mod session;
pub mod share_policy;
pub mod store;
pub mod sync;
pub mod throttle;
pub mod timeline;
pub mod viewer;
pub mod waveform;

pub use clipboard::{share_draft, Clipboard, ClipboardError, MemoryClipboard, ShareOutcome};
pub use config::TimelineConfig;
pub use error::{TimelineError, TimelineResult};
pub use events::{MediaErrorKind, MediaEvent, RegionPhase, WaveformEvent};
pub use highlights::HighlightAggregator;
pub use logging::{SessionLogger, Surface};
pub use media::{MediaBackend, MediaFactory, MediaSession, MediaSurface, Recovery, StreamConfig};
pub use session::{EditorHandle, EditorSession};
pub use share_policy::{AutoStopRange, LogOnly, ShareAction, ShareParamsPolicy};
pub use store::{default_clips, ClipStore};
pub use sync::{PlaybackSynchronizer, RegionCommit, RegionLabelPolicy};
pub use timeline::{ClipTimeline, Command, Outcome, TimelineSnapshot};
pub use viewer::{ViewerClip, ViewerSession};
pub use waveform::{RegionId, WaveformSurface};
