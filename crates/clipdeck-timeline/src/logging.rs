//! Structured session logging utilities.
//!
//! Every editing or viewing session gets an ID so that log lines from the
//! media pipeline, the waveform and the clip store can be correlated.

use std::fmt;

use tracing::{info, warn, Span};
use uuid::Uuid;

/// Which surface a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Editor,
    Viewer,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Editor => "editor",
            Surface::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session logger carrying the session ID and surface on every event.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    session_id: String,
    surface: Surface,
}

impl SessionLogger {
    /// Create a logger for a fresh session.
    pub fn new(surface: Surface) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            surface,
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            surface = %self.surface,
            "Session started: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            session_id = %self.session_id,
            surface = %self.surface,
            "Session warning: {}", message
        );
    }

    pub fn log_end(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            surface = %self.surface,
            "Session ended: {}", message
        );
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Span to instrument the session's event loop with.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "session",
            session_id = %self.session_id,
            surface = %self.surface
        )
    }
}
