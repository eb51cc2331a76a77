//! Clipboard seam and the share action.
//!
//! Copying a share link is best-effort: the link stays valid when the copy
//! fails, and the failure becomes a notice for the user.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clipdeck_models::ShareDraft;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::TimelineResult;

/// Notice shown after a successful copy.
pub const COPIED_NOTICE: &str = "Share link copied to the clipboard.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClipboardError {
    #[error("Clipboard access denied")]
    Denied,

    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

pub type ClipboardResult<T> = Result<T, ClipboardError>;

/// System clipboard, write-only.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> ClipboardResult<()>;
}

/// Result of generating a share link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareOutcome {
    /// The generated link
    pub url: String,
    /// Whether the link reached the clipboard
    pub copied: bool,
    /// Transient message for the user
    pub notice: String,
}

/// Generate the draft's link against `page_url` and try to copy it.
pub async fn share_draft(
    clipboard: &dyn Clipboard,
    draft: &ShareDraft,
    page_url: &str,
) -> TimelineResult<ShareOutcome> {
    let url = draft.to_url(page_url)?.to_string();

    let outcome = match clipboard.write_text(&url).await {
        Ok(()) => {
            info!(url = %url, "Share link copied");
            ShareOutcome {
                url,
                copied: true,
                notice: COPIED_NOTICE.to_string(),
            }
        }
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to copy share link");
            ShareOutcome {
                url,
                copied: false,
                notice: format!("Could not copy the link ({}). Copy it manually.", e),
            }
        }
    };

    Ok(outcome)
}

/// In-memory clipboard keeping everything written to it.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.entries().pop()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> ClipboardResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        entries.push(text.to_string());
        Ok(())
    }
}

/// Clipboard that refuses every write.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedClipboard;

#[async_trait]
impl Clipboard for DeniedClipboard {
    async fn write_text(&self, _text: &str) -> ClipboardResult<()> {
        Err(ClipboardError::Denied)
    }
}
