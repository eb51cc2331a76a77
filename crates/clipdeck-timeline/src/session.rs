//! Editor session: the timeline running in its own task.
//!
//! Surfaces talk to it through an [`EditorHandle`]: commands go in over an
//! mpsc channel, each answered on a oneshot, and every applied command
//! publishes a fresh [`TimelineSnapshot`] on a watch channel.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, Instrument};

use crate::clipboard::{share_draft, Clipboard};
use crate::error::{TimelineError, TimelineResult};
use crate::media::MediaSurface;
use crate::timeline::{ClipTimeline, Command, Outcome, TimelineSnapshot};
use crate::waveform::WaveformSurface;

const COMMAND_BUFFER_SIZE: usize = 64;

struct Request {
    command: Command,
    reply: oneshot::Sender<TimelineResult<Outcome>>,
}

/// Spawns editor sessions.
pub struct EditorSession;

impl EditorSession {
    /// Move `timeline` into a new task and return a handle to it.
    ///
    /// The task ends when every handle has been dropped.
    pub fn spawn<M, W>(timeline: ClipTimeline<M, W>, clipboard: Arc<dyn Clipboard>) -> (EditorHandle, JoinHandle<()>)
    where
        M: MediaSurface + Send + 'static,
        W: WaveformSurface + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER_SIZE);
        let (snapshot_tx, snapshot_rx) = watch::channel(timeline.snapshot());
        let span = timeline.logger().create_span();

        let task = tokio::spawn(run(timeline, clipboard, rx, snapshot_tx).instrument(span));

        let handle = EditorHandle {
            tx,
            snapshot: snapshot_rx,
        };
        (handle, task)
    }
}

async fn run<M, W>(
    mut timeline: ClipTimeline<M, W>,
    clipboard: Arc<dyn Clipboard>,
    mut rx: mpsc::Receiver<Request>,
    snapshot_tx: watch::Sender<TimelineSnapshot>,
) where
    M: MediaSurface,
    W: WaveformSurface,
{
    while let Some(Request { command, reply }) = rx.recv().await {
        let is_share = matches!(command, Command::Share);
        let mut result = timeline.dispatch(command);

        let pending_share = match &result {
            Ok(Outcome::ShareDraft { draft }) if is_share => Some(draft.clone()),
            _ => None,
        };
        if let Some(draft) = pending_share {
            let page_url = timeline.config().page_url.clone();
            result = share_draft(clipboard.as_ref(), &draft, &page_url)
                .await
                .map(|share| {
                    timeline.record_share(share.clone());
                    Outcome::Shared { share }
                });
        }

        snapshot_tx.send_replace(timeline.snapshot());

        if reply.send(result).is_err() {
            debug!("Command caller went away before the reply");
        }
    }

    timeline.logger().log_end("all handles dropped");
}

/// Command channel plus read-only view of an editor session.
#[derive(Clone)]
pub struct EditorHandle {
    tx: mpsc::Sender<Request>,
    snapshot: watch::Receiver<TimelineSnapshot>,
}

impl EditorHandle {
    /// Send a command and wait for its outcome.
    pub async fn send(&self, command: Command) -> TimelineResult<Outcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request { command, reply })
            .await
            .map_err(|_| TimelineError::SessionClosed)?;
        rx.await.map_err(|_| TimelineError::SessionClosed)?
    }

    /// Latest published state.
    pub fn snapshot(&self) -> TimelineSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified after every applied command.
    pub fn subscribe(&self) -> watch::Receiver<TimelineSnapshot> {
        self.snapshot.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
