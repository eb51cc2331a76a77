//! Per-frame coalescing of seek requests during drags.

/// Coalesces bursts of values into at most one delivery per rendered frame.
///
/// At most one frame request is outstanding. Values proposed while one is
/// pending overwrite the queued value, so the frame delivers the latest.
#[derive(Debug, Default, Clone)]
pub struct FrameThrottle {
    pending: Option<f64>,
}

impl FrameThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `value`. Returns `true` if a new frame needs to be requested.
    pub fn propose(&mut self, value: f64) -> bool {
        let needs_frame = self.pending.is_none();
        self.pending = Some(value);
        needs_frame
    }

    /// Frame rendered: take the value to deliver, if any.
    pub fn on_frame(&mut self) -> Option<f64> {
        self.pending.take()
    }

    /// Drop a pending request without delivering it.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
