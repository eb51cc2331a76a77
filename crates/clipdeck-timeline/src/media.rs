//! Media collaborator seam and streaming session lifecycle.
//!
//! Decoding and adaptive streaming are external. A [`MediaBackend`] is one
//! decoding session bound to the video surface; a [`MediaSession`] owns at
//! most one backend at a time, recreates it on demand, and applies the error
//! recovery policy.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::events::MediaErrorKind;

/// What the synchronizer needs from the video surface.
pub trait MediaSurface {
    /// Load a new source.
    fn load(&mut self, url: &str);

    /// Current native playback position in seconds.
    fn current_time(&self) -> f64;

    fn seek(&mut self, time: f64);

    fn play(&mut self);

    fn pause(&mut self);

    /// Manifest parsed / metadata loaded.
    fn on_ready(&mut self) {}

    /// Apply the surface's error policy. Surfaces without one only log.
    fn report_error(&mut self, kind: MediaErrorKind, fatal: bool) -> Recovery {
        debug!(kind = kind.as_str(), fatal, "Media error reported");
        Recovery::Ignored
    }
}

/// One streaming/decoding session attached to the video surface.
pub trait MediaBackend {
    fn load_source(&mut self, url: &str);

    fn current_time(&self) -> f64;

    fn seek(&mut self, time: f64);

    fn play(&mut self);

    fn pause(&mut self);

    /// Restart segment loading after a network failure.
    fn recover_network(&mut self);

    /// Reset the decode pipeline after a media failure.
    fn recover_decode(&mut self);

    /// Detach from the surface and release everything.
    fn destroy(&mut self);
}

/// Creates decoding sessions.
pub trait MediaFactory {
    type Backend: MediaBackend;

    fn create(&mut self, config: &StreamConfig) -> Self::Backend;
}

/// Streaming session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Demux in a worker
    pub enable_worker: bool,
    /// Low-latency mode
    pub low_latency: bool,
    /// Seconds of already-played media kept buffered
    pub back_buffer_secs: u32,
    /// Position to start loading from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_position: Option<f64>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            enable_worker: true,
            low_latency: true,
            back_buffer_secs: 90,
            start_position: None,
        }
    }
}

/// What the session did about an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// Non-fatal: logged only
    Ignored,
    /// Fatal network error: segment loading restarted in place
    ReloadedSegments,
    /// Fatal decode error: decode pipeline reset in place
    ResetDecoder,
    /// Session torn down and created again
    Recreated,
    /// No session to recover
    NoSession,
}

/// Owns the current decoding session and its recovery state.
pub struct MediaSession<F: MediaFactory> {
    factory: F,
    config: StreamConfig,
    backend: Option<F::Backend>,
    url: Option<String>,
    network_retries: u32,
    decode_retries: u32,
    generation: u64,
}

impl<F: MediaFactory> MediaSession<F> {
    pub fn new(factory: F, config: StreamConfig) -> Self {
        Self {
            factory,
            config,
            backend: None,
            url: None,
            network_retries: 0,
            decode_retries: 0,
            generation: 0,
        }
    }

    /// Open `url`, optionally starting at `start_position`.
    ///
    /// Any previous session is destroyed before the new one is created, so
    /// two decoders never drive the surface at once.
    pub fn open(&mut self, url: &str, start_position: Option<f64>) {
        self.teardown();

        let mut config = self.config.clone();
        config.start_position = start_position;

        let mut backend = self.factory.create(&config);
        backend.load_source(url);

        self.backend = Some(backend);
        self.url = Some(url.to_string());
        self.network_retries = 0;
        self.decode_retries = 0;
        self.generation += 1;

        info!(url = %url, generation = self.generation, start = ?start_position, "Media session opened");
    }

    /// Destroy the current session, if any.
    pub fn teardown(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.destroy();
            debug!(generation = self.generation, "Media session destroyed");
        }
    }

    /// Manifest parsed: the session is healthy again.
    pub fn reset_recovery(&mut self) {
        self.network_retries = 0;
        self.decode_retries = 0;
    }

    /// Apply the recovery policy to an error reported by the backend.
    ///
    /// Fatal network and decode errors get one in-place recovery each; a
    /// repeat of the same class, or any other fatal error, recreates the
    /// session at the last known position.
    pub fn handle_error(&mut self, kind: MediaErrorKind, fatal: bool) -> Recovery {
        if !fatal {
            debug!(kind = kind.as_str(), "Non-fatal media error");
            return Recovery::Ignored;
        }

        let Some(backend) = self.backend.as_mut() else {
            warn!(kind = kind.as_str(), "Fatal media error without a session");
            return Recovery::NoSession;
        };

        match kind {
            MediaErrorKind::Network if self.network_retries == 0 => {
                self.network_retries += 1;
                warn!("Fatal network error, reloading segments");
                backend.recover_network();
                Recovery::ReloadedSegments
            }
            MediaErrorKind::Decode if self.decode_retries == 0 => {
                self.decode_retries += 1;
                warn!("Fatal decode error, resetting decoder");
                backend.recover_decode();
                Recovery::ResetDecoder
            }
            _ => {
                let position = backend.current_time();
                warn!(kind = kind.as_str(), position, "Unrecoverable media error, recreating session");
                match self.url.clone() {
                    Some(url) => {
                        self.open(&url, Some(position));
                        Recovery::Recreated
                    }
                    None => {
                        self.teardown();
                        Recovery::NoSession
                    }
                }
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.backend.is_some()
    }

    /// Number of sessions created so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn backend(&self) -> Option<&F::Backend> {
        self.backend.as_ref()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }
}

impl<F: MediaFactory> MediaSurface for MediaSession<F> {
    fn load(&mut self, url: &str) {
        self.open(url, None);
    }

    fn current_time(&self) -> f64 {
        self.backend.as_ref().map(|b| b.current_time()).unwrap_or(0.0)
    }

    fn seek(&mut self, time: f64) {
        if let Some(backend) = self.backend.as_mut() {
            backend.seek(time);
        }
    }

    fn play(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            backend.play();
        }
    }

    fn pause(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            backend.pause();
        }
    }

    fn on_ready(&mut self) {
        self.reset_recovery();
    }

    fn report_error(&mut self, kind: MediaErrorKind, fatal: bool) -> Recovery {
        self.handle_error(kind, fatal)
    }
}

impl<F: MediaFactory> Drop for MediaSession<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}
