//! Headless collaborators.
//!
//! In-memory media and waveform surfaces that record every command they
//! receive. They back the `clipdeck` script runner and the test suites.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::media::{MediaBackend, MediaFactory, MediaSurface, StreamConfig};
use crate::waveform::{RegionId, RegionSpec, TrackGeometry, WaveformSurface};

/// Command received by a headless media surface or backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum MediaCall {
    Create { generation: u64, start_position: Option<f64> },
    Load { url: String },
    Seek { time: f64 },
    Play,
    Pause,
    RecoverNetwork,
    RecoverDecode,
    Destroy { generation: u64 },
}

/// Shared, append-only record of media calls.
#[derive(Debug, Clone, Default)]
pub struct MediaLog {
    calls: Arc<Mutex<Vec<MediaCall>>>,
}

impl MediaLog {
    fn push(&self, call: MediaCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    pub fn calls(&self) -> Vec<MediaCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Seek targets in order.
    pub fn seeks(&self) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MediaCall::Seek { time } => Some(time),
                _ => None,
            })
            .collect()
    }

    /// Sessions created and not yet destroyed.
    pub fn live_sessions(&self) -> usize {
        let calls = self.calls();
        let created = calls.iter().filter(|c| matches!(c, MediaCall::Create { .. })).count();
        let destroyed = calls.iter().filter(|c| matches!(c, MediaCall::Destroy { .. })).count();
        created.saturating_sub(destroyed)
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }
}

/// Media surface that just tracks position and play state.
#[derive(Debug, Clone, Default)]
pub struct HeadlessMedia {
    time: f64,
    playing: bool,
    log: MediaLog,
}

impl HeadlessMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> MediaLog {
        self.log.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Simulate the native position moving without a seek (playback).
    pub fn set_native_time(&mut self, time: f64) {
        self.time = time;
    }
}

impl MediaSurface for HeadlessMedia {
    fn load(&mut self, url: &str) {
        self.time = 0.0;
        self.log.push(MediaCall::Load { url: url.to_string() });
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn seek(&mut self, time: f64) {
        self.time = time;
        self.log.push(MediaCall::Seek { time });
    }

    fn play(&mut self) {
        self.playing = true;
        self.log.push(MediaCall::Play);
    }

    fn pause(&mut self) {
        self.playing = false;
        self.log.push(MediaCall::Pause);
    }
}

/// Factory for [`HeadlessBackend`] sessions sharing one log.
#[derive(Debug, Clone, Default)]
pub struct HeadlessFactory {
    log: MediaLog,
    created: u64,
}

impl HeadlessFactory {
    pub fn log(&self) -> MediaLog {
        self.log.clone()
    }
}

impl MediaFactory for HeadlessFactory {
    type Backend = HeadlessBackend;

    fn create(&mut self, config: &StreamConfig) -> HeadlessBackend {
        self.created += 1;
        self.log.push(MediaCall::Create {
            generation: self.created,
            start_position: config.start_position,
        });
        HeadlessBackend {
            generation: self.created,
            time: config.start_position.unwrap_or(0.0),
            log: self.log.clone(),
        }
    }
}

/// One headless decoding session.
#[derive(Debug)]
pub struct HeadlessBackend {
    generation: u64,
    time: f64,
    log: MediaLog,
}

impl HeadlessBackend {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl MediaBackend for HeadlessBackend {
    fn load_source(&mut self, url: &str) {
        self.log.push(MediaCall::Load { url: url.to_string() });
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn seek(&mut self, time: f64) {
        self.time = time;
        self.log.push(MediaCall::Seek { time });
    }

    fn play(&mut self) {
        self.log.push(MediaCall::Play);
    }

    fn pause(&mut self) {
        self.log.push(MediaCall::Pause);
    }

    fn recover_network(&mut self) {
        self.log.push(MediaCall::RecoverNetwork);
    }

    fn recover_decode(&mut self) {
        self.log.push(MediaCall::RecoverDecode);
    }

    fn destroy(&mut self) {
        self.log.push(MediaCall::Destroy {
            generation: self.generation,
        });
    }
}

/// Observable state of a headless waveform.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WaveformState {
    pub audio_url: Option<String>,
    pub geometry: TrackGeometry,
    pub cursor_px: Option<f64>,
    pub regions: Vec<RegionSpec>,
    pub cursor_moves: usize,
}

/// Waveform surface with fixed track dimensions.
#[derive(Debug, Clone, Default)]
pub struct HeadlessWaveform {
    state: Arc<Mutex<WaveformState>>,
}

impl HeadlessWaveform {
    pub fn new(scroll_width: f64, client_width: f64) -> Self {
        let state = WaveformState {
            geometry: TrackGeometry::new(scroll_width, client_width),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Snapshot of the waveform; handles share state with clones.
    pub fn state(&self) -> WaveformState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn with_state(&self, f: impl FnOnce(&mut WaveformState)) {
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
    }
}

impl WaveformSurface for HeadlessWaveform {
    fn load(&mut self, audio_url: &str) {
        self.with_state(|s| s.audio_url = Some(audio_url.to_string()));
    }

    fn geometry(&self) -> TrackGeometry {
        self.state().geometry
    }

    fn set_scroll_left(&mut self, px: f64) {
        self.with_state(|s| s.geometry.scroll_left = px);
    }

    fn set_cursor(&mut self, px: f64) {
        self.with_state(|s| {
            s.cursor_px = Some(px);
            s.cursor_moves += 1;
        });
    }

    fn region_ids(&self) -> Vec<RegionId> {
        self.state().regions.into_iter().map(|r| r.id).collect()
    }

    fn add_region(&mut self, region: RegionSpec) {
        self.with_state(|s| {
            s.regions.retain(|r| r.id != region.id);
            s.regions.push(region);
        });
    }

    fn remove_region(&mut self, id: &RegionId) {
        self.with_state(|s| s.regions.retain(|r| &r.id != id));
    }
}
