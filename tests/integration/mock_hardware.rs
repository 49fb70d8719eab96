//! Mock display and audio peripherals for integration tests.

use deskmate::hardware::{AudioError, AudioPlayer, DisplayPort};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

/// Display that records every message pushed to it.
pub struct RecordingDisplay {
    messages: Mutex<Vec<String>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Default for RecordingDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for RecordingDisplay {
    fn display_message(&self, text: &str) -> bool {
        self.messages.lock().unwrap().push(text.to_string());
        true
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// Audio player that records loads, plays, and volume changes.
///
/// `silence()` simulates the engine going quiet without a stop, which the
/// ring supervision loop must detect and recover from.
pub struct MockPlayer {
    loads: Mutex<Vec<PathBuf>>,
    volumes: Mutex<Vec<f32>>,
    play_count: AtomicU32,
    playing: AtomicBool,
}

impl MockPlayer {
    pub fn new() -> Self {
        Self {
            loads: Mutex::new(Vec::new()),
            volumes: Mutex::new(Vec::new()),
            play_count: AtomicU32::new(0),
            playing: AtomicBool::new(false),
        }
    }

    pub fn loads(&self) -> Vec<PathBuf> {
        self.loads.lock().unwrap().clone()
    }

    pub fn volumes(&self) -> Vec<f32> {
        self.volumes.lock().unwrap().clone()
    }

    pub fn play_count(&self) -> u32 {
        self.play_count.load(Ordering::SeqCst)
    }

    /// Simulate playback dying without a stop request.
    pub fn silence(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }
}

impl Default for MockPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlayer for MockPlayer {
    fn load(&self, path: &Path) -> Result<(), AudioError> {
        self.loads.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn play(&self, _looped: bool) {
        self.play_count.fetch_add(1, Ordering::SeqCst);
        self.playing.store(true, Ordering::SeqCst);
    }

    fn set_volume(&self, volume: f32) {
        self.volumes.lock().unwrap().push(volume);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }
}
