//! Audio playback peripheral.
//!
//! `RodioPlayer` owns a dedicated worker thread for the output stream,
//! because rodio's `OutputStream` cannot move between threads. Callers talk
//! to the worker over a command channel; playback status is mirrored into a
//! shared flag so `is_playing()` never blocks.

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use rodio::{Decoder, OutputStream, Sink, Source};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during audio operations.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),

    #[error("Sound file not found: {0}")]
    SoundNotFound(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Capability interface for the alarm sound output.
pub trait AudioPlayer: Send + Sync {
    /// Load a sound file into memory, replacing any previously loaded one.
    fn load(&self, path: &Path) -> Result<(), AudioError>;

    /// Start playing the loaded sound, optionally looping until stopped.
    fn play(&self, looped: bool);

    /// Set output volume in `[0.0, 1.0]`, applied to live playback.
    fn set_volume(&self, volume: f32);

    /// Check whether the player is actively producing sound.
    fn is_playing(&self) -> bool;

    /// Halt playback. Safe to call when nothing is playing.
    fn stop(&self);
}

enum PlayerCommand {
    Play { data: Vec<u8>, looped: bool },
    SetVolume(f32),
    Stop,
    Shutdown,
}

/// Rodio-backed audio player.
pub struct RodioPlayer {
    tx: Sender<PlayerCommand>,
    playing: Arc<AtomicBool>,
    loaded: Mutex<Option<Vec<u8>>>,
}

impl RodioPlayer {
    /// Create the player and its worker thread.
    ///
    /// Fails with `DeviceNotAvailable` when no audio output device can be
    /// opened, letting the host fall back to a silent player.
    pub fn new() -> Result<Self, AudioError> {
        let (tx, rx) = unbounded();
        let (ready_tx, ready_rx) = unbounded();
        let playing = Arc::new(AtomicBool::new(false));
        let worker_playing = playing.clone();

        std::thread::Builder::new()
            .name("audio-player".into())
            .spawn(move || run_worker(rx, worker_playing, ready_tx))
            .map_err(|e| AudioError::DeviceNotAvailable(e.to_string()))?;

        match ready_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Ok(())) => Ok(Self {
                tx,
                playing,
                loaded: Mutex::new(None),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AudioError::DeviceNotAvailable(
                "audio worker did not report ready".into(),
            )),
        }
    }
}

impl AudioPlayer for RodioPlayer {
    fn load(&self, path: &Path) -> Result<(), AudioError> {
        let data = std::fs::read(path)
            .map_err(|_| AudioError::SoundNotFound(path.display().to_string()))?;
        *self.loaded.lock().unwrap() = Some(data);
        Ok(())
    }

    fn play(&self, looped: bool) {
        let data = match self.loaded.lock().unwrap().clone() {
            Some(d) => d,
            None => {
                tracing::warn!("play requested with no sound loaded");
                return;
            }
        };
        // Optimistically mark as playing; the worker refreshes the flag.
        self.playing.store(true, Ordering::Relaxed);
        let _ = self.tx.send(PlayerCommand::Play { data, looped });
    }

    fn set_volume(&self, volume: f32) {
        let _ = self.tx.send(PlayerCommand::SetVolume(volume.clamp(0.0, 1.0)));
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    fn stop(&self) {
        self.playing.store(false, Ordering::Relaxed);
        let _ = self.tx.send(PlayerCommand::Stop);
    }
}

impl Drop for RodioPlayer {
    fn drop(&mut self) {
        let _ = self.tx.send(PlayerCommand::Shutdown);
    }
}

/// Worker loop owning the output stream and sink.
///
/// The stream must be created on the thread that plays through it.
fn run_worker(
    rx: Receiver<PlayerCommand>,
    playing: Arc<AtomicBool>,
    ready_tx: Sender<Result<(), AudioError>>,
) {
    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(s) => {
            let _ = ready_tx.send(Ok(()));
            s
        }
        Err(e) => {
            let _ = ready_tx.send(Err(AudioError::DeviceNotAvailable(e.to_string())));
            return;
        }
    };

    let mut sink: Option<Sink> = None;
    let mut volume = 1.0f32;

    loop {
        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(PlayerCommand::Play { data, looped }) => {
                if let Some(old) = sink.take() {
                    old.stop();
                }
                match Sink::try_new(&stream_handle) {
                    Ok(new_sink) => match Decoder::new(Cursor::new(data)) {
                        Ok(source) => {
                            new_sink.set_volume(volume);
                            if looped {
                                new_sink.append(source.repeat_infinite());
                            } else {
                                new_sink.append(source);
                            }
                            sink = Some(new_sink);
                        }
                        Err(e) => tracing::warn!("failed to decode sound data: {e}"),
                    },
                    Err(e) => tracing::warn!("failed to open playback sink: {e}"),
                }
            }
            Ok(PlayerCommand::SetVolume(v)) => {
                volume = v;
                if let Some(s) = &sink {
                    s.set_volume(v);
                }
            }
            Ok(PlayerCommand::Stop) => {
                if let Some(s) = sink.take() {
                    s.stop();
                }
            }
            Ok(PlayerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let active = sink.as_ref().map(|s| !s.empty()).unwrap_or(false);
        playing.store(active, Ordering::Relaxed);
    }
}

/// Silent player stub.
///
/// Accepts every `load` and tracks play/stop/volume state without touching
/// any device. Used by tests and as the host fallback when no audio device
/// is present.
pub struct NullPlayer {
    playing: AtomicBool,
    volume: Mutex<f32>,
}

impl NullPlayer {
    /// Create a new silent player.
    pub fn new() -> Self {
        Self {
            playing: AtomicBool::new(false),
            volume: Mutex::new(1.0),
        }
    }

    /// Current volume, for assertions in tests.
    pub fn volume(&self) -> f32 {
        *self.volume.lock().unwrap()
    }
}

impl Default for NullPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlayer for NullPlayer {
    fn load(&self, _path: &Path) -> Result<(), AudioError> {
        Ok(())
    }

    fn play(&self, _looped: bool) {
        self.playing.store(true, Ordering::Relaxed);
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock().unwrap() = volume.clamp(0.0, 1.0);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    fn stop(&self) {
        self.playing.store(false, Ordering::Relaxed);
    }
}
