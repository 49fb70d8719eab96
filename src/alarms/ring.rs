//! Ring lifecycle controller.
//!
//! Owns the process-wide ringing state and the audio playback worker for
//! the currently firing alarm. The worker handles sound selection with
//! fallback, the gradual volume ramp, and playback supervision; all of its
//! loops poll the ringing flag at sub-second intervals so a stop is
//! observed promptly.

use super::store::AlarmStore;
use super::types::{AlarmId, AlarmSpec, SoundProfile, DEFAULT_SOUND_FILE};
use super::{EngineEvent, SNOOZE_MAX};
use crate::hardware::{AudioPlayer, DisplayPort};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Message shown when the ring stops and the assistant is idle again.
const READY_MESSAGE: &str = "Deskmate ready";

/// Volume change per adjust step.
const VOLUME_STEP: f32 = 0.1;

/// Free-text phrases that stop the ringing alarm.
const STOP_PHRASES: &[&str] = &[
    "tắt báo thức",
    "dừng báo thức",
    "tắt chuông",
    "stop alarm",
    "stop the alarm",
    "turn off the alarm",
];

/// Confirmation after a voice stop.
const STOP_CONFIRMATION: &str = "Đã tắt báo thức.";

/// Reply when a stop phrase arrives with nothing ringing.
const NOTHING_RINGING: &str = "Hiện không có báo thức nào đang kêu.";

/// Process-wide ringing state.
///
/// Owned by the controller; other components only read it.
pub struct RingState {
    ringing: AtomicBool,
    current: Mutex<Option<AlarmId>>,
}

impl RingState {
    fn new() -> Self {
        Self {
            ringing: AtomicBool::new(false),
            current: Mutex::new(None),
        }
    }

    /// Whether an alarm is currently ringing.
    pub fn is_ringing(&self) -> bool {
        self.ringing.load(Ordering::SeqCst)
    }

    /// ID of the ringing alarm, if any.
    pub fn current_alarm(&self) -> Option<AlarmId> {
        *self.current.lock().unwrap()
    }
}

/// Ring playback configuration.
#[derive(Debug, Clone)]
pub struct RingConfig {
    /// Directory holding the alarm sound files
    pub sound_dir: PathBuf,
    /// Starting volume for the gradual profile
    pub ramp_start_volume: f32,
    /// Volume added per ramp step
    pub ramp_step: f32,
    /// Interval between ramp steps
    pub ramp_interval: Duration,
    /// Interval between playback supervision checks
    pub supervision_interval: Duration,
    /// Maximum snooze count per alarm chain
    pub snooze_max: u32,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            sound_dir: PathBuf::from("sounds"),
            ramp_start_volume: 0.2,
            ramp_step: 0.1,
            ramp_interval: Duration::from_secs(2),
            supervision_interval: Duration::from_millis(500),
            snooze_max: SNOOZE_MAX,
        }
    }
}

/// Controls the lifecycle of the currently ringing alarm.
pub struct RingController {
    store: Arc<Mutex<AlarmStore>>,
    player: Arc<dyn AudioPlayer>,
    display: Arc<dyn DisplayPort>,
    config: RingConfig,
    state: Arc<RingState>,
    volume: Mutex<f32>,
    worker: Mutex<Option<JoinHandle<()>>>,
    subscribers: Mutex<Vec<Sender<EngineEvent>>>,
}

impl RingController {
    /// Create an idle controller.
    pub fn new(
        store: Arc<Mutex<AlarmStore>>,
        player: Arc<dyn AudioPlayer>,
        display: Arc<dyn DisplayPort>,
        config: RingConfig,
    ) -> Self {
        Self {
            store,
            player,
            display,
            config,
            state: Arc::new(RingState::new()),
            volume: Mutex::new(0.8),
            worker: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe to engine events.
    pub fn subscribe(&self) -> Receiver<EngineEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    fn emit(&self, event: EngineEvent) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Whether an alarm is currently ringing.
    pub fn is_ringing(&self) -> bool {
        self.state.is_ringing()
    }

    /// ID of the ringing alarm, if any.
    pub fn current_alarm(&self) -> Option<AlarmId> {
        self.state.current_alarm()
    }

    /// Current master volume.
    pub fn volume(&self) -> f32 {
        *self.volume.lock().unwrap()
    }

    /// Begin ringing the given alarm.
    ///
    /// Returns `false` when something is already ringing (at most one
    /// alarm rings at a time) or the ID is unknown.
    pub fn start(&self, id: AlarmId) -> bool {
        if self.state.ringing.swap(true, Ordering::SeqCst) {
            tracing::warn!(%id, "ring start requested while already ringing");
            return false;
        }

        let (name, profile) = {
            let store = self.store.lock().unwrap();
            match store.get(id) {
                Some(alarm) => (alarm.name.clone(), alarm.sound_profile),
                None => {
                    tracing::warn!(%id, "ring start requested for unknown alarm");
                    self.state.ringing.store(false, Ordering::SeqCst);
                    return false;
                }
            }
        };

        *self.state.current.lock().unwrap() = Some(id);

        if !self.display.display_message(&format!("Báo thức: {name}!")) {
            tracing::warn!("display unavailable for ring notification");
        }

        tracing::info!(%id, name = %name, ?profile, "alarm ringing");
        self.emit(EngineEvent::RingStarted {
            id,
            name: name.clone(),
        });

        let player = self.player.clone();
        let state = self.state.clone();
        let config = self.config.clone();
        let target_volume = *self.volume.lock().unwrap();

        let spawned = std::thread::Builder::new()
            .name("alarm-ring".into())
            .spawn(move || ring_worker(player, state, config, profile, target_volume));

        match spawned {
            Ok(handle) => {
                *self.worker.lock().unwrap() = Some(handle);
                true
            }
            Err(e) => {
                // Ring state stays active and silent; stop/snooze still work.
                tracing::error!("failed to spawn ring worker: {e}");
                true
            }
        }
    }

    /// Stop the ringing alarm.
    ///
    /// Returns `false` when nothing is ringing; idempotent otherwise.
    pub fn stop(&self) -> bool {
        if !self.state.ringing.swap(false, Ordering::SeqCst) {
            return false;
        }

        // Join the worker before silencing the player: it polls the flag in
        // sub-second slices, so the join is short, and once it has exited
        // nothing can restart playback behind our back.
        if let Some(handle) = self.worker.lock().unwrap().take() {
            if handle.join().is_err() {
                tracing::error!("ring worker panicked");
            }
        }

        self.player.stop();

        let id = self.state.current.lock().unwrap().take();

        self.display.display_message(READY_MESSAGE);
        if let Some(id) = id {
            self.emit(EngineEvent::RingStopped { id });
        }

        tracing::info!("alarm ring stopped");
        true
    }

    /// Snooze the ringing alarm.
    ///
    /// Returns `false` when the given ID is not the one ringing, snoozing
    /// is disabled on it, or the chain already reached the snooze limit.
    /// Otherwise stops the ring and schedules a one-shot follow-up at
    /// `now + snooze_minutes` carrying the incremented chain counter.
    pub fn snooze(&self, id: AlarmId, now: NaiveDateTime) -> bool {
        if self.state.current_alarm() != Some(id) {
            return false;
        }

        let (parent_name, snooze_minutes, profile, snooze_enabled) = {
            let store = self.store.lock().unwrap();
            match store.get(id) {
                Some(alarm) => {
                    if !alarm.snooze_enabled {
                        tracing::info!(%id, "snooze rejected: disabled on alarm");
                        return false;
                    }
                    if alarm.snooze_count >= self.config.snooze_max {
                        tracing::info!(
                            %id,
                            count = alarm.snooze_count,
                            "snooze rejected: limit reached"
                        );
                        return false;
                    }
                    (
                        alarm.name.clone(),
                        alarm.snooze_minutes,
                        alarm.sound_profile,
                        alarm.snooze_enabled,
                    )
                }
                None => return false,
            }
        };

        if !self.stop() {
            // Lost a race with a concurrent stop.
            return false;
        }

        let fire_at = now + chrono::Duration::minutes(i64::from(snooze_minutes));
        let fire_time = NaiveTime::from_hms_opt(fire_at.hour(), fire_at.minute(), 0)
            .unwrap_or_else(|| fire_at.time());

        // Chains reuse a single "(snoozed)" suffix rather than stacking.
        let base_name = parent_name.trim_end_matches(" (snoozed)").to_string();

        let mut store = self.store.lock().unwrap();
        let carried_count = store.record_snooze(id).unwrap_or(1);
        let clone_id = store.add(AlarmSpec {
            time: fire_time,
            date: Some(fire_at.date()),
            repeat_days: BTreeSet::new(),
            name: Some(format!("{base_name} (snoozed)")),
            sound_profile: profile,
            snooze_enabled,
            snooze_minutes,
            active: true,
            snooze_count: Some(carried_count),
            last_triggered: None,
        });

        tracing::info!(
            parent = %id,
            clone = %clone_id,
            count = carried_count,
            at = %fire_at.format("%H:%M"),
            "alarm snoozed"
        );
        true
    }

    /// Step the master volume up or down, returning the new value.
    ///
    /// Applied to live playback immediately when ringing.
    pub fn adjust_volume(&self, increase: bool) -> f32 {
        let mut volume = self.volume.lock().unwrap();
        let next = if increase {
            *volume + VOLUME_STEP
        } else {
            *volume - VOLUME_STEP
        };
        // Round to one decimal so repeated steps do not drift.
        *volume = (next.clamp(0.0, 1.0) * 10.0).round() / 10.0;

        if self.state.is_ringing() {
            self.player.set_volume(*volume);
        }
        *volume
    }

    /// Voice shortcut: stop the alarm when the text contains a stop phrase.
    ///
    /// Returns `None` when no stop phrase was recognized, otherwise the
    /// canned reply for the user.
    pub fn handle_stop_phrase(&self, text: &str) -> Option<&'static str> {
        let lowered = text.to_lowercase();
        if !STOP_PHRASES.iter().any(|phrase| lowered.contains(phrase)) {
            return None;
        }

        Some(if self.stop() {
            STOP_CONFIRMATION
        } else {
            NOTHING_RINGING
        })
    }
}

/// Background playback worker for one ring.
fn ring_worker(
    player: Arc<dyn AudioPlayer>,
    state: Arc<RingState>,
    config: RingConfig,
    profile: SoundProfile,
    target_volume: f32,
) {
    if !load_alarm_sound(player.as_ref(), &config, profile) {
        // Silent ring: keep the state active until stopped so display,
        // snooze, and stop all still function.
        while state.is_ringing() {
            std::thread::sleep(Duration::from_millis(200));
        }
        return;
    }

    if profile.is_gradual() {
        let mut volume = config.ramp_start_volume.min(target_volume);
        player.set_volume(volume);
        player.play(true);

        while state.is_ringing() && volume < target_volume {
            if !sleep_while_ringing(&state, config.ramp_interval) {
                break;
            }
            volume = (volume + config.ramp_step).min(target_volume);
            player.set_volume(volume);
            tracing::debug!(volume, "gradual ramp step");
        }
    } else {
        player.set_volume(target_volume);
        player.play(true);
    }

    // Supervision: restart playback if the engine went silent while the
    // ring is still active.
    while sleep_while_ringing(&state, config.supervision_interval) {
        if !player.is_playing() {
            tracing::warn!("alarm playback stopped unexpectedly, restarting");
            player.play(true);
        }
    }
}

/// Load the profile sound, falling back to the default file.
///
/// Returns `false` when no sound could be loaded at all.
fn load_alarm_sound(player: &dyn AudioPlayer, config: &RingConfig, profile: SoundProfile) -> bool {
    let primary = config.sound_dir.join(profile.sound_file());
    match player.load(&primary) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                file = %primary.display(),
                "alarm sound unavailable ({e}), trying default"
            );
            let fallback = config.sound_dir.join(DEFAULT_SOUND_FILE);
            match player.load(&fallback) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        file = %fallback.display(),
                        "default alarm sound unavailable ({e}), ringing silently"
                    );
                    false
                }
            }
        }
    }
}

/// Sleep in sub-second slices while the ring is active.
///
/// Returns `false` as soon as the ring stops, without finishing the sleep.
fn sleep_while_ringing(state: &RingState, total: Duration) -> bool {
    let slice = Duration::from_millis(100);
    let mut remaining = total;
    while !remaining.is_zero() {
        if !state.is_ringing() {
            return false;
        }
        let step = remaining.min(slice);
        std::thread::sleep(step);
        remaining -= step;
    }
    state.is_ringing()
}
