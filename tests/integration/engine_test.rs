//! End-to-end alarm engine scenarios against mock hardware.

use super::mock_hardware::{MockPlayer, RecordingDisplay};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use deskmate::alarms::ring::RingConfig;
use deskmate::alarms::types::{AlarmSpec, SoundProfile};
use deskmate::alarms::EngineEvent;
use deskmate::hardware::AudioPlayer;
use deskmate::{AlarmEvaluator, AlarmStore, RingController, TimeResolver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Harness {
    store: Arc<Mutex<AlarmStore>>,
    ring: Arc<RingController>,
    evaluator: AlarmEvaluator,
    display: Arc<RecordingDisplay>,
    player: Arc<MockPlayer>,
}

fn harness() -> Harness {
    let store = Arc::new(Mutex::new(AlarmStore::new()));
    let display = Arc::new(RecordingDisplay::new());
    let player = Arc::new(MockPlayer::new());

    let ring = Arc::new(RingController::new(
        store.clone(),
        player.clone(),
        display.clone(),
        RingConfig {
            ramp_start_volume: 0.2,
            ramp_step: 0.2,
            ramp_interval: Duration::from_millis(20),
            supervision_interval: Duration::from_millis(10),
            ..Default::default()
        },
    ));

    let resolver = Arc::new(TimeResolver::new("Asia/Ho_Chi_Minh", None).expect("valid timezone"));
    let evaluator = AlarmEvaluator::new(store.clone(), ring.clone(), resolver);

    Harness {
        store,
        ring,
        evaluator,
        display,
        player,
    }
}

fn at(date: (i32, u32, u32), h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

#[test]
fn test_work_alarm_week_scenario() {
    let h = harness();
    let id = h.store.lock().unwrap().add(
        AlarmSpec::at(NaiveTime::from_hms_opt(7, 30, 0).unwrap())
            .named("Work")
            .repeating([1, 2, 3, 4, 5]),
    );

    // 2026-08-03 is a Monday: no fire before or after the exact minute.
    let monday = (2026, 8, 3);
    assert_eq!(h.evaluator.tick_at(at(monday, 7, 29, 0)), None);
    assert_eq!(h.evaluator.tick_at(at(monday, 7, 30, 0)), Some(id));
    assert!(h.ring.is_ringing());
    assert!(h.ring.stop());
    assert_eq!(h.evaluator.tick_at(at(monday, 7, 31, 0)), None);

    // Saturday is not a work day.
    assert_eq!(h.evaluator.tick_at(at((2026, 8, 8), 7, 30, 0)), None);

    // Next Monday fires again with no manual reset in between.
    assert_eq!(h.evaluator.tick_at(at((2026, 8, 10), 7, 30, 0)), Some(id));
    assert!(h.ring.stop());

    // The ring pushed the alarm name to the display.
    let messages = h.display.messages();
    assert!(
        messages.iter().any(|m| m.contains("Work")),
        "got {messages:?}"
    );
}

#[test]
fn test_snooze_fires_follow_up_alarm() {
    let h = harness();
    let id = h.store.lock().unwrap().add(
        AlarmSpec::at(NaiveTime::from_hms_opt(7, 0, 0).unwrap()).named("Morning"),
    );

    let day = (2026, 8, 5);
    assert_eq!(h.evaluator.tick_at(at(day, 7, 0, 0)), Some(id));
    assert!(h.ring.snooze(id, at(day, 7, 0, 10)));
    assert!(!h.ring.is_ringing());

    // Nothing fires before the snooze delay elapses.
    assert_eq!(h.evaluator.tick_at(at(day, 7, 3, 0)), None);

    // The follow-up one-shot fires five minutes later.
    let clone_id = h
        .evaluator
        .tick_at(at(day, 7, 5, 10))
        .expect("snoozed alarm fires");
    assert_ne!(clone_id, id);

    let store = h.store.lock().unwrap();
    let clone = store.get(clone_id).unwrap();
    assert_eq!(clone.name, "Morning (snoozed)");
    assert_eq!(clone.snooze_count, 1);
    drop(store);

    assert!(h.ring.stop());
}

#[test]
fn test_snooze_limit_over_full_chain() {
    let h = harness();
    let mut id = h.store.lock().unwrap().add(
        AlarmSpec::at(NaiveTime::from_hms_opt(6, 0, 0).unwrap()).named("Chain"),
    );

    let day = (2026, 8, 5);
    let mut minute = 0u32;

    assert_eq!(h.evaluator.tick_at(at(day, 6, minute, 0)), Some(id));

    // Snooze three times along the chain; each follow-up fires and rings.
    for _ in 0..3 {
        assert!(h.ring.snooze(id, at(day, 6, minute, 5)));
        minute += 5;
        id = h
            .evaluator
            .tick_at(at(day, 6, minute, 0))
            .expect("follow-up fires");
    }

    // The third clone is ringing now and refuses a fourth snooze.
    assert!(h.ring.is_ringing());
    assert!(!h.ring.snooze(id, at(day, 6, minute, 5)));
    assert!(h.ring.stop());
}

#[test]
fn test_supervision_restarts_silent_playback() {
    let h = harness();
    let id = h
        .store
        .lock()
        .unwrap()
        .add(AlarmSpec::at(NaiveTime::from_hms_opt(8, 0, 0).unwrap()));

    assert!(h.ring.start(id));
    wait_for(|| h.player.play_count() >= 1);

    // Kill the audio behind the controller's back; the supervision loop
    // notices and restarts playback instead of ringing silently.
    h.player.silence();
    wait_for(|| h.player.play_count() >= 2);
    assert!(h.ring.is_ringing());

    assert!(h.ring.stop());
    assert!(!h.player.is_playing());
}

#[test]
fn test_gradual_profile_ramps_to_target() {
    let h = harness();
    let id = h.store.lock().unwrap().add(
        AlarmSpec::at(NaiveTime::from_hms_opt(8, 0, 0).unwrap())
            .with_sound(SoundProfile::Gradual),
    );

    assert!(h.ring.start(id));

    // Target volume defaults to 0.8; with a 0.2 step every 20ms the ramp
    // completes well within the wait.
    wait_for(|| h.player.volumes().last().copied() == Some(0.8));
    assert!(h.ring.stop());

    let volumes = h.player.volumes();
    assert_eq!(volumes.first().copied(), Some(0.2));
    assert!(
        volumes.windows(2).all(|w| w[0] <= w[1]),
        "ramp should never step down: {volumes:?}"
    );
}

#[test]
fn test_ring_events_reach_subscribers() {
    let h = harness();
    let events = h.ring.subscribe();
    let id = h.store.lock().unwrap().add(
        AlarmSpec::at(NaiveTime::from_hms_opt(9, 0, 0).unwrap()).named("Evented"),
    );

    assert_eq!(h.evaluator.tick_at(at((2026, 8, 5), 9, 0, 0)), Some(id));
    assert!(h.ring.stop());

    let received: Vec<EngineEvent> = events.try_iter().collect();
    assert_eq!(received.len(), 2);
    assert!(matches!(
        &received[0],
        EngineEvent::RingStarted { name, .. } if name == "Evented"
    ));
    assert!(matches!(&received[1], EngineEvent::RingStopped { .. }));
}

#[test]
fn test_deleting_ringing_alarm_after_stop() {
    let h = harness();
    let id = h
        .store
        .lock()
        .unwrap()
        .add(AlarmSpec::at(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));

    assert_eq!(h.evaluator.tick_at(at((2026, 8, 5), 9, 0, 0)), Some(id));

    // Orchestrator ordering: silence the ring before removing the record.
    assert!(h.ring.stop());
    assert!(h.store.lock().unwrap().delete(id));

    // Later ticks see an empty store and stay quiet.
    assert_eq!(h.evaluator.tick_at(at((2026, 8, 5), 9, 0, 30)), None);
    assert!(!h.ring.is_ringing());
}

/// Poll a condition with a bounded wait.
fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("condition not reached within bounded wait");
}
