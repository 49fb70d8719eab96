//! Unit tests for the alarm store CRUD surface.

use chrono::{NaiveDate, NaiveTime};
use deskmate::alarms::types::{AlarmSpec, SoundProfile};
use deskmate::AlarmStore;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn test_update_replaces_schedule_fields() {
    let mut store = AlarmStore::new();
    let id = store.add(
        AlarmSpec::at(time(7, 30))
            .repeating([1, 2, 3, 4, 5])
            .with_sound(SoundProfile::Gradual),
    );

    // Turn the recurring alarm into a one-shot with a different profile.
    let mut spec = AlarmSpec::at(time(9, 0)).with_sound(SoundProfile::Music);
    spec.date = NaiveDate::from_ymd_opt(2026, 9, 1);
    assert!(store.update(id, spec));

    let alarm = store.get(id).unwrap();
    assert_eq!(alarm.time, time(9, 0));
    assert!(alarm.repeat_days.is_empty());
    assert_eq!(alarm.date, NaiveDate::from_ymd_opt(2026, 9, 1));
    assert_eq!(alarm.sound_profile, SoundProfile::Music);
    assert!(alarm.is_one_shot());
}

#[test]
fn test_update_keeps_name_when_spec_has_none() {
    let mut store = AlarmStore::new();
    let id = store.add(AlarmSpec::at(time(6, 0)).named("Gym"));

    assert!(store.update(id, AlarmSpec::at(time(6, 30))));
    assert_eq!(store.get(id).unwrap().name, "Gym");
}

#[test]
fn test_default_names_skip_custom_names() {
    let mut store = AlarmStore::new();
    store.add(AlarmSpec::default().named("Work"));
    store.add(AlarmSpec::default()); // "Alarm 1"
    store.add(AlarmSpec::default().named("Alarm 3"));

    // 1 and 3 are taken, 2 is the lowest free number.
    assert_eq!(store.next_default_name(), "Alarm 2");
}

#[test]
fn test_toggle_active_survives_round_trip() {
    let mut store = AlarmStore::new();
    let id = store.add(AlarmSpec::at(time(5, 45)));
    assert!(store.get(id).unwrap().active);

    let mut spec = AlarmSpec::at(time(5, 45));
    spec.active = false;
    assert!(store.update(id, spec));
    assert!(!store.get(id).unwrap().active);
}

#[test]
fn test_delete_is_idempotent() {
    let mut store = AlarmStore::new();
    let id = store.add(AlarmSpec::default());

    assert!(store.delete(id));
    assert!(!store.delete(id));
    assert!(store.is_empty());
}
