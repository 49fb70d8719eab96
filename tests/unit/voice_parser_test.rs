//! Unit tests for alarm-setting utterance parsing.

use chrono::{NaiveDate, NaiveTime};
use deskmate::alarms::types::AlarmSpec;
use deskmate::{AlarmStore, VoiceCommandParser};

fn today() -> NaiveDate {
    // A Wednesday.
    NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()
}

#[test]
fn test_parsed_request_creates_a_working_alarm() {
    let mut store = AlarmStore::new();

    let request =
        VoiceCommandParser::parse("đặt báo thức lúc 7 giờ 30 sáng ngày mai", &store, today())
            .expect("parses");
    let id = store.add(request.into_spec());

    let alarm = store.get(id).expect("stored");
    assert_eq!(alarm.time, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
    assert_eq!(alarm.date, NaiveDate::from_ymd_opt(2026, 8, 6));
    assert!(alarm.is_one_shot());
    assert!(alarm.active);
    assert_eq!(alarm.snooze_count, 0);
}

#[test]
fn test_parser_names_never_collide() {
    let mut store = AlarmStore::new();

    for _ in 0..3 {
        let request =
            VoiceCommandParser::parse("báo thức 6 giờ sáng", &store, today()).expect("parses");
        store.add(request.into_spec());
    }

    let mut names: Vec<String> = store
        .list()
        .iter()
        .map(|(_, alarm)| alarm.name.clone())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Alarm 1", "Alarm 2", "Alarm 3"]);
}

#[test]
fn test_parser_skips_names_taken_by_manual_alarms() {
    let mut store = AlarmStore::new();
    store.add(AlarmSpec::default().named("Alarm 1"));

    let request = VoiceCommandParser::parse("báo thức 6 giờ", &store, today()).expect("parses");
    assert_eq!(request.name, "Alarm 2");
}

#[test]
fn test_afternoon_conversion_end_to_end() {
    let store = AlarmStore::new();

    let request =
        VoiceCommandParser::parse("nhắc tôi lúc 4 giờ chiều hôm nay", &store, today())
            .expect("parses");
    assert_eq!(request.time, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
    assert_eq!(request.date, Some(today()));
}
