//! Alarm records and sound profiles.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Opaque alarm identifier, stable for the alarm's lifetime.
pub type AlarmId = Uuid;

/// Sound file used when a profile's own file is missing.
pub const DEFAULT_SOUND_FILE: &str = "alarm_default.wav";

/// Alarm sound profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundProfile {
    /// Standard ring at the configured volume
    #[default]
    Normal,
    /// Starts quiet and ramps up in steps
    Gradual,
    /// Short buzz pattern
    Vibration,
    /// Music track instead of a ring tone
    Music,
}

impl SoundProfile {
    /// File name of this profile's sound.
    pub fn sound_file(&self) -> &'static str {
        match self {
            SoundProfile::Normal => "alarm_classic.wav",
            SoundProfile::Gradual => "alarm_soft.wav",
            SoundProfile::Vibration => "vibration_buzz.wav",
            SoundProfile::Music => "morning_melody.mp3",
        }
    }

    /// Whether playback should use the gradual volume ramp.
    pub fn is_gradual(&self) -> bool {
        matches!(self, SoundProfile::Gradual)
    }

    /// Display name for listings.
    pub fn display_name(&self) -> &'static str {
        match self {
            SoundProfile::Normal => "Normal",
            SoundProfile::Gradual => "Gradual",
            SoundProfile::Vibration => "Vibration",
            SoundProfile::Music => "Music",
        }
    }
}

/// A stored alarm.
///
/// Exactly one of three firing modes applies: one-shot (`date` set),
/// recurring (`repeat_days` non-empty, `date` ignored), or daily (neither).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alarm {
    /// Wall-clock firing time (seconds are not evaluated)
    pub time: NaiveTime,
    /// Specific calendar date for one-shot alarms
    pub date: Option<NaiveDate>,
    /// Weekday numbers 1-7 (Monday=1) for recurring alarms
    pub repeat_days: BTreeSet<u8>,
    /// Display label
    pub name: String,
    /// Sound profile
    pub sound_profile: SoundProfile,
    /// Whether snoozing is allowed while ringing
    pub snooze_enabled: bool,
    /// Snooze duration in minutes
    pub snooze_minutes: u32,
    /// Whether the alarm participates in evaluation
    pub active: bool,
    /// Timestamp of the last actual fire, used for same-day suppression
    pub last_triggered: Option<NaiveDateTime>,
    /// Snooze count carried along the snooze chain
    pub snooze_count: u32,
}

impl Alarm {
    /// Whether this alarm repeats on the given weekday.
    pub fn repeats_on(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday().number_from_monday() as u8;
        self.repeat_days.contains(&weekday)
    }

    /// One-shot: a specific date is set and no repeat days are.
    pub fn is_one_shot(&self) -> bool {
        self.repeat_days.is_empty() && self.date.is_some()
    }

    /// Recurring: fires on selected weekdays; any `date` is ignored.
    pub fn is_recurring(&self) -> bool {
        !self.repeat_days.is_empty()
    }

    /// Daily: no date, no repeat days.
    pub fn is_daily(&self) -> bool {
        self.repeat_days.is_empty() && self.date.is_none()
    }

    /// Whether the alarm already fired on the given calendar date.
    ///
    /// A `last_triggered` from an earlier date never suppresses a fire, so
    /// nothing needs clearing at day boundaries.
    pub fn already_triggered_on(&self, date: NaiveDate) -> bool {
        self.last_triggered
            .map(|t| t.date() == date)
            .unwrap_or(false)
    }

    /// One-line summary for listings.
    pub fn summary(&self) -> String {
        let schedule = if self.is_recurring() {
            let days: Vec<String> = self.repeat_days.iter().map(|d| d.to_string()).collect();
            format!("days {}", days.join(","))
        } else if let Some(date) = self.date {
            format!("on {}", date.format("%d/%m/%Y"))
        } else {
            "daily".to_string()
        };

        format!(
            "{} at {} ({schedule}, {}){}",
            self.name,
            self.time.format("%H:%M"),
            self.sound_profile.display_name(),
            if self.active { "" } else { " [off]" }
        )
    }
}

/// Caller-supplied shape for creating or replacing an alarm.
///
/// `snooze_count` and `last_triggered` are normally left unset; the
/// snooze-clone path sets `snooze_count` to carry the chain counter.
#[derive(Debug, Clone)]
pub struct AlarmSpec {
    pub time: NaiveTime,
    pub date: Option<NaiveDate>,
    pub repeat_days: BTreeSet<u8>,
    /// `None` asks the store to assign the next free "Alarm N" name
    pub name: Option<String>,
    pub sound_profile: SoundProfile,
    pub snooze_enabled: bool,
    pub snooze_minutes: u32,
    pub active: bool,
    /// Carried snooze counter override
    pub snooze_count: Option<u32>,
    /// Carried last-trigger override
    pub last_triggered: Option<NaiveDateTime>,
}

impl Default for AlarmSpec {
    fn default() -> Self {
        Self {
            time: NaiveTime::MIN,
            date: None,
            repeat_days: BTreeSet::new(),
            name: None,
            sound_profile: SoundProfile::Normal,
            snooze_enabled: true,
            snooze_minutes: 5,
            active: true,
            snooze_count: None,
            last_triggered: None,
        }
    }
}

impl AlarmSpec {
    /// Spec firing at the given time with all other fields defaulted.
    pub fn at(time: NaiveTime) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    /// Set the display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Make this a one-shot alarm for the given date.
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Make this a recurring alarm on the given weekdays (1-7, Monday=1).
    pub fn repeating(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.repeat_days = days.into_iter().collect();
        self
    }

    /// Set the sound profile.
    pub fn with_sound(mut self, profile: SoundProfile) -> Self {
        self.sound_profile = profile;
        self
    }
}
