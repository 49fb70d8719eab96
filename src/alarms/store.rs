//! In-memory alarm collection.
//!
//! Insertion-ordered CRUD surface. Absence is an expected condition here:
//! operations on a missing ID return `false`/`None` rather than erroring.

use super::types::{Alarm, AlarmId, AlarmSpec};
use chrono::NaiveDateTime;
use uuid::Uuid;

/// Owns the alarm records and enforces their data invariants.
#[derive(Debug, Default)]
pub struct AlarmStore {
    entries: Vec<(AlarmId, Alarm)>,
}

impl AlarmStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored alarms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a new alarm and return its generated ID.
    ///
    /// A missing name is filled with the next free "Alarm N"; the fresh
    /// record starts untriggered with a zero snooze count unless the spec
    /// carries overrides (the snooze-clone path does).
    pub fn add(&mut self, spec: AlarmSpec) -> AlarmId {
        let id = Uuid::new_v4();
        let name = spec.name.unwrap_or_else(|| self.next_default_name());

        let alarm = Alarm {
            time: spec.time,
            date: spec.date,
            repeat_days: spec.repeat_days,
            name,
            sound_profile: spec.sound_profile,
            snooze_enabled: spec.snooze_enabled,
            snooze_minutes: spec.snooze_minutes,
            active: spec.active,
            last_triggered: spec.last_triggered,
            snooze_count: spec.snooze_count.unwrap_or(0),
        };

        tracing::debug!(%id, name = %alarm.name, "alarm added");
        self.entries.push((id, alarm));
        id
    }

    /// Replace an alarm's mutable fields.
    ///
    /// Returns `false` when the ID is absent. `last_triggered` and
    /// `snooze_count` are preserved unless the spec carries overrides; a
    /// missing name keeps the current one.
    pub fn update(&mut self, id: AlarmId, spec: AlarmSpec) -> bool {
        let Some((_, alarm)) = self.entries.iter_mut().find(|(i, _)| *i == id) else {
            return false;
        };

        alarm.time = spec.time;
        alarm.date = spec.date;
        alarm.repeat_days = spec.repeat_days;
        if let Some(name) = spec.name {
            alarm.name = name;
        }
        alarm.sound_profile = spec.sound_profile;
        alarm.snooze_enabled = spec.snooze_enabled;
        alarm.snooze_minutes = spec.snooze_minutes;
        alarm.active = spec.active;
        if let Some(count) = spec.snooze_count {
            alarm.snooze_count = count;
        }
        if let Some(triggered) = spec.last_triggered {
            alarm.last_triggered = Some(triggered);
        }

        tracing::debug!(%id, "alarm updated");
        true
    }

    /// Remove an alarm. Returns `false` when the ID is absent.
    ///
    /// Deleting the currently ringing alarm requires the orchestrator to
    /// stop the ring first; the store itself does not know about ringing.
    pub fn delete(&mut self, id: AlarmId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(i, _)| *i != id);
        let removed = self.entries.len() != before;
        if removed {
            tracing::debug!(%id, "alarm deleted");
        }
        removed
    }

    /// Look up an alarm by ID.
    pub fn get(&self, id: AlarmId) -> Option<&Alarm> {
        self.entries
            .iter()
            .find(|(i, _)| *i == id)
            .map(|(_, alarm)| alarm)
    }

    /// All alarms in insertion order.
    pub fn list(&self) -> &[(AlarmId, Alarm)] {
        &self.entries
    }

    /// Record an actual fire. Returns `false` when the ID is absent.
    pub fn mark_triggered(&mut self, id: AlarmId, at: NaiveDateTime) -> bool {
        match self.entries.iter_mut().find(|(i, _)| *i == id) {
            Some((_, alarm)) => {
                alarm.last_triggered = Some(at);
                true
            }
            None => false,
        }
    }

    /// Increment an alarm's snooze counter, returning the new count.
    pub fn record_snooze(&mut self, id: AlarmId) -> Option<u32> {
        self.entries.iter_mut().find(|(i, _)| *i == id).map(|(_, alarm)| {
            alarm.snooze_count += 1;
            alarm.snooze_count
        })
    }

    /// Next free auto-assigned name, scanning existing "Alarm N" names.
    pub fn next_default_name(&self) -> String {
        let used: Vec<u32> = self
            .entries
            .iter()
            .filter_map(|(_, alarm)| {
                alarm
                    .name
                    .strip_prefix("Alarm ")
                    .and_then(|n| n.parse::<u32>().ok())
            })
            .collect();

        let mut n = 1;
        while used.contains(&n) {
            n += 1;
        }
        format!("Alarm {n}")
    }
}
