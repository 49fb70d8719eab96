//! Per-tick due-alarm evaluation.
//!
//! Driven externally at 1 Hz; holds no thread of its own and never blocks
//! on I/O, so it is safe to call from the host's control thread.

use super::ring::RingController;
use super::store::AlarmStore;
use super::types::AlarmId;
use crate::clock::TimeResolver;
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::sync::{Arc, Mutex};

/// Scans the store once per tick and fires at most one due alarm.
pub struct AlarmEvaluator {
    store: Arc<Mutex<AlarmStore>>,
    ring: Arc<RingController>,
    resolver: Arc<TimeResolver>,
}

impl AlarmEvaluator {
    /// Create an evaluator over the shared store and ring controller.
    pub fn new(
        store: Arc<Mutex<AlarmStore>>,
        ring: Arc<RingController>,
        resolver: Arc<TimeResolver>,
    ) -> Self {
        Self {
            store,
            ring,
            resolver,
        }
    }

    /// Evaluate against the current home wall clock.
    ///
    /// Returns the ID of the alarm fired this tick, if any.
    pub fn tick(&self) -> Option<AlarmId> {
        self.tick_at(self.resolver.home_now().naive_local())
    }

    /// Evaluate against an explicit clock reading.
    ///
    /// While an alarm is ringing the whole tick is skipped, preserving the
    /// at-most-one-ringing invariant. Otherwise active alarms are checked
    /// in store order for an exact hour:minute match and the applicable
    /// firing rule; the first match fires and the scan stops, so at most
    /// one alarm fires per tick even when several are simultaneously due.
    pub fn tick_at(&self, now: NaiveDateTime) -> Option<AlarmId> {
        if self.ring.is_ringing() {
            return None;
        }

        let due = {
            let store = self.store.lock().unwrap();
            find_due(&store, now)
        };

        let id = due?;
        {
            let mut store = self.store.lock().unwrap();
            store.mark_triggered(id, now);
        }

        tracing::info!(%id, at = %now.format("%H:%M"), "alarm due, starting ring");
        self.ring.start(id);
        Some(id)
    }
}

/// First due alarm in store order, if any.
///
/// Due means: active, hour and minute equal to `now` (seconds are not
/// evaluated), not already fired today, and the firing rule matches:
/// one-shot on its date, recurring on today's weekday, or daily.
fn find_due(store: &AlarmStore, now: NaiveDateTime) -> Option<AlarmId> {
    let today = now.date();
    let weekday = today.weekday().number_from_monday() as u8;

    for (id, alarm) in store.list() {
        if !alarm.active {
            continue;
        }
        if alarm.time.hour() != now.hour() || alarm.time.minute() != now.minute() {
            continue;
        }
        if alarm.already_triggered_on(today) {
            continue;
        }

        let due = if alarm.is_recurring() {
            alarm.repeat_days.contains(&weekday)
        } else if let Some(date) = alarm.date {
            date == today
        } else {
            true
        };

        if due {
            return Some(*id);
        }
    }

    None
}
