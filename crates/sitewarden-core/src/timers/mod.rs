//! Wake timers at schedule boundaries.
//!
//! Decisions are always recomputed against the real clock, so timers never
//! change what gets blocked. They exist so hosts (status badges, the CLI
//! `watch` loop) wake up exactly when a window opens or closes.
//!
//! Each schedule owns two one-shot timers, `start:<id>` and `end:<id>`. Any
//! firing rebuilds the whole set, which keeps every timer pointed at its next
//! occurrence.

mod tokio_service;

pub use tokio_service::TokioTimerService;

use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::schedule::{next_trigger, Boundary, Schedule, ScheduleId};
use crate::store::{KeyValueStore, Snapshot};

/// Host timer facility (browser alarms, tokio sleeps).
pub trait TimerService {
    /// Arm a one-shot timer firing at `at_ms` (Unix epoch milliseconds).
    /// Re-registering an id replaces the previous timer.
    fn register_one_shot(&mut self, id: &str, at_ms: i64);

    fn cancel_all(&mut self);
}

/// Identity of a boundary timer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerKey {
    pub boundary: Boundary,
    pub schedule_id: ScheduleId,
}

impl TimerKey {
    pub fn new(boundary: Boundary, schedule_id: impl Into<ScheduleId>) -> Self {
        Self {
            boundary,
            schedule_id: schedule_id.into(),
        }
    }
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.boundary, self.schedule_id)
    }
}

impl FromStr for TimerKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (boundary, id) = s
            .split_once(':')
            .ok_or_else(|| format!("timer id '{s}' has no boundary prefix"))?;
        let boundary = match boundary {
            "start" => Boundary::Start,
            "end" => Boundary::End,
            other => return Err(format!("unknown boundary '{other}' in timer id '{s}'")),
        };
        if id.is_empty() {
            return Err(format!("timer id '{s}' has no schedule id"));
        }
        Ok(Self::new(boundary, id))
    }
}

/// Keeps one timer pair registered per schedule.
pub struct TimerCoordinator<T> {
    service: T,
    registered: BTreeMap<TimerKey, DateTime<Utc>>,
    /// Settings the current timers were built from, when built from a store.
    built_from: Option<Snapshot>,
}

impl<T: TimerService> TimerCoordinator<T> {
    pub fn new(service: T) -> Self {
        Self {
            service,
            registered: BTreeMap::new(),
            built_from: None,
        }
    }

    pub fn service(&self) -> &T {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut T {
        &mut self.service
    }

    /// Registered timers and when each will fire.
    pub fn registered(&self) -> &BTreeMap<TimerKey, DateTime<Utc>> {
        &self.registered
    }

    /// Earliest registered firing.
    pub fn next_wake(&self) -> Option<(&TimerKey, DateTime<Utc>)> {
        self.registered
            .iter()
            .min_by_key(|(_, at)| **at)
            .map(|(key, at)| (key, *at))
    }

    /// Cancel every timer, then register a start and an end timer for each
    /// schedule at its next occurrence after `now`.
    ///
    /// Schedules sharing an id share timers; the later one wins.
    pub fn rebuild_all<'a, I, Tz>(&mut self, schedules: I, now: &DateTime<Tz>) -> usize
    where
        I: IntoIterator<Item = &'a Schedule>,
        Tz: TimeZone,
    {
        self.service.cancel_all();
        self.registered.clear();
        self.built_from = None;

        for schedule in schedules {
            for boundary in [Boundary::Start, Boundary::End] {
                let at = next_trigger(now, schedule.boundary(boundary), schedule.days).with_timezone(&Utc);
                let key = TimerKey::new(boundary, schedule.id.clone());
                self.service.register_one_shot(&key.to_string(), at.timestamp_millis());
                tracing::debug!(timer = %key, %at, "timer registered");
                self.registered.insert(key, at);
            }
        }
        self.registered.len()
    }

    /// Rebuild from the global schedules and every site schedule in `store`.
    /// An unreadable store leaves no timers armed.
    pub fn rebuild_from_store<Tz: TimeZone>(&mut self, store: &impl KeyValueStore, now: &DateTime<Tz>) -> usize {
        let snapshot = Snapshot::read(store).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "settings unavailable, clearing timers");
            Snapshot::default()
        });
        let armed = self.rebuild_all(snapshot.all_schedules(), now);
        self.built_from = Some(snapshot);
        armed
    }

    /// Rebuild only if the stored settings differ from the ones the current
    /// timers came from. Returns the number of timers armed, or `None` when
    /// nothing changed or the store could not be read.
    pub fn sync_with_store<Tz: TimeZone>(&mut self, store: &impl KeyValueStore, now: &DateTime<Tz>) -> Option<usize> {
        let snapshot = match Snapshot::read(store) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "settings unavailable, keeping current timers");
                return None;
            }
        };
        if self.built_from.as_ref() == Some(&snapshot) {
            return None;
        }
        tracing::info!("settings changed, rebuilding timers");
        let armed = self.rebuild_all(snapshot.all_schedules(), now);
        self.built_from = Some(snapshot);
        Some(armed)
    }

    /// A timer fired. Whatever it was, every timer is rebuilt.
    pub fn on_fire<Tz: TimeZone>(&mut self, id: &str, store: &impl KeyValueStore, now: &DateTime<Tz>) -> usize {
        match id.parse::<TimerKey>() {
            Ok(key) => tracing::info!(timer = %key, "schedule boundary reached"),
            Err(e) => tracing::warn!(id, error = %e, "unrecognized timer fired"),
        }
        self.rebuild_from_store(store, now)
    }
}
