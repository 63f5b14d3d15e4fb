//! Schedule evaluation: is a moment inside any active window?

use chrono::{Datelike, NaiveDateTime};

use super::{ClockTime, Schedule};

impl Schedule {
    /// Whether `now` (local wall-clock time) falls inside this window.
    ///
    /// The time check compares minutes only, inclusive on both ends.
    pub fn is_active_at(&self, now: NaiveDateTime) -> bool {
        if !self.days.matches(now.weekday()) {
            return false;
        }
        let current = ClockTime::from_time(now.time());
        self.start_time <= current && current <= self.end_time
    }
}

/// Whether any of `schedules` is active at `now`.
///
/// Accepts a single schedule (`Some(&s)`, `[&s]`) or any sequence. An empty
/// sequence is never active; the always-block case is decided by the engine.
pub fn is_active<'a, I>(now: NaiveDateTime, schedules: I) -> bool
where
    I: IntoIterator<Item = &'a Schedule>,
{
    active_schedule(now, schedules).is_some()
}

/// First of `schedules` that is active at `now`.
pub fn active_schedule<'a, I>(now: NaiveDateTime, schedules: I) -> Option<&'a Schedule>
where
    I: IntoIterator<Item = &'a Schedule>,
{
    schedules.into_iter().find(|schedule| schedule.is_active_at(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::DayFilter;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hh, mm, 0)
            .unwrap()
    }

    fn window(start: &str, end: &str, days: DayFilter) -> Schedule {
        Schedule::parse(start, end, days).unwrap()
    }

    #[test]
    fn bounds_are_inclusive() {
        let s = window("09:00", "17:00", DayFilter::All);
        // 2026-10-14 is a Wednesday
        assert!(s.is_active_at(at(2026, 10, 14, 9, 0)));
        assert!(s.is_active_at(at(2026, 10, 14, 17, 0)));
        assert!(!s.is_active_at(at(2026, 10, 14, 8, 59)));
        assert!(!s.is_active_at(at(2026, 10, 14, 17, 1)));
    }

    #[test]
    fn seconds_are_ignored_at_the_end_boundary() {
        let s = window("09:00", "17:00", DayFilter::All);
        let late = at(2026, 10, 14, 17, 0) + Duration::seconds(59);
        assert!(s.is_active_at(late));
    }

    #[test]
    fn day_filter_gates_the_window() {
        let weekdays = window("00:00", "23:59", DayFilter::Weekdays);
        let weekends = window("00:00", "23:59", DayFilter::Weekends);
        // 2026-10-17 is a Saturday
        assert!(!weekdays.is_active_at(at(2026, 10, 17, 12, 0)));
        assert!(weekends.is_active_at(at(2026, 10, 17, 12, 0)));
        assert!(weekdays.is_active_at(at(2026, 10, 16, 12, 0)));
    }

    #[test]
    fn overnight_window_never_matches() {
        let s = Schedule {
            id: "night".into(),
            start_time: "22:00".parse().unwrap(),
            end_time: "06:00".parse().unwrap(),
            days: DayFilter::All,
        };
        assert!(s.is_overnight());
        assert!(!s.is_active_at(at(2026, 10, 14, 23, 0)));
        assert!(!s.is_active_at(at(2026, 10, 14, 3, 0)));
    }

    #[test]
    fn any_schedule_suffices() {
        let morning = window("08:00", "10:00", DayFilter::All);
        let evening = window("19:00", "21:00", DayFilter::All);
        let both = vec![morning.clone(), evening];
        assert!(is_active(at(2026, 10, 14, 20, 0), &both));
        assert!(!is_active(at(2026, 10, 14, 12, 0), &both));
        assert!(is_active(at(2026, 10, 14, 9, 0), Some(&morning)));
    }

    #[test]
    fn empty_set_is_never_active() {
        let none: Vec<Schedule> = Vec::new();
        assert!(!is_active(at(2026, 10, 14, 12, 0), &none));
        assert!(!is_active(at(2026, 10, 14, 12, 0), None::<&Schedule>));
    }

    fn any_moment() -> impl Strategy<Value = NaiveDateTime> {
        (0i64..3650, 0u32..24, 0u32..60).prop_map(|(day, h, m)| {
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(h, m, 0).unwrap() + Duration::days(day)
        })
    }

    fn any_clock() -> impl Strategy<Value = ClockTime> {
        (0u8..24, 0u8..60).prop_map(|(h, m)| ClockTime::new(h, m).unwrap())
    }

    proptest! {
        #[test]
        fn all_days_depends_only_on_time_of_day(
            now in any_moment(),
            shift in -400i64..400,
            start in any_clock(),
            end in any_clock(),
        ) {
            let s = Schedule { id: "p".into(), start_time: start, end_time: end, days: DayFilter::All };
            prop_assert_eq!(s.is_active_at(now), s.is_active_at(now + Duration::days(shift)));
        }

        #[test]
        fn full_day_windows_follow_weekday(now in any_moment()) {
            let weekdays = window("00:00", "23:59", DayFilter::Weekdays);
            let weekends = window("00:00", "23:59", DayFilter::Weekends);
            let iso = now.weekday().number_from_monday();
            prop_assert_eq!(weekdays.is_active_at(now), (1..=5).contains(&iso));
            prop_assert_eq!(weekends.is_active_at(now), iso >= 6);
        }
    }
}
