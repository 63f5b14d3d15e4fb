//! Next-trigger calculation for window boundaries.
//!
//! The next occurrence is the first day, counting from today, on which the
//! boundary lies strictly after `now` and the day filter matches. That day is
//! at most seven days away.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDateTime, TimeZone};

use super::{ClockTime, DayFilter};

/// Next local wall-clock moment at which `boundary` occurs on a day allowed
/// by `days`. Seconds and fractions are zero.
pub fn next_trigger_local(now: NaiveDateTime, boundary: ClockTime, days: DayFilter) -> NaiveDateTime {
    let time = boundary.to_naive_time();
    let today = now.date();
    for offset in 0..=7 {
        let candidate = (today + Duration::days(offset)).and_time(time);
        if candidate > now && days.matches(candidate.weekday()) {
            return candidate;
        }
    }
    // Unreachable: offsets 1..=7 cover every weekday and all lie after `now`.
    (today + Duration::days(7)).and_time(time)
}

/// Absolute timestamp of the next occurrence of `boundary`, in `now`'s zone.
///
/// Local times skipped by a DST transition resolve to the first valid
/// instant after them; repeated local times resolve to the earlier instant.
pub fn next_trigger<Tz: TimeZone>(now: &DateTime<Tz>, boundary: ClockTime, days: DayFilter) -> DateTime<Tz> {
    let local = next_trigger_local(now.naive_local(), boundary, days);
    resolve_local(&now.timezone(), local)
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    let mut probe = local;
    // DST gaps are at most a few hours; stop searching after a day.
    for _ in 0..(24 * 60) {
        match tz.from_local_datetime(&probe) {
            LocalResult::Single(at) => return at,
            LocalResult::Ambiguous(earlier, _) => return earlier,
            LocalResult::None => probe += Duration::minutes(1),
        }
    }
    tz.from_utc_datetime(&local)
}
