//! Time-of-day windows of rotation schedules.

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use nc_entity::Schedule;

/// Whether `now` falls inside the window `[start, stop)`.
///
/// A start later than the stop describes a window that crosses midnight.
/// Equal bounds never open.
pub fn window_contains(start: NaiveTime, stop: NaiveTime, now: NaiveTime) -> bool {
    if start < stop {
        start <= now && now < stop
    } else if start > stop {
        now >= start || now < stop
    } else {
        false
    }
}

/// Whether the schedule's window is open at `now`, with its bounds read in `tz`.
pub fn is_open(schedule: &Schedule, now: DateTime<Utc>, tz: Tz) -> bool {
    let local = now.with_timezone(&tz).time();
    window_contains(schedule.start_time, schedule.stop_time, local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nc_core::types::{ScheduleId, TeamId};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
    }

    #[test]
    fn test_day_window() {
        assert!(window_contains(t(9, 0), t(18, 0), t(10, 0)));
        assert!(window_contains(t(9, 0), t(18, 0), t(9, 0)));
        assert!(!window_contains(t(9, 0), t(18, 0), t(18, 0)));
        assert!(!window_contains(t(9, 0), t(18, 0), t(19, 0)));
    }

    #[test]
    fn test_window_crossing_midnight() {
        assert!(window_contains(t(22, 0), t(6, 0), t(23, 30)));
        assert!(window_contains(t(22, 0), t(6, 0), t(0, 0)));
        assert!(window_contains(t(22, 0), t(6, 0), t(5, 59)));
        assert!(!window_contains(t(22, 0), t(6, 0), t(6, 0)));
        assert!(!window_contains(t(22, 0), t(6, 0), t(12, 0)));
    }

    #[test]
    fn test_equal_bounds_never_open() {
        assert!(!window_contains(t(9, 0), t(9, 0), t(9, 0)));
        assert!(!window_contains(t(9, 0), t(9, 0), t(15, 0)));
    }

    #[test]
    fn test_bounds_are_read_in_zone() {
        let schedule = Schedule {
            id: ScheduleId(1),
            name: "office".into(),
            start_time: t(9, 0),
            stop_time: t(18, 0),
            periodic_sec: 60,
            team_id: TeamId(1),
            running: false,
        };
        // 07:00 UTC is 10:00 in Moscow.
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 7, 0, 0).unwrap();
        assert!(is_open(&schedule, now, chrono_tz::Europe::Moscow));
        assert!(!is_open(&schedule, now, chrono_tz::UTC));
    }
}
