//! Calendar windows for quota accounting
//!
//! Windows are half-open: an instant exactly at midnight belongs to the new day.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};

/// Midnight at the start of `now`'s day, in `now`'s time zone
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    midnight(&now.timezone(), now.date_naive()).unwrap_or_else(|| now.clone())
}

/// Midnight on the first day of `now`'s month
pub fn start_of_month<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    now.date_naive()
        .with_day(1)
        .and_then(|first| midnight(&now.timezone(), first))
        .unwrap_or_else(|| start_of_day(now))
}

/// Midnight at the start of the following day, when daily quotas reset
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    now.date_naive()
        .succ_opt()
        .and_then(|tomorrow| midnight(&now.timezone(), tomorrow))
        .unwrap_or_else(|| start_of_day(now) + Duration::days(1))
}

/// First instant of `date` in `tz`.
///
/// Zones that skip midnight on a DST change start the day at the first valid hour.
fn midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
    }

    #[test]
    fn test_day_window() {
        let now = at(2025, 3, 15, 10, 30, 0);
        assert_eq!(start_of_day(&now), at(2025, 3, 15, 0, 0, 0));
        assert_eq!(next_midnight(&now), at(2025, 3, 16, 0, 0, 0));
    }

    #[test]
    fn test_boundary_belongs_to_new_day() {
        let midnight = at(2025, 3, 16, 0, 0, 0);
        assert_eq!(start_of_day(&midnight), midnight);
        assert_eq!(next_midnight(&midnight), at(2025, 3, 17, 0, 0, 0));
    }

    #[test]
    fn test_month_window() {
        assert_eq!(start_of_month(&at(2025, 3, 15, 10, 0, 0)), at(2025, 3, 1, 0, 0, 0));
        assert_eq!(start_of_month(&at(2025, 3, 1, 0, 0, 0)), at(2025, 3, 1, 0, 0, 0));
    }

    #[test]
    fn test_year_and_month_rollover() {
        assert_eq!(next_midnight(&at(2025, 12, 31, 23, 59, 59)), at(2026, 1, 1, 0, 0, 0));
        assert_eq!(next_midnight(&at(2024, 2, 28, 12, 0, 0)), at(2024, 2, 29, 0, 0, 0));
    }

    #[test]
    fn test_window_uses_local_offset() {
        // 23:30 UTC is already the next day at UTC+2
        let utc = Utc.with_ymd_and_hms(2025, 3, 15, 23, 30, 0).unwrap();
        let local = utc.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(start_of_day(&local), at(2025, 3, 16, 0, 0, 0));
    }
}
