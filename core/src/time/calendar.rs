//! Calendar date/time conversions using O(1) algorithms
//!
//! Implements Howard Hinnant's civil_from_days and days_from_civil algorithms.
//! Reference: http://howardhinnant.github.io/date_algorithms.html
//!
//! These algorithms are used in C++20's `<chrono>` library and provide:
//! - O(1) time complexity (no year iteration)
//! - Correct handling of leap years
//! - Valid for all dates in the proleptic Gregorian calendar
//!
//! Months are numbered 1-12 and weekdays are an explicit enum, so the DST
//! evaluator never depends on a zero- or one-based indexing convention.

use core::fmt;

use super::{Instant, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};

/// Days from 0000-03-01 to 1970-01-01
const DAYS_0000_03_01_TO_UNIX_EPOCH: i64 = 719_468;
/// Days in a 400-year Gregorian era
const DAYS_PER_ERA: i64 = 146_097;

/// Month of the year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Month {
    Jan = 1,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Month from its number, 1 = January
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    /// 1 = January
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Three-letter English abbreviation
    pub const fn abbrev(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }
}

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Weekday {
    Sun = 0,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    const ALL: [Weekday; 7] = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    /// Weekday from days since Sunday (0 = Sunday, 6 = Saturday)
    pub fn from_days_from_sunday(days: u8) -> Option<Self> {
        Self::ALL.get(usize::from(days)).copied()
    }

    /// 0 = Sunday, 6 = Saturday
    pub const fn days_from_sunday(self) -> u8 {
        self as u8
    }

    /// Three-letter English abbreviation
    pub const fn abbrev(self) -> &'static str {
        match self {
            Weekday::Sun => "Sun",
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
        }
    }
}

/// Which occurrence of a weekday within a month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ordinal {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

/// Broken-down calendar date and time
///
/// Carries no offset: the same struct describes UTC fields or local fields
/// depending on which instant it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CivilDateTime {
    pub year: i32,
    pub month: Month,
    /// Day of month, 1-31
    pub day: u8,
    pub weekday: Weekday,
    /// 0-23
    pub hour: u8,
    /// 0-59
    pub minute: u8,
    /// 0-59
    pub second: u8,
}

impl CivilDateTime {
    /// Break an instant into calendar fields
    pub fn from_instant(instant: Instant) -> Self {
        let secs = instant.as_unix_secs();
        let days = secs.div_euclid(SECONDS_PER_DAY);
        let secs_today = secs.rem_euclid(SECONDS_PER_DAY);

        let (year, month, day) = civil_from_days(days);

        Self {
            year,
            month,
            day,
            weekday: weekday_from_days(days),
            hour: (secs_today / SECONDS_PER_HOUR) as u8,
            minute: ((secs_today % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE) as u8,
            second: (secs_today % SECONDS_PER_MINUTE) as u8,
        }
    }

    /// Reassemble the instant these fields describe (the weekday is ignored)
    pub fn to_instant(&self) -> Instant {
        let days = days_from_civil(self.year, self.month, self.day);
        Instant::from_unix_secs(
            days * SECONDS_PER_DAY
                + i64::from(self.hour) * SECONDS_PER_HOUR
                + i64::from(self.minute) * SECONDS_PER_MINUTE
                + i64::from(self.second),
        )
    }
}

impl fmt::Display for CivilDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year,
            self.month.number(),
            self.day,
            self.hour,
            self.minute,
            self.second
        )
    }
}

/// Check if year is a leap year (Gregorian calendar)
///
/// - Divisible by 4: leap year
/// - EXCEPT divisible by 100: not a leap year
/// - EXCEPT divisible by 400: leap year
pub fn is_leap_year(year: i32) -> bool {
    (year.rem_euclid(4) == 0 && year.rem_euclid(100) != 0) || year.rem_euclid(400) == 0
}

/// Number of days in `month` of `year`
pub fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::Feb if is_leap_year(year) => 29,
        Month::Feb => 28,
        Month::Apr | Month::Jun | Month::Sep | Month::Nov => 30,
        _ => 31,
    }
}

/// Weekday of a day counted from the Unix epoch (1970-01-01 was a Thursday)
pub fn weekday_from_days(days_since_epoch: i64) -> Weekday {
    let idx = (days_since_epoch + Weekday::Thu.days_from_sunday() as i64).rem_euclid(7);
    Weekday::ALL[idx as usize]
}

/// Day of month of the `ordinal` occurrence of `weekday` in `month` of `year`
///
/// `First`..`Fourth` always exist in every month; `Last` is the fourth or
/// fifth occurrence depending on the month length.
pub fn nth_weekday_of_month(year: i32, month: Month, weekday: Weekday, ordinal: Ordinal) -> u8 {
    let target = i64::from(weekday.days_from_sunday());
    match ordinal {
        Ordinal::Last => {
            let last_day = days_in_month(year, month);
            let last_weekday =
                i64::from(weekday_from_days(days_from_civil(year, month, last_day)).days_from_sunday());
            let back = (last_weekday - target).rem_euclid(7) as u8;
            last_day - back
        }
        nth => {
            let weeks: u8 = match nth {
                Ordinal::First => 0,
                Ordinal::Second => 1,
                Ordinal::Third => 2,
                _ => 3,
            };
            let first_weekday =
                i64::from(weekday_from_days(days_from_civil(year, month, 1)).days_from_sunday());
            let forward = (target - first_weekday).rem_euclid(7) as u8;
            1 + forward + 7 * weeks
        }
    }
}

/// Convert days since Unix epoch to civil date (year, month, day)
///
/// Howard Hinnant's civil_from_days algorithm.
pub fn civil_from_days(days_since_epoch: i64) -> (i32, Month, u8) {
    // Shift epoch from 1970-01-01 to 0000-03-01 (March 1, year 0)
    // This makes the year start on March 1, placing leap day at end of year
    let z = days_since_epoch + DAYS_0000_03_01_TO_UNIX_EPOCH;

    // Calculate era (400-year cycles)
    let era = if z >= 0 { z } else { z - (DAYS_PER_ERA - 1) } / DAYS_PER_ERA;
    let doe = (z - era * DAYS_PER_ERA) as u32; // day of era [0, 146096]

    // Calculate year of era [0, 399]
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;

    let y = i64::from(yoe) + era * 400;

    // Calculate day of year [0, 365]
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);

    // Calculate month [0, 11] where 0 = March, 11 = February
    let mp = (5 * doy + 2) / 153;

    // Calculate day [1, 31]
    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;

    // Calculate month [1, 12] where 1 = January
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u8;

    // Adjust year for January and February
    let year = if m <= 2 { y + 1 } else { y };

    let month = Month::from_number(m).unwrap_or(Month::Jan);
    (year as i32, month, d)
}

/// Convert civil date (year, month, day) to days since Unix epoch
///
/// Howard Hinnant's days_from_civil algorithm.
pub fn days_from_civil(year: i32, month: Month, day: u8) -> i64 {
    let y = i64::from(year);
    let m = i64::from(month.number());
    let d = i64::from(day);

    // Adjust year and month to make March = month 0, February = month 11
    let (y, m) = if m <= 2 { (y - 1, m + 9) } else { (y, m - 3) };

    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400; // year of era [0, 399]
    let doy = (153 * m + 2) / 5 + d - 1; // day of year [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // day of era [0, 146096]

    era * DAYS_PER_ERA + doe - DAYS_0000_03_01_TO_UNIX_EPOCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leap_year() {
        assert!(is_leap_year(2000)); // Divisible by 400
        assert!(is_leap_year(2024)); // Divisible by 4
        assert!(!is_leap_year(1900)); // Divisible by 100, not 400
        assert!(!is_leap_year(2023)); // Not divisible by 4
        assert!(!is_leap_year(2100)); // Divisible by 100, not 400
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, Month::Feb), 29);
        assert_eq!(days_in_month(2025, Month::Feb), 28);
        assert_eq!(days_in_month(2025, Month::Sep), 30);
        assert_eq!(days_in_month(2025, Month::Dec), 31);
    }

    #[test]
    fn test_unix_epoch() {
        let dt = CivilDateTime::from_instant(Instant::UNIX_EPOCH);
        assert_eq!(dt.year, 1970);
        assert_eq!(dt.month, Month::Jan);
        assert_eq!(dt.day, 1);
        assert_eq!(dt.weekday, Weekday::Thu);
        assert_eq!((dt.hour, dt.minute, dt.second), (0, 0, 0));
    }

    #[test]
    fn test_before_epoch() {
        // 1969-12-31 23:59:59, a Wednesday
        let dt = CivilDateTime::from_instant(Instant::from_unix_secs(-1));
        assert_eq!((dt.year, dt.month, dt.day), (1969, Month::Dec, 31));
        assert_eq!(dt.weekday, Weekday::Wed);
        assert_eq!((dt.hour, dt.minute, dt.second), (23, 59, 59));
    }

    #[test]
    fn test_known_dates() {
        // 2025-07-15 00:00:00 was a Tuesday
        let dt = CivilDateTime::from_instant(Instant::from_unix_secs(1_752_537_600));
        assert_eq!((dt.year, dt.month, dt.day), (2025, Month::Jul, 15));
        assert_eq!(dt.weekday, Weekday::Tue);

        // 2024-02-29 (leap day)
        let dt = CivilDateTime::from_instant(Instant::from_unix_secs(1_709_164_800));
        assert_eq!((dt.year, dt.month, dt.day), (2024, Month::Feb, 29));
        assert_eq!(dt.weekday, Weekday::Thu);
    }

    #[test]
    fn test_to_instant_inverts_from_instant() {
        for secs in [
            0i64,
            946_684_800,   // 2000-01-01 00:00:00
            1_709_164_800, // 2024-02-29 00:00:00
            2_147_483_647, // 2038-01-19 03:14:07
            4_102_444_800, // 2100-01-01 00:00:00
            -2_208_988_800, // 1900-01-01 00:00:00
        ] {
            let instant = Instant::from_unix_secs(secs);
            assert_eq!(
                instant.civil().to_instant(),
                instant,
                "Round trip failed for timestamp {}",
                secs
            );
        }
    }

    #[test]
    fn test_range_limits_are_representable() {
        let min = Instant::MIN.civil();
        assert_eq!((min.year, min.month, min.day), (-9999, Month::Jan, 1));
        let max = Instant::MAX.civil();
        assert_eq!((max.year, max.month, max.day), (9999, Month::Dec, 31));
        assert_eq!((max.hour, max.minute, max.second), (23, 59, 59));
    }

    #[test]
    fn test_last_sunday_of_september() {
        assert_eq!(nth_weekday_of_month(2025, Month::Sep, Weekday::Sun, Ordinal::Last), 28);
        assert_eq!(nth_weekday_of_month(2024, Month::Sep, Weekday::Sun, Ordinal::Last), 29);
    }

    #[test]
    fn test_first_sunday_of_april() {
        assert_eq!(nth_weekday_of_month(2025, Month::Apr, Weekday::Sun, Ordinal::First), 6);
        assert_eq!(nth_weekday_of_month(2026, Month::Apr, Weekday::Sun, Ordinal::First), 5);
    }

    #[test]
    fn test_nth_weekday_when_month_starts_on_target() {
        // June 2025 starts on a Sunday
        assert_eq!(nth_weekday_of_month(2025, Month::Jun, Weekday::Sun, Ordinal::First), 1);
        assert_eq!(nth_weekday_of_month(2025, Month::Jun, Weekday::Sun, Ordinal::Fourth), 22);
        // ...and has a fifth Sunday, which is the last one
        assert_eq!(nth_weekday_of_month(2025, Month::Jun, Weekday::Sun, Ordinal::Last), 29);
    }

    #[test]
    fn test_second_and_third_weekday() {
        assert_eq!(nth_weekday_of_month(2025, Month::Mar, Weekday::Sun, Ordinal::Second), 9);
        assert_eq!(nth_weekday_of_month(2025, Month::Nov, Weekday::Mon, Ordinal::Third), 17);
    }

    #[test]
    fn test_last_weekday_on_leap_day() {
        assert_eq!(nth_weekday_of_month(2024, Month::Feb, Weekday::Thu, Ordinal::Last), 29);
        assert_eq!(nth_weekday_of_month(2025, Month::Feb, Weekday::Thu, Ordinal::Last), 27);
    }

    #[test]
    fn test_month_and_weekday_lookup() {
        assert_eq!(Month::from_number(1), Some(Month::Jan));
        assert_eq!(Month::from_number(12), Some(Month::Dec));
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
        assert_eq!(Weekday::from_days_from_sunday(6), Some(Weekday::Sat));
        assert_eq!(Weekday::from_days_from_sunday(7), None);
    }
}
