//! Daylight-saving rule evaluation
//!
//! A [`TimezoneSpec`] holds two calendar-relative [`DstRule`]s, one entering
//! daylight time and one returning to standard time. Transitions are
//! recomputed for every year because "last Sunday of September" lands on a
//! different date each year.
//!
//! Each transition's local wall time is read in the offset in effect just
//! before the switch: entering DST is evaluated in standard time, leaving DST
//! is evaluated in daylight time.
//!
//! [`resolve`] picks the most recent transition at or before the instant,
//! looking at the UTC year and both neighbours. This covers regions whose DST
//! period spans New Year (southern hemisphere) as well as those where it sits
//! inside one calendar year (northern hemisphere) without an ordering branch.

use crate::error::ConfigError;

use super::calendar::{days_from_civil, nth_weekday_of_month, CivilDateTime, Month, Ordinal, Weekday};
use super::{Instant, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};

/// Longest accepted rule label, in characters
pub const MAX_RULE_NAME_LEN: usize = 4;

/// Largest accepted |offset|, exclusive (one day)
const MAX_OFFSET_MINUTES: i32 = 24 * 60;

/// A calendar-relative transition rule and the offset in effect after it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DstRule {
    /// Short label shown in diagnostics, e.g. "NZDT" (at most 4 characters)
    pub name: &'static str,
    pub ordinal: Ordinal,
    pub weekday: Weekday,
    pub month: Month,
    /// Local hour of the switch, 0-23
    pub hour_of_day: u8,
    /// UTC offset in minutes once this rule is active
    pub offset_minutes: i32,
}

impl DstRule {
    /// New Zealand Daylight Time: last Sunday of September, 02:00 NZST, UTC+13
    pub const NZDT: Self = Self {
        name: "NZDT",
        ordinal: Ordinal::Last,
        weekday: Weekday::Sun,
        month: Month::Sep,
        hour_of_day: 2,
        offset_minutes: 780,
    };

    /// New Zealand Standard Time: first Sunday of April, 03:00 NZDT, UTC+12
    pub const NZST: Self = Self {
        name: "NZST",
        ordinal: Ordinal::First,
        weekday: Weekday::Sun,
        month: Month::Apr,
        hour_of_day: 3,
        offset_minutes: 720,
    };

    /// Check label length, hour and offset bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.chars().count() > MAX_RULE_NAME_LEN {
            return Err(ConfigError::RuleNameTooLong);
        }
        if self.hour_of_day > 23 {
            return Err(ConfigError::HourOutOfRange);
        }
        if self.offset_minutes.abs() >= MAX_OFFSET_MINUTES {
            return Err(ConfigError::OffsetOutOfRange);
        }
        Ok(())
    }

    /// UTC instant of this rule's transition in `year`
    ///
    /// `prior_offset_minutes` is the offset in effect immediately before the
    /// switch, i.e. the other rule's offset.
    pub fn transition_utc(&self, year: i32, prior_offset_minutes: i32) -> Instant {
        Instant::from_unix_secs(self.transition_secs(year, prior_offset_minutes))
    }

    /// Unclamped Unix seconds of the transition; may fall outside the
    /// `Instant` range for the years either side of it
    fn transition_secs(&self, year: i32, prior_offset_minutes: i32) -> i64 {
        let day = nth_weekday_of_month(year, self.month, self.weekday, self.ordinal);
        let local_secs = days_from_civil(year, self.month, day) * SECONDS_PER_DAY
            + i64::from(self.hour_of_day) * SECONDS_PER_HOUR;
        local_secs - i64::from(prior_offset_minutes) * SECONDS_PER_MINUTE
    }
}

/// Standard/daylight rule pair for one region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimezoneSpec {
    dst: DstRule,
    std: DstRule,
}

impl TimezoneSpec {
    /// Build a spec from a daylight rule and a standard rule
    ///
    /// No sign or ordering is assumed between the two offsets.
    pub fn new(dst: DstRule, std: DstRule) -> Result<Self, ConfigError> {
        dst.validate()?;
        std.validate()?;
        Ok(Self { dst, std })
    }

    /// NZDT/NZST
    pub const fn new_zealand() -> Self {
        Self {
            dst: DstRule::NZDT,
            std: DstRule::NZST,
        }
    }

    /// Rule that enters daylight time
    pub fn dst(&self) -> &DstRule {
        &self.dst
    }

    /// Rule that returns to standard time
    pub fn std(&self) -> &DstRule {
        &self.std
    }

    /// UTC instants at which DST starts and ends in `year`
    pub fn transitions(&self, year: i32) -> (Instant, Instant) {
        let dst_start = self.dst.transition_utc(year, self.std.offset_minutes);
        let dst_end = self.std.transition_utc(year, self.dst.offset_minutes);
        (dst_start, dst_end)
    }
}

impl Default for TimezoneSpec {
    fn default() -> Self {
        Self::new_zealand()
    }
}

/// Result of converting one UTC instant to local time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LocalTimeResult<'a> {
    /// `utc` shifted by the active rule's offset
    pub local_instant: Instant,
    /// Whichever of the two rules is in effect
    pub active_rule: &'a DstRule,
    pub is_dst: bool,
}

impl LocalTimeResult<'_> {
    /// Offset applied to get `local_instant`
    pub fn offset_minutes(&self) -> i32 {
        self.active_rule.offset_minutes
    }

    /// Local calendar fields
    pub fn civil(&self) -> CivilDateTime {
        self.local_instant.civil()
    }
}

/// Convert a UTC instant to local time under `tz`
///
/// A transition instant belongs to the rule it switches to.
pub fn resolve(utc: Instant, tz: &TimezoneSpec) -> LocalTimeResult<'_> {
    let year = utc.civil().year;
    let secs = utc.as_unix_secs();

    let mut latest: Option<(i64, bool)> = None;
    for y in [year - 1, year, year + 1] {
        let dst_start = tz.dst.transition_secs(y, tz.std.offset_minutes);
        let dst_end = tz.std.transition_secs(y, tz.dst.offset_minutes);
        for (at, is_dst) in [(dst_start, true), (dst_end, false)] {
            let newer = latest.map_or(true, |(best, _)| at > best);
            if at <= secs && newer {
                latest = Some((at, is_dst));
            }
        }
    }

    let is_dst = latest.is_some_and(|(_, is_dst)| is_dst);
    let active_rule = if is_dst { &tz.dst } else { &tz.std };

    LocalTimeResult {
        local_instant: utc.offset_by_minutes(active_rule.offset_minutes),
        active_rule,
        is_dst,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2025-09-27T14:00:00Z = 2025-09-28 02:00 NZST
    const NZ_DST_START_2025: i64 = 1_758_981_600;
    /// 2025-04-05T14:00:00Z = 2025-04-06 03:00 NZDT
    const NZ_DST_END_2025: i64 = 1_743_861_600;
    /// 2025-03-09T07:00:00Z = 2025-03-09 02:00 EST
    const US_DST_START_2025: i64 = 1_741_503_600;
    /// 2025-11-02T06:00:00Z = 2025-11-02 02:00 EDT
    const US_DST_END_2025: i64 = 1_762_063_200;

    fn us_eastern() -> TimezoneSpec {
        TimezoneSpec::new(
            DstRule {
                name: "EDT",
                ordinal: Ordinal::Second,
                weekday: Weekday::Sun,
                month: Month::Mar,
                hour_of_day: 2,
                offset_minutes: -240,
            },
            DstRule {
                name: "EST",
                ordinal: Ordinal::First,
                weekday: Weekday::Sun,
                month: Month::Nov,
                hour_of_day: 2,
                offset_minutes: -300,
            },
        )
        .unwrap()
    }

    fn at(secs: i64) -> Instant {
        Instant::from_unix_secs(secs)
    }

    #[test]
    fn test_nz_transitions_2025() {
        let tz = TimezoneSpec::new_zealand();
        let (start, end) = tz.transitions(2025);
        assert_eq!(start, at(NZ_DST_START_2025));
        assert_eq!(end, at(NZ_DST_END_2025));
    }

    #[test]
    fn test_dst_start_boundary_belongs_to_new_rule() {
        let tz = TimezoneSpec::new_zealand();

        let before = resolve(at(NZ_DST_START_2025 - 1), &tz);
        assert!(!before.is_dst);
        assert_eq!(before.active_rule.name, "NZST");
        let c = before.civil();
        assert_eq!((c.month, c.day, c.hour, c.minute, c.second), (Month::Sep, 28, 1, 59, 59));

        let after = resolve(at(NZ_DST_START_2025), &tz);
        assert!(after.is_dst);
        assert_eq!(after.active_rule.name, "NZDT");
        let c = after.civil();
        assert_eq!((c.month, c.day, c.hour, c.minute, c.second), (Month::Sep, 28, 3, 0, 0));
    }

    #[test]
    fn test_dst_end_boundary_belongs_to_new_rule() {
        let tz = TimezoneSpec::new_zealand();

        let before = resolve(at(NZ_DST_END_2025 - 1), &tz);
        assert!(before.is_dst);
        let c = before.civil();
        assert_eq!((c.month, c.day, c.hour, c.minute, c.second), (Month::Apr, 6, 2, 59, 59));

        let after = resolve(at(NZ_DST_END_2025), &tz);
        assert!(!after.is_dst);
        let c = after.civil();
        assert_eq!((c.month, c.day, c.hour, c.minute, c.second), (Month::Apr, 6, 2, 0, 0));
    }

    #[test]
    fn test_southern_dst_spans_new_year() {
        let tz = TimezoneSpec::new_zealand();

        // 2024-12-31T10:59:59Z is still 2024 locally
        let r = resolve(at(1_735_642_799), &tz);
        assert!(r.is_dst);
        let c = r.civil();
        assert_eq!((c.year, c.month, c.day), (2024, Month::Dec, 31));
        assert_eq!((c.hour, c.minute, c.second), (23, 59, 59));

        // 2024-12-31T11:00:00Z is local midnight of New Year
        let r = resolve(at(1_735_642_800), &tz);
        assert!(r.is_dst);
        let c = r.civil();
        assert_eq!((c.year, c.month, c.day), (2025, Month::Jan, 1));
        assert_eq!((c.hour, c.minute, c.second), (0, 0, 0));

        // 2025-01-01T00:00:00Z, UTC year already rolled over
        assert!(resolve(at(1_735_689_600), &tz).is_dst);
    }

    #[test]
    fn test_southern_winter_is_standard() {
        let tz = TimezoneSpec::new_zealand();
        // 2025-07-15T00:00:00Z
        let r = resolve(at(1_752_537_600), &tz);
        assert!(!r.is_dst);
        assert_eq!(r.offset_minutes(), 720);
    }

    #[test]
    fn test_northern_hemisphere_ordering() {
        let tz = us_eastern();

        assert!(!resolve(at(US_DST_START_2025 - 1), &tz).is_dst);
        assert!(resolve(at(US_DST_START_2025), &tz).is_dst);
        assert!(resolve(at(US_DST_END_2025 - 1), &tz).is_dst);
        assert!(!resolve(at(US_DST_END_2025), &tz).is_dst);

        // New Year is standard time in the north
        let r = resolve(at(1_735_689_600), &tz);
        assert!(!r.is_dst);
        assert_eq!(r.active_rule.name, "EST");
        let c = r.civil();
        assert_eq!((c.year, c.month, c.day, c.hour), (2024, Month::Dec, 31, 19));
    }

    #[test]
    fn test_offset_is_always_one_of_the_two_rules() {
        for tz in [TimezoneSpec::new_zealand(), us_eastern()] {
            let allowed = [tz.dst().offset_minutes, tz.std().offset_minutes];
            // 2024-01-01 .. 2027-01-01 in steps of 7h13m
            let mut secs = 1_704_067_200i64;
            while secs < 1_798_761_600 {
                let utc = at(secs);
                let r = resolve(utc, &tz);
                let delta = r.local_instant.secs_since(utc);
                assert!(
                    allowed.iter().any(|&m| i64::from(m) * 60 == delta),
                    "unexpected offset {} at {}",
                    delta,
                    secs
                );
                secs += 7 * 3600 + 13 * 60;
            }
        }
    }

    #[test]
    fn test_dst_round_trip() {
        let tz = TimezoneSpec::new_zealand();
        let utc = at(1_735_642_800);
        let r = resolve(utc, &tz);
        assert!(r.is_dst);
        assert_eq!(r.local_instant.offset_by_minutes(-tz.dst().offset_minutes), utc);
    }

    #[test]
    fn test_leap_year_transitions() {
        // 2024 is a leap year: last Sunday of Sep is the 29th
        let tz = TimezoneSpec::new_zealand();
        let (start, _) = tz.transitions(2024);
        let c = start.offset_by_minutes(720).civil();
        assert_eq!((c.year, c.month, c.day, c.hour), (2024, Month::Sep, 29, 2));
    }

    #[test]
    fn test_resolve_is_total_at_range_limits() {
        for tz in [TimezoneSpec::new_zealand(), us_eastern()] {
            for utc in [Instant::MIN, Instant::MAX, Instant::UNIX_EPOCH] {
                let r = resolve(utc, &tz);
                let expected = if r.is_dst { tz.dst() } else { tz.std() };
                assert_eq!(r.active_rule, expected);
            }
        }
    }

    #[test]
    fn test_seasons_hold_at_range_limits() {
        let nz = TimezoneSpec::new_zealand();
        let us = us_eastern();
        // 9999-12-31T11:30:00Z and -9999-01-15T00:00:00Z
        let late = at(Instant::MAX.as_unix_secs() - 45_000);
        let early = at(Instant::MIN.as_unix_secs() + 14 * SECONDS_PER_DAY);

        let r = resolve(late, &nz);
        assert!(r.is_dst);
        assert_eq!(r.active_rule.name, "NZDT");
        assert!(!resolve(late, &us).is_dst);

        assert!(resolve(early, &nz).is_dst);
        let r = resolve(early, &us);
        assert!(!r.is_dst);
        assert_eq!(r.active_rule.name, "EST");

        // the very ends of the range
        assert!(resolve(Instant::MAX, &nz).is_dst);
        assert!(!resolve(Instant::MIN, &us).is_dst);
    }

    #[test]
    fn test_rule_validation() {
        let mut rule = DstRule::NZDT;
        assert_eq!(rule.validate(), Ok(()));

        rule.name = "NZDST";
        assert_eq!(rule.validate(), Err(ConfigError::RuleNameTooLong));

        rule = DstRule::NZDT;
        rule.hour_of_day = 24;
        assert_eq!(rule.validate(), Err(ConfigError::HourOutOfRange));

        rule = DstRule::NZDT;
        rule.offset_minutes = -1440;
        assert_eq!(rule.validate(), Err(ConfigError::OffsetOutOfRange));

        assert!(TimezoneSpec::new(rule, DstRule::NZST).is_err());
    }
}
