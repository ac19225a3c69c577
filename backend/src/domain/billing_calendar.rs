//! Local calendar arithmetic for the monthly payment cycle.
//!
//! The centre runs on a single local time zone expressed as a fixed UTC
//! offset. Every calendar rule (grace window, deadline, scheduler fire
//! times) is evaluated on the local date, while timestamps are stored in UTC.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeDelta, TimeZone, Utc,
};

/// Last local day of the month on which an unpaid student keeps access.
pub const DEADLINE_DAY: u32 = 10;
/// Local day of the month on which the payment cycle resets.
pub const RESET_DAY: u32 = 1;
/// Local day of the month on which unpaid students are blocked.
pub const ENFORCEMENT_DAY: u32 = DEADLINE_DAY + 1;
/// Minutes past local midnight at which monthly jobs fire.
pub const FIRE_MINUTE: i64 = 1;
/// Offset used when none is configured (+05:00).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 5 * 60;

/// Errors raised when building a calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BillingCalendarError {
    /// The offset lies outside the ±24h range chrono accepts.
    #[error("utc offset of {minutes} minutes is out of range")]
    OffsetOutOfRange {
        /// Rejected offset.
        minutes: i32,
    },
}

/// Calendar bound to the centre's local UTC offset.
///
/// # Examples
/// ```
/// use backend::domain::BillingCalendar;
/// use chrono::{TimeZone, Utc};
///
/// let calendar = BillingCalendar::from_offset_minutes(300).expect("valid offset");
/// let at = Utc.with_ymd_and_hms(2026, 4, 10, 20, 0, 0).single().expect("valid time");
/// // 01:00 on the 11th in local time.
/// assert!(calendar.is_past_deadline(at));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingCalendar {
    offset: FixedOffset,
}

impl Default for BillingCalendar {
    fn default() -> Self {
        Self::new(
            FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60).unwrap_or_else(|| Utc.fix()),
        )
    }
}

impl BillingCalendar {
    /// Bind a calendar to the given offset.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Build a calendar from an offset expressed in minutes east of UTC.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, BillingCalendarError> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .ok_or(BillingCalendarError::OffsetOutOfRange { minutes })
    }

    /// The configured offset.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local calendar date of an instant.
    #[must_use]
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Local day of the month of an instant.
    #[must_use]
    pub fn day_of_month(&self, at: DateTime<Utc>) -> u32 {
        self.local_date(at).day()
    }

    /// Whether the local day lies after the grace window.
    #[must_use]
    pub fn is_past_deadline(&self, at: DateTime<Utc>) -> bool {
        self.day_of_month(at) > DEADLINE_DAY
    }

    /// Deadline of the month containing `at`: day 10, 23:59:59 local.
    #[must_use]
    pub fn deadline_for(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let day = first_of_month(self.local_date(at)) + Days::new(u64::from(DEADLINE_DAY - 1));
        let end_of_day = day.and_time(NaiveTime::MIN) + TimeDelta::days(1) - TimeDelta::seconds(1);
        self.to_utc(end_of_day)
    }

    /// Next instant strictly after `now` at which a job pinned to local
    /// `day_of_month` 00:01 fires.
    ///
    /// `day_of_month` must lie in `1..=28` so every month has it.
    #[must_use]
    pub fn next_monthly_fire(&self, day_of_month: u32, now: DateTime<Utc>) -> DateTime<Utc> {
        debug_assert!((1..=28).contains(&day_of_month));
        let month = first_of_month(self.local_date(now));
        let candidate = self.fire_instant(month, day_of_month);
        if candidate > now {
            candidate
        } else {
            self.fire_instant(month + Months::new(1), day_of_month)
        }
    }

    fn fire_instant(&self, month: NaiveDate, day_of_month: u32) -> DateTime<Utc> {
        let day = month + Days::new(u64::from(day_of_month.saturating_sub(1)));
        self.to_utc(day.and_time(NaiveTime::MIN) + TimeDelta::minutes(FIRE_MINUTE))
    }

    fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let shift = TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&(local - shift))
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

#[cfg(test)]
mod tests {
    //! Calendar arithmetic across offsets and month boundaries.
    use super::*;
    use rstest::rstest;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s)
            .single()
            .expect("valid timestamp")
    }

    fn tashkent() -> BillingCalendar {
        BillingCalendar::default()
    }

    #[rstest]
    fn default_offset_is_plus_five_hours() {
        assert_eq!(tashkent().offset().local_minus_utc(), 5 * 3600);
    }

    #[rstest]
    #[case(0, true)]
    #[case(-300, true)]
    #[case(14 * 60, true)]
    #[case(24 * 60, false)]
    #[case(i32::MAX, false)]
    fn offset_range_is_validated(#[case] minutes: i32, #[case] ok: bool) {
        assert_eq!(BillingCalendar::from_offset_minutes(minutes).is_ok(), ok);
    }

    #[rstest]
    #[case::utc_day_ten_local_day_ten(utc(2026, 4, 10, 18, 59, 59), false)]
    #[case::utc_day_ten_local_day_eleven(utc(2026, 4, 10, 19, 0, 0), true)]
    #[case::first_of_month(utc(2026, 4, 1, 0, 0, 0), false)]
    #[case::end_of_month(utc(2026, 4, 29, 12, 0, 0), true)]
    fn past_deadline_uses_local_day(#[case] at: DateTime<Utc>, #[case] expected: bool) {
        assert_eq!(tashkent().is_past_deadline(at), expected);
    }

    #[rstest]
    fn deadline_is_day_ten_end_of_local_day() {
        let deadline = tashkent().deadline_for(utc(2026, 2, 3, 8, 0, 0));
        assert_eq!(deadline, utc(2026, 2, 10, 18, 59, 59));
    }

    #[rstest]
    fn deadline_follows_local_month_at_boundary() {
        // 20:00 UTC on 31 Jan is already 1 Feb locally.
        let deadline = tashkent().deadline_for(utc(2026, 1, 31, 20, 0, 0));
        assert_eq!(deadline, utc(2026, 2, 10, 18, 59, 59));
    }

    #[rstest]
    #[case::before_fire_in_month(RESET_DAY, utc(2026, 3, 31, 18, 0, 0), utc(2026, 3, 31, 19, 1, 0))]
    #[case::exactly_at_fire(RESET_DAY, utc(2026, 3, 31, 19, 1, 0), utc(2026, 4, 30, 19, 1, 0))]
    #[case::enforcement_this_month(ENFORCEMENT_DAY, utc(2026, 4, 5, 0, 0, 0), utc(2026, 4, 10, 19, 1, 0))]
    #[case::enforcement_rolls_over(ENFORCEMENT_DAY, utc(2026, 4, 12, 0, 0, 0), utc(2026, 5, 10, 19, 1, 0))]
    #[case::december_rolls_into_january(ENFORCEMENT_DAY, utc(2026, 12, 20, 0, 0, 0), utc(2027, 1, 10, 19, 1, 0))]
    fn next_fire_is_strictly_after_now(
        #[case] day: u32,
        #[case] now: DateTime<Utc>,
        #[case] expected: DateTime<Utc>,
    ) {
        let fire = tashkent().next_monthly_fire(day, now);
        assert_eq!(fire, expected);
        assert!(fire > now);
    }

    #[rstest]
    fn next_fire_lands_on_local_day_and_minute() {
        let calendar = tashkent();
        let fire = calendar.next_monthly_fire(ENFORCEMENT_DAY, utc(2026, 6, 1, 0, 0, 0));
        let local = fire.with_timezone(&calendar.offset());
        assert_eq!(local.day(), ENFORCEMENT_DAY);
        assert_eq!(local.time(), NaiveTime::from_hms_opt(0, 1, 0).expect("valid time"));
    }
}
