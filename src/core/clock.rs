use chrono::{DateTime, FixedOffset, Local, NaiveDate};

pub trait Clock {
    /// Current time in the user's local offset.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Local calendar date of `at`, using the offset the user's time zone had
    /// at that instant (not the offset in effect now).
    fn day_key(&self, at: &DateTime<FixedOffset>) -> NaiveDate;

    fn today(&self) -> NaiveDate {
        self.day_key(&self.now())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    fn day_key(&self, at: &DateTime<FixedOffset>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }
}

#[cfg(test)]
pub use self::fixed::{FixedClock, TestZone};

#[cfg(test)]
mod fixed {
    use super::Clock;
    use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};

    /// Offset rules a `FixedClock` can follow.
    #[derive(Debug, Clone, Copy)]
    pub enum TestZone {
        Fixed(FixedOffset),
        /// CET/CEST: +01:00, +02:00 from the last Sunday of March to the
        /// last Sunday of October, switching at 01:00 UTC.
        CentralEurope,
    }

    impl TestZone {
        pub fn offset_at(&self, at: &DateTime<Utc>) -> FixedOffset {
            match self {
                TestZone::Fixed(offset) => *offset,
                TestZone::CentralEurope => {
                    let year = at.year();
                    let summer = switch_instant(year, 3) <= *at && *at < switch_instant(year, 10);
                    let hours = if summer { 2 } else { 1 };
                    FixedOffset::east_opt(hours * 3600).unwrap()
                }
            }
        }
    }

    /// 01:00 UTC on the last Sunday of `month` (March or October).
    fn switch_instant(year: i32, month: u32) -> DateTime<Utc> {
        let last = NaiveDate::from_ymd_opt(year, month, 31).unwrap();
        let back = last.weekday().num_days_from_sunday() as i64;
        let sunday = last - Duration::days(back);
        Utc.from_utc_datetime(&sunday.and_hms_opt(1, 0, 0).unwrap())
    }

    /// A clock frozen at a given instant; advance it by hand.
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        now: DateTime<Utc>,
        zone: TestZone,
    }

    impl FixedClock {
        /// Frozen at an RFC 3339 timestamp, keeping that timestamp's offset
        /// all year round.
        pub fn at(rfc3339: &str) -> Self {
            let parsed = DateTime::parse_from_rfc3339(rfc3339).unwrap();
            Self {
                now: parsed.with_timezone(&Utc),
                zone: TestZone::Fixed(*parsed.offset()),
            }
        }

        pub fn in_zone(rfc3339: &str, zone: TestZone) -> Self {
            let parsed = DateTime::parse_from_rfc3339(rfc3339).unwrap();
            Self {
                now: parsed.with_timezone(&Utc),
                zone,
            }
        }

        pub fn advance(&mut self, by: Duration) {
            self.now += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<FixedOffset> {
            self.now.with_timezone(&self.zone.offset_at(&self.now))
        }

        fn day_key(&self, at: &DateTime<FixedOffset>) -> NaiveDate {
            let utc = at.with_timezone(&Utc);
            utc.with_timezone(&self.zone.offset_at(&utc)).date_naive()
        }
    }
}
