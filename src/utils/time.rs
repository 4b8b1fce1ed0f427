use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// This is the standard way of showing a date on the dashboard. For example `Oct 19, 2026`.
pub fn date_to_display_name(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Returns the first moment of the day `moment` belongs to, in the same timezone.
///
/// Some timezones skip midnight during a DST change. In that case the first existing hour of the
/// day is used.
pub fn start_of_day<Tz: TimeZone>(moment: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = moment.timezone();
    let midnight = moment.date_naive().and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| moment.clone())
}

/// Local midnight of the day `now` falls on in `tz`, as a UTC instant. The offset is the one in
/// effect at midnight, which differs from the current one on days the clocks change.
pub fn start_of_today_in<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    start_of_day(&now.with_timezone(tz)).with_timezone(&Utc)
}

/// Zone with one daylight saving period, used to pin clock changes in tests.
#[cfg(test)]
pub(crate) mod test_zone {
    use chrono::{
        DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    };

    #[derive(Debug, Clone, Copy)]
    pub struct DstZone {
        pub standard: FixedOffset,
        /// UTC instant clocks move one hour forward.
        pub dst_start: DateTime<Utc>,
        /// UTC instant clocks move back to standard time.
        pub dst_end: DateTime<Utc>,
    }

    impl DstZone {
        /// America/New_York during 2025.
        pub fn new_york_2025() -> Self {
            Self {
                standard: FixedOffset::west_opt(5 * 3600).unwrap(),
                dst_start: Utc.with_ymd_and_hms(2025, 3, 9, 7, 0, 0).unwrap(),
                dst_end: Utc.with_ymd_and_hms(2025, 11, 2, 6, 0, 0).unwrap(),
            }
        }

        /// Standard time UTC-4, clocks jump from 00:00 straight to 01:00 on 2025-09-07.
        pub fn midnight_gap_2025() -> Self {
            Self {
                standard: FixedOffset::west_opt(4 * 3600).unwrap(),
                dst_start: Utc.with_ymd_and_hms(2025, 9, 7, 4, 0, 0).unwrap(),
                dst_end: Utc.with_ymd_and_hms(2026, 4, 5, 3, 0, 0).unwrap(),
            }
        }

        fn daylight(&self) -> FixedOffset {
            FixedOffset::east_opt(self.standard.local_minus_utc() + 3600).unwrap()
        }
    }

    impl TimeZone for DstZone {
        type Offset = FixedOffset;

        fn from_offset(offset: &FixedOffset) -> Self {
            // Only the zone itself produces these offsets, so the rules don't matter here.
            Self {
                standard: *offset,
                dst_start: DateTime::<Utc>::MAX_UTC,
                dst_end: DateTime::<Utc>::MAX_UTC,
            }
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let candidates = [self.daylight(), self.standard]
                .into_iter()
                .filter(|offset| {
                    let utc = *local - *offset;
                    self.offset_from_utc_datetime(&utc) == *offset
                })
                .collect::<Vec<_>>();
            match candidates[..] {
                [] => LocalResult::None,
                [offset] => LocalResult::Single(offset),
                // Daylight offset maps to the earlier UTC instant.
                [daylight, standard, ..] => LocalResult::Ambiguous(daylight, standard),
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            let utc = utc.and_utc();
            if utc >= self.dst_start && utc < self.dst_end {
                self.daylight()
            } else {
                self.standard
            }
        }
    }
}
