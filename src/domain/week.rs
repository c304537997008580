use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};

use crate::clock::mess_offset;

const SECONDS_PER_WEEK: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum WeekLetter {
    A,
    B,
    C,
    D,
}

impl WeekLetter {
    const ORDER: [WeekLetter; 4] = [WeekLetter::A, WeekLetter::B, WeekLetter::C, WeekLetter::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeekLetter::A => "A",
            WeekLetter::B => "B",
            WeekLetter::C => "C",
            WeekLetter::D => "D",
        }
    }

    /// Key of this week inside a menu document, e.g. `weekC`.
    pub fn menu_key(&self) -> String {
        format!("week{}", self.as_str())
    }
}

impl std::fmt::Display for WeekLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four week menu cycle.
///
/// The letter for an instant is the number of whole weeks elapsed since
/// midnight of `reference_date` in the mess timezone, shifted by `offset` and
/// wrapped to four. The offset aligns the cycle with the canteen's real
/// rotation and has to be confirmed with the canteen whenever it is changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRotation {
    reference_date: NaiveDate,
    offset: u32,
}

impl WeekRotation {
    pub fn new(reference_date: NaiveDate, offset: u32) -> Self {
        Self {
            reference_date,
            offset,
        }
    }

    pub fn week_at(&self, instant: DateTime<Utc>) -> WeekLetter {
        let local_midnight = self.reference_date.and_time(NaiveTime::default());
        let offset = Duration::seconds(i64::from(mess_offset().local_minus_utc()));
        let reference = Utc.from_utc_datetime(&(local_midnight - offset));

        let weeks_passed = (instant - reference)
            .num_seconds()
            .div_euclid(SECONDS_PER_WEEK);
        let index = (weeks_passed + i64::from(self.offset)).rem_euclid(4);

        WeekLetter::ORDER[index as usize]
    }

    /// Weekday and week letter of `instant`, seen from the mess.
    pub fn menu_day(&self, instant: DateTime<Utc>) -> MenuDay {
        MenuDay {
            weekday: instant.with_timezone(&mess_offset()).weekday(),
            week: self.week_at(instant),
        }
    }
}

impl Default for WeekRotation {
    fn default() -> Self {
        // The rotation was on week C during the week of 2024-01-01.
        let reference_date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid reference date");

        Self::new(reference_date, 2)
    }
}

/// The day a menu is looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuDay {
    pub weekday: Weekday,
    pub week: WeekLetter,
}

impl MenuDay {
    /// Capitalised English name, e.g. `Monday`.
    pub fn weekday_name(&self) -> &'static str {
        match self.weekday {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    /// Key of the day inside a week of a menu document, e.g. `monday`.
    pub fn weekday_key(&self) -> String {
        self.weekday_name().to_lowercase()
    }
}
