use chrono::{DateTime, FixedOffset, Utc};

/// IANA name reported to clients for the mess timezone.
pub const MESS_TIMEZONE: &str = "Asia/Kolkata";

// Asia/Kolkata has no daylight saving, so a fixed +05:30 offset is exact.
const MESS_UTC_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

pub fn mess_offset() -> FixedOffset {
    FixedOffset::east_opt(MESS_UTC_OFFSET_SECONDS).expect("+05:30 is a valid UTC offset")
}

/// Single source of "now" for the application.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn local_now(&self) -> DateTime<FixedOffset> {
        self.now().with_timezone(&mess_offset())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the instant it was built with. Used by tests to pin the date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
