//! Time-of-day parsing and next-restart computation.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::constants::schedule::MIN_ADVANCE_NOTICE_MINUTES;
use crate::errors::ConfigError;

/// Timezone the daily restart time is interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleZone {
    /// Host local time
    #[default]
    Local,
    /// A named IANA zone
    Named(Tz),
}

impl ScheduleZone {
    pub fn parse(name: Option<&str>) -> Result<Self, ConfigError> {
        match name {
            None => Ok(Self::Local),
            Some(name) => name
                .parse::<Tz>()
                .map(Self::Named)
                .map_err(|e| ConfigError::InvalidValue {
                    field: "timezone".to_string(),
                    reason: format!("'{}': {}", name, e),
                }),
        }
    }

    /// Next occurrence of `daily_time` in this zone, as a UTC instant.
    pub fn next_restart(
        &self,
        now: DateTime<Utc>,
        daily_time: NaiveTime,
        testing_mode: bool,
    ) -> DateTime<Utc> {
        match self {
            Self::Local => {
                compute_next_restart(now.with_timezone(&Local), daily_time, testing_mode)
                    .with_timezone(&Utc)
            }
            Self::Named(tz) => {
                compute_next_restart(now.with_timezone(tz), daily_time, testing_mode)
                    .with_timezone(&Utc)
            }
        }
    }
}

/// Places `daily_time` on the calendar day of `now`, rolling over to the next
/// day when that instant is already past or, outside testing mode, closer than
/// the minimum advance notice.
pub fn compute_next_restart<T: TimeZone>(
    now: DateTime<T>,
    daily_time: NaiveTime,
    testing_mode: bool,
) -> DateTime<T> {
    let tz = now.timezone();
    let today = now.date_naive();
    let candidate = at_time_of_day(&tz, today, daily_time);

    let too_soon = !testing_mode
        && candidate.clone().signed_duration_since(now.clone())
            < Duration::minutes(MIN_ADVANCE_NOTICE_MINUTES);

    if candidate < now || too_soon {
        match today.succ_opt() {
            Some(tomorrow) => at_time_of_day(&tz, tomorrow, daily_time),
            None => candidate + Duration::days(1),
        }
    } else {
        candidate
    }
}

// Ambiguous local times take the earlier instant; a time skipped by a DST gap
// is pushed forward by an hour.
fn at_time_of_day<T: TimeZone>(tz: &T, date: NaiveDate, time: NaiveTime) -> DateTime<T> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Parses a time of day: `HH:MM`, `HH:MM:SS`, or 12-hour forms with an
/// `a`/`am`/`p`/`pm` suffix such as `12:00p` or `7:30 am`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        field: "daily_restart_time".to_string(),
        reason: format!("'{}': {}", value, reason),
    };

    let trimmed = value.trim().to_ascii_lowercase();
    let (clock, meridiem) = if let Some(rest) = trimmed.strip_suffix("am") {
        (rest, Some(false))
    } else if let Some(rest) = trimmed.strip_suffix("pm") {
        (rest, Some(true))
    } else if let Some(rest) = trimmed.strip_suffix('a') {
        (rest, Some(false))
    } else if let Some(rest) = trimmed.strip_suffix('p') {
        (rest, Some(true))
    } else {
        (trimmed.as_str(), None)
    };

    let fields: Vec<&str> = clock.trim().split(':').collect();
    if fields.len() < 2 || fields.len() > 3 {
        return Err(invalid("expected HH:MM or HH:MM:SS"));
    }

    let mut numbers = [0u32; 3];
    for (slot, field) in numbers.iter_mut().zip(&fields) {
        *slot = field
            .parse::<u32>()
            .map_err(|_| invalid("time fields must be numbers"))?;
    }
    let [mut hour, minute, second] = numbers;

    if let Some(pm) = meridiem {
        if hour == 0 || hour > 12 {
            return Err(invalid("12-hour times need an hour between 1 and 12"));
        }
        hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
    }

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| invalid("time out of range"))
}
