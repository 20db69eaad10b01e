use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Asia::Jakarta;

/// Format used for `search_date` and news cache keys.
pub const SEARCH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar day of `now` in Jakarta (UTC+7), independent of the host clock's zone.
pub fn jakarta_day(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Jakarta).date_naive()
}

pub fn jakarta_today() -> NaiveDate {
    jakarta_day(Utc::now())
}

pub fn search_date(day: NaiveDate) -> String {
    day.format(SEARCH_DATE_FORMAT).to_string()
}
