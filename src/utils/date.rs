use chrono::{DateTime, Days, Local, NaiveDate, TimeZone};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// `date + days`, saturating at the calendar's end.
pub fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Local midnight that opens `date`.
///
/// On a day whose midnight falls in a DST gap the first valid instant of
/// the day is used instead.
pub fn local_midnight(date: NaiveDate) -> Option<DateTime<Local>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            let one_am = date.and_hms_opt(1, 0, 0)?;
            Local.from_local_datetime(&one_am).earliest()
        })
}

/// Parse a user-supplied point in time: RFC 3339, "YYYY-MM-DD HH:MM" (local)
/// or a bare date (local midnight).
pub fn parse_datetime(s: &str) -> Option<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Local.from_local_datetime(&naive).earliest();
    }
    parse_date(s).and_then(local_midnight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_days_crosses_month() {
        let d = NaiveDate::from_ymd_opt(2024, 7, 28).unwrap();
        assert_eq!(add_days(d, 7), NaiveDate::from_ymd_opt(2024, 8, 4).unwrap());
    }

    #[test]
    fn parse_datetime_accepts_three_shapes() {
        assert!(parse_datetime("2024-07-11T04:03:00-07:00").is_some());
        assert!(parse_datetime("2024-07-11 04:03").is_some());
        let midnight = parse_datetime("2024-07-11").unwrap();
        assert_eq!(midnight.date_naive(), NaiveDate::from_ymd_opt(2024, 7, 11).unwrap());
        assert!(parse_datetime("yesterday").is_none());
    }
}
