use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate};

/// `04-Nov-2024`
pub const START_DATE_FORMAT: &str = "%d-%b-%Y";

/// `today` when it is a Monday, otherwise the Monday after it.
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let ahead = (7 - today.weekday().num_days_from_monday()) % 7;
    today + Days::new(ahead as u64)
}

pub fn parse_start_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), START_DATE_FORMAT)
        .with_context(|| format!("start date '{raw}' is not in DD-MMM-YYYY form (e.g. 04-Nov-2024)"))
}

pub fn format_start_date(date: NaiveDate) -> String {
    date.format(START_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_next_monday() {
        // 2024-11-04 is a Monday
        assert_eq!(next_monday(d(2024, 11, 4)), d(2024, 11, 4));
        assert_eq!(next_monday(d(2024, 11, 5)), d(2024, 11, 11));
        assert_eq!(next_monday(d(2024, 11, 10)), d(2024, 11, 11));
        assert_eq!(next_monday(d(2024, 12, 31)), d(2025, 1, 6));
    }

    #[test]
    fn test_parse_and_format() {
        assert_eq!(parse_start_date("04-Nov-2024").unwrap(), d(2024, 11, 4));
        assert_eq!(parse_start_date(" 04-nov-2024 ").unwrap(), d(2024, 11, 4));
        assert_eq!(format_start_date(d(2024, 11, 4)), "04-Nov-2024");
        assert!(parse_start_date("2024-11-04").is_err());
    }
}
