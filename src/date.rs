//! `DT` text to a DuckDB `DATE`.
//!
//! SGF dates are `YYYY-MM-DD`, possibly partial (`YYYY-MM`, `YYYY`) and possibly
//! a list (`1996-05-06,07`). Only the first date is kept; missing month or day
//! defaults to 01. `.` and `/` separators written by older tools are accepted.

use chrono::{Datelike, NaiveDate};
use libduckdb_sys::duckdb_date;
use std::sync::LazyLock;

use crate::error::ErrorAccumulator;

static EPOCH: LazyLock<NaiveDate> = LazyLock::new(|| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());

static SGF_DATE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^\s*(\d{4})(?:[-./](\d{1,2}))?(?:[-./](\d{1,2}))?(?:$|[\s,])")
        .expect("valid sgf date regex")
});

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let first_day_next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1)?
    };

    first_day_next_month.pred_opt().map(|d| d.day())
}

pub fn parse_sgf_date(raw: &str) -> Result<NaiveDate, String> {
    let caps = SGF_DATE_RE
        .captures(raw)
        .ok_or_else(|| "unrecognized date format".to_string())?;

    let number = |idx: usize| -> Result<Option<u32>, String> {
        caps.get(idx)
            .map(|m| m.as_str().parse::<u32>().map_err(|e| e.to_string()))
            .transpose()
    };

    let year = number(1)?.unwrap_or_default() as i32;
    let month = number(2)?.unwrap_or(1);
    let day = number(3)?.unwrap_or(1);

    if year <= 0 {
        return Err("year must be >= 1".to_string());
    }
    if day == 0 {
        return Err("input is out of range".to_string());
    }
    let last_day =
        last_day_of_month(year, month).ok_or_else(|| "input is out of range".to_string())?;

    NaiveDate::from_ymd_opt(year, month, day.min(last_day))
        .ok_or_else(|| "input is out of range".to_string())
}

/// Converts `DT` for the `date` column. Failures are recorded on the row and
/// leave the column NULL.
pub fn sgf_date_to_duckdb(raw: &str, parse_error: &mut ErrorAccumulator) -> Option<duckdb_date> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let date = match parse_sgf_date(s) {
        Ok(date) => date,
        Err(e) => {
            parse_error.push(&format!("Conversion error: DT='{s}' (chrono: {e})"));
            return None;
        }
    };

    match i32::try_from(date.signed_duration_since(*EPOCH).num_days()) {
        Ok(days) => Some(duckdb_date { days }),
        Err(_) => {
            parse_error.push(&format!("Conversion error: DT='{s}' (chrono: date out of range)"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_full_date() {
        assert_eq!(parse_sgf_date("1846-09-11"), Ok(ymd(1846, 9, 11)));
    }

    #[test]
    fn test_partial_dates_default_to_first() {
        assert_eq!(parse_sgf_date("1998-06"), Ok(ymd(1998, 6, 1)));
        assert_eq!(parse_sgf_date("1998"), Ok(ymd(1998, 1, 1)));
    }

    #[test]
    fn test_date_list_keeps_first() {
        assert_eq!(parse_sgf_date("1996-05-06,07"), Ok(ymd(1996, 5, 6)));
        assert_eq!(parse_sgf_date("1996-12-30,1997-01-03"), Ok(ymd(1996, 12, 30)));
    }

    #[test]
    fn test_alternate_separators() {
        assert_eq!(parse_sgf_date("2004.12.31"), Ok(ymd(2004, 12, 31)));
        assert_eq!(parse_sgf_date("2004/1/5"), Ok(ymd(2004, 1, 5)));
    }

    #[test]
    fn test_day_is_clamped_to_month_end() {
        assert_eq!(parse_sgf_date("2023-02-30"), Ok(ymd(2023, 2, 28)));
        assert_eq!(parse_sgf_date("2024-02-30"), Ok(ymd(2024, 2, 29)));
    }

    #[test]
    fn test_invalid_dates() {
        assert!(parse_sgf_date("last tuesday").is_err());
        assert!(parse_sgf_date("2020-13-01").is_err());
        assert!(parse_sgf_date("0000-01-01").is_err());
        assert!(parse_sgf_date("20201-01-01").is_err());
    }

    #[test]
    fn test_duckdb_date_days_since_epoch() {
        let mut parse_error = ErrorAccumulator::default();
        let date = sgf_date_to_duckdb("1970-01-02", &mut parse_error).unwrap();
        assert_eq!(date.days, 1);
        let date = sgf_date_to_duckdb(" 1969-12-31 ", &mut parse_error).unwrap();
        assert_eq!(date.days, -1);
        assert!(parse_error.is_empty());
    }

    #[test]
    fn test_duckdb_date_records_conversion_error() {
        let mut parse_error = ErrorAccumulator::default();
        assert!(sgf_date_to_duckdb("sometime", &mut parse_error).is_none());
        assert_eq!(
            parse_error.take().as_deref(),
            Some("Conversion error: DT='sometime' (chrono: unrecognized date format)")
        );
    }

    #[test]
    fn test_duckdb_date_empty_is_null_without_error() {
        let mut parse_error = ErrorAccumulator::default();
        assert!(sgf_date_to_duckdb("  ", &mut parse_error).is_none());
        assert!(parse_error.is_empty());
    }
}
