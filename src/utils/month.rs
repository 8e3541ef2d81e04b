use crate::error::{AppError, AppResult};
use chrono::{Datelike, NaiveDate, Utc};

/// 归一化到当月 1 号
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn current_month() -> NaiveDate {
    first_of_month(Utc::now().date_naive())
}

/// 解析 `YYYY-MM`
pub fn parse_month(value: &str) -> AppResult<NaiveDate> {
    let invalid = || AppError::ValidationError(format!("Invalid month '{value}', use YYYY-MM"));

    let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

pub fn format_month(month: NaiveDate) -> String {
    month.format("%Y-%m").to_string()
}

/// e.g. "October 2025"
pub fn month_label(month: NaiveDate) -> String {
    month.format("%B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        assert_eq!(
            parse_month("2025-10").unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
        );
        assert_eq!(
            parse_month("2026-3").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("2025/10").is_err());
        assert!(parse_month("25-10").is_err());
        assert!(parse_month("").is_err());
    }

    #[test]
    fn test_first_of_month_and_labels() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 17).unwrap();
        let month = first_of_month(date);
        assert_eq!(month, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(format_month(month), "2025-10");
        assert_eq!(month_label(month), "October 2025");
        assert_eq!(current_month().day(), 1);
    }
}
