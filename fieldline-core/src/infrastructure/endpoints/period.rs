use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::str::FromStr;

/// Reporting periods accepted by the accounting summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    CurrentMonth,
    LastMonth,
    CurrentQuarter,
    LastQuarter,
    CurrentYear,
}

pub const PERIOD_NAMES: [&str; 5] = [
    "current_month",
    "last_month",
    "current_quarter",
    "last_quarter",
    "current_year",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FromStr for Period {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "current_month" => Ok(Period::CurrentMonth),
            "last_month" => Ok(Period::LastMonth),
            "current_quarter" => Ok(Period::CurrentQuarter),
            "last_quarter" => Ok(Period::LastQuarter),
            "current_year" => Ok(Period::CurrentYear),
            other => Err(format!("unknown period '{other}'")),
        }
    }
}

impl Period {
    /// Inclusive date range; periods still in progress end on `today`.
    pub fn date_range(self, today: NaiveDate) -> DateRange {
        let year = today.year();
        let month = today.month();
        match self {
            Period::CurrentMonth => DateRange {
                start: first_of(year, month),
                end: today,
            },
            Period::LastMonth => {
                let (y, m) = shift_month(year, month, -1);
                DateRange {
                    start: first_of(y, m),
                    end: last_of(y, m),
                }
            }
            Period::CurrentQuarter => DateRange {
                start: first_of(year, quarter_start(month)),
                end: today,
            },
            Period::LastQuarter => {
                let (y, m) = shift_month(year, quarter_start(month), -3);
                let (end_y, end_m) = shift_month(y, m, 2);
                DateRange {
                    start: first_of(y, m),
                    end: last_of(end_y, end_m),
                }
            }
            Period::CurrentYear => DateRange {
                start: first_of(year, 1),
                end: today,
            },
        }
    }
}

fn quarter_start(month: u32) -> u32 {
    ((month - 1) / 3) * 3 + 1
}

fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

fn first_of(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn last_of(year: i32, month: u32) -> NaiveDate {
    let (next_y, next_m) = shift_month(year, month, 1);
    first_of(next_y, next_m)
        .pred_opt()
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_ranges() {
        let today = date(2024, 3, 14);
        assert_eq!(
            Period::CurrentMonth.date_range(today),
            DateRange { start: date(2024, 3, 1), end: today }
        );
        assert_eq!(
            Period::LastMonth.date_range(today),
            DateRange { start: date(2024, 2, 1), end: date(2024, 2, 29) }
        );
        assert_eq!(
            Period::LastMonth.date_range(date(2024, 1, 10)),
            DateRange { start: date(2023, 12, 1), end: date(2023, 12, 31) }
        );
    }

    #[test]
    fn quarter_ranges_cross_year_boundary() {
        let today = date(2024, 2, 20);
        assert_eq!(
            Period::CurrentQuarter.date_range(today),
            DateRange { start: date(2024, 1, 1), end: today }
        );
        assert_eq!(
            Period::LastQuarter.date_range(today),
            DateRange { start: date(2023, 10, 1), end: date(2023, 12, 31) }
        );
        assert_eq!(
            Period::LastQuarter.date_range(date(2024, 8, 5)),
            DateRange { start: date(2024, 4, 1), end: date(2024, 6, 30) }
        );
    }

    #[test]
    fn parses_every_advertised_name() {
        for name in PERIOD_NAMES {
            assert!(name.parse::<Period>().is_ok(), "{name}");
        }
        assert!("fiscal_year".parse::<Period>().is_err());
    }
}
