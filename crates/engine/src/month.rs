//! Calendar month keys (`YYYY-MM`).

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};

use crate::{EngineError, ResultEngine};

/// A calendar month, parsed from and rendered as `YYYY-MM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(invalid_month());
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn month(self) -> u32 {
        self.month
    }

    /// First day of the month.
    pub fn first_day(self) -> ResultEngine<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or_else(invalid_month)
    }

    /// Last day of the month.
    pub fn last_day(self) -> ResultEngine<NaiveDate> {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.and_then(|d| d.pred_opt()).ok_or_else(invalid_month)
    }

    /// Inclusive `(first, last)` day bounds.
    pub fn bounds(self) -> ResultEngine<(NaiveDate, NaiveDate)> {
        Ok((self.first_day()?, self.last_day()?))
    }

    /// The given day of this month (callers clamp `day` to a valid range).
    pub fn day(self, day: u32) -> ResultEngine<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day).ok_or_else(|| {
            EngineError::InvalidInput(format!("invalid day {day} for month {self}"))
        })
    }

    /// Parses an optional query value; `None` is passed through.
    pub fn parse_opt(raw: Option<&str>) -> ResultEngine<Option<Self>> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .transpose()
    }
}

fn invalid_month() -> EngineError {
    EngineError::InvalidInput("invalid month format, use YYYY-MM".to_string())
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid_month)?;
        if year.len() != 4
            || month.len() != 2
            || !year.chars().chain(month.chars()).all(|c| c.is_ascii_digit())
        {
            return Err(invalid_month());
        }
        let year = year.parse().map_err(|_| invalid_month())?;
        let month = month.parse().map_err(|_| invalid_month())?;
        Self::new(year, month)
    }
}
