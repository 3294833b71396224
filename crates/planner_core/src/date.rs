use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Month};

use crate::{PlannerError, PlannerResult};

/// Calendar date of a day, written as `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DayDate(pub Date);

impl DayDate {
    pub fn from_ymd(year: i32, month: u8, day: u8) -> PlannerResult<Self> {
        let month = Month::try_from(month)
            .map_err(|err| PlannerError::invalid(format!("invalid month {month}: {err}")))?;
        let date = Date::from_calendar_date(year, month, day)
            .map_err(|err| PlannerError::invalid(format!("invalid date: {err}")))?;
        Ok(Self(date))
    }

    pub fn parse(value: &str) -> PlannerResult<Self> {
        let mut parts = value.trim().splitn(3, '-');
        let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(PlannerError::invalid(format!(
                "invalid date '{value}': expected YYYY-MM-DD"
            )));
        };
        let parse_err = |err: ParseIntError| {
            PlannerError::invalid(format!("invalid date '{value}': {err}"))
        };
        let year: i32 = year.parse().map_err(parse_err)?;
        let month: u8 = month.parse().map_err(parse_err)?;
        let day: u8 = day.parse().map_err(parse_err)?;
        Self::from_ymd(year, month, day)
    }

    /// Julian day number, the persisted form of the date.
    pub fn to_julian_day(self) -> i32 {
        self.0.to_julian_day()
    }

    pub fn from_julian_day(value: i32) -> PlannerResult<Self> {
        Date::from_julian_day(value)
            .map(Self)
            .map_err(|err| PlannerError::storage(format!("invalid stored date {value}: {err}")))
    }
}

impl fmt::Display for DayDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl FromStr for DayDate {
    type Err = PlannerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Serialize for DayDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DayDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        DayDate::parse(&value).map_err(serde::de::Error::custom)
    }
}
