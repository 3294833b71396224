use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of an activity row.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(pub i64);

/// Store-assigned identifier of a day row.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayId(pub i64);

macro_rules! id_display {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

id_display!(ActivityId);
id_display!(DayId);

/// The group within which activity indices are kept dense.
///
/// `Global` is the scope shared by every activity without a day.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "day_id", rename_all = "lowercase")]
pub enum Scope {
    Global,
    Day(DayId),
}

impl Scope {
    pub fn from_day(day: Option<DayId>) -> Self {
        match day {
            Some(day) => Scope::Day(day),
            None => Scope::Global,
        }
    }

    pub fn day_id(self) -> Option<DayId> {
        match self {
            Scope::Global => None,
            Scope::Day(day) => Some(day),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Day(day) => write!(f, "day {day}"),
        }
    }
}
