use serde::{Deserialize, Serialize};

use crate::{ActivityId, DayDate, DayId, Scope};

/// An activity the user plans to do at a certain time.
///
/// `index` is the activity's zero-based rank inside `scope`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub scope: Scope,
    pub index: u32,
    pub name: String,
    pub time: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    pub id: DayId,
    pub date: DayDate,
}

impl Day {
    pub fn scope(&self) -> Scope {
        Scope::Day(self.id)
    }
}
