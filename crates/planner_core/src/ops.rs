use serde::{Deserialize, Serialize};

use crate::{DayDate, Scope};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateActivityInput {
    /// `None` places the activity in the default day, creating that day if needed.
    pub scope: Option<Scope>,
    /// `None` appends after the last activity of the scope.
    pub index: Option<u32>,
    pub name: String,
    pub time: String,
}

impl CreateActivityInput {
    pub fn new(name: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            scope: None,
            index: None,
            name: name.into(),
            time: time.into(),
        }
    }

    pub fn in_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn at_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }
}

/// Partial edit of an activity. Absent fields keep their stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateActivityInput {
    pub name: Option<String>,
    pub time: Option<String>,
    pub index: Option<u32>,
}

impl UpdateActivityInput {
    pub fn move_to(index: u32) -> Self {
        Self {
            index: Some(index),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.time.is_none() && self.index.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDayInput {
    pub date: DayDate,
}
