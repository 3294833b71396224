use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("storage error: {message}")]
    Storage { message: String },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("invalid index {index}: must be at most {max}")]
    InvalidIndex { index: u32, max: u32 },
    #[error("validation error: {message}")]
    Validation { message: String },
    #[error("conflict: {message}")]
    Conflict { message: String },
}

impl PlannerError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_index(index: u32, max: u32) -> Self {
        Self::InvalidIndex { index, max }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;

impl From<sea_orm::DbErr> for PlannerError {
    fn from(value: sea_orm::DbErr) -> Self {
        PlannerError::storage(value.to_string())
    }
}
