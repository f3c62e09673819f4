use axum::http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the slot storage layer. Never retried.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode state document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid slot name: {0:?}")]
    InvalidSlotName(String),
}

/// Everything a state operation can reject with.
#[derive(Error, Debug)]
pub enum HabitError {
    #[error("habit name must not be empty")]
    EmptyHabitName,

    #[error("habit {0:?} already exists")]
    DuplicateHabit(String),

    #[error("habit {0:?} is not tracked")]
    UnknownHabit(String),

    #[error("habit {0:?} has past-day history and cannot be removed")]
    LockedHistory(String),

    #[error("past days are locked and cannot be edited ({0})")]
    PastDayLocked(String),

    #[error("invalid date key {0:?}, expected YYYY-MM-DD")]
    InvalidDateKey(String),

    #[error("data could not be imported: {0}")]
    ValidationRejected(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<HabitError> for AppError {
    fn from(err: HabitError) -> Self {
        let status = match &err {
            HabitError::EmptyHabitName
            | HabitError::DuplicateHabit(_)
            | HabitError::InvalidDateKey(_) => StatusCode::BAD_REQUEST,
            HabitError::UnknownHabit(_) => StatusCode::NOT_FOUND,
            HabitError::PastDayLocked(_) => StatusCode::FORBIDDEN,
            HabitError::LockedHistory(_) => StatusCode::CONFLICT,
            HabitError::ValidationRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HabitError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
