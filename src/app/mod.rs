//! Application module - dashboard state and the operations behind each control
//!
//! Everything here is generic over [`RequestApi`](crate::interface::RequestApi),
//! so the same logic runs on the reqwest client, the gloo client and test fakes.

pub mod auth;
pub mod grading;
pub mod homework_query;
pub mod selection;
pub mod student;
pub mod teacher;
pub mod uploads;

pub use auth::{boot_profile, login, register, Boot, Landing};
pub use grading::{GradingSession, GradingState};
pub use homework_query::{HomeworkFilterQuery, RefreshOutcome};
pub use selection::{Selection, SelectionStore};
pub use student::StudentDashboard;
pub use teacher::TeacherDashboard;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

/// A message rendered next to one control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Error,
            text: text.into(),
        }
    }

    pub fn from_error(err: &Error) -> Self {
        Self::error(err.user_message())
    }
}
