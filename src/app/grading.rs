//! Grading of a single homework submission.
//!
//! `Closed -> Open -> Saving -> Closed` on success, back to `Open` with the error
//! on failure. Inputs survive a failed save so the operator can retry.

use crate::error::{Error, Result};
use crate::interface::RequestApi;
use crate::model::dtos::GradeRequest;
use crate::model::structs::HomeworkSubmission;

pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 10;
pub const DEFAULT_SCORE: i64 = MAX_SCORE;

#[derive(Debug, Clone, PartialEq)]
pub struct GradingForm {
    pub submission_id: i64,
    pub score_input: String,
    pub comment: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradingState {
    #[default]
    Closed,
    Open,
    Saving,
}

/// Parse and range-check an operator-entered score.
pub fn validate(score_input: &str) -> Result<u8> {
    let trimmed = score_input.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Enter a score"));
    }
    let score: i64 = trimmed
        .parse()
        .map_err(|_| Error::validation(format!("Score must be a number, got \"{trimmed}\"")))?;
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(Error::validation(format!(
            "Score must be between {MIN_SCORE} and {MAX_SCORE}"
        )));
    }
    Ok(score as u8)
}

#[derive(Debug, Default)]
pub struct GradingSession {
    // Present while open or saving.
    form: Option<GradingForm>,
    saving: bool,
}

impl GradingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GradingState {
        match (&self.form, self.saving) {
            (None, _) => GradingState::Closed,
            (Some(_), false) => GradingState::Open,
            (Some(_), true) => GradingState::Saving,
        }
    }

    pub fn form(&self) -> Option<&GradingForm> {
        self.form.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.state() == GradingState::Open
    }

    /// Open the form for `submission`, replacing whatever was open before.
    pub fn open(&mut self, submission: &HomeworkSubmission) -> &GradingForm {
        if let Some(previous) = &self.form {
            log::debug!(
                "closing grading of {} to open {}",
                previous.submission_id,
                submission.id
            );
        }

        let score = submission
            .committed_score()
            .filter(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
            .unwrap_or(DEFAULT_SCORE);
        let comment = submission.committed_comment().unwrap_or_default();

        self.saving = false;
        self.form.insert(GradingForm {
            submission_id: submission.id,
            score_input: score.to_string(),
            comment: comment.to_string(),
            error: None,
        })
    }

    /// Cancel from any state.
    pub fn close(&mut self) {
        self.form = None;
        self.saving = false;
    }

    /// Validate the inputs and move to `Saving`. On validation failure the
    /// session stays open with the error and the typed inputs.
    pub fn begin_save(&mut self, score_input: &str, comment: &str) -> Result<(i64, GradeRequest)> {
        let form = match self.form.as_mut() {
            Some(form) if !self.saving => form,
            _ => return Err(Error::validation("No homework is open for grading")),
        };
        form.score_input = score_input.to_string();
        form.comment = comment.to_string();

        let score = match validate(score_input) {
            Ok(score) => score,
            Err(e) => {
                form.error = Some(e.user_message());
                return Err(e);
            }
        };
        form.error = None;

        let request = GradeRequest {
            score,
            teacher_comment: comment.trim().to_string(),
        };
        let id = form.submission_id;
        self.saving = true;
        Ok((id, request))
    }

    /// Settle a save started by `begin_save`. A form opened meanwhile is left
    /// untouched.
    pub fn finish_save<T>(&mut self, result: Result<T>) -> Result<T> {
        if !std::mem::take(&mut self.saving) {
            return Err(Error::validation("No grade is being saved"));
        }
        match result {
            Ok(value) => {
                self.form = None;
                Ok(value)
            }
            Err(e) => {
                if let Some(form) = self.form.as_mut() {
                    log::warn!("saving grade for {} failed: {e}", form.submission_id);
                    form.error = Some(e.user_message());
                }
                Err(e)
            }
        }
    }

    /// Persist the grade. `Ok` means the session closed and the homework list
    /// should be refreshed.
    pub async fn save<C: RequestApi>(
        &mut self,
        client: &C,
        score_input: &str,
        comment: &str,
    ) -> Result<GradeRequest> {
        let (id, request) = self.begin_save(score_input, comment)?;
        let result = client.grade_homework(id, &request).await;
        self.finish_save(result).map(|_| request)
    }
}
