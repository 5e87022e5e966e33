use serde::{Deserialize, Serialize};

// Entities as returned by the platform API. Every optional field is
// `#[serde(default)]` because endpoints disagree on payload shape.

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "fullname", alias = "fio")]
    pub full_name: Option<String>,
    #[serde(default, alias = "isTeacher")]
    pub is_teacher: bool,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ if !self.email.is_empty() => &self.email,
            _ => "User",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CourseOwner {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, alias = "fullname")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Course {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_enrolled: Option<bool>,
    #[serde(default)]
    pub themes_count: Option<u32>,
    #[serde(default)]
    pub owner: Option<CourseOwner>,
}

impl Course {
    pub fn title(&self) -> String {
        if self.name.is_empty() {
            format!("Course #{}", self.id)
        } else {
            self.name.clone()
        }
    }

    /// Case-insensitive match on name or description.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&term))
                .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Theme {
    pub id: i64,
    pub course_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_homework: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Student {
    pub id: i64,
    #[serde(default, alias = "fullname")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: String,
}

impl Student {
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "No name",
        }
    }

    /// Up to two upper-cased initials of the full name (or email).
    pub fn initials(&self) -> String {
        let source = self.full_name.as_deref().unwrap_or(&self.email);
        source
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    Pending,
    Graded,
}

impl HomeworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HomeworkStatus::Pending => "pending",
            HomeworkStatus::Graded => "graded",
        }
    }
}

impl std::str::FromStr for HomeworkStatus {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s {
            "pending" => Ok(HomeworkStatus::Pending),
            "graded" => Ok(HomeworkStatus::Graded),
            other => Err(crate::error::Error::validation(format!(
                "Unknown homework status: {other}"
            ))),
        }
    }
}

/// Grade record some endpoints nest under `submission`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct GradeRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub teacher_comment: Option<String>,
    #[serde(default)]
    pub status: Option<HomeworkStatus>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct HomeworkSubmission {
    pub id: i64,
    #[serde(default)]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub theme_id: Option<i64>,
    #[serde(default)]
    pub course_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub status: Option<HomeworkStatus>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub teacher_comment: Option<String>,
    #[serde(default, alias = "student_fullname")]
    pub student_name: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub theme_name: Option<String>,
    #[serde(default)]
    pub submission: Option<GradeRecord>,
    #[serde(default)]
    pub files: Vec<FileInfo>,
    #[serde(default)]
    pub created: Option<String>,
}

impl HomeworkSubmission {
    /// Top-level score, else the nested submission's score.
    pub fn committed_score(&self) -> Option<i64> {
        self.score
            .or_else(|| self.submission.as_ref().and_then(|s| s.score))
    }

    pub fn committed_comment(&self) -> Option<&str> {
        self.teacher_comment
            .as_deref()
            .or_else(|| self.submission.as_ref()?.teacher_comment.as_deref())
    }

    /// Graded exactly when a score has been committed, whatever the payload's
    /// `status` field claims.
    pub fn effective_status(&self) -> HomeworkStatus {
        match self.committed_score() {
            Some(_) => HomeworkStatus::Graded,
            None => HomeworkStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ThemeProgress {
    pub theme_id: i64,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct CourseProgress {
    #[serde(default)]
    pub completed_count: u32,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub themes_progress: Vec<ThemeProgress>,
}

impl CourseProgress {
    pub fn is_completed(&self, theme_id: i64) -> bool {
        self.themes_progress
            .iter()
            .any(|tp| tp.theme_id == theme_id && tp.is_completed)
    }

    /// Percentage clamped to 0..=100 for progress bars.
    pub fn bar_width(&self) -> f64 {
        self.progress_percentage.clamp(0.0, 100.0)
    }

    pub fn label(&self) -> String {
        format!(
            "Progress: {}/{} ({}%)",
            self.completed_count,
            self.total_count,
            self.progress_percentage.round()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct FileInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub theme_id: Option<i64>,
    #[serde(default)]
    pub homework_id: Option<i64>,
}

impl FileInfo {
    /// Explicit filename, else the last segment of the url or stored path.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.filename.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let path = self
            .url
            .as_deref()
            .or(self.file_path.as_deref())
            .unwrap_or("");
        match path.rsplit('/').next() {
            Some(last) if !last.is_empty() => last.to_string(),
            _ => path.to_string(),
        }
    }
}
