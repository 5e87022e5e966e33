use serde::{Deserialize, Serialize};

use super::structs::{FileInfo, HomeworkStatus};

/// Fixed page for the teacher's homework list.
pub const HOMEWORK_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Serialize)]
pub struct LoginParams {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterParams {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub is_teacher: bool,
}

/// Body of course create/update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseDraft {
    pub name: String,
    pub description: String,
}

/// Body of theme create/update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeDraft {
    pub name: String,
    pub text: String,
    pub is_homework: bool,
}

/// Body of `POST /homeworks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeworkDraft {
    pub theme_id: i64,
    pub title: String,
    pub text: String,
    pub files: Vec<FileInfo>,
}

/// Body of `PUT /homeworks/{id}/grade`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRequest {
    pub score: u8,
    pub teacher_comment: String,
}

/// Filter parameters of `GET /homeworks`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeworkQuery {
    pub course_id: Option<i64>,
    pub theme_id: Option<i64>,
    pub status: Option<HomeworkStatus>,
    pub student_id: Option<i64>,
    pub skip: u32,
    pub limit: u32,
}

impl Default for HomeworkQuery {
    fn default() -> Self {
        Self {
            course_id: None,
            theme_id: None,
            status: None,
            student_id: None,
            skip: 0,
            limit: HOMEWORK_PAGE_SIZE,
        }
    }
}

impl HomeworkQuery {
    /// Query pairs in wire order; unset filters are left out entirely.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(6);
        if let Some(id) = self.course_id {
            pairs.push(("course_id", id.to_string()));
        }
        if let Some(id) = self.theme_id {
            pairs.push(("theme_id", id.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(id) = self.student_id {
            pairs.push(("student_id", id.to_string()));
        }
        pairs.push(("skip", self.skip.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }

    pub fn to_query_string(&self) -> String {
        self.to_pairs()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_filters_are_omitted() {
        let query = HomeworkQuery {
            course_id: Some(3),
            status: Some(HomeworkStatus::Pending),
            ..Default::default()
        };
        assert_eq!(
            query.to_query_string(),
            "course_id=3&status=pending&skip=0&limit=20"
        );
        assert_eq!(HomeworkQuery::default().to_query_string(), "skip=0&limit=20");
    }

    #[test]
    fn grade_body_shape() {
        let body = GradeRequest {
            score: 7,
            teacher_comment: "Good work".into(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"score":7,"teacher_comment":"Good work"}"#
        );
    }
}
