#![allow(async_fn_in_trait)] // the traits are consumed on one thread, Send bounds are not needed

use crate::config::ClientConfig;
use crate::error::Result;
use crate::model::dtos::{
    CourseDraft, GradeRequest, HomeworkDraft, HomeworkQuery, LoginParams, RegisterParams,
    ThemeDraft, UploadFile,
};
use crate::model::structs::{
    Course, CourseProgress, FileInfo, HomeworkSubmission, Student, Theme, UserProfile,
};
use serde_json::Value;

/// Common trait for HTTP client construction
pub trait HttpClient {
    /// Create a new HTTP client instance bound to a deployment
    async fn new(config: ClientConfig) -> Result<Self>
    where
        Self: Sized;
}

/// Every call of the platform API used by the dashboards.
///
/// Session state lives in cookies handled by the implementation; no token is
/// passed explicitly. Non-2xx responses surface as `ErrorKind::HttpError`.
pub trait RequestApi {
    /// `GET /auth/me`
    async fn me(&self) -> Result<UserProfile>;

    /// `POST /auth/login`
    async fn login(&self, params: &LoginParams) -> Result<Value>;

    /// `POST /auth/register`
    async fn register(&self, params: &RegisterParams) -> Result<Value>;

    /// `POST /auth/logout`
    async fn logout(&self) -> Result<()>;

    /// `GET /courses/my`
    async fn my_courses(&self) -> Result<Vec<Course>>;

    /// `GET /courses/all`
    async fn all_courses(&self) -> Result<Vec<Course>>;

    /// `GET /courses/{id}`
    async fn course(&self, course_id: i64) -> Result<Course>;

    /// `POST /courses`
    async fn create_course(&self, draft: &CourseDraft) -> Result<Course>;

    /// `PATCH /courses/{id}`
    async fn update_course(&self, course_id: i64, draft: &CourseDraft) -> Result<Course>;

    /// `DELETE /courses/{id}`
    async fn delete_course(&self, course_id: i64) -> Result<()>;

    /// `GET /courses/{id}/students`
    async fn course_students(&self, course_id: i64) -> Result<Vec<Student>>;

    /// `POST /courses/{id}/enroll`
    async fn enroll(&self, course_id: i64) -> Result<()>;

    /// `GET /courses/{id}/progress`
    async fn course_progress(&self, course_id: i64) -> Result<CourseProgress>;

    /// `GET /themes/{courseId}`
    async fn course_themes(&self, course_id: i64) -> Result<Vec<Theme>>;

    /// `POST /themes/{courseId}`
    async fn create_theme(&self, course_id: i64, draft: &ThemeDraft) -> Result<Theme>;

    /// `PATCH /themes/theme/{id}`
    async fn update_theme(&self, theme_id: i64, draft: &ThemeDraft) -> Result<Theme>;

    /// `DELETE /themes/theme/{id}`
    async fn delete_theme(&self, theme_id: i64) -> Result<()>;

    /// `POST /themes/{id}/mark-completed`
    async fn mark_theme_completed(&self, theme_id: i64) -> Result<()>;

    /// `GET /homeworks?...`
    async fn homeworks(&self, query: &HomeworkQuery) -> Result<Vec<HomeworkSubmission>>;

    /// `GET /homeworks/my?theme_id=`
    async fn my_homeworks(&self, theme_id: i64) -> Result<Vec<HomeworkSubmission>>;

    /// `POST /homeworks`
    async fn submit_homework(&self, draft: &HomeworkDraft) -> Result<Value>;

    /// `PUT /homeworks/{id}/grade`
    async fn grade_homework(&self, homework_id: i64, grade: &GradeRequest) -> Result<Value>;

    /// `POST /files/theme/{id}/uploadfiles`, multipart field `files`
    async fn upload_theme_files(&self, theme_id: i64, files: &[UploadFile])
        -> Result<Vec<FileInfo>>;

    /// `GET /files/theme/{id}/getfiles`
    async fn theme_files(&self, theme_id: i64) -> Result<Vec<FileInfo>>;

    /// `DELETE /files/{id}`
    async fn delete_file(&self, file_id: i64) -> Result<()>;
}
