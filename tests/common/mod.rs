#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use edu_dashboard_core::error::{Error, Result};
use edu_dashboard_core::interface::RequestApi;
use edu_dashboard_core::model::dtos::{
    CourseDraft, GradeRequest, HomeworkDraft, HomeworkQuery, LoginParams, RegisterParams,
    ThemeDraft, UploadFile,
};
use edu_dashboard_core::model::structs::{
    Course, CourseProgress, FileInfo, HomeworkSubmission, Student, Theme, UserProfile,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// In-memory platform API. Every call is recorded by name; responses come from
/// the public fields, which tests fill before driving a dashboard.
#[derive(Default)]
pub struct FakeApi {
    pub calls: RefCell<Vec<String>>,
    pub profile: RefCell<Option<UserProfile>>,
    /// Status and detail returned by `/auth/me` instead of the profile.
    pub me_error: RefCell<Option<(u16, Option<String>)>>,
    pub courses: RefCell<Vec<Course>>,
    pub themes: RefCell<HashMap<i64, Vec<Theme>>>,
    pub students: RefCell<HashMap<i64, Vec<Student>>>,
    pub failing_rosters: RefCell<HashSet<i64>>,
    pub progress: RefCell<HashMap<i64, CourseProgress>>,
    pub homeworks: RefCell<Vec<HomeworkSubmission>>,
    pub homework_queries: RefCell<Vec<HomeworkQuery>>,
    /// Held `/homeworks` responses keyed by the queried course.
    pub gates: RefCell<HashMap<Option<i64>, oneshot::Receiver<Vec<HomeworkSubmission>>>>,
    pub grades: RefCell<Vec<(i64, GradeRequest)>>,
    pub grade_error: RefCell<Option<(u16, Option<String>)>>,
    pub uploads: RefCell<Vec<(i64, Vec<String>)>>,
    pub submitted: RefCell<Vec<HomeworkDraft>>,
    pub completed: RefCell<Vec<i64>>,
    pub own_homeworks: RefCell<HashMap<i64, Vec<HomeworkSubmission>>>,
    pub theme_files: RefCell<HashMap<i64, Vec<FileInfo>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn teacher() -> Self {
        let api = Self::new();
        *api.profile.borrow_mut() = Some(UserProfile {
            id: Some(1),
            email: "teacher@school.test".into(),
            full_name: Some("Irina Petrova".into()),
            is_teacher: true,
        });
        api
    }

    pub fn student() -> Self {
        let api = Self::new();
        *api.profile.borrow_mut() = Some(UserProfile {
            id: Some(100),
            email: "ann@school.test".into(),
            full_name: Some("Ann Lee".into()),
            is_teacher: false,
        });
        api
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    pub fn calls_named(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == name).count()
    }

    pub fn hold_homeworks(&self, course_id: Option<i64>) -> oneshot::Sender<Vec<HomeworkSubmission>> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(course_id, rx);
        tx
    }

    pub fn last_query(&self) -> Option<HomeworkQuery> {
        self.homework_queries.borrow().last().cloned()
    }
}

pub fn course(id: i64, name: &str) -> Course {
    Course {
        id,
        name: name.to_string(),
        description: None,
        is_enrolled: None,
        themes_count: None,
        owner: None,
    }
}

pub fn theme(id: i64, course_id: i64, name: &str, is_homework: bool) -> Theme {
    Theme {
        id,
        course_id,
        name: name.to_string(),
        text: String::new(),
        is_homework,
    }
}

pub fn student(id: i64, name: &str) -> Student {
    Student {
        id,
        full_name: Some(name.to_string()),
        email: format!("{id}@school.test"),
    }
}

pub fn homework(id: i64, course_id: i64, student_id: i64) -> HomeworkSubmission {
    HomeworkSubmission {
        id,
        course_id: Some(course_id),
        student_id: Some(student_id),
        title: format!("Homework {id}"),
        ..Default::default()
    }
}

fn not_found(detail: &str) -> Error {
    Error::http(404, Some(detail.to_string()))
}

impl RequestApi for FakeApi {
    async fn me(&self) -> Result<UserProfile> {
        self.record("me");
        if let Some((status, detail)) = self.me_error.borrow().clone() {
            return Err(Error::http(status, detail));
        }
        self.profile
            .borrow()
            .clone()
            .ok_or_else(|| Error::http(401, Some("Not authenticated".into())))
    }

    async fn login(&self, params: &LoginParams) -> Result<Value> {
        self.record("login");
        Ok(json!({"message": "ok", "email": params.email}))
    }

    async fn register(&self, _params: &RegisterParams) -> Result<Value> {
        self.record("register");
        Ok(json!({"message": "registered"}))
    }

    async fn logout(&self) -> Result<()> {
        self.record("logout");
        Err(Error::http(500, None))
    }

    async fn my_courses(&self) -> Result<Vec<Course>> {
        self.record("my_courses");
        Ok(self.courses.borrow().clone())
    }

    async fn all_courses(&self) -> Result<Vec<Course>> {
        self.record("all_courses");
        Ok(self.courses.borrow().clone())
    }

    async fn course(&self, course_id: i64) -> Result<Course> {
        self.record("course");
        self.courses
            .borrow()
            .iter()
            .find(|c| c.id == course_id)
            .cloned()
            .ok_or_else(|| not_found("Course not found"))
    }

    async fn create_course(&self, draft: &CourseDraft) -> Result<Course> {
        self.record("create_course");
        let mut courses = self.courses.borrow_mut();
        let id = courses.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let created = Course {
            description: Some(draft.description.clone()),
            ..course(id, &draft.name)
        };
        courses.push(created.clone());
        Ok(created)
    }

    async fn update_course(&self, course_id: i64, draft: &CourseDraft) -> Result<Course> {
        self.record("update_course");
        let mut courses = self.courses.borrow_mut();
        let found = courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .ok_or_else(|| not_found("Course not found"))?;
        found.name = draft.name.clone();
        found.description = Some(draft.description.clone());
        Ok(found.clone())
    }

    async fn delete_course(&self, course_id: i64) -> Result<()> {
        self.record("delete_course");
        self.courses.borrow_mut().retain(|c| c.id != course_id);
        self.themes.borrow_mut().remove(&course_id);
        self.students.borrow_mut().remove(&course_id);
        Ok(())
    }

    async fn course_students(&self, course_id: i64) -> Result<Vec<Student>> {
        self.record("course_students");
        if self.failing_rosters.borrow().contains(&course_id) {
            return Err(Error::http(500, None));
        }
        Ok(self.students.borrow().get(&course_id).cloned().unwrap_or_default())
    }

    async fn enroll(&self, course_id: i64) -> Result<()> {
        self.record("enroll");
        let mut courses = self.courses.borrow_mut();
        let found = courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .ok_or_else(|| not_found("Course not found"))?;
        found.is_enrolled = Some(true);
        Ok(())
    }

    async fn course_progress(&self, course_id: i64) -> Result<CourseProgress> {
        self.record("course_progress");
        self.progress
            .borrow()
            .get(&course_id)
            .cloned()
            .ok_or_else(|| not_found("Progress not found"))
    }

    async fn course_themes(&self, course_id: i64) -> Result<Vec<Theme>> {
        self.record("course_themes");
        Ok(self.themes.borrow().get(&course_id).cloned().unwrap_or_default())
    }

    async fn create_theme(&self, course_id: i64, draft: &ThemeDraft) -> Result<Theme> {
        self.record("create_theme");
        let mut themes = self.themes.borrow_mut();
        let id = themes.values().flatten().map(|t| t.id).max().unwrap_or(0) + 1;
        let created = Theme {
            text: draft.text.clone(),
            ..theme(id, course_id, &draft.name, draft.is_homework)
        };
        themes.entry(course_id).or_default().push(created.clone());
        Ok(created)
    }

    async fn update_theme(&self, theme_id: i64, draft: &ThemeDraft) -> Result<Theme> {
        self.record("update_theme");
        let mut themes = self.themes.borrow_mut();
        let found = themes
            .values_mut()
            .flatten()
            .find(|t| t.id == theme_id)
            .ok_or_else(|| not_found("Theme not found"))?;
        found.name = draft.name.clone();
        found.text = draft.text.clone();
        found.is_homework = draft.is_homework;
        Ok(found.clone())
    }

    async fn delete_theme(&self, theme_id: i64) -> Result<()> {
        self.record("delete_theme");
        for themes in self.themes.borrow_mut().values_mut() {
            themes.retain(|t| t.id != theme_id);
        }
        Ok(())
    }

    async fn mark_theme_completed(&self, theme_id: i64) -> Result<()> {
        self.record("mark_theme_completed");
        self.completed.borrow_mut().push(theme_id);
        Ok(())
    }

    async fn homeworks(&self, query: &HomeworkQuery) -> Result<Vec<HomeworkSubmission>> {
        self.record("homeworks");
        self.homework_queries.borrow_mut().push(query.clone());

        let gate = self.gates.borrow_mut().remove(&query.course_id);
        if let Some(rx) = gate {
            return rx.await.map_err(|_| Error::http(503, None));
        }

        Ok(self
            .homeworks
            .borrow()
            .iter()
            .filter(|hw| query.course_id.map_or(true, |id| hw.course_id == Some(id)))
            .filter(|hw| query.theme_id.map_or(true, |id| hw.theme_id == Some(id)))
            .filter(|hw| query.student_id.map_or(true, |id| hw.student_id == Some(id)))
            .filter(|hw| query.status.map_or(true, |s| hw.effective_status() == s))
            .cloned()
            .collect())
    }

    async fn my_homeworks(&self, theme_id: i64) -> Result<Vec<HomeworkSubmission>> {
        self.record("my_homeworks");
        Ok(self.own_homeworks.borrow().get(&theme_id).cloned().unwrap_or_default())
    }

    async fn submit_homework(&self, draft: &HomeworkDraft) -> Result<Value> {
        self.record("submit_homework");
        self.submitted.borrow_mut().push(draft.clone());
        Ok(json!({"id": 900, "status": "pending"}))
    }

    async fn grade_homework(&self, homework_id: i64, grade: &GradeRequest) -> Result<Value> {
        self.record("grade_homework");
        if let Some((status, detail)) = self.grade_error.borrow().clone() {
            return Err(Error::http(status, detail));
        }
        self.grades.borrow_mut().push((homework_id, grade.clone()));
        for hw in self.homeworks.borrow_mut().iter_mut() {
            if hw.id == homework_id {
                hw.score = Some(i64::from(grade.score));
                hw.teacher_comment = Some(grade.teacher_comment.clone());
            }
        }
        Ok(json!({"id": homework_id, "status": "graded"}))
    }

    async fn upload_theme_files(
        &self,
        theme_id: i64,
        files: &[UploadFile],
    ) -> Result<Vec<FileInfo>> {
        self.record("upload_theme_files");
        let names: Vec<String> = files.iter().map(|f| f.file_name.clone()).collect();
        self.uploads.borrow_mut().push((theme_id, names.clone()));
        Ok(names
            .into_iter()
            .enumerate()
            .map(|(i, name)| FileInfo {
                id: Some(i as i64 + 1),
                url: Some(format!("/uploads/themes/{theme_id}/{name}")),
                filename: Some(name),
                theme_id: Some(theme_id),
                ..Default::default()
            })
            .collect())
    }

    async fn theme_files(&self, theme_id: i64) -> Result<Vec<FileInfo>> {
        self.record("theme_files");
        Ok(self.theme_files.borrow().get(&theme_id).cloned().unwrap_or_default())
    }

    async fn delete_file(&self, _file_id: i64) -> Result<()> {
        self.record("delete_file");
        Ok(())
    }
}
