//! Student dashboard: course catalogue, enrolment, progress and homework
//! submission.

use futures::future::join_all;

use crate::app::auth::{boot_profile, Boot, Landing};
use crate::app::uploads::partition_uploads;
use crate::app::Notice;
use crate::config::{ClientConfig, MAX_UPLOAD_BYTES};
use crate::error::{Error, Result};
use crate::interface::RequestApi;
use crate::model::dtos::{HomeworkDraft, UploadFile};
use crate::model::structs::{
    Course, CourseProgress, FileInfo, HomeworkSubmission, Theme, UserProfile,
};

pub const PROGRESS_NOT_TRACKED: &str = "Progress: not tracked";

/// A course in "My courses" with its completion percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseCard {
    pub course: Course,
    pub progress_percentage: f64,
}

impl CourseCard {
    pub fn progress_text(&self) -> String {
        format!("Progress: {}%", self.progress_percentage.round())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseView {
    pub course: Course,
    pub themes: Vec<Theme>,
    pub progress: Option<CourseProgress>,
}

impl CourseView {
    pub fn progress_label(&self) -> String {
        self.progress
            .as_ref()
            .map(CourseProgress::label)
            .unwrap_or_else(|| PROGRESS_NOT_TRACKED.to_string())
    }

    /// Only study material is shown as completed.
    pub fn is_completed(&self, theme: &Theme) -> bool {
        !theme.is_homework
            && self
                .progress
                .as_ref()
                .map(|p| p.is_completed(theme.id))
                .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeView {
    pub theme: Theme,
    pub files: Vec<FileInfo>,
    /// The student's latest submission for a homework theme.
    pub existing: Option<HomeworkSubmission>,
}

impl ThemeView {
    /// Committed score and comment, once the teacher has graded the work.
    pub fn feedback(&self) -> Option<(i64, Option<&str>)> {
        let hw = self.existing.as_ref()?;
        hw.committed_score().map(|score| (score, hw.committed_comment()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentNotices {
    pub global: Option<Notice>,
    pub all_courses: Option<Notice>,
    pub my_courses: Option<Notice>,
    pub homework: Option<Notice>,
}

pub struct StudentDashboard<C> {
    client: C,
    profile: Option<UserProfile>,
    upload_limit: u64,
    search: String,
    all_courses: Vec<Course>,
    my_courses: Vec<CourseCard>,
    course: Option<CourseView>,
    theme: Option<ThemeView>,
    attachments: Vec<FileInfo>,
    pub notices: StudentNotices,
}

impl<C: RequestApi> StudentDashboard<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            profile: None,
            upload_limit: MAX_UPLOAD_BYTES,
            search: String::new(),
            all_courses: Vec::new(),
            my_courses: Vec::new(),
            course: None,
            theme: None,
            attachments: Vec::new(),
            notices: StudentNotices::default(),
        }
    }

    /// Dashboard honouring the configured upload limit.
    pub fn from_config(client: C, config: &ClientConfig) -> Self {
        Self::new(client).with_upload_limit(config.upload_limit_bytes)
    }

    pub fn with_upload_limit(mut self, limit: u64) -> Self {
        self.upload_limit = limit;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn all_courses(&self) -> &[Course] {
        &self.all_courses
    }

    pub fn my_courses(&self) -> &[CourseCard] {
        &self.my_courses
    }

    pub fn course(&self) -> Option<&CourseView> {
        self.course.as_ref()
    }

    pub fn theme(&self) -> Option<&ThemeView> {
        self.theme.as_ref()
    }

    pub fn attachments(&self) -> &[FileInfo] {
        &self.attachments
    }

    pub async fn boot(&mut self) -> Boot {
        self.notices.global = Some(Notice::info("Loading profile..."));
        let boot = boot_profile(&self.client).await;
        match &boot {
            Boot::Ready(profile) => {
                self.profile = Some(profile.clone());
                self.notices.global = None;
                self.load_all_courses("").await;
                self.load_my_courses().await;
            }
            Boot::RedirectToLogin { reason: msg, .. } | Boot::Denied(msg) | Boot::Failed(msg) => {
                self.notices.global = Some(Notice::error(msg.clone()));
            }
        }
        boot
    }

    /// Catalogue of all courses, filtered case-insensitively by `search`.
    pub async fn load_all_courses(&mut self, search: &str) -> &[Course] {
        self.search = search.trim().to_string();
        self.notices.all_courses = Some(Notice::info("Loading courses..."));

        match self.client.all_courses().await {
            Ok(courses) => {
                let term = self.search.as_str();
                self.all_courses = courses
                    .into_iter()
                    .filter(|c| term.is_empty() || c.matches(term))
                    .collect();
                self.notices.all_courses = Some(if self.all_courses.is_empty() {
                    Notice::info(if term.is_empty() {
                        "No courses yet."
                    } else {
                        "No courses match your search."
                    })
                } else {
                    Notice::success(format!("Courses found: {}", self.all_courses.len()))
                });
            }
            Err(e) => {
                log::warn!("loading course catalogue failed: {e}");
                self.notices.all_courses = Some(Notice::error(format!(
                    "Failed to load courses: {}",
                    e.user_message()
                )));
            }
        }
        &self.all_courses
    }

    /// Enrolled courses with progress fetched concurrently; a failed progress
    /// request shows as 0 %.
    pub async fn load_my_courses(&mut self) -> &[CourseCard] {
        self.notices.my_courses = Some(Notice::info("Loading your courses..."));

        let courses = match self.client.my_courses().await {
            Ok(courses) => courses,
            Err(e) => {
                log::warn!("loading enrolled courses failed: {e}");
                self.notices.my_courses = Some(Notice::error(format!(
                    "Failed to load your courses: {}",
                    e.user_message()
                )));
                return &self.my_courses;
            }
        };

        let progress = join_all(courses.iter().map(|c| self.client.course_progress(c.id))).await;
        self.my_courses = courses
            .into_iter()
            .zip(progress)
            .map(|(course, progress)| {
                let progress_percentage = match progress {
                    Ok(p) => p.progress_percentage,
                    Err(e) => {
                        log::warn!("progress of course {} unavailable: {e}", course.id);
                        0.0
                    }
                };
                CourseCard {
                    course,
                    progress_percentage,
                }
            })
            .collect();

        self.notices.my_courses = Some(if self.my_courses.is_empty() {
            Notice::info("You are not enrolled in any course yet.")
        } else {
            Notice::success(format!("Your courses: {}", self.my_courses.len()))
        });
        &self.my_courses
    }

    pub async fn enroll(&mut self, course_id: i64) -> Result<()> {
        if let Err(e) = self.client.enroll(course_id).await {
            self.notices.all_courses = Some(Notice::error(format!(
                "Failed to enroll: {}",
                e.user_message()
            )));
            return Err(e);
        }

        let search = self.search.clone();
        self.load_all_courses(&search).await;
        self.load_my_courses().await;
        self.notices.global = Some(Notice::success("You are enrolled in the course!"));
        Ok(())
    }

    pub async fn open_course(&mut self, course_id: i64) -> Result<&CourseView> {
        let course = self.client.course(course_id).await?;
        let themes = self.client.course_themes(course_id).await?;
        let progress = self.load_progress(course_id).await;

        self.theme = None;
        self.attachments.clear();
        self.notices.homework = None;
        Ok(&*self.course.insert(CourseView {
            course,
            themes,
            progress,
        }))
    }

    pub async fn back_to_dashboard(&mut self) {
        self.course = None;
        self.theme = None;
        self.attachments.clear();
        self.load_my_courses().await;
    }

    /// Show a theme of the open course. Study material is marked completed;
    /// homework themes load the previous submission and its feedback.
    pub async fn open_theme(&mut self, theme_id: i64) -> Result<&ThemeView> {
        let view = self
            .course
            .as_ref()
            .ok_or_else(|| Error::validation("Open a course first"))?;
        let course_id = view.course.id;
        let theme = view
            .themes
            .iter()
            .find(|t| t.id == theme_id)
            .cloned()
            .ok_or_else(|| Error::validation(format!("Unknown theme #{theme_id}")))?;

        if !theme.is_homework {
            match self.client.mark_theme_completed(theme_id).await {
                Ok(()) => {
                    let progress = self.load_progress(course_id).await;
                    if let Some(view) = self.course.as_mut() {
                        view.progress = progress;
                    }
                }
                Err(e) => log::warn!("marking theme {theme_id} completed failed: {e}"),
            }
        }

        let files = self.client.theme_files(theme_id).await.unwrap_or_else(|e| {
            log::warn!("loading files of theme {theme_id} failed: {e}");
            Vec::new()
        });

        let existing = if theme.is_homework {
            self.existing_submission(theme_id).await
        } else {
            None
        };
        self.attachments = existing.as_ref().map(|hw| hw.files.clone()).unwrap_or_default();
        self.notices.homework = None;

        Ok(&*self.theme.insert(ThemeView {
            theme,
            files,
            existing,
        }))
    }

    /// Upload attachments for the open theme. Oversized files are skipped with
    /// a message naming them; nothing is sent when no file remains.
    pub async fn upload_homework_files(&mut self, files: Vec<UploadFile>) -> Result<Vec<FileInfo>> {
        let theme_id = match &self.theme {
            Some(view) => view.theme.id,
            None => return Err(self.homework_error(Error::validation("Select a theme first"))),
        };

        let batch = partition_uploads(files, self.upload_limit);
        let rejected = batch.messages(self.upload_limit);
        if batch.accepted.is_empty() {
            if !rejected.is_empty() {
                self.notices.homework = Some(Notice::error(rejected.join(" ")));
            }
            return Ok(Vec::new());
        }

        let uploaded = self.send_attachments(theme_id, &batch.accepted).await?;
        let mut lines = rejected;
        lines.push("Files uploaded.".to_string());
        self.notices.homework = Some(joined_notice(lines));
        Ok(uploaded)
    }

    pub fn remove_attachment(&mut self, index: usize) -> Option<FileInfo> {
        (index < self.attachments.len()).then(|| self.attachments.remove(index))
    }

    /// Upload `files`, then submit the answer with every attachment.
    pub async fn submit_homework(&mut self, answer: &str, files: Vec<UploadFile>) -> Result<()> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(self.homework_error(Error::validation("Enter your answer")));
        }
        let theme = match &self.theme {
            Some(view) => view.theme.clone(),
            None => return Err(self.homework_error(Error::validation("No theme selected"))),
        };

        self.notices.homework = Some(Notice::info("Sending..."));
        let batch = partition_uploads(files, self.upload_limit);
        let mut lines = batch.messages(self.upload_limit);
        if !batch.accepted.is_empty() {
            self.send_attachments(theme.id, &batch.accepted).await?;
        }

        let draft = HomeworkDraft {
            theme_id: theme.id,
            title: if theme.name.is_empty() {
                "Homework".to_string()
            } else {
                theme.name.clone()
            },
            text: answer.to_string(),
            files: self.attachments.clone(),
        };
        if let Err(e) = self.client.submit_homework(&draft).await {
            self.notices.homework = Some(Notice::error(format!(
                "Failed to submit: {}",
                e.user_message()
            )));
            return Err(e);
        }

        self.attachments.clear();
        let existing = self.existing_submission(theme.id).await;
        if let Some(view) = self.theme.as_mut() {
            view.existing = existing;
        }
        lines.push("Homework sent for review!".to_string());
        self.notices.homework = Some(joined_notice(lines));
        Ok(())
    }

    pub async fn logout(&self) -> Landing {
        if let Err(e) = self.client.logout().await {
            log::debug!("logout failed: {e}");
        }
        Landing::Login
    }

    async fn send_attachments(
        &mut self,
        theme_id: i64,
        files: &[UploadFile],
    ) -> Result<Vec<FileInfo>> {
        self.notices.homework = Some(Notice::info("Uploading files..."));
        match self.client.upload_theme_files(theme_id, files).await {
            Ok(uploaded) => {
                self.attachments.extend(uploaded.iter().cloned());
                Ok(uploaded)
            }
            Err(e) => {
                self.notices.homework = Some(Notice::error(format!(
                    "Failed to upload files: {}",
                    e.user_message()
                )));
                Err(e)
            }
        }
    }

    async fn load_progress(&self, course_id: i64) -> Option<CourseProgress> {
        match self.client.course_progress(course_id).await {
            Ok(progress) => Some(progress),
            Err(e) => {
                log::debug!("no progress for course {course_id}: {e}");
                None
            }
        }
    }

    async fn existing_submission(&self, theme_id: i64) -> Option<HomeworkSubmission> {
        match self.client.my_homeworks(theme_id).await {
            Ok(homeworks) => homeworks.into_iter().next(),
            Err(e) => {
                log::warn!("loading own submission for theme {theme_id} failed: {e}");
                None
            }
        }
    }

    fn homework_error(&mut self, e: Error) -> Error {
        self.notices.homework = Some(Notice::from_error(&e));
        e
    }
}

/// Skipped-file lines keep the notice an error even when the rest succeeded.
fn joined_notice(lines: Vec<String>) -> Notice {
    if lines.len() > 1 {
        Notice::error(lines.join(" "))
    } else {
        Notice::success(lines.join(" "))
    }
}
