//! Teacher dashboard: course and theme management, the filtered homework
//! table and grading.

use futures::future::join_all;

use crate::app::auth::{boot_profile, Boot, Landing};
use crate::app::grading::{GradingForm, GradingSession};
use crate::app::homework_query::{HomeworkFilterQuery, RefreshOutcome};
use crate::app::selection::SelectionStore;
use crate::app::uploads::partition_uploads;
use crate::app::Notice;
use crate::config::{ClientConfig, MAX_UPLOAD_BYTES};
use crate::error::{Error, Result};
use crate::interface::RequestApi;
use crate::model::dtos::{CourseDraft, GradeRequest, ThemeDraft, UploadFile};
use crate::model::structs::{Course, FileInfo, HomeworkStatus, Theme, UserProfile};

pub const TEACHERS_ONLY: &str = "This dashboard is only available to teachers.";

/// Messages of the individual dashboard panels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeacherNotices {
    pub global: Option<Notice>,
    pub students: Option<Notice>,
    pub themes: Option<Notice>,
    pub course_form: Option<Notice>,
    pub theme_form: Option<Notice>,
}

pub struct TeacherDashboard<C> {
    client: C,
    profile: Option<UserProfile>,
    upload_limit: u64,
    pub store: SelectionStore,
    pub homeworks: HomeworkFilterQuery,
    pub grading: GradingSession,
    // Course / theme shown in the edit forms.
    editing_course: Option<i64>,
    editing_theme: Option<i64>,
    pub notices: TeacherNotices,
}

impl<C: RequestApi> TeacherDashboard<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            profile: None,
            upload_limit: MAX_UPLOAD_BYTES,
            store: SelectionStore::new(),
            homeworks: HomeworkFilterQuery::new(),
            grading: GradingSession::new(),
            editing_course: None,
            editing_theme: None,
            notices: TeacherNotices::default(),
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

    pub fn editing_course(&self) -> Option<i64> {
        self.editing_course
    }

    pub fn editing_theme(&self) -> Option<i64> {
        self.editing_theme
    }

    /// Resolve the profile, then load courses, rosters and the homework table.
    pub async fn boot(&mut self) -> Boot {
        self.notices.global = Some(Notice::info("Loading profile..."));
        let boot = match boot_profile(&self.client).await {
            Boot::Ready(profile) if !profile.is_teacher => Boot::Denied(TEACHERS_ONLY.to_string()),
            other => other,
        };

        match &boot {
            Boot::Ready(profile) => {
                self.profile = Some(profile.clone());
                self.notices.global = None;
                self.load_courses().await;
                self.load_students().await;
                self.refresh_homeworks().await;
            }
            Boot::Denied(msg) | Boot::Failed(msg) => {
                self.notices.global = Some(Notice::error(msg.clone()));
            }
            Boot::RedirectToLogin { reason, .. } => {
                self.notices.global = Some(Notice::error(reason.clone()));
            }
        }
        boot
    }

    pub async fn load_courses(&mut self) -> &[Course] {
        match self.client.my_courses().await {
            Ok(courses) => {
                self.notices.themes = None;
                self.store.set_courses(courses);
            }
            Err(e) => {
                log::warn!("loading courses failed: {e}");
                self.notices.themes = Some(Notice::error(format!(
                    "Failed to load courses: {}",
                    e.user_message()
                )));
            }
        }
        self.store.courses()
    }

    /// Fetch every course roster concurrently. A failing course is skipped.
    pub async fn load_students(&mut self) {
        self.notices.students = Some(Notice::info("Loading students..."));
        let ids: Vec<i64> = self.store.courses().iter().map(|c| c.id).collect();
        if ids.is_empty() {
            self.notices.students = Some(Notice::info("You have no courses yet."));
            return;
        }

        let results = join_all(ids.iter().map(|&id| self.client.course_students(id))).await;
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(students) => self.store.cache_students(id, students),
                Err(e) => self.store.students_failed(id, &e),
            }
        }

        self.notices.students = if let Some(notice) = self.warning_notice() {
            Some(notice)
        } else if self.store.visible_students().is_empty() {
            Some(Notice::info("No students on your courses yet."))
        } else {
            None
        };
    }

    pub async fn load_themes(&mut self, course_id: i64) {
        self.notices.themes = Some(Notice::info("Loading themes..."));
        match self.client.course_themes(course_id).await {
            Ok(themes) => {
                self.store.cache_themes(course_id, themes);
                self.notices.themes = None;
            }
            Err(e) => {
                self.store.themes_failed(course_id, &e);
                self.notices.themes = Some(Notice::error(format!(
                    "Failed to load themes: {}",
                    e.user_message()
                )));
            }
        }
    }

    /// Change the course filter, fetching its themes and roster when not
    /// cached yet. Returns the refresh outcome when the table was reloaded.
    pub async fn select_course(&mut self, course_id: Option<i64>) -> Result<Option<RefreshOutcome>> {
        let switch = self.store.set_course(course_id)?;
        self.editing_course = course_id;
        self.editing_theme = None;
        self.notices.course_form = None;
        self.notices.theme_form = None;

        if let Some(id) = course_id {
            let themes = async {
                if switch.fetch_themes {
                    Some(self.client.course_themes(id).await)
                } else {
                    None
                }
            };
            let students = async {
                if switch.fetch_students {
                    Some(self.client.course_students(id).await)
                } else {
                    None
                }
            };
            let (themes, students) = futures::join!(themes, students);

            match themes {
                Some(Ok(themes)) => self.store.cache_themes(id, themes),
                Some(Err(e)) => {
                    self.store.themes_failed(id, &e);
                    self.notices.themes = Some(Notice::from_error(&e));
                }
                None => {}
            }
            match students {
                Some(Ok(students)) => self.store.cache_students(id, students),
                Some(Err(e)) => self.store.students_failed(id, &e),
                None => {}
            }
            if let Some(notice) = self.warning_notice() {
                self.notices.global = Some(notice);
            }
        }

        Ok(self.refresh_if_pending().await)
    }

    pub async fn select_theme(&mut self, theme_id: Option<i64>) -> Result<Option<RefreshOutcome>> {
        self.store.set_theme(theme_id)?;
        self.editing_theme = theme_id;
        self.notices.theme_form = None;
        Ok(self.refresh_if_pending().await)
    }

    pub async fn set_student_filter(&mut self, student_id: Option<i64>) -> Result<Option<RefreshOutcome>> {
        self.store.set_student_filter(student_id)?;
        Ok(self.refresh_if_pending().await)
    }

    pub async fn set_status_filter(&mut self, status: Option<HomeworkStatus>) -> Option<RefreshOutcome> {
        self.store.set_status_filter(status);
        self.refresh_if_pending().await
    }

    pub async fn refresh_homeworks(&mut self) -> RefreshOutcome {
        self.store.take_refresh();
        self.homeworks.refresh(&self.client, &self.store).await
    }

    /// Drain the store's fetch warnings into one error notice.
    fn warning_notice(&mut self) -> Option<Notice> {
        let warnings = self.store.take_warnings();
        (!warnings.is_empty()).then(|| Notice::error(warnings.join(" ")))
    }

    async fn refresh_if_pending(&mut self) -> Option<RefreshOutcome> {
        if self.store.take_refresh() {
            Some(self.homeworks.refresh(&self.client, &self.store).await)
        } else {
            None
        }
    }

    pub fn open_grading(&mut self, homework_id: i64) -> Result<&GradingForm> {
        let submission = self
            .homeworks
            .select_row(homework_id)
            .cloned()
            .ok_or_else(|| Error::validation(format!("Homework #{homework_id} is not in the table")))?;
        Ok(self.grading.open(&submission))
    }

    /// Save the open grade; on success the homework table is reloaded.
    pub async fn save_grade(&mut self, score_input: &str, comment: &str) -> Result<GradeRequest> {
        let request = self.grading.save(&self.client, score_input, comment).await?;
        self.refresh_homeworks().await;
        Ok(request)
    }

    pub fn cancel_grading(&mut self) {
        self.grading.close();
    }

    /// Switch the course form to creating a new course.
    pub fn begin_new_course(&mut self) {
        self.editing_course = None;
        self.editing_theme = None;
        self.notices.theme_form = None;
        self.notices.course_form = Some(Notice::info(
            "Creating a new course. Fill in the fields and press Save course.",
        ));
    }

    /// Create a course, or update the one being edited.
    pub async fn save_course(&mut self, name: &str, description: &str) -> Result<Course> {
        let draft = CourseDraft {
            name: name.trim().to_string(),
            description: description.trim().to_string(),
        };
        if draft.name.is_empty() {
            return Err(self.course_form_error(Error::validation("Enter the course name.")));
        }

        let (result, done) = match self.editing_course {
            Some(id) => (self.client.update_course(id, &draft).await, "Course updated."),
            None => (self.client.create_course(&draft).await, "Course created."),
        };
        let saved = result.map_err(|e| self.course_form_error(e))?;
        log::debug!("saved course {}", saved.id);

        self.load_courses().await;
        if self.store.course(saved.id).is_some() {
            self.select_course(Some(saved.id)).await?;
        }
        self.notices.course_form = Some(Notice::success(done));
        Ok(saved)
    }

    pub async fn delete_course(&mut self) -> Result<()> {
        let Some(id) = self.editing_course else {
            return Err(self.course_form_error(Error::validation("No course selected.")));
        };
        self.client
            .delete_course(id)
            .await
            .map_err(|e| self.course_form_error(e))?;

        self.store.forget_course(id);
        self.editing_course = None;
        self.editing_theme = None;
        self.notices.theme_form = None;
        self.notices.course_form = Some(Notice::success("Course deleted."));

        self.load_courses().await;
        self.refresh_homeworks().await;
        self.load_students().await;
        Ok(())
    }

    pub fn edit_theme(&mut self, theme_id: i64) -> Result<&Theme> {
        let theme = self
            .store
            .theme(theme_id)
            .ok_or_else(|| Error::validation(format!("Unknown theme #{theme_id}")))?;
        self.editing_theme = Some(theme_id);
        self.notices.theme_form = None;
        Ok(theme)
    }

    pub fn clear_theme_form(&mut self) {
        self.editing_theme = None;
        self.notices.theme_form = None;
    }

    /// Create or update a theme of the edited course and attach `files` to it.
    pub async fn save_theme(
        &mut self,
        name: &str,
        text: &str,
        is_homework: bool,
        files: Vec<UploadFile>,
    ) -> Result<Theme> {
        let Some(course_id) = self.editing_course else {
            return Err(self.theme_form_error(Error::validation("Select a course first.")));
        };
        let draft = ThemeDraft {
            name: name.trim().to_string(),
            text: text.trim().to_string(),
            is_homework,
        };
        if draft.name.is_empty() {
            return Err(self.theme_form_error(Error::validation("Enter the theme name.")));
        }

        let (result, done) = match self.editing_theme {
            Some(id) => (self.client.update_theme(id, &draft).await, "Theme updated."),
            None => (self.client.create_theme(course_id, &draft).await, "Theme created."),
        };
        let saved = result.map_err(|e| self.theme_form_error(e))?;

        let mut lines = vec![done.to_string()];
        if !files.is_empty() {
            let batch = partition_uploads(files, self.upload_limit);
            lines.extend(batch.messages(self.upload_limit));
            if !batch.accepted.is_empty() {
                match self.client.upload_theme_files(saved.id, &batch.accepted).await {
                    Ok(uploaded) => lines.push(format!("Files uploaded: {}.", uploaded.len())),
                    Err(e) => {
                        log::warn!("uploading files of theme {} failed: {e}", saved.id);
                        lines.push(format!("Failed to upload files: {}", e.user_message()));
                    }
                }
            }
        }

        self.load_themes(course_id).await;
        self.refresh_homeworks().await;
        self.editing_theme = Some(saved.id);
        self.notices.theme_form = Some(Notice::success(lines.join(" ")));
        Ok(saved)
    }

    pub async fn delete_theme(&mut self) -> Result<()> {
        let Some(theme_id) = self.editing_theme else {
            return Err(self.theme_form_error(Error::validation("No theme selected.")));
        };
        self.client
            .delete_theme(theme_id)
            .await
            .map_err(|e| self.theme_form_error(e))?;

        self.editing_theme = None;
        self.notices.theme_form = Some(Notice::success("Theme deleted."));
        if let Some(course_id) = self.editing_course {
            self.load_themes(course_id).await;
        }
        self.refresh_homeworks().await;
        Ok(())
    }

    pub async fn theme_files(&self, theme_id: i64) -> Result<Vec<FileInfo>> {
        self.client.theme_files(theme_id).await
    }

    pub async fn delete_theme_file(&mut self, file_id: i64) -> Result<()> {
        self.client
            .delete_file(file_id)
            .await
            .map_err(|e| self.theme_form_error(e))
    }

    /// Errors are ignored; the user leaves either way.
    pub async fn logout(&self) -> Landing {
        if let Err(e) = self.client.logout().await {
            log::debug!("logout failed: {e}");
        }
        Landing::Login
    }

    fn course_form_error(&mut self, e: Error) -> Error {
        self.notices.course_form = Some(Notice::from_error(&e));
        e
    }

    fn theme_form_error(&mut self, e: Error) -> Error {
        self.notices.theme_form = Some(Notice::from_error(&e));
        e
    }
}
