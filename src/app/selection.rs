//! Course / theme / student filter state of the teacher dashboard.
//!
//! The store owns the per-session caches (courses, themes per course, roster per
//! course) and keeps the selection consistent with them: a selected theme always
//! belongs to the selected course, a selected student is always on its roster.

use std::collections::{BTreeMap, HashSet};

use crate::error::{Error, Result};
use crate::model::structs::{Course, HomeworkStatus, Student, Theme};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub course_id: Option<i64>,
    pub theme_id: Option<i64>,
    pub student_id: Option<i64>,
    pub status: Option<HomeworkStatus>,
}

/// What `set_course` needs the caller to fetch for the new course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseSwitch {
    pub fetch_themes: bool,
    pub fetch_students: bool,
}

#[derive(Debug, Default)]
pub struct SelectionStore {
    selection: Selection,
    courses: Vec<Course>,
    themes: BTreeMap<i64, Vec<Theme>>,
    rosters: BTreeMap<i64, Vec<Student>>,
    // Student filter kept while the selected course's roster is still unknown.
    student_unverified: bool,
    refresh_pending: bool,
    warnings: Vec<String>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn course(&self, course_id: i64) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    /// Look a theme up in every cached course.
    pub fn theme(&self, theme_id: i64) -> Option<&Theme> {
        self.themes.values().flatten().find(|t| t.id == theme_id)
    }

    pub fn student(&self, student_id: i64) -> Option<&Student> {
        self.rosters.values().flatten().find(|s| s.id == student_id)
    }

    pub fn has_themes(&self, course_id: i64) -> bool {
        self.themes.contains_key(&course_id)
    }

    pub fn has_roster(&self, course_id: i64) -> bool {
        self.rosters.contains_key(&course_id)
    }

    /// Replace the course set. Caches of courses that disappeared are dropped and
    /// a selection pointing at a vanished course falls back to "all".
    pub fn set_courses(&mut self, courses: Vec<Course>) {
        let ids: HashSet<i64> = courses.iter().map(|c| c.id).collect();
        self.themes.retain(|id, _| ids.contains(id));
        self.rosters.retain(|id, _| ids.contains(id));
        self.courses = courses;

        if let Some(selected) = self.selection.course_id {
            if !ids.contains(&selected) {
                log::debug!("selected course {selected} no longer exists, resetting selection");
                self.reset();
            }
        }
    }

    pub fn set_course(&mut self, course_id: Option<i64>) -> Result<CourseSwitch> {
        let Some(id) = course_id else {
            self.selection.course_id = None;
            self.student_unverified = false;
            self.refresh_pending = true;
            return Ok(CourseSwitch::default());
        };

        if self.course(id).is_none() {
            return Err(Error::validation(format!("Unknown course #{id}")));
        }

        self.selection.course_id = Some(id);

        if let Some(theme_id) = self.selection.theme_id {
            let belongs = self
                .themes
                .get(&id)
                .map(|themes| themes.iter().any(|t| t.id == theme_id))
                .unwrap_or(false);
            if !belongs {
                self.selection.theme_id = None;
            }
        }

        self.student_unverified = false;
        if let Some(student_id) = self.selection.student_id {
            match self.rosters.get(&id) {
                Some(roster) if !roster.iter().any(|s| s.id == student_id) => {
                    self.selection.student_id = None;
                }
                Some(_) => {}
                None => self.student_unverified = true,
            }
        }

        self.refresh_pending = true;
        Ok(CourseSwitch {
            fetch_themes: !self.has_themes(id),
            fetch_students: !self.has_roster(id),
        })
    }

    pub fn set_theme(&mut self, theme_id: Option<i64>) -> Result<()> {
        if let Some(id) = theme_id {
            if !self.visible_themes().iter().any(|t| t.id == id) {
                return Err(Error::validation(format!(
                    "Theme #{id} is not part of the selected course"
                )));
            }
        }
        self.selection.theme_id = theme_id;
        self.refresh_pending = true;
        Ok(())
    }

    pub fn set_student_filter(&mut self, student_id: Option<i64>) -> Result<()> {
        if let Some(id) = student_id {
            if !self.visible_students().iter().any(|s| s.id == id) {
                return Err(Error::validation(format!(
                    "Student #{id} is not enrolled in the selected course"
                )));
            }
        }
        self.selection.student_id = student_id;
        self.student_unverified = false;
        self.refresh_pending = true;
        Ok(())
    }

    pub fn set_status_filter(&mut self, status: Option<HomeworkStatus>) {
        self.selection.status = status;
        self.refresh_pending = true;
    }

    /// Back to "all" on every filter.
    pub fn reset(&mut self) {
        self.selection = Selection::default();
        self.student_unverified = false;
        self.refresh_pending = true;
    }

    /// Drop a deleted course and its caches.
    pub fn forget_course(&mut self, course_id: i64) {
        self.courses.retain(|c| c.id != course_id);
        self.themes.remove(&course_id);
        self.rosters.remove(&course_id);
        if self.selection.course_id == Some(course_id) {
            self.reset();
        }
    }

    pub fn cache_themes(&mut self, course_id: i64, themes: Vec<Theme>) {
        if self.course(course_id).is_none() {
            log::warn!("ignoring themes of unknown course {course_id}");
            return;
        }
        let themes: Vec<Theme> = themes
            .into_iter()
            .filter(|t| {
                let ok = t.course_id == course_id;
                if !ok {
                    log::warn!("theme {} reports course {}, expected {course_id}", t.id, t.course_id);
                }
                ok
            })
            .collect();

        if self.selection.course_id == Some(course_id) {
            if let Some(theme_id) = self.selection.theme_id {
                if !themes.iter().any(|t| t.id == theme_id) {
                    self.selection.theme_id = None;
                    self.refresh_pending = true;
                }
            }
        }
        self.themes.insert(course_id, themes);
    }

    /// Forget cached themes so the next `set_course` fetches them again.
    pub fn invalidate_themes(&mut self, course_id: i64) {
        self.themes.remove(&course_id);
    }

    pub fn themes_failed(&mut self, course_id: i64, err: &Error) {
        self.warn(format!(
            "Failed to load themes of course #{course_id}: {}",
            err.user_message()
        ));
    }

    pub fn cache_students(&mut self, course_id: i64, students: Vec<Student>) {
        if self.course(course_id).is_none() {
            log::warn!("ignoring roster of unknown course {course_id}");
            return;
        }
        if self.student_unverified && self.selection.course_id == Some(course_id) {
            self.student_unverified = false;
            if let Some(student_id) = self.selection.student_id {
                if !students.iter().any(|s| s.id == student_id) {
                    self.selection.student_id = None;
                    self.refresh_pending = true;
                }
            }
        }
        self.rosters.insert(course_id, students);
    }

    pub fn students_failed(&mut self, course_id: i64, err: &Error) {
        self.warn(format!(
            "Failed to load students of course #{course_id}: {}",
            err.user_message()
        ));
        if self.student_unverified && self.selection.course_id == Some(course_id) {
            self.student_unverified = false;
            if self.selection.student_id.take().is_some() {
                self.refresh_pending = true;
            }
        }
    }

    /// Themes of the selected course, or the id-deduplicated union of all
    /// cached courses when no course is selected.
    pub fn visible_themes(&self) -> Vec<&Theme> {
        match self.selection.course_id {
            Some(id) => self
                .themes
                .get(&id)
                .map(|themes| themes.iter().collect())
                .unwrap_or_default(),
            None => {
                let mut seen = HashSet::new();
                self.themes
                    .values()
                    .flatten()
                    .filter(|t| seen.insert(t.id))
                    .collect()
            }
        }
    }

    /// Same policy as `visible_themes`, deduplicated by student id.
    pub fn visible_students(&self) -> Vec<&Student> {
        match self.selection.course_id {
            Some(id) => self
                .rosters
                .get(&id)
                .map(|roster| roster.iter().collect())
                .unwrap_or_default(),
            None => {
                let mut seen = HashSet::new();
                self.rosters
                    .values()
                    .flatten()
                    .filter(|s| seen.insert(s.id))
                    .collect()
            }
        }
    }

    /// Returns whether a homework refresh was scheduled since the last call.
    pub fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.refresh_pending)
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    fn warn(&mut self, message: String) {
        log::warn!("{message}");
        self.warnings.push(message);
    }
}
