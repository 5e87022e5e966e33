//! Homework submission table driven by the current selection.
//!
//! Every refresh is stamped with a generation number when it is issued. A
//! response is applied only if its generation is still the newest one, so an
//! older request that completes late can never overwrite a newer table.

use crate::app::selection::{Selection, SelectionStore};
use crate::error::Result;
use crate::interface::RequestApi;
use crate::model::dtos::HomeworkQuery;
use crate::model::structs::{HomeworkStatus, HomeworkSubmission};

pub const UNKNOWN: &str = "Unknown";

pub const LOADING_MESSAGE: &str = "Loading homework submissions...";
pub const EMPTY_MESSAGE: &str = "No homework submissions found.";

/// An issued refresh; hand `generation` back to `apply` with the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    pub generation: u64,
    pub query: HomeworkQuery,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TablePhase {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Loaded(usize),
    Empty,
    Failed(String),
    /// A newer refresh was issued before this one completed.
    Stale,
}

/// One table line with display names already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeworkRow {
    pub id: i64,
    pub title: String,
    pub course_name: String,
    pub theme_name: String,
    pub student_name: String,
    pub status: HomeworkStatus,
    pub score: Option<i64>,
}

#[derive(Debug)]
pub struct HomeworkFilterQuery {
    issued: u64,
    phase: TablePhase,
    submissions: Vec<HomeworkSubmission>,
    rows: Vec<HomeworkRow>,
    selected: Option<i64>,
}

impl Default for HomeworkFilterQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl HomeworkFilterQuery {
    pub fn new() -> Self {
        Self {
            issued: 0,
            phase: TablePhase::Idle,
            submissions: Vec::new(),
            rows: Vec::new(),
            selected: None,
        }
    }

    pub fn query_for(selection: &Selection) -> HomeworkQuery {
        HomeworkQuery {
            course_id: selection.course_id,
            theme_id: selection.theme_id,
            status: selection.status,
            student_id: selection.student_id,
            ..HomeworkQuery::default()
        }
    }

    /// Start a refresh. Any ticket issued earlier becomes stale.
    pub fn issue(&mut self, selection: &Selection) -> RefreshTicket {
        self.issued += 1;
        self.phase = TablePhase::Loading;
        RefreshTicket {
            generation: self.issued,
            query: Self::query_for(selection),
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.issued
    }

    /// Apply a finished request. Responses of superseded tickets are dropped.
    pub fn apply(
        &mut self,
        generation: u64,
        result: Result<Vec<HomeworkSubmission>>,
        store: &SelectionStore,
    ) -> RefreshOutcome {
        if !self.is_current(generation) {
            log::debug!(
                "discarding homework response {generation}, newest is {}",
                self.issued
            );
            return RefreshOutcome::Stale;
        }

        match result {
            Ok(submissions) => {
                self.rows = submissions.iter().map(|hw| build_row(hw, store)).collect();
                self.submissions = submissions;
                self.phase = TablePhase::Loaded;
                if let Some(id) = self.selected {
                    if !self.submissions.iter().any(|hw| hw.id == id) {
                        self.selected = None;
                    }
                }
                if self.rows.is_empty() {
                    RefreshOutcome::Empty
                } else {
                    RefreshOutcome::Loaded(self.rows.len())
                }
            }
            Err(e) => {
                // Rows and the selected row stay as they were.
                let message = e.user_message();
                log::warn!("homework refresh failed: {e}");
                self.phase = TablePhase::Failed(message.clone());
                RefreshOutcome::Failed(message)
            }
        }
    }

    /// Issue, fetch and apply in one go.
    pub async fn refresh<C: RequestApi>(
        &mut self,
        client: &C,
        store: &SelectionStore,
    ) -> RefreshOutcome {
        let ticket = self.issue(store.selection());
        let result = client.homeworks(&ticket.query).await;
        self.apply(ticket.generation, result, store)
    }

    pub fn phase(&self) -> &TablePhase {
        &self.phase
    }

    pub fn rows(&self) -> &[HomeworkRow] {
        &self.rows
    }

    pub fn submissions(&self) -> &[HomeworkSubmission] {
        &self.submissions
    }

    pub fn submission(&self, id: i64) -> Option<&HomeworkSubmission> {
        self.submissions.iter().find(|hw| hw.id == id)
    }

    pub fn select_row(&mut self, id: i64) -> Option<&HomeworkSubmission> {
        let found = self.submissions.iter().find(|hw| hw.id == id);
        self.selected = found.map(|hw| hw.id);
        found
    }

    pub fn selected_row(&self) -> Option<i64> {
        self.selected
    }

    /// Status text under the table; `None` when rows are simply shown.
    pub fn message(&self) -> Option<&str> {
        match &self.phase {
            TablePhase::Idle => None,
            TablePhase::Loading => Some(LOADING_MESSAGE),
            TablePhase::Loaded if self.rows.is_empty() => Some(EMPTY_MESSAGE),
            TablePhase::Loaded => None,
            TablePhase::Failed(message) => Some(message),
        }
    }
}

fn build_row(hw: &HomeworkSubmission, store: &SelectionStore) -> HomeworkRow {
    HomeworkRow {
        id: hw.id,
        title: hw.title.clone(),
        course_name: resolve_course_name(hw, store),
        theme_name: resolve_theme_name(hw, store),
        student_name: resolve_student_name(hw, store),
        status: hw.effective_status(),
        score: hw.committed_score(),
    }
}

fn embedded(name: Option<&str>) -> Option<String> {
    name.filter(|n| !n.trim().is_empty()).map(str::to_string)
}

/// Embedded name, then the cached course, then "Unknown". The course id is
/// taken from the payload or derived from the cached theme.
pub fn resolve_course_name(hw: &HomeworkSubmission, store: &SelectionStore) -> String {
    if let Some(name) = embedded(hw.course_name.as_deref()) {
        return name;
    }
    let course_id = hw
        .course_id
        .or_else(|| hw.theme_id.and_then(|id| store.theme(id)).map(|t| t.course_id));
    course_id
        .and_then(|id| store.course(id))
        .map(|c| c.name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn resolve_theme_name(hw: &HomeworkSubmission, store: &SelectionStore) -> String {
    if let Some(name) = embedded(hw.theme_name.as_deref()) {
        return name;
    }
    hw.theme_id
        .and_then(|id| store.theme(id))
        .map(|t| t.name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn resolve_student_name(hw: &HomeworkSubmission, store: &SelectionStore) -> String {
    if let Some(name) = embedded(hw.student_name.as_deref()) {
        return name;
    }
    hw.student_id
        .and_then(|id| store.student(id))
        .and_then(|s| s.full_name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::structs::{Course, Theme};

    fn store() -> SelectionStore {
        let mut store = SelectionStore::new();
        store.set_courses(vec![Course {
            id: 3,
            name: "Algebra".into(),
            description: None,
            is_enrolled: None,
            themes_count: None,
            owner: None,
        }]);
        store.cache_themes(
            3,
            vec![Theme {
                id: 30,
                course_id: 3,
                name: "Quadratics".into(),
                text: String::new(),
                is_homework: true,
            }],
        );
        store
    }

    fn hw(id: i64) -> HomeworkSubmission {
        HomeworkSubmission {
            id,
            title: format!("hw {id}"),
            ..Default::default()
        }
    }

    #[test]
    fn course_name_three_tier_fallback() {
        let store = store();

        let mut embedded = hw(1);
        embedded.course_name = Some("From payload".into());
        embedded.course_id = Some(3);
        assert_eq!(resolve_course_name(&embedded, &store), "From payload");

        let mut by_id = hw(2);
        by_id.course_id = Some(3);
        assert_eq!(resolve_course_name(&by_id, &store), "Algebra");

        let mut by_theme = hw(3);
        by_theme.theme_id = Some(30);
        assert_eq!(resolve_course_name(&by_theme, &store), "Algebra");
        assert_eq!(resolve_theme_name(&by_theme, &store), "Quadratics");

        let mut missing = hw(4);
        missing.course_id = Some(99);
        assert_eq!(resolve_course_name(&missing, &store), UNKNOWN);
        assert_eq!(resolve_theme_name(&missing, &store), UNKNOWN);
    }

    #[test]
    fn stale_response_is_discarded() {
        let store = store();
        let mut table = HomeworkFilterQuery::new();

        let a = table.issue(store.selection());
        let b = table.issue(store.selection());

        assert_eq!(
            table.apply(b.generation, Ok(vec![hw(2)]), &store),
            RefreshOutcome::Loaded(1)
        );
        assert_eq!(
            table.apply(a.generation, Ok(vec![hw(1), hw(5)]), &store),
            RefreshOutcome::Stale
        );
        let ids: Vec<i64> = table.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn empty_and_loading_are_distinct() {
        let store = store();
        let mut table = HomeworkFilterQuery::new();
        let ticket = table.issue(store.selection());
        assert_eq!(table.message(), Some(LOADING_MESSAGE));

        assert_eq!(
            table.apply(ticket.generation, Ok(vec![]), &store),
            RefreshOutcome::Empty
        );
        assert_eq!(table.message(), Some(EMPTY_MESSAGE));
    }

    #[test]
    fn failure_keeps_rows_and_selected_row() {
        let store = store();
        let mut table = HomeworkFilterQuery::new();
        let first = table.issue(store.selection());
        table.apply(first.generation, Ok(vec![hw(7), hw(8)]), &store);
        table.select_row(8);

        let second = table.issue(store.selection());
        let outcome = table.apply(
            second.generation,
            Err(Error::http(403, Some("Only for teachers".into()))),
            &store,
        );
        assert_eq!(outcome, RefreshOutcome::Failed("Only for teachers".into()));
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.selected_row(), Some(8));
        assert_eq!(table.message(), Some("Only for teachers"));
    }

    #[test]
    fn failure_without_detail_uses_generic_text() {
        let store = store();
        let mut table = HomeworkFilterQuery::new();
        let ticket = table.issue(store.selection());
        let outcome = table.apply(ticket.generation, Err(Error::http(500, None)), &store);
        assert_eq!(outcome, RefreshOutcome::Failed("Request failed".into()));
    }
}
