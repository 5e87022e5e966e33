mod common;

use common::{course, homework, student, theme, FakeApi};
use edu_dashboard_core::app::homework_query::{
    HomeworkFilterQuery, RefreshOutcome, TablePhase, EMPTY_MESSAGE, UNKNOWN,
};
use edu_dashboard_core::app::selection::SelectionStore;
use edu_dashboard_core::app::TeacherDashboard;
use edu_dashboard_core::interface::RequestApi;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;

fn store() -> SelectionStore {
    let mut store = SelectionStore::new();
    store.set_courses(vec![course(1, "Algebra"), course(2, "Geometry")]);
    store
}

#[tokio::test]
async fn late_response_of_older_filter_is_discarded() {
    let api = FakeApi::teacher();
    let release_a = api.hold_homeworks(Some(1));
    let release_b = api.hold_homeworks(Some(2));

    let mut store = store();
    let mut table = HomeworkFilterQuery::new();

    store.set_course(Some(1)).unwrap();
    let a = table.issue(store.selection());
    store.set_course(Some(2)).unwrap();
    let b = table.issue(store.selection());

    let api = &api;
    let mut in_flight = FuturesUnordered::new();
    for ticket in [a, b] {
        in_flight.push(
            async move { (ticket.generation, api.homeworks(&ticket.query).await) }.boxed_local(),
        );
    }

    // B answers first, then A.
    release_b.send(vec![homework(20, 2, 101)]).unwrap();
    let (generation, result) = in_flight.next().await.unwrap();
    assert_eq!(table.apply(generation, result, &store), RefreshOutcome::Loaded(1));

    release_a.send(vec![homework(10, 1, 101), homework(11, 1, 102)]).unwrap();
    let (generation, result) = in_flight.next().await.unwrap();
    assert_eq!(table.apply(generation, result, &store), RefreshOutcome::Stale);

    let ids: Vec<i64> = table.rows().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![20]);
    assert_eq!(table.phase(), &TablePhase::Loaded);
}

#[tokio::test]
async fn rows_resolve_names_from_cached_lookups() {
    let api = FakeApi::teacher();
    *api.courses.borrow_mut() = vec![course(1, "Algebra")];
    api.students.borrow_mut().insert(1, vec![student(101, "Ann Lee")]);
    api.themes.borrow_mut().insert(1, vec![theme(10, 1, "Equations", true)]);

    let mut embedded = homework(7, 1, 101);
    embedded.student_name = Some("Anna L.".into());
    let mut by_theme = homework(8, 1, 999);
    by_theme.course_id = None;
    by_theme.theme_id = Some(10);
    *api.homeworks.borrow_mut() = vec![embedded, by_theme];

    let mut dashboard = TeacherDashboard::new(api);
    dashboard.boot().await;
    dashboard.select_course(Some(1)).await.unwrap();
    dashboard.select_course(None).await.unwrap();

    let rows = dashboard.homeworks.rows();
    assert_eq!(rows[0].student_name, "Anna L.");
    assert_eq!(rows[0].course_name, "Algebra");
    assert_eq!(rows[1].course_name, "Algebra");
    assert_eq!(rows[1].theme_name, "Equations");
    assert_eq!(rows[1].student_name, UNKNOWN);
}

#[tokio::test]
async fn empty_result_is_not_a_failure() {
    let api = FakeApi::teacher();
    let mut table = HomeworkFilterQuery::new();
    let store = store();

    assert_eq!(table.refresh(&api, &store).await, RefreshOutcome::Empty);
    assert_eq!(table.message(), Some(EMPTY_MESSAGE));
}
