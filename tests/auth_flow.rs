mod common;

use common::FakeApi;
use edu_dashboard_core::app::auth::{boot_profile, login, register, Boot, Landing};
use edu_dashboard_core::config::{LOGIN_PAGE, STUDENT_PAGE, TEACHER_PAGE};

#[tokio::test]
async fn login_lands_by_role() {
    let teacher = FakeApi::teacher();
    let landing = login(&teacher, " teacher@school.test ", "secret").await.unwrap();
    assert_eq!(landing, Landing::Teacher);
    assert_eq!(landing.page(), TEACHER_PAGE);
    assert_eq!(teacher.calls.borrow().clone(), vec!["login", "me"]);

    let student = FakeApi::student();
    let landing = login(&student, "ann@school.test", "secret").await.unwrap();
    assert_eq!(landing.page(), STUDENT_PAGE);
}

#[tokio::test]
async fn login_requires_both_fields() {
    let api = FakeApi::teacher();
    let err = login(&api, "teacher@school.test", "  ").await.unwrap_err();
    assert_eq!(err.user_message(), "Enter email and password");
    assert!(api.calls.borrow().is_empty());
}

#[tokio::test]
async fn register_requires_every_field() {
    let api = FakeApi::new();
    let err = register(&api, "", "a@b.c", "pw", false).await.unwrap_err();
    assert_eq!(err.user_message(), "Fill in all fields");

    register(&api, "Ann Lee", "a@b.c", "pw", false).await.unwrap();
    assert_eq!(api.calls_named("register"), 1);
}

#[tokio::test]
async fn detail_mentioning_authentication_redirects() {
    let api = FakeApi::teacher();
    *api.me_error.borrow_mut() = Some((403, Some("Not authenticated".into())));
    assert!(matches!(boot_profile(&api).await, Boot::RedirectToLogin { .. }));

    *api.me_error.borrow_mut() = Some((500, None));
    assert_eq!(boot_profile(&api).await, Boot::Failed("Request failed".into()));
    assert_eq!(Landing::Login.page(), LOGIN_PAGE);
}
