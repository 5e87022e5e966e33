//! Session bootstrap, login and registration.

use std::time::Duration;

use crate::config::{LOGIN_PAGE, LOGIN_REDIRECT_DELAY, STUDENT_PAGE, TEACHER_PAGE};
use crate::error::{Error, Result};
use crate::interface::RequestApi;
use crate::model::dtos::{LoginParams, RegisterParams};
use crate::model::structs::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Login,
    Teacher,
    Student,
}

impl Landing {
    pub fn for_profile(profile: &UserProfile) -> Self {
        if profile.is_teacher {
            Landing::Teacher
        } else {
            Landing::Student
        }
    }

    pub fn page(&self) -> &'static str {
        match self {
            Landing::Login => LOGIN_PAGE,
            Landing::Teacher => TEACHER_PAGE,
            Landing::Student => STUDENT_PAGE,
        }
    }
}

/// Result of resolving the current user when a dashboard starts.
#[derive(Debug, Clone, PartialEq)]
pub enum Boot {
    Ready(UserProfile),
    /// Session is missing or expired; go to `Landing::Login` after `after`.
    RedirectToLogin { after: Duration, reason: String },
    /// Authenticated, but the wrong role for this dashboard.
    Denied(String),
    Failed(String),
}

/// `GET /auth/me`, mapping an unauthenticated answer to a delayed redirect.
pub async fn boot_profile<C: RequestApi>(client: &C) -> Boot {
    match client.me().await {
        Ok(profile) => Boot::Ready(profile),
        Err(e) if e.is_unauthenticated() => {
            log::info!("no session, redirecting to login: {e}");
            Boot::RedirectToLogin {
                after: LOGIN_REDIRECT_DELAY,
                reason: "Please log in".to_string(),
            }
        }
        Err(e) => {
            log::warn!("loading profile failed: {e}");
            Boot::Failed(e.user_message())
        }
    }
}

/// Log in and decide which dashboard to open from the returned profile.
pub async fn login<C: RequestApi>(client: &C, email: &str, password: &str) -> Result<Landing> {
    let params = LoginParams {
        email: email.trim().to_string(),
        password: password.trim().to_string(),
    };
    if params.email.is_empty() || params.password.is_empty() {
        return Err(Error::validation("Enter email and password"));
    }

    client.login(&params).await?;
    let profile = client.me().await?;
    log::debug!("logged in as {}", profile.display_name());
    Ok(Landing::for_profile(&profile))
}

pub async fn register<C: RequestApi>(
    client: &C,
    full_name: &str,
    email: &str,
    password: &str,
    is_teacher: bool,
) -> Result<()> {
    let params = RegisterParams {
        email: email.trim().to_string(),
        password: password.trim().to_string(),
        full_name: full_name.trim().to_string(),
        is_teacher,
    };
    if params.full_name.is_empty() || params.email.is_empty() || params.password.is_empty() {
        return Err(Error::validation("Fill in all fields"));
    }

    client.register(&params).await?;
    Ok(())
}
