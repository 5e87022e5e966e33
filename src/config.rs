//! Client configuration.

use std::time::Duration;

/// Files above this size are rejected before any request is made.
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Delay before sending an unauthenticated user back to the login page.
pub const LOGIN_REDIRECT_DELAY: Duration = Duration::from_secs(2);

pub const LOGIN_PAGE: &str = "/front/templates/index.html";
pub const TEACHER_PAGE: &str = "/front/templates/teacher.html";
pub const STUDENT_PAGE: &str = "/front/templates/student.html";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Deployment base URL, without trailing slash.
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub upload_limit_bytes: u64,
    /// Only for self-signed development servers.
    pub accept_invalid_certs: bool,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Some(Duration::from_secs(30)),
            upload_limit_bytes: MAX_UPLOAD_BYTES,
            accept_invalid_certs: false,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
