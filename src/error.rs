pub type Result<T> = core::result::Result<T, Error>;

/// Message shown when a failed request carries no `detail` payload.
pub const GENERIC_FAILURE: &str = "Request failed";

pub struct Error {
    pub inner: Box<ErrorKind>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Error {
        Error {
            inner: Box::new(kind),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.inner
    }

    pub fn validation(msg: impl Into<String>) -> Error {
        Error::new(ErrorKind::ValidationError(msg.into()))
    }

    pub fn http(status: u16, detail: Option<String>) -> Error {
        Error::new(ErrorKind::HttpError { status, detail })
    }

    /// True for a 401 response or a server detail saying the session is gone.
    pub fn is_unauthenticated(&self) -> bool {
        match self.kind() {
            ErrorKind::HttpError { status: 401, .. } => true,
            ErrorKind::HttpError {
                detail: Some(detail),
                ..
            } => detail.contains("Not authenticated"),
            _ => false,
        }
    }

    /// Text rendered next to the control that triggered the failed action.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::HttpError {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => detail.clone(),
            ErrorKind::ValidationError(msg) => msg.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self.inner)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error::new(kind)
    }
}

#[cfg(feature = "no-wasm")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::new(ErrorKind::ReqwestError(e))
    }
}

#[cfg(feature = "wasm")]
impl From<gloo_net::Error> for Error {
    fn from(e: gloo_net::Error) -> Error {
        Error::new(ErrorKind::GlooNetError(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::new(ErrorKind::SerdeJsonError(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::new(ErrorKind::StdIoError(e))
    }
}

pub enum ErrorKind {
    #[cfg(feature = "no-wasm")]
    ReqwestError(reqwest::Error),
    #[cfg(feature = "wasm")]
    GlooNetError(gloo_net::Error),
    /// Non-2xx response; `detail` is the server's JSON `detail` field when present.
    HttpError {
        status: u16,
        detail: Option<String>,
    },
    ValidationError(String),
    SerdeJsonError(serde_json::Error),
    StdIoError(std::io::Error),
    ParseError(String),
}

impl std::fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            #[cfg(feature = "no-wasm")]
            ErrorKind::ReqwestError(ref e) => write!(f, "ReqwestError: {e:?}"),
            #[cfg(feature = "wasm")]
            ErrorKind::GlooNetError(ref e) => write!(f, "GlooNetError: {e:?}"),
            ErrorKind::HttpError { status, ref detail } => {
                write!(f, "HttpError: {status} {detail:?}")
            }
            ErrorKind::ValidationError(ref e) => write!(f, "ValidationError: {e:?}"),
            ErrorKind::SerdeJsonError(ref e) => write!(f, "SerdeJsonError: {e:?}"),
            ErrorKind::StdIoError(ref e) => write!(f, "StdIoError: {e:?}"),
            ErrorKind::ParseError(ref e) => write!(f, "ParseError: {e:?}"),
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            #[cfg(feature = "no-wasm")]
            ErrorKind::ReqwestError(ref e) => write!(f, "network error: {e}"),
            #[cfg(feature = "wasm")]
            ErrorKind::GlooNetError(ref e) => write!(f, "network error: {e}"),
            ErrorKind::HttpError {
                status,
                detail: Some(ref detail),
            } => write!(f, "HTTP {status}: {detail}"),
            ErrorKind::HttpError { status, detail: None } => write!(f, "HTTP {status}"),
            ErrorKind::ValidationError(ref e) => write!(f, "{e}"),
            ErrorKind::SerdeJsonError(ref e) => write!(f, "invalid JSON: {e}"),
            ErrorKind::StdIoError(ref e) => write!(f, "io error: {e}"),
            ErrorKind::ParseError(ref e) => write!(f, "parse error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_detail() {
        let err = Error::http(400, Some("Course not found".to_string()));
        assert_eq!(err.user_message(), "Course not found");

        let err = Error::http(500, None);
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn unauthenticated_detection() {
        assert!(Error::http(401, None).is_unauthenticated());
        assert!(Error::http(403, Some("Not authenticated".into())).is_unauthenticated());
        assert!(!Error::http(403, Some("Only for teachers".into())).is_unauthenticated());
        assert!(!Error::validation("x").is_unauthenticated());
    }
}
