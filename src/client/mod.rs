//! Client module - HTTP implementations of `RequestApi` for native and WASM targets
//!
//! The native client uses reqwest with a cookie store, the WASM client uses
//! gloo_net with `credentials: include`. Both share the response decoding below.

#[cfg(feature = "no-wasm")]
pub mod request;

#[cfg(feature = "wasm")]
pub mod gloo;

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Pull the `detail` field out of an error payload.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body).ok()?;
    match json.get("detail")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Turn a finished response into `T`, or into an `HttpError` for non-2xx.
///
/// Empty bodies decode as JSON `null`.
pub(crate) fn decode_body<T: DeserializeOwned>(status: u16, ok: bool, body: &str) -> Result<T> {
    if !ok {
        return Err(Error::http(status, error_detail(body)));
    }
    let body = if body.trim().is_empty() { "null" } else { body };
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn non_success_carries_detail() {
        let err = decode_body::<Value>(404, false, r#"{"detail":"Theme not found"}"#).unwrap_err();
        match err.kind() {
            ErrorKind::HttpError { status, detail } => {
                assert_eq!(*status, 404);
                assert_eq!(detail.as_deref(), Some("Theme not found"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_json_error_body_has_no_detail() {
        let err = decode_body::<Value>(502, false, "<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.user_message(), "Request failed");
    }

    #[test]
    fn empty_success_body_is_null() {
        let value: Value = decode_body(204, true, "").unwrap();
        assert!(value.is_null());
        let unit: () = decode_body(200, true, "  ").unwrap();
        assert_eq!(unit, ());
    }
}
